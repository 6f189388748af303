//! Connection lifecycle: connect, surface pairing codes for an unpaired
//! device, and disconnect cleanly on SIGINT/SIGTERM.

use std::{future::Future, sync::Arc};

use {
    async_trait::async_trait,
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use crate::error::{Error, Result};

/// Progress of the pairing handshake for a device without credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingEvent {
    /// A code to render (usually as a QR code) for the phone to scan.
    Code(String),
    /// The phone accepted the pairing.
    Success,
    /// The server stopped issuing codes before one was scanned.
    Timeout,
    /// Pairing failed with a server-side reason.
    Error(String),
}

/// Long-lived session handle driven by the [`Supervisor`].
#[async_trait]
pub trait Connection: Send + Sync {
    /// Whether stored credentials exist for this device.
    fn is_paired(&self) -> bool;

    /// Subscribe to pairing progress. Must be called before [`connect`] on
    /// an unpaired device; the channel closes once pairing ends.
    ///
    /// [`connect`]: Connection::connect
    async fn pairing_events(&self) -> Result<mpsc::Receiver<PairingEvent>>;

    async fn connect(&self) -> Result<()>;

    async fn disconnect(&self);

    fn is_connected(&self) -> bool;
}

type PairingCallback = Box<dyn Fn(&PairingEvent) + Send + Sync>;

/// Owns a [`Connection`] for the lifetime of the process.
pub struct Supervisor {
    connection: Arc<dyn Connection>,
    on_pairing: PairingCallback,
}

impl Supervisor {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            on_pairing: Box::new(|event| {
                if let PairingEvent::Code(code) = event {
                    info!(code, "scan the pairing code with the phone to log in");
                }
            }),
        }
    }

    /// Replace the default pairing handler, which logs each code.
    #[must_use]
    pub fn on_pairing(mut self, callback: impl Fn(&PairingEvent) + Send + Sync + 'static) -> Self {
        self.on_pairing = Box::new(callback);
        self
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Connect, walking through pairing first when the device is unpaired.
    pub async fn connect(&self) -> Result<()> {
        if self.connection.is_paired() {
            self.connection.connect().await?;
            info!("connected");
            return Ok(());
        }

        let mut events = self.connection.pairing_events().await?;
        self.connection.connect().await?;

        while let Some(event) = events.recv().await {
            (self.on_pairing)(&event);
            match event {
                PairingEvent::Code(_) => {},
                PairingEvent::Success => {
                    info!("pairing complete");
                },
                PairingEvent::Timeout => {
                    warn!("pairing timed out");
                    self.connection.disconnect().await;
                    return Err(Error::pairing("no code was scanned in time"));
                },
                PairingEvent::Error(reason) => {
                    self.connection.disconnect().await;
                    return Err(Error::pairing(reason));
                },
            }
        }
        debug!("pairing channel closed");
        Ok(())
    }

    pub async fn disconnect(&self) {
        info!("disconnecting");
        self.connection.disconnect().await;
    }

    /// Connect, wait for `shutdown`, then disconnect.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        self.connect().await?;
        shutdown.await;
        self.disconnect().await;
        Ok(())
    }

    /// Connect and stay up until SIGINT or SIGTERM.
    pub async fn run(&self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("received shutdown signal");
}
