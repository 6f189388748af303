//! Collaborators of the composition layer: the transport that uploads and
//! delivers messages, and the supervisor that owns the connection lifecycle.

pub mod error;
pub mod supervisor;
pub mod transport;

pub use {
    error::{Error, Result},
    supervisor::{Connection, PairingEvent, Supervisor, shutdown_signal},
    transport::{MediaType, SendResponse, Transport, UploadedMedia},
};
