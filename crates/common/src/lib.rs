//! Process-wide setup shared by everything embedding the composer.

pub mod error;
pub mod telemetry;

pub use {
    error::{Error, Result},
    telemetry::init_telemetry,
};
