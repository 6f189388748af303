//! Outbound message composition.
//!
//! A [`SendRequest`] names a destination, optionally a received message to
//! quote, and one [`Content`] kind. The [`Composer`] validates addresses,
//! uploads media, attaches a best-effort thumbnail, threads the quote and
//! makes exactly one transport call.

mod assemble;
pub mod composer;
pub mod definitions;
pub mod error;
pub mod request;

pub use {
    composer::Composer,
    error::{Error, Result, Stage},
    request::{Content, SendRequest},
};
