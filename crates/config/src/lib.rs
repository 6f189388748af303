//! Configuration loading, validation and env substitution.
//!
//! Config files: `courier.toml`, `courier.yaml`, `courier.yml` or
//! `courier.json`, searched in `./` then `~/.config/courier/`.
//!
//! Supports `${ENV_VAR}` substitution anywhere in the file.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, discover_and_load, load_config},
    schema::{CourierConfig, FfmpegConfig, LoggingConfig, SendConfig, ThumbnailConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate, validate_toml_str},
};
