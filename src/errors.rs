//! Error types for the DocHaus crate
//!
//! This module contains all error types that can be returned by DocHaus operations.

use config::ConfigError;
use store_object::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocHausError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Connection '{connection}' failed: {message}")]
    Connection { connection: String, message: String },
}
