//! Convenience re-exports for common DocHaus usage
//!
//! This prelude module re-exports the most commonly used items from the DocHaus ecosystem,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use dochaus::prelude::*;
//!
//! // Now you have access to all the common DocHaus types and traits
//! ```

// Core DocHaus components
pub use crate::core::{Connector, DocHaus, MemoryConnector};
#[cfg(feature = "mongodb")]
pub use crate::core::MongoConnector;
pub use crate::errors::DocHausError;

// Re-export centralized config
pub use config::{ConfigSource, ConnectionConfig, MapSource, TomlSource};

// Re-export commonly used store-object types for convenience
pub use store_object::prelude::*;
pub use store_object::MemoryStore;

// Re-export store_object module for macro-generated code
pub use store_object;

// Re-export table derive for model creation
pub use table_derive::{model, Model};

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use bson;
pub use tokio;
