//! Convenience re-exports for common store-object usage

// Record capabilities
pub use crate::traits::{Audited, Model, Record};

// Store seam
pub use crate::traits::{StoreClient, StoreCollection};

// Error types
pub use crate::errors::StoreError;

// Repository and queries
pub use crate::query_builder::{Filter, SortOrder};
pub use crate::repository::Repository;

// Audit fields
pub use crate::document::Document;
pub use crate::resolver::ensure_initialized;

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use bson::oid::ObjectId;
pub use serde::{Deserialize, Serialize};
