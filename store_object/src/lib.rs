//! Store Object - Generic repository layer for document stores
//!
//! This crate provides the record capabilities, the filter composer, the field resolver,
//! the [`Repository`] facade and the store client seam it runs on, together with an
//! in-memory backend and (behind the `mongodb` feature) a MongoDB backend.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod document;
pub mod errors;
pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;
pub mod prelude;
pub mod query_builder;
pub mod repository;
pub mod resolver;
pub mod traits;

pub use document::{Document, DELETED_AT};
pub use errors::StoreError;
pub use memory::MemoryStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoClient;
pub use query_builder::{merge_filter, Filter, SortOrder, Visibility};
pub use repository::Repository;
pub use resolver::{ensure_initialized, Operation, PrimaryKey};
pub use traits::*;

pub use bson;
#[cfg(feature = "mongodb")]
pub use mongodb;
