//! # DocHaus
//!
//! A generic repository layer for document stores. Record types share one implementation
//! of create, read, update and delete with primary-key bookkeeping, audit timestamps and
//! soft deletion.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dochaus::prelude::*;
//!
//! #[model]
//! #[collection(name = "widgets")]
//! pub struct Widget {
//!     pub document: Document,
//!     pub name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = MapSource::new()
//!         .with("database.mongo.default.host", "localhost")
//!         .with("database.mongo.default.port", "27017")
//!         .with("database.mongo.default.database", "shop");
//!
//!     let haus = DocHaus::new(source, MemoryConnector::new());
//!     let widgets = haus.repository::<Widget>().await?;
//!
//!     let mut widget = Widget {
//!         name: "sprocket".to_string(),
//!         ..Default::default()
//!     };
//!     let id = widgets.insert(&mut widget).await?;
//!     widgets.delete(&id).await?;
//!
//!     let mut trashed = Widget::default();
//!     widgets.find_one(&mut trashed, Filter::new().trashed()).await?;
//!     println!("Deleted widget: {}", trashed.name);
//!
//!     Ok(())
//! }
//! ```

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

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use crate::core::{Connector, DocHaus, MemoryConnector};
#[cfg(feature = "mongodb")]
pub use crate::core::MongoConnector;
pub use errors::DocHausError;
