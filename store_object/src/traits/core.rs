//! Record capabilities
//!
//! A record type tells the repository where it lives through [`Model`] and exposes its
//! audit fields through [`Audited`]. Both are normally generated by `#[derive(Model)]`.

use crate::document::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Routing information for a record type.
///
/// ```ignore
/// impl Model for Widget {
///     fn connection() -> &'static str { "default" }
///     fn collection() -> &'static str { "widgets" }
/// }
/// ```
pub trait Model {
    /// Logical connection name, resolved by the connection registry
    fn connection() -> &'static str;

    /// Collection the records are stored in
    fn collection() -> &'static str;
}

/// Access to the embedded audit fields of a record.
///
/// The defaults return `None`, meaning the record opted out of audit tracking.
pub trait Audited {
    fn document(&self) -> Option<&Document> {
        None
    }

    fn document_mut(&mut self) -> Option<&mut Document> {
        None
    }
}

impl<T: Audited + ?Sized> Audited for Box<T> {
    fn document(&self) -> Option<&Document> {
        (**self).document()
    }

    fn document_mut(&mut self) -> Option<&mut Document> {
        (**self).document_mut()
    }
}

/// Everything the repository needs from a record type
pub trait Record: Model + Audited + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Record for T where T: Model + Audited + Serialize + DeserializeOwned + Send + Sync + 'static {}
