//! Trait definitions
//!
//! This module contains the capabilities a record type provides to the repository
//! and the seam to the underlying store client.

pub mod core;
pub mod store;

pub use self::core::{Audited, Model, Record};
pub use store::{
    DeleteResult, DocumentCursor, FindOneOptions, FindOptions, StoreClient, StoreCollection,
    UpdateResult,
};
