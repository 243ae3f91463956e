//! Generic repository
//!
//! One [`Repository`] binds a record type to a store collection and implements create,
//! read, update and delete on top of the field resolver and the filter composer.

pub mod core;
pub mod reads;
pub mod soft_deletable;
pub mod writes;

pub use self::core::Repository;
