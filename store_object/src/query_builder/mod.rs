//! Query composition
//!
//! This module turns a caller supplied [`Filter`] into the predicate and options sent to
//! the store, enforcing soft-delete exclusion on the way.

pub mod filter;
pub mod ordering;
pub mod pagination;

pub use filter::{merge_filter, Filter, Visibility};
pub use ordering::SortOrder;
