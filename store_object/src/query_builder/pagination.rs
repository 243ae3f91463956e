//! Skip, limit and sort translation into store options

use super::filter::Filter;
use super::ordering::sort_document;
use crate::traits::{FindOneOptions, FindOptions};

impl Filter {
    /// Options for a multi-document read
    pub fn find_options(&self) -> FindOptions {
        FindOptions {
            sort: sort_document(&self.sort_by, self.sort_mode),
            skip: self.skip,
            limit: self.limit,
        }
    }

    /// Options for a single-document read; limit does not apply
    pub fn find_one_options(&self) -> FindOneOptions {
        FindOneOptions {
            sort: sort_document(&self.sort_by, self.sort_mode),
            skip: self.skip,
        }
    }
}
