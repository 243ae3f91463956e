//! Sort direction handling

use bson::{doc, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn mode(&self) -> i8 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

/// Sort specification for `field`; a zero mode means ascending
pub(crate) fn sort_document(field: &str, mode: i8) -> Option<Document> {
    if field.is_empty() {
        return None;
    }
    let direction: i32 = if mode == 0 { 1 } else { i32::from(mode) };
    Some(doc! { field: direction })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field_means_no_sort() {
        assert!(sort_document("", -1).is_none());
    }

    #[test]
    fn test_zero_mode_defaults_to_ascending() {
        assert_eq!(sort_document("name", 0), Some(doc! { "name": 1 }));
    }

    #[test]
    fn test_explicit_mode_is_kept() {
        assert_eq!(
            sort_document("name", SortOrder::Desc.mode()),
            Some(doc! { "name": -1 })
        );
        assert_eq!(sort_document("rank", 5), Some(doc! { "rank": 5 }));
    }
}
