//! Field resolution for arbitrary record types
//!
//! Audit stamping goes through the [`Audited`] capability, and primary-key values are
//! read from a record's encoded form under the bound storage tag, so neither depends on
//! the concrete record type.

use crate::errors::StoreError;
use crate::traits::Audited;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use chrono::{DateTime, Utc};

pub const DEFAULT_PK_FIELD: &str = "Id";
pub const DEFAULT_PK_TAG: &str = "_id";

/// Kind of mutation a record is about to go through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Creating,
    Updating,
}

/// Stamp audit timestamps on a record.
///
/// `created_at` is only written when creating, `updated_at` always. Records without
/// audit fields are left alone.
pub fn track_timer<R: Audited + ?Sized>(record: &mut R, operation: Operation, now: DateTime<Utc>) {
    if let Some(document) = record.document_mut() {
        if operation == Operation::Creating {
            document.set_created_at(now);
        }
        document.set_updated_at(now);
    }
}

/// Copy a store-assigned identity onto a record, returning whether it was written
pub fn set_pk_value<R: Audited + ?Sized>(record: &mut R, id: &Bson) -> bool {
    match (record.document_mut(), id) {
        (Some(document), Bson::ObjectId(oid)) => {
            document.set_id(*oid);
            true
        }
        _ => false,
    }
}

/// Materialize an unset optional record before handing it to the repository
pub fn ensure_initialized<T: Default>(slot: &mut Option<T>) -> &mut T {
    slot.get_or_insert_with(T::default)
}

/// Primary-key binding: the record field name and the key it is stored under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKey {
    field: String,
    tag: String,
}

impl Default for PrimaryKey {
    fn default() -> Self {
        Self {
            field: DEFAULT_PK_FIELD.to_string(),
            tag: DEFAULT_PK_TAG.to_string(),
        }
    }
}

impl PrimaryKey {
    /// Empty names fall back to the defaults
    pub fn new(field: &str, tag: &str) -> Self {
        let field = if field.is_empty() { DEFAULT_PK_FIELD } else { field };
        let tag = if tag.is_empty() { DEFAULT_PK_TAG } else { tag };
        Self {
            field: field.to_string(),
            tag: tag.to_string(),
        }
    }

    /// Record field name of the key. Informational only: lookups always go through
    /// [`PrimaryKey::tag`] on the encoded record.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_default_tag(&self) -> bool {
        self.tag == DEFAULT_PK_TAG
    }

    /// Primary-key value of an encoded record
    pub fn value_of(&self, encoded: &Document) -> Result<Bson, StoreError> {
        match encoded.get(&self.tag) {
            Some(Bson::Null) | None => Err(StoreError::MissingPrimaryKey(self.tag.clone())),
            Some(value) => Ok(value.clone()),
        }
    }

    /// Turn a caller supplied id string into the value stored under the tag.
    ///
    /// The default tag only takes hex object ids. A custom tag takes any non-empty string
    /// verbatim, including one that happens to look like an object id.
    pub fn parse_id(&self, id: &str) -> Result<Bson, StoreError> {
        if !self.is_default_tag() {
            if id.is_empty() {
                return Err(StoreError::InvalidId(id.to_string()));
            }
            return Ok(Bson::String(id.to_string()));
        }
        ObjectId::parse_str(id)
            .map(Bson::ObjectId)
            .map_err(|_| StoreError::InvalidId(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document as AuditFields;
    use bson::doc;

    #[derive(Default)]
    struct Tracked {
        document: AuditFields,
    }

    impl Audited for Tracked {
        fn document(&self) -> Option<&AuditFields> {
            Some(&self.document)
        }

        fn document_mut(&mut self) -> Option<&mut AuditFields> {
            Some(&mut self.document)
        }
    }

    #[derive(Default)]
    struct Untracked;

    impl Audited for Untracked {}

    #[test]
    fn test_creating_stamps_both_timestamps() {
        let mut record = Tracked::default();
        let now = Utc::now();
        track_timer(&mut record, Operation::Creating, now);

        assert!(record.document.created_at.is_some());
        assert_eq!(record.document.created_at, record.document.updated_at);
        assert!(record.document.deleted_at.is_none());
    }

    #[test]
    fn test_updating_leaves_created_at_alone() {
        let mut record = Tracked::default();
        let later = Utc::now();
        let earlier = later - chrono::Duration::hours(1);
        track_timer(&mut record, Operation::Creating, earlier);
        track_timer(&mut record, Operation::Updating, later);

        assert_eq!(
            record.document.created_at().map(|t| t.timestamp_millis()),
            Some(earlier.timestamp_millis())
        );
        assert_eq!(
            record.document.updated_at().map(|t| t.timestamp_millis()),
            Some(later.timestamp_millis())
        );
    }

    #[test]
    fn test_boxed_record_resolves_through_indirection() {
        let mut record = Box::new(Tracked::default());
        track_timer(&mut record, Operation::Creating, Utc::now());
        let id = ObjectId::new();

        assert!(set_pk_value(&mut record, &Bson::ObjectId(id)));
        assert_eq!(record.document.id, Some(id));
        assert!(record.document.created_at.is_some());
    }

    #[test]
    fn test_untracked_record_is_a_no_op() {
        let mut record = Untracked;
        track_timer(&mut record, Operation::Creating, Utc::now());
        assert!(!set_pk_value(&mut record, &Bson::ObjectId(ObjectId::new())));
    }

    #[test]
    fn test_non_object_id_is_not_written() {
        let mut record = Tracked::default();
        assert!(!set_pk_value(&mut record, &Bson::String("sku-1".into())));
        assert!(record.document.id.is_none());
    }

    #[test]
    fn test_ensure_initialized_fills_empty_slot() {
        let mut slot: Option<Tracked> = None;
        track_timer(ensure_initialized(&mut slot), Operation::Updating, Utc::now());

        assert!(slot.unwrap().document.updated_at.is_some());
    }

    #[test]
    fn test_primary_key_defaults() {
        let pk = PrimaryKey::default();
        assert_eq!((pk.field(), pk.tag()), ("Id", "_id"));
        assert_eq!(PrimaryKey::new("", ""), pk);

        let custom = PrimaryKey::new("Sku", "sku");
        assert_eq!((custom.field(), custom.tag()), ("Sku", "sku"));
        assert!(!custom.is_default_tag());
    }

    #[test]
    fn test_value_of_reads_tagged_key() {
        let id = ObjectId::new();
        let pk = PrimaryKey::default();

        assert_eq!(
            pk.value_of(&doc! { "_id": id, "name": "a" }).unwrap(),
            Bson::ObjectId(id)
        );
        assert!(matches!(
            pk.value_of(&doc! { "name": "a" }),
            Err(StoreError::MissingPrimaryKey(tag)) if tag == "_id"
        ));
        assert_eq!(
            PrimaryKey::new("Sku", "sku")
                .value_of(&doc! { "sku": "A-1" })
                .unwrap(),
            Bson::String("A-1".into())
        );
    }

    #[test]
    fn test_parse_id() {
        let id = ObjectId::new();
        let pk = PrimaryKey::default();

        assert_eq!(pk.parse_id(&id.to_hex()).unwrap(), Bson::ObjectId(id));
        assert!(matches!(
            pk.parse_id("not-an-id"),
            Err(StoreError::InvalidId(_))
        ));
        assert_eq!(
            PrimaryKey::new("Sku", "sku").parse_id("A-1").unwrap(),
            Bson::String("A-1".into())
        );
        assert!(PrimaryKey::new("Sku", "sku").parse_id("").is_err());
    }

    #[test]
    fn test_custom_tag_keeps_hex_looking_keys_as_strings() {
        let hex = "507f1f77bcf86cd799439011";

        assert_eq!(
            PrimaryKey::new("Sku", "sku").parse_id(hex).unwrap(),
            Bson::String(hex.into())
        );
        assert!(matches!(
            PrimaryKey::default().parse_id(hex).unwrap(),
            Bson::ObjectId(_)
        ));
    }
}
