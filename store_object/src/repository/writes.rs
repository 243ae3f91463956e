//! Insert, update and replace operations

use super::core::{encode, id_to_string, Repository};
use crate::document::DELETED_AT;
use crate::errors::StoreError;
use crate::query_builder::{merge_filter, Filter};
use crate::resolver::{set_pk_value, track_timer, Operation};
use crate::traits::Record;
use bson::{doc, Bson, Document};
use chrono::Utc;
use std::borrow::BorrowMut;

impl<T: Record> Repository<T> {
    /// Insert one record, writing the store-assigned id back onto it
    pub async fn insert(&self, record: &mut T) -> Result<String, StoreError> {
        track_timer(record, Operation::Creating, Utc::now());
        let document = encode(record)?;

        let id = self
            .run("insert", self.collection.insert_one(document))
            .await?;
        set_pk_value(record, &id);

        crate::debug_log!(collection = self.collection.name(), id = %id, "inserted record");
        Ok(id_to_string(&id))
    }

    /// Insert a batch of records in one store call.
    ///
    /// Elements may be values or boxes. Ids are returned in input order; a store that
    /// fails part way reports whatever it reports, nothing is retried.
    pub async fn insert_many<R>(&self, records: &mut [R]) -> Result<Vec<String>, StoreError>
    where
        R: BorrowMut<T>,
    {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut documents = Vec::with_capacity(records.len());
        for record in records.iter_mut() {
            let record: &mut T = record.borrow_mut();
            track_timer(record, Operation::Creating, now);
            documents.push(encode(record)?);
        }

        let ids = self
            .run("insert_many", self.collection.insert_many(documents))
            .await?;
        for (record, id) in records.iter_mut().zip(ids.iter()) {
            let record: &mut T = record.borrow_mut();
            set_pk_value(record, id);
        }

        crate::debug_log!(
            collection = self.collection.name(),
            count = ids.len(),
            "inserted records"
        );
        Ok(ids.iter().map(id_to_string).collect())
    }

    /// Write a record back by its own primary key.
    ///
    /// Returns true only when the store reports a modified document.
    pub async fn save(&self, record: &mut T) -> Result<bool, StoreError> {
        track_timer(record, Operation::Updating, Utc::now());
        let encoded = encode(record)?;
        let id = self.pk.value_of(&encoded)?;

        let result = self
            .run(
                "save",
                self.collection
                    .update_one(self.live_by_id(id), set_update(encoded)),
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    /// Partial update of the live record with the given id.
    ///
    /// A malformed id is an [`StoreError::InvalidId`] error.
    pub async fn update(&self, id: &str, record: &mut T) -> Result<u64, StoreError> {
        let id = self.pk.parse_id(id)?;
        track_timer(record, Operation::Updating, Utc::now());
        let update = set_update(encode(record)?);

        let result = self
            .run("update", self.collection.update_one(self.live_by_id(id), update))
            .await?;
        Ok(result.modified_count)
    }

    /// Partial update of the first live record matching `filter`
    pub async fn update_one(&self, filter: Filter, record: &mut T) -> Result<u64, StoreError> {
        let filter = merge_filter(filter);
        track_timer(record, Operation::Updating, Utc::now());
        let update = set_update(encode(record)?);

        let result = self
            .run("update_one", self.collection.update_one(filter.filter, update))
            .await?;
        Ok(result.modified_count)
    }

    /// Partial update of every live record matching `filter`
    pub async fn update_many(&self, filter: Filter, record: &mut T) -> Result<u64, StoreError> {
        let filter = merge_filter(filter);
        track_timer(record, Operation::Updating, Utc::now());
        let update = set_update(encode(record)?);

        let result = self
            .run(
                "update_many",
                self.collection.update_many(filter.filter, update),
            )
            .await?;
        Ok(result.modified_count)
    }

    /// Replace the whole first live record matching `filter`, keeping its id
    pub async fn replace_one(&self, filter: Filter, record: &mut T) -> Result<u64, StoreError> {
        let filter = merge_filter(filter);
        track_timer(record, Operation::Updating, Utc::now());
        let mut replacement = encode(record)?;
        replacement.remove("_id");

        let result = self
            .run(
                "replace_one",
                self.collection.replace_one(filter.filter, replacement),
            )
            .await?;
        Ok(result.modified_count)
    }

    /// Predicate for the live record stored under `id`
    pub(crate) fn live_by_id(&self, id: Bson) -> Document {
        let mut filter = Document::new();
        filter.insert(self.pk.tag(), id);
        filter.insert(DELETED_AT, Bson::Null);
        filter
    }
}

/// `$set` update carrying every encoded field except the immutable `_id`
fn set_update(mut encoded: Document) -> Document {
    encoded.remove("_id");
    doc! { "$set": encoded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document as AuditFields;
    use crate::memory::MemoryStore;
    use crate::traits::{Audited, Model};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Gadget {
        #[serde(flatten)]
        document: AuditFields,
        name: String,
        #[serde(default)]
        qty: i64,
    }

    impl Model for Gadget {
        fn connection() -> &'static str {
            "default"
        }

        fn collection() -> &'static str {
            "gadgets"
        }
    }

    impl Audited for Gadget {
        fn document(&self) -> Option<&AuditFields> {
            Some(&self.document)
        }

        fn document_mut(&mut self) -> Option<&mut AuditFields> {
            Some(&mut self.document)
        }
    }

    fn gadget(name: &str, qty: i64) -> Gadget {
        Gadget {
            name: name.to_string(),
            qty,
            ..Default::default()
        }
    }

    fn repository() -> (MemoryStore, Repository<Gadget>) {
        let store = MemoryStore::new();
        let repo = Repository::from_client(&store, "test");
        (store, repo)
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let (store, repo) = repository();
        let mut record = gadget("bolt", 3);

        let id = repo.insert(&mut record).await.unwrap();

        assert_eq!(record.document.id.map(|oid| oid.to_hex()), Some(id));
        assert!(record.document.created_at.is_some());
        assert_eq!(record.document.created_at, record.document.updated_at);
        assert_eq!(store.documents("test", "gadgets").len(), 1);
    }

    #[tokio::test]
    async fn test_insert_many_handles_values_and_boxes() {
        let (_store, repo) = repository();

        let mut values = vec![gadget("a", 1), gadget("b", 2)];
        let ids = repo.insert_many(&mut values).await.unwrap();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert!(values.iter().all(|g| g.document.id.is_some()));

        let mut boxed = vec![Box::new(gadget("c", 3))];
        let ids = repo.insert_many(&mut boxed).await.unwrap();
        assert_eq!(boxed[0].document.id.map(|oid| oid.to_hex()), Some(ids[0].clone()));

        let mut empty: Vec<Gadget> = Vec::new();
        assert!(repo.insert_many(&mut empty).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_requires_a_change() {
        let (_store, repo) = repository();
        let mut record = gadget("nut", 1);
        repo.insert(&mut record).await.unwrap();

        record.qty = 5;
        assert!(repo.save(&mut record).await.unwrap());

        let mut missing = gadget("ghost", 0);
        let err = repo.save(&mut missing).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingPrimaryKey(tag) if tag == "_id"));
    }

    #[tokio::test]
    async fn test_update_rejects_malformed_id() {
        let (_store, repo) = repository();
        let mut record = gadget("x", 1);

        let err = repo.update("not-an-id", &mut record).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }

    #[tokio::test]
    async fn test_update_one_on_no_match_is_zero() {
        let (_store, repo) = repository();
        let mut record = gadget("x", 1);

        let modified = repo
            .update_one(Filter::new().eq("name", "nobody"), &mut record)
            .await
            .unwrap();
        assert_eq!(modified, 0);
    }

    #[tokio::test]
    async fn test_update_many_and_replace_one() {
        let (store, repo) = repository();
        let mut batch = vec![gadget("a", 1), gadget("a", 2), gadget("b", 3)];
        repo.insert_many(&mut batch).await.unwrap();

        let mut patch = gadget("a", 10);
        let modified = repo
            .update_many(Filter::new().eq("name", "a"), &mut patch)
            .await
            .unwrap();
        assert_eq!(modified, 2);

        let mut replacement = gadget("z", 0);
        let replaced = repo
            .replace_one(Filter::new().eq("name", "b"), &mut replacement)
            .await
            .unwrap();
        assert_eq!(replaced, 1);

        let stored = store.documents("test", "gadgets");
        assert_eq!(
            stored.iter().filter(|d| d.get_i64("qty").ok() == Some(10)).count(),
            2
        );
        assert!(stored.iter().any(|d| d.get_str("name").ok() == Some("z")));
        assert!(stored.iter().all(|d| d.get_object_id("_id").is_ok()));
    }
}
