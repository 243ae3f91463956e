//! Soft and physical deletion
//!
//! Soft deletion stamps `deleted_at` on live records; the record stays stored and drops out
//! of every default query. The `force_*` variants remove documents physically.

use super::core::Repository;
use crate::document::DELETED_AT;
use crate::errors::StoreError;
use crate::query_builder::{merge_filter, Filter};
use crate::traits::Record;
use bson::{doc, Bson, Document};
use chrono::Utc;

impl<T: Record> Repository<T> {
    /// Soft-delete the live record with the given id, returning the modified count
    pub async fn delete(&self, id: &str) -> Result<u64, StoreError> {
        let id = self.pk.parse_id(id)?;
        let result = self
            .run(
                "delete",
                self.collection
                    .update_one(self.live_by_id(id), soft_delete_update()),
            )
            .await?;

        crate::debug_log!(
            collection = self.collection.name(),
            modified = result.modified_count,
            "soft deleted by id"
        );
        Ok(result.modified_count)
    }

    /// Remove the record with the given id, whether or not it is soft-deleted
    pub async fn force_delete(&self, id: &str) -> Result<u64, StoreError> {
        let id = self.pk.parse_id(id)?;
        let mut filter = Document::new();
        filter.insert(self.pk.tag(), id);

        let result = self
            .run("force_delete", self.collection.delete_one(filter))
            .await?;

        crate::debug_log!(
            collection = self.collection.name(),
            deleted = result.deleted_count,
            "force deleted by id"
        );
        Ok(result.deleted_count)
    }

    /// Soft-delete the first live record matching `filter`
    pub async fn delete_one(&self, filter: Filter) -> Result<u64, StoreError> {
        let filter = merge_filter(filter);
        let result = self
            .run(
                "delete_one",
                self.collection
                    .update_one(filter.filter, soft_delete_update()),
            )
            .await?;
        Ok(result.modified_count)
    }

    /// Remove the first record matching the composed `filter`
    pub async fn force_delete_one(&self, filter: Filter) -> Result<u64, StoreError> {
        let filter = merge_filter(filter);
        let result = self
            .run("force_delete_one", self.collection.delete_one(filter.filter))
            .await?;
        Ok(result.deleted_count)
    }

    /// Soft-delete every live record matching `filter`
    pub async fn delete_many(&self, filter: Filter) -> Result<u64, StoreError> {
        let filter = merge_filter(filter);
        let result = self
            .run(
                "delete_many",
                self.collection
                    .update_many(filter.filter, soft_delete_update()),
            )
            .await?;

        crate::debug_log!(
            collection = self.collection.name(),
            modified = result.modified_count,
            "soft deleted by filter"
        );
        Ok(result.modified_count)
    }

    /// Remove every record matching the composed `filter`
    pub async fn force_delete_many(&self, filter: Filter) -> Result<u64, StoreError> {
        let filter = merge_filter(filter);
        let result = self
            .run(
                "force_delete_many",
                self.collection.delete_many(filter.filter),
            )
            .await?;
        Ok(result.deleted_count)
    }
}

fn soft_delete_update() -> Document {
    let now = Bson::DateTime(bson::DateTime::from_chrono(Utc::now()));
    let mut set = Document::new();
    set.insert(DELETED_AT, now);
    doc! { "$set": set }
}
