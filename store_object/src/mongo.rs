//! MongoDB backend over the official driver

use crate::errors::StoreError;
use crate::traits::{
    DeleteResult, DocumentCursor, FindOneOptions, FindOptions, StoreClient, StoreCollection,
    UpdateResult,
};
use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::StreamExt;
use std::sync::Arc;

/// Connected driver client for one logical connection
#[derive(Clone, Debug)]
pub struct MongoClient {
    client: mongodb::Client,
}

impl MongoClient {
    pub async fn connect(uri: &str) -> Result<Self, StoreError> {
        let client = mongodb::Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::store_operation("admin", "connect", e))?;
        Ok(Self { client })
    }

    pub fn from_driver(client: mongodb::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StoreClient for MongoClient {
    fn collection(&self, database: &str, name: &str) -> Arc<dyn StoreCollection> {
        Arc::new(MongoCollection {
            name: name.to_string(),
            inner: self.client.database(database).collection::<Document>(name),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| StoreError::store_operation("admin", "ping", e))?;
        Ok(())
    }
}

pub struct MongoCollection {
    name: String,
    inner: mongodb::Collection<Document>,
}

impl MongoCollection {
    fn failed(&self, operation: &str, error: mongodb::error::Error) -> StoreError {
        StoreError::store_operation(&self.name, operation, error)
    }
}

#[async_trait]
impl StoreCollection for MongoCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, document: Document) -> Result<Bson, StoreError> {
        let result = self
            .inner
            .insert_one(document, None)
            .await
            .map_err(|e| self.failed("insert_one", e))?;
        Ok(result.inserted_id)
    }

    async fn insert_many(&self, documents: Vec<Document>) -> Result<Vec<Bson>, StoreError> {
        let result = self
            .inner
            .insert_many(documents, None)
            .await
            .map_err(|e| self.failed("insert_many", e))?;

        let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|(index, _)| *index);
        Ok(ids.into_iter().map(|(_, id)| id).collect())
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, StoreError> {
        let result = self
            .inner
            .update_one(filter, update, None)
            .await
            .map_err(|e| self.failed("update_one", e))?;
        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn update_many(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, StoreError> {
        let result = self
            .inner
            .update_many(filter, update, None)
            .await
            .map_err(|e| self.failed("update_many", e))?;
        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn replace_one(
        &self,
        filter: Document,
        replacement: Document,
    ) -> Result<UpdateResult, StoreError> {
        let result = self
            .inner
            .replace_one(filter, replacement, None)
            .await
            .map_err(|e| self.failed("replace_one", e))?;
        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn find_one(
        &self,
        filter: Document,
        options: FindOneOptions,
    ) -> Result<Option<Document>, StoreError> {
        let mut driver_options = mongodb::options::FindOneOptions::default();
        driver_options.sort = options.sort;
        driver_options.skip = options.skip;

        self.inner
            .find_one(filter, driver_options)
            .await
            .map_err(|e| self.failed("find_one", e))
    }

    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> Result<DocumentCursor, StoreError> {
        let mut driver_options = mongodb::options::FindOptions::default();
        driver_options.sort = options.sort;
        driver_options.skip = options.skip;
        driver_options.limit = options.limit;

        let cursor = self
            .inner
            .find(filter, driver_options)
            .await
            .map_err(|e| self.failed("find", e))?;

        let name = self.name.clone();
        Ok(cursor
            .map(move |item| item.map_err(|e| StoreError::store_operation(&name, "find", e)))
            .boxed())
    }

    async fn count_documents(&self, filter: Document) -> Result<u64, StoreError> {
        self.inner
            .count_documents(filter, None)
            .await
            .map_err(|e| self.failed("count_documents", e))
    }

    async fn delete_one(&self, filter: Document) -> Result<DeleteResult, StoreError> {
        let result = self
            .inner
            .delete_one(filter, None)
            .await
            .map_err(|e| self.failed("delete_one", e))?;
        Ok(DeleteResult {
            deleted_count: result.deleted_count,
        })
    }

    async fn delete_many(&self, filter: Document) -> Result<DeleteResult, StoreError> {
        let result = self
            .inner
            .delete_many(filter, None)
            .await
            .map_err(|e| self.failed("delete_many", e))?;
        Ok(DeleteResult {
            deleted_count: result.deleted_count,
        })
    }
}
