//! Store client seam
//!
//! The repository talks to the document store only through these traits. Connection
//! management, authentication and the wire protocol belong to the implementations.

use crate::errors::StoreError;
use async_trait::async_trait;
use bson::{Bson, Document};
use futures::stream::BoxStream;
use std::sync::Arc;

/// Stream of documents produced by a query.
///
/// Dropping the cursor releases the server-side resources it holds.
pub type DocumentCursor = BoxStream<'static, Result<Document, StoreError>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Option<Document>,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOneOptions {
    pub sort: Option<Document>,
    pub skip: Option<u64>,
}

/// An already connected client for one logical connection
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Handle to a collection of the given database
    fn collection(&self, database: &str, name: &str) -> Arc<dyn StoreCollection>;

    /// Round trip to the server to verify the connection
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Operations on one collection
#[async_trait]
pub trait StoreCollection: Send + Sync {
    fn name(&self) -> &str;

    /// Insert one document, returning the id the store assigned or kept
    async fn insert_one(&self, document: Document) -> Result<Bson, StoreError>;

    /// Insert a batch, returning the ids in input order
    async fn insert_many(&self, documents: Vec<Document>) -> Result<Vec<Bson>, StoreError>;

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, StoreError>;

    async fn update_many(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, StoreError>;

    async fn replace_one(
        &self,
        filter: Document,
        replacement: Document,
    ) -> Result<UpdateResult, StoreError>;

    async fn find_one(
        &self,
        filter: Document,
        options: FindOneOptions,
    ) -> Result<Option<Document>, StoreError>;

    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> Result<DocumentCursor, StoreError>;

    async fn count_documents(&self, filter: Document) -> Result<u64, StoreError>;

    async fn delete_one(&self, filter: Document) -> Result<DeleteResult, StoreError>;

    async fn delete_many(&self, filter: Document) -> Result<DeleteResult, StoreError>;
}
