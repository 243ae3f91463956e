//! In-memory store backend
//!
//! A thread-safe, process-local implementation of the store client traits, used for
//! development and tests. Data lives as long as the last clone of the store.

mod matcher;

use crate::errors::StoreError;
use crate::traits::{
    DeleteResult, DocumentCursor, FindOneOptions, FindOptions, StoreClient, StoreCollection,
    UpdateResult,
};
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use matcher::{apply_replacement, apply_update, lookup, matches, sort_cmp};

type CollectionKey = (String, String);
type Collections = HashMap<CollectionKey, Vec<Document>>;

#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let collection_count = self.collections.read().map(|c| c.len()).unwrap_or(0);
        f.debug_struct("MemoryStore")
            .field("collections", &collection_count)
            .finish()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored documents of a collection, including soft-deleted ones
    pub fn documents(&self, database: &str, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .ok()
            .and_then(|c| c.get(&(database.to_string(), collection.to_string())).cloned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    fn collection(&self, database: &str, name: &str) -> Arc<dyn StoreCollection> {
        Arc::new(MemoryCollection {
            collections: self.collections.clone(),
            key: (database.to_string(), name.to_string()),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct MemoryCollection {
    collections: Arc<RwLock<Collections>>,
    key: CollectionKey,
}

impl MemoryCollection {
    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, StoreError> {
        self.collections
            .read()
            .map_err(|_| StoreError::Internal("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, StoreError> {
        self.collections
            .write()
            .map_err(|_| StoreError::Internal("memory store lock poisoned".into()))
    }

    /// Assign an `_id` if missing and reject duplicates
    fn insert_into(
        &self,
        documents: &mut Vec<Document>,
        document: Document,
    ) -> Result<Bson, StoreError> {
        let has_id = matches!(document.get("_id"), Some(id) if *id != Bson::Null);
        let document = if has_id {
            document
        } else {
            let mut with_id = doc! { "_id": ObjectId::new() };
            for (key, value) in document {
                if key != "_id" {
                    with_id.insert(key, value);
                }
            }
            with_id
        };
        let id = document.get("_id").cloned().unwrap_or(Bson::Null);

        if documents.iter().any(|d| d.get("_id") == Some(&id)) {
            return Err(StoreError::DuplicateKey {
                collection: self.key.1.clone(),
                key: id.to_string(),
            });
        }
        documents.push(document);
        Ok(id)
    }

    fn matching_positions(
        documents: &[Document],
        filter: &Document,
        first_only: bool,
    ) -> Result<Vec<usize>, StoreError> {
        let mut positions = Vec::new();
        for (index, document) in documents.iter().enumerate() {
            if matches(document, filter)? {
                positions.push(index);
                if first_only {
                    break;
                }
            }
        }
        Ok(positions)
    }

    fn update(
        &self,
        filter: &Document,
        update: &Document,
        first_only: bool,
    ) -> Result<UpdateResult, StoreError> {
        let mut collections = self.write()?;
        let documents = collections.entry(self.key.clone()).or_default();
        let positions = Self::matching_positions(documents, filter, first_only)?;

        let mut result = UpdateResult {
            matched_count: positions.len() as u64,
            modified_count: 0,
        };
        for index in positions {
            let mut updated = documents[index].clone();
            apply_update(&mut updated, update)?;
            if updated != documents[index] {
                documents[index] = updated;
                result.modified_count += 1;
            }
        }
        Ok(result)
    }

    fn delete(&self, filter: &Document, first_only: bool) -> Result<DeleteResult, StoreError> {
        let mut collections = self.write()?;
        let documents = collections.entry(self.key.clone()).or_default();
        let positions = Self::matching_positions(documents, filter, first_only)?;

        for index in positions.iter().rev() {
            documents.remove(*index);
        }
        Ok(DeleteResult {
            deleted_count: positions.len() as u64,
        })
    }

    /// Matching documents after sort and skip, limited to `limit` when positive
    fn select(
        &self,
        filter: &Document,
        sort: Option<&Document>,
        skip: Option<u64>,
        limit: Option<i64>,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.read()?;
        let mut selected = Vec::new();
        if let Some(documents) = collections.get(&self.key) {
            for document in documents {
                if matches(document, filter)? {
                    selected.push(document.clone());
                }
            }
        }
        drop(collections);

        if let Some(sort) = sort {
            let keys: Vec<(String, bool)> = sort
                .iter()
                .map(|(field, direction)| {
                    let descending = match direction {
                        Bson::Int32(d) => *d < 0,
                        Bson::Int64(d) => *d < 0,
                        Bson::Double(d) => *d < 0.0,
                        _ => false,
                    };
                    (field.clone(), descending)
                })
                .collect();
            selected.sort_by(|a, b| {
                keys.iter()
                    .map(|(field, descending)| {
                        let ordering = sort_cmp(lookup(a, field), lookup(b, field));
                        if *descending { ordering.reverse() } else { ordering }
                    })
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        let skip = skip.unwrap_or(0) as usize;
        let limit = match limit {
            Some(0) | None => usize::MAX,
            Some(n) => n.unsigned_abs() as usize,
        };
        Ok(selected.into_iter().skip(skip).take(limit).collect())
    }
}

#[async_trait]
impl StoreCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.key.1
    }

    async fn insert_one(&self, document: Document) -> Result<Bson, StoreError> {
        let mut collections = self.write()?;
        let documents = collections.entry(self.key.clone()).or_default();
        self.insert_into(documents, document)
    }

    async fn insert_many(&self, documents: Vec<Document>) -> Result<Vec<Bson>, StoreError> {
        let mut collections = self.write()?;
        let stored = collections.entry(self.key.clone()).or_default();
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            ids.push(self.insert_into(stored, document)?);
        }
        Ok(ids)
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, StoreError> {
        self.update(&filter, &update, true)
    }

    async fn update_many(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, StoreError> {
        self.update(&filter, &update, false)
    }

    async fn replace_one(
        &self,
        filter: Document,
        replacement: Document,
    ) -> Result<UpdateResult, StoreError> {
        let mut collections = self.write()?;
        let documents = collections.entry(self.key.clone()).or_default();
        let Some(&index) = Self::matching_positions(documents, &filter, true)?.first() else {
            return Ok(UpdateResult::default());
        };

        let replaced = apply_replacement(&documents[index], &replacement)?;
        let modified = replaced != documents[index];
        documents[index] = replaced;
        Ok(UpdateResult {
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn find_one(
        &self,
        filter: Document,
        options: FindOneOptions,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .select(&filter, options.sort.as_ref(), options.skip, Some(1))?
            .into_iter()
            .next())
    }

    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> Result<DocumentCursor, StoreError> {
        let documents = self.select(&filter, options.sort.as_ref(), options.skip, options.limit)?;
        Ok(futures::stream::iter(documents.into_iter().map(Ok)).boxed())
    }

    async fn count_documents(&self, filter: Document) -> Result<u64, StoreError> {
        Ok(self.select(&filter, None, None, None)?.len() as u64)
    }

    async fn delete_one(&self, filter: Document) -> Result<DeleteResult, StoreError> {
        self.delete(&filter, true)
    }

    async fn delete_many(&self, filter: Document) -> Result<DeleteResult, StoreError> {
        self.delete(&filter, false)
    }
}
