use crate::errors::StoreError;
use crate::resolver::PrimaryKey;
use crate::traits::{Record, StoreClient, StoreCollection};
use bson::{Bson, Document};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Repository handle for one record type and one collection.
///
/// Handles are cheap to create and clone; the store client behind them is shared.
/// The repository keeps no state of its own between calls, so a handle can be used
/// from several tasks at once.
pub struct Repository<T: Record> {
    pub(crate) collection: Arc<dyn StoreCollection>,
    pub(crate) pk: PrimaryKey,
    pub(crate) timeout: Option<Duration>,
    pub(crate) _phantom: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            pk: self.pk.clone(),
            timeout: self.timeout,
            _phantom: PhantomData,
        }
    }
}

impl<T: Record> std::fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &self.collection.name())
            .field("pk_field", &self.pk.field())
            .field("pk_tag", &self.pk.tag())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<T: Record> Repository<T> {
    pub fn new(collection: Arc<dyn StoreCollection>) -> Self {
        Self {
            collection,
            pk: PrimaryKey::default(),
            timeout: None,
            _phantom: PhantomData,
        }
    }

    /// Bind to `T::collection()` in `database` of an already connected client
    pub fn from_client(client: &dyn StoreClient, database: &str) -> Self {
        Self::new(client.collection(database, T::collection()))
    }

    /// Override the primary-key field name and storage tag
    pub fn set_pk(&mut self, field: &str, tag: &str) {
        self.pk = PrimaryKey::new(field, tag);
    }

    pub fn with_pk(mut self, field: &str, tag: &str) -> Self {
        self.set_pk(field, tag);
        self
    }

    /// Effective `(field, tag)` pair, defaults included
    pub fn pk(&self) -> (&str, &str) {
        (self.pk.field(), self.pk.tag())
    }

    /// Primary-key value of a record, read under the bound storage tag
    pub fn pk_value(&self, record: &T) -> Result<Bson, StoreError> {
        self.pk.value_of(&encode(record)?)
    }

    /// Abort store calls that take longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    /// Run one store round trip under the configured timeout
    pub(crate) async fn run<F, R>(&self, operation: &str, call: F) -> Result<R, StoreError>
    where
        F: Future<Output = Result<R, StoreError>>,
    {
        crate::trace_log!(collection = self.collection.name(), operation, "store call");
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                StoreError::Timeout {
                    collection: self.collection.name().to_string(),
                    operation: operation.to_string(),
                    millis: limit.as_millis(),
                }
            })?,
            None => call.await,
        }
    }
}

pub(crate) fn encode<T: Record>(record: &T) -> Result<Document, StoreError> {
    Ok(bson::to_document(record)?)
}

pub(crate) fn decode<T: Record>(document: Document) -> Result<T, StoreError> {
    Ok(bson::from_document(document)?)
}

/// String form of a store id: hex for object ids, the raw text for strings
pub(crate) fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}
