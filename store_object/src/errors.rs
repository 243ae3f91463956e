use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Failure reported by the underlying store client, passed through untranslated
    #[error("Store error during {operation} on '{collection}': {source}")]
    Store {
        collection: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid id: '{0}'")]
    InvalidId(String),

    #[error("Primary key '{0}' is missing from the record")]
    MissingPrimaryKey(String),

    #[error("Duplicate key error on '{collection}': {key}")]
    DuplicateKey { collection: String, key: String },

    #[error("Performing an update on '{0}' would modify an immutable field")]
    ImmutableField(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{operation} on '{collection}' timed out after {millis}ms")]
    Timeout {
        collection: String,
        operation: String,
        millis: u128,
    },
}

impl StoreError {
    pub fn store_operation<E>(collection: &str, operation: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store {
            collection: collection.to_string(),
            operation: operation.to_string(),
            source: Box::new(source),
        }
    }
}

impl From<bson::ser::Error> for StoreError {
    fn from(e: bson::ser::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<bson::de::Error> for StoreError {
    fn from(e: bson::de::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
