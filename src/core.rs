//! Core DocHaus functionality
//!
//! This module contains the connection registry: it turns configuration into connected
//! store clients, caches one client per logical connection and hands out repositories
//! bound to the right client, database and collection.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use store_object::{MemoryStore, Record, Repository, StoreClient, StoreError};
use tokio::sync::{Mutex, OnceCell};

use crate::errors::DocHausError;
use config::{ConfigSource, ConnectionConfig, TomlSource};

/// Store kind segment of the configuration keys (`database.mongo.<connection>.*`)
pub const STORE_KIND: &str = "mongo";

/// Opens a client for a connection URI
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, uri: &str) -> Result<Arc<dyn StoreClient>, StoreError>;
}

/// Connector backed by in-process memory stores, one per URI
#[derive(Debug, Default, Clone)]
pub struct MemoryConnector {
    stores: Arc<Mutex<HashMap<String, MemoryStore>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, uri: &str) -> Result<Arc<dyn StoreClient>, StoreError> {
        let mut stores = self.stores.lock().await;
        let store = stores.entry(uri.to_string()).or_default().clone();
        Ok(Arc::new(store))
    }
}

/// Connector for MongoDB deployments
#[cfg(feature = "mongodb")]
#[derive(Debug, Default, Clone, Copy)]
pub struct MongoConnector;

#[cfg(feature = "mongodb")]
#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&self, uri: &str) -> Result<Arc<dyn StoreClient>, StoreError> {
        let client = store_object::MongoClient::connect(&driver_uri(uri)).await?;
        Ok(Arc::new(client))
    }
}

/// Drop the `charset` query option, which the MongoDB driver rejects as unknown
pub fn driver_uri(uri: &str) -> String {
    let Some((base, query)) = uri.split_once('?') else {
        return uri.to_string();
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            !pair.is_empty() && !key.eq_ignore_ascii_case("charset")
        })
        .collect();

    if kept.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, kept.join("&"))
    }
}

/// Main DocHaus registry that manages store clients per logical connection
pub struct DocHaus {
    source: Arc<dyn ConfigSource>,
    connector: Arc<dyn Connector>,
    clients: Mutex<HashMap<String, Arc<OnceCell<Arc<dyn StoreClient>>>>>,
}

impl std::fmt::Debug for DocHaus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocHaus").finish_non_exhaustive()
    }
}

impl DocHaus {
    /// Create a registry over a configuration source. No connection is opened yet.
    pub fn new<S, C>(source: S, connector: C) -> Self
    where
        S: ConfigSource + 'static,
        C: Connector + 'static,
    {
        Self {
            source: Arc::new(source),
            connector: Arc::new(connector),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Create a registry from `.env` and the TOML file `TomlSource::load` finds
    pub fn from_env<C: Connector + 'static>(connector: C) -> Result<Self, DocHausError> {
        Ok(Self::new(TomlSource::load()?, connector))
    }

    /// Settings of a logical connection
    pub fn connection_config(&self, connection: &str) -> Result<ConnectionConfig, DocHausError> {
        Ok(ConnectionConfig::from_source(
            self.source.as_ref(),
            STORE_KIND,
            connection,
        )?)
    }

    /// Configured database name of a logical connection
    pub fn database(&self, connection: &str) -> Result<String, DocHausError> {
        Ok(self.connection_config(connection)?.database)
    }

    /// Get the client of a logical connection, connecting on first use.
    ///
    /// Each connection has its own slot. The first caller builds the URI, connects and
    /// pings; concurrent callers of the same connection wait for it and share the result,
    /// while other connections are not held up. Failures are logged and returned, and the
    /// slot stays empty, so a later call tries again.
    pub async fn client(&self, connection: &str) -> Result<Arc<dyn StoreClient>, DocHausError> {
        let slot = self
            .clients
            .lock()
            .await
            .entry(connection.to_string())
            .or_default()
            .clone();

        if let Some(client) = slot.get() {
            crate::debug_log!(connection, "store client cache hit");
            return Ok(client.clone());
        }

        let client = slot
            .get_or_try_init(|| async {
                crate::debug_log!(connection, "store client cache miss, connecting");
                let uri = self.connection_config(connection)?.connection_string();
                let client = self
                    .connector
                    .connect(&uri)
                    .await
                    .map_err(|e| connection_failed(connection, "connect", e))?;
                client
                    .ping()
                    .await
                    .map_err(|e| connection_failed(connection, "ping", e))?;
                Ok::<_, DocHausError>(client)
            })
            .await?;
        Ok(client.clone())
    }

    /// Seed the cache with an already connected client
    pub async fn register_client(&self, connection: &str, client: Arc<dyn StoreClient>) {
        self.clients
            .lock()
            .await
            .insert(connection.to_string(), Arc::new(OnceCell::new_with(Some(client))));
    }

    /// Logical connections with a cached client
    pub async fn connections(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .clients
            .lock()
            .await
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Repository for `T`, routed by `T::connection()` and `T::collection()`
    pub async fn repository<T: Record>(&self) -> Result<Repository<T>, DocHausError> {
        let client = self.client(T::connection()).await?;
        let database = self.database(T::connection())?;
        Ok(Repository::from_client(client.as_ref(), &database))
    }
}

fn connection_failed(connection: &str, stage: &str, error: StoreError) -> DocHausError {
    tracing::error!(connection, stage, error = %error, "store connection failed");
    DocHausError::Connection {
        connection: connection.to_string(),
        message: format!("{} failed: {}", stage, error),
    }
}
