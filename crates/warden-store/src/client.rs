//! MongoDB client construction and the shared store handle.
use crate::errors::{StoreError, StoreResult};
use crate::repo::{self, OPERATION_TIMEOUT};
use crate::rule::CasbinRule;
use mongodb::bson::{Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use std::time::Duration;

pub const DEFAULT_URL: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE: &str = "casbin";
pub const DEFAULT_COLLECTION: &str = "casbin_rule";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
    pub collection: String,
    pub connect_timeout: Duration,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Cloneable handle to the policy database.
#[derive(Clone, Debug)]
pub struct MongoStore {
    database: Database,
    collection: String,
}

impl MongoStore {
    /// Connect and verify the server answers a ping.
    ///
    /// # Errors
    /// - Invalid connection strings and unreachable servers surface as
    ///   [`StoreError::Driver`] or [`StoreError::Timeout`].
    pub async fn connect(config: &MongoConfig) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(&config.url)
            .await
            .map_err(|source| StoreError::Driver {
                operation: "parse_uri",
                source,
            })?;
        options.app_name = Some("warden".to_string());
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.connect_timeout);
        let client = Client::with_options(options).map_err(|source| StoreError::Driver {
            operation: "client",
            source,
        })?;
        let store = Self::from_client(client, &config.database, &config.collection);
        store.ping().await?;
        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "connected to mongodb"
        );
        Ok(store)
    }

    /// Wrap an existing client without contacting the server.
    pub fn from_client(client: Client, database: &str, collection: &str) -> Self {
        Self {
            database: client.database(database),
            collection: collection.to_string(),
        }
    }

    /// Database holding the policy collection.
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Typed handle to the policy row collection.
    pub fn rules(&self) -> Collection<CasbinRule> {
        self.database.collection::<CasbinRule>(&self.collection)
    }

    /// Typed handle to any other collection in the policy database.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.database.collection::<T>(name)
    }

    /// Run `{ ping: 1 }` against the policy database.
    ///
    /// # What it does
    /// Round-trips one command to confirm the server is reachable.
    ///
    /// # Errors
    /// - [`StoreError::Timeout`] after [`OPERATION_TIMEOUT`].
    /// - [`StoreError::Driver`] for connection or server failures.
    pub async fn ping(&self) -> StoreResult<()> {
        repo::bounded(
            self.database.name(),
            "ping",
            OPERATION_TIMEOUT,
            self.database.run_command(doc! { "ping": 1 }, None),
        )
        .await
        .map(|_: Document| ())
    }

    /// Number of rows in the policy collection.
    pub async fn rule_count(&self) -> StoreResult<u64> {
        repo::count_documents(&self.rules(), Document::new(), None).await
    }
}
