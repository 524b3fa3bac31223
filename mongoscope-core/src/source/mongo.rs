//! Driver-backed document source.
//!
//! Wraps a `mongodb::Client` behind the [`DocumentSource`] seam. All
//! operations are read-only, and connection strings are redacted in
//! every error and log message. Timeouts are left to the driver's own
//! connection options.

use super::DocumentSource;
use crate::Result;
use crate::error::{MongoscopeError, redact_database_url};
use async_trait::async_trait;
use mongodb::Client;
use mongodb::bson::{Document, doc};
use mongodb::options::{ClientOptions, FindOptions};

/// MongoDB-backed document source.
pub struct MongoSource {
    client: Client,
    /// Original connection URL (kept private to prevent credential exposure)
    connection_url: String,
}

impl std::fmt::Debug for MongoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoSource")
            .field("url", &redact_database_url(&self.connection_url))
            .finish()
    }
}

impl MongoSource {
    /// Connects to a MongoDB server.
    ///
    /// # Errors
    /// Returns error if the connection string is malformed or client
    /// creation fails. The connection string is redacted in all error
    /// messages.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let options = ClientOptions::parse(connection_string).await.map_err(|e| {
            MongoscopeError::connection_failed(
                format!(
                    "Invalid MongoDB connection string: {}",
                    redact_database_url(connection_string)
                ),
                e,
            )
        })?;

        let client = Client::with_options(options).map_err(|e| {
            MongoscopeError::connection_failed(
                format!(
                    "Failed to create MongoDB client for {}",
                    redact_database_url(connection_string)
                ),
                e,
            )
        })?;

        Ok(Self {
            client,
            connection_url: connection_string.to_string(),
        })
    }

    /// Verifies the connection with a `ping` command.
    ///
    /// # Errors
    /// Returns error if the server is unreachable.
    pub async fn test_connection(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| {
                MongoscopeError::connection_failed(
                    format!(
                        "Ping failed for {}",
                        redact_database_url(&self.connection_url)
                    ),
                    e,
                )
            })?;
        Ok(())
    }

    /// The underlying driver client, for collaborators outside the
    /// schema engine (query execution, CRUD panels).
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl DocumentSource for MongoSource {
    async fn find_documents(
        &self,
        database: &str,
        collection: &str,
        filter: Option<Document>,
        limit: u32,
        skip: u64,
    ) -> Result<Vec<Document>> {
        let coll = self
            .client
            .database(database)
            .collection::<Document>(collection);

        let options = FindOptions::builder()
            .limit(i64::from(limit))
            .skip(skip)
            .build();

        let mut cursor = coll
            .find(filter.unwrap_or_default())
            .with_options(options)
            .await
            .map_err(|e| {
                MongoscopeError::sampling_failed(
                    format!("Failed to query documents from '{database}.{collection}'"),
                    e,
                )
            })?;

        let mut documents = Vec::new();
        while cursor.advance().await.map_err(|e| {
            MongoscopeError::sampling_failed(
                format!("Failed to iterate cursor for '{database}.{collection}'"),
                e,
            )
        })? {
            let document = cursor.deserialize_current().map_err(|e| {
                MongoscopeError::sampling_failed(
                    format!("Failed to deserialize document from '{database}.{collection}'"),
                    e,
                )
            })?;
            documents.push(document);
        }

        tracing::debug!(
            "Fetched {} documents from {}.{} (limit {})",
            documents.len(),
            database,
            collection,
            limit
        );

        Ok(documents)
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<String>> {
        let names = self
            .client
            .database(database)
            .list_collection_names()
            .await
            .map_err(|e| {
                MongoscopeError::sampling_failed(
                    format!("Failed to list collections in database '{database}'"),
                    e,
                )
            })?;

        let collections: Vec<String> = names
            .into_iter()
            .filter(|name| !name.starts_with("system."))
            .collect();

        tracing::debug!(
            "Listed {} collections in database '{}'",
            collections.len(),
            database
        );

        Ok(collections)
    }
}
