//! Collection and database schema analysis facade.
//!
//! [`SchemaAnalyzer`] ties the document source, the observation walker,
//! the aggregator, the shape builder, and the cache together behind the
//! handful of calls the UI layer makes. One analyzer lives per
//! application session.
//!
//! Error policy: UI callers never see analysis errors. A failed or empty
//! sample yields the empty [`SchemaResult`]; a failed collection during
//! database export yields an empty shape for that collection only.

use crate::config::SamplingConfig;
use crate::schema::aggregate::{SchemaResult, aggregate};
use crate::schema::cache::SchemaCache;
use crate::schema::observe::{ObservationTable, observe_document};
use crate::schema::shape::{CollectionShape, build_collection_shape};
use crate::source::DocumentSource;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Schema analysis entry point for the UI layer.
pub struct SchemaAnalyzer {
    source: Arc<dyn DocumentSource>,
    cache: SchemaCache,
    config: SamplingConfig,
}

impl std::fmt::Debug for SchemaAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaAnalyzer")
            .field("config", &self.config)
            .field("cached_schemas", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl SchemaAnalyzer {
    /// Creates an analyzer with the default sampling configuration.
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self::with_config(source, SamplingConfig::default())
    }

    /// Creates an analyzer with a custom sampling configuration.
    pub fn with_config(source: Arc<dyn DocumentSource>, config: SamplingConfig) -> Self {
        Self {
            source,
            cache: SchemaCache::new(),
            config,
        }
    }

    /// Analyzes one collection's flat schema, serving repeat requests
    /// from the cache.
    ///
    /// Source failures and empty collections produce the empty result.
    /// Empty results are not cached, so the next request retries.
    pub async fn analyze_collection(&self, database: &str, collection: &str) -> Arc<SchemaResult> {
        if let Some(cached) = self.cache.get(database, collection) {
            tracing::debug!("Returning cached schema for {}.{}", database, collection);
            return cached;
        }

        tracing::info!(
            "Analyzing schema for {}.{} (sample size: {})",
            database,
            collection,
            self.config.sample_size
        );

        let documents = match self
            .source
            .find_documents(database, collection, None, self.config.sample_size, 0)
            .await
        {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!(
                    "Schema analysis failed for {}.{}: {}",
                    database,
                    collection,
                    e
                );
                return Arc::new(SchemaResult::empty());
            }
        };

        if documents.is_empty() {
            tracing::warn!("No documents found in {}.{}", database, collection);
            return Arc::new(SchemaResult::empty());
        }

        let mut table = ObservationTable::new();
        for doc in &documents {
            observe_document(&mut table, doc);
        }
        let schema = Arc::new(aggregate(&table, documents.len()));

        tracing::info!(
            "Schema analysis completed for {}.{}: {} fields found",
            database,
            collection,
            schema.fields.len()
        );

        self.cache.insert(database, collection, Arc::clone(&schema));
        schema
    }

    /// Field names of a collection in ranked order.
    pub async fn field_names(&self, database: &str, collection: &str) -> Vec<String> {
        self.analyze_collection(database, collection)
            .await
            .field_names()
    }

    /// Resolved type of one field, if known.
    pub async fn field_type(
        &self,
        database: &str,
        collection: &str,
        field: &str,
    ) -> Option<String> {
        self.analyze_collection(database, collection)
            .await
            .field_stats
            .get(field)
            .map(|stat| stat.field_type.clone())
    }

    /// Common values for one field, truncated to `limit`.
    ///
    /// Derived from the cached analysis; never issues a separate query.
    pub async fn field_values(
        &self,
        database: &str,
        collection: &str,
        field: &str,
        limit: usize,
    ) -> Vec<String> {
        // Make sure an analysis exists before consulting the cache.
        let _ = self.analyze_collection(database, collection).await;
        self.cache.field_values(database, collection, field, limit)
    }

    /// Builds the nested export shape for every collection of a database.
    ///
    /// Always recomputes (never cached). A collection that fails to
    /// sample maps to an empty shape; a failed collection listing yields
    /// an empty map.
    pub async fn analyze_database(&self, database: &str) -> BTreeMap<String, CollectionShape> {
        tracing::info!("Analyzing database schema for {}", database);

        let collections = match self.source.list_collections(database).await {
            Ok(collections) => collections,
            Err(e) => {
                tracing::warn!("Failed to list collections in {}: {}", database, e);
                return BTreeMap::new();
            }
        };

        if collections.is_empty() {
            tracing::warn!("No collections found in database {}", database);
            return BTreeMap::new();
        }

        let mut database_shape = BTreeMap::new();

        for collection in collections {
            match self
                .source
                .find_documents(database, &collection, None, self.config.sample_size, 0)
                .await
            {
                Ok(documents) if documents.is_empty() => {
                    tracing::debug!("No documents in collection {}", collection);
                    database_shape.insert(collection, CollectionShape::new());
                }
                Ok(documents) => {
                    database_shape.insert(collection, build_collection_shape(&documents));
                }
                Err(e) => {
                    tracing::warn!("Failed to analyze collection {}: {}", collection, e);
                    database_shape.insert(collection, CollectionShape::new());
                }
            }
        }

        tracing::info!(
            "Database schema analysis completed for {}: {} collections",
            database,
            database_shape.len()
        );

        database_shape
    }

    /// Human-readable digest of a collection's schema for status displays.
    pub async fn schema_summary(&self, database: &str, collection: &str) -> String {
        let schema = self.analyze_collection(database, collection).await;

        if schema.fields.is_empty() {
            return "No fields found in collection".to_string();
        }

        let mut lines = vec![format!(
            "Collection Schema ({} documents):",
            schema.total_documents
        )];

        for field in schema.fields.iter().take(10) {
            lines.push(format!(
                "- {} ({}) - {:.1}% present",
                field.name,
                field.field_type,
                field.presence_rate * 100.0
            ));
        }

        if schema.fields.len() > 10 {
            lines.push(format!("... and {} more fields", schema.fields.len() - 10));
        }

        lines.join("\n")
    }

    /// Drops the cached schema for one collection.
    pub fn invalidate(&self, database: &str, collection: &str) {
        self.cache.invalidate(database, collection);
    }

    /// Drops every cached schema.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
