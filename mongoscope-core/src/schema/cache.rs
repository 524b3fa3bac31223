//! Memoization of analysis results.
//!
//! One [`SchemaCache`] lives for the application session and is shared by
//! every caller that needs field metadata. The surrounding app may invoke
//! analysis from background workers, so the maps are mutex-guarded; the
//! cache itself never contacts the document source.

use super::aggregate::SchemaResult;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Session-scoped cache of schema analysis results.
///
/// Flat schemas are cached per `"db.collection"` key. Per-field value
/// lists are derived lazily from the cached schema's suggestions and
/// cached alongside; nested export shapes are never cached.
#[derive(Debug, Default)]
pub struct SchemaCache {
    schemas: Mutex<HashMap<String, Arc<SchemaResult>>>,
    field_values: Mutex<HashMap<String, HashMap<String, Vec<String>>>>,
}

fn cache_key(database: &str, collection: &str) -> String {
    format!("{database}.{collection}")
}

impl SchemaCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached schema for a collection, if present.
    pub fn get(&self, database: &str, collection: &str) -> Option<Arc<SchemaResult>> {
        let schemas = self.schemas.lock().unwrap_or_else(PoisonError::into_inner);
        schemas.get(&cache_key(database, collection)).cloned()
    }

    /// Stores a schema for a collection, replacing any previous entry.
    pub fn insert(&self, database: &str, collection: &str, schema: Arc<SchemaResult>) {
        let mut schemas = self.schemas.lock().unwrap_or_else(PoisonError::into_inner);
        schemas.insert(cache_key(database, collection), schema);
    }

    /// Returns the suggestion list for one field, truncated to `limit`.
    ///
    /// Derives from the cached schema's `value_suggestions` on first
    /// access and memoizes the derivation; never re-queries the source.
    /// Returns an empty list when no schema is cached or the field is
    /// unknown.
    pub fn field_values(
        &self,
        database: &str,
        collection: &str,
        field: &str,
        limit: usize,
    ) -> Vec<String> {
        let key = cache_key(database, collection);

        {
            let values = self
                .field_values
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = values.get(&key).and_then(|fields| fields.get(field)) {
                return cached.iter().take(limit).cloned().collect();
            }
        }

        // Only memoize once a schema exists; an empty answer before
        // analysis must not shadow a later real one.
        let Some(schema) = self.get(database, collection) else {
            return Vec::new();
        };

        let derived = schema
            .field_stats
            .get(field)
            .map(|stat| stat.value_suggestions.clone())
            .unwrap_or_default();

        let mut values = self
            .field_values
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        values
            .entry(key)
            .or_default()
            .insert(field.to_string(), derived.clone());

        derived.into_iter().take(limit).collect()
    }

    /// Removes the entries for one collection. Missing keys are a no-op.
    pub fn invalidate(&self, database: &str, collection: &str) {
        let key = cache_key(database, collection);
        self.schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        self.field_values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        tracing::debug!("Cleared schema cache for {}", key);
    }

    /// Empties the whole cache.
    pub fn clear(&self) {
        self.schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.field_values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::debug!("Cleared all schema caches");
    }

    /// Number of cached collection schemas.
    pub fn len(&self) -> usize {
        self.schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
