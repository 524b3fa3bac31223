//! Nested export-schema builder.
//!
//! Independent of the flat aggregator, this walks sampled documents and
//! builds a nested shape mirroring document structure, for human-readable
//! schema export. A shape is a tree: leaves are type-name strings, objects
//! are maps of field name to shape, and arrays are single-element lists
//! describing the element shape.
//!
//! Array handling intentionally mirrors the tool's documented behavior:
//! for arrays of primitives only the first element's type is inspected,
//! and for arrays of objects up to the first 5 elements per document are
//! merged into one shared map.

use super::observe::ARRAY_SAMPLE_LIMIT;
use super::types::bson_type_name;
use crate::Result;
use crate::error::MongoscopeError;
use chrono::{DateTime, Utc};
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One node in a nested collection shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShapeNode {
    /// Leaf type name, e.g. `"int"` or `"ObjectId"`
    Scalar(String),
    /// Array shape; always a single element describing the elements
    Array(Vec<ShapeNode>),
    /// Nested document shape
    Object(BTreeMap<String, ShapeNode>),
}

impl ShapeNode {
    fn scalar(name: &str) -> Self {
        ShapeNode::Scalar(name.to_string())
    }
}

/// Nested shape of one collection: field name to shape node.
pub type CollectionShape = BTreeMap<String, ShapeNode>;

/// Builds the nested shape of a collection from its sampled documents.
///
/// Documents fold into the shape sequentially; when types disagree at a
/// path, the last document wins.
pub fn build_collection_shape(documents: &[Document]) -> CollectionShape {
    let mut shape = CollectionShape::new();
    for doc in documents {
        merge_document(doc, &mut shape);
    }
    shape
}

fn merge_document(doc: &Document, shape: &mut BTreeMap<String, ShapeNode>) {
    for (key, value) in doc {
        match value {
            Bson::Document(nested) => {
                // Reuse an existing object node so nested keys union
                // across documents; any previous non-object leaf at this
                // key is replaced.
                let entry = shape
                    .entry(key.clone())
                    .or_insert_with(|| ShapeNode::Object(BTreeMap::new()));
                if !matches!(entry, ShapeNode::Object(_)) {
                    *entry = ShapeNode::Object(BTreeMap::new());
                }
                if let ShapeNode::Object(inner) = entry {
                    merge_document(nested, inner);
                }
            }
            Bson::Array(items) => merge_array(key, items, shape),
            other => {
                shape.insert(key.clone(), ShapeNode::Scalar(shape_type_name(other)));
            }
        }
    }
}

fn merge_array(key: &str, items: &[Bson], shape: &mut BTreeMap<String, ShapeNode>) {
    let Some(first) = items.first() else {
        shape.insert(key.to_string(), ShapeNode::scalar("array"));
        return;
    };

    if matches!(first, Bson::Document(_)) {
        // Merge this document's first elements into one map...
        let mut merged = BTreeMap::new();
        for item in items.iter().take(ARRAY_SAMPLE_LIMIT) {
            if let Bson::Document(element) = item {
                merge_document(element, &mut merged);
            }
        }

        if merged.is_empty() {
            shape.insert(key.to_string(), ShapeNode::scalar("array"));
            return;
        }

        // ...then union with any earlier documents' merge at this key.
        // Collisions overwrite at key level rather than deep-merging.
        match shape.get_mut(key) {
            Some(ShapeNode::Array(existing)) if matches!(existing.first(), Some(ShapeNode::Object(_))) => {
                if let Some(ShapeNode::Object(target)) = existing.first_mut() {
                    for (k, v) in merged {
                        target.insert(k, v);
                    }
                }
            }
            _ => {
                shape.insert(key.to_string(), ShapeNode::Array(vec![ShapeNode::Object(merged)]));
            }
        }
    } else {
        // Array of primitives: only the first element's type is used;
        // heterogeneity beyond element 0 is ignored.
        shape.insert(
            key.to_string(),
            ShapeNode::Array(vec![ShapeNode::Scalar(shape_type_name(first))]),
        );
    }
}

/// Export-facing type name for a scalar BSON value.
///
/// Uses the export vocabulary (`"boolean"` rather than `"bool"`); values
/// outside the core model fall back to their native BSON type name.
fn shape_type_name(value: &Bson) -> String {
    match value {
        Bson::Null => "null".to_string(),
        Bson::ObjectId(_) => "ObjectId".to_string(),
        Bson::Boolean(_) => "boolean".to_string(),
        Bson::Int32(_) | Bson::Int64(_) => "int".to_string(),
        Bson::Double(_) => "float".to_string(),
        Bson::String(_) => "string".to_string(),
        Bson::DateTime(_) => "datetime".to_string(),
        Bson::Array(_) => "array".to_string(),
        other => bson_type_name(other).to_string(),
    }
}

/// Serializable envelope wrapped around a whole-database shape export.
///
/// File writing and alternative renderings (YAML, Markdown) belong to the
/// application's export layer; this only fixes the metadata the layer
/// wraps around the raw shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseExport {
    /// Database that was analyzed
    pub database: String,
    /// When the export was produced
    pub exported_at: DateTime<Utc>,
    /// Number of collections in the export
    pub total_collections: usize,
    /// Shape per collection
    pub collections: BTreeMap<String, CollectionShape>,
}

impl DatabaseExport {
    /// Wraps per-collection shapes in the export envelope.
    pub fn new(database: impl Into<String>, collections: BTreeMap<String, CollectionShape>) -> Self {
        Self {
            database: database.into(),
            exported_at: Utc::now(),
            total_collections: collections.len(),
            collections,
        }
    }

    /// Renders the export as pretty-printed JSON.
    ///
    /// This is the payload the export layer writes to disk; the YAML and
    /// Markdown renderings are derived from the same envelope elsewhere.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| MongoscopeError::Serialization {
            context: format!("export for database '{}'", self.database),
            source: e,
        })
    }
}
