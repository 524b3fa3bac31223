//! Schema inference over sampled MongoDB documents.
//!
//! # Module Structure
//! - `types`: BSON value classification and type-set resolution
//! - `observe`: per-document field observation walker
//! - `aggregate`: flat, ranked schema aggregation for filter UI
//! - `shape`: nested export-schema builder
//! - `cache`: session-scoped memoization of analysis results
//!
//! Two independent computation paths exist on purpose: the flat
//! aggregator feeds interactive filter building, while the shape builder
//! feeds schema export. They walk the same samples but produce different
//! outputs, and only the flat path is cached.

pub mod aggregate;
pub mod cache;
pub mod observe;
pub mod shape;
pub mod types;

pub use aggregate::{FieldStat, SchemaResult, VALUE_SUGGESTION_LIMIT, aggregate};
pub use cache::SchemaCache;
pub use observe::{ARRAY_SAMPLE_LIMIT, FieldObservation, ObservationTable, observe_document};
pub use shape::{CollectionShape, DatabaseExport, ShapeNode, build_collection_shape};
pub use types::{TypeTag, bson_type_name, resolve, type_tag};
