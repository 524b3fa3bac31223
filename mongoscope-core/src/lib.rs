//! Core analysis engine for mongoscope, a MongoDB desktop admin tool.
//!
//! This crate holds the parts of the tool with real algorithmic content:
//! schema inference over sampled documents from schemaless collections.
//! Connection panels, document browsing, and the rest of the desktop UI
//! live in other workspace members and consume this crate through
//! [`analyzer::SchemaAnalyzer`] and the [`source::DocumentSource`] seam.
//!
//! # Architecture
//! - `source`: narrow read-only document access (driver-backed or stub)
//! - `schema`: the inference engine — type resolution, field observation,
//!   flat aggregation, nested shape building, and caching
//! - `analyzer`: session-scoped facade tying the pieces together
//!
//! Analysis is synchronous per call over a bounded, pre-fetched sample
//! (default 100 documents); there is no streaming and no persistence of
//! inferred schemas beyond the in-memory cache.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod logging;
pub mod schema;
pub mod source;

// Re-export commonly used types
pub use analyzer::SchemaAnalyzer;
pub use config::SamplingConfig;
pub use error::{MongoscopeError, Result};
pub use schema::{
    CollectionShape, DatabaseExport, FieldStat, SchemaCache, SchemaResult, ShapeNode, TypeTag,
};
pub use source::{DocumentSource, MongoSource};
