//! Flat schema aggregation.
//!
//! Turns a completed [`ObservationTable`] into the ranked, flat
//! [`SchemaResult`] that drives the filter-building UI: one
//! [`FieldStat`] per dotted field path, ordered by presence rate.

use super::observe::ObservationTable;
use super::types::resolve;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How many value suggestions a field carries.
pub const VALUE_SUGGESTION_LIMIT: usize = 10;

/// Per-field statistics derived from the sampled documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStat {
    /// Dotted field path
    pub name: String,
    /// Resolved type for the field
    #[serde(rename = "type")]
    pub field_type: String,
    /// Fraction of sampled documents containing this field, in `[0, 1]`
    pub presence_rate: f64,
    /// Most frequent primitive values, stringified, nulls excluded
    pub value_suggestions: Vec<String>,
    /// Count of distinct non-null primitive values observed
    pub unique_values: usize,
}

/// Flat schema for one collection.
///
/// `fields` is ordered by presence rate descending; ties keep the order
/// in which the fields were first observed. `field_stats` carries the
/// entries keyed by path for direct lookup, including the array-element
/// value counters (`tags[item]`) that the ranked list leaves out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SchemaResult {
    /// Number of documents that were sampled
    pub total_documents: usize,
    /// Ranked field statistics
    pub fields: Vec<FieldStat>,
    /// Field statistics keyed by path
    pub field_stats: HashMap<String, FieldStat>,
}

impl SchemaResult {
    /// The empty result used for empty collections and source failures.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Names of all fields in ranked order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

/// Aggregates a completed observation table into a [`SchemaResult`].
///
/// `total_documents == 0` short-circuits to the empty result so presence
/// rates never divide by zero. Value-only entries (the `field[item]`
/// counters, recognizable by their empty type set) go into `field_stats`
/// for suggestion lookups but stay out of the ranked `fields` list.
pub fn aggregate(table: &ObservationTable, total_documents: usize) -> SchemaResult {
    if total_documents == 0 {
        return SchemaResult::empty();
    }

    #[allow(clippy::cast_precision_loss)]
    let total = total_documents as f64;

    let mut stats: Vec<(FieldStat, bool)> = table
        .entries()
        .map(|(path, obs)| {
            #[allow(clippy::cast_precision_loss)]
            let presence_rate = obs.presence_count as f64 / total;
            let stat = FieldStat {
                name: path.clone(),
                field_type: resolve(&obs.observed_types).to_string(),
                presence_rate,
                value_suggestions: obs.values.top(VALUE_SUGGESTION_LIMIT),
                unique_values: obs.values.distinct(),
            };
            (stat, !obs.observed_types.is_empty())
        })
        .collect();

    // `entries()` yields first-observed order, and the sort is stable,
    // so equal presence rates keep that order.
    stats.sort_by(|a, b| {
        b.0.presence_rate
            .partial_cmp(&a.0.presence_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let field_stats = stats
        .iter()
        .map(|(stat, _)| (stat.name.clone(), stat.clone()))
        .collect();

    let fields = stats
        .into_iter()
        .filter_map(|(stat, ranked)| ranked.then_some(stat))
        .collect();

    SchemaResult {
        total_documents,
        fields,
        field_stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::observe::observe_document;
    use mongodb::bson::{Bson, doc};

    fn analyze(docs: &[mongodb::bson::Document]) -> SchemaResult {
        let mut table = ObservationTable::new();
        for doc in docs {
            observe_document(&mut table, doc);
        }
        aggregate(&table, docs.len())
    }

    #[test]
    fn test_presence_rates() {
        let schema = analyze(&[
            doc! { "always": 1, "sometimes": "a" },
            doc! { "always": 2 },
            doc! { "always": 3, "sometimes": "b" },
        ]);

        let always = &schema.field_stats["always"];
        assert!((always.presence_rate - 1.0).abs() < f64::EPSILON);

        let sometimes = &schema.field_stats["sometimes"];
        assert!((sometimes.presence_rate - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_type_precedence_int_over_string() {
        let schema = analyze(&[doc! { "a": 1 }, doc! { "a": 1 }, doc! { "a": "x" }]);
        assert_eq!(schema.field_stats["a"].field_type, "int");
    }

    #[test]
    fn test_value_suggestions_capped_and_null_free() {
        let mut docs = Vec::new();
        for i in 0..15 {
            docs.push(doc! { "n": i });
        }
        docs.push(doc! { "n": Bson::Null });

        let schema = analyze(&docs);
        let stat = &schema.field_stats["n"];
        assert_eq!(stat.value_suggestions.len(), VALUE_SUGGESTION_LIMIT);
        assert!(stat.value_suggestions.iter().all(|v| v != "null"));
        // Nulls are not distinct primitive values
        assert_eq!(stat.unique_values, 15);
    }

    #[test]
    fn test_unique_values_counts_distinct() {
        let schema = analyze(&[
            doc! { "color": "red" },
            doc! { "color": "red" },
            doc! { "color": "blue" },
        ]);
        assert_eq!(schema.field_stats["color"].unique_values, 2);
        assert_eq!(
            schema.field_stats["color"].value_suggestions,
            vec!["red", "blue"]
        );
    }

    #[test]
    fn test_sorted_by_presence_stable_on_ties() {
        let schema = analyze(&[
            doc! { "zeta": 1, "alpha": 2, "rare": 3 },
            doc! { "zeta": 1, "alpha": 2 },
        ]);

        let names = schema.field_names();
        // zeta and alpha tie at 1.0; first-observed order breaks the tie
        assert_eq!(names, ["zeta", "alpha", "rare"]);
    }

    #[test]
    fn test_empty_sample() {
        let schema = analyze(&[]);
        assert_eq!(schema.total_documents, 0);
        assert!(schema.fields.is_empty());
        assert!(schema.field_stats.is_empty());
    }

    #[test]
    fn test_array_item_entries_stay_out_of_ranking() {
        let schema = analyze(&[doc! { "tags": ["a", "b"] }]);

        // The element-value counter never appears as a field of its own
        assert_eq!(schema.field_names(), ["tags"]);

        // but still backs value-suggestion lookups by path
        let items = &schema.field_stats["tags[item]"];
        assert!((items.presence_rate - 0.0).abs() < f64::EPSILON);
        assert_eq!(items.unique_values, 2);
        assert_eq!(items.value_suggestions, vec!["a", "b"]);
    }

    #[test]
    fn test_serialization_shape() {
        let schema = analyze(&[doc! { "a": 1 }]);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["total_documents"], 1);
        assert_eq!(json["fields"][0]["name"], "a");
        assert_eq!(json["fields"][0]["type"], "int");
    }
}
