//! Field observation walker.
//!
//! Walks sampled documents and accumulates per-field-path statistics:
//! presence counts, observed type tags, and bounded value-frequency
//! counters. Paths use dot notation for nested documents (`a.b.c`),
//! a positional suffix for document-valued array elements (`field[0]`),
//! and the shared pseudo-path `field[item]` for primitive array elements.
//!
//! Ordering of first observation is tracked explicitly (an ordinal per
//! field and per counted value) so downstream tie-breaking never depends
//! on hash-map iteration order.

use super::types::{TypeTag, type_tag};
use mongodb::bson::{Bson, Document};
use std::collections::{BTreeSet, HashMap};

/// How many leading array elements are inspected per document.
pub const ARRAY_SAMPLE_LIMIT: usize = 5;

/// A primitive value usable as a frequency-counter key.
///
/// Floats are keyed by bit pattern; `f64` itself is neither `Eq` nor
/// `Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveValue {
    /// Boolean value
    Bool(bool),
    /// Integer value (both BSON int widths collapse to i64)
    Int(i64),
    /// Float value, stored as raw bits
    Float(u64),
    /// String value
    Str(String),
}

impl PrimitiveValue {
    /// Extracts a counter key from a BSON value, if it is a countable
    /// primitive (bool, int, float, or string; null excluded).
    pub fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::Boolean(b) => Some(Self::Bool(*b)),
            Bson::Int32(i) => Some(Self::Int(i64::from(*i))),
            Bson::Int64(i) => Some(Self::Int(*i)),
            Bson::Double(f) => Some(Self::Float(f.to_bits())),
            Bson::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }
}

impl std::fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveValue::Bool(b) => write!(f, "{b}"),
            PrimitiveValue::Int(i) => write!(f, "{i}"),
            PrimitiveValue::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            PrimitiveValue::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Frequency counter over primitive values with insertion-order ties.
#[derive(Debug, Clone, Default)]
pub struct ValueCounter {
    counts: HashMap<PrimitiveValue, ValueCount>,
    next_slot: u32,
}

#[derive(Debug, Clone)]
struct ValueCount {
    count: u64,
    first_seen: u32,
}

impl ValueCounter {
    /// Records one occurrence of a primitive value.
    pub fn record(&mut self, value: PrimitiveValue) {
        let next_slot = &mut self.next_slot;
        let entry = self.counts.entry(value).or_insert_with(|| {
            let slot = *next_slot;
            *next_slot = next_slot.saturating_add(1);
            ValueCount {
                count: 0,
                first_seen: slot,
            }
        });
        entry.count = entry.count.saturating_add(1);
    }

    /// Number of distinct values recorded.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Returns the `n` most frequent values, stringified. Ties break on
    /// first-insertion order, so output is deterministic.
    pub fn top(&self, n: usize) -> Vec<String> {
        let mut entries: Vec<(&PrimitiveValue, &ValueCount)> = self.counts.iter().collect();
        entries.sort_by(|(_, a), (_, b)| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });
        entries
            .into_iter()
            .take(n)
            .map(|(value, _)| value.to_string())
            .collect()
    }
}

/// Accumulated observations for one field path.
#[derive(Debug, Clone)]
pub struct FieldObservation {
    /// Documents (or nested scopes) in which this path appeared
    pub presence_count: u64,
    /// Every type tag seen at this path
    pub observed_types: BTreeSet<TypeTag>,
    /// Frequency counter over primitive, non-null values
    pub values: ValueCounter,
    /// Ordinal of first observation, for stable output ordering
    pub first_seen: u32,
}

/// Mutable per-collection observation table keyed by field path.
#[derive(Debug, Default)]
pub struct ObservationTable {
    fields: HashMap<String, FieldObservation>,
    next_ordinal: u32,
}

impl ObservationTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates entries in first-observed order.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &FieldObservation)> {
        let mut entries: Vec<(&String, &FieldObservation)> = self.fields.iter().collect();
        entries.sort_by_key(|(_, obs)| obs.first_seen);
        entries.into_iter()
    }

    /// Number of distinct field paths observed.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when nothing has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up one path's observation.
    pub fn get(&self, path: &str) -> Option<&FieldObservation> {
        self.fields.get(path)
    }

    fn entry(&mut self, path: &str) -> &mut FieldObservation {
        let next_ordinal = &mut self.next_ordinal;
        self.fields
            .entry(path.to_string())
            .or_insert_with(|| {
                let ordinal = *next_ordinal;
                *next_ordinal = next_ordinal.saturating_add(1);
                FieldObservation {
                    presence_count: 0,
                    observed_types: BTreeSet::new(),
                    values: ValueCounter::default(),
                    first_seen: ordinal,
                }
            })
    }
}

/// Walks one sampled document, updating the observation table.
pub fn observe_document(table: &mut ObservationTable, doc: &Document) {
    observe_fields(table, doc, "");
}

fn observe_fields(table: &mut ObservationTable, doc: &Document, prefix: &str) {
    for (key, value) in doc {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        let obs = table.entry(&path);
        obs.presence_count = obs.presence_count.saturating_add(1);
        obs.observed_types.insert(type_tag(value));
        if let Some(primitive) = PrimitiveValue::from_bson(value) {
            obs.values.record(primitive);
        }

        match value {
            Bson::Document(nested) => observe_fields(table, nested, &path),
            Bson::Array(items) if !items.is_empty() => {
                for (index, item) in items.iter().take(ARRAY_SAMPLE_LIMIT).enumerate() {
                    match item {
                        Bson::Document(nested) => {
                            observe_fields(table, nested, &format!("{path}[{index}]"));
                        }
                        other => {
                            if let Some(primitive) = PrimitiveValue::from_bson(other) {
                                table.entry(&format!("{path}[item]")).values.record(primitive);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_presence_and_types() {
        let mut table = ObservationTable::new();
        observe_document(&mut table, &doc! { "a": 1, "b": "x" });
        observe_document(&mut table, &doc! { "a": "y" });

        let a = table.get("a").expect("a observed");
        assert_eq!(a.presence_count, 2);
        assert!(a.observed_types.contains(&TypeTag::Int));
        assert!(a.observed_types.contains(&TypeTag::String));

        let b = table.get("b").expect("b observed");
        assert_eq!(b.presence_count, 1);
    }

    #[test]
    fn test_nested_dot_paths() {
        let mut table = ObservationTable::new();
        observe_document(
            &mut table,
            &doc! { "profile": { "name": "Ada", "address": { "city": "London" } } },
        );

        assert!(table.get("profile").is_some());
        assert!(table.get("profile.name").is_some());
        assert!(table.get("profile.address.city").is_some());
        // Nesting produces dotted paths, not top-level keys
        assert!(table.get("name").is_none());
        assert!(table.get("city").is_none());
    }

    #[test]
    fn test_array_of_documents_positional_paths() {
        let mut table = ObservationTable::new();
        observe_document(
            &mut table,
            &doc! { "items": [ { "x": 1 }, { "y": 2 } ] },
        );

        assert!(table.get("items").is_some());
        assert!(table.get("items[0].x").is_some());
        assert!(table.get("items[1].y").is_some());
    }

    #[test]
    fn test_array_inspection_capped_at_five() {
        let mut table = ObservationTable::new();
        observe_document(
            &mut table,
            &doc! { "items": [
                { "n": 0 }, { "n": 1 }, { "n": 2 }, { "n": 3 }, { "n": 4 }, { "n": 5 }, { "n": 6 }
            ] },
        );

        assert!(table.get("items[4].n").is_some());
        assert!(table.get("items[5].n").is_none());
        assert!(table.get("items[6].n").is_none());
    }

    #[test]
    fn test_primitive_array_elements_share_pseudo_path() {
        let mut table = ObservationTable::new();
        observe_document(&mut table, &doc! { "tags": ["red", "blue"] });
        observe_document(&mut table, &doc! { "tags": ["red"] });

        let items = table.get("tags[item]").expect("pseudo path tracked");
        // All primitive elements across docs collapse into one counter
        assert_eq!(items.values.distinct(), 2);
        // The pseudo path carries no presence or type bookkeeping
        assert_eq!(items.presence_count, 0);
        assert!(items.observed_types.is_empty());
    }

    #[test]
    fn test_null_values_not_counted() {
        let mut table = ObservationTable::new();
        observe_document(&mut table, &doc! { "a": Bson::Null });

        let a = table.get("a").expect("a observed");
        assert_eq!(a.presence_count, 1);
        assert!(a.observed_types.contains(&TypeTag::Null));
        assert_eq!(a.values.distinct(), 0);
    }

    #[test]
    fn test_value_counter_top_order() {
        let mut counter = ValueCounter::default();
        for _ in 0..3 {
            counter.record(PrimitiveValue::Str("common".to_string()));
        }
        counter.record(PrimitiveValue::Str("first-tie".to_string()));
        counter.record(PrimitiveValue::Str("second-tie".to_string()));

        let top = counter.top(10);
        assert_eq!(top, vec!["common", "first-tie", "second-tie"]);
        assert_eq!(counter.top(1), vec!["common"]);
    }

    #[test]
    fn test_value_counter_mixed_primitives() {
        let mut counter = ValueCounter::default();
        counter.record(PrimitiveValue::Int(1));
        counter.record(PrimitiveValue::Str("1".to_string()));
        counter.record(PrimitiveValue::Bool(true));
        counter.record(PrimitiveValue::Float(1.5_f64.to_bits()));

        // int 1 and string "1" are distinct values
        assert_eq!(counter.distinct(), 4);
        let top = counter.top(10);
        assert!(top.contains(&"true".to_string()));
        assert!(top.contains(&"1.5".to_string()));
    }

    #[test]
    fn test_first_observed_order() {
        let mut table = ObservationTable::new();
        observe_document(&mut table, &doc! { "z": 1, "a": 2 });
        observe_document(&mut table, &doc! { "m": 3 });

        let order: Vec<&String> = table.entries().map(|(name, _)| name).collect();
        assert_eq!(order, ["z", "a", "m"]);
    }
}
