//! BSON value classification and type resolution.
//!
//! MongoDB collections routinely hold inconsistent types for the same field
//! across documents. This module classifies individual BSON values into
//! [`TypeTag`]s and resolves a set of observed tags down to the single tag
//! the rest of the tool reports for a field.

use mongodb::bson::Bson;
use std::collections::BTreeSet;

/// Classified type of a single field value.
///
/// Variants are declared in resolution-precedence order; see [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    /// MongoDB ObjectId
    ObjectId,
    /// Date and time (BSON DateTime or Timestamp)
    DateTime,
    /// Calendar date without a time component. BSON has no such type, but
    /// the tag keeps its slot in the precedence table so resolution order
    /// is stable if one ever arrives through a custom source.
    Date,
    /// 32- or 64-bit integer
    Int,
    /// Double-precision float
    Float,
    /// Boolean
    Bool,
    /// UTF-8 string
    String,
    /// Array of values
    Array,
    /// Embedded document
    Map,
    /// Explicit null
    Null,
    /// Any BSON type outside the core value model (binary, regex, etc.),
    /// carrying the native BSON type name
    Unknown(std::string::String),
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeTag::ObjectId => write!(f, "ObjectId"),
            TypeTag::DateTime => write!(f, "datetime"),
            TypeTag::Date => write!(f, "date"),
            TypeTag::Int => write!(f, "int"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::String => write!(f, "string"),
            TypeTag::Array => write!(f, "array"),
            TypeTag::Map => write!(f, "object"),
            TypeTag::Null => write!(f, "null"),
            TypeTag::Unknown(name) => write!(f, "{name}"),
        }
    }
}

/// Resolution precedence when a field was observed with multiple types.
/// The first tag in this list that appears in the observed set wins.
const PRECEDENCE: &[TypeTag] = &[
    TypeTag::ObjectId,
    TypeTag::DateTime,
    TypeTag::Date,
    TypeTag::Int,
    TypeTag::Float,
    TypeTag::Bool,
    TypeTag::String,
    TypeTag::Array,
    TypeTag::Map,
];

/// Classifies a single BSON value.
///
/// Never fails: BSON types outside the core value model are tagged
/// [`TypeTag::Unknown`] with their native type name so analysis always
/// completes.
pub fn type_tag(value: &Bson) -> TypeTag {
    match value {
        Bson::ObjectId(_) => TypeTag::ObjectId,
        Bson::DateTime(_) | Bson::Timestamp(_) => TypeTag::DateTime,
        Bson::Int32(_) | Bson::Int64(_) => TypeTag::Int,
        Bson::Double(_) => TypeTag::Float,
        Bson::Boolean(_) => TypeTag::Bool,
        Bson::String(_) => TypeTag::String,
        Bson::Array(_) => TypeTag::Array,
        Bson::Document(_) => TypeTag::Map,
        Bson::Null => TypeTag::Null,
        other => TypeTag::Unknown(bson_type_name(other).to_string()),
    }
}

/// Gets the native BSON type name for a value.
pub fn bson_type_name(value: &Bson) -> &'static str {
    match value {
        Bson::String(_) => "string",
        Bson::Int32(_) => "int32",
        Bson::Int64(_) => "int64",
        Bson::Double(_) => "double",
        Bson::Boolean(_) => "bool",
        Bson::DateTime(_) => "date",
        Bson::Timestamp(_) => "timestamp",
        Bson::Binary(_) => "binData",
        Bson::ObjectId(_) => "objectId",
        Bson::Document(_) => "object",
        Bson::Array(_) => "array",
        Bson::Null => "null",
        Bson::RegularExpression(_) => "regex",
        Bson::JavaScriptCode(_) | Bson::JavaScriptCodeWithScope(_) => "javascript",
        Bson::Symbol(_) => "symbol",
        Bson::Decimal128(_) => "decimal128",
        Bson::MinKey => "minKey",
        Bson::MaxKey => "maxKey",
        Bson::Undefined => "undefined",
        Bson::DbPointer(_) => "dbPointer",
    }
}

/// Resolves a set of observed type tags down to the single reported tag.
///
/// Applies the fixed precedence order first. When none of the precedence
/// tags are present (e.g. only `Null` or `Unknown` tags were observed),
/// the tag with the lexicographically smallest display name wins, so the
/// result never depends on set iteration order.
pub fn resolve(observed: &BTreeSet<TypeTag>) -> TypeTag {
    for candidate in PRECEDENCE {
        if observed.contains(candidate) {
            return candidate.clone();
        }
    }

    observed
        .iter()
        .min_by(|a, b| a.to_string().cmp(&b.to_string()))
        .cloned()
        .unwrap_or_else(|| TypeTag::Unknown("unknown".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{Binary, DateTime, oid::ObjectId, spec::BinarySubtype};

    fn set(tags: &[TypeTag]) -> BTreeSet<TypeTag> {
        tags.iter().cloned().collect()
    }

    #[test]
    fn test_type_tag_primitives() {
        assert_eq!(type_tag(&Bson::String("x".to_string())), TypeTag::String);
        assert_eq!(type_tag(&Bson::Int32(1)), TypeTag::Int);
        assert_eq!(type_tag(&Bson::Int64(1)), TypeTag::Int);
        assert_eq!(type_tag(&Bson::Double(1.5)), TypeTag::Float);
        assert_eq!(type_tag(&Bson::Boolean(true)), TypeTag::Bool);
        assert_eq!(type_tag(&Bson::Null), TypeTag::Null);
    }

    #[test]
    fn test_type_tag_composites() {
        assert_eq!(type_tag(&Bson::Array(vec![])), TypeTag::Array);
        assert_eq!(
            type_tag(&Bson::Document(mongodb::bson::doc! {})),
            TypeTag::Map
        );
        assert_eq!(type_tag(&Bson::ObjectId(ObjectId::new())), TypeTag::ObjectId);
        assert_eq!(type_tag(&Bson::DateTime(DateTime::now())), TypeTag::DateTime);
    }

    #[test]
    fn test_type_tag_unknown_fallback() {
        let binary = Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: vec![1, 2, 3],
        });
        assert_eq!(
            type_tag(&binary),
            TypeTag::Unknown("binData".to_string())
        );
        assert_eq!(
            type_tag(&Bson::MinKey),
            TypeTag::Unknown("minKey".to_string())
        );
    }

    #[test]
    fn test_resolve_precedence() {
        // int outranks string
        assert_eq!(
            resolve(&set(&[TypeTag::String, TypeTag::Int])),
            TypeTag::Int
        );
        // ObjectId outranks everything
        assert_eq!(
            resolve(&set(&[TypeTag::Map, TypeTag::ObjectId, TypeTag::String])),
            TypeTag::ObjectId
        );
        // null never wins over a precedence tag
        assert_eq!(
            resolve(&set(&[TypeTag::Null, TypeTag::Bool])),
            TypeTag::Bool
        );
    }

    #[test]
    fn test_resolve_deterministic_fallback() {
        // Only non-precedence tags: lexicographically smallest display name
        let observed = set(&[
            TypeTag::Null,
            TypeTag::Unknown("regex".to_string()),
        ]);
        assert_eq!(resolve(&observed), TypeTag::Null); // "null" < "regex"

        let observed = set(&[
            TypeTag::Unknown("binData".to_string()),
            TypeTag::Null,
        ]);
        // "binData" < "null" (ASCII order)
        assert_eq!(resolve(&observed), TypeTag::Unknown("binData".to_string()));
    }

    #[test]
    fn test_resolve_empty_set() {
        assert_eq!(
            resolve(&BTreeSet::new()),
            TypeTag::Unknown("unknown".to_string())
        );
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TypeTag::ObjectId.to_string(), "ObjectId");
        assert_eq!(TypeTag::Int.to_string(), "int");
        assert_eq!(TypeTag::Map.to_string(), "object");
        assert_eq!(TypeTag::Unknown("regex".to_string()).to_string(), "regex");
    }
}
