use bson::{Bson, Document};
use serde_derive::{Deserialize, Serialize};
use std::fmt::Display;

/// How a single field participates in an index.
///
/// Numeric directions are normalized so that `1`, `1i64` and `1.0` all read as
/// [`IndexKeyKind::Ascending`]. Any other finite number is kept in
/// [`IndexKeyKind::Other`] as its shortest decimal rendering, so `2` and `2.0` compare
/// equal. Remaining values are kept as their relaxed extended JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKeyKind {
    Ascending,
    Descending,
    Text,
    Hashed,
    Geo2DSphere,
    Geo2D,
    Other(String),
}

impl Display for IndexKeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascending => write!(f, "1"),
            Self::Descending => write!(f, "-1"),
            Self::Text => write!(f, "text"),
            Self::Hashed => write!(f, "hashed"),
            Self::Geo2DSphere => write!(f, "2dsphere"),
            Self::Geo2D => write!(f, "2d"),
            Self::Other(raw) => write!(f, "{}", raw),
        }
    }
}

impl From<&Bson> for IndexKeyKind {
    fn from(value: &Bson) -> Self {
        let numeric = match value {
            Bson::Int32(n) => Some(f64::from(*n)),
            Bson::Int64(n) => Some(*n as f64),
            Bson::Double(n) => Some(*n),
            _ => None,
        };

        match (numeric, value.as_str()) {
            (Some(n), _) if n == 1.0 => Self::Ascending,
            (Some(n), _) if n == -1.0 => Self::Descending,
            // f64 Display drops a zero fraction: 2.0 renders as "2"
            (Some(n), _) if n.is_finite() => Self::Other(n.to_string()),
            (_, Some("text")) => Self::Text,
            (_, Some("hashed")) => Self::Hashed,
            (_, Some("2dsphere")) => Self::Geo2DSphere,
            (_, Some("2d")) => Self::Geo2D,
            _ => Self::Other(value.clone().into_relaxed_extjson().to_string()),
        }
    }
}

impl From<&IndexKeyKind> for Bson {
    fn from(kind: &IndexKeyKind) -> Self {
        match kind {
            IndexKeyKind::Ascending => Bson::Int32(1),
            IndexKeyKind::Descending => Bson::Int32(-1),
            IndexKeyKind::Text => Bson::String("text".into()),
            IndexKeyKind::Hashed => Bson::String("hashed".into()),
            IndexKeyKind::Geo2DSphere => Bson::String("2dsphere".into()),
            IndexKeyKind::Geo2D => Bson::String("2d".into()),
            IndexKeyKind::Other(raw) => serde_json::from_str::<serde_json::Value>(raw)
                .ok()
                .and_then(|value| Bson::try_from(value).ok())
                .unwrap_or_else(|| Bson::String(raw.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey {
    pub field: String,
    pub kind: IndexKeyKind,
}

/// Ordered mapping from field path to index direction.
///
/// Equality is structural: two patterns are equal only when they list the same
/// fields in the same order with the same kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPattern {
    keys: Vec<IndexKey>,
}

impl KeyPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ascending(self, field: impl Into<String>) -> Self {
        self.key(field, IndexKeyKind::Ascending)
    }

    pub fn descending(self, field: impl Into<String>) -> Self {
        self.key(field, IndexKeyKind::Descending)
    }

    /// Appends a field. A field already present keeps its position and takes the new kind,
    /// matching how a BSON document treats a repeated key.
    pub fn key(mut self, field: impl Into<String>, kind: IndexKeyKind) -> Self {
        let field = field.into();
        match self.keys.iter_mut().find(|key| key.field == field) {
            Some(existing) => existing.kind = kind,
            None => self.keys.push(IndexKey { field, kind }),
        }
        self
    }

    pub fn keys(&self) -> &[IndexKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        for key in &self.keys {
            document.insert(key.field.clone(), Bson::from(&key.kind));
        }
        document
    }
}

impl Display for KeyPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = self
            .keys
            .iter()
            .map(|key| format!("{}: {}", key.field, key.kind))
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "{{ {} }}", fields)
    }
}

impl From<&Document> for KeyPattern {
    fn from(document: &Document) -> Self {
        document
            .iter()
            .fold(KeyPattern::new(), |pattern, (field, value)| {
                pattern.key(field.as_str(), IndexKeyKind::from(value))
            })
    }
}

/// An index the caller wants to exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    pub key_pattern: KeyPattern,
    /// Engine flags using the server's option names, e.g. `{ unique: true }`.
    pub options: Document,
}

impl IndexDefinition {
    pub fn new(name: impl Into<String>, key_pattern: KeyPattern) -> Self {
        Self {
            name: name.into(),
            key_pattern,
            options: Document::new(),
        }
    }

    pub fn unique(mut self) -> Self {
        self.options.insert("unique", true);
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// An index as reported by the live collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingIndex {
    pub name: String,
    pub key_pattern: KeyPattern,
}

impl ExistingIndex {
    pub fn new(name: impl Into<String>, key_pattern: KeyPattern) -> Self {
        Self {
            name: name.into(),
            key_pattern,
        }
    }
}

/// An Atlas Search index request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchIndexDefinition {
    pub collection: String,
    pub name: String,
    pub definition: Document,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_key_pattern_equality_is_order_sensitive() {
        let forward = KeyPattern::new().ascending("a").descending("b");
        let reversed = KeyPattern::new().descending("b").ascending("a");

        assert_ne!(forward, reversed, "Field order must participate in equality");
        assert_eq!(forward, KeyPattern::new().ascending("a").descending("b"));
    }

    #[test]
    fn test_key_pattern_direction_participates_in_equality() {
        let ascending = KeyPattern::new().ascending("sale_date");
        let descending = KeyPattern::new().descending("sale_date");

        assert_ne!(ascending, descending);
    }

    #[test]
    fn test_numeric_directions_are_normalized() {
        let from_int32 = KeyPattern::from(&doc! { "email": 1_i32 });
        let from_int64 = KeyPattern::from(&doc! { "email": 1_i64 });
        let from_double = KeyPattern::from(&doc! { "email": 1.0 });

        assert_eq!(from_int32, KeyPattern::new().ascending("email"));
        assert_eq!(from_int32, from_int64);
        assert_eq!(from_int32, from_double);

        let descending = KeyPattern::from(&doc! { "rating": -1.0 });
        assert_eq!(descending, KeyPattern::new().descending("rating"));
    }

    #[test]
    fn test_other_numeric_directions_compare_by_value() {
        let from_int32 = KeyPattern::from(&doc! { "score": 2_i32 });
        let from_int64 = KeyPattern::from(&doc! { "score": 2_i64 });
        let from_double = KeyPattern::from(&doc! { "score": 2.0 });

        assert_eq!(from_int32, from_double);
        assert_eq!(from_int32, from_int64);
        assert_ne!(from_int32, KeyPattern::from(&doc! { "score": 2.5 }));
    }

    #[test]
    fn test_special_index_kinds_are_parsed() {
        let pattern = KeyPattern::from(&doc! {
            "description": "text",
            "user_id": "hashed",
            "location": "2dsphere",
            "legacy": "2d",
        });

        let kinds: Vec<&IndexKeyKind> = pattern.keys().iter().map(|key| &key.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &IndexKeyKind::Text,
                &IndexKeyKind::Hashed,
                &IndexKeyKind::Geo2DSphere,
                &IndexKeyKind::Geo2D,
            ]
        );
    }

    #[test]
    fn test_unusual_directions_survive_a_document_round() {
        let pattern = KeyPattern::from(&doc! { "score": 2_i32, "$**": "wildcard" });
        assert_eq!(pattern.keys()[0].kind, IndexKeyKind::Other("2".into()));

        let document = pattern.to_document();
        assert_eq!(document.get_str("$**").ok(), Some("wildcard"));
        assert_eq!(KeyPattern::from(&document), pattern);
    }

    #[test]
    fn test_to_document_keeps_field_order() {
        let pattern = KeyPattern::new()
            .ascending("category.main")
            .descending("pricing.actual_price");

        let document = pattern.to_document();
        let fields: Vec<&String> = document.keys().collect();
        assert_eq!(fields, vec!["category.main", "pricing.actual_price"]);
        assert_eq!(document.get_i32("pricing.actual_price").ok(), Some(-1));
    }

    #[test]
    fn test_definition_options() {
        let definition = IndexDefinition::new("idx_email_unique", KeyPattern::new().ascending("email"))
            .unique()
            .option("sparse", true);

        assert_eq!(definition.options, doc! { "unique": true, "sparse": true });
        assert_eq!(definition.key_pattern.to_string(), "{ email: 1 }");
    }
}
