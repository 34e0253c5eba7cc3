// crates/rollout-gate-core/src/core/tags.rs
// ============================================================================
// Module: Resource Tags
// Description: Accepted tag representations and their canonical key set.
// Purpose: Normalize list-of-pairs and mapping tag shapes at the boundary.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Config-change notifications deliver resource tags either as a list of
//! `{Key, Value}` / `{key, value}` records or as a direct key-to-value mapping,
//! depending on the provider API version. [`TagSource`] models both shapes as a
//! tagged union and [`TagSource::keys`] reduces either one to the same
//! [`TagKeys`] set, so the compliance predicate never sees the input shape.
//! Normalization preserves key presence exactly; values are carried but never
//! consulted by the predicate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Key/value pair describing a cloud resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag key (case-sensitive).
    pub key: String,
    /// Tag value; irrelevant to compliance.
    pub value: String,
}

impl Tag {
    /// Creates a new tag.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Tag set as delivered by the trigger, in one of the accepted shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSource {
    /// Sequence of key/value records.
    Pairs(Vec<Tag>),
    /// Direct key-to-value mapping.
    Mapping(BTreeMap<String, String>),
}

impl Default for TagSource {
    fn default() -> Self {
        Self::Pairs(Vec::new())
    }
}

/// Canonical set of tag keys present on a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagKeys(BTreeSet<String>);

impl TagKeys {
    /// Returns true when the key is present (exact, case-sensitive match).
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no keys are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates keys in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TagKeys {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Errors raised when a tag payload matches neither accepted shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagShapeError {
    /// Tags were neither a list, a mapping, nor null.
    #[error("tags must be a list of key/value records or a mapping, found {found}")]
    UnsupportedShape {
        /// JSON type label of the offending value.
        found: &'static str,
    },
    /// A list entry was not an object.
    #[error("tag entry {index} must be an object")]
    EntryNotObject {
        /// Position of the entry in the list.
        index: usize,
    },
    /// A list entry had no string `Key`/`key` field.
    #[error("tag entry {index} is missing a string Key/key field")]
    MissingKey {
        /// Position of the entry in the list.
        index: usize,
    },
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

impl TagSource {
    /// Builds a tag source from a raw JSON tag payload.
    ///
    /// `null` is treated as an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`TagShapeError`] when the payload matches neither shape.
    pub fn from_json(value: &Value) -> Result<Self, TagShapeError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Array(entries) => {
                let mut tags = Vec::with_capacity(entries.len());
                for (index, entry) in entries.iter().enumerate() {
                    let Value::Object(fields) = entry else {
                        return Err(TagShapeError::EntryNotObject {
                            index,
                        });
                    };
                    let key = fields
                        .get("Key")
                        .and_then(Value::as_str)
                        .or_else(|| fields.get("key").and_then(Value::as_str))
                        .ok_or(TagShapeError::MissingKey {
                            index,
                        })?;
                    let value = fields
                        .get("Value")
                        .filter(|value| !value.is_null())
                        .or_else(|| fields.get("value"))
                        .map_or_else(String::new, scalar_text);
                    tags.push(Tag::new(key, value));
                }
                Ok(Self::Pairs(tags))
            }
            Value::Object(fields) => Ok(Self::Mapping(
                fields.iter().map(|(key, value)| (key.clone(), scalar_text(value))).collect(),
            )),
            other => Err(TagShapeError::UnsupportedShape {
                found: json_type_label(other),
            }),
        }
    }

    /// Reduces the source to its canonical key set.
    #[must_use]
    pub fn keys(&self) -> TagKeys {
        match self {
            Self::Pairs(tags) => tags.iter().map(|tag| tag.key.as_str()).collect(),
            Self::Mapping(map) => map.keys().map(String::as_str).collect(),
        }
    }

    /// Returns true when the source carries no tags at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Pairs(tags) => tags.is_empty(),
            Self::Mapping(map) => map.is_empty(),
        }
    }
}

impl From<Vec<Tag>> for TagSource {
    fn from(tags: Vec<Tag>) -> Self {
        Self::Pairs(tags)
    }
}

impl From<BTreeMap<String, String>> for TagSource {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self::Mapping(map)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Renders a tag value as text; strings are taken verbatim.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Returns a stable label for a JSON value type.
const fn json_type_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
