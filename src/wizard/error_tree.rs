//! Validation error tree produced by the form layer on a failed submit.
//!
//! The tree mirrors the shape of the form data. A node with a `message`
//! is a leaf; everything else is a branch keyed by field name or array
//! index.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::field_path::{FieldPath, Segment};
use crate::error::WizardError;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub message: String,
    /// Validation rule that failed (`required`, `pattern`, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorNode {
    Leaf(FieldError),
    Branch(BTreeMap<String, ErrorNode>),
    Absent,
}

impl ErrorNode {
    /// An empty branch: no errors anywhere.
    pub fn empty() -> Self {
        Self::Branch(BTreeMap::new())
    }

    pub fn leaf(message: impl Into<String>) -> Self {
        Self::Leaf(FieldError::new(message))
    }

    /// Build a branch from `(key, child)` pairs.
    pub fn branch<K, I>(children: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ErrorNode)>,
    {
        Self::Branch(children.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Convert the form layer's JSON error object.
    ///
    /// Objects carrying a string `message` become leaves and their other
    /// keys (`ref`, `types`, ...) are dropped. Any other object is a branch,
    /// including one whose `message` key holds a nested error. Arrays become branches keyed
    /// by index; `null` entries (sparse list errors) become `Absent`.
    pub fn from_json(value: &Value) -> Result<Self, WizardError> {
        Self::convert(value, &mut Vec::new())
    }

    fn convert(value: &Value, at: &mut Vec<String>) -> Result<Self, WizardError> {
        match value {
            Value::Null => Ok(Self::Absent),
            Value::Object(map) => match map.get("message") {
                Some(Value::String(message)) => Ok(Self::Leaf(FieldError {
                    message: message.clone(),
                    kind: map.get("type").and_then(Value::as_str).map(str::to_string),
                })),
                // Branch; `message` here, if present, names a field.
                _ => {
                    let mut children = BTreeMap::new();
                    for (key, child) in map {
                        at.push(key.clone());
                        children.insert(key.clone(), Self::convert(child, at)?);
                        at.pop();
                    }
                    Ok(Self::Branch(children))
                }
            },
            Value::Array(items) => {
                let mut children = BTreeMap::new();
                for (index, child) in items.iter().enumerate() {
                    at.push(index.to_string());
                    children.insert(index.to_string(), Self::convert(child, at)?);
                    at.pop();
                }
                Ok(Self::Branch(children))
            }
            other => Err(WizardError::InvalidErrorTree(format!(
                "unexpected value at {:?}: {other}",
                at.join(".")
            ))),
        }
    }

    /// Walk `path` through the tree.
    ///
    /// Returns the leaf found at the end of the path, or the first leaf met
    /// before the path is exhausted. A missing key, an `Absent` node, or a
    /// path ending on a branch means the field has no error.
    pub fn lookup(&self, path: &FieldPath) -> Option<&FieldError> {
        self.lookup_segments(path.segments())
    }

    fn lookup_segments(&self, segments: &[Segment]) -> Option<&FieldError> {
        let Some((head, rest)) = segments.split_first() else {
            return match self {
                Self::Leaf(error) => Some(error),
                _ => None,
            };
        };
        match self {
            Self::Leaf(error) => Some(error),
            Self::Absent => None,
            Self::Branch(children) => match head {
                Segment::Key(key) => children.get(key)?.lookup_segments(rest),
                Segment::Any => children
                    .values()
                    .find_map(|child| child.lookup_segments(rest)),
            },
        }
    }

    /// Whether the tree holds no leaves at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Leaf(_) => false,
            Self::Absent => true,
            Self::Branch(children) => children.values().all(Self::is_empty),
        }
    }

    /// Every leaf with its concrete path, depth-first in key order.
    pub fn leaves(&self) -> Vec<(Vec<&str>, &FieldError)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut Vec::new(), &mut out);
        out
    }

    fn collect_leaves<'a>(
        &'a self,
        at: &mut Vec<&'a str>,
        out: &mut Vec<(Vec<&'a str>, &'a FieldError)>,
    ) {
        match self {
            Self::Leaf(error) => out.push((at.clone(), error)),
            Self::Absent => {}
            Self::Branch(children) => {
                for (key, child) in children {
                    at.push(key);
                    child.collect_leaves(at, out);
                    at.pop();
                }
            }
        }
    }
}

impl Default for ErrorNode {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<Value> for ErrorNode {
    type Error = WizardError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl<'de> Deserialize<'de> for ErrorNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}
