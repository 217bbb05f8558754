//! Dot-delimited field paths such as `deceased.first_names` or
//! `relatives.0.name`.

use serde::{Deserialize, Serialize};

use crate::error::WizardError;

/// One segment of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// An object key or array index.
    Key(String),
    /// `*`: any key at this level. Used to map every entry of a list.
    Any,
}

impl Segment {
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Key(k) => k == key,
            Self::Any => true,
        }
    }
}

/// A parsed field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, WizardError> {
        if raw.is_empty() {
            return Err(WizardError::InvalidFieldPath {
                path: raw.to_string(),
                reason: "path is empty".to_string(),
            });
        }
        let segments = raw
            .split('.')
            .map(|segment| match segment {
                "" => Err(WizardError::InvalidFieldPath {
                    path: raw.to_string(),
                    reason: "empty segment".to_string(),
                }),
                "*" => Ok(Segment::Any),
                key => Ok(Segment::Key(key.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether walking this path through an error tree would stop at a leaf
    /// located at `leaf` (given as concrete keys).
    ///
    /// True when the leaf sits exactly at the end of this path, or earlier
    /// along it.
    pub fn reaches(&self, leaf: &[&str]) -> bool {
        leaf.len() <= self.segments.len()
            && self
                .segments
                .iter()
                .zip(leaf)
                .all(|(segment, key)| segment.matches(key))
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for FieldPath {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = WizardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.raw
    }
}
