//! Ordered field-path → wizard-step mapping.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::field_path::FieldPath;
use crate::error::WizardError;

/// Field-to-step map. Iteration follows insertion order, not step order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepMap {
    entries: Vec<(FieldPath, u32)>,
}

impl StepMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(path, step)` pairs, keeping their order.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, WizardError>
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let mut map = Self::new();
        for (path, step) in pairs {
            map.insert(FieldPath::parse(path)?, step);
        }
        Ok(map)
    }

    /// Add a mapping. Re-inserting a path updates its step in place.
    pub fn insert(&mut self, path: FieldPath, step: u32) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == path) {
            Some(entry) => entry.1 = step,
            None => self.entries.push((path, step)),
        }
    }

    pub fn get(&self, path: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.as_str() == path)
            .map(|(_, step)| *step)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, u32)> {
        self.entries.iter().map(|(path, step)| (path, *step))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry's walk would stop at a leaf located at `leaf`.
    pub fn covers(&self, leaf: &[&str]) -> bool {
        self.entries.iter().any(|(path, _)| path.reaches(leaf))
    }
}

impl Serialize for StepMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, step) in &self.entries {
            map.serialize_entry(path.as_str(), step)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StepMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StepMapVisitor;

        impl<'de> Visitor<'de> for StepMapVisitor {
            type Value = StepMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping field paths to step numbers")
            }

            fn visit_map<A>(self, mut access: A) -> Result<StepMap, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = StepMap::new();
                while let Some((path, step)) = access.next_entry::<FieldPath, u32>()? {
                    map.insert(path, step);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(StepMapVisitor)
    }
}
