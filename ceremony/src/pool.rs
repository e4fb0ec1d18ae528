//! Map pool selection and validation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CeremonyError;

/// Current competitive rotation.
pub const COMPETITIVE_POOL: [&str; 7] = ["Abyss", "Ascent", "Bind", "Haven", "Lotus", "Split", "Sunset"];

/// How the pool is chosen from the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "maps", rename_all = "snake_case")]
pub enum PoolSelection {
    /// Every playable map in the catalog.
    All,
    /// Catalog maps that are in the competitive rotation.
    #[default]
    Competitive,
    /// An explicit list, kept in the given order.
    Custom(Vec<String>),
}

impl PoolSelection {
    /// Resolve against catalog names. Catalog order is preserved.
    #[must_use]
    pub fn resolve(&self, catalog: &[String]) -> Vec<String> {
        match self {
            Self::All => catalog.to_vec(),
            Self::Competitive => catalog.iter().filter(|name| COMPETITIVE_POOL.contains(&name.as_str())).cloned().collect(),
            Self::Custom(maps) => maps.clone(),
        }
    }
}

/// A validated, ordered set of distinct map names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct MapPool(Vec<String>);

impl MapPool {
    /// Build a pool from raw names. Names are trimmed.
    ///
    /// # Errors
    ///
    /// `EmptyMapName` for a blank entry, `DuplicateMap` for a repeated one.
    pub fn new<I, S>(names: I) -> Result<Self, CeremonyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut maps = Vec::new();
        for raw in names {
            let name = raw.as_ref().trim();
            if name.is_empty() {
                return Err(CeremonyError::EmptyMapName);
            }
            if !seen.insert(name.to_owned()) {
                return Err(CeremonyError::DuplicateMap(name.to_owned()));
            }
            maps.push(name.to_owned());
        }
        Ok(Self(maps))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|m| m == name)
    }
}

impl TryFrom<Vec<String>> for MapPool {
    type Error = CeremonyError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MapPool> for Vec<String> {
    fn from(pool: MapPool) -> Self {
        pool.0
    }
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod tests;
