use std::collections::BTreeMap;

use netbattle_core::{Chip, ChipDefinition};
use serde::Deserialize;
use thiserror::Error;

use crate::resolve_chip;

const BUILTIN_LIBRARY: &str = include_str!("../data/chips.toml");

/// Failures raised while loading a chip library.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The document is not valid TOML or does not match the chip schema.
    #[error("malformed chip library: {0}")]
    Parse(#[from] toml::de::Error),
    /// Two definitions share a name.
    #[error("chip `{name}` is defined more than once")]
    DuplicateChip {
        /// Name defined twice.
        name: String,
    },
    /// A definition has an empty name.
    #[error("chip definitions must have a name")]
    UnnamedChip,
}

#[derive(Debug, Deserialize)]
struct LibraryDocument {
    #[serde(default, rename = "chip")]
    chips: Vec<ChipDefinition>,
}

/// Name-keyed catalogue of chips with their behaviour already resolved.
#[derive(Clone, Debug, Default)]
pub struct ChipLibrary {
    chips: BTreeMap<String, Chip>,
}

impl ChipLibrary {
    /// Loads the built-in catalogue.
    pub fn builtin() -> Result<Self, LibraryError> {
        Self::from_toml(BUILTIN_LIBRARY)
    }

    /// Parses a library from TOML text made of `[[chip]]` tables.
    pub fn from_toml(text: &str) -> Result<Self, LibraryError> {
        let document: LibraryDocument = toml::from_str(text)?;
        Self::from_definitions(document.chips)
    }

    /// Builds a library from definitions, resolving each behaviour once.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = ChipDefinition>,
    ) -> Result<Self, LibraryError> {
        let mut chips = BTreeMap::new();
        for definition in definitions {
            if definition.name.trim().is_empty() {
                return Err(LibraryError::UnnamedChip);
            }
            let name = definition.name.clone();
            if chips.contains_key(&name) {
                return Err(LibraryError::DuplicateChip { name });
            }
            let _ = chips.insert(name, resolve_chip(definition));
        }
        Ok(Self { chips })
    }

    /// Looks up a chip by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Chip> {
        self.chips.get(name)
    }

    /// Reports whether a chip with the provided name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.chips.contains_key(name)
    }

    /// Iterator over every chip in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Chip> {
        self.chips.values()
    }

    /// Number of chips in the library.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chips.len()
    }

    /// Reports whether the library is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }
}
