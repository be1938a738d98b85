//! Breed validator: the accepted breed-name set loaded at startup.
//!
//! # Responsibility
//! - Hold the process-wide set of valid breed names.
//! - Report readiness explicitly instead of inferring it from set size.
//! - Parse the upstream breed catalog payload.
//!
//! # Invariants
//! - A fresh validator is not ready and accepts no breed.
//! - `reload` replaces the whole set atomically and marks the validator ready.
//! - Matching is exact and case-sensitive, as in the upstream catalog.

use log::{info, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::RwLock;

/// Read-mostly set of accepted breed names.
///
/// Shared by reference between the startup loader and cat creation paths.
#[derive(Debug, Default)]
pub struct BreedValidator {
    breeds: RwLock<Option<HashSet<String>>>,
}

impl BreedValidator {
    /// Creates an empty, not-ready validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ready validator holding `names`.
    pub fn with_breeds<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let validator = Self::new();
        validator.reload(names);
        validator
    }

    /// Replaces the accepted set and marks the validator ready.
    ///
    /// Returns the number of distinct names now accepted. An empty input
    /// still marks the validator ready; every breed is then rejected.
    pub fn reload<I, S>(&self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = names.into_iter().map(Into::into).collect();
        let count = set.len();
        // Poisoning is ignored: the set is only ever replaced wholesale.
        let mut guard = self
            .breeds
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(set);

        if count == 0 {
            warn!("event=breeds_reload module=breeds status=ok count=0");
        } else {
            info!("event=breeds_reload module=breeds status=ok count={count}");
        }
        count
    }

    /// Returns whether a breed list has been loaded.
    pub fn is_ready(&self) -> bool {
        self.read_guard().is_some()
    }

    /// Returns whether `breed` is accepted. Always `false` while not ready.
    pub fn is_valid(&self, breed: &str) -> bool {
        self.read_guard()
            .as_ref()
            .is_some_and(|set| set.contains(breed))
    }

    /// Returns the number of accepted breeds, or `None` while not ready.
    pub fn breed_count(&self) -> Option<usize> {
        self.read_guard().as_ref().map(HashSet::len)
    }

    /// Returns the accepted names sorted, or `None` while not ready.
    pub fn sorted_names(&self) -> Option<Vec<String>> {
        self.read_guard().as_ref().map(|set| {
            let mut names: Vec<String> = set.iter().cloned().collect();
            names.sort();
            names
        })
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, Option<HashSet<String>>> {
        self.breeds
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One entry of the upstream breed catalog. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct BreedRecord {
    name: String,
}

/// Failure to interpret a breed catalog payload.
#[derive(Debug)]
pub enum BreedCatalogError {
    /// Payload is not a JSON array of objects with a `name` field.
    Malformed(serde_json::Error),
    /// An entry carries a blank name.
    BlankName { index: usize },
}

impl Display for BreedCatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed breed catalog: {err}"),
            Self::BlankName { index } => {
                write!(f, "breed catalog entry {index} has a blank name")
            }
        }
    }
}

impl Error for BreedCatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::BlankName { .. } => None,
        }
    }
}

impl From<serde_json::Error> for BreedCatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value)
    }
}

/// Extracts breed names from a catalog payload such as
/// `[{"id": "abys", "name": "Abyssinian", ...}, ...]`.
///
/// Names are kept verbatim (no trimming or case folding) so they match what
/// clients see in the same catalog.
pub fn parse_breed_catalog(payload: &str) -> Result<Vec<String>, BreedCatalogError> {
    let records: Vec<BreedRecord> = serde_json::from_str(payload)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            if record.name.trim().is_empty() {
                Err(BreedCatalogError::BlankName { index })
            } else {
                Ok(record.name)
            }
        })
        .collect()
}
