//! Cat domain model.
//!
//! # Responsibility
//! - Define the flat cat record and its creation input.
//!
//! # Invariants
//! - `id` is assigned by storage on insert.
//! - `breed` was a member of the loaded breed set when the cat was created.
//!   It is not re-checked if the set changes later.

use serde::{Deserialize, Serialize};

/// Storage-assigned cat identity.
pub type CatId = i64;

/// Persisted cat record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cat {
    pub id: CatId,
    pub name: String,
    /// Years of field experience.
    pub experience: i64,
    pub breed: String,
    pub salary: i64,
}

/// Creation input for a cat. Identity is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCat {
    pub name: String,
    pub experience: i64,
    pub breed: String,
    pub salary: i64,
}

impl NewCat {
    pub fn new(
        name: impl Into<String>,
        experience: i64,
        breed: impl Into<String>,
        salary: i64,
    ) -> Self {
        Self {
            name: name.into(),
            experience,
            breed: breed.into(),
            salary,
        }
    }

    /// Binds this input to a storage-assigned identity.
    pub fn into_cat(self, id: CatId) -> Cat {
        Cat {
            id,
            name: self.name,
            experience: self.experience,
            breed: self.breed,
            salary: self.salary,
        }
    }
}
