//! Mission and target domain model.
//!
//! # Responsibility
//! - Define mission/target read models and their creation/update inputs.
//! - Validate mission creation input before it reaches storage.
//!
//! # Invariants
//! - A mission holds between `MIN_TARGETS` and `MAX_TARGETS` targets. The
//!   bound is checked once at creation and never re-validated.
//! - `Mission::complete` only ever flips from `false` to `true`.
//! - A completed mission keeps its `cat_id`, preserving assignment history.

use super::cat::CatId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned mission identity.
pub type MissionId = i64;

/// Storage-assigned target identity.
pub type TargetId = i64;

/// Fewest targets a mission may be created with.
pub const MIN_TARGETS: usize = 1;
/// Most targets a mission may be created with.
pub const MAX_TARGETS: usize = 3;

/// Persisted target record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    /// Owning mission. Never null.
    pub mission_id: MissionId,
    pub name: String,
    pub country: String,
    /// Free-form notes. Frozen once the target is complete.
    pub notes: String,
    pub complete: bool,
}

/// Persisted mission record with its owned targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    /// `None` for unassigned missions.
    pub cat_id: Option<CatId>,
    pub complete: bool,
    /// Owned targets in creation order.
    pub targets: Vec<Target>,
}

impl Mission {
    /// Returns whether a cat reference is set, completed or not.
    pub fn is_assigned(&self) -> bool {
        self.cat_id.is_some()
    }

    /// Returns whether this mission is the active assignment of `cat_id`.
    pub fn is_active_for(&self, cat_id: CatId) -> bool {
        self.cat_id == Some(cat_id) && !self.complete
    }

    /// Returns whether every owned target is complete.
    ///
    /// This mirrors the propagation rule but is not the source of truth:
    /// a mission created with pre-completed targets stays incomplete until
    /// one of its targets is updated.
    pub fn all_targets_complete(&self) -> bool {
        !self.targets.is_empty() && self.targets.iter().all(|target| target.complete)
    }
}

/// Creation input for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTarget {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub complete: bool,
}

impl NewTarget {
    /// Creates an incomplete target with empty notes.
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            notes: String::new(),
            complete: false,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn completed(mut self) -> Self {
        self.complete = true;
        self
    }
}

/// Creation input for a mission and its targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMission {
    #[serde(default)]
    pub cat_id: Option<CatId>,
    pub targets: Vec<NewTarget>,
}

impl NewMission {
    /// Creates an unassigned mission input.
    pub fn unassigned(targets: Vec<NewTarget>) -> Self {
        Self {
            cat_id: None,
            targets,
        }
    }

    /// Creates a mission input assigned to `cat_id`.
    pub fn assigned(cat_id: CatId, targets: Vec<NewTarget>) -> Self {
        Self {
            cat_id: Some(cat_id),
            targets,
        }
    }

    /// Validates the target-count bound.
    pub fn validate(&self) -> Result<(), MissionValidationError> {
        let count = self.targets.len();
        if !(MIN_TARGETS..=MAX_TARGETS).contains(&count) {
            return Err(MissionValidationError::InvalidTargetCount { count });
        }
        Ok(())
    }
}

/// Partial target update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetUpdate {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub complete: Option<bool>,
}

impl TargetUpdate {
    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            complete: None,
        }
    }

    pub fn complete(complete: bool) -> Self {
        Self {
            notes: None,
            complete: Some(complete),
        }
    }

    /// Returns whether the update carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.notes.is_none() && self.complete.is_none()
    }
}

/// Validation failure for mission creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissionValidationError {
    /// Target list size outside `[MIN_TARGETS, MAX_TARGETS]`.
    InvalidTargetCount { count: usize },
}

impl Display for MissionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTargetCount { count } => write!(
                f,
                "mission must have between {MIN_TARGETS} and {MAX_TARGETS} targets, got {count}"
            ),
        }
    }
}

impl Error for MissionValidationError {}
