//! Mission/target use-case service.
//!
//! # Responsibility
//! - Provide mission create/get/list/delete/assign and target update APIs.
//! - Return read-back records so callers always see committed state.
//!
//! # Invariants
//! - Lifecycle rules are applied by the repository inside one transaction;
//!   this layer never re-checks them against stale reads.
//! - A mission's `cat_id` survives completion, so completed missions still
//!   refuse deletion.

use crate::model::cat::CatId;
use crate::model::mission::{
    Mission, MissionId, MissionValidationError, NewMission, Target, TargetId, TargetUpdate,
};
use crate::repo::mission_repo::MissionRepository;
use crate::repo::RepoError;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for mission/target use-cases.
#[derive(Debug)]
pub enum MissionServiceError {
    /// Target list size outside `[1, 3]`.
    InvalidTargetCount { count: usize },
    CatNotFound(CatId),
    MissionNotFound(MissionId),
    TargetNotFound(TargetId),
    /// Delete blocked: mission still references a cat.
    MissionAssigned {
        mission_id: MissionId,
        cat_id: CatId,
    },
    /// Cat already has a different uncompleted mission.
    CatAlreadyAssigned {
        cat_id: CatId,
        active_mission_id: MissionId,
    },
    /// Notes edit on a completed target.
    TargetFrozen(TargetId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl MissionServiceError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTargetCount { .. } => "invalid_target_count",
            Self::CatNotFound(_) | Self::MissionNotFound(_) | Self::TargetNotFound(_) => {
                "not_found"
            }
            Self::MissionAssigned { .. } => "mission_assigned",
            Self::CatAlreadyAssigned { .. } => "cat_already_assigned",
            Self::TargetFrozen(_) => "target_frozen",
            Self::Repo(_) => "storage_error",
            Self::InconsistentState(_) => "inconsistent_state",
        }
    }
}

impl Display for MissionServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTargetCount { count } => write!(
                f,
                "{}",
                MissionValidationError::InvalidTargetCount { count: *count }
            ),
            Self::CatNotFound(id) => write!(f, "cat not found: {id}"),
            Self::MissionNotFound(id) => write!(f, "mission not found: {id}"),
            Self::TargetNotFound(id) => write!(f, "target not found: {id}"),
            Self::MissionAssigned { mission_id, cat_id } => write!(
                f,
                "cannot delete mission {mission_id}: it is assigned to cat {cat_id}"
            ),
            Self::CatAlreadyAssigned {
                cat_id,
                active_mission_id,
            } => write!(
                f,
                "cat {cat_id} already has an uncompleted mission with id {active_mission_id}"
            ),
            Self::TargetFrozen(id) => write!(f, "cannot update notes of completed target {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent mission state: {details}")
            }
        }
    }
}

impl Error for MissionServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MissionServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(MissionValidationError::InvalidTargetCount { count }) => {
                Self::InvalidTargetCount { count }
            }
            RepoError::CatNotFound(id) => Self::CatNotFound(id),
            RepoError::MissionNotFound(id) => Self::MissionNotFound(id),
            RepoError::TargetNotFound(id) => Self::TargetNotFound(id),
            RepoError::MissionAssigned { mission_id, cat_id } => {
                Self::MissionAssigned { mission_id, cat_id }
            }
            RepoError::CatAlreadyAssigned {
                cat_id,
                active_mission_id,
            } => Self::CatAlreadyAssigned {
                cat_id,
                active_mission_id,
            },
            RepoError::TargetFrozen(id) => Self::TargetFrozen(id),
            other => Self::Repo(other),
        }
    }
}

/// Mission service facade over repository implementations.
pub struct MissionService<R: MissionRepository> {
    repo: R,
}

impl<R: MissionRepository> MissionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a mission with its targets.
    ///
    /// Pre-completed targets are stored as given; the mission itself starts
    /// incomplete because propagation only runs on target updates.
    pub fn create_mission(
        &mut self,
        mission: &NewMission,
    ) -> Result<Mission, MissionServiceError> {
        let id = self.repo.create_mission(mission).map_err(|err| {
            let err = MissionServiceError::from(err);
            warn!(
                "event=mission_create module=service status=error error_code={}",
                err.code()
            );
            err
        })?;
        info!(
            "event=mission_create module=service status=ok mission_id={id} targets={}",
            mission.targets.len()
        );
        self.read_back(id, "created mission not found in read-back")
    }

    /// Gets one mission with its targets.
    pub fn get_mission(&self, id: MissionId) -> Result<Mission, MissionServiceError> {
        self.repo
            .get_mission(id)?
            .ok_or(MissionServiceError::MissionNotFound(id))
    }

    /// Lists all missions in insertion order.
    pub fn list_missions(&self) -> Result<Vec<Mission>, MissionServiceError> {
        Ok(self.repo.list_missions()?)
    }

    /// Deletes an unassigned mission together with its targets.
    pub fn delete_mission(&mut self, id: MissionId) -> Result<(), MissionServiceError> {
        self.repo.delete_mission(id)?;
        info!("event=mission_delete module=service status=ok mission_id={id}");
        Ok(())
    }

    /// Assigns `cat_id` to a mission. Re-assigning the same pair is a no-op.
    pub fn assign_cat(
        &mut self,
        mission_id: MissionId,
        cat_id: CatId,
    ) -> Result<Mission, MissionServiceError> {
        self.repo.assign_cat(mission_id, cat_id).map_err(|err| {
            let err = MissionServiceError::from(err);
            warn!(
                "event=mission_assign module=service status=error mission_id={mission_id} cat_id={cat_id} error_code={}",
                err.code()
            );
            err
        })?;
        info!("event=mission_assign module=service status=ok mission_id={mission_id} cat_id={cat_id}");
        self.read_back(mission_id, "assigned mission not found in read-back")
    }

    /// Gets one target by id.
    pub fn get_target(&self, id: TargetId) -> Result<Target, MissionServiceError> {
        self.repo
            .get_target(id)?
            .ok_or(MissionServiceError::TargetNotFound(id))
    }

    /// Applies a partial update to one target and returns it.
    ///
    /// Completing the last open target completes the mission. Reopening a
    /// target does not reopen its mission.
    pub fn update_target(
        &mut self,
        id: TargetId,
        update: &TargetUpdate,
    ) -> Result<Target, MissionServiceError> {
        if update.is_empty() {
            debug!("event=target_update module=service status=noop target_id={id}");
        }

        let outcome = self.repo.update_target(id, update)?;
        info!(
            "event=target_update module=service status=ok target_id={id} mission_id={} mission_completed={}",
            outcome.mission_id, outcome.mission_completed
        );
        self.repo
            .get_target(id)?
            .ok_or(MissionServiceError::InconsistentState(
                "updated target not found in read-back",
            ))
    }

    fn read_back(
        &self,
        id: MissionId,
        details: &'static str,
    ) -> Result<Mission, MissionServiceError> {
        self.repo
            .get_mission(id)?
            .ok_or(MissionServiceError::InconsistentState(details))
    }
}
