//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for cats and missions.
//! - Isolate SQL details from service orchestration.
//! - Run every read-check-write sequence inside one SQLite transaction.
//!
//! # Invariants
//! - Repositories only accept connections migrated to the latest schema.
//! - Rule violations detected inside a transaction are reported as semantic
//!   errors and leave storage untouched.

use crate::db::migrations::latest_version;
use crate::db::{schema_version, DbError};
use crate::model::cat::CatId;
use crate::model::mission::{MissionId, MissionValidationError, TargetId};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod cat_repo;
pub mod mission_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from cat/mission repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Mission input failed validation before any write.
    Validation(MissionValidationError),
    CatNotFound(CatId),
    MissionNotFound(MissionId),
    TargetNotFound(TargetId),
    /// Mission still references a cat and cannot be deleted.
    MissionAssigned {
        mission_id: MissionId,
        cat_id: CatId,
    },
    /// Cat already has a different uncompleted mission.
    CatAlreadyAssigned {
        cat_id: CatId,
        active_mission_id: MissionId,
    },
    /// Notes edit requested on a completed target.
    TargetFrozen(TargetId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted row cannot be converted into a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::CatNotFound(id) => write!(f, "cat not found: {id}"),
            Self::MissionNotFound(id) => write!(f, "mission not found: {id}"),
            Self::TargetNotFound(id) => write!(f, "target not found: {id}"),
            Self::MissionAssigned { mission_id, cat_id } => write!(
                f,
                "mission {mission_id} is assigned to cat {cat_id} and cannot be deleted"
            ),
            Self::CatAlreadyAssigned {
                cat_id,
                active_mission_id,
            } => write!(
                f,
                "cat {cat_id} already has an uncompleted mission with id {active_mission_id}"
            ),
            Self::TargetFrozen(id) => {
                write!(f, "cannot update notes of completed target {id}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<MissionValidationError> for RepoError {
    fn from(value: MissionValidationError) -> Self {
        Self::Validation(value)
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn parse_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
