//! Core domain logic for the Spy Cat Agency.
//! This crate is the single source of truth for cat, mission and target
//! business invariants.

pub mod breeds;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use breeds::{parse_breed_catalog, BreedCatalogError, BreedValidator};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::cat::{Cat, CatId, NewCat};
pub use model::mission::{
    Mission, MissionId, MissionValidationError, NewMission, NewTarget, Target, TargetId,
    TargetUpdate, MAX_TARGETS, MIN_TARGETS,
};
pub use repo::cat_repo::{CatRepository, SqliteCatRepository};
pub use repo::mission_repo::{MissionRepository, SqliteMissionRepository, TargetUpdateOutcome};
pub use repo::{RepoError, RepoResult};
pub use service::cat_service::{CatService, CatServiceError};
pub use service::mission_service::{MissionService, MissionServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
