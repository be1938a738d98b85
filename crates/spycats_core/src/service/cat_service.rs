//! Cat use-case service.
//!
//! # Responsibility
//! - Provide create/get/list/update-salary/delete entry points for cats.
//! - Gate creation on the breed validator.
//!
//! # Invariants
//! - Creation fails `NotReady` until a breed list is loaded, and
//!   `InvalidBreed` for names outside the loaded set.
//! - Deletion never inspects missions.

use crate::breeds::BreedValidator;
use crate::model::cat::{Cat, CatId, NewCat};
use crate::repo::cat_repo::CatRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for cat use-cases.
#[derive(Debug)]
pub enum CatServiceError {
    /// Breed list has not been loaded yet.
    NotReady,
    /// Breed is not in the loaded set.
    InvalidBreed(String),
    CatNotFound(CatId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl CatServiceError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotReady => "not_ready",
            Self::InvalidBreed(_) => "invalid_breed",
            Self::CatNotFound(_) => "not_found",
            Self::Repo(_) => "storage_error",
            Self::InconsistentState(_) => "inconsistent_state",
        }
    }

    /// Whether the same call may succeed later without caller changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotReady)
    }
}

impl Display for CatServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady => write!(f, "breeds data not loaded yet"),
            Self::InvalidBreed(breed) => write!(f, "breed `{breed}` is not valid"),
            Self::CatNotFound(id) => write!(f, "cat not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent cat state: {details}"),
        }
    }
}

impl Error for CatServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CatServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::CatNotFound(id) => Self::CatNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Cat service facade over a repository and the shared breed validator.
pub struct CatService<'b, R: CatRepository> {
    repo: R,
    breeds: &'b BreedValidator,
}

impl<'b, R: CatRepository> CatService<'b, R> {
    pub fn new(repo: R, breeds: &'b BreedValidator) -> Self {
        Self { repo, breeds }
    }

    /// Creates one cat after breed validation and returns the stored record.
    pub fn create_cat(&self, cat: NewCat) -> Result<Cat, CatServiceError> {
        if !self.breeds.is_ready() {
            warn!("event=cat_create module=service status=error error_code=not_ready");
            return Err(CatServiceError::NotReady);
        }
        if !self.breeds.is_valid(&cat.breed) {
            warn!(
                "event=cat_create module=service status=error error_code=invalid_breed breed={}",
                cat.breed
            );
            return Err(CatServiceError::InvalidBreed(cat.breed));
        }

        let id = self.repo.create_cat(&cat)?;
        info!("event=cat_create module=service status=ok cat_id={id}");
        self.repo
            .get_cat(id)?
            .ok_or(CatServiceError::InconsistentState(
                "created cat not found in read-back",
            ))
    }

    /// Gets one cat by id.
    pub fn get_cat(&self, id: CatId) -> Result<Cat, CatServiceError> {
        self.repo
            .get_cat(id)?
            .ok_or(CatServiceError::CatNotFound(id))
    }

    /// Lists all cats in insertion order.
    pub fn list_cats(&self) -> Result<Vec<Cat>, CatServiceError> {
        Ok(self.repo.list_cats()?)
    }

    /// Overwrites one cat's salary and returns the updated record.
    pub fn update_salary(&self, id: CatId, salary: i64) -> Result<Cat, CatServiceError> {
        self.repo.update_salary(id, salary)?;
        info!("event=cat_update_salary module=service status=ok cat_id={id}");
        self.repo
            .get_cat(id)?
            .ok_or(CatServiceError::InconsistentState(
                "updated cat not found in read-back",
            ))
    }

    /// Deletes one cat. Missions referencing it keep a dangling `cat_id`.
    pub fn delete_cat(&self, id: CatId) -> Result<(), CatServiceError> {
        self.repo.delete_cat(id)?;
        info!("event=cat_delete module=service status=ok cat_id={id}");
        Ok(())
    }
}
