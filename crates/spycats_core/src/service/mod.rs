//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Apply checks that need no storage access (breed readiness/membership)
//!   before touching the repository.
//! - Translate repository errors into caller-facing error kinds with stable
//!   codes.

pub mod cat_service;
pub mod mission_service;
