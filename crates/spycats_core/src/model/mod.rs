//! Domain model for the agency: cats, missions and their targets.
//!
//! # Responsibility
//! - Define the records exchanged between services, repositories and callers.
//! - Own input validation that does not need storage access.
//!
//! # Invariants
//! - Identities are assigned by storage and never reused.
//! - A mission owns its targets; a target never outlives its mission.

pub mod cat;
pub mod mission;
