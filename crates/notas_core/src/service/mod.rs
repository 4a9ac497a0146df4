//! View-state layer bridging presentation and persistence.
//!
//! # Responsibility
//! - Expose reactive read access and fire-and-forget mutation entry points.
//! - Drive the edit-session state machine against live lookups.
//!
//! # Invariants
//! - Mutations never block the caller; effects surface only through live
//!   query emissions.

pub mod note_service;
