//! Biodata entity model.
//!
//! # Responsibility
//! - Define the entity tree: record -> time record, constrained measurement
//!   -> measurement collection -> measurements.
//! - Keep validation in one place (`constrained`) and constraint data in
//!   another (`kinds`).
//!
//! # Invariants
//! - Ownership is a strict tree; no entity is shared between two owners.
//! - Measurements reach a constrained measurement only through validation.

pub mod collection;
pub mod constrained;
pub mod event;
pub mod kinds;
pub mod measurement;
pub mod record;
pub mod time;
pub mod value;
