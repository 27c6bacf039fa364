//! Core domain logic for BioData.
//! Typed, validated, time-stamped biometric measurements and their
//! null-pruned structured/JSON snapshots.

pub mod error;
pub mod logging;
pub mod model;

pub use error::{BioDataError, BioResult, MismatchReason};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::collection::MeasurementCollection;
pub use model::constrained::{accept_any, ConstrainedMeasurement, KindConstraints, ValueTest};
pub use model::event::Event;
pub use model::kinds::{supported_kinds, MeasurementKind, UnknownKindError};
pub use model::measurement::Measurement;
pub use model::record::{prune_nulls, Record, Structured, ToStructured};
pub use model::time::{
    validate_timestamp, Clock, FixedClock, IntoTimestamp, SystemClock, TimeRecord, TimeWindow,
    Timestamp,
};
pub use model::value::MeasurementValue;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
