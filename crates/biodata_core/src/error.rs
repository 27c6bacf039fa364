//! Crate-wide error taxonomy.
//!
//! # Responsibility
//! - Give every rejected input a distinguishable error kind.
//! - Keep numeric codes stable so callers can map errors at their boundary.
//!
//! # Invariants
//! - Validation never partially applies: an `Err` means nothing was mutated.
//! - Unit errors distinguish "absent" (701) from "present but wrong" (700).

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BioResult<T> = Result<T, BioDataError>;

/// Why a structured element failed the entity type check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchReason {
    /// The element is not an entity snapshot at all (scalar, array, null).
    NotAnEntity,
    /// The element is an entity snapshot of another kind.
    WrongEntity,
}

/// Errors raised by time records, validation and serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum BioDataError {
    /// Raw time value is malformed or outside the `i64` range.
    InvalidTimestamp(String),
    /// A structured element did not describe the required entity type.
    TypeMismatch {
        expected: &'static str,
        found: String,
        reason: MismatchReason,
    },
    /// Value omitted for a kind that does not allow null values.
    MissingValue { kind: String },
    /// Value is not a member of the kind's value whitelist.
    ValueNotAllowed {
        kind: String,
        value: String,
        allowed: Vec<String>,
    },
    /// Value failed the kind-specific value test.
    ValueRejected { kind: String, message: String },
    /// Unit absent when required, or present but not whitelisted.
    UnitNotAllowed {
        kind: String,
        unit: Option<String>,
        allowed: Vec<String>,
    },
    /// Encoding to or decoding from serialized text failed.
    Serialization(String),
}

impl BioDataError {
    /// Stable numeric code for this error kind.
    pub fn code(&self) -> u16 {
        match self {
            Self::TypeMismatch {
                reason: MismatchReason::WrongEntity,
                ..
            } => 600,
            Self::TypeMismatch {
                reason: MismatchReason::NotAnEntity,
                ..
            } => 601,
            Self::MissingValue { .. } => 610,
            Self::ValueNotAllowed { .. } => 611,
            Self::ValueRejected { .. } => 612,
            Self::InvalidTimestamp(_) => 621,
            Self::Serialization(_) => 690,
            Self::UnitNotAllowed { unit: Some(_), .. } => 700,
            Self::UnitNotAllowed { unit: None, .. } => 701,
        }
    }
}

impl Display for BioDataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimestamp(raw) => write!(f, "invalid timestamp: {raw}"),
            Self::TypeMismatch {
                expected,
                found,
                reason: MismatchReason::WrongEntity,
            } => write!(
                f,
                "unsupported object: {found}; all elements must be of type {expected}"
            ),
            Self::TypeMismatch {
                expected,
                found,
                reason: MismatchReason::NotAnEntity,
            } => write!(
                f,
                "unsupported type: {found}; all elements must be an object of type {expected}"
            ),
            Self::MissingValue { kind } => {
                write!(f, "{kind}: no value given, value must not be null")
            }
            Self::ValueNotAllowed {
                kind,
                value,
                allowed,
            } => write!(
                f,
                "{kind}: value `{value}` not allowed; allowed values (case sensitive): {}",
                quote_list(allowed)
            ),
            Self::ValueRejected { kind, message } => write!(f, "{kind}: {message}"),
            Self::UnitNotAllowed {
                kind,
                unit: None,
                allowed,
            } => write!(
                f,
                "{kind}: unit type not specified; allowed units (case sensitive): {}",
                quote_list(allowed)
            ),
            Self::UnitNotAllowed {
                kind,
                unit: Some(unit),
                allowed,
            } if allowed.is_empty() => {
                write!(f, "{kind}: unit `{unit}` not allowed; kind is dimensionless")
            }
            Self::UnitNotAllowed {
                kind,
                unit: Some(unit),
                allowed,
            } => write!(
                f,
                "{kind}: unit `{unit}` not allowed; allowed units (case sensitive): {}",
                quote_list(allowed)
            ),
            Self::Serialization(message) => write!(f, "serialization failed: {message}"),
        }
    }
}

impl Error for BioDataError {}

impl From<serde_json::Error> for BioDataError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}

fn quote_list(values: &[String]) -> String {
    values
        .iter()
        .map(|value| format!("'{value}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
