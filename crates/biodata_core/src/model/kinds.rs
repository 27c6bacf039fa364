//! Built-in measurement kinds and their constraint table.
//!
//! Kinds are data: each one maps to a `KindConstraints` value. Mood-derived
//! kinds share the mood constraints and report `Mood` as their family.

use crate::model::constrained::KindConstraints;
use crate::model::value::MeasurementValue;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const HEART_RATE_UNITS: &[&str] = &["bpm", "b/m"];
pub const BLOOD_PRESSURE_UNITS: &[&str] = &["mmHg"];
pub const HEIGHT_UNITS: &[&str] = &["m", "ft", "in"];
pub const WEIGHT_UNITS: &[&str] = &["kg", "st", "lbs"];
pub const MOOD_UNITS: &[&str] = &["%", "percent"];
pub const BLOOD_SUGAR_UNITS: &[&str] = &["mmol/L", "mg/dL"];
pub const BLOOD_INSULIN_UNITS: &[&str] = &["pmol/L", "uIU/mL"];

pub const ABO_BLOOD_TYPES: &[&str] = &["O+", "A+", "B+", "AB+", "O-", "A-", "B-", "AB-"];
/// Fisher-Race Rh haplotype codes.
pub const RH_TYPES: &[&str] = &["CDe", "cDE", "cDe", "CDE", "cde", "Cde", "cdE", "CdE"];

static DATE_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(?:T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2}))?$")
        .expect("valid date shape regex")
});

/// Every built-in measurement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeasurementKind {
    HeartRate,
    BloodPressureDiastolic,
    BloodPressureSystolic,
    Height,
    Weight,
    Mood,
    Happiness,
    Arousal,
    Tiredness,
    Sleep,
    AboBloodType,
    RhType,
    DateOfBirth,
    BloodSugar,
    BloodInsulin,
}

const ALL_KINDS: &[MeasurementKind] = &[
    MeasurementKind::HeartRate,
    MeasurementKind::BloodPressureDiastolic,
    MeasurementKind::BloodPressureSystolic,
    MeasurementKind::Height,
    MeasurementKind::Weight,
    MeasurementKind::Mood,
    MeasurementKind::Happiness,
    MeasurementKind::Arousal,
    MeasurementKind::Tiredness,
    MeasurementKind::Sleep,
    MeasurementKind::AboBloodType,
    MeasurementKind::RhType,
    MeasurementKind::DateOfBirth,
    MeasurementKind::BloodSugar,
    MeasurementKind::BloodInsulin,
];

/// Returns all built-in kinds in declaration order.
pub fn supported_kinds() -> &'static [MeasurementKind] {
    ALL_KINDS
}

impl MeasurementKind {
    /// Stable type tag used as the snapshot `kind`.
    pub fn name(self) -> &'static str {
        match self {
            Self::HeartRate => "HeartRate",
            Self::BloodPressureDiastolic => "BloodPressureDiastolic",
            Self::BloodPressureSystolic => "BloodPressureSystolic",
            Self::Height => "Height",
            Self::Weight => "Weight",
            Self::Mood => "Mood",
            Self::Happiness => "Happiness",
            Self::Arousal => "Arousal",
            Self::Tiredness => "Tiredness",
            Self::Sleep => "Sleep",
            Self::AboBloodType => "ABOBloodType",
            Self::RhType => "RhType",
            Self::DateOfBirth => "DateOfBirth",
            Self::BloodSugar => "BloodSugar",
            Self::BloodInsulin => "BloodInsulin",
        }
    }

    /// Parent kind whose constraints this kind reuses, if any.
    pub fn family(self) -> Option<MeasurementKind> {
        match self {
            Self::Happiness | Self::Arousal | Self::Tiredness => Some(Self::Mood),
            _ => None,
        }
    }

    pub fn constraints(self) -> KindConstraints {
        if let Some(parent) = self.family() {
            return parent.constraints();
        }
        match self {
            Self::HeartRate => KindConstraints::units(HEART_RATE_UNITS),
            Self::BloodPressureDiastolic | Self::BloodPressureSystolic => {
                KindConstraints::units(BLOOD_PRESSURE_UNITS)
            }
            Self::Height => KindConstraints::units(HEIGHT_UNITS).with_value_test(non_negative),
            Self::Weight => KindConstraints::units(WEIGHT_UNITS).with_value_test(non_negative),
            Self::Mood | Self::Happiness | Self::Arousal | Self::Tiredness => {
                KindConstraints::units(MOOD_UNITS).with_value_test(unit_interval)
            }
            Self::Sleep => KindConstraints::units(MOOD_UNITS)
                .nullable()
                .with_value_test(unit_interval),
            Self::AboBloodType => KindConstraints::values(ABO_BLOOD_TYPES),
            Self::RhType => KindConstraints::values(RH_TYPES),
            Self::DateOfBirth => KindConstraints::units(&[]).with_value_test(date_of_birth),
            Self::BloodSugar => {
                KindConstraints::units(BLOOD_SUGAR_UNITS).with_value_test(non_negative)
            }
            Self::BloodInsulin => {
                KindConstraints::units(BLOOD_INSULIN_UNITS).with_value_test(non_negative)
            }
        }
    }
}

impl Display for MeasurementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MeasurementKind {
    type Err = UnknownKindError;

    /// Exact, case-sensitive match on `name()`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ALL_KINDS
            .iter()
            .copied()
            .find(|kind| kind.name() == value)
            .ok_or_else(|| UnknownKindError(value.to_string()))
    }
}

/// Lookup failure for a kind name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKindError(pub String);

impl Display for UnknownKindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown measurement kind: {}", self.0)
    }
}

impl Error for UnknownKindError {}

fn numeric(value: &MeasurementValue) -> Result<f64, String> {
    match value.as_f64() {
        Some(number) if number.is_finite() => Ok(number),
        Some(number) => Err(format!("value must be a finite number, got {number}")),
        None => Err(format!("value must be numeric, got {}", value.type_name())),
    }
}

fn non_negative(value: &MeasurementValue) -> Result<(), String> {
    if numeric(value)? < 0.0 {
        return Err(format!("negative value {value} not permitted"));
    }
    Ok(())
}

fn unit_interval(value: &MeasurementValue) -> Result<(), String> {
    let number = numeric(value)?;
    if !(0.0..=1.0).contains(&number) {
        return Err(format!("value {value} outside [0, 1]"));
    }
    Ok(())
}

fn date_of_birth(value: &MeasurementValue) -> Result<(), String> {
    let instant = match value {
        MeasurementValue::DateTime(instant) => *instant,
        MeasurementValue::Text(text) => parse_date_text(text)?,
        other => {
            return Err(format!(
                "date of birth must be a date or date-time, got {}",
                other.type_name()
            ))
        }
    };
    if instant > Utc::now() {
        return Err(format!("date of birth {} lies in the future", instant.to_rfc3339()));
    }
    Ok(())
}

fn parse_date_text(text: &str) -> Result<DateTime<Utc>, String> {
    if !DATE_SHAPE_RE.is_match(text) {
        return Err(format!("`{text}` is not shaped like YYYY-MM-DD or RFC 3339"));
    }
    if text.len() == 10 {
        return NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| format!("`{text}` is not a valid calendar date"));
    }
    DateTime::parse_from_rfc3339(text)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| format!("`{text}` is not a valid date-time: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{date_of_birth, non_negative, supported_kinds, unit_interval, MeasurementKind};
    use crate::model::value::MeasurementValue;
    use std::str::FromStr;

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in supported_kinds() {
            assert_eq!(MeasurementKind::from_str(kind.name()).unwrap(), *kind);
        }
        assert!(MeasurementKind::from_str("heartrate").is_err());
        assert_eq!(
            "ABOBloodType".parse::<MeasurementKind>().unwrap(),
            MeasurementKind::AboBloodType
        );
    }

    #[test]
    fn mood_family_shares_mood_constraints() {
        let mood = MeasurementKind::Mood.constraints();
        for kind in [
            MeasurementKind::Happiness,
            MeasurementKind::Arousal,
            MeasurementKind::Tiredness,
        ] {
            assert_eq!(kind.family(), Some(MeasurementKind::Mood));
            let constraints = kind.constraints();
            assert_eq!(constraints.allowed_units, mood.allowed_units);
            assert!(!constraints.value_can_be_null);
        }
        assert_eq!(MeasurementKind::Sleep.family(), None);
    }

    #[test]
    fn only_sleep_is_nullable() {
        let nullable: Vec<MeasurementKind> = supported_kinds()
            .iter()
            .copied()
            .filter(|kind| kind.constraints().value_can_be_null)
            .collect();
        assert_eq!(nullable, vec![MeasurementKind::Sleep]);
    }

    #[test]
    fn numeric_tests_reject_out_of_range_and_non_numbers() {
        assert!(non_negative(&MeasurementValue::from(0)).is_ok());
        assert!(non_negative(&MeasurementValue::from(-0.1)).is_err());
        assert!(non_negative(&MeasurementValue::from("5")).is_err());
        assert!(non_negative(&MeasurementValue::Float(f64::NAN)).is_err());
        assert!(non_negative(&MeasurementValue::Float(f64::INFINITY)).is_err());

        assert!(unit_interval(&MeasurementValue::from(0)).is_ok());
        assert!(unit_interval(&MeasurementValue::from(1)).is_ok());
        assert!(unit_interval(&MeasurementValue::from(1.01)).is_err());
        assert!(unit_interval(&MeasurementValue::from(-0.5)).is_err());
    }

    #[test]
    fn date_of_birth_requires_past_date_shape() {
        assert!(date_of_birth(&MeasurementValue::from("1990-04-01")).is_ok());
        assert!(date_of_birth(&MeasurementValue::from("1990-04-01T08:30:00+02:00")).is_ok());
        assert!(date_of_birth(&MeasurementValue::from("1990-02-30")).is_err());
        assert!(date_of_birth(&MeasurementValue::from("01/04/1990")).is_err());
        assert!(date_of_birth(&MeasurementValue::from("9999-01-01")).is_err());
        assert!(date_of_birth(&MeasurementValue::from(19900401)).is_err());
    }
}
