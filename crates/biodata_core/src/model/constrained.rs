//! Constrained measurement: the validation engine.
//!
//! # Responsibility
//! - Carry per-kind constraint metadata (units, values, nullability, value test).
//! - Validate every candidate measurement before it reaches the collection.
//!
//! # Invariants
//! - Validation order is value stage, then unit stage; first failure wins.
//! - Whitelists use exact, case-sensitive string equality.
//! - A rejected measurement is never appended, not even partially.
//!
//! # See also
//! - `model::kinds` for the built-in constraint table.

use crate::error::{BioDataError, BioResult};
use crate::model::collection::MeasurementCollection;
use crate::model::kinds::MeasurementKind;
use crate::model::measurement::Measurement;
use crate::model::record::{expect_entity, Record, Structured, StructuredBuilder, ToStructured};
use crate::model::time::{TimeRecord, TimeWindow};
use crate::model::value::MeasurementValue;
use log::debug;
use serde_json::Value;

/// Kind-specific value check; `Err` carries the rejection message.
pub type ValueTest = fn(&MeasurementValue) -> Result<(), String>;

/// Default value test: every value passes.
pub fn accept_any(_value: &MeasurementValue) -> Result<(), String> {
    Ok(())
}

/// Declarative constraint metadata for one measurement kind.
///
/// Empty `allowed_units` means dimensionless (unit must be absent).
/// Empty `allowed_values` means no value whitelist.
#[derive(Debug, Clone, Copy)]
pub struct KindConstraints {
    pub allowed_units: &'static [&'static str],
    pub allowed_values: &'static [&'static str],
    pub value_can_be_null: bool,
    pub value_test: ValueTest,
}

impl KindConstraints {
    /// Constraints with the given unit whitelist and no other restriction.
    pub const fn units(allowed_units: &'static [&'static str]) -> Self {
        Self {
            allowed_units,
            allowed_values: &[],
            value_can_be_null: false,
            value_test: accept_any,
        }
    }

    /// Dimensionless constraints restricted to `allowed_values`.
    pub const fn values(allowed_values: &'static [&'static str]) -> Self {
        Self {
            allowed_units: &[],
            allowed_values,
            value_can_be_null: false,
            value_test: accept_any,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.value_can_be_null = true;
        self
    }

    pub const fn with_value_test(mut self, value_test: ValueTest) -> Self {
        self.value_test = value_test;
        self
    }

    /// Runs the value stage then the unit stage against `measurement`.
    pub fn validate(&self, kind: &str, measurement: &Measurement) -> BioResult<()> {
        self.check_value(kind, measurement.value())?;
        self.check_unit(kind, measurement.value(), measurement.unit())
    }

    /// Value stage: nullability, finiteness, whitelist, then the kind's value test.
    ///
    /// Infinite and NaN floats never pass: JSON cannot carry them, so they
    /// would vanish from the snapshot.
    pub fn check_value(&self, kind: &str, value: Option<&MeasurementValue>) -> BioResult<()> {
        let value = match value {
            Some(value) => value,
            None if self.value_can_be_null => return Ok(()),
            None => {
                return Err(BioDataError::MissingValue {
                    kind: kind.to_string(),
                })
            }
        };

        if let MeasurementValue::Float(number) = value {
            if !number.is_finite() {
                return Err(BioDataError::ValueRejected {
                    kind: kind.to_string(),
                    message: format!("value {number} is not a finite number"),
                });
            }
        }

        if !self.allowed_values.is_empty() {
            let listed = value
                .as_text()
                .map(|text| self.allowed_values.contains(&text))
                .unwrap_or(false);
            if !listed {
                return Err(BioDataError::ValueNotAllowed {
                    kind: kind.to_string(),
                    value: value.to_string(),
                    allowed: to_owned_list(self.allowed_values),
                });
            }
        }

        (self.value_test)(value).map_err(|message| BioDataError::ValueRejected {
            kind: kind.to_string(),
            message,
        })
    }

    /// Unit stage: skipped for an accepted null value.
    pub fn check_unit(
        &self,
        kind: &str,
        value: Option<&MeasurementValue>,
        unit: Option<&str>,
    ) -> BioResult<()> {
        if value.is_none() && self.value_can_be_null {
            return Ok(());
        }

        let accepted = match unit {
            None => self.allowed_units.is_empty(),
            Some(unit) => self.allowed_units.contains(&unit),
        };
        if accepted {
            return Ok(());
        }

        Err(BioDataError::UnitNotAllowed {
            kind: kind.to_string(),
            unit: unit.map(str::to_string),
            allowed: to_owned_list(self.allowed_units),
        })
    }
}

/// A measurement kind instance owning its validated measurements.
#[derive(Debug, Clone)]
pub struct ConstrainedMeasurement {
    kind: &'static str,
    constraints: KindConstraints,
    time: TimeRecord,
    collection: MeasurementCollection,
}

impl ConstrainedMeasurement {
    /// Builds a built-in kind, optionally recording one measurement at once.
    ///
    /// A measurement is recorded when `value` is present, or when the kind
    /// is nullable and a non-empty `window` was supplied (an unmeasured
    /// sample that still carries its time window).
    pub fn new(
        kind: MeasurementKind,
        value: Option<MeasurementValue>,
        unit: Option<&str>,
        window: TimeWindow,
    ) -> BioResult<Self> {
        Self::with_constraints(kind.name(), kind.constraints(), value, unit, window)
    }

    /// Builds a built-in kind with no measurements.
    pub fn empty(kind: MeasurementKind) -> Self {
        Self::bare(kind.name(), kind.constraints(), TimeRecord::new())
    }

    /// Same as [`ConstrainedMeasurement::new`] for a caller-defined kind.
    pub fn with_constraints(
        kind: &'static str,
        constraints: KindConstraints,
        value: Option<MeasurementValue>,
        unit: Option<&str>,
        window: TimeWindow,
    ) -> BioResult<Self> {
        let mut entity = Self::bare(kind, constraints, TimeRecord::with_window(window));
        let records_now =
            value.is_some() || (constraints.value_can_be_null && !window.is_empty());
        if records_now {
            entity.add_measurement(value, unit, None)?;
        }
        Ok(entity)
    }

    fn bare(kind: &'static str, constraints: KindConstraints, time: TimeRecord) -> Self {
        Self {
            kind,
            constraints,
            time,
            collection: MeasurementCollection::new(),
        }
    }

    /// Validates and appends one measurement.
    ///
    /// `window` defaults to this entity's own start/finish window.
    ///
    /// # Errors
    /// - `MissingValue`, `ValueNotAllowed`, `ValueRejected` from the value stage.
    /// - `UnitNotAllowed` from the unit stage.
    pub fn add_measurement(
        &mut self,
        value: Option<MeasurementValue>,
        unit: Option<&str>,
        window: Option<TimeWindow>,
    ) -> BioResult<&Measurement> {
        let window = window.unwrap_or_else(|| self.default_window());
        self.push_validated(Measurement::new(value, unit, window))
    }

    /// Shorthand for a present value in the default window.
    pub fn add(
        &mut self,
        value: impl Into<MeasurementValue>,
        unit: Option<&str>,
    ) -> BioResult<&Measurement> {
        self.add_measurement(Some(value.into()), unit, None)
    }

    /// Validates and appends one measurement with a caller-built time record.
    pub fn add_measurement_with_time(
        &mut self,
        value: Option<MeasurementValue>,
        unit: Option<&str>,
        time: TimeRecord,
    ) -> BioResult<&Measurement> {
        self.push_validated(Measurement::with_time(value, unit.map(str::to_string), time))
    }

    fn push_validated(&mut self, measurement: Measurement) -> BioResult<&Measurement> {
        if let Err(err) = self.constraints.validate(self.kind, &measurement) {
            debug!(
                "event=measurement_rejected module=validation kind={} code={}",
                self.kind,
                err.code()
            );
            return Err(err);
        }

        debug!(
            "event=measurement_accepted module=validation kind={} count={}",
            self.kind,
            self.collection.len() + 1
        );
        Ok(self.collection.add_measurement(measurement))
    }

    /// Window applied when `add_measurement` gets none.
    pub fn default_window(&self) -> TimeWindow {
        self.time.window()
    }

    pub fn constraints(&self) -> &KindConstraints {
        &self.constraints
    }

    pub fn allowed_units(&self) -> &'static [&'static str] {
        self.constraints.allowed_units
    }

    pub fn allowed_values(&self) -> &'static [&'static str] {
        self.constraints.allowed_values
    }

    pub fn value_can_be_null(&self) -> bool {
        self.constraints.value_can_be_null
    }

    pub fn measurement_collection(&self) -> &MeasurementCollection {
        &self.collection
    }

    pub fn measurements(&self) -> &[Measurement] {
        self.collection.measurements()
    }

    /// Rebuilds a built-in kind from its snapshot, revalidating every element.
    ///
    /// # Errors
    /// - `TypeMismatch` when the snapshot is not tagged with `kind`'s name or
    ///   any element is not a `Measurement`.
    /// - Any validation error raised by replaying a stored measurement.
    pub fn from_structured(kind: MeasurementKind, value: &Value) -> BioResult<Self> {
        let map = expect_entity(value, kind.name())?;
        let time = TimeRecord::from_structured(map.get("time").unwrap_or(&Value::Null))?;
        let stored = MeasurementCollection::from_structured(
            map.get("measurementCollection").unwrap_or(&Value::Null),
        )?;

        let mut entity = Self::bare(kind.name(), kind.constraints(), time);
        entity.collection = MeasurementCollection::with_time(stored.time().clone());
        for measurement in stored.into_measurements() {
            entity.push_validated(measurement)?;
        }
        Ok(entity)
    }
}

impl ToStructured for ConstrainedMeasurement {
    fn to_structured(&self) -> BioResult<Structured> {
        Ok(StructuredBuilder::new(self.kind)
            .entity("time", &self.time)?
            .entity("measurementCollection", &self.collection)?
            .finish())
    }
}

impl Record for ConstrainedMeasurement {
    fn kind(&self) -> &str {
        self.kind
    }

    fn time(&self) -> &TimeRecord {
        &self.time
    }

    fn time_mut(&mut self) -> &mut TimeRecord {
        &mut self.time
    }
}

fn to_owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
