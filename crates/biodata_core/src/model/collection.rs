//! Ordered, homogeneous measurement collection.
//!
//! # Invariants
//! - Insertion order is preserved; there is no deduplication or removal.
//! - Every element is a `Measurement`. The element type guarantees this for
//!   in-memory appends; structured input is checked element by element.

use crate::error::{BioDataError, BioResult, MismatchReason};
use crate::model::measurement::Measurement;
use crate::model::record::{expect_entity, Record, Structured, StructuredBuilder, ToStructured};
use crate::model::time::TimeRecord;
use serde_json::Value;

/// Entity tag used in serialized snapshots.
pub const MEASUREMENT_COLLECTION_KIND: &str = "MeasurementCollection";

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementCollection {
    time: TimeRecord,
    measurements: Vec<Measurement>,
}

impl MeasurementCollection {
    pub fn new() -> Self {
        Self::with_time(TimeRecord::new())
    }

    pub fn with_time(time: TimeRecord) -> Self {
        Self {
            time,
            measurements: Vec::new(),
        }
    }

    /// Appends `measurement` and returns the stored element.
    pub fn add_measurement(&mut self, measurement: Measurement) -> &Measurement {
        self.measurements.push(measurement);
        &self.measurements[self.measurements.len() - 1]
    }

    /// Appends one element given as a structured snapshot.
    ///
    /// # Errors
    /// - `TypeMismatch/NotAnEntity` (601) when `value` is not an object.
    /// - `TypeMismatch/WrongEntity` (600) when `value` is another entity kind.
    pub fn add_structured(&mut self, value: &Value) -> BioResult<&Measurement> {
        let measurement = Measurement::from_structured(value)?;
        Ok(self.add_measurement(measurement))
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn last(&self) -> Option<&Measurement> {
        self.measurements.last()
    }

    pub fn into_measurements(self) -> Vec<Measurement> {
        self.measurements
    }

    /// Rebuilds a collection from its structured snapshot.
    ///
    /// Nothing is returned unless every element passes the entity check.
    pub fn from_structured(value: &Value) -> BioResult<Self> {
        let map = expect_entity(value, MEASUREMENT_COLLECTION_KIND)?;
        let time = TimeRecord::from_structured(map.get("time").unwrap_or(&Value::Null))?;
        let mut collection = Self::with_time(time);

        match map.get("measurements") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for item in items {
                    collection.add_structured(item)?;
                }
            }
            Some(other) => {
                return Err(BioDataError::TypeMismatch {
                    expected: "Measurement list",
                    found: other.to_string(),
                    reason: MismatchReason::NotAnEntity,
                })
            }
        }

        Ok(collection)
    }
}

impl Default for MeasurementCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl ToStructured for MeasurementCollection {
    fn to_structured(&self) -> BioResult<Structured> {
        StructuredBuilder::new(MEASUREMENT_COLLECTION_KIND)
            .entity("time", &self.time)?
            .entities("measurements", &self.measurements)
            .map(StructuredBuilder::finish)
    }
}

impl Record for MeasurementCollection {
    fn kind(&self) -> &str {
        MEASUREMENT_COLLECTION_KIND
    }

    fn time(&self) -> &TimeRecord {
        &self.time
    }

    fn time_mut(&mut self) -> &mut TimeRecord {
        &mut self.time
    }
}
