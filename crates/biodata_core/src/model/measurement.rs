//! Single measurement leaf entity.
//!
//! A measurement is a pure data carrier: it stores value and unit as given.
//! Whether they are acceptable is decided by the owning constrained
//! measurement before the measurement is stored anywhere.

use crate::error::BioResult;
use crate::model::record::{
    expect_entity, optional_text, Record, Structured, StructuredBuilder, ToStructured,
};
use crate::model::time::{TimeRecord, TimeWindow};
use crate::model::value::MeasurementValue;
use serde_json::Value;

/// Entity tag used in serialized snapshots.
pub const MEASUREMENT_KIND: &str = "Measurement";

/// One `(value, unit, time)` sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    value: Option<MeasurementValue>,
    unit: Option<String>,
    time: TimeRecord,
}

impl Measurement {
    /// Creates a measurement stamped now, carrying `window`.
    pub fn new(value: Option<MeasurementValue>, unit: Option<&str>, window: TimeWindow) -> Self {
        Self::with_time(value, unit.map(str::to_string), TimeRecord::with_window(window))
    }

    pub fn with_time(
        value: Option<MeasurementValue>,
        unit: Option<String>,
        time: TimeRecord,
    ) -> Self {
        Self { value, unit, time }
    }

    pub fn value(&self) -> Option<&MeasurementValue> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: Option<MeasurementValue>) {
        self.value = value;
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn set_unit(&mut self, unit: Option<String>) {
        self.unit = unit;
    }

    /// Rebuilds a measurement from its structured snapshot.
    ///
    /// # Errors
    /// - `TypeMismatch` when `value` is not a `Measurement` snapshot, or its
    ///   `time` is not a `TimeRecord` snapshot.
    /// - `Serialization` when `value`/`unit` have an unsupported shape.
    pub fn from_structured(value: &Value) -> BioResult<Self> {
        let map = expect_entity(value, MEASUREMENT_KIND)?;

        let measured = match map.get("value") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(serde_json::from_value::<MeasurementValue>(raw.clone())?),
        };
        let unit = optional_text(map, MEASUREMENT_KIND, "unit")?;
        let time = TimeRecord::from_structured(map.get("time").unwrap_or(&Value::Null))?;

        Ok(Self::with_time(measured, unit, time))
    }
}

impl ToStructured for Measurement {
    fn to_structured(&self) -> BioResult<Structured> {
        Ok(StructuredBuilder::new(MEASUREMENT_KIND)
            .field("value", &self.value)?
            .field("unit", &self.unit)?
            .entity("time", &self.time)?
            .finish())
    }
}

impl Record for Measurement {
    fn kind(&self) -> &str {
        MEASUREMENT_KIND
    }

    fn time(&self) -> &TimeRecord {
        &self.time
    }

    fn time_mut(&mut self) -> &mut TimeRecord {
        &mut self.time
    }
}

#[cfg(test)]
mod tests {
    use super::Measurement;
    use crate::error::{BioDataError, MismatchReason};
    use crate::model::record::{Record, ToStructured};
    use crate::model::time::{FixedClock, TimeRecord, TimeWindow, Timestamp};
    use serde_json::{json, Value};

    fn fixed_time() -> TimeRecord {
        TimeRecord::with_clock(
            &FixedClock(Timestamp::from_epoch_seconds(1_690_000_000)),
            TimeWindow::default(),
        )
    }

    #[test]
    fn snapshot_matches_wire_shape() {
        let measurement =
            Measurement::with_time(Some(72.into()), Some("bpm".to_string()), fixed_time());

        let snapshot = Value::Object(measurement.to_structured().unwrap());
        assert_eq!(
            snapshot,
            json!({
                "kind": "Measurement",
                "value": 72,
                "unit": "bpm",
                "time": { "kind": "TimeRecord", "created": 1_690_000_000 }
            })
        );
    }

    #[test]
    fn absent_value_and_unit_are_pruned() {
        let measurement = Measurement::with_time(None, None, fixed_time());
        let text = measurement.to_serialized_text().unwrap();
        assert_eq!(
            text,
            r#"{"kind":"Measurement","time":{"kind":"TimeRecord","created":1690000000}}"#
        );
    }

    #[test]
    fn from_structured_restores_triple() {
        let window = TimeWindow::between(1_690_000_100, 1_690_028_900).unwrap();
        let time = TimeRecord::with_clock(&FixedClock(Timestamp::from_epoch_seconds(5)), window);
        let measurement = Measurement::with_time(Some(0.75.into()), Some("%".to_string()), time);

        let snapshot = Value::Object(measurement.to_structured().unwrap());
        let decoded = Measurement::from_structured(&snapshot).expect("snapshot decodes");
        assert_eq!(decoded, measurement);
    }

    #[test]
    fn from_structured_rejects_non_string_unit() {
        let snapshot = json!({
            "kind": "Measurement",
            "value": 1,
            "unit": 7,
            "time": { "kind": "TimeRecord", "created": 1 }
        });
        let err = Measurement::from_structured(&snapshot).unwrap_err();
        assert!(matches!(err, BioDataError::Serialization(_)));
    }

    #[test]
    fn from_structured_rejects_missing_time() {
        let err = Measurement::from_structured(&json!({ "kind": "Measurement", "value": 1 }))
            .unwrap_err();
        assert_eq!(
            err,
            BioDataError::TypeMismatch {
                expected: "TimeRecord",
                found: "null".to_string(),
                reason: MismatchReason::NotAnEntity,
            }
        );
    }
}
