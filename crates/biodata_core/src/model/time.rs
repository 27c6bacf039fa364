//! Time records attached to every biodata entity.
//!
//! # Responsibility
//! - Hold creation/start/finish instants for one entity.
//! - Validate raw time input before it is assigned.
//!
//! # Invariants
//! - All instants are integer Unix epoch seconds within `i64` range.
//! - `created` is set once at construction from a `Clock`.
//! - `start`/`finish` are optional; absent values are pruned on serialization.

use crate::error::{BioDataError, BioResult};
use crate::model::record::{expect_entity, Structured, StructuredBuilder, ToStructured};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Entity tag used in serialized snapshots.
pub const TIME_RECORD_KIND: &str = "TimeRecord";

/// Unix epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_epoch_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    pub const fn epoch_seconds(self) -> i64 {
        self.0
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw time input accepted by time record setters.
///
/// Every implementation runs the same range/shape check, so an invalid value
/// is rejected before any field is touched.
pub trait IntoTimestamp {
    fn into_timestamp(self) -> BioResult<Timestamp>;
}

impl IntoTimestamp for Timestamp {
    fn into_timestamp(self) -> BioResult<Timestamp> {
        Ok(self)
    }
}

impl IntoTimestamp for i64 {
    fn into_timestamp(self) -> BioResult<Timestamp> {
        Ok(Timestamp(self))
    }
}

impl IntoTimestamp for i32 {
    fn into_timestamp(self) -> BioResult<Timestamp> {
        Ok(Timestamp(i64::from(self)))
    }
}

impl IntoTimestamp for u64 {
    fn into_timestamp(self) -> BioResult<Timestamp> {
        i64::try_from(self)
            .map(Timestamp)
            .map_err(|_| BioDataError::InvalidTimestamp(self.to_string()))
    }
}

impl IntoTimestamp for i128 {
    fn into_timestamp(self) -> BioResult<Timestamp> {
        i64::try_from(self)
            .map(Timestamp)
            .map_err(|_| BioDataError::InvalidTimestamp(self.to_string()))
    }
}

impl IntoTimestamp for f64 {
    fn into_timestamp(self) -> BioResult<Timestamp> {
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
        if self.is_finite()
            && self.fract() == 0.0
            && self >= i64::MIN as f64
            && self < i64::MAX as f64
        {
            Ok(Timestamp(self as i64))
        } else {
            Err(BioDataError::InvalidTimestamp(self.to_string()))
        }
    }
}

impl IntoTimestamp for &str {
    fn into_timestamp(self) -> BioResult<Timestamp> {
        self.trim()
            .parse::<i64>()
            .map(Timestamp)
            .map_err(|_| BioDataError::InvalidTimestamp(format!("`{self}`")))
    }
}

impl IntoTimestamp for String {
    fn into_timestamp(self) -> BioResult<Timestamp> {
        self.as_str().into_timestamp()
    }
}

impl IntoTimestamp for &Value {
    fn into_timestamp(self) -> BioResult<Timestamp> {
        match self {
            Value::Number(number) => {
                if let Some(seconds) = number.as_i64() {
                    Ok(Timestamp(seconds))
                } else if let Some(unsigned) = number.as_u64() {
                    unsigned.into_timestamp()
                } else {
                    number
                        .as_f64()
                        .ok_or_else(|| BioDataError::InvalidTimestamp(number.to_string()))?
                        .into_timestamp()
                }
            }
            Value::String(raw) => raw.as_str().into_timestamp(),
            other => Err(BioDataError::InvalidTimestamp(other.to_string())),
        }
    }
}

/// Validates one raw time value without assigning it.
pub fn validate_timestamp(value: impl IntoTimestamp) -> BioResult<Timestamp> {
    value.into_timestamp()
}

/// Current-time provider.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp(Utc::now().timestamp())
    }
}

/// Clock frozen at one instant, for deterministic snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Optional start/finish pair supplied alongside a measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<Timestamp>,
    pub finish: Option<Timestamp>,
}

impl TimeWindow {
    pub fn starting(start: impl IntoTimestamp) -> BioResult<Self> {
        Ok(Self {
            start: Some(start.into_timestamp()?),
            finish: None,
        })
    }

    pub fn between(start: impl IntoTimestamp, finish: impl IntoTimestamp) -> BioResult<Self> {
        Ok(Self {
            start: Some(start.into_timestamp()?),
            finish: Some(finish.into_timestamp()?),
        })
    }

    /// `true` when neither bound is set, i.e. no window was supplied.
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.finish.is_none()
    }
}

/// Creation/start/finish instants owned by exactly one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRecord {
    created: Timestamp,
    start: Option<Timestamp>,
    finish: Option<Timestamp>,
}

impl TimeRecord {
    /// Creates a record stamped with the current wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(&SystemClock, TimeWindow::default())
    }

    /// Creates a record stamped now, carrying `window`.
    pub fn with_window(window: TimeWindow) -> Self {
        Self::with_clock(&SystemClock, window)
    }

    pub fn with_clock(clock: &dyn Clock, window: TimeWindow) -> Self {
        Self {
            created: clock.now(),
            start: window.start,
            finish: window.finish,
        }
    }

    /// Creates a record with an explicit creation time.
    pub fn created_at(created: impl IntoTimestamp) -> BioResult<Self> {
        Ok(Self {
            created: created.into_timestamp()?,
            start: None,
            finish: None,
        })
    }

    pub fn created(&self) -> Timestamp {
        self.created
    }

    pub fn start(&self) -> Option<Timestamp> {
        self.start
    }

    pub fn finish(&self) -> Option<Timestamp> {
        self.finish
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start,
            finish: self.finish,
        }
    }

    pub fn set_start(&mut self, start: impl IntoTimestamp) -> BioResult<()> {
        self.start = Some(start.into_timestamp()?);
        Ok(())
    }

    pub fn set_finish(&mut self, finish: impl IntoTimestamp) -> BioResult<()> {
        self.finish = Some(finish.into_timestamp()?);
        Ok(())
    }

    pub fn clear_start(&mut self) {
        self.start = None;
    }

    pub fn clear_finish(&mut self) {
        self.finish = None;
    }

    /// Rebuilds a time record from its structured snapshot.
    ///
    /// # Errors
    /// - `TypeMismatch` when `value` is not a `TimeRecord` snapshot.
    /// - `InvalidTimestamp` when `created` is missing or any instant is malformed.
    pub fn from_structured(value: &Value) -> BioResult<Self> {
        let map = expect_entity(value, TIME_RECORD_KIND)?;
        let created = map
            .get("created")
            .ok_or_else(|| BioDataError::InvalidTimestamp("missing `created`".to_string()))?
            .into_timestamp()?;
        let start = optional_instant(map, "start")?;
        let finish = optional_instant(map, "finish")?;
        Ok(Self {
            created,
            start,
            finish,
        })
    }
}

impl Default for TimeRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl ToStructured for TimeRecord {
    fn to_structured(&self) -> BioResult<Structured> {
        Ok(StructuredBuilder::new(TIME_RECORD_KIND)
            .field("created", &self.created)?
            .field("start", &self.start)?
            .field("finish", &self.finish)?
            .finish())
    }
}

fn optional_instant(map: &Structured, key: &str) -> BioResult<Option<Timestamp>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => raw.into_timestamp().map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_timestamp, FixedClock, TimeRecord, TimeWindow, Timestamp};
    use crate::error::BioDataError;
    use crate::model::record::ToStructured;
    use serde_json::json;

    #[test]
    fn validate_accepts_integral_values_in_range() {
        assert_eq!(
            validate_timestamp(1_690_000_000_i64).expect("i64 is valid"),
            Timestamp::from_epoch_seconds(1_690_000_000)
        );
        assert_eq!(
            validate_timestamp("1690000000").expect("digit string is valid"),
            Timestamp::from_epoch_seconds(1_690_000_000)
        );
        assert_eq!(
            validate_timestamp(-5.0_f64).expect("integral float is valid"),
            Timestamp::from_epoch_seconds(-5)
        );
    }

    #[test]
    fn validate_rejects_out_of_range_and_malformed_values() {
        for err in [
            validate_timestamp(u64::MAX).unwrap_err(),
            validate_timestamp(i128::from(i64::MAX) + 1).unwrap_err(),
            validate_timestamp(1.5_f64).unwrap_err(),
            validate_timestamp(f64::NAN).unwrap_err(),
            validate_timestamp(1e30_f64).unwrap_err(),
            validate_timestamp("yesterday").unwrap_err(),
            validate_timestamp(&json!(true)).unwrap_err(),
        ] {
            assert!(matches!(err, BioDataError::InvalidTimestamp(_)));
            assert_eq!(err.code(), 621);
        }
    }

    #[test]
    fn failed_setter_leaves_record_untouched() {
        let mut time = TimeRecord::created_at(100).expect("valid created");
        time.set_start(150).expect("valid start");

        let err = time.set_start("not-a-time").unwrap_err();
        assert!(matches!(err, BioDataError::InvalidTimestamp(_)));
        assert_eq!(time.start(), Some(Timestamp::from_epoch_seconds(150)));
    }

    #[test]
    fn structured_output_prunes_absent_bounds() {
        let clock = FixedClock(Timestamp::from_epoch_seconds(1_690_000_000));
        let time = TimeRecord::with_clock(&clock, TimeWindow::default());

        let structured = time.to_structured().expect("time record serializes");
        assert_eq!(
            serde_json::Value::Object(structured),
            json!({ "kind": "TimeRecord", "created": 1_690_000_000 })
        );
    }

    #[test]
    fn from_structured_reads_back_window() {
        let clock = FixedClock(Timestamp::from_epoch_seconds(10));
        let window = TimeWindow::between(20, 30).expect("valid window");
        let time = TimeRecord::with_clock(&clock, window);

        let snapshot = serde_json::Value::Object(time.to_structured().unwrap());
        let decoded = TimeRecord::from_structured(&snapshot).expect("snapshot decodes");
        assert_eq!(decoded, time);
    }

    #[test]
    fn from_structured_requires_created() {
        let err = TimeRecord::from_structured(&json!({ "kind": "TimeRecord" })).unwrap_err();
        assert!(matches!(err, BioDataError::InvalidTimestamp(_)));
    }
}
