//! Scalar payload carried by a measurement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Closed set of scalar shapes a measurement value can take.
///
/// Serialized untagged: numbers, booleans and strings map to their JSON
/// counterparts. A date-time is written as `{"dateTime": "<RFC 3339>"}` so a
/// text value shaped like a date always decodes back to `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(#[serde(with = "tagged_date_time")] DateTime<Utc>),
    Text(String),
}

mod tagged_date_time {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Tagged {
        #[serde(rename = "dateTime")]
        date_time: DateTime<Utc>,
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Tagged { date_time: *value }.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Tagged::deserialize(deserializer).map(|tagged| tagged.date_time)
    }
}

impl MeasurementValue {
    /// Numeric view used by range tests; `None` for non-numeric shapes.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Short shape name used in rejection messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::DateTime(_) => "date-time",
            Self::Text(_) => "text",
        }
    }
}

impl Display for MeasurementValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::DateTime(value) => write!(f, "{}", value.to_rfc3339()),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for MeasurementValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for MeasurementValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for MeasurementValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for MeasurementValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<Utc>> for MeasurementValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<&str> for MeasurementValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MeasurementValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::MeasurementValue;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn serializes_untagged() {
        assert_eq!(serde_json::to_value(MeasurementValue::from(72)).unwrap(), json!(72));
        assert_eq!(serde_json::to_value(MeasurementValue::from(0.5)).unwrap(), json!(0.5));
        assert_eq!(serde_json::to_value(MeasurementValue::from("O+")).unwrap(), json!("O+"));
    }

    #[test]
    fn date_time_is_tagged_and_decodes_back() {
        let instant = Utc.with_ymd_and_hms(1990, 4, 1, 0, 0, 0).unwrap();
        let encoded = serde_json::to_value(MeasurementValue::DateTime(instant)).unwrap();
        assert_eq!(encoded, json!({ "dateTime": "1990-04-01T00:00:00Z" }));

        let decoded: MeasurementValue = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, MeasurementValue::DateTime(instant));
    }

    #[test]
    fn date_shaped_text_stays_text() {
        for text in ["1990-04-01T08:30:00+02:00", "1990-04-01T00:00:00Z", "AB-"] {
            let encoded = serde_json::to_value(MeasurementValue::from(text)).unwrap();
            assert_eq!(encoded, json!(text));

            let decoded: MeasurementValue = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, MeasurementValue::Text(text.to_string()));
        }
    }

    #[test]
    fn objects_with_extra_keys_are_not_date_times() {
        let raw = json!({ "dateTime": "1990-04-01T00:00:00Z", "zone": "CET" });
        assert!(serde_json::from_value::<MeasurementValue>(raw).is_err());
    }

    #[test]
    fn numeric_view_covers_integers_and_floats_only() {
        assert_eq!(MeasurementValue::from(3).as_f64(), Some(3.0));
        assert_eq!(MeasurementValue::from(0.25).as_f64(), Some(0.25));
        assert_eq!(MeasurementValue::from(true).as_f64(), None);
        assert_eq!(MeasurementValue::from("3").as_f64(), None);
    }
}
