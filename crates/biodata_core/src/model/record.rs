//! Base record contract and structured snapshot encoding.
//!
//! # Responsibility
//! - Define the attributes every biodata entity carries (`kind`, `time`).
//! - Produce ordered, null-pruned snapshots by recursing into owned entities.
//!
//! # Invariants
//! - `kind` is always the first key of a snapshot.
//! - Null/absent attributes never appear in a snapshot, at any depth.
//! - Serialized text is exactly the JSON encoding of `to_structured()`.

use crate::error::{BioDataError, BioResult, MismatchReason};
use crate::model::time::TimeRecord;
use serde::Serialize;
use serde_json::{Map, Value};

/// Ordered attribute-name -> value mapping for one entity.
pub type Structured = Map<String, Value>;

/// Anything that can describe itself as a structured snapshot.
pub trait ToStructured {
    fn to_structured(&self) -> BioResult<Structured>;
}

/// Common contract for biodata entities.
///
/// Attribute access is exposed as typed methods on each entity; this trait
/// only carries what every entity shares.
pub trait Record: ToStructured {
    /// Concrete type tag, e.g. `Measurement` or `HeartRate`.
    fn kind(&self) -> &str;

    fn time(&self) -> &TimeRecord;

    fn time_mut(&mut self) -> &mut TimeRecord;

    /// Replaces the owned time record.
    fn set_time(&mut self, time: TimeRecord) {
        *self.time_mut() = time;
    }

    /// Encodes `to_structured()` as compact JSON text.
    fn to_serialized_text(&self) -> BioResult<String> {
        let structured = self.to_structured()?;
        Ok(serde_json::to_string(&structured)?)
    }

    /// Encodes `to_structured()` as indented JSON text.
    fn to_serialized_text_pretty(&self) -> BioResult<String> {
        let structured = self.to_structured()?;
        Ok(serde_json::to_string_pretty(&structured)?)
    }
}

/// Incremental builder enforcing key order and the null-pruning rule.
pub struct StructuredBuilder {
    map: Structured,
}

impl StructuredBuilder {
    pub fn new(kind: &str) -> Self {
        let mut map = Structured::new();
        map.insert("kind".to_string(), Value::String(kind.to_string()));
        Self { map }
    }

    /// Adds a plain attribute; skipped when it encodes to null.
    pub fn field<T: Serialize + ?Sized>(mut self, name: &str, value: &T) -> BioResult<Self> {
        let value = prune_nulls(serde_json::to_value(value)?);
        if !value.is_null() {
            self.map.insert(name.to_string(), value);
        }
        Ok(self)
    }

    /// Adds an owned entity by recursing into its own snapshot.
    pub fn entity<E: ToStructured + ?Sized>(mut self, name: &str, entity: &E) -> BioResult<Self> {
        let nested = entity.to_structured()?;
        self.map.insert(name.to_string(), Value::Object(nested));
        Ok(self)
    }

    /// Adds an ordered sequence of owned entities.
    pub fn entities<'a, E, I>(mut self, name: &str, entities: I) -> BioResult<Self>
    where
        E: ToStructured + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let items = entities
            .into_iter()
            .map(|entity| entity.to_structured().map(Value::Object))
            .collect::<BioResult<Vec<_>>>()?;
        self.map.insert(name.to_string(), Value::Array(items));
        Ok(self)
    }

    pub fn finish(self) -> Structured {
        self.map
    }
}

/// Drops null members from every object inside `value`.
pub fn prune_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, member)| !member.is_null())
                .map(|(key, member)| (key, prune_nulls(member)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(prune_nulls).collect()),
        other => other,
    }
}

/// Checks that `value` is a snapshot of entity `expected` and returns its map.
///
/// # Errors
/// - `TypeMismatch/NotAnEntity` when `value` is not a JSON object.
/// - `TypeMismatch/WrongEntity` when the object's `kind` is not `expected`.
pub fn expect_entity<'v>(value: &'v Value, expected: &'static str) -> BioResult<&'v Structured> {
    let map = value.as_object().ok_or_else(|| BioDataError::TypeMismatch {
        expected,
        found: json_type_name(value).to_string(),
        reason: MismatchReason::NotAnEntity,
    })?;

    match map.get("kind").and_then(Value::as_str) {
        Some(kind) if kind == expected => Ok(map),
        Some(kind) => Err(BioDataError::TypeMismatch {
            expected,
            found: kind.to_string(),
            reason: MismatchReason::WrongEntity,
        }),
        None => Err(BioDataError::TypeMismatch {
            expected,
            found: "untagged object".to_string(),
            reason: MismatchReason::WrongEntity,
        }),
    }
}

/// Reads an optional string attribute from an entity snapshot.
///
/// # Errors
/// - `Serialization` when the attribute is present but not a string.
pub fn optional_text(map: &Structured, entity: &str, key: &str) -> BioResult<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(BioDataError::Serialization(format!(
            "{entity} {key} must be a string, got {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{expect_entity, optional_text, prune_nulls, StructuredBuilder};
    use crate::error::{BioDataError, MismatchReason};
    use serde_json::json;

    #[test]
    fn builder_keeps_kind_first_and_skips_nulls() {
        let structured = StructuredBuilder::new("Sample")
            .field("present", &3)
            .unwrap()
            .field("absent", &Option::<i64>::None)
            .unwrap()
            .finish();

        let keys: Vec<&str> = structured.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["kind", "present"]);
    }

    #[test]
    fn prune_nulls_recurses_into_nested_objects() {
        let pruned = prune_nulls(json!({
            "a": null,
            "b": { "c": null, "d": 1 },
            "e": [{ "f": null }]
        }));
        assert_eq!(pruned, json!({ "b": { "d": 1 }, "e": [{}] }));
    }

    #[test]
    fn expect_entity_reports_reason() {
        let err = expect_entity(&json!(42), "Measurement").unwrap_err();
        assert_eq!(
            err,
            BioDataError::TypeMismatch {
                expected: "Measurement",
                found: "number".to_string(),
                reason: MismatchReason::NotAnEntity,
            }
        );

        let err = expect_entity(&json!({ "kind": "Event" }), "Measurement").unwrap_err();
        assert_eq!(err.code(), 600);

        let measurement = json!({ "kind": "Measurement" });
        let ok = expect_entity(&measurement, "Measurement");
        assert!(ok.is_ok());
    }

    #[test]
    fn optional_text_rejects_non_strings() {
        let snapshot = json!({ "kind": "Event", "title": "run", "description": 5, "note": null });
        let map = snapshot.as_object().unwrap();

        assert_eq!(optional_text(map, "Event", "title").unwrap(), Some("run".to_string()));
        assert_eq!(optional_text(map, "Event", "note").unwrap(), None);
        assert_eq!(optional_text(map, "Event", "missing").unwrap(), None);

        let err = optional_text(map, "Event", "description").unwrap_err();
        assert_eq!(err.code(), 690);
        assert!(err.to_string().contains("description must be a string"));
    }
}
