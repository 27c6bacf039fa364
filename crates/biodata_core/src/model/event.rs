//! Free-form biodata event (e.g. "started medication", "ran 5k").

use crate::error::BioResult;
use crate::model::record::{
    expect_entity, optional_text, Record, Structured, StructuredBuilder, ToStructured,
};
use crate::model::time::{TimeRecord, TimeWindow};
use serde_json::Value;

/// Entity tag used in serialized snapshots.
pub const EVENT_KIND: &str = "Event";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    title: Option<String>,
    description: Option<String>,
    time: TimeRecord,
}

impl Event {
    pub fn new(title: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
            time: TimeRecord::with_window(window),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Rebuilds an event from its snapshot.
    ///
    /// # Errors
    /// - `TypeMismatch` when `value` is not an `Event` snapshot.
    /// - `Serialization` when `title` or `description` is not a string.
    pub fn from_structured(value: &Value) -> BioResult<Self> {
        let map = expect_entity(value, EVENT_KIND)?;
        Ok(Self {
            title: optional_text(map, EVENT_KIND, "title")?,
            description: optional_text(map, EVENT_KIND, "description")?,
            time: TimeRecord::from_structured(map.get("time").unwrap_or(&Value::Null))?,
        })
    }
}

impl ToStructured for Event {
    fn to_structured(&self) -> BioResult<Structured> {
        Ok(StructuredBuilder::new(EVENT_KIND)
            .field("title", &self.title)?
            .field("description", &self.description)?
            .entity("time", &self.time)?
            .finish())
    }
}

impl Record for Event {
    fn kind(&self) -> &str {
        EVENT_KIND
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
    use super::Event;
    use crate::error::BioDataError;
    use crate::model::record::{Record, ToStructured};
    use crate::model::time::TimeWindow;
    use serde_json::{json, Value};

    #[test]
    fn event_without_description_prunes_it() {
        let event = Event::new("started medication", TimeWindow::starting(1_700_000_000).unwrap());
        let snapshot = event.to_structured().unwrap();

        assert_eq!(snapshot["title"], "started medication");
        assert!(!snapshot.contains_key("description"));
        assert_eq!(snapshot["time"]["start"], 1_700_000_000);
        assert_eq!(event.kind(), "Event");
    }

    #[test]
    fn event_snapshot_decodes() {
        let mut event = Event::new("run", TimeWindow::default());
        event.set_description(Some("5k along the river".to_string()));

        let snapshot = Value::Object(event.to_structured().unwrap());
        assert_eq!(Event::from_structured(&snapshot).unwrap(), event);
    }

    #[test]
    fn non_string_title_is_rejected() {
        let snapshot = json!({
            "kind": "Event",
            "title": ["run"],
            "time": { "kind": "TimeRecord", "created": 1 }
        });
        let err = Event::from_structured(&snapshot).unwrap_err();
        assert!(matches!(err, BioDataError::Serialization(_)));
    }
}
