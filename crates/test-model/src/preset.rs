use serde::{Deserialize, Serialize};

/// The events in a preset response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetEvent {
    #[serde(rename = "message_delta")]
    MessageDelta(String),
}

/// The preset response for one model round-trip.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Events in this response.
    pub events: Vec<PresetEvent>,
    /// If set, the request fails instead of producing any event.
    #[serde(default)]
    pub fails: bool,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified events.
    #[inline]
    pub fn with_events(events: impl Into<Vec<PresetEvent>>) -> Self {
        Self {
            events: events.into(),
            fails: false,
        }
    }

    /// Creates a `PresetResponse` whose whole text arrives in one delta.
    #[inline]
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self::with_events([PresetEvent::MessageDelta(text.into())])
    }

    /// Creates a `PresetResponse` that fails at the transport level.
    #[inline]
    pub fn failing() -> Self {
        Self {
            events: vec![],
            fails: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let response = PresetResponse::with_events([
            PresetEvent::MessageDelta("{\"tool\": \"query_database\", ".to_owned()),
            PresetEvent::MessageDelta(
                "\"input\": \"SELECT COUNT(*) FROM Track;\"}".to_owned(),
            ),
        ]);

        let serialized = serde_json::to_string(&response).unwrap();
        let deserialized: PresetResponse =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(response, deserialized);
    }

    #[test]
    fn test_fails_defaults_to_false() {
        let deserialized: PresetResponse = serde_json::from_str(
            r#"{"events": [{"type": "message_delta", "data": "hi"}]}"#,
        )
        .unwrap();
        assert_eq!(deserialized, PresetResponse::text("hi"));
    }
}
