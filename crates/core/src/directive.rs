//! Parsing of model completions into directives.
//!
//! The model must answer every round with exactly one flat JSON object in
//! one of three shapes:
//!
//! - `{"tool": "<tool_name>", "input": "<string>"}`
//! - `{"answer": "<string>"}`
//! - `{"error": "<string>"}`

use serde_json::{Map, Value};

/// The parsed form of one model completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// The model wants a tool to be invoked.
    ToolCall {
        /// Name of the requested tool.
        tool_name: String,
        /// Text input for the tool, empty when omitted.
        tool_input: String,
    },
    /// The model produced the final answer.
    FinalAnswer {
        /// The answer text.
        text: String,
    },
    /// The model explicitly declined to comply.
    ProtocolError {
        /// The message the model gave.
        message: String,
    },
    /// The completion is not valid JSON.
    Unparseable,
    /// The completion is valid JSON but has none of the recognized keys.
    Unrecognized,
}

impl Directive {
    /// Parses a raw completion.
    ///
    /// When several recognized keys are present, `error` wins over `tool`,
    /// which wins over `answer`.
    pub fn parse(raw: &str) -> Self {
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(err) => {
                trace!("completion is not json: {err}");
                return Directive::Unparseable;
            }
        };
        let Value::Object(object) = value else {
            return Directive::Unrecognized;
        };
        Self::from_object(object)
    }

    fn from_object(mut object: Map<String, Value>) -> Self {
        if let Some(message) = object.remove("error") {
            return Directive::ProtocolError {
                message: value_to_text(message),
            };
        }
        if let Some(tool_name) = object.remove("tool") {
            let tool_input = object
                .remove("input")
                .map(value_to_text)
                .unwrap_or_default();
            return Directive::ToolCall {
                tool_name: value_to_text(tool_name),
                tool_input,
            };
        }
        if let Some(text) = object.remove("answer") {
            return Directive::FinalAnswer {
                text: value_to_text(text),
            };
        }
        Directive::Unrecognized
    }

    /// Returns `true` if this directive ends the turn.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Directive::ToolCall { .. } | Directive::Unparseable)
    }
}

/// Strings are taken as-is, `null` becomes empty, everything else is
/// rendered as compact JSON.
fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
