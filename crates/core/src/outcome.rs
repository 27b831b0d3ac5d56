use std::fmt::{self, Display};

/// The terminal outcome of one turn.
///
/// Every outcome renders as the text shown to the user, so callers that
/// only need a string can use `to_string()`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TurnOutcome {
    /// The model produced a final answer.
    Answer(String),
    /// The model explicitly declined, with its message.
    Refused(String),
    /// The model asked for a tool that is not registered.
    UnknownTool(String),
    /// The model replied with well-formed JSON of an unexpected shape.
    UnexpectedResponse(String),
    /// The round budget ran out before a terminal response.
    StepsExhausted {
        /// The cached schema, if one was available.
        schema: Option<String>,
    },
}

impl TurnOutcome {
    /// Returns `true` if the turn ended with an answer.
    #[inline]
    pub fn is_answer(&self) -> bool {
        matches!(self, TurnOutcome::Answer(_))
    }
}

impl Display for TurnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnOutcome::Answer(text) => f.write_str(text),
            TurnOutcome::Refused(message) => {
                write!(f, "Agent error: {message}")
            }
            TurnOutcome::UnknownTool(name) => {
                write!(f, "[Agent Error] Unknown tool: {name}")
            }
            TurnOutcome::UnexpectedResponse(raw) => {
                write!(f, "[Agent Error] Unexpected LLM response: {raw}")
            }
            TurnOutcome::StepsExhausted { schema: None } => {
                write!(f, "[Agent Error] Too many tool-use steps.")
            }
            TurnOutcome::StepsExhausted {
                schema: Some(schema),
            } => write!(
                f,
                "I couldn't fully explore the database, but here's what I \
                 know about its schema: {schema}"
            ),
        }
    }
}
