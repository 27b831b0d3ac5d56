//! System prompt assembly.
//!
//! The prompt is a pure function of the tool catalog, the schema text and
//! the usage examples, so identical inputs always produce byte-identical
//! prompts.

use serde::{Deserialize, Serialize};

/// Reply the model is told to give when it cannot comply.
pub const REFUSAL_SENTINEL: &str = r#"{"error": "I cannot comply"}"#;

/// Placeholder used when the schema could not be retrieved.
pub const SCHEMA_UNAVAILABLE: &str = "(schema unavailable)";

/// A question paired with the response the model is expected to give.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Example {
    /// The user question.
    pub question: String,
    /// The raw JSON response, usually a tool call.
    pub response: String,
}

impl Example {
    /// Creates an example.
    #[inline]
    pub fn new<Q: Into<String>, R: Into<String>>(question: Q, response: R) -> Self {
        Self {
            question: question.into(),
            response: response.into(),
        }
    }
}

/// One entry of the tool catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolEntry<'a> {
    /// Tool name, as the model must spell it.
    pub name: &'a str,
    /// What the tool does.
    pub description: &'a str,
}

/// Builds the system prompt.
///
/// `schema` is omitted from the prompt when `None`. Tools are listed in
/// the order given, and so are the examples.
pub fn build_system_prompt(
    tools: &[ToolEntry<'_>],
    schema: Option<&str>,
    examples: &[Example],
) -> String {
    let mut prompt = String::from(
        "You are an agent that answers questions about a SQLite database \
         by using tools. Always respond in JSON format.\n",
    );

    prompt.push_str("Available tools:\n");
    for tool in tools {
        let description = tool.description.trim();
        if description.is_empty() {
            prompt.push_str(&format!("- {}\n", tool.name));
        } else {
            prompt.push_str(&format!("- {}: {}\n", tool.name, description));
        }
    }

    if let Some(schema) = schema {
        prompt.push_str("The database schema is as follows:\n");
        prompt.push_str(schema.trim_end());
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        r#"When you need to use a tool, respond ONLY with a JSON object like this:
{{"tool": "tool_name", "input": "input string"}}
When you have enough information to answer, respond ONLY with a JSON object like this:
{{"answer": "your answer here"}}
Do not include any other text in your response.
If you do not understand the question or cannot comply, respond with: {REFUSAL_SENTINEL}
"#
    ));

    if !examples.is_empty() {
        prompt.push_str("\n# Examples of tool use:\n");
        for example in examples {
            prompt.push_str(&format!(
                "User: {}\nAssistant: {}\n",
                example.question, example.response
            ));
        }
    }

    prompt.push_str(
        "Always use a tool if the answer requires data from the database. \
         Only answer directly if you are certain no tool is needed.",
    );
    prompt
}
