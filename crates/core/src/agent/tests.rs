use std::future::ready;
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::{Value, json};
use sql_agent_model::ModelMessage;
use sql_agent_test_model::TestModelProvider;

use super::turn::FORMAT_CORRECTION;
use crate::AgentBuilder;
use crate::TurnOutcome;
use crate::prompt::Example;
use crate::schema::SchemaCache;
use crate::tool::{Error as ToolError, Tool, ToolResult};

const COUNT_TRACKS: &str =
    r#"{"tool":"query_database","input":"SELECT COUNT(*) FROM Track;"}"#;
const ANSWER: &str = r#"{"answer":"3503"}"#;

#[derive(Deserialize)]
struct SqlParameters {
    sql: String,
}

/// Records every statement and answers with a canned row-set.
#[derive(Clone, Default)]
struct FakeSqlTool {
    statements: Arc<Mutex<Vec<String>>>,
}

impl FakeSqlTool {
    fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

impl Tool for FakeSqlTool {
    type Input = SqlParameters;

    fn name(&self) -> &str {
        "query_database"
    }

    fn description(&self) -> &str {
        "Runs one SQL statement."
    }

    fn arguments(&self, input: String) -> Value {
        json!({ "sql": input })
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        self.statements.lock().unwrap().push(input.sql.clone());
        let result = if input.sql.contains("Nope") {
            Err(ToolError::execution_error().with_reason("no such table: Nope"))
        } else {
            Ok("3503".to_owned())
        };
        ready(result)
    }
}

fn user_messages(request: &[ModelMessage]) -> Vec<&str> {
    request
        .iter()
        .filter_map(|msg| match msg {
            ModelMessage::User(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_answer_after_retry_and_tool_call() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_text_response("Sure! Let me look that up.");
    model_provider.add_text_response(COUNT_TRACKS);
    model_provider.add_text_response(ANSWER);
    let recorder = model_provider.clone();
    let sql_tool = FakeSqlTool::default();

    let mut agent = AgentBuilder::with_model_provider(model_provider)
        .with_tool(sql_tool.clone())
        .with_max_steps(3)
        .build();
    let outcome = agent.ask("How many tracks?").await;

    assert_eq!(outcome, TurnOutcome::Answer("3503".to_owned()));
    assert_eq!(outcome.to_string(), "3503");
    assert_eq!(recorder.request_count(), 3);
    assert_eq!(sql_tool.statements(), vec!["SELECT COUNT(*) FROM Track;"]);

    // Memory gains exactly the question and the raw final response.
    assert_eq!(
        agent.memory().window(),
        &[
            ModelMessage::User("How many tracks?".to_owned()),
            ModelMessage::Assistant(ANSWER.to_owned()),
        ]
    );

    // The last request carries the correction and the tool traffic.
    let requests = recorder.requests();
    let last = &requests[2].messages;
    assert!(matches!(&last[0], ModelMessage::System(_)));
    assert_eq!(
        &last[1..],
        &[
            ModelMessage::User("How many tracks?".to_owned()),
            ModelMessage::Assistant(FORMAT_CORRECTION.to_owned()),
            ModelMessage::Assistant(COUNT_TRACKS.to_owned()),
            ModelMessage::User("Tool result: 3503".to_owned()),
        ]
    );
}

#[tokio::test]
async fn test_unknown_tool_is_fatal() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_text_response(r#"{"tool":"unknown_tool","input":"x"}"#);
    model_provider.add_text_response(ANSWER);
    let recorder = model_provider.clone();

    let mut agent = AgentBuilder::with_model_provider(model_provider)
        .with_tool(FakeSqlTool::default())
        .build();
    let outcome = agent.ask("How many tracks?").await;

    assert_eq!(outcome, TurnOutcome::UnknownTool("unknown_tool".to_owned()));
    assert!(outcome.to_string().contains("Unknown tool: unknown_tool"));
    assert_eq!(recorder.request_count(), 1);
    assert!(agent.memory().is_empty());
}

#[tokio::test]
async fn test_malformed_responses_exhaust_budget() {
    let mut model_provider = TestModelProvider::default();
    for _ in 0..3 {
        model_provider.add_text_response("I think the answer is 3503.");
    }
    let recorder = model_provider.clone();

    let mut agent = AgentBuilder::with_model_provider(model_provider)
        .with_tool(FakeSqlTool::default())
        .with_max_steps(3)
        .build();
    let outcome = agent.ask("How many tracks?").await;

    assert_eq!(outcome, TurnOutcome::StepsExhausted { schema: None });
    assert_eq!(outcome.to_string(), "[Agent Error] Too many tool-use steps.");
    // Each malformed response consumed exactly one round.
    assert_eq!(recorder.request_count(), 3);
    assert!(agent.memory().is_empty());
}

#[tokio::test]
async fn test_exhausted_budget_falls_back_to_cached_schema() {
    let schema = "CREATE TABLE Track (TrackId INTEGER PRIMARY KEY, Name TEXT)";
    let mut model_provider = TestModelProvider::default();
    for _ in 0..3 {
        model_provider.add_text_response("not json");
    }
    let recorder = model_provider.clone();

    let mut agent = AgentBuilder::with_model_provider(model_provider)
        .with_tool(FakeSqlTool::default())
        .with_schema_cache(SchemaCache::with_schema(schema))
        .with_max_steps(3)
        .build();
    let outcome = agent.ask("How many tracks?").await;

    assert_eq!(
        outcome,
        TurnOutcome::StepsExhausted {
            schema: Some(schema.to_owned())
        }
    );
    assert!(outcome.to_string().contains(schema));

    // The schema also made it into the system prompt.
    let requests = recorder.requests();
    let ModelMessage::System(prompt) = &requests[0].messages[0] else {
        panic!("first message must be the system prompt");
    };
    assert!(prompt.contains(schema));
    assert!(prompt.contains("- query_database: Runs one SQL statement."));
}

#[tokio::test]
async fn test_model_refusal_is_fatal() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_text_response(r#"{"error": "I cannot comply"}"#);
    let recorder = model_provider.clone();

    let mut agent = AgentBuilder::with_model_provider(model_provider).build();
    let outcome = agent.ask("Drop every table").await;

    assert_eq!(outcome, TurnOutcome::Refused("I cannot comply".to_owned()));
    assert_eq!(outcome.to_string(), "Agent error: I cannot comply");
    assert_eq!(recorder.request_count(), 1);
    assert!(agent.memory().is_empty());
}

#[tokio::test]
async fn test_unexpected_shape_is_fatal() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_text_response(r#"{"result": "3503"}"#);
    model_provider.add_text_response(ANSWER);
    let recorder = model_provider.clone();

    let mut agent = AgentBuilder::with_model_provider(model_provider).build();
    let outcome = agent.ask("How many tracks?").await;

    assert_eq!(
        outcome,
        TurnOutcome::UnexpectedResponse(r#"{"result": "3503"}"#.to_owned())
    );
    assert_eq!(recorder.request_count(), 1);
}

#[tokio::test]
async fn test_transport_error_takes_retry_path() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(sql_agent_test_model::PresetResponse::failing());
    model_provider.add_text_response(ANSWER);
    let recorder = model_provider.clone();

    let mut agent = AgentBuilder::with_model_provider(model_provider).build();
    let outcome = agent.ask("How many tracks?").await;

    assert_eq!(outcome, TurnOutcome::Answer("3503".to_owned()));
    assert_eq!(recorder.request_count(), 2);
    let requests = recorder.requests();
    let second = &requests[1].messages;
    assert_eq!(
        second.last(),
        Some(&ModelMessage::Assistant(FORMAT_CORRECTION.to_owned()))
    );
}

#[tokio::test]
async fn test_tool_errors_are_relayed_to_the_model() {
    let mut model_provider = TestModelProvider::default();
    model_provider
        .add_text_response(r#"{"tool":"query_database","input":"SELECT * FROM Nope"}"#);
    model_provider.add_text_response(COUNT_TRACKS);
    model_provider.add_text_response(ANSWER);
    let recorder = model_provider.clone();

    let mut agent = AgentBuilder::with_model_provider(model_provider)
        .with_tool(FakeSqlTool::default())
        .build();
    let outcome = agent.ask("How many tracks?").await;

    assert!(outcome.is_answer());
    let requests = recorder.requests();
    assert_eq!(
        user_messages(&requests[1].messages).last(),
        Some(&"Tool result: Error: no such table: Nope")
    );
}

#[tokio::test]
async fn test_memory_seeds_later_turns_without_tool_traffic() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_text_response(COUNT_TRACKS);
    model_provider.add_text_response(ANSWER);
    model_provider.add_text_response(r#"{"answer":"275"}"#);
    let recorder = model_provider.clone();

    let mut agent = AgentBuilder::with_model_provider(model_provider)
        .with_tool(FakeSqlTool::default())
        .build();
    agent.ask("How many tracks?").await;
    let outcome = agent.ask("And how many artists?").await;
    assert_eq!(outcome.to_string(), "275");

    let requests = recorder.requests();
    assert_eq!(
        &requests[2].messages[1..],
        &[
            ModelMessage::User("How many tracks?".to_owned()),
            ModelMessage::Assistant(ANSWER.to_owned()),
            ModelMessage::User("And how many artists?".to_owned()),
        ]
    );
    assert_eq!(agent.memory().len(), 4);
}

#[tokio::test]
async fn test_memory_stays_within_capacity() {
    let mut model_provider = TestModelProvider::default();
    for i in 0..5 {
        model_provider.add_text_response(format!(r#"{{"answer":"{i}"}}"#));
    }

    let mut agent = AgentBuilder::with_model_provider(model_provider)
        .with_memory_capacity(2)
        .build();
    for i in 0..5 {
        let outcome = agent.ask(&format!("question {i}")).await;
        assert_eq!(outcome.to_string(), i.to_string());
        assert!(agent.memory().len() <= 4);
        assert_eq!(agent.memory().len() % 2, 0);
    }
    let questions = agent
        .memory()
        .exchanges()
        .map(|(question, _)| question.to_owned())
        .collect::<Vec<_>>();
    assert_eq!(questions, vec!["question 3", "question 4"]);
}

#[tokio::test]
async fn test_examples_reach_the_system_prompt() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_text_response(ANSWER);
    let recorder = model_provider.clone();

    let mut agent = AgentBuilder::with_model_provider(model_provider)
        .with_tool(FakeSqlTool::default())
        .with_example(Example::new("How many tracks?", COUNT_TRACKS))
        .build();
    agent.ask("How many tracks?").await;

    let requests = recorder.requests();
    let ModelMessage::System(prompt) = &requests[0].messages[0] else {
        panic!("first message must be the system prompt");
    };
    assert!(prompt.contains(&format!(
        "User: How many tracks?\nAssistant: {COUNT_TRACKS}"
    )));
}
