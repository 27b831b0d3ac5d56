use sql_agent_model::ModelMessage;
use tracing::Instrument;

use super::Agent;
use crate::directive::Directive;
use crate::outcome::TurnOutcome;
use crate::prompt::{self, SCHEMA_UNAVAILABLE};

/// Sent back to the model after a completion that is not valid JSON.
pub(crate) const FORMAT_CORRECTION: &str =
    "Your response was not in the required JSON format. Please try again.";

impl Agent {
    /// Runs one turn for `question` and returns its terminal outcome.
    ///
    /// The question must not be blank; the caller filters blank input.
    /// Only answered turns are recorded in the conversation memory.
    pub async fn ask(&mut self, question: &str) -> TurnOutcome {
        let span = debug_span!("turn", max_steps = self.max_steps);
        self.run_turn(question).instrument(span).await
    }

    async fn run_turn(&mut self, question: &str) -> TurnOutcome {
        let system_prompt = self.build_system_prompt().await;

        let memory = self.memory.window();
        let mut messages = Vec::with_capacity(memory.len() + 2);
        messages.push(ModelMessage::System(system_prompt));
        messages.extend_from_slice(memory);
        messages.push(ModelMessage::User(question.to_owned()));

        for step in 1..=self.max_steps {
            let raw = self.model_client.ask(messages.clone()).await;
            debug!("step {step}: model response: {raw}");

            match Directive::parse(&raw) {
                Directive::Unparseable => {
                    debug!("step {step}: response is not json, asking again");
                    messages
                        .push(ModelMessage::Assistant(FORMAT_CORRECTION.to_owned()));
                }
                Directive::ProtocolError { message } => {
                    debug!("step {step}: model refused: {message}");
                    return TurnOutcome::Refused(message);
                }
                Directive::ToolCall {
                    tool_name,
                    tool_input,
                } => {
                    let Some(invocation) =
                        self.tool_executor.invoke(&tool_name, tool_input)
                    else {
                        return TurnOutcome::UnknownTool(tool_name);
                    };
                    let result = match invocation.await {
                        Ok(output) => output,
                        Err(err) => err.to_string(),
                    };
                    debug!("step {step}: tool `{tool_name}` result: {result}");

                    messages.push(ModelMessage::Assistant(raw));
                    messages.push(ModelMessage::User(format!(
                        "Tool result: {result}"
                    )));
                }
                Directive::FinalAnswer { text } => {
                    self.memory.append(question, raw);
                    return TurnOutcome::Answer(text);
                }
                Directive::Unrecognized => {
                    warn!("step {step}: unexpected response shape");
                    return TurnOutcome::UnexpectedResponse(raw);
                }
            }
        }

        warn!("exceeded maximum tool-use steps ({})", self.max_steps);
        let schema = self
            .schema_cache
            .as_ref()
            .and_then(|cache| cache.cached())
            .map(ToOwned::to_owned);
        TurnOutcome::StepsExhausted { schema }
    }

    async fn build_system_prompt(&mut self) -> String {
        let schema = match &mut self.schema_cache {
            Some(cache) => {
                Some(cache.get_or_populate().await.unwrap_or(SCHEMA_UNAVAILABLE))
            }
            None => None,
        };
        let tools = self.tool_executor.catalog();
        let examples = self
            .tool_executor
            .examples()
            .chain(&self.examples)
            .cloned()
            .collect::<Vec<_>>();
        prompt::build_system_prompt(&tools, schema, &examples)
    }
}
