use sql_agent_model::ModelProvider;

use super::{Agent, DEFAULT_MAX_STEPS};
use crate::conversation::{ConversationMemory, DEFAULT_MEMORY_EXCHANGES};
use crate::model_client::ModelClient;
use crate::prompt::Example;
use crate::schema::SchemaCache;
use crate::tool::{AnyTool, Executor as ToolExecutor, Tool, ToolObject};

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    tools: Vec<Box<dyn ToolObject>>,
    schema_cache: Option<SchemaCache>,
    examples: Vec<Example>,
    max_steps: usize,
    memory_exchanges: usize,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            tools: vec![],
            schema_cache: None,
            examples: vec![],
            max_steps: DEFAULT_MAX_STEPS,
            memory_exchanges: DEFAULT_MEMORY_EXCHANGES,
        }
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        let tool = Box::new(AnyTool(tool));
        self.tools.push(tool);
        self
    }

    /// Hands the schema cache over to the agent.
    ///
    /// The schema is shown in the system prompt and used as a fallback when
    /// a turn runs out of steps.
    #[inline]
    pub fn with_schema_cache(mut self, schema_cache: SchemaCache) -> Self {
        self.schema_cache = Some(schema_cache);
        self
    }

    /// Adds a usage example, shown after the examples of the tools.
    #[inline]
    pub fn with_example(mut self, example: Example) -> Self {
        self.examples.push(example);
        self
    }

    /// Sets the maximum number of model round-trips per turn.
    #[inline]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets how many past exchanges the agent remembers.
    #[inline]
    pub fn with_memory_capacity(mut self, exchanges: usize) -> Self {
        self.memory_exchanges = exchanges;
        self
    }

    /// Builds the agent.
    #[inline]
    pub fn build(self) -> Agent {
        Agent {
            model_client: self.model_client,
            tool_executor: ToolExecutor::with_tools(self.tools),
            memory: ConversationMemory::with_capacity(self.memory_exchanges),
            schema_cache: self.schema_cache,
            examples: self.examples,
            max_steps: self.max_steps,
        }
    }
}
