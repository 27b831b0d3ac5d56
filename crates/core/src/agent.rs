mod builder;
mod turn;
#[cfg(test)]
mod tests;

use crate::conversation::ConversationMemory;
use crate::model_client::ModelClient;
use crate::prompt::Example;
use crate::schema::SchemaCache;
use crate::tool::Executor as ToolExecutor;
pub use builder::AgentBuilder;

/// Round budget used when none is configured.
pub const DEFAULT_MAX_STEPS: usize = 5;

/// An agent instance, which owns a model client, the registered tools, the
/// conversation memory and the schema cache.
///
/// Turns run strictly one after another: [`Agent::ask`] takes `&mut self`
/// and drives one question to a terminal outcome before returning.
pub struct Agent {
    model_client: ModelClient,
    tool_executor: ToolExecutor,
    memory: ConversationMemory,
    schema_cache: Option<SchemaCache>,
    examples: Vec<Example>,
    max_steps: usize,
}

impl Agent {
    /// Returns the conversation memory.
    #[inline]
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Returns the schema cache, if one is configured.
    #[inline]
    pub fn schema_cache(&self) -> Option<&SchemaCache> {
        self.schema_cache.as_ref()
    }

    /// Returns the maximum number of model round-trips per turn.
    #[inline]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Forgets all previous exchanges.
    #[inline]
    pub fn reset_memory(&mut self) {
        self.memory.clear();
    }
}
