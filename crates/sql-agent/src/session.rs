use sql_agent_core::schema::SchemaCache;
use sql_agent_core::{Agent, AgentBuilder, TurnOutcome};
use sql_agent_model::ModelProvider;

use crate::database::Database;
use crate::schema::SqliteSchemaProvider;
use crate::tools::*;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
    database: Database,
}

impl SessionBuilder {
    /// Creates a session builder that answers questions about `database`
    /// with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
        database: Database,
    ) -> Self {
        let agent_builder = AgentBuilder::with_model_provider(provider);
        Self {
            agent_builder,
            database,
        }
    }

    /// Sets the maximum number of model round-trips per question.
    #[inline]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.agent_builder = self.agent_builder.with_max_steps(max_steps);
        self
    }

    /// Sets how many previous exchanges are remembered.
    #[inline]
    pub fn with_memory_capacity(mut self, exchanges: usize) -> Self {
        self.agent_builder = self.agent_builder.with_memory_capacity(exchanges);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Session {
        let database = self.database;
        let agent = self
            .agent_builder
            .with_tool(QueryDatabaseTool::new(database.clone()))
            .with_tool(ExploreSchemaTool::new(database.clone()))
            .with_tool(SummarizeDatabaseTool::new(database.clone()))
            .with_schema_cache(SchemaCache::new(SqliteSchemaProvider::new(
                database.clone(),
            )))
            .build();

        Session { agent, database }
    }
}

/// A chat session over one database.
///
/// The session holds a fully configured agent, and it is basically a wrapper
/// around [`Agent`].
pub struct Session {
    agent: Agent,
    database: Database,
}

impl Session {
    /// Asks a question and waits for the outcome of the turn.
    #[inline]
    pub async fn ask(&mut self, question: &str) -> TurnOutcome {
        self.agent.ask(question).await
    }

    /// Returns the database this session is bound to.
    #[inline]
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Returns the underlying agent.
    #[inline]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Forgets the conversation so far.
    #[inline]
    pub fn reset(&mut self) {
        self.agent.reset_memory();
    }
}
