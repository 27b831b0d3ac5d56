use serde::Deserialize;
use serde_json::{Value, json};
use sql_agent_core::prompt::Example;
use sql_agent_core::tool::{Error as ToolError, Tool, ToolResult};

use crate::database::Database;

/// Input of [`QueryDatabaseTool`].
#[derive(Deserialize)]
pub struct QueryDatabaseParameters {
    sql: String,
}

/// A tool for running SQL statements against the database.
pub struct QueryDatabaseTool {
    database: Database,
    examples: Vec<Example>,
}

impl QueryDatabaseTool {
    /// Creates a new query tool.
    pub fn new(database: Database) -> Self {
        let examples = vec![
            Example::new(
                "How many tracks are there?",
                r#"{"tool": "query_database", "input": "SELECT COUNT(*) FROM Track;"}"#,
            ),
            Example::new(
                "Which artist has the most albums?",
                r#"{"tool": "query_database", "input": "SELECT Artist.Name, COUNT(*) AS Albums FROM Album JOIN Artist USING (ArtistId) GROUP BY ArtistId ORDER BY Albums DESC LIMIT 1;"}"#,
            ),
        ];
        Self { database, examples }
    }
}

impl Tool for QueryDatabaseTool {
    type Input = QueryDatabaseParameters;

    fn name(&self) -> &str {
        "query_database"
    }

    fn description(&self) -> &str {
        r#"
Executes a single SQL statement against the database and returns the raw result as plain text, one row per line with values separated by " | ".
It does not interpret or answer questions itself. If the SQL is invalid or fails, an error message is returned instead."#
    }

    fn examples(&self) -> &[Example] {
        &self.examples
    }

    fn arguments(&self, input: String) -> Value {
        json!({ "sql": input })
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: QueryDatabaseParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let database = self.database.clone();
        async move {
            if input.sql.trim().is_empty() {
                return Err(ToolError::invalid_input()
                    .with_reason("`sql` must not be empty"));
            }
            database.query(&input.sql).await.map_err(|err| {
                ToolError::execution_error().with_reason(err.to_string())
            })
        }
    }
}
