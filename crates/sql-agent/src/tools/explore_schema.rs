use serde::de::IgnoredAny;
use sql_agent_core::tool::{Error as ToolError, Tool, ToolResult};

use crate::database::Database;

/// A tool that describes every table and column of the database as JSON.
pub struct ExploreSchemaTool {
    database: Database,
}

impl ExploreSchemaTool {
    /// Creates a new explore schema tool.
    #[inline]
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl Tool for ExploreSchemaTool {
    type Input = IgnoredAny;

    fn name(&self) -> &str {
        "explore_schema"
    }

    fn description(&self) -> &str {
        "Lists the tables of the database with their columns, declared types, \
         not-null flags, default values and primary keys. The input is ignored."
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        _input: IgnoredAny,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let database = self.database.clone();
        async move {
            database
                .explore()
                .await
                .and_then(|overview| overview.to_json())
                .map_err(|err| {
                    ToolError::execution_error().with_reason(err.to_string())
                })
        }
    }
}
