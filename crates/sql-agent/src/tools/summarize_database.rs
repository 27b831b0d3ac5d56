use serde::de::IgnoredAny;
use sql_agent_core::tool::{Error as ToolError, Tool, ToolResult};

use crate::database::Database;

/// A tool that reports the row count and a few sample rows of every table.
pub struct SummarizeDatabaseTool {
    database: Database,
}

impl SummarizeDatabaseTool {
    /// Creates a new summarize tool.
    #[inline]
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl Tool for SummarizeDatabaseTool {
    type Input = IgnoredAny;

    fn name(&self) -> &str {
        "summarize_database"
    }

    fn description(&self) -> &str {
        "Returns the number of rows and the first three rows of every table \
         as JSON. The input is ignored."
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        _input: IgnoredAny,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let database = self.database.clone();
        async move {
            database
                .summarize()
                .await
                .and_then(|summary| summary.to_json())
                .map_err(|err| {
                    ToolError::execution_error().with_reason(err.to_string())
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::database::tests::fixture;

    #[tokio::test]
    async fn test_summary_as_json() {
        let (_dir, database) = fixture();
        let tool = SummarizeDatabaseTool::new(database);

        let output = tool.execute(IgnoredAny).await.unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["tables"][0]["table"], "Artist");
        assert_eq!(value["tables"][0]["row_count"], 2);
        assert_eq!(value["tables"][0]["sample_rows"][1]["Name"], "Accept");
    }
}
