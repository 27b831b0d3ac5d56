use async_trait::async_trait;
use sql_agent_core::schema::{SchemaError, SchemaProvider};

use crate::database::Database;

/// Reads the table definitions straight from `sqlite_master`.
pub struct SqliteSchemaProvider {
    database: Database,
}

impl SqliteSchemaProvider {
    /// Creates a schema provider for `database`.
    #[inline]
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl SchemaProvider for SqliteSchemaProvider {
    async fn schema(&self) -> Result<String, SchemaError> {
        self.database
            .schema()
            .await
            .map_err(|err| SchemaError::new(err.to_string()))
    }
}
