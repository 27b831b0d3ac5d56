//! A set of built-in tools that models can use.

mod explore_schema;
mod query_database;
mod summarize_database;

pub use explore_schema::ExploreSchemaTool;
pub use query_database::QueryDatabaseTool;
pub use summarize_database::SummarizeDatabaseTool;
