//! An agent that answers natural-language questions about a SQLite database.
//!
//! The crate includes a CLI tool for using in the terminal. And you can also
//! use it as a library to bring the agent into your own host apps.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod database;
mod schema;
mod session;
pub mod tools;

pub use database::Database;
pub use schema::SqliteSchemaProvider;
pub use session::{Session, SessionBuilder};

/// Re-exports of [`sql_agent_core`] crate.
pub mod core {
    pub use sql_agent_core::*;
}
