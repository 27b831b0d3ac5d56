//! Core logic of the agent: the bounded tool-use loop, the JSON response
//! protocol, conversation memory, prompt assembly and the schema cache.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod conversation;
pub mod directive;
mod model_client;
mod outcome;
pub mod prompt;
pub mod schema;
pub mod tool;

pub use agent::{Agent, AgentBuilder, DEFAULT_MAX_STEPS};
pub use model_client::{ModelClient, ModelClientResponse};
pub use outcome::TurnOutcome;
