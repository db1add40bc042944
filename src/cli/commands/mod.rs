//! CLI command implementations.

mod completions;
mod dispatcher;
mod orchestrate;

pub use completions::CompletionsCommand;
pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use orchestrate::{Action, OrchestrateCommand};
