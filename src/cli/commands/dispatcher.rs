//! Command dispatcher for routing CLI commands.

use crate::cli::args::{Cli, Commands};
use crate::cli::commands::{Action, CompletionsCommand, OrchestrateCommand};
use crate::error::Result;

/// Result of executing a command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,
    /// Exit code to return to the shell.
    pub exit_code: i32,
}

impl CommandResult {
    /// Successful result with exit code 0.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Failed result with the given exit code.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Trait for executable commands.
pub trait Command {
    /// Execute the command and return its result.
    fn execute(&self) -> Result<CommandResult>;
}

/// Dispatches CLI commands to their implementations.
#[derive(Debug, Default)]
pub struct CommandDispatcher;

impl CommandDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Route the parsed command line to the matching command.
    pub fn dispatch(&self, cli: &Cli) -> Result<CommandResult> {
        match &cli.command {
            Commands::Apply(args) => OrchestrateCommand::new(Action::Apply, cli, args).execute(),
            Commands::Check(args) => OrchestrateCommand::new(Action::Check, cli, args).execute(),
            Commands::Delete(args) => OrchestrateCommand::new(Action::Delete, cli, args).execute(),
            Commands::Recreate(args) => {
                OrchestrateCommand::new(Action::Recreate, cli, args).execute()
            }
            Commands::Inject(args) => OrchestrateCommand::new(Action::Inject, cli, args).execute(),
            Commands::Completions(args) => CompletionsCommand::new(args.clone()).execute(),
        }
    }
}
