//! Slash Commands
//!
//! Registry of slash-command handlers, decoding of the form-encoded command
//! payload, and dispatch of an invocation to its handler.

pub mod builtin;
pub mod invocation;
pub mod registry;

use thiserror::Error;

pub use invocation::{CommandInvocation, InvocationError};
pub use registry::{CommandHandler, CommandRegistry, CommandRegistryBuilder};

/// Arguments passed to a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandArgs {
    /// Free text typed after the command, if any.
    pub message: Option<String>,
    /// Workspace the command was invoked from.
    pub team_id: String,
}

/// Errors raised while building the registry. These abort startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The identifier is already bound to a handler.
    #[error("command {0} is already registered")]
    DuplicateCommandRegistration(String),

    /// The identifier is not a valid slash command.
    #[error("Invalid command identifier {0:?}: must start with '/', be 2-32 characters and contain no whitespace")]
    InvalidCommandId(String),
}

/// Errors raised while dispatching a single invocation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The handler returned no text.
    #[error("Handler for command {command} should return a non-empty string")]
    HandlerContractViolation { command: String },
}
