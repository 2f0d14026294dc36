//! Command Registry
//!
//! Built once during startup, then frozen and shared read-only across requests.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use super::{builtin, CommandArgs, DispatchError, RegistryError};

/// A registered slash-command handler.
///
/// Returning `None` (or an empty string) breaks the handler contract.
pub type CommandHandler = Arc<dyn Fn(CommandArgs) -> Option<String> + Send + Sync>;

/// Maximum length of a command identifier, slash included.
const MAX_COMMAND_LEN: usize = 32;

/// Validate a command identifier such as `/test`.
fn validate_command_id(command: &str) -> Result<(), RegistryError> {
    let len = command.chars().count();
    if !command.starts_with('/')
        || !(2..=MAX_COMMAND_LEN).contains(&len)
        || command.chars().any(char::is_whitespace)
    {
        return Err(RegistryError::InvalidCommandId(command.to_string()));
    }
    Ok(())
}

/// Collects command bindings before the registry is frozen.
#[derive(Default)]
pub struct CommandRegistryBuilder {
    handlers: HashMap<String, CommandHandler>,
}

impl CommandRegistryBuilder {
    /// Bind `command` to `handler`.
    ///
    /// Fails if the identifier is invalid or already bound; the existing
    /// binding is left untouched.
    pub fn register<F>(mut self, command: &str, handler: F) -> Result<Self, RegistryError>
    where
        F: Fn(CommandArgs) -> Option<String> + Send + Sync + 'static,
    {
        self.insert(command, Arc::new(handler))?;
        Ok(self)
    }

    fn insert(&mut self, command: &str, handler: CommandHandler) -> Result<(), RegistryError> {
        validate_command_id(command)?;
        if self.handlers.contains_key(command) {
            return Err(RegistryError::DuplicateCommandRegistration(
                command.to_string(),
            ));
        }
        self.handlers.insert(command.to_string(), handler);
        Ok(())
    }

    /// Freeze the bindings.
    #[must_use]
    pub fn build(self) -> CommandRegistry {
        info!(commands = self.handlers.len(), "Command registry built");
        CommandRegistry {
            handlers: self.handlers,
        }
    }
}

/// Immutable command → handler table.
pub struct CommandRegistry {
    handlers: HashMap<String, CommandHandler>,
}

impl CommandRegistry {
    /// Start an empty builder.
    #[must_use]
    pub fn builder() -> CommandRegistryBuilder {
        CommandRegistryBuilder::default()
    }

    /// Build a registry from a declarative list of bindings.
    pub fn from_table<I, S>(table: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (S, CommandHandler)>,
        S: AsRef<str>,
    {
        let mut builder = Self::builder();
        for (command, handler) in table {
            builder.insert(command.as_ref(), handler)?;
        }
        Ok(builder.build())
    }

    /// Registry holding the bundled commands.
    pub fn with_builtin_commands() -> Result<Self, RegistryError> {
        Self::from_table(builtin::table())
    }

    /// Registered command identifiers, sorted.
    #[must_use]
    pub fn commands(&self) -> Vec<&str> {
        let mut commands: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        commands.sort_unstable();
        commands
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no commands are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler bound to `command`.
    ///
    /// An unregistered command is a normal outcome and yields an informational
    /// reply rather than an error.
    pub fn dispatch(
        &self,
        command: &str,
        text: Option<&str>,
        team_id: &str,
    ) -> Result<String, DispatchError> {
        let Some(handler) = self.handlers.get(command) else {
            debug!(command, "No handler registered");
            return Ok(format!("No handler registered for command {command}"));
        };

        info!(command, team_id, "Handling command");
        let args = CommandArgs {
            message: text.map(str::to_string),
            team_id: team_id.to_string(),
        };

        match handler(args) {
            Some(reply) if !reply.is_empty() => Ok(reply),
            _ => {
                error!(command, "Handler returned no response");
                Err(DispatchError::HandlerContractViolation {
                    command: command.to_string(),
                })
            }
        }
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands())
            .finish()
    }
}
