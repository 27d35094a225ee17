use thiserror::Error;

/// Raised while a tree is being built. These are programming errors in the
/// caller's command declarations and are reported before anything executes.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("No argument parser registered for type {type_name}")]
    NoParserFound { type_name: String },
    #[error("Name '{name}' is already used by a sibling under '{parent}'")]
    DuplicateName { name: String, parent: String },
    #[error("Greedy argument '{slot}' must be the last argument of '{leaf}'")]
    GreedySlotNotLast { leaf: String, slot: String },
    #[error("No handler named '{handler}' is available for command '{command}'")]
    UnknownHandler { handler: String, command: String },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown command: {token}")]
    UnknownCommand { path: Vec<String>, token: String },
    #[error("Invalid usage of /{}: {}", .path.join(" "), .tokens.join(" "))]
    NoMatchingOverload {
        path: Vec<String>,
        tokens: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum InternalError {
    #[error("Internal error: Argument {index} not found in ArgumentSet (command registration bug)")]
    MissingArgument { index: usize },
    #[error("Internal error: Argument {index} has type {found}, expected {expected} (command registration bug)")]
    WrongArgumentType {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Internal(#[from] InternalError),
    /// A leaf's own failure, passed through untouched.
    #[error(transparent)]
    Execution(anyhow::Error),
}

impl CommandError {
    pub fn is_usage_error(&self) -> bool {
        matches!(self, CommandError::Dispatch(_))
    }
}

pub type CommandResult<T> = Result<T, CommandError>;
