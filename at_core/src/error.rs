//! Error types reported by the registry, the parser, handlers and the
//! numeric converter.
//!
//! All of them are small `Copy` values so they can travel through an
//! allocation-free firmware without borrowing from the message buffer.
//! Context that does not fit (command names, raw argument text) is emitted
//! through `log` at the point of failure.

use thiserror::Error;

/// A command table was rejected by [`CommandRegistry`](crate::registry::CommandRegistry).
///
/// `index` is the offending row of the table passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Command name exceeds `AT_COMMAND_MAX_LEN`.
    #[error("command {index}: name exceeds maximum length {max}")]
    NameTooLong { index: usize, max: usize },

    /// Help text exceeds `HELP_STRING_MAX_LEN`.
    #[error("command {index}: help string exceeds maximum length {max}")]
    HelpTooLong { index: usize, max: usize },

    /// Command name is empty.
    #[error("command {index}: empty name")]
    EmptyName { index: usize },

    /// Command name contains an operator or line terminator and could never match.
    #[error("command {index}: name contains an operator character")]
    InvalidName { index: usize },

    /// `min_args` is larger than `max_args`.
    #[error("command {index}: min args {min} exceeds max args {max}")]
    InvalidArity { index: usize, min: u16, max: u16 },

    /// The name is reserved for the synthesized help command.
    #[error("command {index}: name is reserved")]
    ReservedName { index: usize },

    /// The same name appears twice.
    #[error("command {index}: duplicate name")]
    DuplicateName { index: usize },

    /// An owned table cannot hold that many rows.
    #[error("too many commands: max {max}, got {actual}")]
    TooManyCommands { max: usize, actual: usize },
}

/// A message could not be parsed or dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// The registry holds no valid command table.
    #[error("command table not ready")]
    NotReady,

    /// No `AT` prefix in the message.
    #[error("unable to find AT prefix")]
    MissingPrefix,

    /// `AT` directly followed by an operator or line end.
    #[error("zero length command")]
    EmptyCommand,

    /// The command name matches no definition.
    #[error("unknown command")]
    UnknownCommand,

    /// More arguments than the parser can hold.
    #[error("too many arguments: max {max}")]
    TooManyArgs { max: usize },

    /// One argument is longer than `ARG_MAX_LEN`.
    #[error("argument {index} exceeds maximum length {max}")]
    ArgTooLong { index: usize, max: usize },

    /// Argument count outside the definition's bounds.
    #[error("incorrect number of args: got {got}, expected minimum {min}, maximum {max}")]
    WrongArity { got: usize, min: u16, max: u16 },

    /// The definition has no handler.
    #[error("command has no handler")]
    MissingHandler,

    /// The handler reported failure.
    #[error("handler failed: {0}")]
    HandlerFailed(HandlerError),

    /// The text sink refused output.
    #[error("text sink error")]
    Sink,
}

impl From<core::fmt::Error> for ParseError {
    fn from(_: core::fmt::Error) -> Self {
        ParseError::Sink
    }
}

/// Failure reported by a command handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandlerError {
    /// Argument `index` is missing or could not be converted.
    #[error("invalid argument {index}")]
    InvalidArgument { index: usize },

    /// The command does not support the operator it was invoked with.
    #[error("unsupported operator")]
    InvalidOperator,

    /// The handler rejected the invocation.
    #[error("rejected")]
    Rejected,
}

/// A textual argument could not be converted to a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NumError {
    /// Nothing but whitespace.
    #[error("empty argument")]
    Empty,

    /// A negative value for an unsigned destination.
    #[error("negative value for unsigned destination")]
    NegativeUnsigned,

    /// The value does not fit the destination.
    #[error("value out of range")]
    Overflow,

    /// Text that is not a number in the requested base.
    #[error("malformed number")]
    Malformed,

    /// Base outside `2..=36`.
    #[error("invalid base {0}")]
    InvalidBase(u32),
}
