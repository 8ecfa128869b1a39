#![no_std]

//! Fixed sizes and protocol tokens shared by `at_core` and `at_macros`.
//!
//! Every buffer in the engine is sized from these constants, so a firmware
//! build can tune its RAM footprint here without touching the engine.

/// Literal marker opening every command invocation.
pub const AT_PREFIX: &str = "AT";

/// Maximum length of a command name in bytes (the text after `AT`, e.g. `+CFG`).
pub const AT_COMMAND_MAX_LEN: usize = 16;

/// Maximum length of a help string, in bytes.
pub const HELP_STRING_MAX_LEN: usize = 200;

/// Maximum length of a single argument, in bytes of UTF-8.
pub const ARG_MAX_LEN: usize = 32;

/// Maximum number of arguments accepted for one command.
pub const MAX_NUM_ARGS: usize = 20;

/// Capacity of an owned command table.
pub const MAX_NUM_COMMANDS: usize = 32;

/// Separator between arguments.
pub const ARG_DELIMITER: char = ',';

/// Characters that terminate a command name.
pub const OPERATOR_CHARS: &[char] = &['?', ' ', '=', '\r', '\n'];

/// Characters that terminate a command line.
pub const MESSAGE_END: &[char] = &['\r', '\n'];

/// Name of the help command synthesized by every registry.
pub const HELP_COMMAND: &str = "+HELP";

/// Help text of the synthesized help command.
pub const HELP_COMMAND_TEXT: &str = "Display this menu.";

/// Upper arity bound of a definition that does not set one.
pub const DEFAULT_MAX_ARGS: u16 = 100;

/// Help text of a definition that does not set one.
pub const DEFAULT_HELP_STRING: &str = "Help string not defined.";

/// Final result code written after a line was handled successfully.
pub const RESPONSE_OK: &str = "OK\r\n";

/// Final result code written after a line failed.
pub const RESPONSE_ERROR: &str = "ERROR\r\n";
