#![cfg_attr(not(test), no_std)]

//! # AT command engine
//!
//! Recognizes `AT`-prefixed command lines, matches each command against a
//! registered table, splits its operator and comma-separated arguments,
//! checks arity and calls the registered handler. Every buffer is bounded by
//! the constants in `at_config`; nothing is allocated on the heap.
//!
//! ```ignore
//! fn cfg(op: Operator, args: &[Arg]) -> Result<(), HandlerError> {
//!     let channel: u8 = at_try_arg!(args, 0, u8);
//!     Ok(())
//! }
//!
//! static COMMANDS: [CommandDef<'static>; 1] =
//!     [CommandDef::new("+CFG").args(1, 3).help("Configuration.").handler(cfg)];
//!
//! let mut parser = AtParser::new(CommandRegistry::borrowed(&COMMANDS)?, sink);
//! parser.parse_message("AT+CFG=4,2\r\n")?;
//! ```

pub mod error;
pub mod numeric;
pub mod parser;
pub mod registry;
mod macros;

pub use error::{ConfigError, HandlerError, NumError, ParseError};
pub use numeric::{arg_to_num, arg_to_num_dec, parse_arg, ArgNumber};
pub use parser::{tokenize_args, Arg, Args, AtParser, Operator};
pub use registry::{CommandDef, CommandRegistry, Help, HelpEmitter, Handler, HELP_DEF};

#[cfg(feature = "macros")]
pub use at_macros::define_at_commands;
