//! Message parser and dispatcher.
//!
//! [`AtParser`] scans a buffer for `AT` invocations, resolves each command
//! against its [`CommandRegistry`], splits the arguments and calls the
//! handler. A buffer may carry several invocations separated by CR, LF or
//! CRLF; the first failure stops processing of the rest.

mod args;

pub use args::{tokenize_args, Arg, Args, Operator};

use core::fmt::Write;

use at_config::{AT_PREFIX, MESSAGE_END, OPERATOR_CHARS, RESPONSE_ERROR, RESPONSE_OK};

use crate::error::ParseError;
use crate::registry::{CommandRegistry, Resolved};

/// Parses AT messages and dispatches them.
///
/// # Type Parameters
/// - `W`: text sink receiving the help menu and final result codes.
pub struct AtParser<'a, W: Write> {
    registry: CommandRegistry<'a>,
    sink: W,
}

/// One invocation located in a message.
struct Invocation<'m> {
    name: &'m str,
    operator: Operator,
    span: &'m str,
    /// Byte offset just past the argument span.
    end: usize,
}

impl<'a, W: Write> AtParser<'a, W> {
    pub fn new(registry: CommandRegistry<'a>, sink: W) -> Self {
        Self { registry, sink }
    }

    pub fn registry(&self) -> &CommandRegistry<'a> {
        &self.registry
    }

    /// Mutable access for replacing the command table.
    pub fn registry_mut(&mut self) -> &mut CommandRegistry<'a> {
        &mut self.registry
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_parts(self) -> (CommandRegistry<'a>, W) {
        (self.registry, self.sink)
    }

    /// Parses `message` and dispatches every invocation it contains.
    ///
    /// Returns the number of dispatched commands. The message must contain at
    /// least one `AT` prefix; scanning stops when no further prefix follows.
    pub fn parse_message(&mut self, message: &str) -> Result<usize, ParseError> {
        if !self.registry.is_ready() {
            log::warn!("AtParser::parse_message: no valid command table");
            return Err(ParseError::NotReady);
        }

        let Some(mut cursor) = message.find(AT_PREFIX) else {
            log::warn!("AtParser::parse_message: unable to find {} prefix in {:?}", AT_PREFIX, message);
            return Err(ParseError::MissingPrefix);
        };

        let mut dispatched = 0;
        loop {
            cursor = self.dispatch_one(message, cursor + AT_PREFIX.len())?;
            dispatched += 1;

            match message[cursor..].find(AT_PREFIX) {
                Some(offset) => cursor += offset,
                None => break,
            }
        }
        Ok(dispatched)
    }

    /// Handles one line the way a modem does: parses it, then writes the
    /// final result code (`OK` or `ERROR`) to the sink.
    ///
    /// Returns the parse result; a sink refusing the result code is only
    /// logged.
    pub fn handle_line(&mut self, line: &str) -> Result<usize, ParseError> {
        let result = self.parse_message(line);
        let code = if result.is_ok() { RESPONSE_OK } else { RESPONSE_ERROR };
        if self.sink.write_str(code).is_err() {
            log::warn!("AtParser::handle_line: unable to write result code {:?}", code.trim_end());
        }
        result
    }

    /// Parses and runs the invocation whose name starts at `start`.
    /// Returns the offset at which to resume scanning.
    fn dispatch_one(&mut self, message: &str, start: usize) -> Result<usize, ParseError> {
        let invocation = locate(message, start);
        let name = invocation.name;
        if name.is_empty() {
            log::warn!("AtParser::parse_message: can't parse 0 length command in {:?}", message);
            return Err(ParseError::EmptyCommand);
        }

        let Some(resolved) = self.registry.resolve(name) else {
            log::warn!("AtParser::parse_message: unable to match AT command {}", name);
            return Err(ParseError::UnknownCommand);
        };
        let (min_args, max_args) = match &resolved {
            Resolved::Help => (0, 0),
            Resolved::Command(def) => (def.min_args, def.max_args),
        };

        let args = tokenize_args(invocation.span).inspect_err(|e| {
            log::warn!("AtParser::parse_message: command {}: {}", name, e);
        })?;

        let got = args.len();
        if got < usize::from(min_args) || got > usize::from(max_args) {
            log::warn!(
                "AtParser::parse_message: received incorrect number of args for command {}: got {}, expected minimum {}, maximum {}",
                name, got, min_args, max_args
            );
            return Err(ParseError::WrongArity { got, min: min_args, max: max_args });
        }

        log::debug!("AtParser: dispatching {} op {:?} with {} args", name, invocation.operator, got);
        match resolved {
            Resolved::Help => self.registry.write_help(&mut self.sink)?,
            Resolved::Command(def) => {
                let Some(handler) = def.handler else {
                    log::warn!("AtParser::parse_message: AT command {} has no handler", name);
                    return Err(ParseError::MissingHandler);
                };
                handler(invocation.operator, &args).map_err(|e| {
                    log::warn!(
                        "AtParser::parse_message: call to AT command {} with op {:?} and args {:?} failed: {}",
                        name, invocation.operator.as_char(), invocation.span, e
                    );
                    ParseError::HandlerFailed(e)
                })?;
            }
        }

        Ok(invocation.end)
    }
}

/// Splits the text after an `AT` prefix into name, operator and argument span.
///
/// The name runs up to the first operator character or line end. The
/// operator is the character right after it, unless that is a line end.
/// Further punctuation after the operator is skipped, except commas (a
/// leading comma marks a blank first argument) and sign or decimal
/// characters that belong to a first numeric argument. The span runs to the
/// next line end.
fn locate(message: &str, start: usize) -> Invocation<'_> {
    let rest = &message[start..];
    let name_len = rest.find(OPERATOR_CHARS).unwrap_or(rest.len());
    let name = &rest[..name_len];

    let mut cursor = start + name_len;
    let mut operator = Operator::Absent;
    if let Some(c) = message[cursor..].chars().next() {
        operator = Operator::from_char(c);
        cursor += message[cursor..]
            .find(|c: char| c.is_ascii_alphanumeric() || matches!(c, ',' | '-' | '+' | '.') || MESSAGE_END.contains(&c))
            .unwrap_or(message.len() - cursor);
    }

    let span_len = message[cursor..].find(MESSAGE_END).unwrap_or(message.len() - cursor);
    Invocation {
        name,
        operator,
        span: &message[cursor..cursor + span_len],
        end: cursor + span_len,
    }
}
