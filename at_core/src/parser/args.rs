use heapless::{String, Vec};

use at_config::{ARG_DELIMITER, ARG_MAX_LEN, MAX_NUM_ARGS};

use crate::error::ParseError;

/// One argument, copied out of the message. Bounded in bytes.
pub type Arg = String<ARG_MAX_LEN>;

/// The arguments of one invocation, in order.
pub type Args = Vec<Arg, MAX_NUM_ARGS>;

/// Invocation style: the character between the command name and its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operator {
    /// Nothing, or a line end (`AT+CMD`, `AT+CMD\r\n`).
    Absent,
    /// `?`
    Query,
    /// `=`
    Assign,
    /// ` `
    Space,
}

impl Operator {
    /// Maps the character following a command name. Line ends and anything
    /// unexpected read as `Absent`.
    pub fn from_char(c: char) -> Self {
        match c {
            '?' => Operator::Query,
            '=' => Operator::Assign,
            ' ' => Operator::Space,
            _ => Operator::Absent,
        }
    }

    /// The wire character, `None` for `Absent`.
    pub fn as_char(self) -> Option<char> {
        match self {
            Operator::Absent => None,
            Operator::Query => Some('?'),
            Operator::Assign => Some('='),
            Operator::Space => Some(' '),
        }
    }
}

/// Splits an argument span on the delimiter.
///
/// - An empty span gives no arguments.
/// - Every delimiter starts a new, possibly empty, argument, so a span ending
///   on a delimiter gets one trailing empty argument.
///
/// ```ignore
/// assert_eq!(tokenize_args(",,5,")?.len(), 4);
/// ```
pub fn tokenize_args(span: &str) -> Result<Args, ParseError> {
    let mut args = Args::new();
    if span.is_empty() {
        return Ok(args);
    }

    for (index, token) in span.split(ARG_DELIMITER).enumerate() {
        let mut arg = Arg::new();
        arg.push_str(token).map_err(|_| ParseError::ArgTooLong { index, max: ARG_MAX_LEN })?;
        args.push(arg).map_err(|_| ParseError::TooManyArgs { max: MAX_NUM_ARGS })?;
    }
    Ok(args)
}
