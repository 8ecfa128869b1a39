use core::fmt::{self, Write};

use heapless::{String, Vec};

use at_config::{
    AT_COMMAND_MAX_LEN, DEFAULT_HELP_STRING, DEFAULT_MAX_ARGS, HELP_COMMAND, HELP_COMMAND_TEXT,
    HELP_STRING_MAX_LEN, MAX_NUM_COMMANDS, OPERATOR_CHARS,
};

use crate::error::{ConfigError, HandlerError};
use crate::parser::{Arg, Operator};

/// Runs a command: receives the operator and the parsed arguments.
pub type Handler = fn(Operator, &[Arg]) -> Result<(), HandlerError>;

/// Writes a custom help entry for one command.
pub type HelpEmitter = fn(&mut dyn Write) -> fmt::Result;

/// Help shown for a command by `AT+HELP`.
#[derive(Debug, Clone, Copy)]
pub enum Help<'a> {
    /// Plain text, printed under the command name.
    Text(&'a str),
    /// Custom output; replaces the default entry entirely.
    Emitter(HelpEmitter),
}

/// One row of a command table.
///
/// Built with the `const` builder methods so tables can live in `static`s:
///
/// ```ignore
/// static COMMANDS: [CommandDef<'static>; 1] = [
///     CommandDef::new("+CFG").args(1, 3).help("Configuration.").handler(cfg),
/// ];
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CommandDef<'a> {
    /// Text following the `AT` prefix, e.g. `+CFG`. Case sensitive.
    pub name: &'a str,
    /// Minimum accepted argument count.
    pub min_args: u16,
    /// Maximum accepted argument count.
    pub max_args: u16,
    pub help: Help<'a>,
    /// `None` is accepted at registration and rejected at dispatch.
    pub handler: Option<Handler>,
}

impl<'a> CommandDef<'a> {
    /// A definition accepting `0..=DEFAULT_MAX_ARGS` arguments, with the
    /// default help text and no handler.
    pub const fn new(name: &'a str) -> Self {
        Self {
            name,
            min_args: 0,
            max_args: DEFAULT_MAX_ARGS,
            help: Help::Text(DEFAULT_HELP_STRING),
            handler: None,
        }
    }

    pub const fn args(mut self, min_args: u16, max_args: u16) -> Self {
        self.min_args = min_args;
        self.max_args = max_args;
        self
    }

    pub const fn help(mut self, text: &'a str) -> Self {
        self.help = Help::Text(text);
        self
    }

    pub const fn help_fn(mut self, emitter: HelpEmitter) -> Self {
        self.help = Help::Emitter(emitter);
        self
    }

    pub const fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Whether `count` arguments are accepted.
    #[inline(always)]
    pub fn accepts(&self, count: usize) -> bool {
        count >= usize::from(self.min_args) && count <= usize::from(self.max_args)
    }

    /// Writes this command's help entry.
    pub fn write_help(&self, sink: &mut dyn Write) -> fmt::Result {
        match self.help {
            Help::Emitter(emit) => emit(sink),
            Help::Text(text) => write!(sink, "{}: \r\n\t{}\r\n", self.name, text),
        }
    }
}

/// The synthesized `+HELP` entry. Dispatch is handled by the parser, which
/// hands the registry to [`CommandRegistry::write_help`].
pub const HELP_DEF: CommandDef<'static> = CommandDef::new(HELP_COMMAND).args(0, 0).help(HELP_COMMAND_TEXT);

/// Owned copy of a [`CommandDef`], independent of the caller's table.
#[derive(Debug, Clone)]
struct StoredCommand {
    name: String<AT_COMMAND_MAX_LEN>,
    min_args: u16,
    max_args: u16,
    help: StoredHelp,
    handler: Option<Handler>,
}

#[derive(Debug, Clone)]
enum StoredHelp {
    Text(String<HELP_STRING_MAX_LEN>),
    Emitter(HelpEmitter),
}

impl StoredCommand {
    fn copy_from(index: usize, def: &CommandDef<'_>) -> Result<Self, ConfigError> {
        let mut name = String::new();
        name.push_str(def.name).map_err(|_| ConfigError::NameTooLong { index, max: AT_COMMAND_MAX_LEN })?;

        let help = match def.help {
            Help::Emitter(emit) => StoredHelp::Emitter(emit),
            Help::Text(text) => {
                let mut buf = String::new();
                buf.push_str(text).map_err(|_| ConfigError::HelpTooLong { index, max: HELP_STRING_MAX_LEN })?;
                StoredHelp::Text(buf)
            }
        };

        Ok(Self { name, min_args: def.min_args, max_args: def.max_args, help, handler: def.handler })
    }

    fn as_def(&self) -> CommandDef<'_> {
        CommandDef {
            name: &self.name,
            min_args: self.min_args,
            max_args: self.max_args,
            help: match &self.help {
                StoredHelp::Text(text) => Help::Text(text),
                StoredHelp::Emitter(emit) => Help::Emitter(*emit),
            },
            handler: self.handler,
        }
    }
}

/// How the registry holds the active table.
enum Table<'a> {
    /// No usable table: never set, or the last table was rejected.
    Empty,
    /// Caller-owned table that outlives the registry.
    Borrowed(&'a [CommandDef<'a>]),
    /// Internal copy.
    Owned(Vec<StoredCommand, MAX_NUM_COMMANDS>),
}

/// Result of resolving a command name.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Resolved<'r> {
    Help,
    Command(CommandDef<'r>),
}

/// The table of recognized commands.
///
/// Holds exactly one table at a time, either borrowed from the caller or
/// copied into fixed-capacity storage. A `+HELP` entry listing the table is
/// resolvable in both modes without being stored in it.
///
/// Replacing the table goes through `&mut self`, so it can never interleave
/// with a lookup in progress.
pub struct CommandRegistry<'a> {
    table: Table<'a>,
}

impl<'a> CommandRegistry<'a> {
    /// An empty registry. Not ready until a table is set.
    pub const fn new() -> Self {
        Self { table: Table::Empty }
    }

    /// A registry referencing `table` in place.
    pub fn borrowed(table: &'a [CommandDef<'a>]) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.set_borrowed(table)?;
        Ok(registry)
    }

    /// A registry holding its own copy of `table`.
    pub fn owned(table: &[CommandDef<'_>]) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.set_owned(table)?;
        Ok(registry)
    }

    /// Replaces the active table with a reference to `table`.
    ///
    /// On error the previous table is discarded anyway and the registry is
    /// left not ready.
    pub fn set_borrowed(&mut self, table: &'a [CommandDef<'a>]) -> Result<(), ConfigError> {
        self.table = Table::Empty;
        validate(table)?;
        self.table = Table::Borrowed(table);
        Ok(())
    }

    /// Replaces the active table with a copy of `table`.
    ///
    /// `table` may be a temporary: names and help texts are copied into
    /// bounded buffers. On error the registry is left not ready.
    pub fn set_owned(&mut self, table: &[CommandDef<'_>]) -> Result<(), ConfigError> {
        self.table = Table::Empty;
        validate(table)?;

        let mut stored = Vec::new();
        for (index, def) in table.iter().enumerate() {
            let copy = StoredCommand::copy_from(index, def)?;
            // `validate` already checked the row count.
            stored
                .push(copy)
                .map_err(|_| ConfigError::TooManyCommands { max: MAX_NUM_COMMANDS, actual: table.len() })?;
        }
        self.table = Table::Owned(stored);
        Ok(())
    }

    /// Whether a valid table is active.
    pub fn is_ready(&self) -> bool {
        !matches!(self.table, Table::Empty)
    }

    /// Number of registered commands plus the synthesized `+HELP`.
    pub fn count(&self) -> usize {
        self.len() + 1
    }

    /// Finds the definition named `name`.
    ///
    /// `+HELP` always resolves to [`HELP_DEF`]. Names longer than
    /// `AT_COMMAND_MAX_LEN` never match. A registry that is not ready
    /// resolves nothing.
    pub fn lookup(&self, name: &str) -> Option<CommandDef<'_>> {
        match self.resolve(name)? {
            Resolved::Help => Some(HELP_DEF),
            Resolved::Command(def) => Some(def),
        }
    }

    /// Registered definitions in registration order, `+HELP` excluded.
    pub fn commands(&self) -> impl Iterator<Item = CommandDef<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Writes the help menu: a header, every registered command in order,
    /// then the `+HELP` entry itself.
    pub fn write_help(&self, sink: &mut dyn Write) -> fmt::Result {
        sink.write_str("AT Command Help Menu:\r\n")?;
        for def in self.commands() {
            def.write_help(sink)?;
        }
        HELP_DEF.write_help(sink)
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<Resolved<'_>> {
        if !self.is_ready() || name.len() > AT_COMMAND_MAX_LEN {
            return None;
        }
        if name == HELP_COMMAND {
            return Some(Resolved::Help);
        }
        self.commands().find(|def| def.name == name).map(Resolved::Command)
    }

    fn len(&self) -> usize {
        match &self.table {
            Table::Empty => 0,
            Table::Borrowed(table) => table.len(),
            Table::Owned(table) => table.len(),
        }
    }

    fn get(&self, index: usize) -> Option<CommandDef<'_>> {
        match &self.table {
            Table::Empty => None,
            Table::Borrowed(table) => table.get(index).copied(),
            Table::Owned(table) => table.get(index).map(StoredCommand::as_def),
        }
    }
}

impl Default for CommandRegistry<'_> {
    /// Returns an empty, not ready registry.
    fn default() -> Self {
        Self::new()
    }
}

/// Checks every row of a table against the configured bounds.
fn validate(table: &[CommandDef<'_>]) -> Result<(), ConfigError> {
    if table.len() > MAX_NUM_COMMANDS {
        log::warn!("CommandRegistry: {} commands exceed maximum {}", table.len(), MAX_NUM_COMMANDS);
        return Err(ConfigError::TooManyCommands { max: MAX_NUM_COMMANDS, actual: table.len() });
    }

    for (index, def) in table.iter().enumerate() {
        let error = if def.name.is_empty() {
            Some(ConfigError::EmptyName { index })
        } else if def.name.len() > AT_COMMAND_MAX_LEN {
            Some(ConfigError::NameTooLong { index, max: AT_COMMAND_MAX_LEN })
        } else if def.name.contains(OPERATOR_CHARS) {
            Some(ConfigError::InvalidName { index })
        } else if def.name == HELP_COMMAND {
            Some(ConfigError::ReservedName { index })
        } else if table[..index].iter().any(|other| other.name == def.name) {
            Some(ConfigError::DuplicateName { index })
        } else if def.min_args > def.max_args {
            Some(ConfigError::InvalidArity { index, min: def.min_args, max: def.max_args })
        } else if matches!(def.help, Help::Text(text) if text.len() > HELP_STRING_MAX_LEN) {
            Some(ConfigError::HelpTooLong { index, max: HELP_STRING_MAX_LEN })
        } else {
            None
        };

        if let Some(error) = error {
            log::warn!("CommandRegistry: rejected command table: {}", error);
            return Err(error);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::String as StdString;

    use super::*;

    fn callback1(_op: Operator, _args: &[Arg]) -> Result<(), HandlerError> {
        Ok(())
    }

    fn callback2(_op: Operator, _args: &[Arg]) -> Result<(), HandlerError> {
        Err(HandlerError::Rejected)
    }

    fn version_help(sink: &mut dyn Write) -> fmt::Result {
        sink.write_str("+VER: firmware version\r\n")
    }

    static EXAMPLE_COMMANDS: [CommandDef<'static>; 2] = [
        CommandDef::new("+TEST").args(0, 1).help("This is a test.").handler(callback1),
        CommandDef::new("+CFG")
            .args(1, 3)
            .help("Configuration. Takes between 1 and 3 arguments.")
            .handler(callback2),
    ];

    fn long_help() -> StdString {
        "According to all known laws of aviation, ".repeat(6)
    }

    #[test]
    fn test_single_command() {
        let table = [CommandDef::new("+TEST").args(0, 1).help("This is a test.").handler(callback1)];
        let registry = CommandRegistry::owned(&table).unwrap();
        assert!(registry.is_ready());
        assert_eq!(registry.count(), 2);

        assert!(registry.lookup("+Blah").is_none());

        let def = registry.lookup("+TEST").unwrap();
        assert_eq!(def.name, "+TEST");
        assert!(matches!(def.help, Help::Text("This is a test.")));
        let handler = def.handler.unwrap();
        assert!(handler(Operator::Assign, &[]).is_ok());
    }

    #[test]
    fn test_two_commands_borrowed() {
        let registry = CommandRegistry::borrowed(&EXAMPLE_COMMANDS).unwrap();
        assert_eq!(registry.count(), 3);
        assert!(registry.lookup("+Potatoes").is_none());

        let test = registry.lookup("+TEST").unwrap();
        assert_eq!((test.min_args, test.max_args), (0, 1));
        let cfg = registry.lookup("+CFG").unwrap();
        assert_eq!((cfg.min_args, cfg.max_args), (1, 3));
        assert_eq!(cfg.handler.unwrap()(Operator::Query, &[]), Err(HandlerError::Rejected));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = CommandRegistry::borrowed(&EXAMPLE_COMMANDS).unwrap();
        assert!(registry.lookup("+test").is_none());
        assert!(registry.lookup("+TES").is_none());
        assert!(registry.lookup("+TESTX").is_none());
    }

    #[test]
    fn test_help_always_resolves() {
        for registry in [
            CommandRegistry::borrowed(&EXAMPLE_COMMANDS).unwrap(),
            CommandRegistry::owned(&EXAMPLE_COMMANDS).unwrap(),
            CommandRegistry::owned(&[]).unwrap(),
        ] {
            let help = registry.lookup(HELP_COMMAND).unwrap();
            assert_eq!(help.name, HELP_COMMAND);
            assert_eq!((help.min_args, help.max_args), (0, 0));
        }
        assert_eq!(CommandRegistry::owned(&[]).unwrap().count(), 1);
    }

    #[test]
    fn test_owned_outlives_source() {
        let registry = {
            let name = StdString::from("+TEMP");
            let help = StdString::from("Temporary table.");
            let table = [CommandDef::new(&name).args(1, 2).help(&help)];
            CommandRegistry::owned(&table).unwrap()
        };
        let def = registry.lookup("+TEMP").unwrap();
        assert_eq!((def.min_args, def.max_args), (1, 2));
        assert!(matches!(def.help, Help::Text("Temporary table.")));
        assert!(def.handler.is_none());
    }

    #[test]
    fn test_reject_name_too_long() {
        let table = [CommandDef::new("+HIHIHIHIHIHIHIHIHIHITOOLONG")];
        assert_eq!(
            CommandRegistry::owned(&table).err(),
            Some(ConfigError::NameTooLong { index: 0, max: AT_COMMAND_MAX_LEN })
        );
        assert_eq!(
            CommandRegistry::borrowed(&table).err(),
            Some(ConfigError::NameTooLong { index: 0, max: AT_COMMAND_MAX_LEN })
        );
    }

    #[test]
    fn test_reject_help_too_long() {
        let help = long_help();
        assert!(help.len() > HELP_STRING_MAX_LEN);
        let table = [CommandDef::new("+BEE").help(&help)];
        assert_eq!(
            CommandRegistry::owned(&table).err(),
            Some(ConfigError::HelpTooLong { index: 0, max: HELP_STRING_MAX_LEN })
        );
    }

    #[test]
    fn test_reject_bad_rows() {
        assert_eq!(CommandRegistry::owned(&[CommandDef::new("")]).err(), Some(ConfigError::EmptyName { index: 0 }));
        assert_eq!(
            CommandRegistry::owned(&[CommandDef::new("+A"), CommandDef::new("+B=")]).err(),
            Some(ConfigError::InvalidName { index: 1 })
        );
        assert_eq!(
            CommandRegistry::owned(&[CommandDef::new(HELP_COMMAND)]).err(),
            Some(ConfigError::ReservedName { index: 0 })
        );
        assert_eq!(
            CommandRegistry::owned(&[CommandDef::new("+A"), CommandDef::new("+A")]).err(),
            Some(ConfigError::DuplicateName { index: 1 })
        );
        assert_eq!(
            CommandRegistry::owned(&[CommandDef::new("+A").args(3, 1)]).err(),
            Some(ConfigError::InvalidArity { index: 0, min: 3, max: 1 })
        );
    }

    #[test]
    fn test_reject_too_many_commands() {
        let table = [CommandDef::new("+A"); MAX_NUM_COMMANDS + 1];
        assert_eq!(
            CommandRegistry::owned(&table).err(),
            Some(ConfigError::TooManyCommands { max: MAX_NUM_COMMANDS, actual: MAX_NUM_COMMANDS + 1 })
        );
    }

    #[test]
    fn test_failed_replace_leaves_registry_not_ready() {
        let mut registry = CommandRegistry::borrowed(&EXAMPLE_COMMANDS).unwrap();
        assert!(registry.lookup("+TEST").is_some());

        assert!(registry.set_owned(&[CommandDef::new("")]).is_err());
        assert!(!registry.is_ready());
        assert!(registry.lookup("+TEST").is_none());
        assert!(registry.lookup(HELP_COMMAND).is_none());
        assert_eq!(registry.count(), 1);

        registry.set_owned(&EXAMPLE_COMMANDS).unwrap();
        assert!(registry.is_ready());
        assert!(registry.lookup("+CFG").is_some());
    }

    #[test]
    fn test_new_registry_not_ready() {
        let registry = CommandRegistry::new();
        assert!(!registry.is_ready());
        assert!(registry.lookup(HELP_COMMAND).is_none());
    }

    #[test]
    fn test_commands_in_order() {
        let registry = CommandRegistry::owned(&EXAMPLE_COMMANDS).unwrap();
        let names: std::vec::Vec<&str> = registry.commands().map(|def| def.name).collect();
        assert_eq!(names, ["+TEST", "+CFG"]);
    }

    #[test]
    fn test_write_help() {
        let table = [
            CommandDef::new("+TEST").help("This is a test."),
            CommandDef::new("+VER").help_fn(version_help),
        ];
        let registry = CommandRegistry::owned(&table).unwrap();
        let mut out = StdString::new();
        registry.write_help(&mut out).unwrap();
        assert_eq!(
            out,
            "AT Command Help Menu:\r\n\
             +TEST: \r\n\tThis is a test.\r\n\
             +VER: firmware version\r\n\
             +HELP: \r\n\tDisplay this menu.\r\n"
        );
    }

    #[test]
    fn test_write_help_empty_table() {
        let registry = CommandRegistry::owned(&[]).unwrap();
        let mut out = StdString::new();
        registry.write_help(&mut out).unwrap();
        assert_eq!(out, std::format!("AT Command Help Menu:\r\n{}: \r\n\t{}\r\n", HELP_COMMAND, HELP_COMMAND_TEXT));
    }
}
