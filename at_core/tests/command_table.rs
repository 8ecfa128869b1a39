use core::fmt::{self, Write};
use std::sync::Mutex;

use at_core::{
    at_try_arg, define_at_commands, Arg, AtParser, CommandRegistry, Help, HandlerError, Operator, ParseError,
};

static LAST_FREQUENCY: Mutex<Option<u32>> = Mutex::new(None);

mod handlers {
    use super::*;

    pub fn test(_op: Operator, _args: &[Arg]) -> Result<(), HandlerError> {
        Ok(())
    }

    pub fn freq(op: Operator, args: &[Arg]) -> Result<(), HandlerError> {
        if op != Operator::Assign {
            return Err(HandlerError::InvalidOperator);
        }
        let hz = at_try_arg!(args, 0, u32);
        *LAST_FREQUENCY.lock().unwrap() = Some(hz);
        Ok(())
    }

    pub fn version_help(sink: &mut dyn Write) -> fmt::Result {
        sink.write_str("+VER: reports the firmware version\r\n")
    }
}

define_at_commands! {
    mod commands;
    "+TEST": [0, 1] => crate::handlers::test, help = "This is a test.";
    "+FREQ": [1, 1] => crate::handlers::freq, help = "Set the radio frequency in Hz.";
    "+VER":  [0, 0] => crate::handlers::test, help_fn = crate::handlers::version_help;
    "+TEST2": [1, 100], help = "TEST2 help string.";
}

#[test]
fn test_generated_table() {
    assert_eq!(commands::NUM_COMMANDS, 4);
    assert_eq!(commands::COMMANDS.len(), 4);

    let names: Vec<&str> = commands::COMMANDS.iter().map(|def| def.name).collect();
    assert_eq!(names, ["+TEST", "+FREQ", "+VER", "+TEST2"]);

    let test2 = &commands::COMMANDS[3];
    assert_eq!((test2.min_args, test2.max_args), (1, 100));
    assert!(test2.handler.is_none());
    assert!(matches!(test2.help, Help::Text("TEST2 help string.")));
    assert!(matches!(commands::COMMANDS[2].help, Help::Emitter(_)));
}

#[test]
fn test_generated_registry() {
    let registry = commands::registry().unwrap();
    assert_eq!(registry.count(), commands::NUM_COMMANDS + 1);
    assert!(registry.lookup("+FREQ").is_some());
    assert!(registry.lookup("+HELP").is_some());
    assert!(registry.lookup("+NOPE").is_none());
}

#[test]
fn test_dispatch_through_generated_table() {
    let mut parser = AtParser::new(commands::registry().unwrap(), String::new());

    assert_eq!(parser.parse_message("AT+FREQ=868100000\r\n"), Ok(1));
    assert_eq!(*LAST_FREQUENCY.lock().unwrap(), Some(868_100_000));

    assert_eq!(
        parser.parse_message("AT+FREQ=-5\r\n"),
        Err(ParseError::HandlerFailed(HandlerError::InvalidArgument { index: 0 }))
    );
    assert_eq!(
        parser.parse_message("AT+FREQ?\r\n"),
        Err(ParseError::WrongArity { got: 0, min: 1, max: 1 })
    );
    assert_eq!(
        parser.parse_message("AT+FREQ=1,2"),
        Err(ParseError::WrongArity { got: 2, min: 1, max: 1 })
    );
    assert_eq!(parser.parse_message("AT+TEST2=x"), Err(ParseError::MissingHandler));
}

#[test]
fn test_help_through_generated_table() {
    let mut parser = AtParser::new(commands::registry().unwrap(), String::new());
    assert_eq!(parser.parse_message("AT+HELP\r\n"), Ok(1));
    assert_eq!(
        parser.sink().as_str(),
        "AT Command Help Menu:\r\n\
         +TEST: \r\n\tThis is a test.\r\n\
         +FREQ: \r\n\tSet the radio frequency in Hz.\r\n\
         +VER: reports the firmware version\r\n\
         +TEST2: \r\n\tTEST2 help string.\r\n\
         +HELP: \r\n\tDisplay this menu.\r\n"
    );
}

#[test]
fn test_owned_copy_of_generated_table() {
    let registry = CommandRegistry::owned(commands::COMMANDS).unwrap();
    let names: Vec<&str> = registry.commands().map(|def| def.name).collect();
    assert_eq!(names, ["+TEST", "+FREQ", "+VER", "+TEST2"]);
}
