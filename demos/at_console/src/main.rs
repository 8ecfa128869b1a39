//! Line-oriented AT console on stdin/stdout.
//!
//! Run with `--owned` to copy the command table into the registry instead of
//! borrowing it. `RUST_LOG=debug` shows every dispatch.

use std::io::{self, BufRead};

use at_core::{define_at_commands, AtParser, CommandDef, CommandRegistry};
use tracing_subscriber::EnvFilter;

mod handlers;

define_at_commands! {
    mod commands;
    "+CFG":  [0, 3] => crate::handlers::cfg,  help = "Radio config: <channel>[,<power>[,<hex mask>]].";
    "+FREQ": [0, 1] => crate::handlers::freq, help = "Carrier frequency in MHz.";
    "+ECHO": [0, 20] => crate::handlers::echo, help = "Prints its arguments.";
    "+VER":  [0, 0] => crate::handlers::ver,  help_fn = crate::handlers::ver_help;
    "+SLEEP": [1, 1], help = "Not wired up on the console.";
}

fn build_registry(owned: bool) -> Result<CommandRegistry<'static>, at_core::ConfigError> {
    if owned {
        // Start from a copy so the table could be patched at runtime.
        let table: Vec<CommandDef<'static>> = commands::COMMANDS.to_vec();
        CommandRegistry::owned(&table)
    } else {
        commands::registry()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let owned = std::env::args().skip(1).any(|a| a == "--owned");
    let registry = match build_registry(owned) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("invalid command table: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("{} commands registered ({})", registry.count(), if owned { "owned" } else { "borrowed" });

    let mut parser = AtParser::new(registry, String::new());
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let _ = parser.handle_line(&line);
        print!("{}", parser.sink());
        parser.sink_mut().clear();
    }
}
