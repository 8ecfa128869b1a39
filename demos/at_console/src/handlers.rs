//! Command handlers for the console demo.

use core::fmt::{self, Write};
use std::sync::Mutex;

use at_core::{at_has_arg, at_try_arg, Arg, HandlerError, Operator};

const DEFAULT_POWER: i8 = 14;

#[derive(Debug, Clone, Copy)]
struct RadioState {
    channel: u8,
    power: i8,
    mask: u16,
    frequency: f32,
}

static RADIO: Mutex<RadioState> = Mutex::new(RadioState { channel: 0, power: DEFAULT_POWER, mask: 0xFFFF, frequency: 868.1 });

fn radio() -> Result<std::sync::MutexGuard<'static, RadioState>, HandlerError> {
    RADIO.lock().map_err(|_| HandlerError::Rejected)
}

/// `AT+CFG=<channel>[,<power>[,<hex mask>]]`, `AT+CFG?`
pub fn cfg(op: Operator, args: &[Arg]) -> Result<(), HandlerError> {
    match op {
        Operator::Query => {
            let state = *radio()?;
            println!("+CFG: {},{},{:04X}", state.channel, state.power, state.mask);
            Ok(())
        }
        Operator::Assign => {
            let channel = at_try_arg!(args, 0, u8);
            let power = if at_has_arg!(args, 1) { at_try_arg!(args, 1, i8) } else { DEFAULT_POWER };
            let mask = if at_has_arg!(args, 2) { at_try_arg!(args, 2, u16, 16) } else { 0xFFFF };

            let mut state = radio()?;
            state.channel = channel;
            state.power = power;
            state.mask = mask;
            Ok(())
        }
        _ => Err(HandlerError::InvalidOperator),
    }
}

/// `AT+FREQ=<MHz>`, `AT+FREQ?`
pub fn freq(op: Operator, args: &[Arg]) -> Result<(), HandlerError> {
    match op {
        Operator::Query => {
            println!("+FREQ: {:.3}", radio()?.frequency);
            Ok(())
        }
        Operator::Assign => {
            let mhz = at_try_arg!(args, 0, f32);
            if !(137.0..=1020.0).contains(&mhz) {
                log::warn!("frequency {} MHz out of band", mhz);
                return Err(HandlerError::InvalidArgument { index: 0 });
            }
            radio()?.frequency = mhz;
            Ok(())
        }
        _ => Err(HandlerError::InvalidOperator),
    }
}

/// `AT+ECHO <text>...`
pub fn echo(_op: Operator, args: &[Arg]) -> Result<(), HandlerError> {
    let mut line = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(arg);
    }
    println!("{}", line);
    Ok(())
}

pub fn ver(_op: Operator, _args: &[Arg]) -> Result<(), HandlerError> {
    println!("+VER: {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

pub fn ver_help(sink: &mut dyn Write) -> fmt::Result {
    write!(sink, "+VER: \r\n\tPrints the console version ({}).\r\n", env!("CARGO_PKG_VERSION"))
}
