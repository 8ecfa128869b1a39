//! Shorthands for handler bodies.

/// `true` if argument `n` is present and not blank.
///
/// ```ignore
/// let power = if at_has_arg!(args, 1) { at_try_arg!(args, 1, u8) } else { DEFAULT_POWER };
/// ```
#[macro_export]
macro_rules! at_has_arg {
    ($args:expr, $n:expr) => {
        $args.len() > $n && !$args[$n].is_empty()
    };
}

/// Converts argument `index` to `$ty`, returning
/// `HandlerError::InvalidArgument { index }` from the enclosing handler on
/// failure. The base defaults to 10.
#[macro_export]
macro_rules! at_try_arg {
    ($args:expr, $index:expr, $ty:ty) => {
        $crate::numeric::parse_arg::<$ty>($args, $index, 10)?
    };
    ($args:expr, $index:expr, $ty:ty, $base:expr) => {
        $crate::numeric::parse_arg::<$ty>($args, $index, $base)?
    };
}

#[cfg(test)]
mod tests {
    use crate::error::HandlerError;
    use crate::parser::{tokenize_args, Arg, Operator};

    fn set_channel(_op: Operator, args: &[Arg]) -> Result<(u8, u16), HandlerError> {
        let channel = at_try_arg!(args, 0, u8);
        let mask = if at_has_arg!(args, 1) { at_try_arg!(args, 1, u16, 16) } else { 0xFFFF };
        Ok((channel, mask))
    }

    #[test]
    fn test_has_arg() {
        let args = tokenize_args("a,,c").unwrap();
        assert!(at_has_arg!(args, 0));
        assert!(!at_has_arg!(args, 1));
        assert!(at_has_arg!(args, 2));
        assert!(!at_has_arg!(args, 3));
    }

    #[test]
    fn test_try_arg() {
        let args = tokenize_args("7,00F0").unwrap();
        assert_eq!(set_channel(Operator::Assign, &args), Ok((7, 0x00F0)));

        let args = tokenize_args("7,").unwrap();
        assert_eq!(set_channel(Operator::Assign, &args), Ok((7, 0xFFFF)));

        let args = tokenize_args("300").unwrap();
        assert_eq!(set_channel(Operator::Assign, &args), Err(HandlerError::InvalidArgument { index: 0 }));

        let args = tokenize_args("1,XYZ").unwrap();
        assert_eq!(set_channel(Operator::Assign, &args), Err(HandlerError::InvalidArgument { index: 1 }));
    }
}
