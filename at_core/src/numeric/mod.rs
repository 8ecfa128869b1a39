use crate::error::{HandlerError, NumError};
use crate::parser::Arg;

/// A destination kind for [`arg_to_num`].
///
/// Implemented for the 8 to 64 bit integers and both float widths. Integer
/// values are carried as `i128` until they are narrowed, so the overflow check
/// is the destination's own `TryFrom` bound. Float text is read as `f64`
/// first and then converted to the destination.
pub trait ArgNumber: Copy {
    /// Whether the destination can hold a negative value.
    const SIGNED: bool;

    /// Narrows a parsed integer, `None` if it does not fit.
    fn from_integer(value: i128) -> Option<Self>;

    /// Converts a parsed float. Integer destinations truncate toward zero.
    fn from_float(value: f64) -> Result<Self, NumError>;
}

macro_rules! impl_integer {
    ($($t:ty => $signed:expr),* $(,)?) => {
        $(
            impl ArgNumber for $t {
                const SIGNED: bool = $signed;

                #[inline(always)]
                fn from_integer(value: i128) -> Option<Self> {
                    <$t>::try_from(value).ok()
                }

                fn from_float(value: f64) -> Result<Self, NumError> {
                    if value.is_nan() {
                        return Err(NumError::Malformed);
                    }
                    // `as` truncates toward zero and saturates at the i128 bounds.
                    Self::from_integer(value as i128).ok_or(NumError::Overflow)
                }
            }
        )*
    };
}

macro_rules! impl_float {
    ($($t:ty),* $(,)?) => {
        $(
            impl ArgNumber for $t {
                const SIGNED: bool = true;

                #[inline(always)]
                fn from_integer(value: i128) -> Option<Self> {
                    Some(value as $t)
                }

                #[inline(always)]
                fn from_float(value: f64) -> Result<Self, NumError> {
                    Ok(value as $t)
                }
            }
        )*
    };
}

impl_integer! {
    u8 => false, u16 => false, u32 => false, u64 => false, usize => false,
    i8 => true,  i16 => true,  i32 => true,  i64 => true,  isize => true,
}

impl_float!(f32, f64);

/// Converts a textual argument into a number of kind `T`.
///
/// Leading whitespace is skipped. The text is first read as an integer in
/// `base` (optional sign, optional `0x` in base 16, trailing whitespace
/// allowed). If that does not consume the whole argument, the text is read as
/// a decimal float, whatever `base` is, which must consume everything. Integer
/// destinations keep the float truncated toward zero.
///
/// # Errors
/// - `Empty` for blank text.
/// - `NegativeUnsigned` for a leading `-` and an unsigned `T`.
/// - `Overflow` when the value does not fit `T`.
/// - `Malformed` for any other residue.
/// - `InvalidBase` when `base` is outside `2..=36`.
///
/// # Example
/// ```ignore
/// let v: u16 = arg_to_num("BEEF", 16)?;
/// assert_eq!(v, 0xBEEF);
/// ```
pub fn arg_to_num<T: ArgNumber>(arg: &str, base: u32) -> Result<T, NumError> {
    if !(2..=36).contains(&base) {
        return Err(NumError::InvalidBase(base));
    }

    let text = arg.trim_start();
    if text.is_empty() {
        return Err(NumError::Empty);
    }
    if text.starts_with('-') && !T::SIGNED {
        return Err(NumError::NegativeUnsigned);
    }

    if let Some(parsed) = parse_integer(text, base) {
        return T::from_integer(parsed?).ok_or(NumError::Overflow);
    }

    // The float reading ignores `base`.
    match text.trim_end().parse::<f64>() {
        Ok(value) => T::from_float(value),
        Err(_) => Err(NumError::Malformed),
    }
}

/// [`arg_to_num`] in base 10.
#[inline(always)]
pub fn arg_to_num_dec<T: ArgNumber>(arg: &str) -> Result<T, NumError> {
    arg_to_num(arg, 10)
}

/// Converts `args[index]` for a handler, logging the failure.
///
/// A missing argument and a failed conversion both map to
/// `HandlerError::InvalidArgument { index }`.
pub fn parse_arg<T: ArgNumber>(args: &[Arg], index: usize, base: u32) -> Result<T, HandlerError> {
    let Some(arg) = args.get(index) else {
        log::warn!("missing argument {}", index);
        return Err(HandlerError::InvalidArgument { index });
    };
    arg_to_num(arg, base).map_err(|e| {
        log::warn!("error converting argument {} with base {}: {}", index, base, e);
        HandlerError::InvalidArgument { index }
    })
}

/// Reads `text` as a complete integer.
///
/// Returns `None` when the text is not an integer at all (so a float parse
/// may be tried), `Some(Err(Overflow))` when the digits do not fit `i128`.
fn parse_integer(text: &str, base: u32) -> Option<Result<i128, NumError>> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let digits = if base == 16 {
        unsigned
            .strip_prefix("0x")
            .or_else(|| unsigned.strip_prefix("0X"))
            .unwrap_or(unsigned)
    } else {
        unsigned
    };

    let digits_len = digits
        .find(|c: char| !c.is_digit(base))
        .unwrap_or(digits.len());
    if digits_len == 0 || !digits[digits_len..].trim_end().is_empty() {
        return None;
    }

    let mut value: i128 = 0;
    for c in digits[..digits_len].chars() {
        // `is_digit` above guarantees the conversion.
        let digit = i128::from(c.to_digit(base)?);
        let next = value
            .checked_mul(i128::from(base))
            .and_then(|v| if negative { v.checked_sub(digit) } else { v.checked_add(digit) });
        match next {
            Some(v) => value = v,
            None => return Some(Err(NumError::Overflow)),
        }
    }
    Some(Ok(value))
}
