//! Exact constant values and arithmetic.
//!
//! Integers are arbitrary precision and floats are exact rationals, so a
//! default such as `0.1 * 3` renders the same way the compiler folds it.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::error::{Result, SourceError};
use crate::token::LitKind;
use crate::types::BasicKind;

/// Largest accepted shift count or decimal exponent.
const MAX_SHIFT: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Bool(bool),
    String(String),
    Int(BigInt),
    Float(BigRational),
    Complex(BigRational, BigRational),
}

impl Constant {
    pub fn int(value: i64) -> Self {
        Self::Int(BigInt::from(value))
    }

    /// Decode a literal token.
    pub fn from_literal(kind: LitKind, raw: &str) -> Result<Self> {
        let invalid = || SourceError::InvalidLiteral(raw.to_string());
        match kind {
            LitKind::Int => parse_int(raw).map(Self::Int).ok_or_else(invalid),
            LitKind::Float => parse_float(raw).map(Self::Float).ok_or_else(invalid),
            LitKind::Imag => {
                let body = raw.strip_suffix('i').ok_or_else(invalid)?;
                let imag = parse_imaginary(body).ok_or_else(invalid)?;
                Ok(Self::Complex(BigRational::zero(), imag))
            }
            LitKind::Char => unquote_char(raw)
                .map(|code| Self::Int(BigInt::from(code)))
                .ok_or_else(invalid),
            LitKind::String => unquote(raw).map(Self::String).ok_or_else(invalid),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Complex(..) => "complex",
        }
    }

    /// Integer value, if the constant is exactly representable as one.
    pub fn to_int(&self) -> Option<BigInt> {
        match self.to_rational()? {
            value if value.is_integer() => Some(value.to_integer()),
            _ => None,
        }
    }

    fn to_rational(&self) -> Option<BigRational> {
        match self {
            Self::Int(value) => Some(BigRational::from_integer(value.clone())),
            Self::Float(value) => Some(value.clone()),
            Self::Complex(re, im) if im.is_zero() => Some(re.clone()),
            _ => None,
        }
    }

    fn to_complex(&self) -> Option<(BigRational, BigRational)> {
        match self {
            Self::Complex(re, im) => Some((re.clone(), im.clone())),
            other => other.to_rational().map(|re| (re, BigRational::zero())),
        }
    }

    fn numeric_rank(&self) -> Option<u8> {
        match self {
            Self::Int(_) => Some(1),
            Self::Float(_) => Some(2),
            Self::Complex(..) => Some(3),
            _ => None,
        }
    }

    /// Convert to the representation used by values of `kind`.
    pub fn represent(&self, kind: BasicKind) -> Option<Self> {
        if kind.is_integer() {
            self.to_int().map(Self::Int)
        } else if kind.is_float() {
            self.to_rational().map(Self::Float)
        } else if kind.is_complex() {
            self.to_complex().map(|(re, im)| Self::Complex(re, im))
        } else if kind == BasicKind::String {
            match self {
                Self::String(_) => Some(self.clone()),
                Self::Int(code) => {
                    let ch = code
                        .to_u32()
                        .and_then(char::from_u32)
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    Some(Self::String(ch.to_string()))
                }
                _ => None,
            }
        } else if kind == BasicKind::Bool {
            matches!(self, Self::Bool(_)).then(|| self.clone())
        } else {
            None
        }
    }

    pub fn unary(op: &str, x: &Self) -> Result<Self> {
        match (op, x) {
            ("+", value) if value.numeric_rank().is_some() => Ok(value.clone()),
            ("-", Self::Int(value)) => Ok(Self::Int(-value)),
            ("-", Self::Float(value)) => Ok(Self::Float(-value)),
            ("-", Self::Complex(re, im)) => Ok(Self::Complex(-re, -im)),
            ("!", Self::Bool(value)) => Ok(Self::Bool(!value)),
            ("^", Self::Int(value)) => Ok(Self::Int(!value)),
            _ => Err(SourceError::invalid_operation(format!(
                "operator {op} not defined on {}",
                x.kind_name()
            ))),
        }
    }

    pub fn binary(op: &str, x: &Self, y: &Self) -> Result<Self> {
        match op {
            "==" | "!=" | "<" | "<=" | ">" | ">=" => Self::compare(op, x, y).map(Self::Bool),
            "&&" | "||" => match (x, y) {
                (Self::Bool(a), Self::Bool(b)) => {
                    Ok(Self::Bool(if op == "&&" { *a && *b } else { *a || *b }))
                }
                _ => Err(mismatch(op, x, y)),
            },
            "<<" | ">>" => Self::shift(op, x, y),
            _ => {
                if let (Self::String(a), Self::String(b)) = (x, y) {
                    return if op == "+" {
                        Ok(Self::String(format!("{a}{b}")))
                    } else {
                        Err(mismatch(op, x, y))
                    };
                }
                arithmetic(op, x, y)
            }
        }
    }

    fn compare(op: &str, x: &Self, y: &Self) -> Result<bool> {
        let ordering = match (x, y) {
            (Self::Bool(a), Self::Bool(b)) => {
                return match op {
                    "==" => Ok(a == b),
                    "!=" => Ok(a != b),
                    _ => Err(mismatch(op, x, y)),
                };
            }
            (Self::String(a), Self::String(b)) => a.cmp(b),
            _ => {
                let rank = x.numeric_rank().zip(y.numeric_rank()).map(|(a, b)| a.max(b));
                match rank {
                    Some(3) => {
                        let equal = x.to_complex() == y.to_complex();
                        return match op {
                            "==" => Ok(equal),
                            "!=" => Ok(!equal),
                            _ => Err(mismatch(op, x, y)),
                        };
                    }
                    Some(_) => {
                        let (a, b) = x.to_rational().zip(y.to_rational()).ok_or_else(|| mismatch(op, x, y))?;
                        a.cmp(&b)
                    }
                    None => return Err(mismatch(op, x, y)),
                }
            }
        };

        Ok(match op {
            "==" => ordering.is_eq(),
            "!=" => ordering.is_ne(),
            "<" => ordering.is_lt(),
            "<=" => ordering.is_le(),
            ">" => ordering.is_gt(),
            _ => ordering.is_ge(),
        })
    }

    fn shift(op: &str, x: &Self, count: &Self) -> Result<Self> {
        let value = x.to_int().ok_or_else(|| mismatch(op, x, count))?;
        let count = count
            .to_int()
            .and_then(|count| count.to_usize())
            .filter(|count| *count <= MAX_SHIFT)
            .ok_or_else(|| SourceError::invalid_operation(format!("invalid shift count {count}")))?;
        Ok(Self::Int(if op == "<<" {
            value << count
        } else {
            value >> count
        }))
    }
}

fn mismatch(op: &str, x: &Constant, y: &Constant) -> SourceError {
    SourceError::invalid_operation(format!(
        "operator {op} not defined on {} and {}",
        x.kind_name(),
        y.kind_name()
    ))
}

fn arithmetic(op: &str, x: &Constant, y: &Constant) -> Result<Constant> {
    let rank = x
        .numeric_rank()
        .zip(y.numeric_rank())
        .map(|(a, b)| a.max(b))
        .ok_or_else(|| mismatch(op, x, y))?;

    match rank {
        1 => {
            let (Constant::Int(a), Constant::Int(b)) = (x, y) else {
                return Err(mismatch(op, x, y));
            };
            let value = match op {
                "+" => a + b,
                "-" => a - b,
                "*" => a * b,
                "/" | "%" if b.is_zero() => {
                    return Err(SourceError::invalid_operation("division by zero"));
                }
                "/" => a / b,
                "%" => a % b,
                "&" => a & b,
                "|" => a | b,
                "^" => a ^ b,
                "&^" => a & !b,
                _ => return Err(mismatch(op, x, y)),
            };
            Ok(Constant::Int(value))
        }
        2 => {
            let (a, b) = x
                .to_rational()
                .zip(y.to_rational())
                .ok_or_else(|| mismatch(op, x, y))?;
            let value = match op {
                "+" => a + b,
                "-" => a - b,
                "*" => a * b,
                "/" if b.is_zero() => {
                    return Err(SourceError::invalid_operation("division by zero"));
                }
                "/" => a / b,
                _ => return Err(mismatch(op, x, y)),
            };
            Ok(Constant::Float(value))
        }
        _ => {
            let ((a, b), (c, d)) = x
                .to_complex()
                .zip(y.to_complex())
                .ok_or_else(|| mismatch(op, x, y))?;
            let (re, im) = match op {
                "+" => (a + c, b + d),
                "-" => (a - c, b - d),
                "*" => (&a * &c - &b * &d, &a * &d + &b * &c),
                "/" => {
                    let denom = &c * &c + &d * &d;
                    if denom.is_zero() {
                        return Err(SourceError::invalid_operation("division by zero"));
                    }
                    (
                        (&a * &c + &b * &d) / &denom,
                        (&b * &c - &a * &d) / &denom,
                    )
                }
                _ => return Err(mismatch(op, x, y)),
            };
            Ok(Constant::Complex(re, im))
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::String(value) => {
                let quoted = serde_json::to_string(value).map_err(|_| fmt::Error)?;
                f.write_str(&quoted)
            }
            Self::Float(value) => f.write_str(&format_rational(value)),
            Self::Complex(re, im) => {
                let re = format_rational(re);
                let im = format_rational(im);
                if im.starts_with('-') {
                    write!(f, "({re}{im}i)")
                } else {
                    write!(f, "({re}+{im}i)")
                }
            }
        }
    }
}

/// Floats print the way Go prints constants: `%.6g`, or the shortest `%g`
/// when six digits would hide a fractional part.
fn format_rational(value: &BigRational) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    let approx = match value.to_f64() {
        Some(approx) if approx != 0.0 && approx.is_finite() => approx,
        _ => return format_out_of_range(value),
    };
    let short = format_g(approx, Some(6));
    if !value.is_integer() && !short.contains('.') {
        return format_g(approx, None);
    }
    short
}

/// Go's `%g` for a finite non-zero value; `None` selects the shortest digits.
fn format_g(x: f64, precision: Option<usize>) -> String {
    let scientific = match precision {
        Some(precision) => format!("{:.*e}", precision.saturating_sub(1), x.abs()),
        None => format!("{:e}", x.abs()),
    };
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let digits = match digits.trim_end_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    let count = digits.len() as i32;
    let point = exponent + 1;
    let limit = match precision {
        Some(precision) if precision as i32 > count && count >= point => count,
        Some(precision) => precision as i32,
        None => 6,
    };

    let sign = if x < 0.0 { "-" } else { "" };
    if exponent < -4 || exponent >= limit {
        let (head, tail) = digits.split_at(1);
        let fraction = if tail.is_empty() { String::new() } else { format!(".{tail}") };
        let exponent_sign = if exponent < 0 { '-' } else { '+' };
        format!("{sign}{head}{fraction}e{exponent_sign}{:02}", exponent.unsigned_abs())
    } else if point <= 0 {
        format!("{sign}0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else if count <= point {
        format!("{sign}{digits}{}", "0".repeat((point - count) as usize))
    } else {
        let (whole, fraction) = digits.split_at(point as usize);
        format!("{sign}{whole}.{fraction}")
    }
}

/// Values beyond the `f64` range print as a six-digit mantissa and a decimal exponent.
fn format_out_of_range(value: &BigRational) -> String {
    let ten = BigRational::from_integer(BigInt::from(10));
    let one = BigRational::one();
    let mut mantissa = value.abs();
    let mut exponent = 0i64;
    while mantissa >= ten {
        mantissa /= &ten;
        exponent += 1;
    }
    while mantissa < one {
        mantissa *= &ten;
        exponent -= 1;
    }
    let sign = if value.is_negative() { "-" } else { "" };
    let digits = format_g(mantissa.to_f64().unwrap_or(1.0), Some(6));
    format!("{sign}{digits}e{exponent:+}")
}

fn parse_int(raw: &str) -> Option<BigInt> {
    let digits: String = raw.chars().filter(|c| *c != '_').collect();
    let (radix, body) = match digits.get(..2) {
        Some("0x" | "0X") => (16, &digits[2..]),
        Some("0b" | "0B") => (2, &digits[2..]),
        Some("0o" | "0O") => (8, &digits[2..]),
        _ if digits.len() > 1 && digits.starts_with('0') => (8, &digits[1..]),
        _ => (10, digits.as_str()),
    };
    BigInt::parse_bytes(body.as_bytes(), radix)
}

fn parse_float(raw: &str) -> Option<BigRational> {
    let text: String = raw.chars().filter(|c| *c != '_').collect();

    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        let (mantissa, exponent) = hex.split_once(['p', 'P'])?;
        let exponent: i64 = exponent.parse().ok()?;
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let value = BigInt::parse_bytes(format!("{int_part}{frac_part}").as_bytes(), 16)?;
        return scale(value, 2, exponent - 4 * frac_part.len() as i64);
    }

    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(idx) => (&text[..idx], text[idx + 1..].parse::<i64>().ok()?),
        None => (text.as_str(), 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let value = BigInt::parse_bytes(format!("{int_part}{frac_part}").as_bytes(), 10)?;
    scale(value, 10, exponent - frac_part.len() as i64)
}

fn parse_imaginary(body: &str) -> Option<BigRational> {
    let lower = body.to_ascii_lowercase();
    if lower.starts_with("0x") && lower.contains('p') {
        parse_float(body)
    } else if lower.starts_with("0x") || lower.starts_with("0b") || lower.starts_with("0o") {
        parse_int(body).map(BigRational::from_integer)
    } else if lower.contains(['.', 'e']) {
        parse_float(body)
    } else {
        // Decimal even with a leading zero.
        let digits: String = body.chars().filter(|c| *c != '_').collect();
        BigInt::parse_bytes(digits.as_bytes(), 10).map(BigRational::from_integer)
    }
}

fn scale(value: BigInt, base: u32, exponent: i64) -> Option<BigRational> {
    let magnitude = usize::try_from(exponent.unsigned_abs()).ok()?;
    if magnitude > MAX_SHIFT {
        return None;
    }
    let factor = num_traits::pow(BigInt::from(base), magnitude);
    let value = BigRational::from_integer(value);
    Some(if exponent >= 0 {
        value * BigRational::from_integer(factor)
    } else {
        value / BigRational::from_integer(factor)
    })
}

enum Unit {
    Char(char),
    Byte(u8),
}

/// Decode an interpreted (`"..."`) or raw (`` `...` ``) string literal.
pub fn unquote(raw: &str) -> Option<String> {
    if raw.len() >= 2 && raw.starts_with('`') && raw.ends_with('`') {
        return Some(raw[1..raw.len() - 1].replace('\r', ""));
    }

    let body = raw.strip_prefix('"')?.strip_suffix('"')?;
    let mut bytes = Vec::with_capacity(body.len());
    for unit in decode_escapes(body)? {
        match unit {
            Unit::Char(ch) => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
            Unit::Byte(byte) => bytes.push(byte),
        }
    }
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decode a rune literal to its code point.
pub fn unquote_char(raw: &str) -> Option<u32> {
    let body = raw.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut units = decode_escapes(body)?;
    if units.len() != 1 {
        return None;
    }
    match units.pop()? {
        Unit::Char(ch) => Some(ch as u32),
        Unit::Byte(byte) => Some(u32::from(byte)),
    }
}

fn decode_escapes(body: &str) -> Option<Vec<Unit>> {
    let mut units = Vec::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            units.push(Unit::Char(ch));
            continue;
        }

        let escaped = chars.next()?;
        let unit = match escaped {
            'a' => Unit::Char('\x07'),
            'b' => Unit::Char('\x08'),
            'f' => Unit::Char('\x0c'),
            'n' => Unit::Char('\n'),
            'r' => Unit::Char('\r'),
            't' => Unit::Char('\t'),
            'v' => Unit::Char('\x0b'),
            '\\' | '\'' | '"' => Unit::Char(escaped),
            'x' => Unit::Byte(u8::try_from(hex_digits(&mut chars, 2)?).ok()?),
            '0'..='7' => {
                let mut value = escaped.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                Unit::Byte(u8::try_from(value).ok()?)
            }
            'u' => Unit::Char(char::from_u32(hex_digits(&mut chars, 4)?)?),
            'U' => Unit::Char(char::from_u32(hex_digits(&mut chars, 8)?)?),
            _ => return None,
        };
        units.push(unit);
    }

    Some(units)
}

fn hex_digits(chars: &mut std::str::Chars<'_>, count: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        value = value.checked_mul(16)? + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

impl From<bool> for Constant {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}
