//! Scalar values stored in pairs and loops.
//!
//! Every value is kept losslessly as text. Numbers are not a separate storage
//! type; [`Value::as_number`] derives a [`Number`] from the text on demand, and
//! the equivalence checker uses that to compare `1.50` and `1.5` as equal.
//!
//! ## Core Types
//!
//! - [`Value`]: one of the two sentinels (`?`, `.`) or a text value
//! - [`QuoteStyle`]: how a text value was (or should be) written; formatting
//!   metadata only, ignored by equality
//! - [`Number`]: an integer, big integer, or float parsed from value text
//!
//! ## Sentinels versus text
//!
//! ```rust
//! use starcif::{from_str, Value};
//!
//! let doc = from_str("data_x\n_bare ?\n_quoted '?'\n").unwrap();
//! let block = &doc.blocks[0];
//! assert_eq!(block.find_pair("_bare"), Some(&Value::Unknown));
//! assert_eq!(block.find_pair("_quoted"), Some(&Value::from("?")));
//! ```

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a text value is delimited in the source text.
///
/// The parser records the style it saw; the writer only honours it when
/// [`WriteOptions::preserve_quotes`](crate::WriteOptions::preserve_quotes) is
/// set and the style can still represent the content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuoteStyle {
    /// Unquoted, whitespace-delimited.
    #[default]
    Bare,
    /// `'single quoted'`
    Single,
    /// `"double quoted"`
    Double,
    /// A `;`-delimited multi-line text field.
    TextField,
}

/// A single STAR/CIF value.
///
/// Equality compares kind and content only; the quote style is ignored, so
/// `'abc'` and `abc` are equal while `'?'` and `?` are not.
///
/// # Examples
///
/// ```rust
/// use starcif::{QuoteStyle, Value};
///
/// let bare = Value::from("abc");
/// let quoted = Value::quoted("abc", QuoteStyle::Single);
/// assert_eq!(bare, quoted);
/// assert_ne!(Value::from("?"), Value::Unknown);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    /// The unknown marker `?`.
    Unknown,
    /// The inapplicable marker `.`.
    Inapplicable,
    /// Any other value, stored exactly as read (quotes removed).
    Text {
        content: String,
        #[serde(default)]
        style: QuoteStyle,
    },
}

impl Value {
    /// Creates a text value with an explicit quote style hint.
    pub fn quoted(content: impl Into<String>, style: QuoteStyle) -> Self {
        Value::Text {
            content: content.into(),
            style,
        }
    }

    /// Returns `true` for the unknown marker `?`.
    #[inline]
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// Returns `true` for the inapplicable marker `.`.
    #[inline]
    #[must_use]
    pub const fn is_inapplicable(&self) -> bool {
        matches!(self, Value::Inapplicable)
    }

    /// Returns `true` if this is a text value (neither `?` nor `.`).
    #[inline]
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Value::Text { .. })
    }

    /// Returns the text content, or `None` for `?` / `.`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Returns the recorded quote style, or `None` for `?` / `.`.
    #[must_use]
    pub fn style(&self) -> Option<QuoteStyle> {
        match self {
            Value::Text { style, .. } => Some(*style),
            _ => None,
        }
    }

    /// Returns a copy of this value with a different quote style hint.
    /// Sentinels are returned unchanged.
    #[must_use]
    pub fn with_style(self, new_style: QuoteStyle) -> Self {
        match self {
            Value::Text { content, .. } => Value::Text {
                content,
                style: new_style,
            },
            other => other,
        }
    }

    /// Parses the content as a number.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use starcif::{Number, Value};
    ///
    /// assert_eq!(Value::from("42").as_number(), Some(Number::Integer(42)));
    /// assert_eq!(Value::from("2.5e1").as_number(), Some(Number::Float(25.0)));
    /// assert_eq!(Value::from("A1").as_number(), None);
    /// assert_eq!(Value::Unknown.as_number(), None);
    /// ```
    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        Number::parse(self.as_str()?)
    }

    /// Tries to read the value as `f64`.
    ///
    /// Handles CIF uncertainty notation like `50.123(4)` by stripping the
    /// parenthesized uncertainty before parsing.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        let s = self.as_str()?;
        let s = match s.find('(') {
            Some(idx) if s.ends_with(')') => &s[..idx],
            _ => s,
        };
        Number::parse(s).map(|n| n.as_f64())
    }

    /// Tries to read the value as `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self.as_number()? {
            Number::Integer(i) => Some(i),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unknown, Value::Unknown) => true,
            (Value::Inapplicable, Value::Inapplicable) => true,
            (Value::Text { content: a, .. }, Value::Text { content: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unknown => f.write_str("?"),
            Value::Inapplicable => f.write_str("."),
            Value::Text { content, .. } => f.write_str(content),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::quoted(value, QuoteStyle::Bare)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::quoted(value, QuoteStyle::Bare)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::quoted(value.to_string(), QuoteStyle::Bare)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Number::Integer(value as i64).into()
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Number::Integer(value).into()
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Number::Integer(value as i64).into()
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Number::Float(value).into()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    /// `None` maps to the unknown marker `?`.
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Unknown, Into::into)
    }
}

/// A numeric reading of a value's text.
///
/// Integers that overflow `i64` are kept exactly as [`Number::BigInt`].
/// Non-finite floats are never produced by [`Number::parse`].
///
/// # Examples
///
/// ```rust
/// use starcif::Number;
///
/// let big = Number::parse("123456789012345678901234567890").unwrap();
/// assert!(matches!(big, Number::BigInt(_)));
/// assert_eq!(Number::Float(1.0).to_string(), "1.0");
/// assert_eq!(Number::parse("+007"), Some(Number::Integer(7)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    BigInt(BigInt),
    Float(f64),
}

impl Number {
    /// Parses CIF numeric syntax: an optional sign, digits with an optional
    /// decimal point, and an optional exponent. Anything else (including
    /// `inf`, `nan`, hex, or uncertainty suffixes) is not a number.
    #[must_use]
    pub fn parse(text: &str) -> Option<Number> {
        let bytes = text.as_bytes();
        let mut i = 0;
        if matches!(bytes.first(), Some(b'+' | b'-')) {
            i += 1;
        }

        let int_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let mut digits = i - int_start;
        let mut is_float = false;

        if i < bytes.len() && bytes[i] == b'.' {
            is_float = true;
            i += 1;
            let frac_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            digits += i - frac_start;
        }
        if digits == 0 {
            return None;
        }

        if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
            is_float = true;
            i += 1;
            if matches!(bytes.get(i), Some(b'+' | b'-')) {
                i += 1;
            }
            let exp_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i == exp_start {
                return None;
            }
        }
        if i != bytes.len() {
            return None;
        }

        if is_float {
            let value: f64 = text.parse().ok()?;
            value.is_finite().then_some(Number::Float(value))
        } else {
            match text.parse::<i64>() {
                Ok(value) => Some(Number::Integer(value)),
                Err(_) => text.parse::<BigInt>().ok().map(Number::BigInt),
            }
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_) | Number::BigInt(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Converts this number to an `f64`, rounding big integers.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::BigInt(b) => b.to_string().parse().unwrap_or(f64::NAN),
            Number::Float(f) => *f,
        }
    }

    /// Numeric equality across representations: `7` equals `7.0`, and big
    /// integers compare exactly with each other.
    #[must_use]
    pub fn numerically_eq(&self, other: &Number) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::BigInt(a), Number::BigInt(b)) => a == b,
            (Number::Integer(a), Number::BigInt(b)) | (Number::BigInt(b), Number::Integer(a)) => {
                BigInt::from(*a) == *b
            }
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl fmt::Display for Number {
    /// Minimal decimal form. Finite floats always carry a decimal point or an
    /// exponent so that they read back as floats. Magnitudes below `1e-6` or
    /// from `1e21` up use the exponent form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::BigInt(b) => write!(f, "{}", b),
            Number::Float(fl) => {
                if !fl.is_finite() {
                    return write!(f, "{}", fl);
                }
                let magnitude = fl.abs();
                if magnitude != 0.0 && !(1e-6..1e21).contains(&magnitude) {
                    return write!(f, "{:e}", fl);
                }
                let text = fl.to_string();
                if text.contains('.') {
                    f.write_str(&text)
                } else {
                    write!(f, "{}.0", text)
                }
            }
        }
    }
}
