//! Literal scalar values.
//!
//! [`Value`] is the small dynamically typed vocabulary shared by literal
//! labels and by the named operations a [`Surface`](crate::surface::Surface)
//! forwards: text, bytes, booleans, integers, floats and complex numbers.
//! Numeric kinds compare with each other; everything else only compares
//! within its own kind.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::OpError;
use crate::surface::{CmpOp, SurfaceBuilder, Trackable, Verdict};

// ---------------------------------------------------------------------------
// Complex
// ---------------------------------------------------------------------------

/// A complex number. Supports equality but has no ordering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex {
    /// Create a complex number from its parts.
    #[must_use]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im.is_sign_negative() {
            write!(f, "{}-{}i", self.re, -self.im)
        } else {
            write!(f, "{}+{}i", self.re, self.im)
        }
    }
}

impl Trackable for Complex {
    fn describe(surface: &mut SurfaceBuilder<Self>) {
        surface
            .equatable()
            .native("re", |c| Value::Float(c.re))
            .native("im", |c| Value::Float(c.im));
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A literal scalar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// The unit value, returned by operations with nothing to report.
    Unit,
    /// A boolean.
    Bool(bool),
    /// An integer. Every std integer type fits except `u128` values above
    /// `i128::MAX`.
    Int(i128),
    /// A floating point number.
    Float(f64),
    /// A complex number.
    Complex(Complex),
    /// UTF-8 text.
    Text(String),
    /// A raw byte sequence.
    Bytes(Vec<u8>),
}

impl Value {
    /// Short name of this value's kind, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Complex(_) => "complex",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
        }
    }

    /// Recover a literal from a type-erased scalar.
    ///
    /// Returns `None` for anything outside the literal vocabulary.
    #[must_use]
    pub fn from_any(value: &dyn Any) -> Option<Self> {
        macro_rules! try_int {
            ($($t:ty),*) => {$(
                if let Some(n) = value.downcast_ref::<$t>() {
                    return i128::try_from(*n).ok().map(Self::Int);
                }
            )*};
        }

        if let Some(v) = value.downcast_ref::<Self>() {
            return Some(v.clone());
        }
        if let Some(s) = value.downcast_ref::<String>() {
            return Some(Self::Text(s.clone()));
        }
        if let Some(s) = value.downcast_ref::<&'static str>() {
            return Some(Self::Text((*s).to_owned()));
        }
        if let Some(b) = value.downcast_ref::<Vec<u8>>() {
            return Some(Self::Bytes(b.clone()));
        }
        if let Some(b) = value.downcast_ref::<bool>() {
            return Some(Self::Bool(*b));
        }
        if let Some(x) = value.downcast_ref::<f64>() {
            return Some(Self::Float(*x));
        }
        if let Some(x) = value.downcast_ref::<f32>() {
            return Some(Self::Float(f64::from(*x)));
        }
        if let Some(c) = value.downcast_ref::<Complex>() {
            return Some(Self::Complex(*c));
        }
        try_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
        None
    }

    /// The text content, if this is [`Value::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The integer content, if this is [`Value::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i128> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric content widened to `f64`, for ints and floats.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Truthiness: zero, empty and unit values are false.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Unit => false,
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(x) => *x != 0.0,
            Self::Complex(c) => c.re != 0.0 || c.im != 0.0,
            Self::Text(s) => !s.is_empty(),
            Self::Bytes(b) => !b.is_empty(),
        }
    }

    /// Equality across kinds. Numeric kinds compare by value; unrelated kinds
    /// are never equal.
    #[must_use]
    pub fn loose_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Complex(a), Self::Complex(b)) => a == b,
            (Self::Complex(c), n) | (n, Self::Complex(c)) => {
                c.im == 0.0 && n.as_float().is_some_and(|x| x == c.re)
            }
            _ => match self.order(other) {
                Some(ordering) => ordering == Some(Ordering::Equal),
                None => false,
            },
        }
    }

    /// Ordering between two values.
    ///
    /// The outer `Option` is `None` when the kinds have no ordering relation
    /// at all; the inner one is `None` for unordered pairs such as NaN.
    fn order(&self, other: &Self) -> Option<Option<Ordering>> {
        match (self, other) {
            (Self::Unit, Self::Unit) => Some(Some(Ordering::Equal)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.partial_cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.partial_cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.partial_cmp(b)),
            (Self::Bytes(a), Self::Bytes(b)) => Some(a.partial_cmp(b)),
            (a, b) => match (a.as_float(), b.as_float()) {
                (Some(x), Some(y)) => Some(x.partial_cmp(&y)),
                _ => None,
            },
        }
    }

    /// Evaluate `self <op> other`.
    ///
    /// # Errors
    /// Returns [`OpError::NotComparable`] when an ordering is requested
    /// between kinds that have none (text against int, anything complex).
    pub fn compare(&self, op: CmpOp, other: &Self) -> Result<bool, OpError> {
        match op {
            CmpOp::Eq => return Ok(self.loose_eq(other)),
            CmpOp::Ne => return Ok(!self.loose_eq(other)),
            CmpOp::Lt | CmpOp::Gt | CmpOp::Le | CmpOp::Ge => {}
        }
        let ordering = self.order(other).ok_or(OpError::NotComparable {
            op,
            lhs: self.kind(),
            rhs: other.kind(),
        })?;
        Ok(ordering.is_some_and(|o| op.holds(o)))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("()"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Complex(c) => write!(f, "{c}"),
            Self::Text(s) => f.write_str(s),
            Self::Bytes(b) => write!(f, "b\"{}\"", b.escape_ascii()),
        }
    }
}

impl Trackable for Value {
    fn describe(surface: &mut SurfaceBuilder<Self>) {
        surface
            .compare_with::<Self, _>(|a, b, op| a.compare(op, b).map(Verdict::Bool))
            .bytes(|v| match v {
                Self::Text(s) => Ok(s.as_bytes().to_vec()),
                Self::Bytes(b) => Ok(b.clone()),
                _ => Err(OpError::Unsupported {
                    type_name: "Value",
                    capability: "byte conversion",
                }),
            })
            .native("kind", |v| Value::Text(v.kind().to_owned()))
            .native("is_truthy", |v| Value::Bool(v.is_truthy()))
            .method("len", &[], |v, _| match v {
                Self::Text(s) => Ok(Value::from(s.chars().count())),
                Self::Bytes(b) => Ok(Value::from(b.len())),
                other => Err(OpError::invalid_argument(
                    "len",
                    format!("{} has no length", other.kind()),
                )),
            });
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Self::Float(f64::from(x))
    }
}

impl From<Complex> for Value {
    fn from(c: Complex) -> Self {
        Self::Complex(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Self::Int(i128::from(n))
            }
        }
    )*};
}

value_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

macro_rules! value_from_pointer_sized {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            /// Pointer-sized integers always fit; the saturation is unreachable
            /// on targets up to 64 bits.
            fn from(n: $t) -> Self {
                Self::Int(i128::try_from(n).unwrap_or(i128::MAX))
            }
        }
    )*};
}

value_from_pointer_sized!(isize, usize);
