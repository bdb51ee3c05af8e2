//! Binary operator forwarding.
//!
//! When both operands are tracked, the result is a new [`Tracked`] value
//! labelled `"<lhs> <op> <rhs>"` that records into the left operand's log.
//! When only the left operand is tracked, the raw result is returned and
//! tracking stops there.
//!
//! Every operator comes in three forms:
//!
//! - `Tracked<T> op Tracked<U>` (owned)
//! - `&Tracked<T> op &Tracked<U>` (borrowed; `&T op &U` must exist)
//! - `Tracked<T> op U` (untracked right operand)

use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Rem, Shl, Shr, Sub};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::label::Label;
use crate::surface::Trackable;

use super::Tracked;

// ---------------------------------------------------------------------------
// BinaryOp
// ---------------------------------------------------------------------------

/// A forwarded binary operator, as it appears in a derived label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    #[serde(rename = "+")]
    Add,
    /// `-`
    #[serde(rename = "-")]
    Sub,
    /// `*`
    #[serde(rename = "*")]
    Mul,
    /// `/`
    #[serde(rename = "/")]
    Div,
    /// `//`
    #[serde(rename = "//")]
    FloorDiv,
    /// `%`
    #[serde(rename = "%")]
    Rem,
    /// `<<`
    #[serde(rename = "<<")]
    Shl,
    /// `>>`
    #[serde(rename = ">>")]
    Shr,
    /// `&`
    #[serde(rename = "&")]
    BitAnd,
    /// `^`
    #[serde(rename = "^")]
    BitXor,
    /// `|`
    #[serde(rename = "|")]
    BitOr,
}

impl BinaryOp {
    /// The operator symbol used in labels.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Rem => "%",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::BitAnd => "&",
            Self::BitXor => "^",
            Self::BitOr => "|",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ---------------------------------------------------------------------------
// FloorDiv
// ---------------------------------------------------------------------------

/// Division rounding toward negative infinity.
///
/// Unsigned integers divide as usual, signed integers round the truncated
/// quotient down when the operands' signs differ and the division is
/// inexact, and floats take the floor of the true quotient. Division by
/// zero behaves as `/` does.
pub trait FloorDiv<Rhs = Self> {
    /// The quotient type.
    type Output;

    /// `self // rhs`
    fn floor_div(self, rhs: Rhs) -> Self::Output;
}

macro_rules! floor_div_signed {
    ($($t:ty),*) => {$(
        impl FloorDiv for $t {
            type Output = $t;

            fn floor_div(self, rhs: $t) -> $t {
                let quotient = self / rhs;
                if self % rhs != 0 && ((self < 0) != (rhs < 0)) {
                    quotient - 1
                } else {
                    quotient
                }
            }
        }
    )*};
}

macro_rules! floor_div_exact {
    ($($t:ty),*) => {$(
        impl FloorDiv for $t {
            type Output = $t;

            fn floor_div(self, rhs: $t) -> $t {
                self / rhs
            }
        }
    )*};
}

macro_rules! floor_div_float {
    ($($t:ty),*) => {$(
        impl FloorDiv for $t {
            type Output = $t;

            fn floor_div(self, rhs: $t) -> $t {
                (self / rhs).floor()
            }
        }
    )*};
}

macro_rules! floor_div_by_ref {
    ($($t:ty),*) => {$(
        impl<'a> FloorDiv<&'a $t> for &$t {
            type Output = $t;

            fn floor_div(self, rhs: &'a $t) -> $t {
                (*self).floor_div(*rhs)
            }
        }
    )*};
}

floor_div_signed!(i8, i16, i32, i64, i128, isize);
floor_div_exact!(u8, u16, u32, u64, u128, usize);
floor_div_float!(f32, f64);
floor_div_by_ref!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

// ---------------------------------------------------------------------------
// Operator forwarding
// ---------------------------------------------------------------------------

fn derived_label<T, U>(lhs: &Tracked<T>, op: BinaryOp, rhs: &Tracked<U>) -> Label {
    Label::derived(Arc::clone(&lhs.label), op, Arc::clone(&rhs.label))
}

macro_rules! forward_binary_op {
    ($($trait:ident :: $method:ident => $op:ident),* $(,)?) => {$(
        impl<T, U> $trait<Tracked<U>> for Tracked<T>
        where
            T: Trackable + $trait<U>,
            U: Trackable,
            <T as $trait<U>>::Output: Trackable,
        {
            type Output = Tracked<<T as $trait<U>>::Output>;

            fn $method(self, rhs: Tracked<U>) -> Self::Output {
                let label = derived_label(&self, BinaryOp::$op, &rhs);
                let value = <T as $trait<U>>::$method(self.value, rhs.value);
                Tracked::derive(self.registry, value, label, self.log)
            }
        }

        impl<'a, 'b, T, U> $trait<&'b Tracked<U>> for &'a Tracked<T>
        where
            T: Trackable,
            U: Trackable,
            &'a T: $trait<&'b U>,
            <&'a T as $trait<&'b U>>::Output: Trackable,
        {
            type Output = Tracked<<&'a T as $trait<&'b U>>::Output>;

            fn $method(self, rhs: &'b Tracked<U>) -> Self::Output {
                let value = <&'a T as $trait<&'b U>>::$method(&self.value, &rhs.value);
                Tracked::derive(
                    Arc::clone(&self.registry),
                    value,
                    derived_label(self, BinaryOp::$op, rhs),
                    self.log.clone(),
                )
            }
        }

        impl<T, U> $trait<U> for Tracked<T>
        where
            T: Trackable + $trait<U>,
            U: Trackable,
        {
            type Output = <T as $trait<U>>::Output;

            fn $method(self, rhs: U) -> Self::Output {
                <T as $trait<U>>::$method(self.value, rhs)
            }
        }
    )*};
}

forward_binary_op!(
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => Div,
    FloorDiv::floor_div => FloorDiv,
    Rem::rem => Rem,
    Shl::shl => Shl,
    Shr::shr => Shr,
    BitAnd::bitand => BitAnd,
    BitXor::bitxor => BitXor,
    BitOr::bitor => BitOr,
);
