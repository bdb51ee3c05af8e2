//! Names for tracked values.
//!
//! A [`Label`] is what an explanation calls a value. It is either a literal
//! scalar, a reference to another tracked value's name, a caller-supplied
//! [`Provenance`], or the composite name an operator gives its result.
//! Labels only need to be readable; nothing requires them to be unique.

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::tracked::Operand;
use crate::tracked::ops::BinaryOp;
use crate::value::{Complex, Value};

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Where a non-literal value came from, as told by the code that wrapped it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    /// The name to render for the value.
    pub name: String,
    /// Source file of the wrapping call.
    pub file: String,
    /// Source line of the wrapping call.
    pub line: u32,
}

impl Provenance {
    /// Create a provenance record from explicit parts.
    pub fn new(name: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            line,
        }
    }

    /// Create a provenance record for the calling source location.
    ///
    /// The location is the one the compiler passes through
    /// `#[track_caller]`; no stack inspection happens at runtime.
    #[track_caller]
    pub fn here(name: impl Into<String>) -> Self {
        let location = Location::caller();
        Self::new(name, location.file(), location.line())
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// The name of a tracked value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// A literal scalar, rendered as itself.
    Literal(Value),
    /// The name of another tracked value.
    Tracked(Arc<Label>),
    /// A caller-supplied descriptor.
    Origin(Provenance),
    /// The result of a binary operator applied to two tracked values.
    Derived {
        /// Name of the left operand.
        lhs: Arc<Label>,
        /// The operator.
        op: BinaryOp,
        /// Name of the right operand.
        rhs: Arc<Label>,
    },
}

impl Label {
    /// A literal label.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// A label referring to another label by name.
    #[must_use]
    pub const fn reference(name: Arc<Self>) -> Self {
        Self::Tracked(name)
    }

    /// The composite label `"<lhs> <op> <rhs>"`.
    #[must_use]
    pub const fn derived(lhs: Arc<Self>, op: BinaryOp, rhs: Arc<Self>) -> Self {
        Self::Derived { lhs, op, rhs }
    }

    /// The rendered name.
    #[must_use]
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Whether this label is a literal scalar.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Tracked(name) => write!(f, "{name}"),
            Self::Origin(origin) => write!(f, "{origin}"),
            Self::Derived { lhs, op, rhs } => write!(f, "{lhs} {op} {rhs}"),
        }
    }
}

/// Choose a label for `value`.
///
/// Tracked values are referred to by name and literal scalars label
/// themselves. Anything else gets the caller's `origin`.
pub fn label_for<R: Operand + ?Sized>(value: &R, origin: Provenance) -> Label {
    if let Some(name) = value.operand_label() {
        return Label::Tracked(Arc::clone(name));
    }
    Value::from_any(value.operand()).map_or(Label::Origin(origin), Label::Literal)
}

impl From<Value> for Label {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<Provenance> for Label {
    fn from(origin: Provenance) -> Self {
        Self::Origin(origin)
    }
}

impl From<Arc<Self>> for Label {
    fn from(name: Arc<Self>) -> Self {
        Self::Tracked(name)
    }
}

macro_rules! label_from_literal {
    ($($t:ty),*) => {$(
        impl From<$t> for Label {
            fn from(value: $t) -> Self {
                Self::Literal(Value::from(value))
            }
        }
    )*};
}

label_from_literal!(
    &str, String, Vec<u8>, &[u8], bool, f32, f64, Complex, i8, i16, i32, i64, i128, isize, u8, u16,
    u32, u64, usize
);
