//! Error types for tracked operations.
//!
//! [`OpError`] is returned by every fallible operation that flows through a
//! forwarding [`Surface`](crate::surface::Surface): dynamic comparisons, named
//! method calls, attribute reads and byte conversion. A proxy returns exactly
//! the error the bare value would have produced, so callers can match on the
//! variant without caring whether the value was tracked.

use thiserror::Error;

use crate::surface::CmpOp;

/// Errors raised by operations forwarded through a surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    /// The two operand types have no ordering (or equality) relation.
    #[error("`{op}` not supported between `{lhs}` and `{rhs}`")]
    NotComparable {
        /// The comparison that was attempted.
        op: CmpOp,
        /// Type name of the left-hand operand.
        lhs: &'static str,
        /// Type name of the right-hand operand.
        rhs: &'static str,
    },

    /// The type does not expose an operation with this name.
    #[error("`{type_name}` has no operation `{name}`")]
    UnknownOperation {
        /// Type name of the receiver.
        type_name: &'static str,
        /// The requested operation.
        name: String,
    },

    /// A method was called with the wrong number of arguments.
    #[error("`{name}` takes {expected} argument(s) but {found} were given")]
    ArityMismatch {
        /// The method that was called.
        name: String,
        /// Declared parameter count.
        expected: usize,
        /// Number of arguments supplied.
        found: usize,
    },

    /// Arguments were passed to an operation that is only readable.
    #[error("`{name}` is an attribute and cannot be called with arguments")]
    NotCallable {
        /// The attribute name.
        name: String,
    },

    /// A method was read as if it were an attribute.
    #[error("`{name}` is a method and must be called")]
    NotAnAttribute {
        /// The method name.
        name: String,
    },

    /// A handler rejected one of its arguments.
    #[error("invalid argument to `{name}`: {reason}")]
    InvalidArgument {
        /// The operation that rejected the argument.
        name: String,
        /// Why the argument was rejected.
        reason: String,
    },

    /// The type does not declare the requested capability at all.
    #[error("`{type_name}` does not support {capability}")]
    Unsupported {
        /// Type name of the receiver.
        type_name: &'static str,
        /// Human-readable capability (e.g. `"byte conversion"`).
        capability: &'static str,
    },

    /// A result exists but cannot be represented as a [`Value`](crate::Value).
    #[error("result of `{name}` is out of range: {value}")]
    OutOfRange {
        /// The operation that produced the result.
        name: String,
        /// The result, rendered in decimal.
        value: String,
    },

    /// A surface was asked to operate on a value of a different type.
    #[error("surface for `{expected}` invoked on a value of another type")]
    WrongReceiver {
        /// The type the surface was synthesized for.
        expected: &'static str,
    },
}

impl OpError {
    /// Convenience constructor for handler argument failures.
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` when the error means "these values have no order".
    #[must_use]
    pub const fn is_not_comparable(&self) -> bool {
        matches!(self, Self::NotComparable { .. })
    }
}
