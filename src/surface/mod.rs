//! Forwarding surfaces.
//!
//! A [`Surface`] is the table of operations a tracked value forwards to its
//! inner value: comparators keyed by right-hand type, named methods and
//! attributes, and an optional byte conversion. Types opt in by implementing
//! [`Trackable`] and declaring their operations on a [`SurfaceBuilder`].
//! Surfaces are synthesized once per type and cached by a
//! [`SurfaceRegistry`](registry::SurfaceRegistry).
//!
//! # Synthesis rules
//!
//! - Names on the registry's [`DenyList`](registry::DenyList) are dropped.
//! - Operations declared with a parameter list become callable forwards;
//!   calls are arity-checked before the handler runs.
//! - Operations declared as `native` have no parameter list the surface can
//!   check, so they are forwarded as attribute reads.

pub mod builtin;
pub mod registry;

use std::any::{Any, TypeId, type_name};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::error::OpError;
use crate::value::Value;

use self::registry::DenyList;

// ---------------------------------------------------------------------------
// CmpOp
// ---------------------------------------------------------------------------

/// A comparison a surface can evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `<=`
    #[serde(rename = "<=")]
    Le,
    /// `>=`
    #[serde(rename = ">=")]
    Ge,
    /// `==`
    #[serde(rename = "==")]
    Eq,
    /// `!=`
    #[serde(rename = "!=")]
    Ne,
}

impl CmpOp {
    /// The operator as written in source.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }

    /// Whether an ordering between two values satisfies this operator.
    #[must_use]
    pub const fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Lt => ordering.is_lt(),
            Self::Gt => ordering.is_gt(),
            Self::Le => ordering.is_le(),
            Self::Ge => ordering.is_ge(),
            Self::Eq => ordering.is_eq(),
            Self::Ne => ordering.is_ne(),
        }
    }

    /// Evaluate the operator with the std comparison traits.
    pub fn apply<T, U>(self, lhs: &T, rhs: &U) -> bool
    where
        T: PartialOrd<U> + ?Sized,
        U: ?Sized,
    {
        match self {
            Self::Lt => lhs < rhs,
            Self::Gt => lhs > rhs,
            Self::Le => lhs <= rhs,
            Self::Ge => lhs >= rhs,
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// The result of a forwarded comparison.
///
/// Most types answer with a plain boolean. Types whose comparisons build a
/// symbolic or element-wise result (a mask, a query node) answer with
/// [`Verdict::Deferred`]; the interceptor hands those back untouched and
/// records nothing.
pub enum Verdict {
    /// A concrete answer.
    Bool(bool),
    /// A non-boolean comparison result, returned to the caller unchanged.
    Deferred(Box<dyn Any + Send + Sync>),
}

impl Verdict {
    /// Wrap a non-boolean comparison result.
    pub fn deferred<V: Any + Send + Sync>(value: V) -> Self {
        Self::Deferred(Box::new(value))
    }

    /// The boolean answer, if there is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Deferred(_) => None,
        }
    }

    /// Borrow a deferred result as its concrete type.
    #[must_use]
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        match self {
            Self::Bool(_) => None,
            Self::Deferred(inner) => inner.downcast_ref::<V>(),
        }
    }

    /// Logical negation of a boolean verdict.
    ///
    /// A deferred result cannot be negated from outside; `None` is returned
    /// and the comparator must be asked for [`CmpOp::Ne`] instead.
    #[must_use]
    pub fn negate(self) -> Option<Self> {
        match self {
            Self::Bool(b) => Some(Self::Bool(!b)),
            Self::Deferred(_) => None,
        }
    }
}

impl From<bool> for Verdict {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Debug for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Trackable
// ---------------------------------------------------------------------------

/// A type that can live inside a [`Tracked`](crate::Tracked) proxy.
///
/// Implementations declare the operations the proxy may forward. Inherent
/// methods stay reachable through `Deref` regardless of what is declared;
/// the surface covers what must be dispatched at runtime.
pub trait Trackable: Any + Send + Sync + Sized {
    /// Declare this type's forwarding surface.
    fn describe(surface: &mut SurfaceBuilder<Self>);
}

type Comparator = Box<dyn Fn(&dyn Any, &dyn Any, CmpOp) -> Result<Verdict, OpError> + Send + Sync>;
type Handler = Box<dyn Fn(&dyn Any, &[Value]) -> Result<Value, OpError> + Send + Sync>;
type BytesFn = Box<dyn Fn(&dyn Any) -> Result<Vec<u8>, OpError> + Send + Sync>;

/// How an operation was declared.
enum Signature {
    /// A method with a known parameter list.
    Params(usize),
    /// A native operation whose parameters cannot be inspected.
    Opaque,
}

struct Declared {
    name: &'static str,
    signature: Signature,
    handler: Handler,
}

// ---------------------------------------------------------------------------
// SurfaceBuilder
// ---------------------------------------------------------------------------

/// Collects the operations a [`Trackable`] type declares.
pub struct SurfaceBuilder<T> {
    comparators: HashMap<TypeId, Comparator>,
    declared: Vec<Declared>,
    bytes: Option<BytesFn>,
    _type: PhantomData<fn(&T)>,
}

impl<T: Trackable> SurfaceBuilder<T> {
    fn new() -> Self {
        Self {
            comparators: HashMap::new(),
            declared: Vec::new(),
            bytes: None,
            _type: PhantomData,
        }
    }

    /// Register a comparator against right-hand values of type `U`.
    ///
    /// A later registration for the same `U` replaces the earlier one.
    pub fn compare_with<U, F>(&mut self, compare: F) -> &mut Self
    where
        U: Any,
        F: Fn(&T, &U, CmpOp) -> Result<Verdict, OpError> + Send + Sync + 'static,
    {
        let erased: Comparator = Box::new(move |lhs: &dyn Any, rhs: &dyn Any, op: CmpOp| {
            match (lhs.downcast_ref::<T>(), rhs.downcast_ref::<U>()) {
                (Some(lhs), Some(rhs)) => compare(lhs, rhs, op),
                _ => Err(OpError::NotComparable {
                    op,
                    lhs: type_name::<T>(),
                    rhs: type_name::<U>(),
                }),
            }
        });
        self.comparators.insert(TypeId::of::<U>(), erased);
        self
    }

    /// Full ordering against values of the same type.
    pub fn ordered(&mut self) -> &mut Self
    where
        T: PartialOrd,
    {
        self.ordered_with::<T>()
    }

    /// Full ordering against values of type `U`.
    pub fn ordered_with<U>(&mut self) -> &mut Self
    where
        T: PartialOrd<U>,
        U: Any,
    {
        self.compare_with::<U, _>(|lhs, rhs, op| Ok(Verdict::Bool(op.apply(lhs, rhs))))
    }

    /// Equality against values of the same type; every ordering operator
    /// fails with [`OpError::NotComparable`].
    pub fn equatable(&mut self) -> &mut Self
    where
        T: PartialEq,
    {
        self.compare_with::<T, _>(|lhs, rhs, op| match op {
            CmpOp::Eq => Ok(Verdict::Bool(lhs == rhs)),
            CmpOp::Ne => Ok(Verdict::Bool(lhs != rhs)),
            _ => Err(OpError::NotComparable {
                op,
                lhs: type_name::<T>(),
                rhs: type_name::<T>(),
            }),
        })
    }

    /// Declare a method with named parameters.
    pub fn method<F>(&mut self, name: &'static str, params: &[&'static str], call: F) -> &mut Self
    where
        F: Fn(&T, &[Value]) -> Result<Value, OpError> + Send + Sync + 'static,
    {
        self.declare(name, Signature::Params(params.len()), call)
    }

    /// Declare a native operation. Its parameters cannot be inspected, so the
    /// surface forwards it as an attribute read.
    pub fn native<F>(&mut self, name: &'static str, read: F) -> &mut Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.declare(name, Signature::Opaque, move |target, _| Ok(read(target)))
    }

    /// Declare the byte-sequence conversion.
    pub fn bytes<F>(&mut self, convert: F) -> &mut Self
    where
        F: Fn(&T) -> Result<Vec<u8>, OpError> + Send + Sync + 'static,
    {
        self.bytes = Some(Box::new(move |target: &dyn Any| match target.downcast_ref::<T>() {
            Some(target) => convert(target),
            None => Err(wrong_receiver::<T>()),
        }));
        self
    }

    fn declare<F>(&mut self, name: &'static str, signature: Signature, handler: F) -> &mut Self
    where
        F: Fn(&T, &[Value]) -> Result<Value, OpError> + Send + Sync + 'static,
    {
        let handler: Handler = Box::new(move |target: &dyn Any, args: &[Value]| match target.downcast_ref::<T>() {
            Some(target) => handler(target, args),
            None => Err(wrong_receiver::<T>()),
        });
        self.declared.push(Declared {
            name,
            signature,
            handler,
        });
        self
    }
}

fn wrong_receiver<T>() -> OpError {
    OpError::WrongReceiver {
        expected: type_name::<T>(),
    }
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// How a named operation is forwarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Forwarding {
    /// Forwarded as a call with exactly `arity` arguments.
    Call {
        /// Declared parameter count.
        arity: usize,
    },
    /// Forwarded as a plain attribute read.
    Attribute,
}

struct Forward {
    forwarding: Forwarding,
    handler: Handler,
}

/// The synthesized forwarding table for one type.
pub struct Surface {
    type_id: TypeId,
    type_name: &'static str,
    comparators: HashMap<TypeId, Comparator>,
    operations: BTreeMap<&'static str, Forward>,
    denied: Vec<&'static str>,
    bytes: Option<BytesFn>,
}

impl Surface {
    /// Build the surface for `T`, dropping denied names.
    pub(crate) fn synthesize<T: Trackable>(deny: &DenyList) -> Self {
        let mut builder = SurfaceBuilder::<T>::new();
        T::describe(&mut builder);

        let mut operations = BTreeMap::new();
        let mut denied = Vec::new();
        for Declared {
            name,
            signature,
            handler,
        } in builder.declared
        {
            if deny.contains(name) {
                denied.push(name);
                continue;
            }
            let forwarding = match signature {
                Signature::Params(arity) => Forwarding::Call { arity },
                Signature::Opaque => Forwarding::Attribute,
            };
            operations.insert(
                name,
                Forward {
                    forwarding,
                    handler,
                },
            );
        }

        tracing::debug!(
            type_name = type_name::<T>(),
            comparators = builder.comparators.len(),
            operations = operations.len(),
            denied = denied.len(),
            "synthesized forwarding surface"
        );

        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            comparators: builder.comparators,
            operations,
            denied,
            bytes: builder.bytes,
        }
    }

    /// Name of the type this surface forwards to.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether a comparator against right-hand values of type `U` exists.
    #[must_use]
    pub fn comparable_with<U: Any>(&self) -> bool {
        self.comparators.contains_key(&TypeId::of::<U>())
    }

    /// Whether a comparator for the dynamic type of `rhs` exists.
    #[must_use]
    pub fn has_comparator_for(&self, rhs: &dyn Any) -> bool {
        self.comparators.contains_key(&rhs.type_id())
    }

    /// Whether the type declared a byte conversion.
    #[must_use]
    pub const fn has_bytes(&self) -> bool {
        self.bytes.is_some()
    }

    /// Forwarded operations in name order.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, Forwarding)> + '_ {
        self.operations
            .iter()
            .map(|(name, forward)| (*name, forward.forwarding))
    }

    /// How `name` is forwarded, if it is forwarded at all.
    #[must_use]
    pub fn forwarding(&self, name: &str) -> Option<Forwarding> {
        self.operations.get(name).map(|forward| forward.forwarding)
    }

    /// Declared names that synthesis dropped because they are denied.
    #[must_use]
    pub fn denied(&self) -> &[&'static str] {
        &self.denied
    }

    /// Evaluate `lhs <op> rhs`.
    ///
    /// Against a type with no registered comparator, `==` is `false` and
    /// `!=` is `true`; any ordering fails.
    ///
    /// # Errors
    /// [`OpError::NotComparable`] when no relation exists, any error the
    /// comparator itself returns, or [`OpError::WrongReceiver`].
    pub fn compare(
        &self,
        lhs: &dyn Any,
        op: CmpOp,
        rhs: &dyn Any,
        rhs_type: &'static str,
    ) -> Result<Verdict, OpError> {
        self.check_receiver(lhs)?;
        match self.comparators.get(&rhs.type_id()) {
            Some(compare) => compare(lhs, rhs, op),
            None if op == CmpOp::Eq => Ok(Verdict::Bool(false)),
            None if op == CmpOp::Ne => Ok(Verdict::Bool(true)),
            None => Err(OpError::NotComparable {
                op,
                lhs: self.type_name,
                rhs: rhs_type,
            }),
        }
    }

    /// Invoke a named operation on `target`.
    ///
    /// Attribute forwards accept an empty argument list and return the read
    /// value.
    ///
    /// # Errors
    /// [`OpError::UnknownOperation`], [`OpError::ArityMismatch`],
    /// [`OpError::NotCallable`], or whatever the handler returns.
    pub fn call(&self, target: &dyn Any, name: &str, args: &[Value]) -> Result<Value, OpError> {
        self.check_receiver(target)?;
        let forward = self.lookup(name)?;
        match forward.forwarding {
            Forwarding::Call { arity } if arity != args.len() => Err(OpError::ArityMismatch {
                name: name.to_owned(),
                expected: arity,
                found: args.len(),
            }),
            Forwarding::Attribute if !args.is_empty() => Err(OpError::NotCallable {
                name: name.to_owned(),
            }),
            Forwarding::Call { .. } | Forwarding::Attribute => (forward.handler)(target, args),
        }
    }

    /// Read an attribute of `target`.
    ///
    /// # Errors
    /// [`OpError::UnknownOperation`], [`OpError::NotAnAttribute`] for
    /// methods, or whatever the handler returns.
    pub fn attribute(&self, target: &dyn Any, name: &str) -> Result<Value, OpError> {
        self.check_receiver(target)?;
        let forward = self.lookup(name)?;
        match forward.forwarding {
            Forwarding::Attribute => (forward.handler)(target, &[]),
            Forwarding::Call { .. } => Err(OpError::NotAnAttribute {
                name: name.to_owned(),
            }),
        }
    }

    /// Convert `target` to bytes.
    ///
    /// # Errors
    /// [`OpError::Unsupported`] when no conversion was declared, or whatever
    /// the conversion returns.
    pub fn to_bytes(&self, target: &dyn Any) -> Result<Vec<u8>, OpError> {
        self.check_receiver(target)?;
        let convert = self.bytes.as_ref().ok_or(OpError::Unsupported {
            type_name: self.type_name,
            capability: "byte conversion",
        })?;
        convert(target)
    }

    fn lookup(&self, name: &str) -> Result<&Forward, OpError> {
        self.operations
            .get(name)
            .ok_or_else(|| OpError::UnknownOperation {
                type_name: self.type_name,
                name: name.to_owned(),
            })
    }

    fn check_receiver(&self, target: &dyn Any) -> Result<(), OpError> {
        if target.type_id() == self.type_id {
            Ok(())
        } else {
            Err(OpError::WrongReceiver {
                expected: self.type_name,
            })
        }
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("type_name", &self.type_name)
            .field("comparators", &self.comparators.len())
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .field("denied", &self.denied)
            .field("bytes", &self.bytes.is_some())
            .finish()
    }
}
