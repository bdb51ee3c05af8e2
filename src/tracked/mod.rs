//! The tracking proxy.
//!
//! [`Tracked<T>`] owns a value together with its [`Label`], a handle to the
//! [`EventLog`] shared by every proxy derived from the same root, and the
//! cached [`Surface`] for `T`. Everything that is not a comparison or a
//! binary operator passes straight through to the inner value, either via
//! `Deref` or via the surface's named operations.
//!
//! Comparisons are intercepted by the `try_*` methods and the std comparison
//! traits; binary operators are forwarded in [`ops`].

mod compare;
pub mod ops;

use std::any::{Any, type_name};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::OpError;
use crate::label::Label;
use crate::log::EventLog;
use crate::surface::registry::SurfaceRegistry;
use crate::surface::{Surface, Trackable};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Operand
// ---------------------------------------------------------------------------

/// Anything that can stand on the right-hand side of a tracked comparison.
///
/// Implemented for every [`Trackable`] type and for every [`Tracked`] proxy;
/// a proxy presents its inner value.
pub trait Operand {
    /// The raw value, type-erased.
    fn operand(&self) -> &dyn Any;

    /// Name of the raw value's type.
    fn operand_type(&self) -> &'static str;

    /// The label, if this operand is tracked.
    fn operand_label(&self) -> Option<&Arc<Label>> {
        None
    }
}

impl<T: Trackable> Operand for T {
    fn operand(&self) -> &dyn Any {
        self
    }

    fn operand_type(&self) -> &'static str {
        type_name::<T>()
    }
}

impl<T: Trackable> Operand for Tracked<T> {
    fn operand(&self) -> &dyn Any {
        &self.value
    }

    fn operand_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn operand_label(&self) -> Option<&Arc<Label>> {
        Some(&self.label)
    }
}

/// The inner value of `x` if it is tracked, otherwise `x` itself.
pub fn unwrap<R: Operand + ?Sized>(x: &R) -> &dyn Any {
    x.operand()
}

// ---------------------------------------------------------------------------
// Tracked
// ---------------------------------------------------------------------------

/// A value whose comparisons are recorded.
pub struct Tracked<T> {
    value: T,
    label: Arc<Label>,
    log: EventLog,
    orderable: AtomicBool,
    surface: Arc<Surface>,
    registry: Arc<SurfaceRegistry>,
}

impl<T: Trackable> Tracked<T> {
    /// Wrap `value`, recording into `log`, using the process-wide registry.
    pub fn wrap(value: T, label: impl Into<Label>, log: &EventLog) -> Self {
        Self::wrap_with(&SurfaceRegistry::global(), value, label, log)
    }

    /// Wrap `value` using surfaces from `registry`.
    pub fn wrap_with(
        registry: &Arc<SurfaceRegistry>,
        value: T,
        label: impl Into<Label>,
        log: &EventLog,
    ) -> Self {
        Self::assemble(
            Arc::clone(registry),
            value,
            Arc::new(label.into()),
            log.clone(),
        )
    }

    /// A proxy produced by an operator on two tracked operands.
    fn derive(registry: Arc<SurfaceRegistry>, value: T, label: Label, log: EventLog) -> Self {
        tracing::trace!(label = %label, type_name = type_name::<T>(), "derived tracked value");
        Self::assemble(registry, value, Arc::new(label), log)
    }

    fn assemble(
        registry: Arc<SurfaceRegistry>,
        value: T,
        label: Arc<Label>,
        log: EventLog,
    ) -> Self {
        let surface = registry.surface::<T>();
        Self {
            value,
            label,
            log,
            orderable: AtomicBool::new(true),
            surface,
            registry,
        }
    }

    /// This value's label.
    #[must_use]
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// This value's label as a shareable handle.
    #[must_use]
    pub fn label_handle(&self) -> Arc<Label> {
        Arc::clone(&self.label)
    }

    /// The rendered label.
    #[must_use]
    pub fn name(&self) -> String {
        self.label.name()
    }

    /// The event log this value records into.
    #[must_use]
    pub const fn event_log(&self) -> &EventLog {
        &self.log
    }

    /// Whether ordering against other values is still believed to work.
    ///
    /// Starts `true` and turns `false`, for good, the first time the
    /// ordering check after an unequal `==` fails.
    #[must_use]
    pub fn is_orderable(&self) -> bool {
        self.orderable.load(Ordering::Acquire)
    }

    /// The forwarding surface for `T`.
    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Name of the inner value's type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.surface.type_name()
    }

    /// Borrow the inner value.
    #[must_use]
    pub const fn inner(&self) -> &T {
        &self.value
    }

    /// Mutably borrow the inner value.
    pub const fn inner_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Discard tracking and return the inner value.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Invoke a forwarded operation on the inner value.
    ///
    /// # Errors
    /// Whatever [`Surface::call`] returns for the bare value.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, OpError> {
        self.surface.call(&self.value, name, args)
    }

    /// Read a forwarded attribute of the inner value.
    ///
    /// # Errors
    /// Whatever [`Surface::attribute`] returns for the bare value.
    pub fn attribute(&self, name: &str) -> Result<Value, OpError> {
        self.surface.attribute(&self.value, name)
    }

    /// Convert the inner value to bytes.
    ///
    /// # Errors
    /// Whatever [`Surface::to_bytes`] returns for the bare value.
    pub fn to_bytes(&self) -> Result<Vec<u8>, OpError> {
        self.surface.to_bytes(&self.value)
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Clone> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            label: Arc::clone(&self.label),
            log: self.log.clone(),
            orderable: AtomicBool::new(self.orderable.load(Ordering::Acquire)),
            surface: Arc::clone(&self.surface),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<T: fmt::Display> fmt::Display for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
