//! Comparison interception.
//!
//! Every boolean comparison outcome is recorded against the left operand's
//! label using only the `<` and `>` relation tags:
//!
//! | comparison | recorded                      |
//! |------------|-------------------------------|
//! | `a < b`    | `('<', r)`                    |
//! | `a > b`    | `('>', r)`                    |
//! | `a <= b`   | `('>', !r)`                   |
//! | `a >= b`   | `('<', !r)`                   |
//! | `a == b`   | `('<', false)`, `('>', false)` when equal |
//! | `a != b`   | as `a == b`                   |
//!
//! An unequal `==` additionally evaluates `a < b` while the proxy is still
//! orderable. That comparison records its own `('<', lt)` and the equality
//! then records `('<', lt)`, `('>', !lt)`. If `a < b` fails the proxy is
//! marked unorderable; the failure itself is swallowed.
//!
//! The std operator traits answer through the surface whenever it has a
//! boolean answer for the right-hand type, so `a == b` and `a.try_eq(&b)`
//! never disagree. `T`'s own impls are the fallback.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic;

use crate::error::OpError;
use crate::log::{ComparisonEvent, Relation};
use crate::surface::{CmpOp, Trackable, Verdict};

use super::{Operand, Tracked};

impl<T: Trackable> Tracked<T> {
    /// Evaluate `self < other` through the surface and record the outcome.
    ///
    /// # Errors
    /// [`OpError::NotComparable`] when `T` has no ordering against `other`,
    /// or any error the comparator returns. Nothing is recorded on error.
    pub fn try_lt<R: Operand + ?Sized>(&self, other: &R) -> Result<Verdict, OpError> {
        self.intercept(CmpOp::Lt, other)
    }

    /// Evaluate `self > other`.
    ///
    /// # Errors
    /// As for [`Tracked::try_lt`].
    pub fn try_gt<R: Operand + ?Sized>(&self, other: &R) -> Result<Verdict, OpError> {
        self.intercept(CmpOp::Gt, other)
    }

    /// Evaluate `self <= other`.
    ///
    /// # Errors
    /// As for [`Tracked::try_lt`].
    pub fn try_le<R: Operand + ?Sized>(&self, other: &R) -> Result<Verdict, OpError> {
        self.intercept(CmpOp::Le, other)
    }

    /// Evaluate `self >= other`.
    ///
    /// # Errors
    /// As for [`Tracked::try_lt`].
    pub fn try_ge<R: Operand + ?Sized>(&self, other: &R) -> Result<Verdict, OpError> {
        self.intercept(CmpOp::Ge, other)
    }

    /// Evaluate `self == other`.
    ///
    /// Values of types with no equality relation to `T` are unequal.
    ///
    /// # Errors
    /// Only errors returned by the equality comparator itself. Failures of
    /// the follow-up ordering check never surface.
    pub fn try_eq<R: Operand + ?Sized>(&self, other: &R) -> Result<Verdict, OpError> {
        self.intercept(CmpOp::Eq, other)
    }

    /// Evaluate `self != other`, with the side effects of [`Tracked::try_eq`].
    ///
    /// The comparator is asked for [`CmpOp::Ne`] directly, so a deferred
    /// result is the type's own `!=` object.
    ///
    /// # Errors
    /// As for [`Tracked::try_eq`].
    pub fn try_ne<R: Operand + ?Sized>(&self, other: &R) -> Result<Verdict, OpError> {
        self.intercept(CmpOp::Ne, other)
    }

    fn intercept<R: Operand + ?Sized>(&self, op: CmpOp, other: &R) -> Result<Verdict, OpError> {
        let verdict = self.evaluate(op, other)?;
        if let Some(outcome) = verdict.as_bool() {
            self.observe(op, outcome, other);
        }
        Ok(verdict)
    }

    fn evaluate<R: Operand + ?Sized>(&self, op: CmpOp, other: &R) -> Result<Verdict, OpError> {
        self.surface
            .compare(&self.value, op, other.operand(), other.operand_type())
    }

    /// Record a boolean outcome of `self <op> other` and hand it back.
    fn observe<R: Operand + ?Sized>(&self, op: CmpOp, outcome: bool, other: &R) -> bool {
        match op {
            CmpOp::Lt => self.record(Relation::Less, outcome),
            CmpOp::Gt => self.record(Relation::Greater, outcome),
            CmpOp::Le => self.record(Relation::Greater, !outcome),
            CmpOp::Ge => self.record(Relation::Less, !outcome),
            CmpOp::Eq => self.observe_equality(outcome, other),
            CmpOp::Ne => self.observe_equality(!outcome, other),
        }
        outcome
    }

    fn observe_equality<R: Operand + ?Sized>(&self, equal: bool, other: &R) {
        if equal {
            self.record(Relation::Less, false);
            self.record(Relation::Greater, false);
        } else {
            self.order_after_inequality(other);
        }
    }

    fn order_after_inequality<R: Operand + ?Sized>(&self, other: &R) {
        if !self.is_orderable() {
            return;
        }
        match self.evaluate(CmpOp::Lt, other) {
            Ok(Verdict::Bool(lt)) => {
                self.observe(CmpOp::Lt, lt, other);
                self.record(Relation::Less, lt);
                self.record(Relation::Greater, !lt);
            }
            Ok(Verdict::Deferred(_)) => {}
            Err(err) => self.mark_unorderable(&err),
        }
    }

    /// Answer a std operator, preferring the surface's boolean verdict.
    fn answer<R, F>(&self, op: CmpOp, other: &R, fallback: F) -> bool
    where
        R: Operand + ?Sized,
        F: FnOnce() -> bool,
    {
        let outcome = if self.surface.has_comparator_for(other.operand()) {
            match self.evaluate(op, other) {
                Ok(Verdict::Bool(outcome)) => outcome,
                Ok(Verdict::Deferred(_)) | Err(_) => fallback(),
            }
        } else {
            fallback()
        };
        self.observe(op, outcome, other)
    }

    fn mark_unorderable(&self, cause: &OpError) {
        if self.orderable.swap(false, atomic::Ordering::AcqRel) {
            tracing::debug!(
                label = %self.label,
                type_name = self.surface.type_name(),
                error = %cause,
                "ordering check failed; value is no longer orderable"
            );
        }
    }

    fn record(&self, relation: Relation, outcome: bool) {
        self.log.append(ComparisonEvent::new(
            Arc::clone(&self.label),
            relation,
            outcome,
        ));
    }
}

// ---------------------------------------------------------------------------
// std comparison traits
// ---------------------------------------------------------------------------

impl<T: Trackable + PartialEq> PartialEq for Tracked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.answer(CmpOp::Eq, other, || self.value == other.value)
    }
}

impl<T: Trackable + PartialEq> PartialEq<T> for Tracked<T> {
    fn eq(&self, other: &T) -> bool {
        self.answer(CmpOp::Eq, other, || self.value == *other)
    }
}

impl<T: Trackable + Eq> Eq for Tracked<T> {}

impl<T: Trackable + PartialOrd> PartialOrd for Tracked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }

    fn lt(&self, other: &Self) -> bool {
        self.answer(CmpOp::Lt, other, || self.value < other.value)
    }

    fn le(&self, other: &Self) -> bool {
        self.answer(CmpOp::Le, other, || self.value <= other.value)
    }

    fn gt(&self, other: &Self) -> bool {
        self.answer(CmpOp::Gt, other, || self.value > other.value)
    }

    fn ge(&self, other: &Self) -> bool {
        self.answer(CmpOp::Ge, other, || self.value >= other.value)
    }
}

impl<T: Trackable + PartialOrd> PartialOrd<T> for Tracked<T> {
    fn partial_cmp(&self, other: &T) -> Option<Ordering> {
        self.value.partial_cmp(other)
    }

    fn lt(&self, other: &T) -> bool {
        self.answer(CmpOp::Lt, other, || self.value < *other)
    }

    fn le(&self, other: &T) -> bool {
        self.answer(CmpOp::Le, other, || self.value <= *other)
    }

    fn gt(&self, other: &T) -> bool {
        self.answer(CmpOp::Gt, other, || self.value > *other)
    }

    fn ge(&self, other: &T) -> bool {
        self.answer(CmpOp::Ge, other, || self.value >= *other)
    }
}

impl<T: Trackable + Ord> Ord for Tracked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T: Hash> Hash for Tracked<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}
