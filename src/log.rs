//! The comparison event log.
//!
//! Every comparison a tracked value observes becomes a [`ComparisonEvent`]
//! appended to the [`EventLog`] shared by all proxies derived from one root
//! value. The log only ever grows; events are never rewritten, merged or
//! removed. Readers take the finished sequence after the evaluation that
//! produced it has returned.
//!
//! # Relations
//!
//! Only two relation tags exist, `<` and `>`. Non-strict comparisons are
//! recorded as the negation of the opposite strict one: `a <= b` being true
//! is stored as `('>', false)`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::config::LogConfig;
use crate::label::Label;

// ---------------------------------------------------------------------------
// Relation
// ---------------------------------------------------------------------------

/// The relation an event asserts about its subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// `subject < other`
    #[serde(rename = "<")]
    Less,
    /// `subject > other`
    #[serde(rename = ">")]
    Greater,
}

impl Relation {
    /// The relation's tag character.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Less => '<',
            Self::Greater => '>',
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// ---------------------------------------------------------------------------
// ComparisonEvent
// ---------------------------------------------------------------------------

/// One observed comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEvent {
    subject: Arc<Label>,
    relation: Relation,
    outcome: bool,
}

impl ComparisonEvent {
    /// Create an event.
    #[must_use]
    pub const fn new(subject: Arc<Label>, relation: Relation, outcome: bool) -> Self {
        Self {
            subject,
            relation,
            outcome,
        }
    }

    /// The tracked value the comparison was performed on.
    #[must_use]
    pub fn subject(&self) -> &Label {
        &self.subject
    }

    /// The relation that was tested.
    #[must_use]
    pub const fn relation(&self) -> Relation {
        self.relation
    }

    /// Whether the relation held.
    #[must_use]
    pub const fn outcome(&self) -> bool {
        self.outcome
    }
}

impl fmt::Display for ComparisonEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, '{}', {})", self.subject, self.relation, self.outcome)
    }
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// Append-only sequence of comparison events.
///
/// Cloning the log clones the handle: every clone appends to, and reads
/// from, the same buffer.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<ComparisonEvent>>>,
}

impl EventLog {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty log with room for `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::with_capacity(capacity))),
        }
    }

    /// An empty log sized from a `[log]` table.
    #[must_use]
    pub fn with_config(config: &LogConfig) -> Self {
        Self::with_capacity(config.initial_capacity)
    }

    /// Append an event.
    pub fn append(&self, event: ComparisonEvent) {
        tracing::trace!(
            subject = %event.subject,
            relation = %event.relation,
            outcome = event.outcome,
            "comparison recorded"
        );
        self.lock().push(event);
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// A copy of every event recorded so far, in order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ComparisonEvent> {
        self.lock().clone()
    }

    /// Events whose subject is `label`, in order.
    #[must_use]
    pub fn events_for(&self, label: &Label) -> Vec<ComparisonEvent> {
        self.lock()
            .iter()
            .filter(|event| event.subject() == label)
            .cloned()
            .collect()
    }

    /// Whether `other` appends to the same buffer.
    #[must_use]
    pub fn shares_buffer_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.events, &other.events)
    }

    /// Consume this handle and return the recorded events.
    ///
    /// Copies only when other handles to the log are still alive.
    #[must_use]
    pub fn finish(self) -> Vec<ComparisonEvent> {
        match Arc::try_unwrap(self.events) {
            Ok(events) => events.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ComparisonEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("events", &self.len())
            .finish()
    }
}
