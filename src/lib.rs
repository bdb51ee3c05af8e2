//! Transparent value tracking.
//!
//! [`Tracked<T>`] wraps a value so that everything done with it behaves as it
//! would on the bare value, while every ordering and equality comparison it
//! takes part in is appended to a shared [`EventLog`]. A value generator
//! wraps what it produces, the predicate under test runs unchanged, and the
//! finished log explains which comparisons decided the outcome.
//!
//! ```
//! use tracked::{EventLog, Relation, Tracked};
//!
//! let log = EventLog::new();
//! let a = Tracked::wrap(3_i32, "a", &log);
//! assert!(a < 5_i32);
//!
//! let events = log.finish();
//! assert_eq!(events[0].relation(), Relation::Less);
//! assert!(events[0].outcome());
//! ```
//!
//! Types opt in by implementing [`Trackable`]; the std scalars, strings and
//! byte vectors already do.

pub mod config;
pub mod error;
pub mod label;
pub mod log;
pub mod surface;
pub mod tracked;
pub mod value;

pub use config::{ConfigError, LogConfig, SurfaceConfig, TrackerConfig};
pub use error::OpError;
pub use label::{Label, Provenance, label_for};
pub use log::{ComparisonEvent, EventLog, Relation};
pub use surface::registry::{DEFAULT_DENIED, DenyList, SurfaceRegistry};
pub use surface::{CmpOp, Forwarding, Surface, SurfaceBuilder, Trackable, Verdict};
pub use tracked::ops::{BinaryOp, FloorDiv};
pub use tracked::{Operand, Tracked, unwrap};
pub use value::{Complex, Value};
