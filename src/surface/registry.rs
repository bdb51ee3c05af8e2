//! Per-type surface cache.
//!
//! [`SurfaceRegistry`] maps each [`Trackable`] type to its synthesized
//! [`Surface`]. Synthesis is deterministic for a given type, so concurrent
//! lookups that miss at the same time may both build a surface; the first one
//! inserted wins and every caller receives that same `Arc`. The lock is only
//! held for map access, never while a surface is being built.
//!
//! Rust types are never unloaded, so entries are kept for the registry's
//! lifetime. The process-wide instance ([`SurfaceRegistry::global`]) lives
//! until the process exits.

use std::any::TypeId;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::config::SurfaceConfig;

use super::{Surface, Trackable};

/// Construction hooks that are never forwarded: a proxy must not build a
/// fresh inner value on the caller's behalf.
pub const DEFAULT_DENIED: &[&str] = &["new", "default", "from", "with_capacity"];

static GLOBAL: LazyLock<Arc<SurfaceRegistry>> = LazyLock::new(|| Arc::new(SurfaceRegistry::new()));

// ---------------------------------------------------------------------------
// DenyList
// ---------------------------------------------------------------------------

/// Operation names synthesis refuses to forward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenyList {
    names: BTreeSet<String>,
}

impl DenyList {
    /// The default deny-list extended with `extra` names.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        list.names.extend(extra.into_iter().map(Into::into));
        list
    }

    /// Whether `name` is denied.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Denied names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for DenyList {
    fn default() -> Self {
        Self {
            names: DEFAULT_DENIED.iter().map(|&name| name.to_owned()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// SurfaceRegistry
// ---------------------------------------------------------------------------

/// Cache of synthesized surfaces keyed by type.
#[derive(Debug)]
pub struct SurfaceRegistry {
    surfaces: RwLock<HashMap<TypeId, Arc<Surface>>>,
    deny: DenyList,
    builds: AtomicUsize,
}

impl SurfaceRegistry {
    /// An empty registry using the default deny-list.
    #[must_use]
    pub fn new() -> Self {
        Self::with_deny_list(DenyList::default())
    }

    /// An empty registry using `deny` during synthesis.
    #[must_use]
    pub fn with_deny_list(deny: DenyList) -> Self {
        Self {
            surfaces: RwLock::new(HashMap::new()),
            deny,
            builds: AtomicUsize::new(0),
        }
    }

    /// An empty registry configured from a `[surface]` table.
    #[must_use]
    pub fn with_config(config: &SurfaceConfig) -> Self {
        Self::with_deny_list(DenyList::with_extra(config.deny.iter().cloned()))
    }

    /// The process-wide registry.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Return the surface for `T`, synthesizing it on first use.
    pub fn surface<T: Trackable>(&self) -> Arc<Surface> {
        let id = TypeId::of::<T>();
        if let Some(surface) = self
            .surfaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Arc::clone(surface);
        }

        let built = Arc::new(Surface::synthesize::<T>(&self.deny));
        self.builds.fetch_add(1, Ordering::Relaxed);

        let mut surfaces = self
            .surfaces
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(surfaces.entry(id).or_insert(built))
    }

    /// Whether a surface for `T` has been cached.
    #[must_use]
    pub fn contains<T: Trackable>(&self) -> bool {
        self.surfaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<T>())
    }

    /// Number of cached surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no surface has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of syntheses performed, including ones that lost a race.
    #[must_use]
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// The deny-list applied during synthesis.
    #[must_use]
    pub const fn deny_list(&self) -> &DenyList {
        &self.deny
    }
}

impl Default for SurfaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
