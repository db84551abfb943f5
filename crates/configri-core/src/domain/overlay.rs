//! The overlay store: persisted data with staged edits laid on top.
//!
//! # How the overlay works
//!
//! ```text
//!   persisted  { name: "Base", version: 13 }
//!   staged     {                version: 22, debug: true }
//!   ─────────────────────────────────────────────────────
//!   view()     { name: "Base", version: 22, debug: true }
//! ```
//!
//! Staged keys win on collision.  Keys of the persisted snapshot keep their
//! position; staged-only keys are appended in the order they were staged.
//!
//! # State machine
//!
//! ```text
//!            stage / stage_all (≥1 key)
//!   Clean ───────────────────────────────▶ Dirty
//!     ▲                                      │
//!     └──────────── clear ◀──────────────────┘
//! ```
//!
//! While `Clean` the view *is* the persisted snapshot and no copy is made.
//! While `Dirty` the merged mapping is computed on the first read and kept
//! until the next mutation.  Every mutation drops the cached mapping, so a
//! stale merge is never served.

use std::cell::OnceCell;

use tracing::trace;

use crate::{Mapping, Value};

/// The two states of an [`OverlayStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlayState {
    /// No staged changes; the view equals the persisted snapshot.
    #[default]
    Clean,
    /// At least one staged change exists and has not been saved or discarded.
    Dirty,
}

/// Holds the persisted snapshot, the staged changes and a lazily computed
/// merged view.
///
/// # Examples
///
/// ```rust
/// use configri_core::{Mapping, OverlayStore};
/// use serde_json::json;
///
/// let mut store = OverlayStore::new();
/// let mut persisted = Mapping::new();
/// persisted.insert("version".into(), json!(13));
/// store.set_persisted(persisted);
///
/// store.stage("version", json!(22));
/// assert!(store.is_dirty());
/// assert_eq!(store.view()["version"], json!(22));
///
/// store.clear();
/// assert_eq!(store.view()["version"], json!(13));
/// ```
#[derive(Debug, Default)]
pub struct OverlayStore {
    persisted: Mapping,
    staged: Mapping,
    state: OverlayState,
    /// Merged view, valid only while `state == Dirty` and no mutation has
    /// happened since it was filled.
    merged: OnceCell<Mapping>,
}

impl OverlayStore {
    /// Creates an empty, clean store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the persisted snapshot wholesale.
    ///
    /// Staged changes and the dirty state are left untouched; the cached
    /// merge is dropped because its base has changed.
    pub fn set_persisted(&mut self, snapshot: Mapping) {
        self.persisted = snapshot;
        self.invalidate();
    }

    /// Stages `value` under `key`, replacing any earlier staged value.
    pub fn stage(&mut self, key: impl Into<String>, value: Value) {
        self.staged.insert(key.into(), value);
        self.state = OverlayState::Dirty;
        self.invalidate();
    }

    /// Stages every entry of every mapping, in order.
    ///
    /// Later mappings override earlier ones for duplicate keys.  Returns the
    /// number of entries staged; the store only becomes dirty when that
    /// number is non-zero.
    pub fn stage_all<'a, I>(&mut self, mappings: I) -> usize
    where
        I: IntoIterator<Item = &'a Mapping>,
    {
        let mut count = 0;
        for mapping in mappings {
            for (key, value) in mapping {
                self.staged.insert(key.clone(), value.clone());
                count += 1;
            }
        }
        if count > 0 {
            self.state = OverlayState::Dirty;
            self.invalidate();
        }
        count
    }

    /// Discards all staged changes.  The persisted snapshot is kept.
    pub fn clear(&mut self) {
        self.staged = Mapping::new();
        self.state = OverlayState::Clean;
        self.invalidate();
    }

    /// Returns the merged view: persisted data with staged changes overlaid.
    pub fn view(&self) -> &Mapping {
        match self.state {
            OverlayState::Clean => &self.persisted,
            OverlayState::Dirty => {
                let (persisted, staged) = (&self.persisted, &self.staged);
                self.merged.get_or_init(|| {
                    trace!(
                        persisted = persisted.len(),
                        staged = staged.len(),
                        "recomputing merged view"
                    );
                    merge(persisted, staged)
                })
            }
        }
    }

    /// The last known persisted snapshot.
    pub fn persisted(&self) -> &Mapping {
        &self.persisted
    }

    /// Edits that have not been saved or discarded yet.
    pub fn staged(&self) -> &Mapping {
        &self.staged
    }

    /// Current state of the store.
    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// `true` when staged changes exist.
    pub fn is_dirty(&self) -> bool {
        self.state == OverlayState::Dirty
    }

    /// `true` when a merged mapping is materialised and will be served by
    /// the next [`view`](Self::view) without recomputation.
    pub fn has_cached_view(&self) -> bool {
        self.merged.get().is_some()
    }

    fn invalidate(&mut self) {
        self.merged.take();
    }
}

/// `persisted ⊕ staged`: staged wins, persisted order first, new keys last.
fn merge(persisted: &Mapping, staged: &Mapping) -> Mapping {
    let mut merged = persisted.clone();
    for (key, value) in staged {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

// ── Tests ─────────────────────────────────────────────────────────────────────
