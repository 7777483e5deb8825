//! Per-feature state machine and replay.
//!
//! A feature moves `Absent -> Live -> Deleted`. Every transition goes through
//! [`apply_event`], both when events arrive live and when history is
//! replayed, so reconstructed states are produced by the same code path as
//! the states that were originally observed.

mod snapshots;
mod transition;

pub use snapshots::SnapshotCache;
pub use transition::apply_event;

use crate::error::Result;
use crate::events::Event;
use crate::types::{FeatureSnapshot, FeatureStatus, Version};

/// Lifecycle state of one feature id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FeatureState {
    #[default]
    Absent,
    Live(FeatureSnapshot),
    /// Terminal. Holds the state as of the deletion event.
    Deleted(FeatureSnapshot),
}

impl FeatureState {
    pub fn snapshot(&self) -> Option<&FeatureSnapshot> {
        match self {
            FeatureState::Absent => None,
            FeatureState::Live(s) | FeatureState::Deleted(s) => Some(s),
        }
    }

    pub fn version(&self) -> Option<Version> {
        self.snapshot().map(|s| s.version)
    }

    pub fn status(&self) -> Option<FeatureStatus> {
        self.snapshot().map(|s| s.status)
    }

    pub(crate) fn from_snapshot(snapshot: FeatureSnapshot) -> Self {
        match snapshot.status {
            FeatureStatus::Live => FeatureState::Live(snapshot),
            FeatureStatus::Deleted => FeatureState::Deleted(snapshot),
        }
    }
}

/// Rebuild a feature's state at `target` from its accepted history.
///
/// `history[i]` must hold version `i + 1`. When `base` is given, replay
/// starts after the base snapshot's version instead of at the creation
/// event. Each intermediate state is handed to `keep` as replay passes it.
pub fn replay(
    history: &[Event],
    base: Option<FeatureSnapshot>,
    target: Version,
    mut keep: impl FnMut(&FeatureSnapshot),
) -> Result<FeatureState> {
    let start = base.as_ref().map(|s| s.version.0 as usize).unwrap_or(0);
    let mut state = base.map(FeatureState::from_snapshot).unwrap_or_default();

    let end = (target.0.max(0) as usize).min(history.len());
    for event in &history[start.min(end)..end] {
        state = apply_event(&state, event)?;
        if let Some(snapshot) = state.snapshot() {
            keep(snapshot);
        }
    }

    Ok(state)
}
