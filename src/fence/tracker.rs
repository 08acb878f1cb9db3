//! Hysteresis state machine over successive classifications.

use serde::Serialize;
use tracing::info;

use super::Classification;

/// Last definite position relative to a fence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FenceState {
    /// No definite classification seen yet
    #[default]
    Unknown,
    Inside,
    Outside,
}

/// A change of [`FenceState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: FenceState,
    pub to: FenceState,
}

impl Transition {
    /// Moved from outside to inside. The first definite state is not an entry.
    pub fn is_entry(&self) -> bool {
        self.from == FenceState::Outside && self.to == FenceState::Inside
    }

    /// Moved from inside to outside. The first definite state is not an exit.
    pub fn is_exit(&self) -> bool {
        self.from == FenceState::Inside && self.to == FenceState::Outside
    }
}

/// Tracks whether a moving point is inside a fence.
///
/// Only definite classifications move the state; `Uncertain` holds the
/// previous one, so noise around the boundary does not cause flapping.
#[derive(Debug, Clone, Default)]
pub struct FenceTracker {
    location_id: String,
    state: FenceState,
}

impl FenceTracker {
    pub fn new(location_id: impl Into<String>) -> Self {
        Self {
            location_id: location_id.into(),
            state: FenceState::Unknown,
        }
    }

    pub fn state(&self) -> FenceState {
        self.state
    }

    /// Feed one classification, returning the transition it caused, if any.
    pub fn update(&mut self, classification: Classification) -> Option<Transition> {
        let next = match classification {
            Classification::Inside => FenceState::Inside,
            Classification::Outside => FenceState::Outside,
            Classification::Uncertain => return None,
        };

        if next == self.state {
            return None;
        }

        let transition = Transition {
            from: self.state,
            to: next,
        };
        self.state = next;

        info!(
            "{}: {:?} -> {:?}",
            self.location_id, transition.from, transition.to
        );

        Some(transition)
    }
}
