//! # Manager States
//!
//! Five-state lifecycle shared by every module. The machine only moves
//! forward: a failed manager stays failed, and nothing leaves `Destroyed`.
//!
//! ```text
//! Created ──> Initializing ──> Ready
//!                  │
//!                  └─────────> Failed
//!
//! any state ──> Destroyed (terminal)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerState {
    /// Constructed; no background work started.
    Created,
    /// Setup in flight.
    Initializing,
    /// Setup succeeded; guarded operations may run.
    Ready,
    /// Setup failed; the failure is settled and re-raised on demand.
    Failed,
    /// Torn down. Terminal.
    Destroyed,
}

impl ManagerState {
    /// Whether the machine may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: ManagerState) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Initializing)
                | (Self::Initializing, Self::Ready)
                | (Self::Initializing, Self::Failed)
                | (Self::Created, Self::Destroyed)
                | (Self::Initializing, Self::Destroyed)
                | (Self::Ready, Self::Destroyed)
                | (Self::Failed, Self::Destroyed)
        )
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Destroyed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
