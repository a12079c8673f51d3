//! Per-action state machine for export and deploy.
//!
//! Every trigger starts a fresh [`ActionTracker`] at [`Stage::Idle`]; nothing
//! is resumable and no tracker is shared between actions.

use std::fmt;

/// How a finished artifact leaves the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Written locally for the user to keep.
    Download,
    /// Submitted to the remote deploy endpoint.
    Transmit,
}

/// A step in the life of one export/deploy action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Snapshotting,
    Formatting,
    Extracting,
    Inlining,
    Assembling,
    Delivering(Delivery),
    Done,
    Failed,
}

impl Stage {
    /// Returns true once the action can make no further progress.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    /// Returns true if `next` may directly follow `self`.
    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;

        if next == Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Idle, Snapshotting)
                | (Snapshotting, Formatting | Extracting | Inlining)
                | (Extracting, Formatting | Assembling)
                | (Inlining, Formatting | Assembling)
                | (Formatting, Assembling | Delivering(Delivery::Download))
                | (Assembling, Delivering(_))
                | (Delivering(_), Done)
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Snapshotting => "snapshotting",
            Stage::Formatting => "formatting",
            Stage::Extracting => "extracting",
            Stage::Inlining => "inlining",
            Stage::Assembling => "assembling",
            Stage::Delivering(Delivery::Download) => "delivering(download)",
            Stage::Delivering(Delivery::Transmit) => "delivering(transmit)",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Error returned when a tracker is asked to skip or reverse a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllegalTransition {
    pub from: Stage,
    pub to: Stage,
}

impl fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal stage transition {} -> {}", self.from, self.to)
    }
}

impl std::error::Error for IllegalTransition {}

/// Records the path of a single action through [`Stage`]s.
#[derive(Debug)]
pub struct ActionTracker {
    action: &'static str,
    history: Vec<Stage>,
}

impl ActionTracker {
    /// Starts a new action in [`Stage::Idle`].
    pub fn start(action: &'static str) -> Self {
        Self {
            action,
            history: vec![Stage::Idle],
        }
    }

    pub fn action(&self) -> &'static str {
        self.action
    }

    /// The stage the action is currently in.
    pub fn stage(&self) -> Stage {
        // history is never empty: start() seeds it with Idle
        self.history.last().copied().unwrap_or(Stage::Idle)
    }

    /// Every stage visited so far, starting with `Idle`.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Moves to `next` if the transition is legal.
    pub fn advance(&mut self, next: Stage) -> Result<(), IllegalTransition> {
        let from = self.stage();
        if !from.can_advance_to(next) {
            return Err(IllegalTransition { from, to: next });
        }
        tracing::debug!(action = self.action, %from, to = %next, "stage transition");
        self.history.push(next);
        Ok(())
    }

    /// Marks the action failed. No-op if it already ended.
    pub fn fail(&mut self, reason: &str) {
        if self.stage().is_terminal() {
            return;
        }
        tracing::warn!(action = self.action, stage = %self.stage(), reason, "action failed");
        self.history.push(Stage::Failed);
    }
}
