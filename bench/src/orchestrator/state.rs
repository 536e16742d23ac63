use std::fmt::{Display, Formatter};

/// Lifecycle of one trial's processes. Only forward transitions are allowed, and every
/// non-terminal state may move straight to `Failed` or `TimedOut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrialState {
    Created,
    Launching,
    Warmup,
    Measuring,
    Draining,
    Completed,
    Failed,
    TimedOut,
}

impl TrialState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TrialState::Completed | TrialState::Failed | TrialState::TimedOut
        )
    }

    pub fn can_transition_to(&self, next: TrialState) -> bool {
        use TrialState::*;
        match (self, next) {
            (Created, Launching)
            | (Launching, Warmup)
            | (Warmup, Measuring)
            | (Measuring, Draining)
            | (Draining, Completed) => true,
            (current, Failed | TimedOut) => !current.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrialState::Created => "created",
            TrialState::Launching => "launching",
            TrialState::Warmup => "warmup",
            TrialState::Measuring => "measuring",
            TrialState::Draining => "draining",
            TrialState::Completed => "completed",
            TrialState::Failed => "failed",
            TrialState::TimedOut => "timed_out",
        }
    }
}

impl Display for TrialState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
