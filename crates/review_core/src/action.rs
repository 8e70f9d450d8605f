use std::time::Duration;

use crate::ReviewError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowAction {
    Approve,
    RequestRevision { feedback: String },
}

impl WorkflowAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            WorkflowAction::Approve => ActionKind::Approve,
            WorkflowAction::RequestRevision { .. } => ActionKind::RequestRevision,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Approve,
    RequestRevision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded { message: String },
    Failed { error: ReviewError },
}

/// How long to wait for backend regeneration after a revision request.
///
/// With `max_polls == 0` the client waits `grace` once. Otherwise, while the
/// post-wait status refresh still reports `revision_requested`, it waits again
/// with a doubled delay and re-fetches, at most `max_polls` more times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegenerationPolicy {
    pub grace: Duration,
    pub max_polls: u32,
}

impl Default for RegenerationPolicy {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(5),
            max_polls: 0,
        }
    }
}

impl RegenerationPolicy {
    pub fn delay_for_round(&self, round: u32) -> Duration {
        let factor = 1u32.checked_shl(round).unwrap_or(u32::MAX);
        self.grace.saturating_mul(factor)
    }
}

/// One pass of the wait / re-fetch cycle that follows a revision request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegenerationCycle {
    pub id: u64,
    pub round: u32,
    /// Set once the timer fired and the re-fetch was issued; cleared when the
    /// cycle schedules another round.
    pub refetched: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionState {
    pub in_flight: Option<ActionKind>,
    pub outcome: Option<ActionOutcome>,
    pub cycle: Option<RegenerationCycle>,
    next_cycle_id: u64,
}

impl ActionState {
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub(crate) fn start_cycle(&mut self) -> RegenerationCycle {
        self.next_cycle_id += 1;
        let cycle = RegenerationCycle {
            id: self.next_cycle_id,
            round: 0,
            refetched: false,
        };
        self.cycle = Some(cycle);
        cycle
    }
}
