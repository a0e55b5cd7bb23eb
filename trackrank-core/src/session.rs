/// Request/response ranking session.
///
/// Wraps the scheduler behind the contract a UI needs: "compare these two",
/// "the user picked this side", "here is the final order". Items are owned by
/// the session and addressed by position, so duplicate titles never collide.
///
/// Each session owns all of its state. Starting again (`start()` or `reset()`)
/// discards everything from the previous run.
use tracing::{debug, warn};

use crate::constants::MIN_ITEMS;
use crate::error::{RankError, Result};
use crate::scheduler::{max_decisions_for, singleton_runs, MergeScheduler, Step};
use crate::types::{Decision, ItemId, Progress, SessionState, Side, Turn};

#[derive(Debug, Clone)]
pub struct RankingSession<T> {
    items: Vec<T>,
    scheduler: Option<MergeScheduler>,
    history: Vec<Decision>,
    max_decisions: usize,
}

impl<T> Default for RankingSession<T> {
    fn default() -> Self {
        RankingSession {
            items: Vec::new(),
            scheduler: None,
            history: Vec::new(),
            max_decisions: 0,
        }
    }
}

impl<T> RankingSession<T> {
    /// A new session in the `Idle` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin ranking `items`, most preferred will end up first.
    ///
    /// Fewer than two items fails with `InsufficientItems` and leaves the
    /// session `Idle`. Any previous session state is discarded.
    pub fn start(&mut self, items: Vec<T>) -> Result<Turn<'_, T>> {
        self.reset();
        if items.len() < MIN_ITEMS {
            warn!(got = items.len(), "Not enough items to rank");
            return Err(RankError::InsufficientItems { got: items.len() });
        }

        debug!(items = items.len(), "Starting ranking session");
        self.max_decisions = max_decisions_for(items.len());
        self.scheduler = Some(MergeScheduler::new(singleton_runs(items.len())));
        self.items = items;
        Ok(self.turn())
    }

    /// Create a session and replay a recorded decision sequence into it.
    ///
    /// Replaying the same items and sides always reaches the same state.
    pub fn replay(items: Vec<T>, sides: &[Side]) -> Result<Self> {
        let mut session = Self::new();
        session.start(items)?;
        for &side in sides {
            session.choose(side)?;
        }
        Ok(session)
    }

    /// Discard all state and return to `Idle`.
    pub fn reset(&mut self) {
        self.items.clear();
        self.scheduler = None;
        self.history.clear();
        self.max_decisions = 0;
    }

    pub fn state(&self) -> SessionState {
        match &self.scheduler {
            None => SessionState::Idle,
            Some(s) if s.is_complete() => SessionState::Complete,
            Some(_) => SessionState::AwaitingChoice,
        }
    }

    /// The pending comparison or, once finished, the final order.
    ///
    /// An `Idle` session has nothing to show and reports an empty completion.
    pub fn turn(&self) -> Turn<'_, T> {
        match self.current_pair() {
            Some((left, right)) => Turn::Compare {
                left: &self.items[left],
                right: &self.items[right],
            },
            None => Turn::Complete(self.final_order().unwrap_or_default()),
        }
    }

    /// Positions (in the original list) of the two candidates awaiting a decision.
    pub fn current_pair(&self) -> Option<(ItemId, ItemId)> {
        self.scheduler.as_ref().and_then(MergeScheduler::current_pair)
    }

    /// Record the user's pick for the current comparison and move on.
    ///
    /// Rejected decisions never change the ranking.
    pub fn choose(&mut self, side: Side) -> Result<Turn<'_, T>> {
        // A pending pair exists exactly when the session is AwaitingChoice.
        let state = self.state();
        let ((left, right), scheduler) = match (self.current_pair(), self.scheduler.as_mut()) {
            (Some(pair), Some(s)) => (pair, s),
            _ => {
                warn!(%state, %side, "Decision rejected");
                return Err(RankError::IllegalStateTransition { state });
            }
        };

        let step = scheduler.decide(side).map_err(|e| {
            warn!(error = %e, "Decision rejected");
            e
        })?;
        self.history.push(Decision { left, right, side });

        if step == Step::Complete {
            debug!(decisions = self.history.len(), "Ranking session complete");
        }
        Ok(self.turn())
    }

    /// Items in final order. `None` until the session is `Complete`.
    pub fn final_order(&self) -> Option<Vec<&T>> {
        let run = self.scheduler.as_ref()?.final_run()?;
        Some(run.iter().map(|&id| &self.items[id]).collect())
    }

    /// Final order as positions into the original list.
    pub fn final_positions(&self) -> Option<&[ItemId]> {
        self.scheduler.as_ref()?.final_run()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Every decision made so far, in order.
    pub fn history(&self) -> &[Decision] {
        &self.history
    }

    /// Just the sides of `history()`, suitable for `replay()`.
    pub fn sides(&self) -> Vec<Side> {
        self.history.iter().map(|d| d.side).collect()
    }

    pub fn decisions_made(&self) -> usize {
        self.history.len()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            decisions_made: self.history.len(),
            max_decisions: self.max_decisions,
            pass: self.scheduler.as_ref().map_or(0, MergeScheduler::pass_number),
        }
    }
}

impl<T: Clone> RankingSession<T> {
    /// Owned copy of the final order. `None` until the session is `Complete`.
    pub fn into_final_order(self) -> Option<Vec<T>> {
        let run = self.scheduler?.final_run()?.to_vec();
        Some(run.into_iter().map(|id| self.items[id].clone()).collect())
    }
}
