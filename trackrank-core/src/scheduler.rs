/// Merge-pass scheduling.
///
/// Two separate steps:
///   1. `singleton_runs()` decomposes the input into one run per item.
///   2. `MergeScheduler` repeatedly pairs runs FIFO within a pass, collects the
///      merged outputs for the next pass, and swaps passes until one run is left.
///
/// Pairing depends only on input order and the FIFO queue, so the same
/// decisions always produce the same match-ups.
use std::collections::VecDeque;

use tracing::debug;

use crate::error::{RankError, Result};
use crate::merger::MergeTask;
use crate::types::{ItemId, Run, Side};

/// Where the scheduler stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The active merge needs a decision between these two items.
    Compare(ItemId, ItemId),
    /// Everything is merged; see `MergeScheduler::final_run()`.
    Complete,
}

/// One singleton run per item, in input order.
pub fn singleton_runs(num_items: usize) -> Vec<Run> {
    (0..num_items).map(|id| vec![id]).collect()
}

#[derive(Debug, Clone)]
pub struct MergeScheduler {
    /// Runs waiting to be paired in the current pass.
    pending: VecDeque<Run>,
    /// Runs finished this pass, seeding the next one.
    next_pass: Vec<Run>,
    active: Option<MergeTask>,
    finished: Option<Run>,
    pass: usize,
    merges_completed: usize,
}

impl MergeScheduler {
    /// Build a scheduler over `runs` and advance to the first comparison.
    pub fn new(runs: Vec<Run>) -> Self {
        let mut scheduler = MergeScheduler {
            pending: runs.into(),
            next_pass: Vec::new(),
            active: None,
            finished: None,
            pass: 1,
            merges_completed: 0,
        };
        debug!(runs = scheduler.pending.len(), "Starting merge pass 1");
        scheduler.advance();
        scheduler
    }

    /// Run internal transitions until a decision is needed or one run remains.
    ///
    /// Idempotent: calling it again while a comparison is pending returns the
    /// same `Step::Compare`.
    pub fn advance(&mut self) -> Step {
        loop {
            if let Some(task) = self.active.take() {
                if let Some((left, right)) = task.peek_next() {
                    self.active = Some(task);
                    return Step::Compare(left, right);
                }
                // peek_next() is None only for a complete task.
                let decisions = task.decisions_applied();
                let run = task.into_run().unwrap_or_default();
                self.merges_completed += 1;
                debug!(pass = self.pass, len = run.len(), decisions, "Merge complete");
                self.next_pass.push(run);
                continue;
            }

            if self.finished.is_some() {
                return Step::Complete;
            }

            if self.pending.len() >= 2 {
                let left = self.pending.pop_front().unwrap_or_default();
                let right = self.pending.pop_front().unwrap_or_default();
                self.active = Some(MergeTask::new(left, right));
                continue;
            }

            if !self.next_pass.is_empty() {
                // An odd run skips this pass and rides along behind the merged ones.
                if let Some(straggler) = self.pending.pop_front() {
                    debug!(pass = self.pass, len = straggler.len(), "Carrying odd run forward");
                    self.next_pass.push(straggler);
                }
                self.pending = std::mem::take(&mut self.next_pass).into();
                self.pass += 1;
                debug!(runs = self.pending.len(), "Starting merge pass {}", self.pass);
                continue;
            }

            let run = self.pending.pop_front().unwrap_or_default();
            debug!(len = run.len(), passes = self.pass, merges = self.merges_completed, "Ranking complete");
            self.finished = Some(run);
            return Step::Complete;
        }
    }

    /// Feed a decision into the active merge, then advance.
    ///
    /// Errors leave the scheduler exactly as it was.
    pub fn decide(&mut self, side: Side) -> Result<Step> {
        let task = self.active.as_mut().ok_or_else(|| {
            RankError::InvalidDecision("no merge is awaiting a decision".to_string())
        })?;
        task.apply_decision(side)?;
        Ok(self.advance())
    }

    /// The pair currently awaiting a decision, if any.
    pub fn current_pair(&self) -> Option<(ItemId, ItemId)> {
        self.active.as_ref().and_then(MergeTask::peek_next)
    }

    pub fn active_task(&self) -> Option<&MergeTask> {
        self.active.as_ref()
    }

    /// The fully merged run once scheduling is complete.
    pub fn final_run(&self) -> Option<&[ItemId]> {
        self.finished.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.finished.is_some()
    }

    /// Current pass, 1-based.
    pub fn pass_number(&self) -> usize {
        self.pass
    }

    pub fn merges_completed(&self) -> usize {
        self.merges_completed
    }

    /// Runs still waiting in the current pass (excluding the active merge).
    pub fn pending_runs(&self) -> usize {
        self.pending.len()
    }

    /// Runs already finished in the current pass.
    pub fn next_pass_runs(&self) -> usize {
        self.next_pass.len()
    }
}

/// Worst-case number of decisions for `num_items` items under FIFO scheduling.
///
/// Replays the schedule on run lengths alone: merging runs of `a` and `b`
/// items costs at most `a + b - 1` decisions, and nothing if either is empty.
pub fn max_decisions_for(num_items: usize) -> usize {
    let mut pending: VecDeque<usize> = std::iter::repeat(1).take(num_items).collect();
    let mut next_pass: Vec<usize> = Vec::new();
    let mut total = 0;

    loop {
        while pending.len() >= 2 {
            let a = pending.pop_front().unwrap_or(0);
            let b = pending.pop_front().unwrap_or(0);
            if a > 0 && b > 0 {
                total += a + b - 1;
            }
            next_pass.push(a + b);
        }
        if next_pass.is_empty() {
            return total;
        }
        if let Some(straggler) = pending.pop_front() {
            next_pass.push(straggler);
        }
        pending = std::mem::take(&mut next_pass).into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collect every pair the scheduler presents while always picking `side`.
    fn drive(num_items: usize, side: Side) -> (Vec<(ItemId, ItemId)>, Run) {
        let mut scheduler = MergeScheduler::new(singleton_runs(num_items));
        let mut pairs = Vec::new();
        while let Some(pair) = scheduler.current_pair() {
            pairs.push(pair);
            scheduler.decide(side).unwrap();
        }
        (pairs, scheduler.final_run().unwrap().to_vec())
    }

    #[test]
    fn test_singleton_runs() {
        assert_eq!(singleton_runs(3), vec![vec![0], vec![1], vec![2]]);
        assert!(singleton_runs(0).is_empty());
    }

    #[test]
    fn test_first_pass_pairs_fifo() {
        let (pairs, _) = drive(4, Side::Left);
        assert_eq!(pairs[0], (0, 1));
        assert_eq!(pairs[1], (2, 3));
    }

    #[test]
    fn test_odd_run_carried_untouched() {
        let mut scheduler = MergeScheduler::new(singleton_runs(3));
        assert_eq!(scheduler.current_pair(), Some((0, 1)));
        assert_eq!(scheduler.pass_number(), 1);

        // (0,1) merges, 2 is carried into pass 2 behind the merged run.
        let step = scheduler.decide(Side::Right).unwrap();
        assert_eq!(step, Step::Compare(1, 2));
        assert_eq!(scheduler.pass_number(), 2);

        let step = scheduler.decide(Side::Left).unwrap();
        assert_eq!(step, Step::Compare(0, 2));
        let step = scheduler.decide(Side::Right).unwrap();
        assert_eq!(step, Step::Complete);
        assert_eq!(scheduler.final_run(), Some(&[1, 2, 0][..]));
        assert_eq!(scheduler.merges_completed(), 2);
    }

    #[test]
    fn test_always_left_keeps_input_order() {
        for n in 2..20 {
            let (_, order) = drive(n, Side::Left);
            assert_eq!(order, (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_always_right_is_a_permutation() {
        for n in 2..20 {
            let (pairs, order) = drive(n, Side::Right);
            let mut sorted = order.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..n).collect::<Vec<_>>());
            assert!(pairs.len() <= max_decisions_for(n));
        }
    }

    #[test]
    fn test_empty_runs_need_no_decisions() {
        let scheduler = MergeScheduler::new(vec![vec![], vec![0, 1], vec![2], vec![]]);
        // ([], [0,1]) and ([2], []) both complete on creation; pass 2 pairs [0,1] with [2].
        assert_eq!(scheduler.current_pair(), Some((0, 2)));
        assert_eq!(scheduler.pass_number(), 2);
        assert_eq!(scheduler.merges_completed(), 2);
    }

    #[test]
    fn test_single_run_is_already_complete() {
        let scheduler = MergeScheduler::new(vec![vec![4, 2]]);
        assert!(scheduler.is_complete());
        assert_eq!(scheduler.final_run(), Some(&[4, 2][..]));
        assert_eq!(scheduler.current_pair(), None);
    }

    #[test]
    fn test_decide_after_completion_is_rejected() {
        let mut scheduler = MergeScheduler::new(vec![vec![0]]);
        assert!(scheduler.decide(Side::Left).is_err());
        assert_eq!(scheduler.advance(), Step::Complete);
    }

    #[test]
    fn test_advance_is_idempotent_while_waiting() {
        let mut scheduler = MergeScheduler::new(singleton_runs(5));
        assert_eq!(scheduler.advance(), Step::Compare(0, 1));
        assert_eq!(scheduler.advance(), Step::Compare(0, 1));
        assert_eq!(scheduler.pending_runs(), 3);
        assert_eq!(scheduler.next_pass_runs(), 0);
    }

    #[test]
    fn test_max_decisions_small_inputs() {
        assert_eq!(max_decisions_for(0), 0);
        assert_eq!(max_decisions_for(1), 0);
        assert_eq!(max_decisions_for(2), 1);
        // (1+1-1) + (2+1-1)
        assert_eq!(max_decisions_for(3), 3);
        // 2 * 1 + (2+2-1)
        assert_eq!(max_decisions_for(4), 5);
    }

    #[test]
    fn test_max_decisions_within_n_log_n() {
        for n in 2..200usize {
            let ceil_log2 = usize::BITS as usize - (n - 1).leading_zeros() as usize;
            assert!(max_decisions_for(n) <= n * ceil_log2, "n = {n}");
        }
    }
}
