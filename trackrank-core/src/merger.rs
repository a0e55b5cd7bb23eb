/// Two-run merge driven by external decisions.
///
/// A `MergeTask` never compares items itself. It exposes the head of each
/// input run, and the caller says which head goes next. As soon as one input
/// runs dry the other is flushed into the output, so a decision is only ever
/// requested while both sides have a candidate.
use std::collections::VecDeque;

use crate::error::{RankError, Result};
use crate::types::{ItemId, Run, Side};

#[derive(Debug, Clone)]
pub struct MergeTask {
    left: VecDeque<ItemId>,
    right: VecDeque<ItemId>,
    merged: Run,
    decisions_applied: usize,
}

impl MergeTask {
    /// Start merging `left` with `right`.
    ///
    /// If either input is empty the task completes here with zero decisions.
    pub fn new(left: Run, right: Run) -> Self {
        let mut task = MergeTask {
            merged: Vec::with_capacity(left.len() + right.len()),
            left: left.into(),
            right: right.into(),
            decisions_applied: 0,
        };
        task.flush_if_one_sided();
        task
    }

    /// First unconsumed item of each input, or `None` once the task is complete.
    pub fn peek_next(&self) -> Option<(ItemId, ItemId)> {
        match (self.left.front(), self.right.front()) {
            (Some(&l), Some(&r)) => Some((l, r)),
            _ => None,
        }
    }

    /// Move the head of the chosen side to the end of the output.
    ///
    /// Choosing a side with no candidate is rejected without touching state.
    pub fn apply_decision(&mut self, side: Side) -> Result<()> {
        let source = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        let head = source.pop_front().ok_or_else(|| {
            RankError::InvalidDecision(format!("no candidate on the {side} side"))
        })?;
        self.merged.push(head);
        self.decisions_applied += 1;
        self.flush_if_one_sided();
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    pub fn decisions_applied(&self) -> usize {
        self.decisions_applied
    }

    /// Items emitted so far, in merged order.
    pub fn merged(&self) -> &[ItemId] {
        &self.merged
    }

    /// Total items this task will emit.
    pub fn len(&self) -> usize {
        self.merged.len() + self.left.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The merged run. `None` while decisions are still pending.
    pub fn into_run(self) -> Option<Run> {
        if self.is_complete() {
            Some(self.merged)
        } else {
            None
        }
    }

    fn flush_if_one_sided(&mut self) {
        if self.left.is_empty() {
            self.merged.extend(self.right.drain(..));
        } else if self.right.is_empty() {
            self.merged.extend(self.left.drain(..));
        }
    }
}
