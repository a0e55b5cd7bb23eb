use std::fmt;
use std::str::FromStr;

use crate::error::RankError;

/// Internal item identifier: the item's position in the list passed to
/// `RankingSession::start()`. Runs hold these, never display strings, so two
/// songs with the same title are still distinct items.
pub type ItemId = usize;

/// An ordered sequence of items, already fully sorted relative to each other.
pub type Run = Vec<ItemId>;

/// Which presented candidate the user preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Single-letter form used by replay strings ("LRRL").
    pub fn as_char(self) -> char {
        match self {
            Side::Left => 'L',
            Side::Right => 'R',
        }
    }

    /// Parse a compact replay string such as `"LRRL"`. Whitespace and commas are ignored.
    pub fn parse_sequence(s: &str) -> Result<Vec<Side>, RankError> {
        s.chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(|c| c.to_string().parse())
            .collect()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

impl FromStr for Side {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "left" | "1" => Ok(Side::Left),
            "r" | "right" | "2" => Ok(Side::Right),
            other => Err(RankError::InvalidDecision(format!(
                "\"{other}\" is not a side (expected left or right)"
            ))),
        }
    }
}

/// Lifecycle state of a ranking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionState {
    Idle,
    AwaitingChoice,
    Complete,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingChoice => "awaiting choice",
            SessionState::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// What the session wants from its caller next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn<'a, T> {
    /// Present these two candidates and report which one the user prefers.
    Compare { left: &'a T, right: &'a T },
    /// Ranking finished. Items in final order, most preferred first.
    Complete(Vec<&'a T>),
}

/// One answered comparison, kept in session history.
///
/// `left`/`right` are the candidates as presented; `side` is the user's pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    pub left: ItemId,
    pub right: ItemId,
    pub side: Side,
}

impl Decision {
    pub fn winner(&self) -> ItemId {
        match self.side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn loser(&self) -> ItemId {
        match self.side {
            Side::Left => self.right,
            Side::Right => self.left,
        }
    }
}

/// Progress through a session, measured in decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Progress {
    /// Decisions answered so far.
    pub decisions_made: usize,
    /// Worst-case total decisions for this input length.
    pub max_decisions: usize,
    /// Current merge pass, 1-based.
    pub pass: usize,
}

impl Progress {
    /// Fraction of the worst case already answered, in 0.0..=1.0.
    pub fn fraction(&self) -> f64 {
        if self.max_decisions == 0 {
            return 1.0;
        }
        (self.decisions_made as f64 / self.max_decisions as f64).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_from_str_accepts_aliases() {
        assert_eq!("l".parse::<Side>().unwrap(), Side::Left);
        assert_eq!(" LEFT ".parse::<Side>().unwrap(), Side::Left);
        assert_eq!("1".parse::<Side>().unwrap(), Side::Left);
        assert_eq!("R".parse::<Side>().unwrap(), Side::Right);
        assert_eq!("right".parse::<Side>().unwrap(), Side::Right);
        assert_eq!("2".parse::<Side>().unwrap(), Side::Right);
    }

    #[test]
    fn test_side_from_str_rejects_garbage() {
        let err = "middle".parse::<Side>().unwrap_err();
        assert!(matches!(err, RankError::InvalidDecision(_)));
    }

    #[test]
    fn test_parse_sequence() {
        let sides = Side::parse_sequence("LR, rl").unwrap();
        assert_eq!(sides, vec![Side::Left, Side::Right, Side::Right, Side::Left]);
        assert!(Side::parse_sequence("LX").is_err());
    }

    #[test]
    fn test_decision_winner_and_loser() {
        let d = Decision { left: 3, right: 7, side: Side::Right };
        assert_eq!(d.winner(), 7);
        assert_eq!(d.loser(), 3);
    }

    #[test]
    fn test_progress_fraction() {
        let p = Progress { decisions_made: 3, max_decisions: 12, pass: 1 };
        assert!((p.fraction() - 0.25).abs() < 1e-10);
        let done = Progress { decisions_made: 0, max_decisions: 0, pass: 1 };
        assert_eq!(done.fraction(), 1.0);
    }
}
