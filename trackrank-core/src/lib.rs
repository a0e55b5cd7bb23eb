/// trackrank-core: Comparison-driven merge sort engine.
///
/// Rank a list by asking a person "which of these two?" over and over. Each
/// answer drives one step of a bottom-up merge sort, so a full ordering falls
/// out after O(n log n) questions. No IO, no terminal, no rendering: the
/// caller shows the pair and reports the pick.
///
/// Items are whatever the caller passes in. Internally they are addressed by
/// position, so equal display strings never get confused.
///
/// # Quick start
///
/// ```rust
/// use trackrank_core::{RankingSession, Side, Turn};
///
/// let songs = vec!["Style", "Clean", "Blank Space"];
/// let mut session = RankingSession::new();
/// session.start(songs).unwrap();
///
/// loop {
///     let side = match session.turn() {
///         Turn::Compare { left, right } => {
///             // Ask the user here. This one prefers shorter titles, ties go left.
///             if left.len() <= right.len() { Side::Left } else { Side::Right }
///         }
///         Turn::Complete(order) => {
///             assert_eq!(order, vec![&"Style", &"Clean", &"Blank Space"]);
///             break;
///         }
///     };
///     session.choose(side).unwrap();
/// }
/// ```

pub mod constants;
pub mod error;
pub mod merger;
pub mod scheduler;
pub mod session;
pub mod types;

// Re-export primary public API at crate root.
pub use error::{RankError, Result};
pub use merger::MergeTask;
pub use scheduler::{max_decisions_for, singleton_runs, MergeScheduler, Step};
pub use session::RankingSession;
pub use types::{Decision, ItemId, Progress, Run, SessionState, Side, Turn};
