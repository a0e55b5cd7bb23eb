/// Smallest item list a session will accept. One item is already "ranked"
/// and there is no pair to present.
pub const MIN_ITEMS: usize = 2;
