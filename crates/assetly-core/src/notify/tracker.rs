/// Decides when a change in the unread count deserves an alert.
///
/// The very first non-empty observation never alerts, so opening a session
/// with a backlog stays quiet. After that, any increase over the previous
/// count alerts exactly once. The previous count always follows the latest
/// observation, decreases included.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UnreadTracker {
    previous: usize,
}

impl UnreadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count recorded by the last observation.
    pub fn previous(&self) -> usize {
        self.previous
    }

    /// Record a fresh unread count. Returns `true` when an alert is due.
    pub fn observe(&mut self, count: usize) -> bool {
        let alert = self.previous != 0 && count > self.previous;
        self.previous = count;
        alert
    }
}
