// ── Notifications ──
//
// Unread-count polling with a one-shot audible alert on increase.

pub mod poller;
pub mod tone;
pub mod tracker;

pub use poller::{
    NotificationPoller, NotificationSnapshot, PollHandle, PollerState, RECENT_LIMIT, newest_first,
};
pub use tone::{Chime, ChimeError, SilentChime, Tone};
pub use tracker::UnreadTracker;
