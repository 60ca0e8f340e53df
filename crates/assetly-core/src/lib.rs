// assetly-core: Search, notification polling, and table logic between
// assetly-api and consumers (CLI).

pub mod config;
pub mod error;
pub mod fetch;
pub mod notify;
pub mod route;
pub mod search;
pub mod service;
pub mod table;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, DEFAULT_POLL_INTERVAL, TlsVerification};
pub use error::CoreError;
pub use fetch::{EntityFetcher, NotificationSource};
pub use notify::{
    Chime, ChimeError, NotificationPoller, NotificationSnapshot, PollHandle, PollerState,
    SilentChime, Tone, UnreadTracker,
};
pub use route::Route;
pub use search::{EntityKind, SearchResults, SearchSession, SearchableEntity};
pub use service::AssetService;
pub use table::{CellValue, Column, SortDirection, SortState, TableController};

// Wire types consumers need alongside the service.
pub use assetly_api::{
    Category, CategoryId, Device, DeviceId, Notification, NotificationId, NotificationType, User,
    UserId,
};
