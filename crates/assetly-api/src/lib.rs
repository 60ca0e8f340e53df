// assetly-api: Async Rust client for the assetly asset management REST API

pub mod client;
pub mod error;
pub mod inventory;
pub mod models;
pub mod notifications;
pub mod transport;

pub use client::AssetClient;
pub use error::Error;
pub use models::{
    Category, CategoryId, Device, DeviceId, Notification, NotificationId, NotificationType, User,
    UserId,
};
pub use transport::{TlsMode, TransportConfig};
