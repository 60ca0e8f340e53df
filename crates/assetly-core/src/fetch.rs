// ── Entity fetchers ──
//
// Seams between the domain logic and the HTTP client. The search session and
// the notification poller are generic over these traits; `AssetClient`
// implements both, tests substitute in-memory fakes.

use std::future::Future;

use assetly_api::{AssetClient, Category, Device, Notification, NotificationId, User, UserId};

use crate::error::CoreError;

/// Loads the three searchable collections.
pub trait EntityFetcher: Send + Sync {
    fn users(&self) -> impl Future<Output = Result<Vec<User>, CoreError>> + Send;
    fn devices(&self) -> impl Future<Output = Result<Vec<Device>, CoreError>> + Send;
    fn categories(&self) -> impl Future<Output = Result<Vec<Category>, CoreError>> + Send;
}

/// Reads and mutates one user's notifications.
pub trait NotificationSource: Send + Sync + 'static {
    fn notifications(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Notification>, CoreError>> + Send;

    fn unread_notifications(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Notification>, CoreError>> + Send;

    fn mark_read(&self, id: NotificationId)
    -> impl Future<Output = Result<(), CoreError>> + Send;

    fn delete(&self, id: NotificationId) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl EntityFetcher for AssetClient {
    async fn users(&self) -> Result<Vec<User>, CoreError> {
        Ok(self.list_users().await?)
    }

    async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        Ok(self.list_devices().await?)
    }

    async fn categories(&self) -> Result<Vec<Category>, CoreError> {
        Ok(self.list_categories().await?)
    }
}

impl NotificationSource for AssetClient {
    async fn notifications(&self, user_id: UserId) -> Result<Vec<Notification>, CoreError> {
        Ok(self.list_notifications(user_id).await?)
    }

    async fn unread_notifications(&self, user_id: UserId) -> Result<Vec<Notification>, CoreError> {
        Ok(self.list_unread_notifications(user_id).await?)
    }

    async fn mark_read(&self, id: NotificationId) -> Result<(), CoreError> {
        Ok(self.mark_notification_read(id).await?)
    }

    async fn delete(&self, id: NotificationId) -> Result<(), CoreError> {
        Ok(self.delete_notification(id).await?)
    }
}
