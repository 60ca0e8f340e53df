// Notification endpoints
//
// Per-user listings plus the two mutations a user can apply: mark read and
// delete. Mutations carry no response body contract; only the status counts.

use tracing::debug;

use crate::client::AssetClient;
use crate::error::Error;
use crate::models::{Notification, NotificationId, UserId};

impl AssetClient {
    /// All notifications for a user, read and unread.
    ///
    /// `GET /api/users/{id}/notifications`
    pub async fn list_notifications(&self, user_id: UserId) -> Result<Vec<Notification>, Error> {
        debug!(user_id, "listing notifications");
        self.get(self.api_url(&format!("users/{user_id}/notifications"))?)
            .await
    }

    /// Unread notifications for a user.
    ///
    /// `GET /api/users/{id}/notifications/unread`
    pub async fn list_unread_notifications(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Notification>, Error> {
        debug!(user_id, "listing unread notifications");
        self.get(self.api_url(&format!("users/{user_id}/notifications/unread"))?)
            .await
    }

    /// Mark one notification as read.
    ///
    /// `PUT /api/notifications/{id}/read`
    pub async fn mark_notification_read(&self, id: NotificationId) -> Result<(), Error> {
        debug!(id, "marking notification read");
        self.put_empty(self.api_url(&format!("notifications/{id}/read"))?)
            .await
    }

    /// Delete one notification.
    ///
    /// `DELETE /api/notifications/{id}`
    pub async fn delete_notification(&self, id: NotificationId) -> Result<(), Error> {
        debug!(id, "deleting notification");
        self.delete(self.api_url(&format!("notifications/{id}"))?)
            .await
    }
}
