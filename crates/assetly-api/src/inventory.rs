// Inventory endpoints
//
// Read-only listings of the three searchable entity kinds. The server
// returns bare JSON arrays; no envelope, no pagination.

use tracing::debug;

use crate::client::AssetClient;
use crate::error::Error;
use crate::models::{Category, Device, User};

impl AssetClient {
    /// List every user.
    ///
    /// `GET /api/users`
    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        debug!("listing users");
        self.get(self.api_url("users")?).await
    }

    /// List every device.
    ///
    /// `GET /api/devices`
    pub async fn list_devices(&self) -> Result<Vec<Device>, Error> {
        debug!("listing devices");
        self.get(self.api_url("devices")?).await
    }

    /// List every category.
    ///
    /// `GET /api/categories`
    pub async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        debug!("listing categories");
        self.get(self.api_url("categories")?).await
    }
}
