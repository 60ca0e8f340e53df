// ── Navigation targets ──
//
// Where a search hit or notification leads in the web front end. Kept as a
// closed enum so every caller renders paths the same way.

use std::fmt;

use assetly_api::{CategoryId, DeviceId, UserId};
use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Route {
    Users(UserId),
    Devices(DeviceId),
    Categories(CategoryId),
    Notifications,
}

impl Route {
    /// Front-end path, e.g. `/devices/12`.
    pub fn path(&self) -> String {
        match self {
            Self::Users(id) => format!("/users/{id}"),
            Self::Devices(id) => format!("/devices/{id}"),
            Self::Categories(id) => format!("/categories/{id}"),
            Self::Notifications => "/notifications".into(),
        }
    }

    /// Absolute URL under the server root.
    pub fn url(&self, base: &Url) -> String {
        format!("{}{}", base.as_str().trim_end_matches('/'), self.path())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
