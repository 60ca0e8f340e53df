// Asset API wire types
//
// Models for the JSON bodies returned by `/api/*`. Field names follow the
// server's camelCase. Optional fields use `#[serde(default)]` because older
// records routinely omit them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a user record.
pub type UserId = i64;
/// Identifier of a device record.
pub type DeviceId = i64;
/// Identifier of a category record.
pub type CategoryId = i64;
/// Identifier of a notification record.
pub type NotificationId = i64;

// ── User ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn default_true() -> bool {
    true
}

// ── Device ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DeviceId,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub asset_tag: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub purchase_date: Option<DateTime<Utc>>,
    /// Decimal columns arrive as strings from some deployments.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub purchase_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub warranty_expiry: Option<DateTime<Utc>>,
}

impl Device {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

// ── Category ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ── Notification ─────────────────────────────────────────────────────

/// What triggered a notification.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
    WarrantyExpiry,
    MaintenanceDue,
    LicenseExpiry,
    DeviceAssigned,
    ProblemReport,
    /// A type this client does not know yet.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub link: Option<String>,
}

// ── Lenient field decoders ───────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Accept RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
