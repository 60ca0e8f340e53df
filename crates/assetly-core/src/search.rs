// ── Unified search ──
//
// Merges users, devices, and categories into one grouped result set for the
// command palette. Order is fixed: users, then devices, then categories,
// each group in source order. No ranking, no fuzzy matching.

use assetly_api::{Category, Device, User};
use serde::Serialize;
use tracing::{debug, warn};

use crate::fetch::EntityFetcher;
use crate::route::Route;

const NO_DEPARTMENT: &str = "No department";
const NO_DESCRIPTION: &str = "No description";

/// Kind of a searchable entity, in group display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Device,
    Category,
}

impl EntityKind {
    /// Group header.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "Users",
            Self::Device => "Devices",
            Self::Category => "Categories",
        }
    }
}

/// Display fields shared by every searchable entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
}

/// One row of the command palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchableEntity {
    User(EntitySummary),
    Device(EntitySummary),
    Category(EntitySummary),
}

impl SearchableEntity {
    pub fn from_user(user: &User) -> Self {
        Self::User(EntitySummary {
            id: user.id,
            title: user.full_name(),
            subtitle: non_empty_or(user.department.as_deref(), NO_DEPARTMENT),
        })
    }

    pub fn from_device(device: &Device) -> Self {
        Self::Device(EntitySummary {
            id: device.id,
            title: device.display_name(),
            subtitle: device.asset_tag.clone(),
        })
    }

    pub fn from_category(category: &Category) -> Self {
        Self::Category(EntitySummary {
            id: category.id,
            title: category.name.clone(),
            subtitle: non_empty_or(category.description.as_deref(), NO_DESCRIPTION),
        })
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::User(_) => EntityKind::User,
            Self::Device(_) => EntityKind::Device,
            Self::Category(_) => EntityKind::Category,
        }
    }

    pub fn summary(&self) -> &EntitySummary {
        match self {
            Self::User(s) | Self::Device(s) | Self::Category(s) => s,
        }
    }

    pub fn id(&self) -> i64 {
        self.summary().id
    }

    pub fn title(&self) -> &str {
        &self.summary().title
    }

    pub fn subtitle(&self) -> &str {
        &self.summary().subtitle
    }

    /// Where selecting this entity navigates.
    pub fn target(&self) -> Route {
        match self {
            Self::User(s) => Route::Users(s.id),
            Self::Device(s) => Route::Devices(s.id),
            Self::Category(s) => Route::Categories(s.id),
        }
    }

    /// Case-insensitive substring match on title or subtitle.
    /// `needle` must already be lowercased.
    fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title().to_lowercase().contains(needle)
            || self.subtitle().to_lowercase().contains(needle)
    }
}

/// Missing and empty strings both fall back to the placeholder.
fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_owned(),
        _ => fallback.to_owned(),
    }
}

/// Hits of a single kind. Never empty when part of [`SearchResults`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchGroup {
    pub kind: EntityKind,
    pub entities: Vec<SearchableEntity>,
}

/// Grouped, filtered search output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub groups: Vec<SearchGroup>,
}

impl SearchResults {
    /// Total hits across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.entities.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Hits in display order.
    pub fn iter(&self) -> impl Iterator<Item = &SearchableEntity> {
        self.groups.iter().flat_map(|g| g.entities.iter())
    }

    pub fn into_entities(self) -> Vec<SearchableEntity> {
        self.groups.into_iter().flat_map(|g| g.entities).collect()
    }

    pub fn group(&self, kind: EntityKind) -> Option<&SearchGroup> {
        self.groups.iter().find(|g| g.kind == kind)
    }
}

/// Build the grouped result set for `query`.
///
/// An empty query returns every entity. Groups with no hits are omitted so
/// callers never render an empty header.
pub fn aggregate(
    users: &[User],
    devices: &[Device],
    categories: &[Category],
    query: &str,
) -> SearchResults {
    let needle = query.to_lowercase();

    let groups = [
        (
            EntityKind::User,
            users.iter().map(SearchableEntity::from_user).collect::<Vec<_>>(),
        ),
        (
            EntityKind::Device,
            devices.iter().map(SearchableEntity::from_device).collect(),
        ),
        (
            EntityKind::Category,
            categories
                .iter()
                .map(SearchableEntity::from_category)
                .collect(),
        ),
    ]
    .into_iter()
    .filter_map(|(kind, entities)| {
        let entities: Vec<_> = entities.into_iter().filter(|e| e.matches(&needle)).collect();
        (!entities.is_empty()).then_some(SearchGroup { kind, entities })
    })
    .collect();

    SearchResults { groups }
}

// ── SearchSession ────────────────────────────────────────────────────

/// The three collections behind a search surface.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub users: Vec<User>,
    pub devices: Vec<Device>,
    pub categories: Vec<Category>,
}

/// A search surface that only holds data while it is open.
///
/// Collections are fetched on [`open`](Self::open) and released on
/// [`close`](Self::close). A collection that fails to load is treated as
/// empty, so a broken endpoint shrinks the results instead of failing them.
pub struct SearchSession<F> {
    fetcher: F,
    catalog: Option<Catalog>,
}

impl<F: EntityFetcher> SearchSession<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            catalog: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.catalog.is_some()
    }

    /// Load the collections if not already loaded.
    pub async fn open(&mut self) {
        if self.catalog.is_some() {
            return;
        }

        let (users, devices, categories) = tokio::join!(
            self.fetcher.users(),
            self.fetcher.devices(),
            self.fetcher.categories()
        );

        let catalog = Catalog {
            users: or_empty("users", users),
            devices: or_empty("devices", devices),
            categories: or_empty("categories", categories),
        };
        debug!(
            users = catalog.users.len(),
            devices = catalog.devices.len(),
            categories = catalog.categories.len(),
            "search catalog loaded"
        );
        self.catalog = Some(catalog);
    }

    /// Drop the loaded collections.
    pub fn close(&mut self) {
        self.catalog = None;
    }

    /// Search the loaded collections. Returns nothing while closed.
    pub fn search(&self, query: &str) -> SearchResults {
        self.catalog.as_ref().map_or_else(SearchResults::default, |c| {
            aggregate(&c.users, &c.devices, &c.categories, query)
        })
    }
}

fn or_empty<T>(what: &str, result: Result<Vec<T>, crate::error::CoreError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(error = %e, collection = what, "search fetch failed, treating as empty");
        Vec::new()
    })
}
