// ── Generic table controller ──
//
// Client-side filter + single-key sort over any row type. Columns expose
// their cells through typed accessors, so matching and ordering depend on
// the cell's `CellValue` variant rather than on the row's shape.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Rendered in place of a missing value.
pub const PLACEHOLDER: &str = "-";

// ── CellValue ────────────────────────────────────────────────────────

/// Runtime value of one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(DateTime<Utc>),
    Empty,
}

impl CellValue {
    /// Whether a lowercased query hits this cell. Only text and numbers
    /// take part in search.
    fn matches(&self, needle: &str) -> bool {
        match self {
            Self::Text(s) => s.to_lowercase().contains(needle),
            Self::Number(n) => n.to_string().contains(needle),
            Self::Bool(_) | Self::Date(_) | Self::Empty => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Empty => f.write_str(PLACEHOLDER),
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellValue {
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(d: DateTime<Utc>) -> Self {
        Self::Date(d)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Empty, Into::into)
    }
}

/// Ordering between two cells.
///
/// Same-typed text, numbers, and dates compare naturally; every other
/// pairing is equal, which leaves those rows in their original order.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Text(x), CellValue::Text(y)) => collate(x, y),
        (CellValue::Number(x), CellValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (CellValue::Date(x), CellValue::Date(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Case-insensitive primary comparison. Strings equal up to case put
/// lowercase first, as locale collation does.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

// ── Columns & sort state ─────────────────────────────────────────────

type Accessor<T> = Box<dyn Fn(&T) -> CellValue + Send + Sync>;

/// A table column: header, cell accessor, and whether it can be sorted.
pub struct Column<T> {
    header: String,
    accessor: Accessor<T>,
    sortable: bool,
}

impl<T> Column<T> {
    pub fn new(
        header: impl Into<String>,
        accessor: impl Fn(&T) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            header: header.into(),
            accessor: Box::new(accessor),
            sortable: false,
        }
    }

    /// Allow sorting by this column.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn value(&self, row: &T) -> CellValue {
        (self.accessor)(row)
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Active sort. `direction` only means something while `key` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    /// Index of the sorted column.
    pub key: Option<usize>,
    pub direction: SortDirection,
}

// ── TableController ──────────────────────────────────────────────────

/// Filtered and sorted view over a row collection.
pub struct TableController<T> {
    columns: Vec<Column<T>>,
    rows: Vec<T>,
    query: String,
    sort: SortState,
}

impl<T> TableController<T> {
    pub fn new(columns: Vec<Column<T>>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            query: String::new(),
            sort: SortState::default(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<T>) -> Self {
        self.rows = rows;
        self
    }

    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(Column::header).collect()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    /// Select a column for sorting, as a header click would.
    ///
    /// The same column toggles direction; a different column starts
    /// ascending. Returns `false` for unknown or unsortable columns.
    pub fn sort_by(&mut self, index: usize) -> bool {
        if !self.columns.get(index).is_some_and(Column::is_sortable) {
            return false;
        }
        self.sort = if self.sort.key == Some(index) {
            SortState {
                key: Some(index),
                direction: self.sort.direction.toggled(),
            }
        } else {
            SortState {
                key: Some(index),
                direction: SortDirection::Ascending,
            }
        };
        true
    }

    /// [`sort_by`](Self::sort_by) addressed by header, case-insensitively.
    pub fn sort_by_header(&mut self, header: &str) -> bool {
        self.column_index(header)
            .is_some_and(|index| self.sort_by(index))
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.header.eq_ignore_ascii_case(header))
    }

    fn row_matches(&self, row: &T, needle: &str) -> bool {
        needle.is_empty() || self.columns.iter().any(|c| c.value(row).matches(needle))
    }

    /// Rows passing the query, in sort order.
    pub fn view(&self) -> Vec<&T> {
        let needle = self.query.to_lowercase();
        let mut rows: Vec<&T> = self
            .rows
            .iter()
            .filter(|row| self.row_matches(row, &needle))
            .collect();

        if let Some(column) = self.sort.key.and_then(|k| self.columns.get(k)) {
            let direction = self.sort.direction;
            // `sort_by` is stable: rows comparing equal keep their order.
            rows.sort_by(|a, b| {
                let ord = compare_cells(&column.value(a), &column.value(b));
                match direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }
        rows
    }

    /// The row at a position of the current view (row-click resolution).
    pub fn row_at(&self, view_index: usize) -> Option<&T> {
        self.view().get(view_index).copied()
    }

    /// The current view rendered to strings, placeholders for empty cells.
    pub fn render(&self) -> Vec<Vec<String>> {
        self.view()
            .into_iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| c.value(row).to_string())
                    .collect()
            })
            .collect()
    }
}

impl<T: DeserializeOwned> TableController<T> {
    /// Replace rows from an untyped JSON payload.
    pub fn set_rows_from_value(&mut self, value: serde_json::Value) {
        self.rows = rows_from_value(value);
    }
}

/// Decode rows from a JSON value.
///
/// Anything other than an array yields no rows; array elements that do not
/// decode are skipped.
pub fn rows_from_value<T: DeserializeOwned>(value: serde_json::Value) -> Vec<T> {
    let serde_json::Value::Array(items) = value else {
        debug!("table input is not an array, showing no rows");
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(row) => Some(row),
            Err(e) => {
                debug!(error = %e, "skipping undecodable table row");
                None
            }
        })
        .collect()
}
