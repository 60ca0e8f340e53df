//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Tables use `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::{Table, Tabled, settings::Style};

use assetly_core::TableController;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Section heading (search group labels).
pub fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().cyan().to_string()
    } else {
        text.to_owned()
    }
}

/// Attention marker for new or unread items.
pub fn highlight(text: &str, color: bool) -> String {
    if color {
        text.bold().yellow().to_string()
    } else {
        text.to_owned()
    }
}

pub fn dim(text: &str, color: bool) -> String {
    if color {
        text.dimmed().to_string()
    } else {
        text.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render the current view of a table controller in the chosen format.
///
/// - `table`: the controller's columns, filtered and sorted
/// - `json` / `yaml`: the visible rows, serialized from the source data
/// - `plain`: `id_fn` per visible row
pub fn render_view<T: Serialize>(
    format: &OutputFormat,
    table: &TableController<T>,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(table.headers());
            for row in table.render() {
                builder.push_record(row);
            }
            Ok(builder.build().with(Style::rounded()).to_string())
        }
        OutputFormat::Json => render_json(&table.view(), false),
        OutputFormat::JsonCompact => render_json(&table.view(), true),
        OutputFormat::Yaml => render_yaml(&table.view()),
        OutputFormat::Plain => Ok(table
            .view()
            .into_iter()
            .map(id_fn)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views are key/value
/// listings rather than tables.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Aligned `key: value` lines for detail views.
pub fn detail_lines(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| format!("{k:<width$}  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

pub fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    Ok(if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    })
}

pub fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}
