//! Shared helpers for command handlers.

use std::io::IsTerminal;

use assetly_core::TableController;

use crate::cli::TableArgs;
use crate::error::CliError;

/// Apply `--filter`, `--sort`, and `--desc` to a table controller.
pub fn apply_table_args<T>(table: &mut TableController<T>, args: &TableArgs) -> Result<(), CliError> {
    if let Some(ref filter) = args.filter {
        table.set_query(filter.as_str());
    }
    if let Some(ref header) = args.sort {
        if !table.sort_by_header(header) {
            let sortable: Vec<_> = table
                .columns()
                .iter()
                .filter(|c| c.is_sortable())
                .map(|c| c.header().to_lowercase())
                .collect();
            return Err(CliError::Validation {
                field: "sort".into(),
                reason: format!("unknown column '{header}'; sortable: {}", sortable.join(", ")),
            });
        }
        // A second selection of the same column flips the direction.
        if args.desc {
            table.sort_by_header(header);
        }
    }
    Ok(())
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Render an optional string, with a dash for missing values.
pub fn or_dash(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(assetly_core::table::PLACEHOLDER)
        .to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use assetly_core::{Column, SortDirection};

    use super::*;

    fn table() -> TableController<(String, i64)> {
        TableController::new(vec![
            Column::new("Name", |r: &(String, i64)| r.0.as_str().into()).sortable(),
            Column::new("Cost", |r: &(String, i64)| r.1.into()).sortable(),
        ])
    }

    #[test]
    fn desc_toggles_sort_direction() {
        let mut t = table();
        let args = TableArgs {
            filter: Some("x".into()),
            sort: Some("COST".into()),
            desc: true,
        };
        apply_table_args(&mut t, &args).unwrap();
        assert_eq!(t.sort_state().key, Some(1));
        assert_eq!(t.sort_state().direction, SortDirection::Descending);
        assert_eq!(t.query(), "x");
    }

    #[test]
    fn unknown_sort_column_lists_choices() {
        let mut t = table();
        let args = TableArgs {
            filter: None,
            sort: Some("owner".into()),
            desc: false,
        };
        let err = apply_table_args(&mut t, &args).unwrap_err();
        assert!(err.to_string().contains("owner"));
    }

    #[test]
    fn or_dash_handles_blank() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(Some("HQ")), "HQ");
    }
}
