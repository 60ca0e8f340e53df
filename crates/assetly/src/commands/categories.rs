//! Category command handlers.

use assetly_core::{AssetService, Category, Column, CoreError, Route, TableController};

use crate::cli::{CategoriesArgs, CategoriesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

fn columns() -> Vec<Column<Category>> {
    vec![
        Column::new("ID", |c: &Category| c.id.into()).sortable(),
        Column::new("Name", |c: &Category| c.name.as_str().into()).sortable(),
        Column::new("Description", |c: &Category| c.description.as_deref().into()),
    ]
}

pub async fn handle(
    service: &AssetService,
    args: CategoriesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CategoriesCommand::List(table_args) => {
            let mut table =
                TableController::new(columns()).with_rows(service.categories().await?);
            util::apply_table_args(&mut table, &table_args)?;
            let out = output::render_view(&global.output, &table, |c| c.name.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CategoriesCommand::Get { id } => {
            let category = service
                .categories()
                .await?
                .into_iter()
                .find(|c| c.id == id)
                .ok_or_else(|| CoreError::NotFound {
                    entity_type: "category".into(),
                    identifier: id.to_string(),
                })?;
            let base = &service.config().url;
            let out = output::render_single(
                &global.output,
                &category,
                |c| {
                    output::detail_lines(&[
                        ("ID", c.id.to_string()),
                        ("Name", c.name.clone()),
                        ("Description", util::or_dash(c.description.as_deref())),
                        ("Link", Route::Categories(c.id).url(base)),
                    ])
                },
                |c| c.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
