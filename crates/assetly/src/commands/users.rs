//! User command handlers.

use assetly_core::{AssetService, Column, CoreError, Route, TableController, User};

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn columns() -> Vec<Column<User>> {
    vec![
        Column::new("ID", |u: &User| u.id.into()).sortable(),
        Column::new("Name", |u: &User| u.full_name().into()).sortable(),
        Column::new("Username", |u: &User| u.username.as_deref().into()).sortable(),
        Column::new("Email", |u: &User| u.email.as_deref().into()),
        Column::new("Department", |u: &User| u.department.as_deref().into()).sortable(),
        Column::new("Role", |u: &User| u.role.as_deref().into()).sortable(),
        Column::new("Active", |u: &User| u.is_active.into()),
    ]
}

fn detail(user: &User, base: &url::Url) -> String {
    output::detail_lines(&[
        ("ID", user.id.to_string()),
        ("Name", user.full_name()),
        ("Username", util::or_dash(user.username.as_deref())),
        ("Email", util::or_dash(user.email.as_deref())),
        ("Department", util::or_dash(user.department.as_deref())),
        ("Role", util::or_dash(user.role.as_deref())),
        ("Active", if user.is_active { "yes" } else { "no" }.into()),
        ("Link", Route::Users(user.id).url(base)),
    ])
}

pub async fn handle(
    service: &AssetService,
    args: UsersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        UsersCommand::List(table_args) => {
            let mut table = TableController::new(columns()).with_rows(service.users().await?);
            util::apply_table_args(&mut table, &table_args)?;
            let out = output::render_view(&global.output, &table, |u| u.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Get { id } => {
            let user = service
                .users()
                .await?
                .into_iter()
                .find(|u| u.id == id)
                .ok_or_else(|| CoreError::NotFound {
                    entity_type: "user".into(),
                    identifier: id.to_string(),
                })?;
            let base = &service.config().url;
            let out = output::render_single(
                &global.output,
                &user,
                |u| detail(u, base),
                |u| u.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
