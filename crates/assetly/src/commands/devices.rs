//! Device command handlers.

use assetly_core::{AssetService, Column, CoreError, Device, Route, TableController};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

fn columns() -> Vec<Column<Device>> {
    vec![
        Column::new("ID", |d: &Device| d.id.into()).sortable(),
        Column::new("Asset Tag", |d: &Device| d.asset_tag.as_str().into()).sortable(),
        Column::new("Brand", |d: &Device| d.brand.as_str().into()).sortable(),
        Column::new("Model", |d: &Device| d.model.as_str().into()).sortable(),
        Column::new("Status", |d: &Device| d.status.as_deref().into()).sortable(),
        Column::new("Assigned To", |d: &Device| d.assigned_to.as_deref().into()).sortable(),
        Column::new("Location", |d: &Device| d.location.as_deref().into()).sortable(),
        Column::new("Cost", |d: &Device| d.purchase_cost.into()).sortable(),
        Column::new("Purchased", |d: &Device| d.purchase_date.into()).sortable(),
        Column::new("Warranty", |d: &Device| d.warranty_expiry.into()).sortable(),
    ]
}

fn date(value: Option<chrono::DateTime<chrono::Utc>>) -> String {
    value.map_or_else(|| util::or_dash(None), |d| d.format("%Y-%m-%d").to_string())
}

fn detail(device: &Device, base: &url::Url) -> String {
    output::detail_lines(&[
        ("ID", device.id.to_string()),
        ("Device", device.display_name()),
        ("Asset Tag", device.asset_tag.clone()),
        ("Serial", util::or_dash(device.serial_number.as_deref())),
        ("Category", device.category_id.map_or_else(|| util::or_dash(None), |c| c.to_string())),
        ("Status", util::or_dash(device.status.as_deref())),
        ("Assigned To", util::or_dash(device.assigned_to.as_deref())),
        ("Location", util::or_dash(device.location.as_deref())),
        ("Cost", device.purchase_cost.map_or_else(|| util::or_dash(None), |c| format!("{c:.2}"))),
        ("Purchased", date(device.purchase_date)),
        ("Warranty", date(device.warranty_expiry)),
        ("Link", Route::Devices(device.id).url(base)),
    ])
}

pub async fn handle(
    service: &AssetService,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List(table_args) => {
            let mut table = TableController::new(columns()).with_rows(service.devices().await?);
            util::apply_table_args(&mut table, &table_args)?;
            let out = output::render_view(&global.output, &table, |d| d.asset_tag.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { id } => {
            let device = service
                .devices()
                .await?
                .into_iter()
                .find(|d| d.id == id)
                .ok_or_else(|| CoreError::NotFound {
                    entity_type: "device".into(),
                    identifier: id.to_string(),
                })?;
            let base = &service.config().url;
            let out = output::render_single(
                &global.output,
                &device,
                |d| detail(d, base),
                |d| d.asset_tag.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
