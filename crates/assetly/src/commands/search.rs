//! Unified search across users, devices, and categories.

use tabled::Tabled;

use assetly_core::{AssetService, SearchResults, SearchableEntity};

use crate::cli::{GlobalOpts, OutputFormat, SearchArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct HitRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    title: String,
    #[tabled(rename = "Detail")]
    subtitle: String,
    #[tabled(rename = "Link")]
    link: String,
}

impl HitRow {
    fn new(hit: &SearchableEntity, base: &url::Url) -> Self {
        Self {
            id: hit.id(),
            title: hit.title().to_owned(),
            subtitle: hit.subtitle().to_owned(),
            link: hit.target().url(base),
        }
    }
}

pub async fn handle(
    service: &AssetService,
    args: SearchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut session = service.search_session();
    session.open().await;
    let results = session.search(&args.query);
    session.close();

    let out = render(&results, &service.config().url, global)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render(
    results: &SearchResults,
    base: &url::Url,
    global: &GlobalOpts,
) -> Result<String, CliError> {
    match global.output {
        OutputFormat::Table => {
            if results.is_empty() {
                return Ok("No results".into());
            }
            let color = output::should_color(&global.color);
            let sections: Vec<String> = results
                .groups
                .iter()
                .map(|group| {
                    let rows: Vec<HitRow> = group
                        .entities
                        .iter()
                        .map(|hit| HitRow::new(hit, base))
                        .collect();
                    format!(
                        "{}\n{}",
                        output::heading(group.kind.label(), color),
                        tabled::Table::new(rows).with(tabled::settings::Style::rounded())
                    )
                })
                .collect();
            Ok(sections.join("\n\n"))
        }
        OutputFormat::Json => output::render_json(results, false),
        OutputFormat::JsonCompact => output::render_json(results, true),
        OutputFormat::Yaml => output::render_yaml(results),
        OutputFormat::Plain => Ok(results
            .iter()
            .map(|hit| format!("{}\t{}\t{}", hit.kind().label(), hit.id(), hit.title()))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
