//! Notification command handlers, including the `watch` poll loop.

use std::sync::Arc;

use tabled::Tabled;

use assetly_core::notify::{RECENT_LIMIT, newest_first};
use assetly_core::{
    AssetService, Column, Notification, NotificationSnapshot, Route, TableController,
};

use crate::chime::CliChime;
use crate::cli::{GlobalOpts, NotificationsArgs, NotificationsCommand, OutputFormat};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

fn columns() -> Vec<Column<Notification>> {
    vec![
        Column::new("ID", |n: &Notification| n.id.into()).sortable(),
        Column::new("Type", |n: &Notification| n.kind.to_string().into()).sortable(),
        Column::new("Title", |n: &Notification| n.title.as_str().into()).sortable(),
        Column::new("Message", |n: &Notification| n.message.as_str().into()),
        Column::new("Read", |n: &Notification| n.is_read.into()),
        Column::new("Created", |n: &Notification| n.created_at.into()).sortable(),
    ]
}

#[derive(Tabled)]
struct RecentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&Notification> for RecentRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            when: n.created_at.map_or_else(
                || util::or_dash(None),
                |t| t.format("%Y-%m-%d %H:%M").to_string(),
            ),
            title: n.title.clone(),
            message: n.message.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    service: &AssetService,
    resolved: &Resolved,
    args: NotificationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NotificationsCommand::List { unread, table } => {
            let rows = if unread {
                service.unread_notifications().await?
            } else {
                service.notifications().await?
            };
            let mut view = TableController::new(columns()).with_rows(rows);
            util::apply_table_args(&mut view, &table)?;
            let out = output::render_view(&global.output, &view, |n| n.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NotificationsCommand::Recent { limit } => {
            let limit = limit.unwrap_or(RECENT_LIMIT);
            let recent = newest_first(service.unread_notifications().await?, limit);
            let out = if recent.is_empty() && matches!(global.output, OutputFormat::Table) {
                "No unread notifications".to_owned()
            } else {
                output::render_list(
                    &global.output,
                    &recent,
                    |n| RecentRow::from(n),
                    |n| n.id.to_string(),
                )?
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NotificationsCommand::Read { id } => {
            service.mark_read(id).await?;
            if !global.quiet {
                eprintln!("Notification {id} marked as read");
            }
            Ok(())
        }

        NotificationsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete notification {id}?"), "delete", global.yes)? {
                return Ok(());
            }
            service.delete_notification(id).await?;
            if !global.quiet {
                eprintln!("Notification {id} deleted");
            }
            Ok(())
        }

        NotificationsCommand::Watch { interval, silent } => {
            watch_loop(service, resolved, interval.as_deref(), silent, global).await
        }

        NotificationsCommand::Open => {
            let url = Route::Notifications.url(&service.config().url);
            output::print_output(&url, global.quiet);
            Ok(())
        }
    }
}

// ── Watch ───────────────────────────────────────────────────────────

async fn watch_loop(
    service: &AssetService,
    resolved: &Resolved,
    interval: Option<&str>,
    silent: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let user = service.user_id()?;
    let chime = Arc::new(CliChime::from_settings(&resolved.alert, silent));
    let mut poller = service.poller(chime);
    if let Some(raw) = interval {
        poller = poller.with_interval(assetly_config::parse_duration("interval", raw)?);
    }

    let handle = poller.start(user);
    let mut rx = handle.subscribe();
    let color = output::should_color(&global.color);
    if !global.quiet {
        eprintln!(
            "Watching notifications for user {user} every {}; Ctrl-C to stop",
            humantime::format_duration(poller.interval())
        );
    }

    let mut seen_alerts = 0;
    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                let fresh = snapshot.alerts > seen_alerts;
                seen_alerts = snapshot.alerts;
                let line = render_tick(&snapshot, fresh, &global.output, color)?;
                output::print_output(&line, global.quiet);
            }
        }
    }

    handle.stop().await;
    Ok(())
}

fn render_tick(
    snapshot: &NotificationSnapshot,
    fresh: bool,
    format: &OutputFormat,
    color: bool,
) -> Result<String, CliError> {
    let fetched_at = snapshot
        .fetched_at
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_default();

    match format {
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            let event = serde_json::json!({
                "fetched_at": snapshot.fetched_at,
                "unread": snapshot.unread_count(),
                "alert": fresh,
                "recent": snapshot.recent(RECENT_LIMIT),
            });
            // One event per line regardless of the pretty/compact choice.
            output::render_json(&event, true)
        }
        OutputFormat::Plain => Ok(format!("{fetched_at}\t{}", snapshot.unread_count())),
        OutputFormat::Table => {
            let mut line = format!(
                "{}  {} unread",
                output::dim(&fetched_at, color),
                snapshot.unread_count()
            );
            if fresh {
                line.push_str(&format!("  {}", output::highlight("new", color)));
                for n in snapshot.recent(RECENT_LIMIT) {
                    line.push_str(&format!("\n  • {}: {}", n.title, n.message));
                }
            }
            Ok(line)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use assetly_core::NotificationType;

    use super::*;

    fn note(id: i64) -> Notification {
        Notification {
            id,
            user_id: 1,
            title: "Warranty".into(),
            message: "ends soon".into(),
            kind: NotificationType::WarrantyExpiry,
            is_read: false,
            created_at: None,
            link: None,
        }
    }

    #[test]
    fn tick_lists_recent_on_alert() {
        let snapshot = NotificationSnapshot {
            unread: vec![note(1), note(2)],
            alerts: 1,
            refreshes: 2,
            ..NotificationSnapshot::default()
        };
        let quiet = render_tick(&snapshot, false, &OutputFormat::Table, false).unwrap();
        assert!(quiet.ends_with("2 unread"));

        let loud = render_tick(&snapshot, true, &OutputFormat::Table, false).unwrap();
        assert!(loud.contains("new"));
        assert_eq!(loud.matches("Warranty").count(), 2);
    }

    #[test]
    fn tick_json_is_one_line() {
        let snapshot = NotificationSnapshot {
            unread: vec![note(1)],
            ..NotificationSnapshot::default()
        };
        let out = render_tick(&snapshot, false, &OutputFormat::Json, false).unwrap();
        assert!(!out.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["unread"], 1);
        assert_eq!(value["alert"], false);
    }
}
