//! Command dispatch: bridges CLI args -> core service -> output formatting.

pub mod categories;
pub mod config_cmd;
pub mod devices;
pub mod notifications;
pub mod search;
pub mod users;
pub mod util;

use assetly_core::AssetService;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    service: &AssetService,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Search(args) => search::handle(service, args, global).await,
        Command::Users(args) => users::handle(service, args, global).await,
        Command::Devices(args) => devices::handle(service, args, global).await,
        Command::Categories(args) => categories::handle(service, args, global).await,
        Command::Notifications(args) => {
            notifications::handle(service, resolved, args, global).await
        }
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "not a server command".into(),
        }),
    }
}
