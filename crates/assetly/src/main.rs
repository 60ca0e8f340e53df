mod chime;
mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use assetly_core::AssetService;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands never touch the server
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global).await,

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "assetly", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let resolved = config::resolve(&cli.global)?;
            tracing::debug!(
                profile = %resolved.profile_name,
                server = %resolved.client.url,
                "resolved configuration"
            );
            let service = AssetService::new(resolved.client.clone())?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &service, &resolved, &cli.global).await
        }
    }
}
