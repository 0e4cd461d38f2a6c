mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use opnly_core::{Controller, Database};

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
        // Completions and config never open the database
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "opnly", &mut std::io::stdout());
            Ok(())
        }

        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        cmd => {
            let settings = opnly_config::load_settings()?;
            let db_path = cli
                .global
                .database
                .clone()
                .unwrap_or_else(|| settings.database_path());
            let db = Database::open(&db_path)?;
            let controller = Controller::new(&db, settings.to_controller_settings()?)?;

            tracing::debug!(db = %db_path.display(), "dispatching command");
            let result = commands::dispatch(cmd, &controller, &cli.global).await;
            controller.shutdown().await;
            result
        }
    }
}
