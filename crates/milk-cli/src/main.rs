mod cli;
mod commands;
mod prompt;

use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Command;

/// Entry point wiring the CLI to the API client. Everything runs on one
/// thread; each command awaits its requests in sequence.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    match cli.command {
        Command::Authenticate { config } => commands::authenticate(&config).await?,
        Command::Lists { config } => commands::lists(&config).await?,
        Command::Tasks {
            config,
            list_id,
            all,
        } => commands::tasks(&config, &list_id, all).await?,
        Command::Configsample { output } => commands::config_sample(&output).await?,
    }

    Ok(())
}

fn init_tracing() {
    // Logs go to stderr so command output stays pipeable.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
