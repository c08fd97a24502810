use clap::Parser;
use tracing::Level;

mod cli;
mod commands;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt().with_max_level(level).with_target(false).init();
    commands::run_command(cli).await
}
