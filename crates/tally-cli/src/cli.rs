use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tally",
    about = "Tally - shared expense tracking with optimistic updates",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON file expenses are loaded from and saved to
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// JSON file preferences are kept in
    #[arg(long, global = true)]
    pub prefs: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List all expenses, newest first
    List,
    /// Record a new expense
    Add(AddArgs),
    /// Show expenses matching a query
    Search(SearchArgs),
    /// Show known origins and people
    Meta,
    /// Show or toggle the color mode
    Theme(ThemeArgs),
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    pub origin: String,
    #[arg(short, long, default_value = "")]
    pub description: String,
    /// Amount in dollars, e.g. 12.34
    #[arg(short, long)]
    pub amount: String,
    /// Person the expense is charged to
    #[arg(long)]
    pub charged: String,
}

#[derive(Args)]
pub struct SearchArgs {
    pub query: String,
}

#[derive(Args)]
pub struct ThemeArgs {
    #[arg(short, long)]
    pub toggle: bool,
}
