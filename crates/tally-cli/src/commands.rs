use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use tally_sdk::{
    Collection, ColorModeController, Expense, Expenses, ExpenseForm, InMemoryExpenseStore,
    InMemoryKeyValueStore, JsonFileKeyValueStore, KeyValueStore, Settlement, TallyConfig,
};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    match &cli.command {
        Command::List => cmd_list(&config, &cli.format).await,
        Command::Add(args) => cmd_add(&config, args, &cli.format).await,
        Command::Search(args) => cmd_search(&config, args, &cli.format).await,
        Command::Meta => cmd_meta(&config, &cli.format).await,
        Command::Theme(args) => cmd_theme(&config, args),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<TallyConfig> {
    let mut config = match &cli.config {
        Some(path) => TallyConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TallyConfig::default(),
    };
    if let Some(data) = &cli.data {
        config.store.data_path = Some(data.clone());
    }
    if let Some(prefs) = &cli.prefs {
        config.theme.prefs_path = Some(prefs.clone());
    }
    Ok(config)
}

async fn open_session(config: &TallyConfig) -> anyhow::Result<Expenses> {
    let store = InMemoryExpenseStore::open(config.store.clone())?;
    let session = Expenses::open(Arc::new(store), &config.flow).await?;
    Ok(session)
}

fn print_records(records: &Collection, format: &OutputFormat) -> anyhow::Result<()> {
    if *format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No expenses.");
        return Ok(());
    }
    for expense in records.iter() {
        print_expense(expense);
    }
    Ok(())
}

fn print_expense(expense: &Expense) {
    let id = if expense.is_placeholder() {
        "pending".yellow().to_string()
    } else {
        expense.id.as_str().chars().take(8).collect::<String>().dimmed().to_string()
    };
    let description = if expense.description.is_empty() {
        String::new()
    } else {
        format!(" - {}", expense.description)
    };
    println!(
        "{}  {} {}{}  {} {}",
        id,
        expense.created_at.format("%Y-%m-%d").to_string().dimmed(),
        expense.origin.bold(),
        description,
        expense.formatted_amount().green(),
        format!("({})", expense.charged).cyan(),
    );
}

async fn cmd_list(config: &TallyConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let session = open_session(config).await?;
    let records = session.collection().borrow().clone();
    print_records(&records, format)
}

async fn cmd_add(config: &TallyConfig, args: &AddArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let form = ExpenseForm::new(&args.origin, &args.description, &args.amount, &args.charged);
    let draft = form.validate()?;
    let session = open_session(config).await?;

    match session.submit(draft).await? {
        Settlement::Fulfilled(expense) => {
            println!("{} Added {} ({})", "✓".green().bold(), expense.origin.bold(), expense.id);
        }
        Settlement::Rejected(error) => {
            println!("{} Not added: {}", "✗".red().bold(), error);
        }
    }

    let records = session.collection().borrow().clone();
    print_records(&records, format)
}

async fn cmd_search(config: &TallyConfig, args: &SearchArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let session = open_session(config).await?;
    let mut view = session.filtered_collection();
    session.on_search_change(args.query.clone())?;

    let applied = view
        .wait_for(|v| v.query == args.query)
        .await
        .context("filter stopped before applying the query")?
        .clone();
    if *format == OutputFormat::Text {
        println!("{} match(es) for {}", applied.records.len(), args.query.yellow());
    }
    print_records(&applied.records, format)
}

async fn cmd_meta(config: &TallyConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let session = open_session(config).await?;
    let meta = session.meta().borrow().clone();
    if *format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
        return Ok(());
    }
    println!("{}", "Origins".bold());
    for origin in &meta.origins {
        println!("  {origin}");
    }
    println!("{}", "People".bold());
    for person in &meta.people {
        println!("  {person}");
    }
    Ok(())
}

fn cmd_theme(config: &TallyConfig, args: &ThemeArgs) -> anyhow::Result<()> {
    let store: Arc<dyn KeyValueStore> = match &config.theme.prefs_path {
        Some(path) => Arc::new(JsonFileKeyValueStore::open(path)?),
        None => Arc::new(InMemoryKeyValueStore::new()),
    };
    let controller =
        ColorModeController::new(store, &config.theme.storage_key, config.theme.default)?;

    if args.toggle {
        let mode = controller.toggle()?;
        println!("{} Color mode is now {}", "✓".green(), mode.to_string().bold());
    } else {
        println!("Color mode: {}", controller.current().to_string().bold());
    }
    Ok(())
}
