use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use leadtrack::cli::ui::is_interactive;
use leadtrack::cli::{
    run_add, run_contact, run_dashboard, run_delete, run_import, run_leads, run_list, run_show,
    run_update, Cli, Commands,
};
use leadtrack::clock::{Clock, SystemClock};
use leadtrack::config::{AppConfig, DataSource};
use leadtrack::{Database, LeadError, LeadStore, MemoryStore};

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_store(config: &AppConfig, clock: &dyn Clock) -> anyhow::Result<Box<dyn LeadStore>> {
    let store: Box<dyn LeadStore> = match &config.data_source {
        DataSource::Demo => Box::new(MemoryStore::with_sample_data(clock.now())),
        DataSource::Sqlite(path) => Box::new(
            Database::open_at(path)
                .with_context(|| format!("Failed to open database at {}", path.display()))?,
        ),
    };
    Ok(store)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::resolve(cli.demo, cli.db.clone())?;
    init_tracing(&config.log_filter);
    debug!(?config, "resolved configuration");

    let clock = SystemClock;
    let store = open_store(&config, &clock)?;
    let store = store.as_ref();
    let json = cli.json;

    match cli.command {
        None => {
            // No subcommand provided - show the dashboard
            run_dashboard(store, &clock, json)?;
        }
        Some(Commands::Dashboard) => {
            run_dashboard(store, &clock, json)?;
        }
        Some(Commands::List(args)) => {
            run_list(store, args.search.as_deref(), args.status.as_deref(), &args.sort, json)?;
        }
        Some(Commands::Leads(args)) => {
            run_leads(store, &clock, &args.tab, json)?;
        }
        Some(Commands::Show(args)) => {
            run_show(store, &clock, &args.identifier, json)?;
        }
        Some(Commands::Add(args)) => {
            run_add(store, &clock, &args.address, &args.fields)?;
        }
        Some(Commands::Update(args)) => {
            run_update(store, &clock, &args.identifier, args.address.as_deref(), &args.fields)?;
        }
        Some(Commands::Contact(args)) => {
            run_contact(store, &clock, &args, is_interactive())?;
        }
        Some(Commands::Delete(args)) => {
            run_delete(store, &args.identifier, args.force, is_interactive())?;
        }
        Some(Commands::Import(args)) => {
            run_import(store, &clock, &args.file, args.dry_run)?;
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let result = run(cli);

    if let Err(ref err) = result {
        if err
            .downcast_ref::<LeadError>()
            .is_some_and(LeadError::is_data_source)
        {
            eprintln!("Could not reach the lead data. Check the database path, or retry with --demo.");
        }
    }
    result
}
