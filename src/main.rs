use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moneybags::cli::{
    handle_budget_command, handle_category_command, handle_export_command, handle_import_command,
    handle_payee_command, handle_report_command, handle_template_command,
    handle_transaction_command,
};
use moneybags::config::{MoneybagsPaths, Settings};
use moneybags::storage::{seed_defaults, Storage};
use moneybags::web::{run_server, AppState};

#[derive(Parser)]
#[command(
    name = "moneybags",
    version,
    about = "Personal finance: budgets, transactions and variance analysis",
    long_about = "Moneybags keeps a yearly budget per category and month, records \
                  actual transactions against it and reports how the two compare. \
                  Run `moneybags serve` for the web interface."
)]
struct Cli {
    /// Database URL, overriding the settings file
    #[arg(long, global = true, env = "MONEYBAGS_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server
    Serve {
        /// Address to bind, overriding the settings file
        #[arg(long, env = "MONEYBAGS_BIND")]
        bind: Option<String>,
    },

    /// Create the data directory, settings and starter data
    Init,

    /// Show current configuration and paths
    Config,

    /// Apply a SQL migration file, or list the available ones
    Migrate {
        /// Migration file to apply
        file: Option<PathBuf>,
        /// Directory searched when no file is given
        #[arg(long, default_value = "migrations")]
        dir: PathBuf,
    },

    /// Category management commands
    #[command(subcommand)]
    Category(moneybags::cli::CategoryCommands),

    /// Payee management commands
    #[command(subcommand)]
    Payee(moneybags::cli::PayeeCommands),

    /// Budget template commands
    #[command(subcommand)]
    Template(moneybags::cli::TemplateCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(moneybags::cli::BudgetCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(moneybags::cli::TransactionCommands),

    /// Import a budget spreadsheet saved as CSV
    Import(moneybags::cli::ImportArgs),

    /// Export data
    #[command(subcommand)]
    Export(moneybags::cli::ExportCommands),

    /// Budget against actual reports
    #[command(subcommand)]
    Report(moneybags::cli::ReportCommands),
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    if settings.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn open_storage(paths: &MoneybagsPaths, settings: &Settings) -> Result<Storage> {
    paths.ensure_directories()?;
    let url = settings.database.resolved_url(paths);
    Storage::connect(&url, &settings.database)
        .await
        .with_context(|| format!("Failed to open database at {}", url))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = MoneybagsPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    if let Some(url) = cli.database_url {
        settings.database.url = Some(url);
    }
    init_tracing(&settings);

    let Some(command) = cli.command else {
        println!("Moneybags - personal finance");
        println!();
        println!("Run 'moneybags --help' for usage information.");
        println!("Run 'moneybags serve' to start the web interface.");
        return Ok(());
    };

    match command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind_address.clone());
            let storage = open_storage(&paths, &settings).await?;
            seed_defaults(&storage, chrono::Local::now().year()).await?;
            let state = AppState::new(storage, settings, paths);
            run_server(state, &bind).await?;
        }
        Commands::Init => {
            println!("Initializing Moneybags at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            settings.save(&paths)?;
            let storage = open_storage(&paths, &settings).await?;
            let year = chrono::Local::now().year();
            if seed_defaults(&storage, year).await? {
                println!("Created starter categories, payees and a {} template.", year);
            } else {
                println!("Database already initialized.");
            }
            storage.close().await;
            println!();
            println!("Run 'moneybags category list' to see all categories.");
        }
        Commands::Config => {
            println!("Moneybags Configuration");
            println!("=======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Export directory: {}", paths.export_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Database:     {}", settings.database.resolved_url(&paths));
            println!("  Pool size:    {}", settings.database.pool_size);
            println!("  Bind address: {}", settings.bind_address);
            println!("  Log level:    {}", settings.logging.level);
        }
        Commands::Migrate { file, dir } => match file {
            Some(file) => {
                let storage = open_storage(&paths, &settings).await?;
                let applied = storage.apply_migration_file(&file).await?;
                println!("Applied {} ({} rows affected)", file.display(), applied);
                storage.close().await;
            }
            None => {
                let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
                    .with_context(|| format!("Failed to read {}", dir.display()))?
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
                    .collect();
                files.sort();
                if files.is_empty() {
                    println!("No migrations in {}", dir.display());
                }
                for file in files {
                    println!("{}", file.display());
                }
            }
        },
        command => {
            let storage = open_storage(&paths, &settings).await?;
            match command {
                Commands::Category(cmd) => handle_category_command(&storage, cmd).await?,
                Commands::Payee(cmd) => handle_payee_command(&storage, cmd).await?,
                Commands::Template(cmd) => handle_template_command(&storage, cmd).await?,
                Commands::Budget(cmd) => handle_budget_command(&storage, cmd).await?,
                Commands::Transaction(cmd) => handle_transaction_command(&storage, cmd).await?,
                Commands::Import(args) => handle_import_command(&storage, args).await?,
                Commands::Export(cmd) => handle_export_command(&storage, cmd).await?,
                Commands::Report(cmd) => handle_report_command(&storage, cmd).await?,
                Commands::Serve { .. }
                | Commands::Init
                | Commands::Config
                | Commands::Migrate { .. } => {}
            }
            storage.close().await;
        }
    }

    Ok(())
}
