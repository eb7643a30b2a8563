//! Jokebot database administration tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jokebot_common::Config;
use jokebot_db::{fixtures, schema, seed};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Create, seed and inspect the jokebot database", long_about = None)]
struct Args {
    /// Path to a configuration file, instead of `config/` and the environment
    #[arg(short, long, env = "JOKEBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Database URL, overriding the configuration
    #[arg(long, env = "JOKEBOT_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Apply pending migrations
    Migrate,
    /// Create every table (fails if they exist)
    Create,
    /// Drop every table, children first
    Drop,
    /// Roll back every migration and apply them again
    Reset,
    /// Insert missing reference data
    Seed,
    /// Load the sample data
    Fixtures,
    /// Print pending migrations and the row count of every table
    Status,
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jokebot=info,sea_orm=warn"));

    let json = std::env::var("JOKEBOT_LOG_FORMAT").is_ok_and(|format| format == "json");

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    if let Some(url) = &args.database_url {
        config.database.url.clone_from(url);
    }
    Ok(config)
}

async fn run(command: Command, db: &DatabaseConnection) -> anyhow::Result<()> {
    match command {
        Command::Migrate => {
            let pending = jokebot_db::pending_migrations(db).await?;
            jokebot_db::migrate(db).await?;
            info!(applied = pending.len(), "Migrations completed");
        }
        Command::Create => schema::create(db).await?,
        Command::Drop => schema::drop(db).await?,
        Command::Reset => {
            jokebot_db::reset(db).await?;
            info!("Database reset");
        }
        Command::Seed => {
            let report = seed::seed_reference_data(db).await?;
            if report.is_noop() {
                info!("Reference data already present");
            }
        }
        Command::Fixtures => {
            fixtures::load_sample_data(db).await?;
        }
        Command::Status => {
            let pending = jokebot_db::pending_migrations(db).await?;
            if pending.is_empty() {
                println!("migrations: up to date");
            } else {
                println!("migrations: {} pending", pending.len());
                for name in &pending {
                    println!("  {name}");
                }
            }

            if !schema::exists(db).await? {
                warn!("Schema is missing or incomplete");
                return Ok(());
            }
            for (table, rows) in schema::row_counts(db).await? {
                println!("{table:<16}{rows:>10}");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args = Args::parse();
    let config = load_config(&args)?;

    let db = jokebot_db::init(&config).await?;
    info!(command = ?args.command, "Connected to database");

    let result = run(args.command, &db).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, command = ?args.command, "Command failed");
    }
    db.close().await?;
    result
}
