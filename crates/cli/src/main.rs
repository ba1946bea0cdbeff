use anyhow::Context;
use clap::{Parser, Subcommand};
use kelly_journal_backtest::{Dashboard, DashboardBuilder, DashboardFormatter};
use kelly_journal_core::{sort_chronologically, AppConfig, ConfigLoader, Trade, TradeOwner};
use kelly_journal_data::{import_csv, parse_trades_str, DatabaseClient, ImportFailure, ImportFormat};
use kelly_journal_web_api::{ApiServer, AppState};
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "kelly-journal")]
#[command(about = "Trading journal with Kelly criterion bet sizing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web API server
    Server {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Import a CSV export into a journal
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: String,
        /// CSV layout (generic, metatrader)
        #[arg(long, default_value = "generic")]
        format: ImportFormat,
        /// Journal owner
        #[arg(long, env = "KELLY_USER_ID")]
        user_id: i32,
        /// Strategy within the owner's journal
        #[arg(long, env = "KELLY_STRATEGY_ID")]
        strategy_id: i32,
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Print the dashboard for a CSV file without touching the database
    Report {
        /// CSV file to analyse
        #[arg(short, long)]
        file: String,
        /// CSV layout (generic, metatrader)
        #[arg(long, default_value = "generic")]
        format: ImportFormat,
        /// Capital every curve starts from (defaults to the configured value)
        #[arg(long)]
        starting_capital: Option<Decimal>,
        /// Print the dashboard JSON payload instead of the text report
        #[arg(long)]
        json: bool,
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Server { config } => {
            run_server(&config).await?;
        }
        Commands::Import {
            file,
            format,
            user_id,
            strategy_id,
            config,
        } => {
            run_import(&file, format, TradeOwner::new(user_id, strategy_id), &config).await?;
        }
        Commands::Report {
            file,
            format,
            starting_capital,
            json,
            config,
        } => {
            run_report(&file, format, starting_capital, json, &config)?;
        }
    }

    Ok(())
}

async fn connect(config: &AppConfig) -> anyhow::Result<DatabaseClient> {
    let client = DatabaseClient::new(&config.database.url, config.database.max_connections).await?;
    client.ensure_schema().await?;
    Ok(client)
}

async fn run_server(config_path: &str) -> anyhow::Result<()> {
    tracing::info!("Starting journal server with config: {}", config_path);

    let config = ConfigLoader::load_from(config_path)?;
    let database = connect(&config).await?;
    let repository = Arc::new(database.trades());

    let state = AppState::new(
        repository.clone(),
        repository,
        config.simulation.starting_capital,
    );
    let server = ApiServer::new(state);
    let addr = config.server.addr();

    tokio::select! {
        result = server.serve(&addr) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

async fn run_import(
    file: &str,
    format: ImportFormat,
    owner: TradeOwner,
    config_path: &str,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))?;

    let config = ConfigLoader::load_from(config_path)?;
    let database = connect(&config).await?;
    let repository = database.trades();

    match import_csv(&repository, owner, format, &text).await {
        Ok(summary) => {
            println!("{}", summary.message());
            Ok(())
        }
        Err(ImportFailure::Rejected(e)) => {
            for row in e.row_errors() {
                println!("Row {}: {}", row.row, row.errors.join(", "));
            }
            anyhow::bail!("{e}")
        }
        Err(e) => Err(e.into()),
    }
}

fn load_trades(file: &str, format: ImportFormat) -> anyhow::Result<Vec<Trade>> {
    let text = std::fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))?;

    let parsed = match parse_trades_str(format, &text) {
        Ok(parsed) => parsed,
        Err(e) => {
            for row in e.row_errors() {
                println!("Row {}: {}", row.row, row.errors.join(", "));
            }
            anyhow::bail!("{e}");
        }
    };

    let mut trades: Vec<Trade> = parsed.into_iter().map(Trade::from).collect();
    sort_chronologically(&mut trades);
    Ok(trades)
}

fn run_report(
    file: &str,
    format: ImportFormat,
    starting_capital: Option<Decimal>,
    json: bool,
    config_path: &str,
) -> anyhow::Result<()> {
    let starting_capital = match starting_capital {
        Some(capital) => capital,
        None => ConfigLoader::load_from(config_path)?.simulation.starting_capital,
    };

    let trades = load_trades(file, format)?;
    tracing::info!(
        "Loaded {} trades from {} ({} format)",
        trades.len(),
        file,
        format
    );

    let simulation = DashboardBuilder::new(starting_capital).simulate(&trades);

    if json {
        let dashboard = Dashboard::from(&simulation);
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        println!("{}", DashboardFormatter::format(&simulation));
    }

    Ok(())
}
