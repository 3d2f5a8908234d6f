//! db-reset CLI - drop every user object from a database schema.

use clap::{Parser, Subcommand};
use db_reset::{
    run, Config, Connection, ConnectionImpl, Dialect, ResetError, ResetOutcome, ResetReport,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "db-reset")]
#[command(about = "Drop all user objects from an Oracle, PostgreSQL, MySQL or SQL Server schema")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop every view, index, table and sequence of the configured schema
    Reset {
        /// Override the dialect selector (oracle, postgresql, mysql, sqlserver)
        #[arg(long)]
        dialect: Option<String>,

        /// Override the Oracle schema owner
        #[arg(long)]
        schema_owner: Option<String>,
    },

    /// Test the database connection
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn execute() -> Result<(), ResetError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Reset {
            dialect,
            schema_owner,
        } => {
            // Apply overrides
            if let Some(selector) = dialect {
                config.dialect = selector;
            }
            if let Some(owner) = schema_owner {
                config.schema_owner = Some(owner);
            }
            config.validate()?;

            // Only the Oracle script is scoped by owner
            let owner = if matches!(Dialect::from_selector(&config.dialect), Ok(Dialect::Oracle)) {
                config.schema_owner()?
            } else {
                config.schema_owner().unwrap_or_default()
            };

            let mut conn = ConnectionImpl::open(&config.connection).await?;
            let outcome = run(&config.dialect, &mut conn, &owner).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                match outcome {
                    ResetOutcome::Completed(report) => print_summary(&report),
                    ResetOutcome::Skipped { selector } => {
                        println!("\nUnsupported DBMS '{}': nothing was dropped", selector);
                    }
                }
            }
        }

        Commands::HealthCheck => {
            let mut conn = ConnectionImpl::open(&config.connection).await?;
            let start = Instant::now();
            let pinged = conn.ping().await;
            let latency_ms = start.elapsed().as_millis();
            if let Err(e) = conn.release().await {
                warn!("Failed to release connection: {}", e);
            }

            if cli.output_json {
                let result = serde_json::json!({
                    "driver": config.connection.driver.name(),
                    "connected": pinged.is_ok(),
                    "latency_ms": latency_ms,
                    "error": pinged.as_ref().err().map(|e| e.to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Database ({}): {} ({}ms)",
                    config.connection.driver.name(),
                    if pinged.is_ok() { "OK" } else { "FAILED" },
                    latency_ms
                );
                if let Err(ref e) = pinged {
                    println!("    Error: {}", e);
                }
            }

            if let Err(e) = pinged {
                return Err(ResetError::connection(e, "health check"));
            }
        }
    }

    Ok(())
}

fn print_summary(report: &ResetReport) {
    println!("\nReset completed!");
    println!("  Dialect: {}", report.dialect);
    if let Some(seconds) = report.duration_seconds() {
        println!("  Duration: {:.2}s", seconds);
    }
    for phase in &report.phases {
        println!(
            "  {}: {} executed, {} failed",
            phase.phase.label(),
            phase.executed.len(),
            phase.failed.len()
        );
    }
    println!("  Objects dropped: {}", report.objects_dropped());

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!("  Skipped after failure:");
        for failed in failures {
            println!("    {} ({})", failed.statement, failed.error);
        }
    }
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so --output-json keeps stdout parseable
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
