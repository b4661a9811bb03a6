//! dbmeta CLI - build, export and update Firebird schemas from DDL scripts.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use dbmeta::{
    ops, Config, ConnectionConfig, FirebirdConnection, FirebirdProvisioner, MetaError,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "dbmeta")]
#[command(about = "Build, export and update Firebird database schemas")]
#[command(version)]
struct Cli {
    /// Path to an optional YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

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
    /// Create a new database and run every script in a directory against it
    BuildDb {
        /// Directory the database file is created in
        #[arg(long)]
        db_dir: PathBuf,

        /// Directory containing .sql scripts
        #[arg(long)]
        scripts_dir: PathBuf,
    },

    /// Export domains, tables and procedures as .sql scripts
    ExportScripts {
        /// Connection string, e.g. "DataSource=localhost;Database=/db/app.fdb;User=SYSDBA;Password=masterkey"
        #[arg(long)]
        connection_string: Option<String>,

        /// Directory the scripts are written to
        #[arg(long)]
        output_dir: PathBuf,
    },

    /// Apply domain, table and procedure scripts in one transaction
    UpdateDb {
        /// Connection string, e.g. "DataSource=localhost;Database=/db/app.fdb;User=SYSDBA;Password=masterkey"
        #[arg(long)]
        connection_string: Option<String>,

        /// Directory containing .sql scripts
        #[arg(long)]
        scripts_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(dbmeta::error::EXIT_USAGE_ERROR),
            };
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), MetaError> {
    setup_logging(&cli.verbosity, &cli.log_format).map_err(MetaError::Config)?;

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };

    match cli.command {
        Commands::BuildDb {
            db_dir,
            scripts_dir,
        } => {
            let provisioner = FirebirdProvisioner::new(config.build.clone());
            let report = ops::build(&provisioner, &db_dir, &scripts_dir, &config.build).await?;

            if cli.output_json {
                println!("{}", report.to_json()?);
            } else {
                println!("\nDatabase built: {}", report.database_file.display());
                println!("  Succeeded: {}", report.succeeded.len());
                for file in &report.succeeded {
                    println!("    {}", file);
                }
                println!("  Failed: {}", report.failed.len());
                for failure in &report.failed {
                    println!("    {}: {}", failure.file, failure.message);
                }
            }
        }

        Commands::ExportScripts {
            connection_string,
            output_dir,
        } => {
            let conn_config = resolve_connection(connection_string.as_deref(), &config)?;
            let report = ops::export(FirebirdConnection::connect(&conn_config), &output_dir).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("\nScripts exported to {}", output_dir.display());
                println!("  Domains: {}", report.domains);
                println!("  Tables: {}", report.tables);
                println!("  Procedures: {}", report.procedures);
                if !report.skipped_procedures.is_empty() {
                    println!(
                        "  Procedures without source: {:?}",
                        report.skipped_procedures
                    );
                }
            }
        }

        Commands::UpdateDb {
            connection_string,
            scripts_dir,
        } => {
            let conn_config = resolve_connection(connection_string.as_deref(), &config)?;
            let result =
                ops::update(FirebirdConnection::connect(&conn_config), &scripts_dir).await?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                println!("\nDatabase updated (COMMIT)");
                println!("  Run ID: {}", result.run_id);
                println!("  Duration: {:.2}s", result.duration_seconds);
                println!("  Applied: {}", result.applied.len());
                if !result.skipped.is_empty() {
                    println!("  Skipped unsupported scripts: {:?}", result.skipped);
                }
            }
        }
    }

    Ok(())
}

/// Pick the connection string flag, falling back to the config file.
fn resolve_connection(
    connection_string: Option<&str>,
    config: &Config,
) -> Result<ConnectionConfig, MetaError> {
    match (connection_string, &config.connection) {
        (Some(s), _) => ConnectionConfig::parse(s),
        (None, Some(conn)) => Ok(conn.clone()),
        (None, None) => Err(MetaError::Usage(
            "--connection-string is required (or a `connection` section in --config)".into(),
        )),
    }
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if format == "json" {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    installed.map_err(|e| e.to_string())
}
