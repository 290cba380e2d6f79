pub mod commands;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use reqflow_core::config::{AppConfig, LogFormat};
use tracing_subscriber::EnvFilter;

use crate::commands::catalog::CatalogQuery;

#[derive(Debug, Parser)]
#[command(
    name = "reqflow",
    about = "Purchase request workflow CLI",
    long_about = "Inspect purchase requests, their approval workflow and the material catalog.",
    after_help = "Examples:\n  reqflow requests --status pending\n  reqflow catalog --category Lab --query chem\n  reqflow demo"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a reqflow.toml config file (must exist)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List requests, optionally filtered by status and search text")]
    Requests {
        #[arg(long, help = "Draft, Pending Approval, Approved or Rejected")]
        status: Option<String>,
        #[arg(long, help = "Case-insensitive match on title, requester or department")]
        search: Option<String>,
    },
    #[command(about = "Show one request with its items, history and available actions")]
    Show { id: String },
    #[command(about = "List workflow transitions from a status, or the whole table")]
    Transitions { status: Option<String> },
    #[command(about = "Browse the material catalog")]
    Catalog(CatalogArgs),
    #[command(about = "Run a request through its full lifecycle and print the audit trail")]
    Demo,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

#[derive(Debug, Args)]
struct CatalogArgs {
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    subcategory: Option<String>,
    #[arg(long, help = "Case-insensitive match on material name or code")]
    query: Option<String>,
    #[arg(long, help = "Use the capped inline picker search instead of the full filter")]
    quick: bool,
    #[arg(long)]
    limit: Option<usize>,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let command_name = cli.command.name();

    let config = match commands::load_config(cli.config.clone()) {
        Ok(config) => config,
        Err(error) => {
            let result = commands::config_failure(command_name, &error);
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    init_logging(&config);
    tracing::debug!(event_name = "cli.command.started", command = command_name, "running command");

    let result = match cli.command {
        Command::Requests { status, search } => {
            commands::requests::list(&config, status.as_deref(), search.as_deref())
        }
        Command::Show { id } => commands::requests::show(&config, &id),
        Command::Transitions { status } => commands::transitions::run(status.as_deref()),
        Command::Catalog(args) => commands::catalog::run(
            &config,
            CatalogQuery {
                category: args.category,
                subcategory: args.subcategory,
                query: args.query,
                quick: args.quick,
                limit: args.limit,
            },
        ),
        Command::Demo => commands::demo::run(&config),
        Command::Config => commands::config::run(&config, cli.config.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Requests { .. } => "requests",
            Self::Show { .. } => "show",
            Self::Transitions { .. } => "transitions",
            Self::Catalog(_) => "catalog",
            Self::Demo => "demo",
            Self::Config => "config",
        }
    }
}

/// Logs go to stderr so stdout stays a single JSON document.
fn init_logging(config: &AppConfig) {
    let rust_log = env::var("RUST_LOG").ok();
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(log_filter(&config.logging.level, rust_log.as_deref()));

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// `RUST_LOG` directives win over the configured level when they parse.
fn log_filter(level: &str, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}
