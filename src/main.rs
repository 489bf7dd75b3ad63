use anyhow::Result;
use clap::{Parser, Subcommand};

use loginscope::{cli, config};

#[derive(Debug, Parser)]
#[command(name = "loginscope")]
#[command(about = "Terminal dashboard and prediction client for a login anomaly detection service")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Live dashboard: poll stats and history, redraw every interval
    Watch,
    /// Run one poll cycle and print the dashboard once
    Snapshot {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show the most recent predictions, newest first
    History {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Number of rows (default: polling.history_rows)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Submit one login event for classification
    Predict {
        /// Form fields as key=value, e.g. user_id=U1234 login_hour=3
        fields: Vec<String>,
        /// Prompt for every field, then offer reset or resubmit
        #[arg(long, short)]
        interactive: bool,
    },
    /// Check system health: backend, config, event log
    Health,
    /// Summarize the event log
    Log {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default ~/.loginscope/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. backend.base_url
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();

    if !cfg.display.color {
        colored::control::set_override(false);
    }

    match app.command {
        Commands::Watch => cli::run_watch(&cfg),
        Commands::Snapshot { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_snapshot(&cfg, fmt)
        }
        Commands::History { format, limit } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(&cfg, fmt, limit)
        }
        Commands::Predict {
            fields,
            interactive,
        } => cli::run_predict(&cfg, &fields, interactive),
        Commands::Health => cli::run_health(&cfg),
        Commands::Log { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_log(&cfg, fmt)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
