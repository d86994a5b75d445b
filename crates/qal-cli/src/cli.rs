use clap::{Args, Parser, Subcommand, ValueEnum};

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Raw,
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub db: Option<String>,
    pub quiet: bool,
    pub verbose: bool,
}

/// Top-level CLI parser for the `qal` binary.
#[derive(Debug, Parser)]
#[command(name = "qal", version, about = "QAlytics - hierarchical PnL quality analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Database file path (overrides config)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            db: self.db.clone(),
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP API server.
    Serve(ServeArgs),
    /// Create the database file and run migrations.
    InitDb,
    /// Populate the sample dataset through the service layer.
    Seed,
    /// Query the metrics history store.
    History(HistoryArgs),
}

/// Arguments for `qal serve`.
#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Bind host (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides config)
    #[arg(long)]
    pub port: Option<u16>,
}

/// Arguments for `qal history`.
#[derive(Clone, Debug, Args)]
pub struct HistoryArgs {
    /// Filter by entity type: pnl-metrics, sub-pnl-metrics, sub-pnl-detail-metrics
    #[arg(long)]
    pub entity_type: Option<String>,

    /// Filter by owning entity id
    #[arg(long)]
    pub entity_id: Option<i64>,

    /// Filter by change type: create, update, delete
    #[arg(long)]
    pub change_type: Option<String>,

    /// Max entries to return (defaults to the configured limit)
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Entries to skip from the newest end
    #[arg(long)]
    pub offset: Option<u32>,
}
