//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tutorloop")]
#[command(
    author,
    version,
    about = "Step-by-step math answers from a self-correcting knowledge base"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "TUTORLOOP_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a math question
    Ask(AskArgs),

    /// Inspect and manage the knowledge base
    Kb(KbArgs),

    /// Show or create the configuration file
    Config(ConfigArgs),

    /// Start MCP server
    Mcp,
}

#[derive(Args)]
pub struct AskArgs {
    /// The question (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

#[derive(Args)]
pub struct KbArgs {
    #[command(subcommand)]
    pub action: KbAction,
}

#[derive(Subcommand)]
pub enum KbAction {
    /// Show record counts
    Status,

    /// Load the seed corpus into an empty knowledge base
    Seed,

    /// Find stored questions closest to a query
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Number of results
        #[arg(short = 'n', default_value = "5")]
        limit: usize,

        /// Maximum cosine distance counted as a hit (defaults to config)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// List records, newest first
    List {
        #[arg(long, default_value = "20")]
        limit: usize,

        #[arg(long, default_value = "0")]
        offset: usize,
    },

    /// Show a single record
    Get {
        /// Record id (kb-...)
        id: String,
    },
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
