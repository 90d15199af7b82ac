use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "roofdesk", version, about = "Roof inspection reports, drafts and offers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Language for error hints: en or da
    #[arg(long, global = true, default_value = "en")]
    pub lang: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP REST API server
    Serve(ServeArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
    /// Measure a roof outline from a JSON list of points
    Area(AreaArgs),
    /// Inspect or discard a stored report draft
    Draft(DraftArgs),
    /// Look up an address
    Geocode(GeocodeArgs),
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// YAML configuration file (defaults to ./roofdesk.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address, overrides server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port, overrides server.port
    #[arg(long)]
    pub port: Option<u16>,

    /// SQLite database path, overrides database.path
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: PathBuf,
}

#[derive(Args, Clone)]
pub struct AreaArgs {
    /// JSON file with `[{"lat": .., "lon": ..}, ...]`, or `-` for stdin
    pub input: String,

    /// Print the measurement as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct DraftArgs {
    #[command(subcommand)]
    pub action: DraftAction,
}

#[derive(Subcommand, Clone)]
pub enum DraftAction {
    /// Print the stored draft of a user
    Show(DraftTarget),
    /// Remove the stored draft of a user
    Clear(DraftTarget),
}

#[derive(Args, Clone)]
pub struct DraftTarget {
    /// User id the draft belongs to
    #[arg(short, long)]
    pub user: String,

    /// Draft directory, overrides drafts.directory
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub struct GeocodeArgs {
    /// Free-text address
    pub query: String,

    /// Maximum number of results, overrides geocoding.limit
    #[arg(long)]
    pub limit: Option<usize>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
