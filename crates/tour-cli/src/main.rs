mod cmd;
mod engine;
mod output;
mod root;
mod session;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tour",
    about = "Guided product tours: registry, progress, preferences and an interactive step runner",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .tours/)
    #[arg(long, global = true, env = "TOUR_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log engine activity to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize .tours/ with a config, a sample registry and a locale catalog
    Init,

    /// Show preferences, completion and visited markers
    Status,

    /// List registered tours
    List {
        /// Only tours available to this role (default: config role)
        #[arg(long)]
        role: Option<String>,
    },

    /// Show one tour with its localized steps
    Show { id: String },

    /// Completion progress, overall and by category
    Progress {
        /// Only tours available to this role (default: config role)
        #[arg(long)]
        role: Option<String>,
    },

    /// Mark a tour complete
    Complete { id: String },

    /// Clear completion for one tour, or everything with --all
    Reset {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<String>,

        /// Clear every completion, running state and visited marker
        #[arg(long)]
        all: bool,
    },

    /// Show or update preferences
    Prefs {
        /// Enable or disable auto-start on first page visit
        #[arg(long, value_name = "BOOL")]
        auto_start: Option<bool>,

        /// Show or hide the help button
        #[arg(long, value_name = "BOOL")]
        help_button: Option<bool>,
    },

    /// Simulate a page mount: run the auto-start policy and play the tour if it fires
    Visit {
        id: String,

        /// The page opted out of auto-start for this mount
        #[arg(long)]
        disabled: bool,
    },

    /// Start a tour and step through it interactively (next, back, skip, close)
    Play { id: String },

    /// Validate the configuration and registry
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::List { role } => cmd::list::run(&root, role.as_deref(), cli.json),
        Commands::Show { id } => cmd::show::run(&root, &id, cli.json),
        Commands::Progress { role } => cmd::progress::run(&root, role.as_deref(), cli.json),
        Commands::Complete { id } => cmd::complete::run(&root, &id, cli.json),
        Commands::Reset { id, all } => cmd::reset::run(&root, id.as_deref(), all, cli.json),
        Commands::Prefs {
            auto_start,
            help_button,
        } => cmd::prefs::run(&root, auto_start, help_button, cli.json),
        Commands::Visit { id, disabled } => cmd::visit::run(&root, &id, disabled, cli.json),
        Commands::Play { id } => cmd::play::run(&root, &id, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
