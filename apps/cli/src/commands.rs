//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use despachos_core::pipeline::{ProgressReporter, RunConfig, RunResult};
use despachos_shared::{AppConfig, init_config, load_config, load_config_from, to_toml, validate};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Despachos — list staff members and their office codes.
#[derive(Parser)]
#[command(
    name = "despachos",
    version,
    about = "Fetch staff from the directory API and list their office codes as TXT, Markdown and CSV.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Output path prefix (writes <PREFIX>.txt, <PREFIX>.md, <PREFIX>.csv).
    #[arg(short, long, env = "DESPACHOS_PREFIX")]
    pub prefix: Option<String>,

    /// Config file to use instead of ~/.despachos/despachos.toml.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands. Without one, the listing is generated.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs always go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "despachos=info",
        1 => "despachos=debug",
        _ => "despachos=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => cmd_generate(cli.config.as_deref(), cli.prefix.as_deref()).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(cli.config.as_deref(), cli.prefix.as_deref()),
        },
    }
}

/// Load the config file and apply CLI overrides.
fn resolve_config(config_path: Option<&Path>, prefix: Option<&str>) -> Result<AppConfig> {
    let mut config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if let Some(prefix) = prefix {
        config.output.prefix = prefix.to_string();
    }

    validate(&config)?;
    Ok(config)
}

async fn cmd_generate(config_path: Option<&Path>, prefix: Option<&str>) -> Result<()> {
    let config = resolve_config(config_path, prefix)?;
    let run_config = RunConfig::from(&config);

    info!(prefix = %run_config.prefix, "generating office listing");

    let reporter = CliProgress::new();
    let result = despachos_core::pipeline::run(&run_config, &reporter).await?;

    println!("Generados:");
    for path in result.paths.iter() {
        println!(" - {}", path.display());
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config written to {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>, prefix: Option<&str>) -> Result<()> {
    let config = resolve_config(config_path, prefix)?;
    print!("{}", to_toml(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner (drawn on stderr).
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn person_done(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Looking up offices [{current}/{total}] {name}"));
    }

    fn done(&self, _result: &RunResult) {
        self.spinner.finish_and_clear();
    }
}
