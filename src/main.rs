use anyhow::Context;
use brew_compat::api::HOMEBREW_API_BASE;
use brew_compat::colors::{self, ColorMode};
use brew_compat::{Config, MacosVersion, check, report};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Parser)]
#[command(name = "brew-compat")]
#[command(
    author,
    version,
    about = "Check compatibility of brew formulae and casks against macOS versions",
    long_about = None
)]
struct Cli {
    /// Path to Brewfile
    #[arg(default_value = "Brewfile")]
    brewfile: PathBuf,

    /// macOS version to check against
    #[arg(long, value_enum, default_value_t = MacosVersion::BigSur)]
    macos_version: MacosVersion,

    /// Use verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Export results in CSV format to compatibility.csv
    #[arg(long)]
    export: bool,

    /// Base URL of the Homebrew JSON API
    #[arg(long, env = "HOMEBREW_API_DOMAIN", default_value = HOMEBREW_API_BASE)]
    api_url: String,

    /// Per-request timeout in seconds
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    /// When to color the output
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorMode,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            brewfile: self.brewfile,
            macos_version: self.macos_version,
            verbose: self.verbose,
            export: self.export,
            api_base: self.api_url,
            timeout: Duration::from_secs(self.timeout),
            color: self.color,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "brew-compat", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    let config = cli.into_config();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    colors::init_colors(config.color);

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let progress = spinner(!config.verbose && std::io::stderr().is_terminal());

    let rows = check::run(config, &progress).await?;

    print!("{}", report::render_table(&rows));

    if let Some(path) = config.export_path() {
        report::export(&rows, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Exported results to {}", path.display());
    }

    debug!("FIN.");
    Ok(())
}

fn spinner(enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} [{pos}/{len}] {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
