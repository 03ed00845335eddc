use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrollto_core::{AppConfig, Easing};

mod commands;
mod page;

#[derive(Parser)]
#[command(name = "scrollto")]
#[command(author, version, about = "Simulate smooth scrolling to elements of a page")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.config/scrollto/config.toml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate a scroll over a page description
    Run {
        /// Page description (TOML)
        #[arg(short = 'p', long)]
        page: PathBuf,
        /// Element id to scroll to (a leading '#' is optional)
        #[arg(short = 't', long)]
        target: String,
        /// Element id of the container to scroll, or "body"
        #[arg(long)]
        container: Option<String>,
        /// Animation duration in milliseconds
        #[arg(short = 'd', long)]
        duration: Option<u64>,
        /// Easing function name
        #[arg(short = 'e', long)]
        easing: Option<Easing>,
        /// Offset from the target in pixels
        #[arg(short = 'o', long, allow_hyphen_values = true)]
        offset: Option<f64>,
        /// Override the page's viewport width
        #[arg(short = 'w', long)]
        width: Option<f64>,
        /// Simulate a touchstart after this many milliseconds
        #[arg(long)]
        interrupt_after: Option<u64>,
        /// Print JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the configuration file instead of printing it
        #[arg(long)]
        init: bool,
        /// Overwrite an existing file (with --init)
        #[arg(long)]
        force: bool,
    },
    /// List easing functions
    Easings,
    /// Print an easing curve
    Curve {
        #[arg(short = 'e', long, default_value = "easeInOutQuad")]
        easing: Easing,
        #[arg(short = 's', long, default_value_t = 20)]
        steps: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging; stdout carries the positions
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Run {
            page,
            target,
            container,
            duration,
            easing,
            offset,
            width,
            interrupt_after,
            json,
        } => {
            let args = commands::run::RunArgs {
                page,
                target,
                container,
                duration_ms: duration,
                easing,
                offset,
                width,
                interrupt_after_ms: interrupt_after,
                json,
            };
            commands::run::run(&config, args).await
        }
        Commands::Config { init, force } => {
            let path = cli.config.unwrap_or_else(AppConfig::config_path);
            commands::config::run(&config, &path, init, force, &mut std::io::stdout())
        }
        Commands::Easings => commands::easings::run(),
        Commands::Curve { easing, steps } => commands::curve::run(easing, steps),
    }
}
