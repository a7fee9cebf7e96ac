// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use holdcam::config::{APP_DIR_NAME, Config};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

mod cli;

#[derive(Parser)]
#[command(name = "holdcam")]
#[command(about = "Hold-to-record camera with slide and pinch zoom")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the camera screen in the terminal (default)
    Terminal,

    /// List available capture devices
    List,

    /// Replay a timed gesture script without a terminal
    Simulate {
        /// JSON script of timed input events
        script: PathBuf,

        /// Start with camera and microphone access already granted
        #[arg(short, long)]
        authorized: bool,
    },

    /// Print the active configuration and where it is loaded from
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Terminal));
    init_logging(interactive);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Some(Commands::List) => cli::list_devices(&config),
        Some(Commands::Simulate { script, authorized }) => {
            cli::simulate(config, &script, authorized)
        }
        Some(Commands::Config) => cli::show_config(&config, cli.config.as_deref()),
        Some(Commands::Terminal) | None => holdcam::terminal::run(config),
    }
}

/// Set RUST_LOG to control the log level (default: warn).
/// The terminal UI owns the screen, so it logs to a file instead of stderr.
fn init_logging(interactive: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true);

    if !interactive {
        builder.init();
        return;
    }

    let log_file = dirs::cache_dir().and_then(|dir| {
        let dir = dir.join(APP_DIR_NAME);
        std::fs::create_dir_all(&dir).ok()?;
        File::create(dir.join("holdcam.log")).ok()
    });
    match log_file {
        Some(file) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => builder.with_writer(std::io::sink).init(),
    }
}
