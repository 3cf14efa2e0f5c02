mod commands;
mod wiring;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

use iris_config::{config_dir, config_file_path, load_checked};
use iris_logging::init_logger;

#[derive(Parser)]
#[command(name = "iris")]
#[command(about = "Iris: scene descriptions and read-aloud for camera images")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.iris/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Describe the scene in an image
    Describe {
        /// A .jpg, .jpeg or .png file
        image: PathBuf,
    },
    /// Read the text in an image aloud
    Speak {
        /// A .jpg, .jpeg or .png file
        image: PathBuf,
        /// Where to write the synthesized audio
        #[arg(short, long, default_value = "speech.mp3")]
        out: PathBuf,
    },
    /// Print the effective configuration with secrets masked
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = cli
        .config
        .unwrap_or_else(|| config_file_path(&config_dir()));
    let (mut config, warnings) = load_checked(&path, &std::env::vars().collect()).await?;

    let _guard = init_logger(config.log_dir().map(std::path::Path::new), config.log_level());
    for warning in &warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.get_or_insert_with(Default::default).port = Some(port);
            }
            commands::serve(&config).await?;
        }
        Commands::Describe { image } => commands::describe(&config, &image).await?,
        Commands::Speak { image, out } => commands::speak(&config, &image, &out).await?,
        Commands::Config => commands::show_config(&config)?,
    }

    Ok(())
}
