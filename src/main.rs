mod api;
mod config;
mod detect;
mod error;
mod location;
mod logging;
mod models;
mod sim;
mod tui;

use api::ApiClient;
use clap::{Parser, Subcommand};
use error::{Error, Result};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agribot")]
#[command(version, about = "AgriBot: terminal dashboard for farm bots, soil sensors and field news", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the dashboard (default)
    Tui {
        /// Page to open: dashboard, notifications, agriculture-news,
        /// bot-location, soil-sensor, animal-detection
        #[arg(long)]
        page: Option<String>,
    },
    /// Validate the local environment and backend reachability
    Doctor,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Run animal-threat detection on an image file
    Detect {
        /// Path to a PNG, JPG, GIF, WEBP or BMP image
        image: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show config file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write a default config file if none exists
    Init,
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(Error::Io)
}

fn doctor() -> Result<()> {
    println!("Doctor: Validating environment...");

    let file = config::config_file_path()?;
    let cfg = config::load_config()?;
    println!("  ✓ Config loaded ({})", file.display());
    println!("  ✓ Logs: {}", logging::log_directory().display());

    let client = ApiClient::new(&cfg)?;
    let rt = runtime()?;
    match rt.block_on(client.ping()) {
        Ok(()) => println!("  ✓ Backend reachable at {}", client.base_url()),
        Err(e) => println!("  ✗ Backend at {}: {}", client.base_url(), e),
    }

    match rt.block_on(location::locate(cfg.location.clone())) {
        Ok(at) => println!("  ✓ Location {:.4}, {:.4}", at.lat, at.lng),
        Err(e) => println!("  - {}", Error::from(e)),
    }
    Ok(())
}

fn detect_image(image: PathBuf) -> Result<()> {
    let cfg = config::load_config()?;
    let data_url = detect::encode_image_file(&image)?;
    let client = ApiClient::new(&cfg)?;
    let rt = runtime()?;

    tracing::info!("detecting animals in {}", image.display());
    let outcome = match rt.block_on(client.detect_animal(&data_url)) {
        Ok(body) => detect::interpret(&body),
        Err(e) => detect::failure(&e),
    };

    println!("{}", outcome.headline());
    match &outcome {
        detect::Outcome::Threat {
            animal,
            confidence,
            message,
        } => {
            println!("  Animal: {}", animal);
            if let Some(c) = confidence {
                println!("  Confidence: {}", c);
            }
            if !message.is_empty() {
                println!("  {}", message);
            }
        }
        detect::Outcome::Clear { message } => println!("  {}", message),
        detect::Outcome::Failed { message } => return Err(Error::Backend(message.clone())),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => {
            let cfg = config::load_config()?;
            tui::run_tui(&runtime()?, cfg, None)
        }
        Some(Commands::Tui { page }) => {
            let cfg = config::load_config()?;
            let page = page.as_deref().map(tui::Page::from_str);
            tui::run_tui(&runtime()?, cfg, page)
        }
        Some(Commands::Doctor) => doctor(),
        Some(Commands::Config { cmd }) => match cmd {
            ConfigCommands::Path => {
                println!("{}", config::config_file_path()?.display());
                Ok(())
            }
            ConfigCommands::Show => {
                let cfg = config::load_config()?;
                let text = toml::to_string_pretty(&cfg)
                    .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
                print!("{}", text);
                Ok(())
            }
            ConfigCommands::Init => {
                let file = config::config_file_path()?;
                if file.exists() {
                    println!("Config already exists: {}", file.display());
                } else {
                    config::save_config(&config::AgribotConfig::default())?;
                    println!("Wrote {}", file.display());
                }
                Ok(())
            }
        },
        Some(Commands::Detect { image }) => detect_image(image),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Warning: file logging disabled: {}", e);
    }

    if let Err(e) = run(cli) {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
