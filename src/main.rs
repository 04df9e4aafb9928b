use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// buttond — three-button Spotify remote for Raspberry Pi
#[derive(Parser)]
#[command(name = "buttond", version, about)]
struct Cli {
    /// Path to the config file (TOML).
    #[arg(short, long, default_value = "/etc/buttond/config.toml")]
    config: PathBuf,

    /// Enable JSON log output (for journald).
    #[arg(long)]
    json: bool,

    /// Validate config and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Init tracing.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("buttond=info"));

    if cli.json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    info!("buttond v{}", env!("CARGO_PKG_VERSION"));

    let config = buttond::config::load(&cli.config)?;

    if cli.check {
        println!(
            "config OK: callback {}, notify {}, buttons {}/{}/{}",
            config.spotify.callback_path(),
            config.notify.target(),
            config.gpio.blue_button,
            config.gpio.red_button,
            config.gpio.green_button,
        );
        return Ok(());
    }

    info!(
        "loaded config: port {}, callback {}",
        config.http.port,
        config.spotify.callback_path()
    );

    buttond::daemon::run(config).await?;

    Ok(())
}
