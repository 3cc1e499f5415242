//! Remitdesk main entry point

use clap::Parser;
use remitdesk_client::HttpBackend;
use remitdesk_config::{Config, ConfigError};
use remitdesk_core::{Command, Controller};
use remitdesk_web::start_server;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "remitdesk")]
#[command(version = "0.1.0")]
#[command(about = "Operator console for vendor payment management", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.print_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, missing) = match Config::load(&args.config) {
        Ok(config) => (config, None),
        Err(e @ ConfigError::FileNotFound { .. }) => (Config::default(), Some(e)),
        Err(e) => {
            eprintln!("{}", e.report());
            return Err(e.into());
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();

    if let Some(e) = missing {
        log::warn!("{}; using defaults", e.report());
    } else {
        log::info!("Config loaded from {}", args.config.display());
    }

    let backend = Arc::new(HttpBackend::new(&config.backend.base_url, config.request_timeout())?);

    let rt = Runtime::new()?;
    rt.block_on(async {
        let controller = Arc::new(Controller::new(backend, &config));

        // The console still starts when the backend is down; the failure shows as a notice.
        let outcome = controller.dispatch(Command::Initialize).await;
        if let Some(notice) = &outcome.notice {
            log::warn!("Initial load: {}", notice.message);
        }

        start_server(config, controller).await
    })
}
