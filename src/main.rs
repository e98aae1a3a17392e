use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use discipline_os::application::NotificationCenter;
use discipline_os::infrastructure::{AppConfig, PostgrestClient, StorageManager};
use discipline_os::presentation::{App, Cli, Command};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn create_app() -> Result<(App, Command)> {
    let cli = Cli::parse();

    let storage = StorageManager::new()?;
    let mut config = storage.load_config(cli.args.config.as_deref())?;
    config.merge_with_args(cli.args);

    init_logging(&config)?;

    info!(name = discipline_os::NAME, version = discipline_os::VERSION, "Starting Discipline OS");

    let store = Arc::new(PostgrestClient::from_config(&config.store)?);
    let notifications = if config.notifications.enabled {
        NotificationCenter::new(config.notifications.duration())
    } else {
        NotificationCenter::disabled()
    };

    Ok((App::new(store, Arc::new(notifications)), cli.command))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let (app, command) = create_app()?;

    let mut stdout = std::io::stdout().lock();
    app.run(command, &mut stdout).await?;

    Ok(())
}
