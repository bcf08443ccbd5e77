use std::sync::Arc;

use {
    anyhow::Context,
    clap::Parser,
    secrecy::ExposeSecret,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    kinogram_bot::start_polling,
    kinogram_catalog::CatalogClient,
    kinogram_i18n::Translations,
    kinogram_users::UserStore,
};

#[derive(Parser)]
#[command(name = "kinogram", about = "Kinogram — inline movie search bot for Telegram")]
struct Cli {
    /// Path to the config file (default: kinogram.toml in the working
    /// directory, then the platform config directory).
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "kinogram starting");

    let config = match cli.config {
        Some(ref path) => kinogram_config::load_config(path)
            .with_context(|| format!("load config from {}", path.display()))?,
        None => kinogram_config::discover_and_load(),
    };

    if config.telegram.token.expose_secret().is_empty() {
        anyhow::bail!(
            "no Telegram bot token configured; set [telegram] token in kinogram.toml \
             (`${{VAR}}` placeholders are filled from the environment)"
        );
    }

    // mode=rwc creates the database file on first run.
    let db_url = format!("sqlite:{}?mode=rwc", config.database.path.display());
    let pool = sqlx::SqlitePool::connect(&db_url)
        .await
        .with_context(|| format!("open profile database {}", config.database.path.display()))?;
    kinogram_users::run_migrations(&pool)
        .await
        .context("run database migrations")?;

    let translations = Arc::new(Translations::load().context("load translations")?);
    let catalog = CatalogClient::from_config(&config.catalog);
    let store = UserStore::new(pool);

    let cancel = start_polling(&config.telegram, store, catalog, translations)
        .await
        .context("connect to Telegram")?;

    tokio::signal::ctrl_c().await.context("wait for ctrl-c")?;
    info!("shutting down");
    cancel.cancel();

    Ok(())
}
