// src/main.rs
// Query runner - keeps saved queries cached and tells subscribers when they change

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use query_runner::config::EnvConfig;
use query_runner::frontend::FrontendClient;
use query_runner::notify::{Dispatcher, SearchLinks, SlackNotifier};
use query_runner::saved_query::SavedQueryCache;
use query_runner::web::{self, state::AppState};
use std::future::IntoFuture;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "query-runner")]
#[command(about = "Saved query cache and subscription notifier")]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "QUERY_RUNNER_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve frontend callbacks (default)
    Serve {
        /// Listen address, overrides QUERY_RUNNER_ADDR
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Validate environment configuration and exit
    CheckConfig,
}

async fn run_server(mut config: EnvConfig, addr: Option<String>) -> Result<()> {
    if let Some(addr) = addr {
        config.addr = addr;
    }

    let validation = config.validate();
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    validation.into_result()?;

    let client = query_runner::http::create_shared_client();
    let frontend = Arc::new(FrontendClient::new(&config.frontend_url, client.clone()));
    let chat = Arc::new(SlackNotifier::new(client));

    let dispatcher = Arc::new(Dispatcher::new(
        frontend.clone(),
        frontend.clone(),
        chat,
        SearchLinks::new(&config.external_url),
    ));
    let cache = Arc::new(SavedQueryCache::with_retry_delay(config.load_retry_delay));

    // Callbacks queue behind the initial load
    let loader = cache.spawn_bulk_load(frontend.clone());

    let state = AppState::new(cache, frontend, dispatcher)
        .with_notifications_disabled(config.notifications_disabled);
    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!(
        addr = %config.addr,
        frontend = %config.frontend_url,
        "query runner listening"
    );

    let server = axum::serve(listener, app).into_future();

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    if !loader.is_finished() {
        loader.abort();
    }
    Ok(())
}

fn check_config(config: &EnvConfig) -> Result<()> {
    let validation = config.validate();
    println!("{}", validation.report());
    if !validation.is_valid() {
        bail!("configuration has errors");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv(); // Load .env from current directory

    let cli = Cli::parse();

    let log_level = cli.log_level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = EnvConfig::load();

    match cli.command {
        None => run_server(config, None).await?,
        Some(Commands::Serve { addr }) => run_server(config, addr).await?,
        Some(Commands::CheckConfig) => check_config(&config)?,
    }

    Ok(())
}
