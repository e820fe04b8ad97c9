use std::sync::Arc;

use clap::Parser;
use ideate_core::{
    CompletionClient, IdeateConfig, MemorySessionStore, OpenAiCompletionClient, PgSessionStore,
    SessionStore, StoreBackend,
};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use ideate_server::http::{self, HttpState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "ideate.toml")]
    config: String,

    #[arg(long)]
    health: bool,
}

async fn create_store(config: &IdeateConfig) -> anyhow::Result<Arc<dyn SessionStore>> {
    match config.database.backend {
        StoreBackend::Postgres => {
            let pool = ideate_core::db::create_pool(&config.database).await?;
            ideate_core::db::init_schema(&pool).await?;
            Ok(Arc::new(PgSessionStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory session store; saved sessions are lost on exit");
            Ok(Arc::new(MemorySessionStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience - production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match IdeateConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging
    let default_level = config
        .service
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .init();

    // Connect to the session store
    let store = match create_store(&config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize session store: {}", e);
            std::process::exit(1);
        }
    };

    if args.health {
        match store.health().await {
            Ok(v) => println!("✅ Session store ({}) connected: {}", store.name(), v),
            Err(e) => {
                println!("❌ Session store connection failed: {}", e);
                std::process::exit(1);
            }
        }

        println!("✅ Ideate health check passed");
        return Ok(());
    }

    let completion: Arc<dyn CompletionClient> =
        match OpenAiCompletionClient::new(&config.completion) {
            Ok(c) => {
                tracing::info!(model = c.model(), "Completion client ready");
                Arc::new(c)
            }
            Err(e) => {
                eprintln!("Failed to create completion client: {}", e);
                std::process::exit(1);
            }
        };

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let state = Arc::new(HttpState { completion, store });
    http::start_http_server(state, &config, tx.subscribe()).await?;

    Ok(())
}
