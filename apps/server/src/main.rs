//! Playdates server binary.

use std::net::SocketAddr;

use playdate_store::{MemoryStore, SqliteStore};
use server::{config::Config, create_app, create_state, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level);

    tracing::info!(
        timezone = %config.timezone,
        enforce_capacity = config.enforce_capacity,
        "Starting playdates server"
    );

    let addr: SocketAddr = config.server_addr().parse()?;
    let app = match config.database_url.clone() {
        Some(url) => {
            let store = SqliteStore::connect(&url).await?;
            tracing::info!(database_url = %url, "Using SQLite store");
            create_app(create_state(config, store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            create_app(create_state(config, MemoryStore::new()))
        }
    };

    tracing::info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
