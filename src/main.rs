use std::sync::Arc;

use moodscape_service::{AppConfig, create_app};
use tokio::net::TcpListener;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Arc::new(AppConfig::from_env());

    tokio::fs::create_dir_all(&config.images_dir).await?;

    let app = create_app(config.clone());
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    let addr = listener.local_addr()?;

    info!("Moodscape service starting on {}", addr);
    info!("Health check endpoint: http://{}/health", addr);
    info!("Generation endpoint: POST http://{}/generate", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
