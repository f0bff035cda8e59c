use std::sync::Arc;

use tracing::{info, warn};

use nvgl8r_server::{AppState, Config, PasswordHash, PhotoStore, Relay};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nvgl8r=debug,nvgl8r_server=debug,tower_http=debug".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {:#}", e);
            eprintln!("       Set NVGL8R_PASSWORD (and optionally NVGL8R_RELAY=host:port)");
            eprintln!("       in your environment or .env file and restart.");
            std::process::exit(1);
        }
    };

    tokio::fs::create_dir_all(&config.static_dir).await?;

    let photos = Arc::new(PhotoStore::new(config.photos_dir.clone(), config.max_photos));
    let relay = match &config.relay {
        Some(target) => {
            info!("Will relay photos to {}", target);
            Some(Arc::new(Relay::new(target)?))
        }
        None => {
            photos.init().await?;
            photos.cleanup().await?;
            None
        }
    };
    let relaying = relay.is_some();

    let state = AppState {
        password: Arc::new(PasswordHash::generate(&config.password)),
        photos: photos.clone(),
        relay,
        static_dir: Arc::new(config.static_dir.clone()),
    };
    let app = nvgl8r_server::router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Server started on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    if !relaying {
        photos.cleanup().await?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
