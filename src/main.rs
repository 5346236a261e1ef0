//! Point d'entrée principal de l'application.
//! Lit la configuration, ouvre la base de données et démarre le serveur web avec Axum.

use std::net::SocketAddr;

use anyhow::Context;
use hospital_desk::{backend, config::AppConfig};
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Charger les variables d'environnement avant le logger, pour RUST_LOG
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();

    let state = backend::AppState::from_config(&config).context("Failed to open database")?;
    let app = backend::router::get_router(state);

    // Démarrer le serveur web
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to open web server listener")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await
        .context("Failed to bind Axum to listener")
}
