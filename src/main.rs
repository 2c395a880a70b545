//! Point d'entrée principal de la partie vérificatrice.
//! Charge la configuration et les bases de données, puis démarre le serveur web avec Axum.

use std::sync::Arc;
use anyhow::{Context, Result};
use authportal::{backend, config::Config, database};
use log::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // Charger la configuration (variables d'environnement et .env)
    let config = Config::from_env().context("Invalid configuration")?;

    // Charger les bases de données
    if let Some(path) = &config.devices_db_path {
        database::device::load(path).context("Failed to load devices")?;
    }
    if let Some(path) = &config.emails_db_path {
        database::email::load(path).context("Failed to load emails")?;
    }

    if !config.secure_cookies {
        warn!("Session cookies are not marked secure");
    }

    let addr = config.bind_address();
    info!("Portal origin is {}", config.app_id());
    let app = backend::router::get_router(Arc::new(config));

    // Démarrer le serveur web
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to open web server listener on {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
        .context("Failed to bind Axum to listener")?;

    Ok(())
}
