//! voxsub daemon: REST API over the text -> audio -> subtitle pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use voxsub_core::{ProcessRunner, ServiceConfig, SynthesisClient};
use voxsub_daemon::{build_app, AppState};

fn load_config() -> anyhow::Result<ServiceConfig> {
    let explicit = std::env::var("VOXSUB_CONFIG").ok();
    let path = PathBuf::from(explicit.as_deref().unwrap_or("voxsub.toml"));
    let mut config = if path.exists() {
        ServiceConfig::load_path(&path)?
    } else if explicit.is_some() {
        anyhow::bail!("config file {} not found", path.display());
    } else {
        tracing::info!("no voxsub.toml found, using defaults");
        ServiceConfig::default()
    };
    config.apply_env(|k| std::env::var(k).ok())?;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;
    if config.tts.token.is_empty() || config.tts.appid.is_empty() {
        tracing::warn!("tts.appid/tts.token not set; synthesis requests will be rejected upstream");
    }
    std::fs::create_dir_all(&config.storage.upload_root)?;
    std::fs::create_dir_all(&config.storage.output_root)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let synthesizer = SynthesisClient::new(config.tts.clone())?;
    let app = build_app(AppState::new(
        config,
        Arc::new(synthesizer),
        Arc::new(ProcessRunner),
    ));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("voxsub daemon listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
