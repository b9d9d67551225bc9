use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Instant,
};

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

use tts_core::KokoroLoader;
use tts_server::{build_router, cleanup, config::ServerConfig, handle::PipelineHandle, AppState};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    async_main().await
}

async fn async_main() -> anyhow::Result<()> {
    info!("Starting Kokoro TTS server...");

    let config = ServerConfig::from_env();
    info!(
        "Server configuration loaded: port={}, model_dir={}, lang_code={}, output_dir={}",
        config.port,
        config.kokoro.model_dir.display(),
        config.kokoro.lang_code,
        config.output_dir.display()
    );

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory {}", config.output_dir.display()))?;

    let pipeline = Arc::new(PipelineHandle::new(KokoroLoader::new(config.kokoro.clone())));

    if config.preload {
        info!("Loading Kokoro model...");
        let started = Instant::now();
        pipeline.get_or_load().await?;
        info!("Model warm after {:.2}s", started.elapsed().as_secs_f64());
    } else {
        warn!("KOKORO_PRELOAD disabled, the model will load on the first request");
    }

    match config.output_ttl() {
        Some(ttl) => {
            info!("Sweeping generated audio older than {}s", ttl.as_secs());
            tokio::spawn(cleanup::run_sweeper(config.output_dir.clone(), ttl));
        }
        None => info!("Generated audio files are kept; callers are responsible for deleting them"),
    }

    let port = config.port;
    let app = build_router(AppState::new(pipeline, config));

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different KOKORO_PORT.")
    })?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
