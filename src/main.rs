//! Namechef HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use namechef::config::Config;
use namechef::embedding::{EncoderConfig, NameEncoder, TextEmbedder};
use namechef::gateway::{AppState, create_router_with_state};
use namechef::generation::{GeneratorConfig, RecipeGenerator, TextGenerator};
use namechef::matching::{HybridRanker, NameCatalog, NameStore};
use namechef::recipe::{FallbackSource, GuardedPipeline, KeywordFallback};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_PORT: u16 = 8000;

fn main() -> anyhow::Result<()> {
    // Handled before any runtime exists: the probe builds its own.
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check(health_check_port()));
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve())
}

async fn serve() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        "Namechef starting"
    );

    let encoder_config = match &config.embedder_path {
        Some(path) => EncoderConfig::new(path.clone()),
        None => {
            tracing::warn!("No NAMECHEF_EMBEDDER_PATH configured, running encoder in stub mode");
            EncoderConfig::stub()
        }
    };
    let encoder = NameEncoder::load(encoder_config)?;
    tracing::info!(
        model_loaded = encoder.has_model(),
        embedding_dim = encoder.embedding_dim(),
        "Name encoder ready"
    );
    let embedder: Arc<dyn TextEmbedder> = Arc::new(encoder);

    let names = NameStore::new(config.names_path()).load_or_bootstrap()?;
    let catalog = Arc::new(NameCatalog::build(names, embedder.as_ref())?);
    let ranker = Arc::new(HybridRanker::new(catalog, embedder)?);

    let mut generator_config = GeneratorConfig::stub();
    generator_config.base_model_dir = config.base_model_path.clone();
    generator_config.adapter_dir = config.adapter_path.clone();

    let generator = tokio::task::spawn_blocking(move || {
        RecipeGenerator::load_with_fallback(generator_config)
    })
    .await??;
    tracing::info!(tier = %generator.tier(), "Recipe generator ready");
    let generator: Arc<dyn TextGenerator> = Arc::new(generator);

    let fallback: Arc<dyn FallbackSource> = match &config.fallback_recipes_path {
        Some(path) => Arc::new(KeywordFallback::from_file(path)?),
        None => Arc::new(KeywordFallback::builtin()),
    };

    let pipeline = Arc::new(GuardedPipeline::new(generator, fallback));

    let state = AppState::new(ranker, pipeline)
        .with_request_timeout(config.request_timeout)
        .with_default_top_k(config.default_top_k);

    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Namechef shutdown complete");
    Ok(())
}

fn health_check_port() -> u16 {
    std::env::var("NAMECHEF_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Probes `/health` on localhost; `0` when healthy, `1` otherwise.
///
/// Must be called outside a Tokio runtime.
fn run_health_check(port: u16) -> i32 {
    let url = format!("http://127.0.0.1:{}/health", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};
    use std::sync::mpsc;

    fn spawn_health_server() -> u16 {
        let (port_tx, port_rx) = mpsc::channel();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                port_tx.send(listener.local_addr().unwrap().port()).unwrap();
                let app = Router::new().route("/health", get(namechef::gateway::health_handler));
                axum::serve(listener, app).await.unwrap();
            });
        });

        port_rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_health_check_reports_healthy_server() {
        let port = spawn_health_server();
        assert_eq!(run_health_check(port), 0);
    }

    #[test]
    fn test_health_check_fails_without_server() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        assert_eq!(run_health_check(port), 1);
    }

    #[test]
    #[serial_test::serial]
    fn test_health_check_port_from_env() {
        // SAFETY: Test code only, we accept the thread-safety risk in tests.
        unsafe { std::env::set_var("NAMECHEF_PORT", "18081") };
        assert_eq!(health_check_port(), 18081);

        unsafe { std::env::set_var("NAMECHEF_PORT", "not-a-port") };
        assert_eq!(health_check_port(), DEFAULT_PORT);

        unsafe { std::env::remove_var("NAMECHEF_PORT") };
        assert_eq!(health_check_port(), DEFAULT_PORT);
    }
}
