//! Test server harness.

use namechef::embedding::{NameEncoder, TextEmbedder};
use namechef::gateway::{AppState, create_router_with_state};
use namechef::generation::MockGenerator;
use namechef::matching::{HybridRanker, NameCatalog, NameStore};
use namechef::recipe::{GuardedPipeline, KeywordFallback};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub port: u16,
    /// Data directory holding `names.json`; a fresh temp dir (bootstrapped with the default
    /// names) when `None`.
    pub data_dir: Option<PathBuf>,
    pub generator: MockGenerator,
    pub fallback_recipes: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            data_dir: None,
            generator: MockGenerator::echo(),
            fallback_recipes: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl TestServerConfig {
    pub fn with_generator(mut self, generator: MockGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub data_dir: PathBuf,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: Option<TempDir>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn find_available_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok(addr.port())
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns a server with the stub encoder, a scripted generator and a temp data directory.
///
/// Startup follows the binary: bootstrap or read `names.json`, embed the catalog, then wire
/// the pipeline and router.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let port = if config.port == 0 {
        find_available_port().await?
    } else {
        config.port
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let (data_dir, _temp_dir) = if let Some(path) = config.data_dir {
        (path, None)
    } else {
        let temp_dir =
            TempDir::new().map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
        (temp_dir.path().to_path_buf(), Some(temp_dir))
    };

    let embedder: Arc<dyn TextEmbedder> = Arc::new(
        NameEncoder::stub().map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?,
    );

    let names = NameStore::new(data_dir.join("names.json"))
        .load_or_bootstrap()
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let catalog = NameCatalog::build(names, embedder.as_ref())
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let ranker = HybridRanker::new(Arc::new(catalog), embedder)
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let fallback = match &config.fallback_recipes {
        Some(path) => KeywordFallback::from_file(path)
            .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?,
        None => KeywordFallback::builtin(),
    };

    let pipeline = GuardedPipeline::new(Arc::new(config.generator), Arc::new(fallback));

    let state = AppState::new(Arc::new(ranker), Arc::new(pipeline))
        .with_request_timeout(config.request_timeout);

    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        data_dir,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_available_port() {
        let port = find_available_port()
            .await
            .expect("Should find available port");
        assert!(port > 0);
    }

    #[test]
    fn test_server_config_defaults() {
        let config = TestServerConfig::default();
        assert_eq!(config.port, 0);
        assert!(config.data_dir.is_none());
    }
}
