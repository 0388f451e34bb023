//! HTTPS server startup and runtime
//!
//! Handles:
//! - Storage directory creation
//! - TLS certificate loading
//! - Listener binding
//! - Graceful shutdown
//!
//! Any failure here is fatal; the server never starts in a degraded mode.

use crate::api::create_router;
use crate::config::{Config, TlsConfig};
use crate::services::files::FileStore;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use std::future::Future;
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Grace period for in-flight requests once a shutdown signal arrives
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Fatal startup and runtime errors
#[derive(Error, Debug)]
pub enum ServerError {
    /// Storage directory could not be created
    #[error("Failed to create storage directory {path:?}: {source}")]
    StorageDir {
        /// Configured storage directory
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Certificate or key could not be loaded
    #[error("Cannot load TLS certificate from cert={cert:?}, key={key:?}: {source}")]
    Tls {
        /// Certificate path
        cert: PathBuf,
        /// Private key path
        key: PathBuf,
        /// Underlying I/O or parse error
        source: std::io::Error,
    },

    /// Configured host/port is not a socket address
    #[error("Invalid server address {0}: {1}")]
    InvalidAddress(String, std::net::AddrParseError),

    /// Listener could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested
        addr: SocketAddr,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Server stopped with an I/O error
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Loads the PEM certificate/key pair used to terminate TLS
pub async fn load_tls(tls: &TlsConfig) -> Result<RustlsConfig, ServerError> {
    info!("Loading TLS certificate from {:?}", tls.cert_path);
    info!("Loading TLS private key from {:?}", tls.key_path);

    RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .map_err(|source| ServerError::Tls {
            cert: tls.cert_path.clone(),
            key: tls.key_path.clone(),
            source,
        })
}

/// Binds the TCP listener the HTTPS server accepts on
pub fn bind_listener(addr: &str) -> Result<TcpListener, ServerError> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| ServerError::InvalidAddress(addr.to_string(), e))?;

    let listener = TcpListener::bind(addr).map_err(|source| ServerError::Bind { addr, source })?;
    listener
        .set_nonblocking(true)
        .map_err(|source| ServerError::Bind { addr, source })?;
    Ok(listener)
}

/// Runs the file store over HTTPS until a shutdown signal arrives
pub async fn run(config: Config) -> Result<(), ServerError> {
    let store = FileStore::new(config.storage.dir.clone());
    store
        .ensure_dir()
        .await
        .map_err(|source| ServerError::StorageDir {
            path: config.storage.dir.clone(),
            source,
        })?;
    info!("Storage directory: {}", store.dir().display());

    let tls = load_tls(&config.tls).await?;
    info!("TLS configured successfully");

    let listener = bind_listener(&config.server_addr())?;
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on https://{}", addr);
    }

    serve_with_shutdown(
        listener,
        tls,
        create_router(&config),
        Handle::new(),
        shutdown_signal(),
    )
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Serves `app` over TLS on an already bound listener
pub async fn serve(
    listener: TcpListener,
    tls: RustlsConfig,
    app: Router,
    handle: Handle,
) -> Result<(), ServerError> {
    axum_server::tls_rustls::from_tcp_rustls(listener, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .map_err(ServerError::Serve)
}

/// Serves `app` until `signal` resolves, then shuts down gracefully
///
/// The signal watcher is aborted once the server stops, whichever way it
/// stopped.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    tls: RustlsConfig,
    app: Router,
    handle: Handle,
    signal: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let shutdown_handle = handle.clone();
    let signal_task = tokio::spawn(async move {
        signal.await;
        shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    let result = serve(listener, tls, app, handle).await;
    signal_task.abort();
    result
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
