//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults. The whole struct is passed into the server at
//! construction, so several independent instances can coexist.

use std::env;
use std::path::PathBuf;

/// Default maximum accepted request body for uploads (32 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Storage directory configuration
    pub storage: StorageConfig,
    /// TLS certificate configuration
    pub tls: TlsConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Flat directory holding every stored file
    pub dir: PathBuf,
    /// Name of the multipart field carrying an uploaded file
    pub field_name: String,
    /// Request body limit applied to uploads
    pub max_upload_bytes: usize,
}

/// TLS configuration
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// PEM certificate chain
    pub cert_path: PathBuf,
    /// PEM private key
    pub key_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 3000,
                host: "0.0.0.0".to_string(),
            },
            storage: StorageConfig {
                dir: PathBuf::from("./files"),
                field_name: "file".to_string(),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            tls: TlsConfig {
                cert_path: PathBuf::from("/etc/ssl/certs/ssl.crt"),
                key_path: PathBuf::from("/etc/ssl/certs/ssl.key"),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.server.port),
                host: env::var("HOST").unwrap_or(defaults.server.host),
            },
            storage: StorageConfig {
                dir: env::var_os("STORAGE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.dir),
                field_name: env::var("UPLOAD_FIELD").unwrap_or(defaults.storage.field_name),
                max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(defaults.storage.max_upload_bytes),
            },
            tls: TlsConfig {
                cert_path: env::var_os("TLS_CERT")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.tls.cert_path),
                key_path: env::var_os("TLS_KEY")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.tls.key_path),
            },
        }
    }

    /// Default configuration rooted at the given storage directory
    pub fn for_storage_dir(dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.storage.dir = dir.into();
        config
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 7] = [
        "PORT",
        "HOST",
        "STORAGE_DIR",
        "UPLOAD_FIELD",
        "MAX_UPLOAD_BYTES",
        "TLS_CERT",
        "TLS_KEY",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.dir, PathBuf::from("./files"));
        assert_eq!(config.storage.field_name, "file");
        assert_eq!(config.storage.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.tls.cert_path, PathBuf::from("/etc/ssl/certs/ssl.crt"));
        assert_eq!(config.tls.key_path, PathBuf::from("/etc/ssl/certs/ssl.key"));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var("PORT", "8443");
        env::set_var("HOST", "127.0.0.1");
        env::set_var("STORAGE_DIR", "/srv/files");
        env::set_var("UPLOAD_FIELD", "upload");
        env::set_var("TLS_CERT", "/tmp/cert.pem");
        env::set_var("TLS_KEY", "/tmp/key.pem");

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.server_addr(), "127.0.0.1:8443");
        assert_eq!(config.storage.dir, PathBuf::from("/srv/files"));
        assert_eq!(config.storage.field_name, "upload");
        assert_eq!(config.tls.cert_path, PathBuf::from("/tmp/cert.pem"));
        assert_eq!(config.tls.key_path, PathBuf::from("/tmp/key.pem"));
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_numbers_fall_back() {
        clear_env();
        env::set_var("PORT", "not-a-port");
        env::set_var("MAX_UPLOAD_BYTES", "-1");

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_for_storage_dir() {
        let config = Config::for_storage_dir("/data/store");
        assert_eq!(config.storage.dir, PathBuf::from("/data/store"));
        assert_eq!(config.storage.field_name, "file");
    }
}
