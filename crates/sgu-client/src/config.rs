//! Endpoint configuration.
//!
//! Configuration is externally owned: the core reads the address at connect
//! time and writes the access key back when the service issues one. The file
//! format matches the original host config (`address` / `accessKey`), so an
//! existing config carries over unchanged.

use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ClientError;

/// Default service address.
pub const DEFAULT_ADDRESS: &str = "ws://127.0.0.1:9001";

/// Persisted endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointConfig {
    /// WebSocket address of the service.
    pub address: String,
    /// Access key issued by the service, if one has been received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            access_key: None,
        }
    }
}

/// Read/write access to the externally owned configuration.
pub trait ConfigStore: Send + Sync {
    /// The currently configured service address.
    fn address(&self) -> String;

    /// The stored access key, if any.
    fn access_key(&self) -> Option<String>;

    /// Persist a new access key, overwriting any prior one.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be persisted.
    fn set_access_key(&self, key: &str) -> Result<(), ClientError>;
}

/// JSON-file-backed config store.
///
/// Reads go back to disk so address changes made outside the process are
/// picked up by the next connect; the cached copy is the fallback when the
/// file is unreadable.
pub struct FileConfigStore {
    path: PathBuf,
    cached: Mutex<EndpointConfig>,
}

impl FileConfigStore {
    /// Open a store at the given path. A missing file yields defaults.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let store = Self {
            cached: Mutex::new(EndpointConfig::default()),
            path,
        };
        let initial = store.read_disk(&EndpointConfig::default());
        *store.cached.lock() = initial;
        store
    }

    fn read_disk(&self, fallback: &EndpointConfig) -> EndpointConfig {
        match fs::read_to_string(&self.path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Malformed config file");
                    fallback.clone()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => EndpointConfig::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unreadable config file");
                fallback.clone()
            }
        }
    }

    fn refresh(&self) -> EndpointConfig {
        let mut cached = self.cached.lock();
        let fallback = cached.clone();
        *cached = self.read_disk(&fallback);
        cached.clone()
    }
}

impl ConfigStore for FileConfigStore {
    fn address(&self) -> String {
        self.refresh().address
    }

    fn access_key(&self) -> Option<String> {
        self.refresh().access_key
    }

    fn set_access_key(&self, key: &str) -> Result<(), ClientError> {
        let mut cached = self.cached.lock();
        let mut config = self.read_disk(&cached.clone());
        config.access_key = Some(key.to_string());
        let text = serde_json::to_string_pretty(&config)
            .map_err(|e| ClientError::Config(format!("cannot serialize config: {e}")))?;
        fs::write(&self.path, text)?;
        *cached = config;
        Ok(())
    }
}

/// In-memory config store for embedding hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Mutex<EndpointConfig>,
}

impl MemoryConfigStore {
    /// Create a store with the given address and no access key.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            config: Mutex::new(EndpointConfig {
                address: address.into(),
                access_key: None,
            }),
        }
    }

    /// Change the configured address.
    pub fn set_address(&self, address: impl Into<String>) {
        self.config.lock().address = address.into();
    }
}

impl ConfigStore for MemoryConfigStore {
    fn address(&self) -> String {
        self.config.lock().address.clone()
    }

    fn access_key(&self) -> Option<String> {
        self.config.lock().access_key.clone()
    }

    fn set_access_key(&self, key: &str) -> Result<(), ClientError> {
        self.config.lock().access_key = Some(key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EndpointConfig::default();
        assert_eq!(config.address, "ws://127.0.0.1:9001");
        assert_eq!(config.access_key, None);
    }

    #[test]
    fn config_round_trips_camel_case() {
        let config = EndpointConfig {
            address: "ws://example.com:9001".into(),
            access_key: Some("abc123".into()),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"accessKey\":\"abc123\""));
        let parsed: EndpointConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_key_omitted_on_disk() {
        let json = serde_json::to_string(&EndpointConfig::default()).unwrap();
        assert!(!json.contains("accessKey"));
    }

    #[test]
    fn file_store_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("sgu.json"));
        assert_eq!(store.address(), DEFAULT_ADDRESS);
        assert_eq!(store.access_key(), None);
    }

    #[test]
    fn file_store_persists_access_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sgu.json");
        let store = FileConfigStore::new(&path);
        store.set_access_key("abc123").unwrap();
        assert_eq!(store.access_key(), Some("abc123".into()));

        // A fresh store sees the persisted key.
        let reopened = FileConfigStore::new(&path);
        assert_eq!(reopened.access_key(), Some("abc123".into()));
    }

    #[test]
    fn file_store_sees_external_address_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sgu.json");
        let store = FileConfigStore::new(&path);
        fs::write(&path, r#"{"address":"ws://other:9001"}"#).unwrap();
        assert_eq!(store.address(), "ws://other:9001");
    }

    #[test]
    fn file_store_overwrite_keeps_address() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sgu.json");
        fs::write(&path, r#"{"address":"ws://other:9001","accessKey":"old"}"#).unwrap();
        let store = FileConfigStore::new(&path);
        store.set_access_key("new").unwrap();
        assert_eq!(store.address(), "ws://other:9001");
        assert_eq!(store.access_key(), Some("new".into()));
    }

    #[test]
    fn memory_store_set_address() {
        let store = MemoryConfigStore::new("ws://a:1");
        store.set_address("ws://b:2");
        assert_eq!(store.address(), "ws://b:2");
    }
}
