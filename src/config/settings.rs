use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for the backing store, the harvester, and logging.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub store: StoreSettings,
    pub harvester: HarvesterSettings,
    pub log: LogSettings,
}

/// Configuration settings for the backing store.
///
/// `path` is where the sled database lives on disk; `namespace` prefixes
/// every key the queue writes, so multiple deployments can share a store.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub path: String,
    pub namespace: String,
}

/// Configuration settings for the harvester's watch mode.
///
/// `interval` is the sweep period in seconds.
#[derive(Debug, Deserialize, Clone)]
pub struct HarvesterSettings {
    pub interval: u64,
}

/// Logging configuration; `level` is a tracing level name.
#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub store: Option<PartialStoreSettings>,
    pub harvester: Option<PartialHarvesterSettings>,
    pub log: Option<PartialLogSettings>,
}

/// Partial store settings.
///
/// Used when loading store configuration from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialStoreSettings {
    pub path: Option<String>,
    pub namespace: Option<String>,
}

/// Partial harvester settings.
#[derive(Debug, Deserialize)]
pub struct PartialHarvesterSettings {
    pub interval: Option<u64>,
}

/// Partial logging settings.
#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            store: StoreSettings {
                path: "rfq_db".to_string(),
                namespace: "rfq".to_string(),
            },
            harvester: HarvesterSettings { interval: 60 },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}
