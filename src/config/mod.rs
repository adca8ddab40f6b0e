mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{HarvesterSettings, LogSettings, Settings, StoreSettings};

/// Loads the configuration from the default file and `RFQ_*` environment
/// variables (e.g. `RFQ_STORE_PATH`, `RFQ_STORE_NAMESPACE`, `RFQ_LOG_LEVEL`).
/// Merges the configuration with default values.
/// Returns a `Settings` struct containing the store, harvester, and log
/// configurations.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::with_prefix("RFQ").separator("_"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        store: StoreSettings {
            path: partial
                .store
                .as_ref()
                .and_then(|s| s.path.clone())
                .unwrap_or(default.store.path),
            namespace: partial
                .store
                .as_ref()
                .and_then(|s| s.namespace.clone())
                .unwrap_or(default.store.namespace),
        },
        harvester: HarvesterSettings {
            interval: partial
                .harvester
                .as_ref()
                .and_then(|h| h.interval)
                .unwrap_or(default.harvester.interval),
        },
        log: LogSettings {
            level: partial
                .log
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.log.level),
        },
    })
}
