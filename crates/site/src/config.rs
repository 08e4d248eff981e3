//! Build-time embedded admin configuration.

use admin_host::AdminConfig;
use leptos::logging::error;

include!(concat!(env!("OUT_DIR"), "/admin_config_generated.rs"));

/// Parses the embedded configuration, falling back to defaults when it is rejected.
pub fn load_config() -> AdminConfig {
    match AdminConfig::from_json(ADMIN_CONFIG_JSON) {
        Ok(config) => config,
        Err(err) => {
            error!("embedded admin config rejected, using defaults: {err}");
            AdminConfig::default()
        }
    }
}
