//! Admin UI configuration model.
//!
//! The site crate parses `admin.config.toml` at build time and embeds the validated result as
//! JSON; every field has a default so partial files (or `{}`) stay valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Runtime configuration shared by the binder and page modules.
pub struct AdminConfig {
    /// Control-channel URL. Empty derives `ws(s)://<host>/ajaxws` from the page origin.
    pub socket_url: String,
    /// Fixed delay before reconnecting a closed control channel.
    pub reconnect_interval_ms: u64,
    /// Multipart upload endpoint.
    pub upload_endpoint: String,
    /// Case-insensitive parent-path prefix of files included in zip backups.
    pub backup_prefix: String,
    /// File name offered for zip backups.
    pub backup_archive_name: String,
    /// Directory that receives saved form JSON files.
    pub config_dir: String,
    /// Lifetime of a success notice.
    pub notice_success_ms: u64,
    /// Lifetime of an error notice.
    pub notice_error_ms: u64,
    /// Lifetime of the highlight flag on reactive nodes.
    pub highlight_ms: u64,
    /// Form control id prefixes serialized as integers.
    pub numeric_id_prefixes: Vec<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            socket_url: String::new(),
            reconnect_interval_ms: 5_000,
            upload_endpoint: "/doUpload".to_string(),
            backup_prefix: "/config".to_string(),
            backup_archive_name: "backup.zip".to_string(),
            config_dir: "/config".to_string(),
            notice_success_ms: 2_000,
            notice_error_ms: 5_000,
            highlight_ms: 1_000,
            numeric_id_prefixes: vec![
                "Alle".to_string(),
                "GpioPin".to_string(),
                "AnalogPin".to_string(),
            ],
        }
    }
}

impl AdminConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed or fails [`AdminConfig::validate`].
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let config: Self = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if !self.upload_endpoint.starts_with('/') {
            return Err(format!(
                "upload_endpoint must be an absolute path, found `{}`",
                self.upload_endpoint
            ));
        }
        if !self.backup_prefix.starts_with('/') {
            return Err(format!(
                "backup_prefix must start with `/`, found `{}`",
                self.backup_prefix
            ));
        }
        if !self.config_dir.starts_with('/') {
            return Err(format!(
                "config_dir must start with `/`, found `{}`",
                self.config_dir
            ));
        }
        if self.backup_archive_name.trim().is_empty() {
            return Err("backup_archive_name must not be empty".to_string());
        }
        if self.reconnect_interval_ms == 0 {
            return Err("reconnect_interval_ms must be greater than zero".to_string());
        }
        Ok(())
    }

    /// How long a notice stays visible, by outcome.
    pub fn notice_lifetime(&self, ok: bool) -> Duration {
        Duration::from_millis(if ok {
            self.notice_success_ms
        } else {
            self.notice_error_ms
        })
    }

    /// How long a highlight flag stays on a node.
    pub fn highlight_lifetime(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }

    /// Resolves the control-channel URL against the page origin (`http://host` → `ws://host/ajaxws`).
    pub fn resolve_socket_url(&self, page_origin: &str) -> String {
        if !self.socket_url.is_empty() {
            return self.socket_url.clone();
        }
        let origin = page_origin.trim_end_matches('/');
        let ws_origin = if let Some(rest) = origin.strip_prefix("https") {
            format!("wss{rest}")
        } else if let Some(rest) = origin.strip_prefix("http") {
            format!("ws{rest}")
        } else {
            origin.to_string()
        };
        format!("{ws_origin}/ajaxws")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AdminConfig::from_json("{}").expect("parse");
        assert_eq!(config, AdminConfig::default());
        assert_eq!(config.notice_lifetime(true), Duration::from_secs(2));
        assert_eq!(config.notice_lifetime(false), Duration::from_secs(5));
        assert_eq!(config.highlight_lifetime(), Duration::from_secs(1));
    }

    #[test]
    fn validation_rejects_relative_paths() {
        let err = AdminConfig::from_json(r#"{"backup_prefix":"config"}"#).expect_err("invalid");
        assert!(err.contains("backup_prefix"));
        let err = AdminConfig::from_json(r#"{"reconnect_interval_ms":0}"#).expect_err("invalid");
        assert!(err.contains("reconnect_interval_ms"));
    }

    #[test]
    fn socket_url_is_derived_from_page_origin() {
        let config = AdminConfig::default();
        assert_eq!(
            config.resolve_socket_url("http://192.168.10.253"),
            "ws://192.168.10.253/ajaxws"
        );
        assert_eq!(
            config.resolve_socket_url("https://device.local/"),
            "wss://device.local/ajaxws"
        );

        let pinned = AdminConfig {
            socket_url: "ws://10.0.0.2/ajaxws".to_string(),
            ..AdminConfig::default()
        };
        assert_eq!(pinned.resolve_socket_url("http://other"), "ws://10.0.0.2/ajaxws");
    }
}
