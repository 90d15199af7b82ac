use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration file. Every section is optional and defaulted.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub drafts: DraftsConfig,
    pub geocoding: GeocodingConfig,
    pub storage: StorageConfig,
    pub offers: OffersConfig,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token required on API calls. `$VAR` references are resolved.
    pub api_token: Option<String>,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            api_token: None,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("./data/roofdesk.db") }
    }
}

/// Longest accepted draft lifetime (one year).
pub const MAX_DRAFT_EXPIRY_HOURS: u64 = 24 * 366;

/// Longest accepted offer validity (ten years).
pub const MAX_OFFER_VALIDITY_DAYS: i64 = 3660;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DraftsConfig {
    pub directory: PathBuf,
    pub autosave_debounce_ms: u64,
    pub expiry_hours: u64,
}

impl Default for DraftsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./data/drafts"),
            autosave_debounce_ms: 3000,
            expiry_hours: 24,
        }
    }
}

impl DraftsConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    /// Draft lifetime, capped at [`MAX_DRAFT_EXPIRY_HOURS`].
    pub fn ttl(&self) -> chrono::Duration {
        let hours = self.expiry_hours.min(MAX_DRAFT_EXPIRY_HOURS);
        chrono::Duration::hours(hours as i64)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
    pub debounce_ms: u64,
    pub min_query_len: usize,
    pub limit: usize,
    /// Comma-separated ISO country codes to restrict results, e.g. `dk`.
    pub country_codes: Option<String>,
    pub api_key: Option<String>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".into(),
            user_agent: concat!("roofdesk/", env!("CARGO_PKG_VERSION")).into(),
            timeout_ms: 5000,
            debounce_ms: 300,
            min_query_len: 3,
            limit: 5,
            country_codes: Some("dk".into()),
            api_key: None,
        }
    }
}

impl GeocodingConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./data/objects"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OffersConfig {
    /// Fraction, e.g. `0.25` for 25% VAT.
    pub vat_rate: f64,
    pub validity_days: i64,
    pub currency: String,
}

impl Default for OffersConfig {
    fn default() -> Self {
        Self {
            vat_rate: 0.25,
            validity_days: 30,
            currency: "DKK".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub enabled: bool,
    pub from_address: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            from_address: "noreply@roofdesk.local".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.drafts.autosave_debounce_ms, 3000);
        assert_eq!(config.drafts.expiry_hours, 24);
        assert_eq!(config.storage.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.offers.currency, "DKK");
        assert_eq!(config.geocoding.min_query_len, 3);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: AppConfig = serde_yaml::from_str("offers:\n  vat_rate: 0.2\n").unwrap();
        assert_eq!(config.offers.vat_rate, 0.2);
        assert_eq!(config.offers.validity_days, 30);
    }
}
