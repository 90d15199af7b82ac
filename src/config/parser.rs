use std::path::Path;

use tracing::{info, warn};

use crate::errors::RoofdeskError;
use super::credentials::resolve_credential;
use super::schema::CONFIG_SCHEMA;
use super::security::validate_security_patterns;
use super::types::{AppConfig, MAX_DRAFT_EXPIRY_HOURS, MAX_OFFER_VALIDITY_DAYS};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "roofdesk.yaml";

/// Load configuration for the server. An explicit path must exist; without
/// one, `roofdesk.yaml` is used if present and defaults otherwise.
pub async fn load_config(path: Option<&Path>) -> Result<AppConfig, RoofdeskError> {
    match path {
        Some(path) => parse_config(path).await,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                parse_config(default_path).await
            } else {
                info!("No config file found, using defaults");
                Ok(AppConfig::default())
            }
        }
    }
}

pub async fn parse_config(path: &Path) -> Result<AppConfig, RoofdeskError> {
    if !path.exists() {
        return Err(RoofdeskError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(RoofdeskError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

/// Parse configuration text: pattern scan, advisory schema check, typed parse, conflict checks.
pub fn parse_config_str(content: &str) -> Result<AppConfig, RoofdeskError> {
    let yaml: serde_yaml::Value = if content.trim().is_empty() {
        serde_yaml::Value::Mapping(Default::default())
    } else {
        serde_yaml::from_str(content)?
    };

    validate_security_patterns(&yaml)?;
    validate_schema(&yaml)?;

    let mut config: AppConfig = serde_yaml::from_value(yaml)?;
    resolve_secrets(&mut config);
    validate_conflicts(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema. Violations are logged, not fatal.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), RoofdeskError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| RoofdeskError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| RoofdeskError::Config(format!("Schema compilation error: {}", e)))?;

    if let Err(errors) = compiled.validate(&json_value) {
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

fn resolve_secrets(config: &mut AppConfig) {
    if let Some(token) = config.server.api_token.as_mut() {
        *token = resolve_credential(token);
    }
    if let Some(key) = config.geocoding.api_key.as_mut() {
        *key = resolve_credential(key);
    }
}

/// Detect settings that cannot work together.
fn validate_conflicts(config: &AppConfig) -> Result<(), RoofdeskError> {
    if config.drafts.directory == config.storage.root {
        return Err(RoofdeskError::Config(
            "drafts.directory and storage.root must be different directories".into(),
        ));
    }

    if !(0.0..=1.0).contains(&config.offers.vat_rate) {
        return Err(RoofdeskError::Config(format!(
            "offers.vat_rate must be a fraction between 0 and 1, got {}",
            config.offers.vat_rate
        )));
    }

    if !(1..=MAX_OFFER_VALIDITY_DAYS).contains(&config.offers.validity_days) {
        return Err(RoofdeskError::Config(format!(
            "offers.validity_days must be between 1 and {}, got {}",
            MAX_OFFER_VALIDITY_DAYS, config.offers.validity_days
        )));
    }

    if !(1..=MAX_DRAFT_EXPIRY_HOURS).contains(&config.drafts.expiry_hours) {
        return Err(RoofdeskError::Config(format!(
            "drafts.expiry_hours must be between 1 and {}, got {}",
            MAX_DRAFT_EXPIRY_HOURS, config.drafts.expiry_hours
        )));
    }

    if config.geocoding.min_query_len == 0 {
        return Err(RoofdeskError::Config("geocoding.min_query_len must be at least 1".into()));
    }

    if config.notifications.enabled && config.notifications.from_address.trim().is_empty() {
        return Err(RoofdeskError::Config(
            "notifications.from_address is required when notifications are enabled".into(),
        ));
    }

    if let Some(token) = &config.server.api_token {
        if token.is_empty() {
            warn!("server.api_token is empty; API authentication is disabled");
        } else if token.starts_with('$') {
            warn!(reference = %token, "server.api_token references an unset environment variable");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config_str(
            "server:\n  port: 9000\ndrafts:\n  directory: /var/lib/roofdesk/drafts\n  expiry_hours: 48\noffers:\n  vat_rate: 0.25\n  currency: EUR\n",
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.drafts.expiry_hours, 48);
        assert_eq!(config.offers.currency, "EUR");
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let config = parse_config_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_dangerous_pattern_rejected() {
        let err = parse_config_str("storage:\n  root: ../../etc\n").unwrap_err();
        assert!(matches!(err, RoofdeskError::Config(_)));
    }

    #[test]
    fn test_out_of_range_periods_rejected() {
        let err = parse_config_str("offers:\n  validity_days: 100000000000\n").unwrap_err();
        assert!(err.to_string().contains("offers.validity_days"));

        let err = parse_config_str("drafts:\n  expiry_hours: 18446744073709551615\n").unwrap_err();
        assert!(err.to_string().contains("drafts.expiry_hours"));

        assert!(parse_config_str("drafts:\n  expiry_hours: 0\n").is_err());
        assert!(parse_config_str("offers:\n  validity_days: 3660\n").is_ok());
    }

    #[test]
    fn test_same_draft_and_storage_dir_rejected() {
        let err = parse_config_str("drafts:\n  directory: ./data/shared\nstorage:\n  root: ./data/shared\n").unwrap_err();
        assert!(err.to_string().contains("must be different"));
    }

    #[test]
    fn test_vat_rate_out_of_range_rejected() {
        assert!(parse_config_str("offers:\n  vat_rate: 25\n").is_err());
    }

    #[test]
    fn test_notifications_need_sender() {
        assert!(parse_config_str("notifications:\n  enabled: true\n  from_address: ''\n").is_err());
        assert!(parse_config_str("notifications:\n  enabled: false\n  from_address: ''\n").is_ok());
    }

    #[test]
    fn test_api_token_resolved_from_env() {
        std::env::set_var("TEST_ROOFDESK_PARSER_TOKEN", "s3cr3t-token");
        let config = parse_config_str("server:\n  api_token: $TEST_ROOFDESK_PARSER_TOKEN\n").unwrap();
        assert_eq!(config.server.api_token.as_deref(), Some("s3cr3t-token"));
        std::env::remove_var("TEST_ROOFDESK_PARSER_TOKEN");
    }

    #[test]
    fn test_unknown_section_is_advisory() {
        let config = parse_config_str("legacy:\n  enabled: true\n").unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[tokio::test]
    async fn test_parse_config_missing_file() {
        let err = parse_config(Path::new("/nonexistent/roofdesk.yaml")).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_parse_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roofdesk.yaml");
        std::fs::write(&path, "geocoding:\n  limit: 8\n").unwrap();
        let config = parse_config(&path).await.unwrap();
        assert_eq!(config.geocoding.limit, 8);
    }
}
