use serde_yaml::Value;

use crate::errors::RoofdeskError;

/// Keys holding filesystem locations. `..` components are refused.
const PATH_KEYS: &[&str] = &["database.path", "drafts.directory", "storage.root"];

/// Keys holding outbound URLs. Only http(s) is accepted.
const URL_KEYS: &[&str] = &["geocoding.base_url"];

/// Markup or URI schemes that never belong in a config string.
const INJECTION_MARKERS: &[&str] = &["<script", "javascript:", "vbscript:", "data:", "file:"];

/// Refuse config strings that could escape the data directories or smuggle
/// markup into rendered output (sender address, CORS origins).
pub fn validate_security_patterns(value: &Value) -> Result<(), RoofdeskError> {
    walk(value, &mut Vec::new())
}

fn walk(value: &Value, path: &mut Vec<String>) -> Result<(), RoofdeskError> {
    match value {
        Value::String(s) => check_string(&path.join("."), s),
        Value::Mapping(map) => {
            for (k, v) in map {
                path.push(k.as_str().unwrap_or("?").to_string());
                let result = walk(v, path);
                path.pop();
                result?;
            }
            Ok(())
        }
        Value::Sequence(items) => {
            let key = path.join(".");
            for (i, item) in items.iter().enumerate() {
                if let Value::String(s) = item {
                    check_string(&format!("{key}[{i}]"), s)?;
                } else {
                    walk(item, path)?;
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn check_string(key: &str, s: &str) -> Result<(), RoofdeskError> {
    let key_display = if key.is_empty() { "root" } else { key };
    let reject = |what: &str| {
        Err(RoofdeskError::Config(format!("{} not allowed at config path: {}", what, key_display)))
    };

    if PATH_KEYS.contains(&key) || s.contains("../") || s.contains("..\\") {
        if s.split(['/', '\\']).any(|part| part == "..") {
            return reject("Parent directory reference");
        }
    }

    let lower = s.trim().to_lowercase();
    if URL_KEYS.contains(&key) {
        if !(lower.starts_with("https://") || lower.starts_with("http://")) {
            return reject("Non-http URL");
        }
        return Ok(());
    }

    match INJECTION_MARKERS.iter().find(|m| lower.contains(*m)) {
        Some(marker) => reject(&format!("Pattern '{}'", marker)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_defaults_like_config_passes() {
        let config = yaml(
            "geocoding:\n  base_url: https://nominatim.openstreetmap.org\n\
             database:\n  path: ./data/roofdesk.db\n\
             offers:\n  vat_rate: 0.25\nnotifications:\n  enabled: true",
        );
        assert!(validate_security_patterns(&config).is_ok());
    }

    #[test]
    fn test_parent_directory_in_storage_root_rejected() {
        let err = validate_security_patterns(&yaml("storage:\n  root: ../../srv/photos")).unwrap_err();
        assert!(err.to_string().contains("storage.root"));
    }

    #[test]
    fn test_dotted_file_names_are_not_traversal() {
        assert!(validate_security_patterns(&yaml("database:\n  path: ./data/roofdesk..db")).is_ok());
    }

    #[test]
    fn test_geocoder_url_must_be_http() {
        assert!(validate_security_patterns(&yaml("geocoding:\n  base_url: 'file:///etc/passwd'")).is_err());
        assert!(validate_security_patterns(&yaml("geocoding:\n  base_url: 'ftp://geo.example'")).is_err());
        assert!(validate_security_patterns(&yaml("geocoding:\n  base_url: 'http://localhost:8088'")).is_ok());
    }

    #[test]
    fn test_markup_in_sender_address_rejected() {
        let config = yaml("notifications:\n  from_address: '<script>alert(1)</script>'");
        assert!(validate_security_patterns(&config).is_err());
    }

    #[test]
    fn test_cors_origin_entries_reported_by_index() {
        let config = yaml("server:\n  cors_origins:\n    - https://app.roofdesk.dk\n    - 'javascript:alert(1)'");
        let err = validate_security_patterns(&config).unwrap_err();
        assert!(err.to_string().contains("server.cors_origins[1]"));
    }
}
