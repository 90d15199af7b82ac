use tracing::debug;

const REDACTED: &str = "[REDACTED]";

/// Secrets shorter than this are too likely to match ordinary text.
const MIN_REDACT_LEN: usize = 4;

/// `$NAME` reads the secret from the environment; anything else is literal.
/// An unset variable leaves the reference in place so the caller can warn.
pub fn resolve_credential(value: &str) -> String {
    let Some(var_name) = value.strip_prefix('$') else {
        return value.to_string();
    };
    match std::env::var(var_name) {
        Ok(secret) => {
            debug!(var = %var_name, "Credential read from environment");
            secret
        }
        Err(_) => {
            debug!(var = %var_name, "Credential variable unset");
            value.to_string()
        }
    }
}

/// Mask known secrets in text printed back to the operator.
pub fn redact_credentials(text: &str, secrets: &[&str]) -> String {
    secrets
        .iter()
        .filter(|s| s.len() >= MIN_REDACT_LEN)
        .fold(text.to_string(), |acc, secret| acc.replace(secret, REDACTED))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_token_kept() {
        assert_eq!(resolve_credential("tok-1234"), "tok-1234");
    }

    #[test]
    fn test_env_reference_resolved() {
        std::env::set_var("ROOFDESK_TEST_GEOCODER_KEY", "8f2a91c0");
        assert_eq!(resolve_credential("$ROOFDESK_TEST_GEOCODER_KEY"), "8f2a91c0");
        std::env::remove_var("ROOFDESK_TEST_GEOCODER_KEY");
    }

    #[test]
    fn test_unset_env_reference_left_as_is() {
        assert_eq!(resolve_credential("$ROOFDESK_TEST_UNSET"), "$ROOFDESK_TEST_UNSET");
    }

    #[test]
    fn test_config_dump_redacted() {
        let dump = "server:\n  api_token: tok-8f2a91\ngeocoding:\n  api_key: abc\n";
        let redacted = redact_credentials(dump, &["tok-8f2a91", "abc"]);
        assert!(redacted.contains("api_token: [REDACTED]"));
        assert!(redacted.contains("api_key: abc"));
    }
}
