use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "server": {
                "type": "object",
                "properties": {
                    "host": { "type": "string" },
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535 },
                    "api_token": { "type": "string" },
                    "cors_origins": { "type": "array", "items": { "type": "string" } }
                }
            },
            "database": {
                "type": "object",
                "properties": {
                    "path": { "type": "string" }
                }
            },
            "drafts": {
                "type": "object",
                "properties": {
                    "directory": { "type": "string" },
                    "autosave_debounce_ms": { "type": "integer", "minimum": 0 },
                    "expiry_hours": { "type": "integer", "minimum": 1 }
                }
            },
            "geocoding": {
                "type": "object",
                "properties": {
                    "base_url": { "type": "string", "format": "uri" },
                    "user_agent": { "type": "string" },
                    "timeout_ms": { "type": "integer", "minimum": 1 },
                    "debounce_ms": { "type": "integer", "minimum": 0 },
                    "min_query_len": { "type": "integer", "minimum": 1 },
                    "limit": { "type": "integer", "minimum": 1, "maximum": 50 },
                    "country_codes": { "type": "string" },
                    "api_key": { "type": "string" }
                }
            },
            "storage": {
                "type": "object",
                "properties": {
                    "root": { "type": "string" },
                    "max_upload_bytes": { "type": "integer", "minimum": 1 }
                }
            },
            "offers": {
                "type": "object",
                "properties": {
                    "vat_rate": { "type": "number", "minimum": 0, "maximum": 1 },
                    "validity_days": { "type": "integer", "minimum": 1 },
                    "currency": { "type": "string", "pattern": "^[A-Z]{3}$" }
                }
            },
            "notifications": {
                "type": "object",
                "properties": {
                    "enabled": { "type": "boolean" },
                    "from_address": { "type": "string" }
                }
            }
        }
    })
});
