//! Mapping of arbitrary error text to short, translated messages for end users.
//!
//! Errors reaching the edge of the system come from many places (the store,
//! the geocoder, uploads) and rarely share a type, so the mapping works on the
//! message text the same way for all of them.

use serde::{Deserialize, Serialize};

use super::types::RoofdeskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Permission,
    Network,
    NotFound,
    Validation,
    Generic,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permission => "permission",
            Self::Network => "network",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Da,
}

impl Locale {
    /// Pick a locale from an `Accept-Language` style value. Anything that is
    /// not Danish falls back to English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .split(',')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        if primary.starts_with("da") {
            Locale::Da
        } else {
            Locale::En
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMessage {
    pub kind: MessageKind,
    pub text: &'static str,
}

// Order matters: the first matching group wins.
const PERMISSION_MARKERS: &[&str] = &["permission", "denied", "unauthorized", "forbidden", "403", "401"];
const NETWORK_MARKERS: &[&str] = &["network", "fetch", "timeout", "timed out", "connection", "offline"];
const NOT_FOUND_MARKERS: &[&str] = &["404", "not found", "no such"];
const VALIDATION_MARKERS: &[&str] = &["validation", "invalid", "required", "must be"];

/// Classify free-form error text by substring.
pub fn kind_for_text(text: &str) -> MessageKind {
    let lower = text.to_lowercase();
    let contains_any = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

    if contains_any(PERMISSION_MARKERS) {
        MessageKind::Permission
    } else if contains_any(NETWORK_MARKERS) {
        MessageKind::Network
    } else if contains_any(NOT_FOUND_MARKERS) {
        MessageKind::NotFound
    } else if contains_any(VALIDATION_MARKERS) {
        MessageKind::Validation
    } else {
        MessageKind::Generic
    }
}

pub fn text_for(kind: MessageKind, locale: Locale) -> &'static str {
    match (kind, locale) {
        (MessageKind::Permission, Locale::En) => "You do not have permission to perform this action.",
        (MessageKind::Permission, Locale::Da) => "Du har ikke tilladelse til at udføre denne handling.",
        (MessageKind::Network, Locale::En) => "Network problem. Check your connection and try again.",
        (MessageKind::Network, Locale::Da) => "Netværksfejl. Tjek din forbindelse og prøv igen.",
        (MessageKind::NotFound, Locale::En) => "The requested item could not be found.",
        (MessageKind::NotFound, Locale::Da) => "Det ønskede element blev ikke fundet.",
        (MessageKind::Validation, Locale::En) => "Some fields are missing or invalid.",
        (MessageKind::Validation, Locale::Da) => "Nogle felter mangler eller er ugyldige.",
        (MessageKind::Generic, Locale::En) => "Something went wrong. Please try again.",
        (MessageKind::Generic, Locale::Da) => "Noget gik galt. Prøv venligst igen.",
    }
}

/// Map error text to a translated user-facing message.
pub fn user_message(text: &str, locale: Locale) -> UserMessage {
    let kind = kind_for_text(text);
    UserMessage { kind, text: text_for(kind, locale) }
}

impl RoofdeskError {
    /// Typed errors know their kind; untyped ones fall back to the text heuristics.
    pub fn user_message(&self, locale: Locale) -> UserMessage {
        let class = self.classify();
        let kind = match class.kind {
            MessageKind::Generic => kind_for_text(&self.to_string()),
            known => known,
        };
        UserMessage { kind, text: text_for(kind, locale) }
    }
}
