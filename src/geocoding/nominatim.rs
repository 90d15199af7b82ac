use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::GeocodingConfig;
use crate::errors::RoofdeskError;
use crate::models::LatLng;
use super::provider::Geocoder;
use super::AddressSuggestion;

/// Client for Nominatim-compatible address lookup APIs.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    country_codes: Option<String>,
    api_key: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, RoofdeskError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| RoofdeskError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country_codes: config.country_codes.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, RoofdeskError> {
        let mut request = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .query(&[("format", "jsonv2"), ("addressdetails", "1")])
            .query(params);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| RoofdeskError::Network(format!("Geocoding request failed: {}", e)))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(RoofdeskError::Network("Geocoding rate limit hit".into()));
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(RoofdeskError::Permission("Geocoding request rejected".into()));
        }
        if !status.is_success() {
            return Err(RoofdeskError::Network(format!("Geocoding returned HTTP {}", status.as_u16())));
        }

        resp.json()
            .await
            .map_err(|e| RoofdeskError::Network(format!("Invalid geocoding response: {}", e)))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<AddressSuggestion>, RoofdeskError> {
        let mut params = vec![("q", query.to_string()), ("limit", limit.to_string())];
        if let Some(codes) = &self.country_codes {
            params.push(("countrycodes", codes.clone()));
        }
        let data = self.get_json("search", &params).await?;
        let results = parse_search_results(&data);
        debug!(query, results = results.len(), "Address search");
        Ok(results)
    }

    async fn reverse(&self, point: LatLng) -> Result<Option<AddressSuggestion>, RoofdeskError> {
        let params = [("lat", point.lat.to_string()), ("lon", point.lon.to_string())];
        let data = self.get_json("reverse", &params).await?;
        Ok(parse_place(&data))
    }

    fn provider_name(&self) -> &str {
        "nominatim"
    }
}

/// Parse a search response. Entries without usable coordinates are skipped.
pub fn parse_search_results(data: &Value) -> Vec<AddressSuggestion> {
    data.as_array()
        .map(|items| items.iter().filter_map(parse_place).collect())
        .unwrap_or_default()
}

/// Parse one place object. Returns `None` for error payloads.
pub fn parse_place(place: &Value) -> Option<AddressSuggestion> {
    if place.get("error").is_some() {
        return None;
    }
    let coord = |key: &str| -> Option<f64> {
        match &place[key] {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    };
    let lat = coord("lat")?;
    let lon = coord("lon")?;
    let address = &place["address"];
    let text = |keys: &[&str]| -> Option<String> {
        keys.iter().find_map(|k| address[*k].as_str().map(str::to_string))
    };

    Some(AddressSuggestion {
        label: place["display_name"].as_str().unwrap_or_default().to_string(),
        lat,
        lon,
        street: text(&["road", "pedestrian", "street"]),
        house_number: text(&["house_number"]),
        postcode: text(&["postcode"]),
        city: text(&["city", "town", "village", "municipality"]),
    })
}
