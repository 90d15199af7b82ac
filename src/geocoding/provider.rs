use async_trait::async_trait;

use crate::errors::RoofdeskError;
use crate::models::LatLng;
use super::AddressSuggestion;

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Forward lookup of free-text address input
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<AddressSuggestion>, RoofdeskError>;

    /// Nearest address to a point, if the provider knows one
    async fn reverse(&self, point: LatLng) -> Result<Option<AddressSuggestion>, RoofdeskError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
