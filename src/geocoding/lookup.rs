use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::debug;

use super::provider::Geocoder;
use super::AddressSuggestion;

/// Address suggestions while typing.
///
/// Each keystroke bumps a generation counter and waits out the debounce; a
/// call that is overtaken by a newer keystroke returns `None` without
/// querying. Lookup failures clear the suggestions rather than surfacing.
/// Nothing is cached between calls.
pub struct AddressLookup {
    geocoder: Arc<dyn Geocoder>,
    debounce: Duration,
    min_query_len: usize,
    limit: usize,
    generation: AtomicU64,
    suggestions: Mutex<Vec<AddressSuggestion>>,
}

impl AddressLookup {
    pub fn new(geocoder: Arc<dyn Geocoder>, debounce: Duration, min_query_len: usize, limit: usize) -> Self {
        Self {
            geocoder,
            debounce,
            min_query_len,
            limit,
            generation: AtomicU64::new(0),
            suggestions: Mutex::new(Vec::new()),
        }
    }

    /// Handle one keystroke. `None` means a newer keystroke superseded this one.
    pub async fn on_input(&self, query: &str) -> Option<Vec<AddressSuggestion>> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let query = query.trim();

        if query.chars().count() < self.min_query_len {
            self.set(Vec::new());
            return Some(Vec::new());
        }

        tokio::time::sleep(self.debounce).await;
        if self.is_stale(generation) {
            return None;
        }

        let results = match self.geocoder.search(query, self.limit).await {
            Ok(results) => results,
            Err(e) => {
                debug!(provider = self.geocoder.provider_name(), error = %e, "Address lookup failed");
                Vec::new()
            }
        };

        // A slow response must not overwrite suggestions for newer input
        if self.is_stale(generation) {
            return None;
        }
        self.set(results.clone());
        Some(results)
    }

    pub fn suggestions(&self) -> Vec<AddressSuggestion> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.set(Vec::new());
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) != generation
    }

    fn set(&self, results: Vec<AddressSuggestion>) {
        *self.lock() = results;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AddressSuggestion>> {
        self.suggestions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RoofdeskError;
    use crate::models::LatLng;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct FakeGeocoder {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn search(&self, query: &str, _limit: usize) -> Result<Vec<AddressSuggestion>, RoofdeskError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RoofdeskError::Network("offline".into()));
            }
            Ok(vec![AddressSuggestion {
                label: format!("{query}, Odense"),
                lat: 55.40,
                lon: 10.39,
                street: None,
                house_number: None,
                postcode: None,
                city: Some("Odense".into()),
            }])
        }

        async fn reverse(&self, _point: LatLng) -> Result<Option<AddressSuggestion>, RoofdeskError> {
            Ok(None)
        }

        fn provider_name(&self) -> &str {
            "fake"
        }
    }

    fn lookup(fail: bool) -> (Arc<FakeGeocoder>, Arc<AddressLookup>) {
        let geocoder = Arc::new(FakeGeocoder { calls: AtomicUsize::new(0), fail });
        let lookup = Arc::new(AddressLookup::new(geocoder.clone(), Duration::from_millis(300), 3, 5));
        (geocoder, lookup)
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_skips_lookup() {
        let (geocoder, lookup) = lookup(false);
        assert_eq!(lookup.on_input("Ve").await, Some(Vec::new()));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_keystroke_supersedes() {
        let (geocoder, lookup) = lookup(false);

        let first = {
            let lookup = lookup.clone();
            tokio::spawn(async move { lookup.on_input("Vest").await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = lookup.on_input("Vester").await;

        assert_eq!(first.await.unwrap(), None);
        let results = second.unwrap();
        assert_eq!(results[0].label, "Vester, Odense");
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(lookup.suggestions().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_clears_silently() {
        let (_, ok_lookup) = lookup(false);
        ok_lookup.on_input("Nørregade").await;
        assert_eq!(ok_lookup.suggestions().len(), 1);

        let (geocoder, failing) = lookup(true);
        failing.set(ok_lookup.suggestions());
        assert_eq!(failing.on_input("Nørregade").await, Some(Vec::new()));
        assert!(failing.suggestions().is_empty());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_invalidates_pending() {
        let (_, lookup) = lookup(false);
        let pending = {
            let lookup = lookup.clone();
            tokio::spawn(async move { lookup.on_input("Algade").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        lookup.clear();
        assert_eq!(pending.await.unwrap(), None);
        assert!(lookup.suggestions().is_empty());
    }
}
