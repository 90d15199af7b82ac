use serde::{Deserialize, Serialize};

/// A WGS84 coordinate as drawn on the map widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
}

impl LatLng {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lng_alias_accepted() {
        let p: LatLng = serde_json::from_str(r#"{"lat": 55.67, "lng": 12.56}"#).unwrap();
        assert_eq!(p, LatLng::new(55.67, 12.56));
    }

    #[test]
    fn test_out_of_range_invalid() {
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(0.0, f64::NAN).is_valid());
        assert!(LatLng::new(-33.9, 151.2).is_valid());
    }
}
