//! Roof size estimation from points drawn on the map.
//!
//! Points are projected onto a local plane (equirectangular around the mean
//! latitude) and the shoelace formula gives the enclosed area. At roof scale
//! the projection error is far below drawing precision.

use serde::Serialize;

use crate::models::LatLng;

/// Mean earth radius in metres (IUGG).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

fn mean_latitude_rad(points: &[LatLng]) -> f64 {
    let sum: f64 = points.iter().map(|p| p.lat).sum();
    (sum / points.len() as f64).to_radians()
}

fn project(points: &[LatLng]) -> Vec<(f64, f64)> {
    let cos_lat = mean_latitude_rad(points).cos();
    points
        .iter()
        .map(|p| {
            let x = EARTH_RADIUS_M * p.lon.to_radians() * cos_lat;
            let y = EARTH_RADIUS_M * p.lat.to_radians();
            (x, y)
        })
        .collect()
}

/// Area in square metres of the polygon described by `points`.
///
/// The ring is closed implicitly and winding direction does not matter.
/// Fewer than three points enclose nothing and yield 0.
pub fn polygon_area_m2(points: &[LatLng]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let projected = project(points);
    let n = projected.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        let (x1, y1) = projected[i];
        let (x2, y2) = projected[(i + 1) % n];
        twice_area += x1 * y2 - x2 * y1;
    }
    (twice_area / 2.0).abs()
}

fn haversine_m(a: &LatLng, b: &LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Length of the closed ring in metres. A single point has no perimeter;
/// two points count the segment twice (there and back).
pub fn polygon_perimeter_m(points: &[LatLng]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let n = points.len();
    (0..n).map(|i| haversine_m(&points[i], &points[(i + 1) % n])).sum()
}

/// Arithmetic mean of the vertices. Good enough for placing a label or
/// centring the map on a roof.
pub fn centroid(points: &[LatLng]) -> Option<LatLng> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let lat = points.iter().map(|p| p.lat).sum::<f64>() / n;
    let lon = points.iter().map(|p| p.lon).sum::<f64>() / n;
    Some(LatLng::new(lat, lon))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoofMeasurement {
    pub area_m2: f64,
    pub perimeter_m: f64,
    pub centroid: Option<LatLng>,
    pub point_count: usize,
}

impl RoofMeasurement {
    pub fn of(points: &[LatLng]) -> Self {
        Self {
            area_m2: round2(polygon_area_m2(points)),
            perimeter_m: round2(polygon_perimeter_m(points)),
            centroid: centroid(points),
            point_count: points.len(),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
