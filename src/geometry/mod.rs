pub mod area;

pub use area::{centroid, polygon_area_m2, polygon_perimeter_m, RoofMeasurement};
