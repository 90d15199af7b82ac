use tokio::io::AsyncReadExt;

use crate::cli::commands::AreaArgs;
use crate::errors::{FieldErrors, RoofdeskError};
use crate::geometry::RoofMeasurement;
use crate::models::LatLng;
use crate::utils::formatting::format_area;

pub async fn handle_area(args: AreaArgs) -> Result<(), RoofdeskError> {
    let content = if args.input == "-" {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        tokio::fs::read_to_string(&args.input).await?
    };

    let points = parse_points(&content)?;
    let measurement = RoofMeasurement::of(&points);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&measurement)?);
    } else {
        println!("Area:      {}", format_area(measurement.area_m2));
        println!("Perimeter: {:.1} m", measurement.perimeter_m);
        println!("Points:    {}", measurement.point_count);
    }
    Ok(())
}

/// Parse and range-check a JSON point list.
pub fn parse_points(content: &str) -> Result<Vec<LatLng>, RoofdeskError> {
    let points: Vec<LatLng> = serde_json::from_str(content)?;
    let errors: FieldErrors = points
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_valid())
        .map(|(i, _)| (format!("points[{}]", i), "Coordinates out of range".to_string()))
        .collect();
    if !errors.is_empty() {
        return Err(RoofdeskError::Validation(errors));
    }
    Ok(points)
}
