use crate::cli::commands::GeocodeArgs;
use crate::config::load_config;
use crate::errors::RoofdeskError;
use crate::geocoding::{Geocoder, NominatimGeocoder};

pub async fn handle_geocode(args: GeocodeArgs) -> Result<(), RoofdeskError> {
    let config = load_config(args.config.as_deref()).await?;
    let geocoder = NominatimGeocoder::new(&config.geocoding)?;
    let limit = args.limit.unwrap_or(config.geocoding.limit);

    let results = geocoder.search(args.query.trim(), limit).await?;
    if results.is_empty() {
        return Err(RoofdeskError::NotFound(format!("no address matches '{}'", args.query)));
    }
    for suggestion in results {
        println!("{:.6}, {:.6}  {}", suggestion.lat, suggestion.lon, suggestion.label);
    }
    Ok(())
}
