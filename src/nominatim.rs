//! Nominatim HTTP adapter for forward and reverse geocoding.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::Coordinate;
use crate::traits::Geocoder;

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Country filter for the first, biased search. Empty disables the bias.
    pub country_codes: String,
    /// `left,top,right,bottom` box bounding the biased search.
    pub viewbox: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            country_codes: "cz".to_string(),
            viewbox: Some("12.09,51.06,18.87,48.55".to_string()),
            user_agent: concat!("stop-sequencer/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }

    fn search(&self, address: &str, biased: bool) -> Result<Option<Coordinate>, reqwest::Error> {
        let mut query: Vec<(&str, &str)> = vec![("format", "json"), ("q", address), ("limit", "3")];
        if biased {
            query.push(("countrycodes", self.config.country_codes.as_str()));
            if let Some(viewbox) = &self.config.viewbox {
                query.push(("viewbox", viewbox.as_str()));
                query.push(("bounded", "1"));
            }
        }

        let places: Vec<NominatimPlace> = self
            .client
            .get(format!("{}/search", self.config.base_url))
            .query(&query)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json())?;

        Ok(places.iter().find_map(NominatimPlace::coordinate))
    }
}

impl Geocoder for NominatimClient {
    fn geocode(&self, address: &str) -> Option<Coordinate> {
        let has_bias = !self.config.country_codes.is_empty();
        let attempts: &[bool] = if has_bias { &[true, false] } else { &[false] };

        for &biased in attempts {
            match self.search(address, biased) {
                Ok(Some(coordinate)) => return Some(coordinate),
                Ok(None) => debug!(address, biased, "no geocoding result"),
                Err(err) => {
                    warn!(address, error = %err, "geocoding request failed");
                    return None;
                }
            }
        }
        None
    }

    fn reverse(&self, coordinate: Coordinate) -> Option<String> {
        let lat = coordinate.lat().to_string();
        let lon = coordinate.lng().to_string();
        let query = [
            ("format", "json"),
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("zoom", "18"),
        ];

        let result = self
            .client
            .get(format!("{}/reverse", self.config.base_url))
            .query(&query)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<NominatimReverse>());

        match result {
            Ok(body) => body.display_name,
            Err(err) => {
                warn!(%coordinate, error = %err, "reverse geocoding failed");
                None
            }
        }
    }
}

/// Nominatim reports coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimPlace {
    fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.lat.parse().ok()?;
        let lng = self.lon.parse().ok()?;
        Coordinate::new(lat, lng).ok()
    }
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
}
