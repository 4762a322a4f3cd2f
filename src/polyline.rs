//! Polyline representation for route geometries.
//!
//! OSRM returns GeoJSON line strings (`[lng, lat]` pairs); they are converted
//! to `(lat, lng)` points at the boundary and kept that way internally.

use serde::{Deserialize, Serialize};

use crate::haversine::haversine_km;
use crate::model::Coordinate;

/// A route geometry as decoded `(latitude, longitude)` points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Builds a polyline from GeoJSON `[lng, lat]` positions.
    pub fn from_geojson(positions: &[[f64; 2]]) -> Self {
        Self {
            points: positions.iter().map(|[lng, lat]| (*lat, *lng)).collect(),
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    /// Great-circle length along the points. Points outside valid ranges are skipped.
    pub fn length_km(&self) -> f64 {
        let coords: Vec<Coordinate> = self
            .points
            .iter()
            .filter_map(|&(lat, lng)| Coordinate::new(lat, lng).ok())
            .collect();
        coords
            .windows(2)
            .map(|pair| haversine_km(pair[0], pair[1]))
            .sum()
    }
}
