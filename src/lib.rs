//! stop-sequencer core
//!
//! Orders a driver's delivery stops: remote trip optimizer first, nearest
//! neighbor + 2-opt when it cannot be used, and batching of the final order
//! for turn-by-turn navigation links.

pub mod error;
pub mod model;
pub mod traits;
pub mod haversine;
pub mod sequencer;
pub mod two_opt;
pub mod remote;
pub mod optimizer;
pub mod osrm;
pub mod osrm_data;
pub mod polyline;
pub mod navigation;
pub mod nominatim;
pub mod session;
pub mod store;
