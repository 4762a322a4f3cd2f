//! Test fixtures for stop-sequencer.
//!
//! Provides real Czech city coordinates and in-process fakes for the
//! remote optimizer, geocoder and navigation launcher.

#![allow(dead_code)]

pub mod czech_locations;
pub mod fakes;

pub use czech_locations::*;
pub use fakes::*;
