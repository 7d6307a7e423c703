//! Geographic input: map surface adapter, reverse geocoding and the
//! location picker state machine.
//!
//! The concrete map engine sits behind [`MapSurface`] so workflows can be
//! driven and tested without a real map. Each provider is individually
//! optional: a failed map load or address lookup degrades the feature,
//! never the page.

mod picker;
mod reverse;

pub use picker::{LocationPicker, MapState, PickEvent};
pub use reverse::{NominatimReverse, ReverseGeocoder};

use parkgrid_core::model::GeoPoint;

/// Minimal surface the picker needs from a map widget. Implementations wrap
/// whatever imperative object graph the engine exposes (map instance,
/// marker, layers) and keep it out of the workflow layer.
pub trait MapSurface {
    /// Re-center the viewport.
    fn set_center(&mut self, lat: f64, lng: f64);
    /// Move the selection marker.
    fn set_marker(&mut self, point: &GeoPoint);
    /// Release engine resources. Called when the owning view exits.
    fn teardown(&mut self);
}

/// A no-op surface for headless use and tests.
#[derive(Debug, Default)]
pub struct NullSurface {
    pub centered_at: Option<(f64, f64)>,
    pub marker: Option<GeoPoint>,
    pub torn_down: bool,
}

impl MapSurface for NullSurface {
    fn set_center(&mut self, lat: f64, lng: f64) {
        self.centered_at = Some((lat, lng));
    }

    fn set_marker(&mut self, point: &GeoPoint) {
        self.marker = Some(point.clone());
    }

    fn teardown(&mut self) {
        self.torn_down = true;
    }
}
