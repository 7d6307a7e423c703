//! Location picker state machine.

use tracing::debug;

use parkgrid_core::config::MapConfig;
use parkgrid_core::model::GeoPoint;

use super::{MapSurface, ReverseGeocoder};

/// Lifecycle of the underlying map widget. A load failure is visible but
/// non-fatal; the rest of the view stays usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapState {
    Loading,
    Ready,
    Failed(String),
}

/// User or sensor interactions that can move the picked point.
#[derive(Debug, Clone)]
pub enum PickEvent {
    /// The selection marker was dragged to a new position.
    MarkerDragged { lat: f64, lng: f64 },
    /// The map itself was clicked/tapped.
    MapClicked { lat: f64, lng: f64 },
    /// A text-search suggestion was chosen; already carries its label.
    SuggestionChosen(GeoPoint),
    /// An externally supplied device-location update.
    DeviceLocation { lat: f64, lng: f64 },
}

/// Holds the currently picked point and resolves address labels for new
/// coordinates. Address lookup failure never blocks coordinate delivery:
/// the point is delivered with the previous (or no) label.
#[derive(Debug)]
pub struct LocationPicker<R> {
    reverse: R,
    value: Option<GeoPoint>,
    map_state: MapState,
    fallback_center: (f64, f64),
}

impl<R: ReverseGeocoder> LocationPicker<R> {
    pub fn new(reverse: R, map: &MapConfig) -> Self {
        Self {
            reverse,
            value: None,
            map_state: MapState::Loading,
            fallback_center: (map.fallback_lat, map.fallback_lng),
        }
    }

    /// The currently picked point, if any.
    pub const fn value(&self) -> Option<&GeoPoint> {
        self.value.as_ref()
    }

    /// Pre-seed the picker (editing an existing space).
    pub fn set_value(&mut self, point: GeoPoint) {
        self.value = Some(point);
    }

    /// Drop the current selection.
    pub fn clear(&mut self) {
        self.value = None;
    }

    /// Where the map should center: the picked point, else the configured
    /// fallback city center.
    pub fn center(&self) -> (f64, f64) {
        self.value
            .as_ref()
            .map_or(self.fallback_center, |p| (p.lat, p.lng))
    }

    pub const fn map_state(&self) -> &MapState {
        &self.map_state
    }

    pub fn map_ready(&mut self) {
        self.map_state = MapState::Ready;
    }

    /// Record a widget load failure. The picker keeps working for
    /// non-map inputs (text search, device location).
    pub fn map_failed(&mut self, reason: impl Into<String>) {
        self.map_state = MapState::Failed(reason.into());
    }

    /// Apply a pick event. Returns the newly delivered point, or `None`
    /// when the event carried out-of-range coordinates and was dropped.
    pub async fn apply(&mut self, event: PickEvent) -> Option<GeoPoint> {
        let next = match event {
            PickEvent::SuggestionChosen(point) => point,
            PickEvent::MarkerDragged { lat, lng }
            | PickEvent::MapClicked { lat, lng }
            | PickEvent::DeviceLocation { lat, lng } => {
                let Ok(point) = GeoPoint::new(lat, lng) else {
                    debug!(lat, lng, "dropping pick event with out-of-range coordinates");
                    return None;
                };
                match self.reverse.resolve(lat, lng).await {
                    Ok(label) => point.with_address(label),
                    Err(e) => {
                        debug!(error = %e, "reverse geocode failed; delivering coordinates without label");
                        match self.value.as_ref().and_then(|v| v.address.clone()) {
                            Some(prev) => point.with_address(prev),
                            None => point,
                        }
                    }
                }
            }
        };
        self.value = Some(next.clone());
        Some(next)
    }

    /// Push the current selection onto a map surface: center the viewport
    /// and place the marker. A no-op while nothing is picked.
    pub fn sync_surface(&self, surface: &mut impl MapSurface) {
        let (lat, lng) = self.center();
        surface.set_center(lat, lng);
        if let Some(point) = &self.value {
            surface.set_marker(point);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    /// Scripted geocoder: answers each call with the next canned result.
    struct ScriptedReverse {
        answers: std::sync::Mutex<Vec<Result<String, ApiError>>>,
    }

    impl ScriptedReverse {
        fn new(answers: Vec<Result<String, ApiError>>) -> Self {
            Self {
                answers: std::sync::Mutex::new(answers),
            }
        }

        fn failing() -> Self {
            Self::new(vec![])
        }
    }

    impl ReverseGeocoder for ScriptedReverse {
        async fn resolve(&self, _lat: f64, _lng: f64) -> Result<String, ApiError> {
            self.answers.lock().unwrap().pop().unwrap_or(Err(ApiError::Api {
                status: 503,
                message: "Reverse geocode failed".into(),
            }))
        }
    }

    fn picker(reverse: ScriptedReverse) -> LocationPicker<ScriptedReverse> {
        LocationPicker::new(reverse, &MapConfig::default())
    }

    #[tokio::test]
    async fn map_click_resolves_address() {
        let mut picker = picker(ScriptedReverse::new(vec![Ok("Banani, Dhaka".into())]));
        let point = picker
            .apply(PickEvent::MapClicked {
                lat: 23.79,
                lng: 90.40,
            })
            .await
            .unwrap();
        assert_eq!(point.address.as_deref(), Some("Banani, Dhaka"));
        assert_eq!(picker.value().unwrap().lat, 23.79);
    }

    #[tokio::test]
    async fn failed_lookup_still_delivers_coordinates() {
        let mut picker = picker(ScriptedReverse::failing());
        let point = picker
            .apply(PickEvent::MarkerDragged {
                lat: 23.70,
                lng: 90.37,
            })
            .await
            .unwrap();
        assert_eq!(point.lat, 23.70);
        assert!(point.address.is_none());
    }

    #[tokio::test]
    async fn failed_lookup_keeps_previous_address() {
        let mut picker = picker(ScriptedReverse::failing());
        picker.set_value(GeoPoint::new(23.79, 90.40).unwrap().with_address("Banani"));
        let point = picker
            .apply(PickEvent::MapClicked {
                lat: 23.80,
                lng: 90.41,
            })
            .await
            .unwrap();
        assert_eq!(point.lat, 23.80);
        assert_eq!(point.address.as_deref(), Some("Banani"));
    }

    #[tokio::test]
    async fn suggestion_keeps_its_own_label_without_lookup() {
        let mut picker = picker(ScriptedReverse::failing());
        let chosen = GeoPoint::new(23.75, 90.39).unwrap().with_address("Dhanmondi");
        let point = picker
            .apply(PickEvent::SuggestionChosen(chosen))
            .await
            .unwrap();
        assert_eq!(point.address.as_deref(), Some("Dhanmondi"));
    }

    #[tokio::test]
    async fn out_of_range_event_is_dropped() {
        let mut picker = picker(ScriptedReverse::failing());
        let delivered = picker
            .apply(PickEvent::DeviceLocation {
                lat: 91.0,
                lng: 0.0,
            })
            .await;
        assert!(delivered.is_none());
        assert!(picker.value().is_none());
    }

    #[test]
    fn center_falls_back_to_configured_city() {
        let picker = picker(ScriptedReverse::failing());
        let (lat, lng) = picker.center();
        assert!((lat - 23.8103).abs() < 1e-9);
        assert!((lng - 90.4125).abs() < 1e-9);
    }

    #[tokio::test]
    async fn sync_surface_centers_and_marks() {
        use crate::geo::NullSurface;

        let mut picker = picker(ScriptedReverse::new(vec![Ok("Banani".into())]));
        let mut surface = NullSurface::default();

        // Before a pick the surface centers on the fallback city.
        picker.sync_surface(&mut surface);
        assert_eq!(surface.centered_at, Some(picker.center()));
        assert!(surface.marker.is_none());

        picker
            .apply(PickEvent::MapClicked {
                lat: 23.79,
                lng: 90.40,
            })
            .await
            .unwrap();
        picker.sync_surface(&mut surface);
        assert_eq!(surface.centered_at, Some((23.79, 90.40)));
        assert_eq!(surface.marker.as_ref().unwrap().lat, 23.79);

        surface.teardown();
        assert!(surface.torn_down);
    }

    #[test]
    fn map_failure_is_visible_but_value_still_settable() {
        let mut picker = picker(ScriptedReverse::failing());
        picker.map_failed("tile provider unreachable");
        assert!(matches!(picker.map_state(), MapState::Failed(_)));
        picker.set_value(GeoPoint::new(1.0, 2.0).unwrap());
        assert!(picker.value().is_some());
    }
}
