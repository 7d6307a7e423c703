//! Search workflow: `idle → searching → {results, error}` with a
//! generation counter so a superseded search can never paint its results
//! over a newer one.

use parkgrid_core::error::{Error, Result};
use parkgrid_core::model::{RequestedArea, SearchResult};
use parkgrid_core::time;

use crate::api::SearchParams;

/// Where the search centers.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchTarget {
    /// Explicit coordinates (typed or picked on the map).
    Point { lat: f64, lng: f64 },
    /// Free-text query, geocoded server-side.
    Text(String),
    /// The most recent device-location update.
    LiveLocation,
}

/// A complete search request as entered in the form.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub target: SearchTarget,
    pub start_ts: String,
    pub end_ts: String,
    /// Radius hint in meters; the backend clamps and echoes the effective
    /// value. `None` lets the caller's configured default apply.
    pub radius_m: Option<f64>,
}

impl SearchQuery {
    /// Validate preconditions and resolve to request parameters. All
    /// failures here are reported before any network call is made.
    pub fn to_params(&self, live: Option<(f64, f64)>) -> Result<SearchParams> {
        time::validate_window(&self.start_ts, &self.end_ts)?;
        let (query, lat, lng) = match &self.target {
            SearchTarget::Point { lat, lng } => (None, Some(*lat), Some(*lng)),
            SearchTarget::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(Error::Validation(
                        "Give an address or lat/lng to search".into(),
                    ));
                }
                (Some(text.to_string()), None, None)
            }
            SearchTarget::LiveLocation => {
                let (lat, lng) = live.ok_or_else(|| {
                    Error::Validation("Turn on GPS to search around you".into())
                })?;
                (None, Some(lat), Some(lng))
            }
        };
        Ok(SearchParams {
            query,
            lat,
            lng,
            start_ts: self.start_ts.clone(),
            end_ts: self.end_ts.clone(),
            radius_m: self.radius_m,
        })
    }
}

/// Workflow state. A failed search clears the previous result set: stale
/// matches are never shown as if current.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Searching,
    Results(Vec<SearchResult>),
    Error(String),
}

/// Search state machine with supersede-by-generation semantics.
#[derive(Debug)]
pub struct SearchWorkflow {
    state: SearchState,
    generation: u64,
    /// Center/radius echo of the latest completed search, for map focus.
    focus: Option<RequestedArea>,
}

impl SearchWorkflow {
    pub const fn new() -> Self {
        Self {
            state: SearchState::Idle,
            generation: 0,
            focus: None,
        }
    }

    pub const fn state(&self) -> &SearchState {
        &self.state
    }

    pub const fn is_searching(&self) -> bool {
        matches!(self.state, SearchState::Searching)
    }

    pub const fn focus(&self) -> Option<&RequestedArea> {
        self.focus.as_ref()
    }

    pub fn results(&self) -> &[SearchResult] {
        match &self.state {
            SearchState::Results(items) => items,
            _ => &[],
        }
    }

    /// Begin a search attempt. Any in-flight attempt is superseded: its
    /// completion will carry a stale generation and be discarded.
    pub fn start(&mut self) -> u64 {
        self.generation += 1;
        self.state = SearchState::Searching;
        self.generation
    }

    /// Deliver a completion for the attempt identified by `generation`.
    /// Returns `false` when the completion was stale and discarded.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: std::result::Result<(Vec<SearchResult>, RequestedArea), String>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        match outcome {
            Ok((items, requested)) => {
                self.focus = Some(requested);
                self.state = SearchState::Results(items);
            }
            Err(message) => {
                self.focus = None;
                self.state = SearchState::Error(message);
            }
        }
        true
    }

    /// Drop results and return to idle (the "Clear" button).
    pub fn clear(&mut self) {
        self.generation += 1;
        self.state = SearchState::Idle;
        self.focus = None;
    }
}

impl Default for SearchWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(target: SearchTarget) -> SearchQuery {
        SearchQuery {
            target,
            start_ts: "2024-01-01T10:00".into(),
            end_ts: "2024-01-01T11:00".into(),
            radius_m: Some(1500.0),
        }
    }

    fn result(id: u64, title: &str) -> SearchResult {
        serde_json::from_value(serde_json::json!({
            "id": id, "title": title, "distance_m": 320.0
        }))
        .unwrap()
    }

    #[test]
    fn point_query_resolves_to_params() {
        let params = query(SearchTarget::Point {
            lat: 23.78,
            lng: 90.41,
        })
        .to_params(None)
        .unwrap();
        assert_eq!(params.lat, Some(23.78));
        assert_eq!(params.lng, Some(90.41));
        assert!(params.query.is_none());
        assert_eq!(params.radius_m, Some(1500.0));
    }

    #[test]
    fn text_query_trims_and_resolves() {
        let params = query(SearchTarget::Text("  Banani ".into()))
            .to_params(None)
            .unwrap();
        assert_eq!(params.query.as_deref(), Some("Banani"));
        assert!(params.lat.is_none());
    }

    #[test]
    fn blank_text_query_is_a_precondition_failure() {
        let err = query(SearchTarget::Text("   ".into()))
            .to_params(None)
            .unwrap_err();
        assert!(err.to_string().contains("address or lat/lng"));
    }

    #[test]
    fn live_location_requires_device_coordinate() {
        let q = query(SearchTarget::LiveLocation);
        let err = q.to_params(None).unwrap_err();
        assert!(err.to_string().contains("Turn on GPS"));

        let params = q.to_params(Some((23.7, 90.4))).unwrap();
        assert_eq!(params.lat, Some(23.7));
    }

    #[test]
    fn inverted_window_is_rejected_before_network() {
        let mut q = query(SearchTarget::Text("Banani".into()));
        q.end_ts = "2024-01-01T09:00".into();
        assert!(q.to_params(None).is_err());
    }

    #[test]
    fn successful_search_lands_in_results() {
        let mut wf = SearchWorkflow::new();
        let generation = wf.start();
        assert!(wf.is_searching());

        let applied = wf.complete(
            generation,
            Ok((vec![result(5, "X")], RequestedArea::default())),
        );
        assert!(applied);
        assert_eq!(wf.results().len(), 1);
        assert_eq!(wf.results()[0].title, "X");
    }

    #[test]
    fn superseded_search_is_discarded() {
        let mut wf = SearchWorkflow::new();
        let gen_a = wf.start();
        let gen_b = wf.start();

        // A resolves late — discarded.
        assert!(!wf.complete(
            gen_a,
            Ok((vec![result(1, "A")], RequestedArea::default()))
        ));
        assert!(wf.is_searching());

        // B resolves — wins.
        assert!(wf.complete(
            gen_b,
            Ok((vec![result(2, "B")], RequestedArea::default()))
        ));
        assert_eq!(wf.results()[0].title, "B");
    }

    #[test]
    fn stale_completion_after_b_already_landed_is_discarded() {
        let mut wf = SearchWorkflow::new();
        let gen_a = wf.start();
        let gen_b = wf.start();
        assert!(wf.complete(
            gen_b,
            Ok((vec![result(2, "B")], RequestedArea::default()))
        ));
        assert!(!wf.complete(
            gen_a,
            Ok((vec![result(1, "A")], RequestedArea::default()))
        ));
        assert_eq!(wf.results()[0].title, "B");
    }

    #[test]
    fn failure_clears_previous_results() {
        let mut wf = SearchWorkflow::new();
        let generation = wf.start();
        wf.complete(
            generation,
            Ok((vec![result(5, "X")], RequestedArea::default())),
        );

        let generation = wf.start();
        wf.complete(generation, Err("No slot available for that time".into()));
        assert!(wf.results().is_empty());
        assert!(matches!(wf.state(), SearchState::Error(_)));
        assert!(wf.focus().is_none());
    }

    #[test]
    fn clear_supersedes_in_flight_search() {
        let mut wf = SearchWorkflow::new();
        let generation = wf.start();
        wf.clear();
        assert!(!wf.complete(
            generation,
            Ok((vec![result(1, "late")], RequestedArea::default()))
        ));
        assert_eq!(*wf.state(), SearchState::Idle);
    }

    #[test]
    fn focus_tracks_backend_echo() {
        let mut wf = SearchWorkflow::new();
        let generation = wf.start();
        let requested: RequestedArea = serde_json::from_value(serde_json::json!({
            "lat": 23.78, "lng": 90.41, "radius_m": 1000.0
        }))
        .unwrap();
        wf.complete(generation, Ok((vec![], requested)));
        // The backend clamped 1500 → 1000; the echo wins.
        assert_eq!(wf.focus().unwrap().radius_m, Some(1000.0));
    }
}
