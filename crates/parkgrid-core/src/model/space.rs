//! Spaces, availability windows and search projections.

use serde::{Deserialize, Serialize};

/// A provider-owned, bookable parking location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Label resolved from the map picker, when one was chosen.
    #[serde(default)]
    pub place_label: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default)]
    pub height_limit: Option<f64>,
    #[serde(default)]
    pub is_active: bool,
}

const fn default_capacity() -> u32 {
    1
}

impl Space {
    /// Best display label for a space: address, then picker label.
    pub fn display_address(&self) -> &str {
        self.address
            .as_deref()
            .or(self.place_label.as_deref())
            .unwrap_or("No address set")
    }
}

/// A time range + hourly rate during which a space accepts bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: u64,
    pub space_id: u64,
    pub start_ts: String,
    pub end_ts: String,
    pub base_price_per_hour: f64,
    #[serde(default)]
    pub is_active: bool,
}

/// A space projected with its distance from the query point. Ephemeral:
/// lives only for the duration of the current search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub place_label: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    pub distance_m: f64,
}

impl SearchResult {
    pub fn display_address(&self) -> &str {
        self.place_label
            .as_deref()
            .or(self.address.as_deref())
            .unwrap_or("")
    }
}

/// The search center/radius the backend actually used. Authoritative over
/// whatever the client asked for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestedArea {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub radius_m: Option<f64>,
}

/// Response envelope of `/search` and `/search/nearby`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
    #[serde(default)]
    pub requested: RequestedArea,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_space_full() {
        let json = r#"{
            "id": 7,
            "title": "Banani Garage",
            "description": "Covered",
            "address": "House 12, Road 5",
            "place_label": "Banani, Dhaka",
            "lat": 23.7937,
            "lng": 90.4066,
            "capacity": 4,
            "height_limit": 2.1,
            "is_active": true
        }"#;
        let space: Space = serde_json::from_str(json).unwrap();
        assert_eq!(space.id, 7);
        assert_eq!(space.capacity, 4);
        assert_eq!(space.height_limit, Some(2.1));
        assert!(space.is_active);
        assert_eq!(space.display_address(), "House 12, Road 5");
    }

    #[test]
    fn deserialize_space_minimal() {
        let json = r#"{"id": 1, "title": "Spot", "lat": 0.0, "lng": 0.0}"#;
        let space: Space = serde_json::from_str(json).unwrap();
        assert_eq!(space.capacity, 1);
        assert!(space.description.is_none());
        assert!(!space.is_active);
        assert_eq!(space.display_address(), "No address set");
    }

    #[test]
    fn search_result_prefers_place_label() {
        let json = r#"{
            "id": 5,
            "title": "X",
            "address": "raw address",
            "place_label": "Nice Label",
            "distance_m": 320.0
        }"#;
        let r: SearchResult = serde_json::from_str(json).unwrap();
        assert_eq!(r.display_address(), "Nice Label");
        assert!(r.lat.is_none());
    }

    #[test]
    fn deserialize_search_response_with_requested_echo() {
        let json = r#"{
            "items": [{"id": 5, "title": "X", "distance_m": 320}],
            "requested": {"lat": 23.78, "lng": 90.41, "radius_m": 1500}
        }"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.items.len(), 1);
        assert_eq!(resp.items[0].title, "X");
        assert_eq!(resp.requested.radius_m, Some(1500.0));
    }

    #[test]
    fn deserialize_search_response_without_requested() {
        let resp: SearchResponse = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(resp.items.is_empty());
        assert!(resp.requested.lat.is_none());
    }
}
