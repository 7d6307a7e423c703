//! Geographic point with an optional resolved address label.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A validated coordinate pair. Both coordinates are always present; the
/// address is a non-empty label or absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl GeoPoint {
    /// Build a point, rejecting out-of-range coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(Error::Validation(format!("latitude out of range: {lat}")));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(Error::Validation(format!("longitude out of range: {lng}")));
        }
        Ok(Self {
            lat,
            lng,
            address: None,
        })
    }

    /// Attach an address label. Blank labels are dropped so the invariant
    /// "non-empty string or absent" holds by construction.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        let address = address.into();
        let trimmed = address.trim();
        self.address = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}
