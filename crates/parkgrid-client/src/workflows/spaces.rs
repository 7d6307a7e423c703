//! Provider-side space and availability management.
//!
//! Creation passes picker coordinates through verbatim; after any mutation
//! the owner's lists are re-fetched rather than patched locally, so
//! server-side derived fields never drift.

use parkgrid_core::error::{Error, Result};
use parkgrid_core::model::{AvailabilityWindow, Booking, GeoPoint, Space};
use parkgrid_core::time;

use crate::api::{ApiClient, ApiError, NewAvailability, NewSpace};

/// Draft of a new space as collected by the form.
#[derive(Debug, Clone, Default)]
pub struct SpaceDraft {
    pub title: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub capacity: u32,
    pub height_limit: Option<f64>,
}

impl SpaceDraft {
    /// Combine the form fields with the picked location into a request
    /// body. The picked address back-fills the space's address and place
    /// fields when the form left them empty.
    pub fn into_request(self, picked: Option<&GeoPoint>) -> Result<NewSpace> {
        let point = picked.ok_or_else(|| {
            Error::Validation("Pick a location on the map before creating a space".into())
        })?;
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("Title is required".into()));
        }
        if self.capacity == 0 {
            return Err(Error::Validation("Capacity must be at least 1".into()));
        }
        let address = self
            .address
            .filter(|a| !a.trim().is_empty())
            .or_else(|| point.address.clone());
        Ok(NewSpace {
            title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            address,
            place_query: point.address.clone(),
            place_label: point.address.clone(),
            lat: point.lat,
            lng: point.lng,
            capacity: self.capacity,
            height_limit: self.height_limit,
        })
    }
}

/// Draft of a new availability window.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityDraft {
    pub start_ts: String,
    pub end_ts: String,
    pub base_price_per_hour: f64,
}

impl AvailabilityDraft {
    /// Validate and convert to a request body. Overlap with existing
    /// windows is the backend's invariant, not checked here.
    pub fn into_request(self) -> Result<NewAvailability> {
        time::validate_window(&self.start_ts, &self.end_ts)?;
        if self.base_price_per_hour < 0.0 {
            return Err(Error::Validation("Price per hour cannot be negative".into()));
        }
        Ok(NewAvailability {
            start_ts: self.start_ts,
            end_ts: self.end_ts,
            base_price_per_hour: self.base_price_per_hour,
            is_active: true,
        })
    }
}

/// Create a space, then reload the owner's space list. The reload is
/// sequenced strictly after creation resolves.
pub async fn create_space_and_reload(
    client: &ApiClient,
    token: &str,
    space: &NewSpace,
) -> std::result::Result<Vec<Space>, ApiError> {
    client.create_space(token, space).await?;
    client.my_spaces(token).await
}

/// Add an availability window, then reload that space's window list.
pub async fn add_availability_and_reload(
    client: &ApiClient,
    token: &str,
    space_id: u64,
    window: &NewAvailability,
) -> std::result::Result<Vec<AvailabilityWindow>, ApiError> {
    client.add_availability(token, space_id, window).await?;
    client.space_availability(token, space_id).await
}

/// Aggregate numbers shown on the provider overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderStats {
    pub spaces: usize,
    pub active_spaces: usize,
    pub bookings: usize,
    pub upcoming: usize,
}

impl ProviderStats {
    pub fn compute(spaces: &[Space], bookings: &[Booking]) -> Self {
        Self {
            spaces: spaces.len(),
            active_spaces: spaces.iter().filter(|s| s.is_active).count(),
            bookings: bookings.len(),
            upcoming: bookings.iter().filter(|b| b.status.is_upcoming()).count(),
        }
    }
}
