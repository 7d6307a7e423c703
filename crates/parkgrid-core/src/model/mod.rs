//! Domain model for the Parkgrid client.
//!
//! These are the wire shapes exchanged with the backend plus the role and
//! booking-status lifecycles the UI gates on. The backend is authoritative
//! for every entity except the local [`Session`]; local copies are caches
//! invalidated by re-fetch after mutations.

mod booking;
mod geo;
mod report;
mod space;

pub use booking::{Booking, BookingAction, BookingStatus, SpaceSummary};
pub use geo::GeoPoint;
pub use report::{MonthIncome, MonthlyIncomeReport};
pub use space::{AvailabilityWindow, RequestedArea, SearchResponse, SearchResult, Space};

use serde::{Deserialize, Serialize};

/// Role attached to an authenticated user. Gates which actions a session
/// may perform; the backend re-validates every gated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Driver,
    Provider,
    Admin,
}

impl Role {
    /// Whether this role manages spaces (admins are routed through the
    /// provider views).
    pub const fn manages_spaces(self) -> bool {
        matches!(self, Self::Provider | Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Driver => write!(f, "driver"),
            Self::Provider => write!(f, "provider"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// Authenticated user as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub role: Role,
}

/// Local session: bearer token plus the user it belongs to.
///
/// Created on login/registration, persisted by the session store, cleared
/// on logout or on any authentication-failure response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}
