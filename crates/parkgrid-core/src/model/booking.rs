//! Booking lifecycle: statuses, role-gated actions and the wire shape.

use serde::{Deserialize, Serialize};

use super::Role;

/// Booking status lifecycle. `CheckedOut` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Reserved,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    /// No transition is offered or accepted out of a terminal status.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::CheckedOut | Self::Cancelled)
    }

    /// Whether the booking still counts as upcoming in overview stats.
    pub const fn is_upcoming(self) -> bool {
        matches!(self, Self::Reserved | Self::Confirmed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Reserved => "reserved",
            Self::Confirmed => "confirmed",
            Self::CheckedIn => "checked_in",
            Self::CheckedOut => "checked_out",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// Status-transition actions a client may request. Each maps onto a PATCH
/// path segment and is gated by (role, current status). The gate is a UI
/// affordance only; the backend re-validates every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Cancel,
    Confirm,
    CheckIn,
    CheckOut,
}

impl BookingAction {
    pub const ALL: [Self; 4] = [Self::Cancel, Self::Confirm, Self::CheckIn, Self::CheckOut];

    /// URL path segment of the PATCH endpoint.
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Cancel => "cancel",
            Self::Confirm => "confirm",
            Self::CheckIn => "check-in",
            Self::CheckOut => "check-out",
        }
    }

    /// Whether `role` may request this action from `status`.
    pub const fn permitted(self, role: Role, status: BookingStatus) -> bool {
        match self {
            Self::Cancel => {
                status.is_upcoming() && matches!(role, Role::Driver | Role::Provider | Role::Admin)
            }
            Self::Confirm => {
                matches!(status, BookingStatus::Reserved) && role.manages_spaces()
            }
            Self::CheckIn => {
                matches!(status, BookingStatus::Confirmed) && role.manages_spaces()
            }
            Self::CheckOut => {
                matches!(status, BookingStatus::CheckedIn) && role.manages_spaces()
            }
        }
    }

    /// Actions `role` may take on a booking in `status`, in display order.
    pub fn available(role: Role, status: BookingStatus) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|a| a.permitted(role, status))
            .collect()
    }
}

impl std::str::FromStr for BookingAction {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cancel" => Ok(Self::Cancel),
            "confirm" => Ok(Self::Confirm),
            "check-in" => Ok(Self::CheckIn),
            "check-out" => Ok(Self::CheckOut),
            other => Err(crate::Error::Validation(format!(
                "unknown booking action: {other}"
            ))),
        }
    }
}

/// Embedded space summary carried on booking rows for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// A driver's reservation of a space for a concrete time range.
///
/// `price_total` and `status` are backend-computed; the client never
/// synthesizes either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: u64,
    pub space_id: u64,
    pub user_id: u64,
    pub start_ts: String,
    pub end_ts: String,
    #[serde(default)]
    pub price_total: Option<f64>,
    pub status: BookingStatus,
    #[serde(default)]
    pub space: Option<SpaceSummary>,
}

impl Booking {
    pub fn space_title(&self) -> &str {
        self.space.as_ref().map_or("(space)", |s| s.title.as_str())
    }
}
