//! Booking workflow: one attempt per machine,
//! `selected → submitting → {booked, failed}`, plus the role-gated status
//! transitions on existing bookings.

use parkgrid_core::error::Result;
use parkgrid_core::model::{Booking, BookingAction, Role};
use parkgrid_core::time;

use crate::api::{ApiClient, ApiError};

use super::Failure;

/// A booking attempt for one selected space + time window.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptState {
    Selected,
    Submitting,
    Booked,
    Failed(Failure),
}

/// Per-attempt booking state machine. Window coverage is delegated to the
/// backend; the only client-side precondition is an ordered time window.
#[derive(Debug)]
pub struct BookingAttempt {
    pub space_id: u64,
    pub start_ts: String,
    pub end_ts: String,
    state: AttemptState,
}

impl BookingAttempt {
    /// Select a space for booking. Fails fast on an inverted window.
    pub fn select(space_id: u64, start_ts: &str, end_ts: &str) -> Result<Self> {
        time::validate_window(start_ts, end_ts)?;
        Ok(Self {
            space_id,
            start_ts: start_ts.to_string(),
            end_ts: end_ts.to_string(),
            state: AttemptState::Selected,
        })
    }

    pub const fn state(&self) -> &AttemptState {
        &self.state
    }

    /// Mark the request as in flight.
    pub fn submit(&mut self) {
        self.state = AttemptState::Submitting;
    }

    /// Deliver the backend outcome.
    pub fn complete(&mut self, outcome: std::result::Result<(), Failure>) {
        self.state = match outcome {
            Ok(()) => AttemptState::Booked,
            Err(failure) => AttemptState::Failed(failure),
        };
    }
}

/// Create a booking, then reload the caller's booking list.
///
/// The reload is issued only after creation resolves, and the fresh list —
/// with backend-computed `price_total` and `status` — replaces any local
/// copy wholesale.
pub async fn create_and_reload(
    client: &ApiClient,
    token: &str,
    space_id: u64,
    start_ts: &str,
    end_ts: &str,
) -> std::result::Result<Vec<Booking>, ApiError> {
    client
        .create_booking(token, space_id, start_ts, end_ts)
        .await?;
    client.my_bookings(token).await
}

/// Request a status transition, then reload the list the caller's role
/// displays (drivers: own bookings; providers/admins: bookings on their
/// spaces).
pub async fn transition_and_reload(
    client: &ApiClient,
    token: &str,
    role: Role,
    booking: &Booking,
    action: BookingAction,
) -> std::result::Result<Vec<Booking>, ApiError> {
    debug_assert!(action.permitted(role, booking.status));
    client.booking_action(token, booking.id, action).await?;
    if role.manages_spaces() {
        client.bookings_for_my_spaces(token).await
    } else {
        client.my_bookings(token).await
    }
}
