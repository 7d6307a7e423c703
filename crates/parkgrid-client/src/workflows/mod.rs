//! Client-side workflow state machines.
//!
//! Each workflow catches errors at its own boundary and converts them to a
//! single user-facing string; nothing propagates uncaught into rendering.

pub mod booking;
pub mod search;
pub mod spaces;

use crate::api::ApiError;

/// User-facing failure classification shared by the workflows.
///
/// Domain conflicts get friendlier, specific copy than the raw backend
/// string; an expired session additionally forces the logout-once latch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// No availability window covers the requested time.
    NoAvailability,
    /// The requested range overlaps an existing booking.
    AlreadyBooked,
    /// The session's role may not perform the action.
    Forbidden,
    /// The session token was rejected; clear it and return to the entry
    /// view (exactly once).
    SessionExpired,
    /// Anything else: the backend message verbatim, or a generic fallback.
    Other(String),
}

impl Failure {
    /// Classify an API error using the same rules the original UI applied
    /// to backend messages.
    pub fn from_api_error(err: &ApiError) -> Self {
        if err.is_auth_failure() {
            return Self::SessionExpired;
        }
        let msg = match err {
            ApiError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self::from_message(&msg)
    }

    /// Classify a raw backend message.
    pub fn from_message(msg: &str) -> Self {
        let lower = msg.to_lowercase();
        if msg.contains("NO_AVAILABILITY") {
            Self::NoAvailability
        } else if msg.contains("ALREADY_BOOKED") || msg.contains("overlaps another booking") {
            Self::AlreadyBooked
        } else if lower.contains("unauth") {
            Self::SessionExpired
        } else if lower.contains("forbidden") {
            Self::Forbidden
        } else if msg.is_empty() {
            Self::Other("Something went wrong".into())
        } else {
            Self::Other(msg.to_string())
        }
    }

    /// The single line shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoAvailability => "No slot available for that time".into(),
            Self::AlreadyBooked => "Already booked for that time".into(),
            Self::Forbidden => "You do not have permission".into(),
            Self::SessionExpired => "Session expired. Redirecting...".into(),
            Self::Other(msg) => msg.clone(),
        }
    }

    pub const fn forces_logout(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_message())
    }
}
