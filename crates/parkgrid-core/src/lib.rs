//! Parkgrid Core Library
//!
//! Shared functionality for Parkgrid components:
//! - Domain model for spaces, availability windows, bookings and sessions
//! - Configuration resolution and hierarchy
//! - Timestamp parsing for display and countdowns
//! - Common error types

pub mod config;
pub mod error;
pub mod model;
pub mod time;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use model::{
    AvailabilityWindow, Booking, BookingAction, BookingStatus, GeoPoint, Role, SearchResponse,
    SearchResult, Session, Space, User,
};
