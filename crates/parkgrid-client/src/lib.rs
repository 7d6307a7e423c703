//! Parkgrid Client Library
//!
//! Everything between the terminal front-end and the parking backend:
//! the REST API client, the persisted session store, geocoding adapters,
//! and the search/booking/space-management workflow state machines.

pub mod api;
pub mod geo;
pub mod session;
pub mod subscriptions;
pub mod workflows;

pub use api::{ApiClient, ApiError};
pub use session::SessionStore;
pub use workflows::Failure;
