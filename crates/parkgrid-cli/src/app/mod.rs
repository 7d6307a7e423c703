//! TUI application state.

mod forms;
mod state;

pub use forms::{AvailabilityForm, LoginForm, NearbyForm, SearchForm, SpaceForm};
pub use state::{App, AppEvent, DriverTab, ProviderTab, View};
