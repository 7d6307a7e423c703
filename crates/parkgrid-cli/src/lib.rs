//! Parkgrid CLI Library
//!
//! Terminal front-end for the parking marketplace backend. Provides
//! one-shot subcommands (auth, search, book, spaces, report) and an
//! interactive role-gated TUI dashboard.

pub mod app;
pub mod auth_cmd;
pub mod booking_cmd;
pub mod fmt;
pub mod report_cmd;
pub mod search_cmd;
pub mod space_cmd;
pub mod ui;
