//! Booking subcommands: create, list, status actions.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use parkgrid_client::api::ApiClient;
use parkgrid_client::session::SessionStore;
use parkgrid_client::workflows::booking;
use parkgrid_core::model::BookingAction;
use parkgrid_core::time;

use crate::auth_cmd::{describe_failure, require_session};
use crate::fmt;

/// Booking subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum BookingCommand {
    /// Book a space for a time window.
    Create {
        /// Space ID from a search result.
        #[arg(short, long)]
        space: u64,
        /// Window start (YYYY-MM-DDTHH:MM).
        #[arg(long)]
        start: String,
        /// Window end (YYYY-MM-DDTHH:MM).
        #[arg(long)]
        end: String,
    },
    /// List your own bookings.
    List,
    /// List bookings made against your spaces (providers).
    Incoming,
    /// Request a status transition: cancel, confirm, check-in, check-out.
    Act {
        /// Booking ID.
        id: u64,
        /// One of: cancel, confirm, check-in, check-out.
        action: String,
    },
}

/// Execute a booking subcommand.
pub async fn run(
    command: BookingCommand,
    client: &ApiClient,
    store: &SessionStore,
) -> anyhow::Result<()> {
    let session = require_session(store)?;
    let token = session.access_token.clone();
    let mut out = io::stdout();

    match command {
        BookingCommand::Create { space, start, end } => {
            time::validate_window(&start, &end)?;
            let bookings = booking::create_and_reload(client, &token, space, &start, &end)
                .await
                .map_err(|e| describe_failure(store, &e))?;
            writeln!(out, "Booking created")?;
            fmt::write_bookings(&mut out, &bookings)?;
        }
        BookingCommand::List => {
            let bookings = client
                .my_bookings(&token)
                .await
                .map_err(|e| describe_failure(store, &e))?;
            fmt::write_bookings(&mut out, &bookings)?;
        }
        BookingCommand::Incoming => {
            let bookings = client
                .bookings_for_my_spaces(&token)
                .await
                .map_err(|e| describe_failure(store, &e))?;
            fmt::write_bookings(&mut out, &bookings)?;
        }
        BookingCommand::Act { id, action } => {
            let action: BookingAction = action.parse()?;
            // Find the booking in whichever list this role sees, so the
            // transition gate can be checked before the request goes out.
            let bookings = if session.user.role.manages_spaces() {
                client.bookings_for_my_spaces(&token).await
            } else {
                client.my_bookings(&token).await
            }
            .map_err(|e| describe_failure(store, &e))?;
            let target = bookings
                .iter()
                .find(|b| b.id == id)
                .ok_or_else(|| anyhow::anyhow!("No booking with id {id}"))?;
            if !action.permitted(session.user.role, target.status) {
                anyhow::bail!(
                    "Cannot {} a {} booking as {}",
                    action.path_segment(),
                    target.status,
                    session.user.role
                );
            }
            let reloaded =
                booking::transition_and_reload(client, &token, session.user.role, target, action)
                    .await
                    .map_err(|e| describe_failure(store, &e))?;
            writeln!(out, "Booking updated")?;
            fmt::write_bookings(&mut out, &reloaded)?;
        }
    }
    Ok(())
}
