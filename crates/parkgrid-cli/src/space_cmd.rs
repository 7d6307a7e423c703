//! Space and availability subcommands for providers.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use parkgrid_client::api::ApiClient;
use parkgrid_client::session::SessionStore;
use parkgrid_client::workflows::spaces::{
    add_availability_and_reload, create_space_and_reload, AvailabilityDraft, SpaceDraft,
};
use parkgrid_core::model::GeoPoint;

use crate::auth_cmd::{describe_failure, require_session};
use crate::fmt;

/// Space subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum SpaceCommand {
    /// List your spaces.
    List,
    /// Create a space at a picked or geocoded location.
    Create {
        /// Space title.
        #[arg(short, long)]
        title: String,
        /// Capacity (vehicles).
        #[arg(short, long, default_value_t = 1)]
        capacity: u32,
        /// Latitude of the space.
        #[arg(long, requires = "lng")]
        lat: Option<f64>,
        /// Longitude of the space.
        #[arg(long, requires = "lat")]
        lng: Option<f64>,
        /// Free-text place query, geocoded when no coordinates are given.
        #[arg(short, long)]
        place: Option<String>,
        /// Street address label.
        #[arg(short, long)]
        address: Option<String>,
        /// Height limit in meters.
        #[arg(long)]
        height_limit: Option<f64>,
    },
    /// List availability windows of one of your spaces.
    Availability {
        /// Space ID.
        id: u64,
    },
    /// Add an availability window to one of your spaces.
    AddAvailability {
        /// Space ID.
        id: u64,
        /// Window start (YYYY-MM-DDTHH:MM).
        #[arg(long)]
        start: String,
        /// Window end (YYYY-MM-DDTHH:MM).
        #[arg(long)]
        end: String,
        /// Hourly rate.
        #[arg(short, long)]
        rate: f64,
    },
}

/// Execute a space subcommand.
pub async fn run(
    command: SpaceCommand,
    client: &ApiClient,
    store: &SessionStore,
) -> anyhow::Result<()> {
    let session = require_session(store)?;
    let token = session.access_token.clone();
    let mut out = io::stdout();

    match command {
        SpaceCommand::List => {
            let spaces = client
                .my_spaces(&token)
                .await
                .map_err(|e| describe_failure(store, &e))?;
            fmt::write_spaces(&mut out, &spaces)?;
        }
        SpaceCommand::Create {
            title,
            capacity,
            lat,
            lng,
            place,
            address,
            height_limit,
        } => {
            // Resolve the location exactly as the picker would: explicit
            // coordinates win; otherwise the place query is geocoded.
            let picked = match (lat, lng, &place) {
                (Some(lat), Some(lng), _) => GeoPoint::new(lat, lng)?,
                (_, _, Some(query)) => client
                    .geocode(query)
                    .await
                    .map_err(|e| describe_failure(store, &e))?,
                _ => anyhow::bail!("Give --lat/--lng or a --place query for the space location"),
            };
            let draft = SpaceDraft {
                title,
                description: None,
                address,
                capacity,
                height_limit,
            };
            let request = draft.into_request(Some(&picked))?;
            let spaces = create_space_and_reload(client, &token, &request)
                .await
                .map_err(|e| describe_failure(store, &e))?;
            writeln!(out, "Space created")?;
            fmt::write_spaces(&mut out, &spaces)?;
        }
        SpaceCommand::Availability { id } => {
            let windows = client
                .space_availability(&token, id)
                .await
                .map_err(|e| describe_failure(store, &e))?;
            fmt::write_availability(&mut out, &windows)?;
        }
        SpaceCommand::AddAvailability {
            id,
            start,
            end,
            rate,
        } => {
            let draft = AvailabilityDraft {
                start_ts: start,
                end_ts: end,
                base_price_per_hour: rate,
            };
            let request = draft.into_request()?;
            let windows = add_availability_and_reload(client, &token, id, &request)
                .await
                .map_err(|e| describe_failure(store, &e))?;
            writeln!(out, "Availability added")?;
            fmt::write_availability(&mut out, &windows)?;
        }
    }
    Ok(())
}
