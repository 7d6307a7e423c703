//! Search subcommands: public search and saved-location nearby search.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use parkgrid_client::api::ApiClient;
use parkgrid_client::session::SessionStore;
use parkgrid_client::workflows::search::{SearchQuery, SearchTarget};
use parkgrid_core::Config;
use parkgrid_core::time;

use crate::auth_cmd::{describe_failure, require_session};
use crate::fmt;

/// Arguments shared by the search subcommands.
#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Free-text address/area query (geocoded server-side).
    #[arg(short, long)]
    pub query: Option<String>,
    /// Latitude of the search center.
    #[arg(long, requires = "lng")]
    pub lat: Option<f64>,
    /// Longitude of the search center.
    #[arg(long, requires = "lat")]
    pub lng: Option<f64>,
    /// Window start (YYYY-MM-DDTHH:MM). Defaults to now.
    #[arg(long)]
    pub start: Option<String>,
    /// Window end (YYYY-MM-DDTHH:MM). Defaults to start + configured hours.
    #[arg(long)]
    pub end: Option<String>,
    /// Search radius in meters. The backend clamps the effective value.
    #[arg(short, long)]
    pub radius: Option<f64>,
}

impl SearchArgs {
    fn window(&self, config: &Config) -> (String, String) {
        let (default_start, default_end) = time::default_window(config.search.default_window_hours);
        (
            self.start.clone().unwrap_or(default_start),
            self.end.clone().unwrap_or(default_end),
        )
    }
}

/// Run a public search and print the ranked results as the backend ordered
/// them (no client-side re-sorting).
pub async fn run_search(
    args: SearchArgs,
    client: &ApiClient,
    config: &Config,
) -> anyhow::Result<()> {
    let (start_ts, end_ts) = args.window(config);
    let target = match (&args.query, args.lat, args.lng) {
        (_, Some(lat), Some(lng)) => SearchTarget::Point { lat, lng },
        (Some(query), _, _) => SearchTarget::Text(query.clone()),
        _ => SearchTarget::Text(String::new()),
    };
    let query = SearchQuery {
        target,
        start_ts,
        end_ts,
        radius_m: args.radius.or(Some(config.search.default_radius_m)),
    };
    let params = query.to_params(None)?;
    let resp = client
        .search(&params)
        .await
        .map_err(|e| anyhow::anyhow!(parkgrid_client::Failure::from_api_error(&e).user_message()))?;

    let mut out = io::stdout();
    if let (Some(lat), Some(lng)) = (resp.requested.lat, resp.requested.lng) {
        let radius = resp
            .requested
            .radius_m
            .map_or_else(String::new, |r| format!(", radius {r} m"));
        writeln!(out, "Results around {lat:.5}, {lng:.5}{radius}:")?;
    }
    fmt::write_search_results(&mut out, &resp.items)?;
    Ok(())
}

/// Nearby-search arguments (time window + radius only; the center is the
/// caller's previously saved location).
#[derive(clap::Args, Debug)]
pub struct NearbyArgs {
    /// Window start (YYYY-MM-DDTHH:MM). Defaults to now.
    #[arg(long)]
    pub start: Option<String>,
    /// Window end (YYYY-MM-DDTHH:MM). Defaults to start + configured hours.
    #[arg(long)]
    pub end: Option<String>,
    /// Search radius in meters.
    #[arg(short, long)]
    pub radius: Option<f64>,
}

/// Run a nearby search against the saved device location.
pub async fn run_nearby(
    args: NearbyArgs,
    client: &ApiClient,
    config: &Config,
    store: &SessionStore,
) -> anyhow::Result<()> {
    let session = require_session(store)?;
    let (default_start, default_end) = time::default_window(config.search.default_window_hours);
    let start_ts = args.start.unwrap_or(default_start);
    let end_ts = args.end.unwrap_or(default_end);
    time::validate_window(&start_ts, &end_ts)?;

    let resp = client
        .search_nearby(
            &session.access_token,
            &start_ts,
            &end_ts,
            args.radius.or(Some(config.search.default_radius_m)),
        )
        .await
        .map_err(|e| describe_failure(store, &e))?;

    let mut out = io::stdout();
    fmt::write_search_results(&mut out, &resp.items)?;
    Ok(())
}

/// Save a device location for later nearby searches.
pub async fn run_save_location(
    lat: f64,
    lng: f64,
    client: &ApiClient,
    store: &SessionStore,
) -> anyhow::Result<()> {
    let session = require_session(store)?;
    parkgrid_core::model::GeoPoint::new(lat, lng)?;
    client
        .save_my_location(&session.access_token, lat, lng)
        .await
        .map_err(|e| describe_failure(store, &e))?;
    let mut out = io::stdout();
    writeln!(out, "GPS location saved")?;
    Ok(())
}
