//! Provider monthly income report.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io;

use parkgrid_client::api::ApiClient;
use parkgrid_client::session::SessionStore;

use crate::auth_cmd::{describe_failure, require_session};
use crate::fmt;

/// Fetch and print the monthly income report.
pub async fn run(client: &ApiClient, store: &SessionStore) -> anyhow::Result<()> {
    let session = require_session(store)?;
    let report = client
        .monthly_report(&session.access_token)
        .await
        .map_err(|e| describe_failure(store, &e))?;
    fmt::write_report(&mut io::stdout(), &report)?;
    Ok(())
}
