//! Auth subcommands: login, register, logout, status.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use parkgrid_client::api::ApiClient;
use parkgrid_client::session::SessionStore;
use parkgrid_client::workflows::Failure;
use parkgrid_core::model::Role;

/// Auth subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum AuthAction {
    /// Log in with phone + password.
    Login {
        /// Phone number.
        #[arg(short, long)]
        phone: String,
        /// Password. Prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Register a new account.
    Register {
        /// Display name.
        #[arg(short, long)]
        name: String,
        /// Phone number.
        #[arg(short, long)]
        phone: String,
        /// Password. Prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
        /// Account role: driver or provider.
        #[arg(short, long, value_parser = parse_role)]
        role: Role,
    },
    /// Drop the local session.
    Logout,
    /// Show current auth status.
    Status,
}

fn parse_role(s: &str) -> Result<Role, String> {
    match s {
        "driver" => Ok(Role::Driver),
        "provider" => Ok(Role::Provider),
        "admin" => Ok(Role::Admin),
        other => Err(format!("unknown role: {other} (expected driver or provider)")),
    }
}

fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(p) => Ok(p),
        None => Ok(dialoguer::Password::new()
            .with_prompt("Password")
            .interact()?),
    }
}

/// Load the persisted session or fail with a login hint.
pub fn require_session(store: &SessionStore) -> anyhow::Result<parkgrid_core::model::Session> {
    store
        .get()
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Use `parkgrid auth login` first."))
}

/// Convert an API error for display. An expired session also clears the
/// local store so the next invocation lands on the login hint.
pub fn describe_failure(store: &SessionStore, e: &parkgrid_client::api::ApiError) -> anyhow::Error {
    let failure = Failure::from_api_error(e);
    if failure.forces_logout() {
        let _ = store.clear();
    }
    anyhow::anyhow!(failure.user_message())
}

/// Execute an auth subcommand.
pub async fn run(
    action: AuthAction,
    client: &ApiClient,
    store: &SessionStore,
) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        AuthAction::Login { phone, password } => {
            let password = password_or_prompt(password)?;
            let session = client
                .login(&phone, &password)
                .await
                .map_err(|e| anyhow::anyhow!(Failure::from_api_error(&e).user_message()))?;
            store.set(&session)?;
            writeln!(out, "Logged in as {} ({})", session.user.name, session.user.role)?;
        }
        AuthAction::Register {
            name,
            phone,
            password,
            role,
        } => {
            let password = password_or_prompt(password)?;
            let session = client
                .register(&name, &phone, &password, role)
                .await
                .map_err(|e| anyhow::anyhow!(Failure::from_api_error(&e).user_message()))?;
            store.set(&session)?;
            writeln!(out, "Registered {} as {}", session.user.name, session.user.role)?;
        }
        AuthAction::Logout => {
            store.clear()?;
            writeln!(out, "Logged out")?;
        }
        AuthAction::Status => match store.get() {
            Some(session) => {
                writeln!(out, "Logged in as: {}", session.user.name)?;
                writeln!(out, "Role: {}", session.user.role)?;
                writeln!(out, "User ID: {}", session.user.id)?;
            }
            None => {
                writeln!(out, "Not logged in")?;
            }
        },
    }
    Ok(())
}
