//! Parkgrid CLI
//!
//! Terminal front-end for the parking marketplace backend. One-shot
//! subcommands for scripting, and an interactive role-gated TUI dashboard
//! when invoked without a subcommand.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::info;

use parkgrid_cli::app::{App, AppEvent, DriverTab, ProviderTab, View};
use parkgrid_cli::{auth_cmd, booking_cmd, report_cmd, search_cmd, space_cmd, ui};
use parkgrid_client::api::ApiClient;
use parkgrid_client::session::SessionStore;
use parkgrid_client::subscriptions::{FixedLocation, LocationWatch, Ticker};
use parkgrid_client::workflows::{booking, spaces, Failure};
use parkgrid_core::model::{BookingAction, Role};
use parkgrid_core::{config, tracing_init, Config};

#[derive(Parser, Debug)]
#[command(name = "parkgrid")]
#[command(version, about = "Parking marketplace CLI", long_about = None)]
struct Cli {
    /// Backend base URL (overrides config files).
    #[arg(long, env = "PARKGRID_API_BASE")]
    api_base: Option<String>,

    /// Fixed device location "lat,lng" used for GPS features in the
    /// dashboard (stand-in for a location sensor).
    #[arg(long)]
    gps: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in, register, log out, show status.
    Auth {
        #[command(subcommand)]
        action: auth_cmd::AuthAction,
    },
    /// Search spaces by address or coordinates.
    Search(search_cmd::SearchArgs),
    /// Search around your saved device location.
    Nearby(search_cmd::NearbyArgs),
    /// Save a device location for nearby searches.
    SaveLocation {
        /// Latitude.
        lat: f64,
        /// Longitude.
        lng: f64,
    },
    /// Create, list and act on bookings.
    Bookings {
        #[command(subcommand)]
        command: booking_cmd::BookingCommand,
    },
    /// Manage spaces and availability windows.
    Spaces {
        #[command(subcommand)]
        command: space_cmd::SpaceCommand,
    },
    /// Monthly income report over your spaces.
    Report,
}

fn parse_gps(raw: &str) -> anyhow::Result<(f64, f64)> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("--gps expects \"lat,lng\""))?;
    Ok((lat.trim().parse()?, lng.trim().parse()?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // One-shot commands log at info; the TUI keeps stderr quiet.
    let is_tui = cli.command.is_none();
    tracing_init::init_tracing(
        if is_tui { "parkgrid=warn" } else { "parkgrid=info" },
        false,
    );

    let mut config = config::load_config(std::env::current_dir().ok().as_deref())?;
    if let Some(base) = cli.api_base {
        config.api.base_url = base;
    }

    info!(version = env!("CARGO_PKG_VERSION"), api = %config.api.base_url, "Starting parkgrid CLI");

    let client = ApiClient::new(&config.api.base_url)?;
    let store = SessionStore::new()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    let gps = cli.gps.as_deref().map(parse_gps).transpose()?;

    match cli.command {
        Some(Commands::Auth { action }) => auth_cmd::run(action, &client, &store).await,
        Some(Commands::Search(args)) => search_cmd::run_search(args, &client, &config).await,
        Some(Commands::Nearby(args)) => {
            search_cmd::run_nearby(args, &client, &config, &store).await
        }
        Some(Commands::SaveLocation { lat, lng }) => {
            search_cmd::run_save_location(lat, lng, &client, &store).await
        }
        Some(Commands::Bookings { command }) => booking_cmd::run(command, &client, &store).await,
        Some(Commands::Spaces { command }) => space_cmd::run(command, &client, &store).await,
        Some(Commands::Report) => report_cmd::run(&client, &store).await,
        None => run_tui(Arc::new(client), &store, &config, gps).await,
    }
}

/// Run the interactive TUI dashboard.
async fn run_tui(
    client: Arc<ApiClient>,
    store: &SessionStore,
    config: &Config,
    gps: Option<(f64, f64)>,
) -> anyhow::Result<()> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_tui_loop(&mut terminal, client, store, config, gps).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Shared context for spawned API tasks.
struct Runtime {
    client: Arc<ApiClient>,
    tx: mpsc::Sender<AppEvent>,
}

impl Runtime {
    fn spawn<F>(&self, fut: F)
    where
        F: std::future::Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(fut.await).await;
        });
    }
}

fn failure(e: &parkgrid_client::api::ApiError) -> Failure {
    Failure::from_api_error(e)
}

/// Kick off the initial loads for a freshly authenticated dashboard.
fn load_dashboard(rt: &Runtime, role: Role, token: &str) {
    let token = token.to_string();
    let client = Arc::clone(&rt.client);
    if role.manages_spaces() {
        let t = token.clone();
        let c = Arc::clone(&client);
        rt.spawn(async move {
            AppEvent::SpacesLoaded(c.my_spaces(&t).await.map_err(|e| failure(&e)))
        });
        let t = token.clone();
        let c = Arc::clone(&client);
        rt.spawn(async move {
            AppEvent::BookingsLoaded(c.bookings_for_my_spaces(&t).await.map_err(|e| failure(&e)))
        });
        rt.spawn(async move {
            AppEvent::ReportLoaded(client.monthly_report(&token).await.map_err(|e| failure(&e)))
        });
    } else {
        rt.spawn(async move {
            AppEvent::BookingsLoaded(client.my_bookings(&token).await.map_err(|e| failure(&e)))
        });
    }
}

/// Main TUI event loop: draw, poll terminal input, drain completions.
async fn run_tui_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    client: Arc<ApiClient>,
    store: &SessionStore,
    config: &Config,
    gps: Option<(f64, f64)>,
) -> anyhow::Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    let (tx, mut rx) = mpsc::channel::<AppEvent>(64);
    let rt = Runtime {
        client,
        tx: tx.clone(),
    };
    let mut app = App::new(store.get(), config);

    // Background subscriptions live exactly as long as this view.
    let _ticker = Ticker::spawn(Duration::from_secs(1), tx.clone(), AppEvent::Tick);
    let _watch = gps.map(|(lat, lng)| {
        LocationWatch::spawn(FixedLocation::new(lat, lng), tx.clone(), |lat, lng| {
            AppEvent::LocationUpdate { lat, lng }
        })
    });

    if let Some(session) = &app.session {
        load_dashboard(&rt, session.user.role, &session.access_token);
    }

    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for terminal events with a timeout so completions keep
        // draining while idle.
        let has_terminal_event =
            tokio::task::block_in_place(|| event::poll(Duration::from_millis(50)))?;

        if has_terminal_event {
            let ev = tokio::task::block_in_place(event::read)?;
            if let Event::Key(key) = ev {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    app.should_quit = true;
                } else {
                    handle_key(&mut app, &rt, key.code, key.modifiers);
                }
            }
        }

        // Drain completion events (non-blocking).
        while let Ok(ev) = rx.try_recv() {
            app.handle_event(ev);
        }
        if app.take_logout_request() {
            let _ = store.clear();
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Route a key press by view.
fn handle_key(app: &mut App, rt: &Runtime, code: KeyCode, modifiers: KeyModifiers) {
    match app.view {
        View::Login => handle_login_key(app, rt, code),
        View::Dashboard => handle_dashboard_key(app, rt, code, modifiers),
    }
}

fn handle_login_key(app: &mut App, rt: &Runtime, code: KeyCode) {
    match code {
        KeyCode::Tab => app.login_form.next_field(),
        KeyCode::Backspace => {
            app.login_form.focused_mut().pop();
        }
        KeyCode::Char(c) => app.login_form.focused_mut().push(c),
        KeyCode::Enter => {
            let phone = app.login_form.phone.trim().to_string();
            let password = app.login_form.password.clone();
            if phone.is_empty() || password.is_empty() {
                return;
            }
            app.busy = true;
            let client = Arc::clone(&rt.client);
            rt.spawn(async move {
                AppEvent::LoggedIn(
                    client
                        .login(&phone, &password)
                        .await
                        .map_err(|e| failure(&e)),
                )
            });
        }
        _ => {}
    }
}

fn handle_dashboard_key(app: &mut App, rt: &Runtime, code: KeyCode, modifiers: KeyModifiers) {
    // Ctrl+L logs out from anywhere on the dashboard.
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('l') {
        app.logout();
        return;
    }
    let Some(session) = app.session.clone() else {
        return;
    };
    let token = session.access_token;

    match session.user.role {
        Role::Driver => handle_driver_key(app, rt, &token, code),
        Role::Provider | Role::Admin => handle_provider_key(app, rt, &token, code),
    }
}

fn handle_driver_key(app: &mut App, rt: &Runtime, token: &str, code: KeyCode) {
    match code {
        KeyCode::F(1) => app.driver_tab = DriverTab::Search,
        KeyCode::F(2) => app.driver_tab = DriverTab::Nearby,
        KeyCode::F(3) => {
            app.driver_tab = DriverTab::Bookings;
            refresh_bookings(app, rt, token);
        }
        _ => match app.driver_tab {
            DriverTab::Search => handle_search_key(app, rt, token, code),
            DriverTab::Nearby => handle_nearby_key(app, rt, token, code),
            DriverTab::Bookings => handle_bookings_key(app, rt, token, code),
        },
    }
}

fn handle_search_key(app: &mut App, rt: &Runtime, token: &str, code: KeyCode) {
    match code {
        KeyCode::Tab => app.search_form.next_field(),
        KeyCode::Backspace => {
            app.search_form.focused_mut().pop();
        }
        KeyCode::Char(c) => app.search_form.focused_mut().push(c),
        KeyCode::Up => app.move_result_selection(-1),
        KeyCode::Down => app.move_result_selection(1),
        KeyCode::Enter => spawn_search(app, rt, false),
        KeyCode::F(5) => spawn_search(app, rt, true),
        KeyCode::F(6) => app.search.clear(),
        KeyCode::F(8) => spawn_booking(app, rt, token),
        _ => {}
    }
}

fn handle_nearby_key(app: &mut App, rt: &Runtime, token: &str, code: KeyCode) {
    match code {
        KeyCode::Tab => app.nearby_form.next_field(),
        KeyCode::Backspace => {
            app.nearby_form.focused_mut().pop();
        }
        KeyCode::Char(c) => app.nearby_form.focused_mut().push(c),
        KeyCode::Up => app.move_result_selection(-1),
        KeyCode::Down => app.move_result_selection(1),
        KeyCode::Enter => {
            if let Some((generation, start_ts, end_ts, radius)) = app.start_nearby() {
                let client = Arc::clone(&rt.client);
                let token = token.to_string();
                rt.spawn(async move {
                    AppEvent::SearchFinished {
                        generation,
                        nearby: true,
                        outcome: client
                            .search_nearby(&token, &start_ts, &end_ts, Some(radius))
                            .await
                            .map_err(|e| failure(&e)),
                    }
                });
            }
        }
        KeyCode::F(5) => {
            // Save the current device location for nearby search.
            let Some((lat, lng)) = app.live_location else {
                app.error = Some("Turn on GPS to save your location".into());
                return;
            };
            app.busy = true;
            let client = Arc::clone(&rt.client);
            let token = token.to_string();
            rt.spawn(async move {
                AppEvent::LocationSaved(
                    client
                        .save_my_location(&token, lat, lng)
                        .await
                        .map_err(|e| failure(&e)),
                )
            });
        }
        KeyCode::F(6) => app.nearby.clear(),
        KeyCode::F(8) => spawn_booking(app, rt, token),
        _ => {}
    }
}

fn spawn_search(app: &mut App, rt: &Runtime, use_live: bool) {
    if let Some((generation, params)) = app.start_search(use_live) {
        let client = Arc::clone(&rt.client);
        rt.spawn(async move {
            AppEvent::SearchFinished {
                generation,
                nearby: false,
                outcome: client.search(&params).await.map_err(|e| failure(&e)),
            }
        });
    }
}

fn spawn_booking(app: &mut App, rt: &Runtime, token: &str) {
    if let Some((space_id, start_ts, end_ts)) = app.book_selected() {
        let client = Arc::clone(&rt.client);
        let token = token.to_string();
        rt.spawn(async move {
            AppEvent::BookingCreated(
                booking::create_and_reload(&client, &token, space_id, &start_ts, &end_ts)
                    .await
                    .map_err(|e| failure(&e)),
            )
        });
    }
}

fn refresh_bookings(app: &mut App, rt: &Runtime, token: &str) {
    let Some(role) = app.role() else { return };
    app.busy = true;
    let client = Arc::clone(&rt.client);
    let token = token.to_string();
    rt.spawn(async move {
        let outcome = if role.manages_spaces() {
            client.bookings_for_my_spaces(&token).await
        } else {
            client.my_bookings(&token).await
        };
        AppEvent::BookingsLoaded(outcome.map_err(|e| failure(&e)))
    });
}

fn handle_bookings_key(app: &mut App, rt: &Runtime, token: &str, code: KeyCode) {
    match code {
        KeyCode::Up => app.move_booking_selection(-1),
        KeyCode::Down => app.move_booking_selection(1),
        KeyCode::Char('r') => refresh_bookings(app, rt, token),
        KeyCode::Char(c) => {
            let Some(action) = BookingAction::ALL
                .into_iter()
                .find(|a| ui::action_key(*a) == c)
            else {
                return;
            };
            let Some(role) = app.role() else { return };
            let Some(booking_id) = app.request_booking_action(action) else {
                return;
            };
            let Some(target) = app
                .visible_bookings()
                .iter()
                .find(|b| b.id == booking_id)
                .cloned()
            else {
                return;
            };
            app.busy = true;
            let client = Arc::clone(&rt.client);
            let token = token.to_string();
            rt.spawn(async move {
                AppEvent::BookingsRefreshed(
                    booking::transition_and_reload(&client, &token, role, &target, action)
                        .await
                        .map_err(|e| failure(&e)),
                )
            });
        }
        _ => {}
    }
}

fn handle_provider_key(app: &mut App, rt: &Runtime, token: &str, code: KeyCode) {
    match code {
        KeyCode::F(1) => app.provider_tab = ProviderTab::Overview,
        KeyCode::F(2) => app.provider_tab = ProviderTab::Spaces,
        KeyCode::F(3) => {
            app.provider_tab = ProviderTab::Availability;
            refresh_availability(app, rt, token);
        }
        KeyCode::F(4) => {
            app.provider_tab = ProviderTab::Bookings;
            refresh_bookings(app, rt, token);
        }
        _ => match app.provider_tab {
            ProviderTab::Overview => {
                if code == KeyCode::Char('r') {
                    if let Some(session) = &app.session {
                        load_dashboard(rt, session.user.role, &session.access_token);
                    }
                }
            }
            ProviderTab::Spaces => handle_spaces_key(app, rt, token, code),
            ProviderTab::Availability => handle_availability_key(app, rt, token, code),
            ProviderTab::Bookings => handle_bookings_key(app, rt, token, code),
        },
    }
}

fn handle_spaces_key(app: &mut App, rt: &Runtime, token: &str, code: KeyCode) {
    match code {
        KeyCode::Tab => app.space_form.next_field(),
        KeyCode::Backspace => {
            app.space_form.focused_mut().pop();
        }
        KeyCode::Char(c) => app.space_form.focused_mut().push(c),
        KeyCode::F(5) => {
            let query = app.space_form.place_query.trim().to_string();
            if query.is_empty() {
                app.error = Some("Type a place query to geocode".into());
                return;
            }
            app.busy = true;
            let client = Arc::clone(&rt.client);
            rt.spawn(async move {
                AppEvent::PlacePicked(client.geocode(&query).await.map_err(|e| failure(&e)))
            });
        }
        KeyCode::F(6) => app.picked = None,
        KeyCode::Enter => {
            if let Some(request) = app.space_request() {
                let client = Arc::clone(&rt.client);
                let token = token.to_string();
                rt.spawn(async move {
                    AppEvent::SpaceCreated(
                        spaces::create_space_and_reload(&client, &token, &request)
                            .await
                            .map_err(|e| failure(&e)),
                    )
                });
            }
        }
        _ => {}
    }
}

fn refresh_availability(app: &mut App, rt: &Runtime, token: &str) {
    let Some(space) = app.selected_space() else {
        return;
    };
    let space_id = space.id;
    app.busy = true;
    let client = Arc::clone(&rt.client);
    let token = token.to_string();
    rt.spawn(async move {
        AppEvent::AvailabilityLoaded(
            client
                .space_availability(&token, space_id)
                .await
                .map_err(|e| failure(&e)),
        )
    });
}

fn handle_availability_key(app: &mut App, rt: &Runtime, token: &str, code: KeyCode) {
    match code {
        KeyCode::Up => {
            app.move_space_selection(-1);
            refresh_availability(app, rt, token);
        }
        KeyCode::Down => {
            app.move_space_selection(1);
            refresh_availability(app, rt, token);
        }
        KeyCode::Tab => app.availability_form.next_field(),
        KeyCode::Backspace => {
            app.availability_form.focused_mut().pop();
        }
        KeyCode::Char(c) => app.availability_form.focused_mut().push(c),
        KeyCode::Enter => {
            if let Some((space_id, request)) = app.availability_request() {
                let client = Arc::clone(&rt.client);
                let token = token.to_string();
                rt.spawn(async move {
                    AppEvent::AvailabilityAdded(
                        spaces::add_availability_and_reload(&client, &token, space_id, &request)
                            .await
                            .map_err(|e| failure(&e)),
                    )
                });
            }
        }
        _ => {}
    }
}
