//! Application state and event handling for the dashboard.

use chrono::NaiveDateTime;

use parkgrid_client::api::SearchParams;
use parkgrid_client::session::LogoutLatch;
use parkgrid_client::workflows::search::{SearchQuery, SearchTarget, SearchWorkflow};
use parkgrid_client::workflows::spaces::{AvailabilityDraft, ProviderStats, SpaceDraft};
use parkgrid_client::workflows::Failure;
use parkgrid_core::model::{
    AvailabilityWindow, Booking, BookingAction, GeoPoint, MonthlyIncomeReport, Role, SearchResponse,
    Session, Space,
};
use parkgrid_core::time;
use parkgrid_core::Config;

use super::{AvailabilityForm, LoginForm, NearbyForm, SearchForm, SpaceForm};

/// Top-level view routing. Unauthenticated sessions land on Login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
}

/// Driver dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverTab {
    Search,
    Nearby,
    Bookings,
}

/// Provider/admin dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderTab {
    Overview,
    Spaces,
    Availability,
    Bookings,
}

/// Completion events delivered from spawned API tasks and subscriptions.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic clock tick for live countdowns.
    Tick,
    /// Device-location update from the active watch.
    LocationUpdate { lat: f64, lng: f64 },
    LoggedIn(Result<Session, Failure>),
    SearchFinished {
        generation: u64,
        nearby: bool,
        outcome: Result<SearchResponse, Failure>,
    },
    BookingsLoaded(Result<Vec<Booking>, Failure>),
    /// Fresh booking list after a creation resolved.
    BookingCreated(Result<Vec<Booking>, Failure>),
    /// Fresh booking list after a status transition resolved.
    BookingsRefreshed(Result<Vec<Booking>, Failure>),
    SpacesLoaded(Result<Vec<Space>, Failure>),
    /// Fresh space list after a creation resolved.
    SpaceCreated(Result<Vec<Space>, Failure>),
    AvailabilityLoaded(Result<Vec<AvailabilityWindow>, Failure>),
    /// Fresh window list after an addition resolved.
    AvailabilityAdded(Result<Vec<AvailabilityWindow>, Failure>),
    ReportLoaded(Result<MonthlyIncomeReport, Failure>),
    PlacePicked(Result<GeoPoint, Failure>),
    LocationSaved(Result<(), Failure>),
}

/// TUI application state.
pub struct App {
    pub session: Option<Session>,
    pub view: View,
    pub driver_tab: DriverTab,
    pub provider_tab: ProviderTab,

    pub login_form: LoginForm,
    pub search_form: SearchForm,
    pub nearby_form: NearbyForm,
    pub space_form: SpaceForm,
    pub availability_form: AvailabilityForm,

    pub search: SearchWorkflow,
    pub nearby: SearchWorkflow,

    pub bookings: Vec<Booking>,
    pub selected_booking: usize,
    pub selected_result: usize,
    pub spaces: Vec<Space>,
    pub selected_space: usize,
    pub availability: Vec<AvailabilityWindow>,
    pub report: MonthlyIncomeReport,
    pub picked: Option<GeoPoint>,

    pub live_location: Option<(f64, f64)>,
    pub location_saved: bool,
    pub clock: NaiveDateTime,

    pub status: String,
    pub error: Option<String>,
    pub success: Option<String>,
    pub busy: bool,
    pub should_quit: bool,

    default_radius_m: f64,
    logout_latch: LogoutLatch,
    /// Set once by the latch; the runtime clears the persisted session
    /// when it observes this.
    logout_requested: bool,
}

impl App {
    pub fn new(session: Option<Session>, config: &Config) -> Self {
        let (start_ts, end_ts) = time::default_window(config.search.default_window_hours);
        let radius = format!("{}", config.search.default_radius_m as u64);
        let view = if session.is_some() {
            View::Dashboard
        } else {
            View::Login
        };
        Self {
            session,
            view,
            driver_tab: DriverTab::Search,
            provider_tab: ProviderTab::Overview,
            login_form: LoginForm::default(),
            search_form: SearchForm {
                start_ts: start_ts.clone(),
                end_ts: end_ts.clone(),
                radius: radius.clone(),
                ..Default::default()
            },
            nearby_form: NearbyForm {
                start_ts,
                end_ts,
                radius,
                ..Default::default()
            },
            space_form: SpaceForm {
                capacity: "1".into(),
                ..Default::default()
            },
            availability_form: AvailabilityForm::default(),
            search: SearchWorkflow::new(),
            nearby: SearchWorkflow::new(),
            bookings: Vec::new(),
            selected_booking: 0,
            selected_result: 0,
            spaces: Vec::new(),
            selected_space: 0,
            availability: Vec::new(),
            report: MonthlyIncomeReport::default(),
            picked: None,
            live_location: None,
            location_saved: false,
            clock: time::now_local(),
            status: "Ready".to_string(),
            error: None,
            success: None,
            busy: false,
            should_quit: false,
            default_radius_m: config.search.default_radius_m,
            logout_latch: LogoutLatch::new(),
            logout_requested: false,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(|s| s.user.role)
    }

    /// Whether the runtime should clear the persisted session. Reading
    /// consumes the request so it is acted on once.
    pub fn take_logout_request(&mut self) -> bool {
        std::mem::take(&mut self.logout_requested)
    }

    /// Explicit logout (the Logout action): clear state and return to the
    /// login view.
    pub fn logout(&mut self) {
        self.session = None;
        self.view = View::Login;
        self.logout_requested = true;
        self.bookings.clear();
        self.spaces.clear();
        self.availability.clear();
        self.success = None;
        self.error = None;
        self.logout_latch.reset();
    }

    fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.success = None;
    }

    fn set_success(&mut self, message: &str) {
        self.success = Some(message.to_string());
        self.error = None;
    }

    /// Central failure handling: an expired session clears local state and
    /// navigates to the login view exactly once; everything else is shown
    /// as a single inline message.
    fn fail(&mut self, failure: &Failure) {
        if failure.forces_logout() {
            if self.logout_latch.fire() {
                self.session = None;
                self.view = View::Login;
                self.logout_requested = true;
                self.set_error(failure.user_message());
            }
            return;
        }
        self.set_error(failure.user_message());
    }

    // -- Search --

    /// Build and start a search from the form. `use_live` substitutes the
    /// latest device location for the typed target.
    pub fn start_search(&mut self, use_live: bool) -> Option<(u64, SearchParams)> {
        let target = if use_live {
            SearchTarget::LiveLocation
        } else if let (Ok(lat), Ok(lng)) = (
            self.search_form.lat.trim().parse::<f64>(),
            self.search_form.lng.trim().parse::<f64>(),
        ) {
            SearchTarget::Point { lat, lng }
        } else {
            SearchTarget::Text(self.search_form.query.clone())
        };
        let query = SearchQuery {
            target,
            start_ts: self.search_form.start_ts.clone(),
            end_ts: self.search_form.end_ts.clone(),
            radius_m: Some(
                self.search_form
                    .radius
                    .trim()
                    .parse()
                    .unwrap_or(self.default_radius_m),
            ),
        };
        match query.to_params(self.live_location) {
            Ok(params) => {
                self.busy = true;
                self.error = None;
                Some((self.search.start(), params))
            }
            Err(e) => {
                self.set_error(e.to_string());
                None
            }
        }
    }

    /// Start a nearby search (saved-location). Returns the generation plus
    /// the validated window/radius for the runtime to send.
    pub fn start_nearby(&mut self) -> Option<(u64, String, String, f64)> {
        let start_ts = self.nearby_form.start_ts.clone();
        let end_ts = self.nearby_form.end_ts.clone();
        if let Err(e) = time::validate_window(&start_ts, &end_ts) {
            self.set_error(e.to_string());
            return None;
        }
        let radius = self
            .nearby_form
            .radius
            .trim()
            .parse()
            .unwrap_or(self.default_radius_m);
        self.busy = true;
        self.error = None;
        Some((self.nearby.start(), start_ts, end_ts, radius))
    }

    /// The search workflow behind the active driver tab.
    pub const fn active_search(&self) -> &SearchWorkflow {
        match self.driver_tab {
            DriverTab::Nearby => &self.nearby,
            _ => &self.search,
        }
    }

    pub fn move_result_selection(&mut self, delta: isize) {
        let len = self.active_search().results().len();
        if len == 0 {
            self.selected_result = 0;
            return;
        }
        let max = len as isize - 1;
        self.selected_result = (self.selected_result as isize + delta).clamp(0, max) as usize;
    }

    /// Book the selected search result with the active form's window.
    /// Only drivers may book; other roles get an inline message.
    pub fn book_selected(&mut self) -> Option<(u64, String, String)> {
        if self.role() != Some(Role::Driver) {
            self.set_error("Only drivers can book".into());
            return None;
        }
        let (start_ts, end_ts) = match self.driver_tab {
            DriverTab::Nearby => (
                self.nearby_form.start_ts.clone(),
                self.nearby_form.end_ts.clone(),
            ),
            _ => (
                self.search_form.start_ts.clone(),
                self.search_form.end_ts.clone(),
            ),
        };
        if let Err(e) = time::validate_window(&start_ts, &end_ts) {
            self.set_error(e.to_string());
            return None;
        }
        let space_id = self
            .active_search()
            .results()
            .get(self.selected_result)
            .map(|r| r.id)?;
        self.busy = true;
        Some((space_id, start_ts, end_ts))
    }

    // -- Bookings --

    /// Bookings shown in the current view.
    pub fn visible_bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn selected_booking(&self) -> Option<&Booking> {
        self.bookings.get(self.selected_booking)
    }

    pub fn move_booking_selection(&mut self, delta: isize) {
        if self.bookings.is_empty() {
            self.selected_booking = 0;
            return;
        }
        let max = self.bookings.len() as isize - 1;
        let next = (self.selected_booking as isize + delta).clamp(0, max);
        self.selected_booking = next as usize;
    }

    /// Actions the current role may take on the selected booking. Hidden
    /// entirely for terminal statuses.
    pub fn booking_actions(&self) -> Vec<BookingAction> {
        match (self.role(), self.selected_booking()) {
            (Some(role), Some(booking)) => BookingAction::available(role, booking.status),
            _ => Vec::new(),
        }
    }

    /// Gate a requested action against the selection; `None` hides it.
    pub fn request_booking_action(&self, action: BookingAction) -> Option<u64> {
        let role = self.role()?;
        let booking = self.selected_booking()?;
        action
            .permitted(role, booking.status)
            .then_some(booking.id)
    }

    /// Countdown label for a checked-in booking, driven by the tick clock.
    pub fn countdown_for(&self, booking: &Booking) -> Option<String> {
        if booking.status != parkgrid_core::model::BookingStatus::CheckedIn {
            return None;
        }
        time::countdown(&booking.end_ts, self.clock)
    }

    // -- Spaces & availability --

    pub fn selected_space(&self) -> Option<&Space> {
        self.spaces.get(self.selected_space)
    }

    pub fn move_space_selection(&mut self, delta: isize) {
        if self.spaces.is_empty() {
            self.selected_space = 0;
            return;
        }
        let max = self.spaces.len() as isize - 1;
        self.selected_space = (self.selected_space as isize + delta).clamp(0, max) as usize;
    }

    /// Convert the space form + picked point into a create request.
    pub fn space_request(&mut self) -> Option<parkgrid_client::api::NewSpace> {
        let draft = SpaceDraft {
            title: self.space_form.title.clone(),
            description: None,
            address: Some(self.space_form.address.clone()),
            capacity: self.space_form.capacity.trim().parse().unwrap_or(0),
            height_limit: None,
        };
        match draft.into_request(self.picked.as_ref()) {
            Ok(req) => {
                self.busy = true;
                Some(req)
            }
            Err(e) => {
                self.set_error(e.to_string());
                None
            }
        }
    }

    /// Convert the availability form into an add request for the selected
    /// space.
    pub fn availability_request(
        &mut self,
    ) -> Option<(u64, parkgrid_client::api::NewAvailability)> {
        let Some(space) = self.selected_space() else {
            self.set_error("Create a space first".into());
            return None;
        };
        let space_id = space.id;
        let draft = AvailabilityDraft {
            start_ts: self.availability_form.start_ts.clone(),
            end_ts: self.availability_form.end_ts.clone(),
            base_price_per_hour: self.availability_form.rate.trim().parse().unwrap_or(-1.0),
        };
        match draft.into_request() {
            Ok(req) => {
                self.busy = true;
                Some((space_id, req))
            }
            Err(e) => {
                self.set_error(e.to_string());
                None
            }
        }
    }

    pub fn provider_stats(&self) -> ProviderStats {
        ProviderStats::compute(&self.spaces, &self.bookings)
    }

    /// Process a completion event.
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => {
                self.clock = time::now_local();
            }
            AppEvent::LocationUpdate { lat, lng } => {
                self.live_location = Some((lat, lng));
            }
            AppEvent::LoggedIn(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(session) => {
                        self.status = format!(
                            "Logged in as {} ({})",
                            session.user.name, session.user.role
                        );
                        self.session = Some(session);
                        self.view = View::Dashboard;
                        self.login_form = LoginForm::default();
                        self.logout_latch.reset();
                        self.error = None;
                    }
                    Err(failure) => self.set_error(failure.user_message()),
                }
            }
            AppEvent::SearchFinished {
                generation,
                nearby,
                outcome,
            } => {
                self.busy = false;
                let workflow = if nearby { &mut self.nearby } else { &mut self.search };
                match outcome {
                    Ok(resp) => {
                        if workflow.complete(generation, Ok((resp.items, resp.requested))) {
                            self.selected_result = 0;
                            self.set_success(if nearby {
                                "Nearby search completed"
                            } else {
                                "Search completed"
                            });
                        }
                    }
                    Err(failure) => {
                        if workflow.complete(generation, Err(failure.user_message())) {
                            self.fail(&failure);
                        }
                    }
                }
            }
            AppEvent::BookingsLoaded(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(bookings) => {
                        self.bookings = bookings;
                        self.selected_booking = 0;
                    }
                    Err(failure) => self.fail(&failure),
                }
            }
            AppEvent::BookingCreated(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(bookings) => {
                        self.bookings = bookings;
                        self.selected_booking = 0;
                        self.selected_result = 0;
                        // Stale matches are not re-offered after a booking.
                        self.search.clear();
                        self.nearby.clear();
                        self.set_success("Booking created");
                    }
                    Err(failure) => self.fail(&failure),
                }
            }
            AppEvent::BookingsRefreshed(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(bookings) => {
                        self.bookings = bookings;
                        self.selected_booking = 0;
                        self.set_success("Booking updated");
                    }
                    Err(failure) => self.fail(&failure),
                }
            }
            AppEvent::SpacesLoaded(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(spaces) => {
                        self.spaces = spaces;
                        self.selected_space = 0;
                    }
                    Err(failure) => self.fail(&failure),
                }
            }
            AppEvent::SpaceCreated(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(spaces) => {
                        self.spaces = spaces;
                        self.space_form.reset();
                        self.picked = None;
                        self.set_success("Space created");
                    }
                    Err(failure) => self.fail(&failure),
                }
            }
            AppEvent::AvailabilityLoaded(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(windows) => self.availability = windows,
                    Err(failure) => self.fail(&failure),
                }
            }
            AppEvent::AvailabilityAdded(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(windows) => {
                        self.availability = windows;
                        self.availability_form = AvailabilityForm::default();
                        self.set_success("Availability added");
                    }
                    Err(failure) => self.fail(&failure),
                }
            }
            AppEvent::ReportLoaded(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(report) => self.report = report,
                    Err(failure) => self.fail(&failure),
                }
            }
            AppEvent::PlacePicked(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(point) => {
                        // Picked address back-fills the form like the map
                        // picker would.
                        if self.space_form.address.trim().is_empty() {
                            if let Some(addr) = &point.address {
                                self.space_form.address = addr.clone();
                            }
                        }
                        self.picked = Some(point);
                        self.set_success("Location selected");
                    }
                    Err(failure) => self.fail(&failure),
                }
            }
            AppEvent::LocationSaved(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(()) => {
                        self.location_saved = true;
                        self.set_success("GPS location saved");
                    }
                    Err(failure) => self.fail(&failure),
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use parkgrid_core::model::{BookingStatus, User};

    fn session(role: Role) -> Session {
        Session {
            access_token: "t1".into(),
            user: User {
                id: 1,
                name: "Rahim".into(),
                role,
            },
        }
    }

    fn driver_app() -> App {
        App::new(Some(session(Role::Driver)), &Config::default())
    }

    fn booking(id: u64, status: &str, end_ts: &str) -> Booking {
        serde_json::from_value(serde_json::json!({
            "id": id, "space_id": 7, "user_id": 1,
            "start_ts": "2024-01-01T10:00", "end_ts": end_ts,
            "status": status,
            "space": {"id": 7, "title": "Banani Garage"}
        }))
        .unwrap()
    }

    fn search_response(titles: &[&str]) -> SearchResponse {
        serde_json::from_value(serde_json::json!({
            "items": titles.iter().enumerate().map(|(i, t)| serde_json::json!({
                "id": i + 1, "title": t, "distance_m": 100.0
            })).collect::<Vec<_>>(),
            "requested": {"lat": 23.78, "lng": 90.41, "radius_m": 1500.0}
        }))
        .unwrap()
    }

    #[test]
    fn unauthenticated_app_starts_on_login() {
        let app = App::new(None, &Config::default());
        assert_eq!(app.view, View::Login);
    }

    #[test]
    fn authenticated_app_starts_on_dashboard() {
        let app = driver_app();
        assert_eq!(app.view, View::Dashboard);
        assert_eq!(app.role(), Some(Role::Driver));
    }

    #[test]
    fn login_event_routes_to_dashboard() {
        let mut app = App::new(None, &Config::default());
        app.handle_event(AppEvent::LoggedIn(Ok(session(Role::Provider))));
        assert_eq!(app.view, View::Dashboard);
        assert_eq!(app.role(), Some(Role::Provider));
        assert!(app.error.is_none());
    }

    #[test]
    fn failed_login_shows_message() {
        let mut app = App::new(None, &Config::default());
        app.handle_event(AppEvent::LoggedIn(Err(Failure::Other(
            "Invalid credentials".into(),
        ))));
        assert_eq!(app.view, View::Login);
        assert_eq!(app.error.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn search_form_defaults_to_ordered_window() {
        let app = driver_app();
        assert!(
            time::validate_window(&app.search_form.start_ts, &app.search_form.end_ts).is_ok()
        );
        assert_eq!(app.search_form.radius, "1500");
    }

    #[test]
    fn empty_search_form_is_precondition_error() {
        let mut app = driver_app();
        assert!(app.start_search(false).is_none());
        assert!(app.error.as_deref().unwrap().contains("address or lat/lng"));
    }

    #[test]
    fn live_search_without_gps_fails_before_network() {
        let mut app = driver_app();
        assert!(app.start_search(true).is_none());
        assert!(app.error.as_deref().unwrap().contains("Turn on GPS"));
    }

    #[test]
    fn live_search_uses_latest_device_location() {
        let mut app = driver_app();
        app.handle_event(AppEvent::LocationUpdate {
            lat: 23.7,
            lng: 90.4,
        });
        let (_, params) = app.start_search(true).unwrap();
        assert_eq!(params.lat, Some(23.7));
        assert_eq!(params.lng, Some(90.4));
    }

    #[test]
    fn superseded_search_result_never_displays() {
        let mut app = driver_app();
        app.search_form.query = "Banani".into();
        let (gen_a, _) = app.start_search(false).unwrap();
        let (gen_b, _) = app.start_search(false).unwrap();

        // A resolves late, then B.
        app.handle_event(AppEvent::SearchFinished {
            generation: gen_a,
            nearby: false,
            outcome: Ok(search_response(&["A"])),
        });
        assert!(app.search.results().is_empty());
        app.handle_event(AppEvent::SearchFinished {
            generation: gen_b,
            nearby: false,
            outcome: Ok(search_response(&["B"])),
        });
        assert_eq!(app.search.results().len(), 1);
        assert_eq!(app.search.results()[0].title, "B");
    }

    #[test]
    fn search_failure_clears_results_and_shows_message() {
        let mut app = driver_app();
        app.search_form.query = "Banani".into();
        let (generation, _) = app.start_search(false).unwrap();
        app.handle_event(AppEvent::SearchFinished {
            generation,
            nearby: false,
            outcome: Ok(search_response(&["A"])),
        });
        let (generation, _) = app.start_search(false).unwrap();
        app.handle_event(AppEvent::SearchFinished {
            generation,
            nearby: false,
            outcome: Err(Failure::NoAvailability),
        });
        assert!(app.search.results().is_empty());
        assert_eq!(
            app.error.as_deref(),
            Some("No slot available for that time")
        );
    }

    #[test]
    fn auth_failure_redirects_to_login_exactly_once() {
        let mut app = driver_app();
        app.handle_event(AppEvent::BookingsLoaded(Err(Failure::SessionExpired)));
        assert_eq!(app.view, View::Login);
        assert!(app.session.is_none());
        assert!(app.take_logout_request());
        assert_eq!(
            app.error.as_deref(),
            Some("Session expired. Redirecting...")
        );

        // A second in-flight failure arrives: no second redirect request.
        app.error = None;
        app.handle_event(AppEvent::ReportLoaded(Err(Failure::SessionExpired)));
        assert!(!app.take_logout_request());
        assert!(app.error.is_none());
    }

    #[test]
    fn relogin_rearms_the_logout_latch() {
        let mut app = driver_app();
        app.handle_event(AppEvent::BookingsLoaded(Err(Failure::SessionExpired)));
        assert!(app.take_logout_request());
        app.handle_event(AppEvent::LoggedIn(Ok(session(Role::Driver))));
        app.handle_event(AppEvent::BookingsLoaded(Err(Failure::SessionExpired)));
        assert!(app.take_logout_request());
    }

    #[test]
    fn booking_creation_clears_search_results() {
        let mut app = driver_app();
        app.search_form.query = "Banani".into();
        let (generation, _) = app.start_search(false).unwrap();
        app.handle_event(AppEvent::SearchFinished {
            generation,
            nearby: false,
            outcome: Ok(search_response(&["A"])),
        });
        assert_eq!(app.search.results().len(), 1);

        app.handle_event(AppEvent::BookingCreated(Ok(vec![booking(
            1,
            "reserved",
            "2024-01-01T11:00",
        )])));
        assert!(app.search.results().is_empty());
        assert_eq!(app.bookings.len(), 1);
        assert_eq!(app.success.as_deref(), Some("Booking created"));
    }

    #[test]
    fn book_selected_uses_search_window_and_result_id() {
        let mut app = driver_app();
        app.search_form.query = "Banani".into();
        let (generation, _) = app.start_search(false).unwrap();
        app.handle_event(AppEvent::SearchFinished {
            generation,
            nearby: false,
            outcome: Ok(search_response(&["A", "B"])),
        });
        app.move_result_selection(1);
        let (space_id, start, end) = app.book_selected().unwrap();
        assert_eq!(space_id, 2);
        assert_eq!(start, app.search_form.start_ts);
        assert_eq!(end, app.search_form.end_ts);
    }

    #[test]
    fn only_drivers_can_book() {
        let mut app = App::new(Some(session(Role::Provider)), &Config::default());
        assert!(app.book_selected().is_none());
        assert_eq!(app.error.as_deref(), Some("Only drivers can book"));
    }

    #[test]
    fn terminal_booking_offers_no_actions() {
        let mut app = driver_app();
        app.handle_event(AppEvent::BookingsLoaded(Ok(vec![
            booking(1, "checked_out", "2024-01-01T11:00"),
            booking(2, "cancelled", "2024-01-01T11:00"),
        ])));
        assert!(app.booking_actions().is_empty());
        app.move_booking_selection(1);
        assert!(app.booking_actions().is_empty());
        assert!(app.request_booking_action(BookingAction::Cancel).is_none());
    }

    #[test]
    fn driver_sees_cancel_on_reserved_booking() {
        let mut app = driver_app();
        app.handle_event(AppEvent::BookingsLoaded(Ok(vec![booking(
            1,
            "reserved",
            "2024-01-01T11:00",
        )])));
        assert_eq!(app.booking_actions(), vec![BookingAction::Cancel]);
        assert_eq!(app.request_booking_action(BookingAction::Cancel), Some(1));
        assert!(app.request_booking_action(BookingAction::Confirm).is_none());
    }

    #[test]
    fn provider_transition_keys_follow_status() {
        let mut app = App::new(Some(session(Role::Provider)), &Config::default());
        app.handle_event(AppEvent::BookingsLoaded(Ok(vec![booking(
            1,
            "confirmed",
            "2024-01-01T11:00",
        )])));
        assert_eq!(
            app.booking_actions(),
            vec![BookingAction::Cancel, BookingAction::CheckIn]
        );
    }

    #[test]
    fn countdown_shown_only_for_checked_in() {
        let mut app = driver_app();
        let reserved = booking(1, "reserved", "2099-01-01T10:00");
        let checked_in = booking(2, "checked_in", "2099-01-01T10:00");
        assert!(app.countdown_for(&reserved).is_none());
        let label = app.countdown_for(&checked_in).unwrap();
        assert!(label.ends_with('s'), "got: {label}");

        // Past end: the tick clock reports time over.
        let over = booking(3, "checked_in", "2000-01-01T10:00");
        app.handle_event(AppEvent::Tick);
        assert_eq!(app.countdown_for(&over).unwrap(), "Time over");
    }

    #[test]
    fn space_request_requires_picked_point() {
        let mut app = App::new(Some(session(Role::Provider)), &Config::default());
        app.space_form.title = "Garage".into();
        assert!(app.space_request().is_none());
        assert!(app.error.as_deref().unwrap().contains("Pick a location"));

        app.handle_event(AppEvent::PlacePicked(Ok(GeoPoint::new(23.79, 90.40)
            .unwrap()
            .with_address("Banani, Dhaka"))));
        let req = app.space_request().unwrap();
        assert!((req.lat - 23.79).abs() < 1e-9);
        assert_eq!(app.space_form.address, "Banani, Dhaka");
    }

    #[test]
    fn availability_request_needs_selected_space() {
        let mut app = App::new(Some(session(Role::Provider)), &Config::default());
        app.availability_form.start_ts = "2024-01-01T10:00".into();
        app.availability_form.end_ts = "2024-01-01T12:00".into();
        app.availability_form.rate = "50".into();
        assert!(app.availability_request().is_none());

        app.handle_event(AppEvent::SpacesLoaded(Ok(serde_json::from_value(
            serde_json::json!([{"id": 9, "title": "A", "lat": 0.0, "lng": 0.0}]),
        )
        .unwrap())));
        let (space_id, req) = app.availability_request().unwrap();
        assert_eq!(space_id, 9);
        assert!((req.base_price_per_hour - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn logout_returns_to_login_and_clears_lists() {
        let mut app = driver_app();
        app.handle_event(AppEvent::BookingsLoaded(Ok(vec![booking(
            1,
            "reserved",
            "2024-01-01T11:00",
        )])));
        app.logout();
        assert_eq!(app.view, View::Login);
        assert!(app.bookings.is_empty());
        assert!(app.take_logout_request());
    }
}
