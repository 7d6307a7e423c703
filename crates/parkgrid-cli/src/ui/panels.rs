//! Per-view panel rendering.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use parkgrid_core::model::Role;
use parkgrid_core::time;

use crate::app::{
    App, AvailabilityForm, DriverTab, NearbyForm, ProviderTab, SearchForm, SpaceForm,
};
use crate::fmt::truncate;

fn bordered<'a>(title: &'a str, color: Color, lines: Vec<Line<'a>>) -> Paragraph<'a> {
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(Style::default().fg(color)),
        )
        .wrap(Wrap { trim: false })
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let marker = if focused { "> " } else { "  " };
    let style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!("{marker}{label:<14}"), style),
        Span::raw(value.to_string()),
        Span::styled(if focused { "█" } else { "" }, Style::default()),
    ])
}

// =============================================================================
// Login
// =============================================================================

pub fn draw_login(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let masked = "*".repeat(app.login_form.password.len());
    let lines = vec![
        Line::from("Log in to Parkgrid"),
        Line::from(""),
        field_line("Phone", &app.login_form.phone, app.login_form.focus == 0),
        field_line("Password", &masked, app.login_form.focus == 1),
        Line::from(""),
        Line::from(Span::styled(
            "[Tab] switch field  [Enter] log in  [Ctrl+C] quit",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "No account? Register with: parkgrid auth register",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(bordered("Welcome", Color::Cyan, lines), area);
}

// =============================================================================
// Dashboard
// =============================================================================

pub fn draw_dashboard(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(4)])
        .split(area);

    match app.role() {
        Some(Role::Driver) => {
            draw_driver_tabs(frame, app, chunks[0]);
            match app.driver_tab {
                DriverTab::Search => draw_search_tab(frame, app, chunks[1]),
                DriverTab::Nearby => draw_nearby_tab(frame, app, chunks[1]),
                DriverTab::Bookings => draw_bookings_tab(frame, app, chunks[1]),
            }
        }
        Some(Role::Provider | Role::Admin) => {
            draw_provider_tabs(frame, app, chunks[0]);
            match app.provider_tab {
                ProviderTab::Overview => draw_overview_tab(frame, app, chunks[1]),
                ProviderTab::Spaces => draw_spaces_tab(frame, app, chunks[1]),
                ProviderTab::Availability => draw_availability_tab(frame, app, chunks[1]),
                ProviderTab::Bookings => draw_bookings_tab(frame, app, chunks[1]),
            }
        }
        None => {}
    }
}

fn tab_bar<'a>(labels: &[(&'a str, bool)]) -> Line<'a> {
    let mut spans = Vec::new();
    for (label, active) in labels {
        let style = if *active {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {label} "), style));
        spans.push(Span::raw("|"));
    }
    spans.pop();
    Line::from(spans)
}

fn draw_driver_tabs(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let line = tab_bar(&[
        ("F1 Search", app.driver_tab == DriverTab::Search),
        ("F2 Nearby", app.driver_tab == DriverTab::Nearby),
        ("F3 Bookings", app.driver_tab == DriverTab::Bookings),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_provider_tabs(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let line = tab_bar(&[
        ("F1 Overview", app.provider_tab == ProviderTab::Overview),
        ("F2 Spaces", app.provider_tab == ProviderTab::Spaces),
        ("F3 Availability", app.provider_tab == ProviderTab::Availability),
        ("F4 Bookings", app.provider_tab == ProviderTab::Bookings),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

// =============================================================================
// Driver tabs
// =============================================================================

fn draw_search_tab(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(3)])
        .split(area);

    let mut lines: Vec<Line<'_>> = SearchForm::LABELS
        .iter()
        .copied()
        .enumerate()
        .map(|(i, label)| field_line(label, app.search_form.field(i), app.search_form.focus == i))
        .collect();
    lines.push(Line::from(Span::styled(
        "[Enter] search  [F5] around me (GPS)  [F6] clear  Up/Down pick result  [F8] book",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(
        bordered("Search garages (address or live GPS)", Color::Cyan, lines),
        chunks[0],
    );

    draw_results(frame, &app.search, Some(app.selected_result), chunks[1]);
}

fn draw_nearby_tab(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(area);

    let mut lines: Vec<Line<'_>> = NearbyForm::LABELS
        .iter()
        .copied()
        .enumerate()
        .map(|(i, label)| field_line(label, app.nearby_form.field(i), app.nearby_form.focus == i))
        .collect();
    if app.location_saved {
        lines.push(Line::from(Span::styled(
            "Location saved. You can search now.",
            Style::default().fg(Color::Green),
        )));
    }
    lines.push(Line::from(Span::styled(
        "[Enter] search nearby  [F5] save current GPS  [F6] clear  Up/Down pick result  [F8] book",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(
        bordered("Nearby search (saved location)", Color::Cyan, lines),
        chunks[0],
    );

    draw_results(frame, &app.nearby, Some(app.selected_result), chunks[1]);
}

fn draw_results(
    frame: &mut Frame<'_>,
    workflow: &parkgrid_client::workflows::search::SearchWorkflow,
    selected: Option<usize>,
    area: Rect,
) {
    use parkgrid_client::workflows::search::SearchState;

    let mut lines = Vec::new();
    match workflow.state() {
        SearchState::Idle => lines.push(Line::from(Span::styled(
            "No results yet",
            Style::default().fg(Color::DarkGray),
        ))),
        SearchState::Searching => lines.push(Line::from("Searching...")),
        SearchState::Error(message) => lines.push(Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Red),
        ))),
        SearchState::Results(items) => {
            if items.is_empty() {
                lines.push(Line::from("No matching garages"));
            }
            for (i, item) in items.iter().enumerate() {
                let marker = if selected == Some(i) { "> " } else { "  " };
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{marker}#{:<5}", item.id),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        format!("{:<28}", truncate(&item.title, 28)),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!(
                        " {:<30} {:>6} m  cap {}",
                        truncate(item.display_address(), 30),
                        item.distance_m.round(),
                        item.capacity
                    )),
                ]));
            }
        }
    }
    let mut title = "Results".to_string();
    if let Some(focus) = workflow.focus() {
        if let (Some(lat), Some(lng)) = (focus.lat, focus.lng) {
            title = format!("Results around {lat:.4}, {lng:.4}");
            if let Some(radius) = focus.radius_m {
                title.push_str(&format!(" ({radius} m)"));
            }
        }
    }
    frame.render_widget(bordered(&title, Color::White, lines), area);
}

fn draw_bookings_tab(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let mut lines = Vec::new();
    if app.visible_bookings().is_empty() {
        lines.push(Line::from(Span::styled(
            "No bookings yet",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (i, booking) in app.visible_bookings().iter().enumerate() {
        let selected = i == app.selected_booking;
        let marker = if selected { "> " } else { "  " };
        let style = if selected {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let countdown = app
            .countdown_for(booking)
            .map(|c| format!(" | Time left: {c}"))
            .unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}#{:<5}", booking.id), style),
            Span::styled(
                format!("{:<24}", truncate(booking.space_title(), 24)),
                style,
            ),
            Span::raw(format!(
                " {} -> {} | {}{}",
                time::format_display(&booking.start_ts),
                time::format_display(&booking.end_ts),
                booking.status,
                countdown
            )),
        ]));
    }
    lines.push(Line::from(""));
    let actions: Vec<String> = app
        .booking_actions()
        .iter()
        .map(|a| format!("[{}] {}", action_key(*a), a.path_segment()))
        .collect();
    let hint = if actions.is_empty() {
        "Up/Down select  [r] refresh".to_string()
    } else {
        format!("Up/Down select  {}  [r] refresh", actions.join("  "))
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(bordered("Bookings", Color::Cyan, lines), area);
}

/// Key bound to each booking action in the bookings tab.
pub const fn action_key(action: parkgrid_core::model::BookingAction) -> char {
    use parkgrid_core::model::BookingAction;
    match action {
        BookingAction::Cancel => 'c',
        BookingAction::Confirm => 'f',
        BookingAction::CheckIn => 'i',
        BookingAction::CheckOut => 'o',
    }
}

// =============================================================================
// Provider tabs
// =============================================================================

fn draw_overview_tab(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let stats = app.provider_stats();
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Spaces: "),
            Span::styled(
                format!("{:<6}", stats.spaces),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("Active: "),
            Span::styled(
                format!("{:<6}", stats.active_spaces),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("Bookings: "),
            Span::styled(
                format!("{:<6}", stats.bookings),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("Upcoming: "),
            Span::styled(
                format!("{:<6}", stats.upcoming),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Monthly income (completed bookings)",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    if app.report.months.is_empty() {
        lines.push(Line::from(Span::styled(
            "No completed bookings yet",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for month in &app.report.months {
        lines.push(Line::from(format!(
            "{:<10} {:>5}  {:>12.2}",
            month.month, month.count, month.total
        )));
    }
    if !app.report.months.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("{:<10} {:>5}  {:>12.2}", "TOTAL", "", app.report.total_income),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[r] refresh",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(bordered("Overview", Color::Cyan, lines), area);
}

fn draw_spaces_tab(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(3)])
        .split(area);

    let mut lines: Vec<Line<'_>> = SpaceForm::LABELS
        .iter()
        .copied()
        .enumerate()
        .map(|(i, label)| field_line(label, app.space_form.field(i), app.space_form.focus == i))
        .collect();
    let picked = app.picked.as_ref().map_or_else(
        || "No location picked".to_string(),
        |p| {
            format!(
                "Picked: {} {}",
                p,
                p.address.as_deref().unwrap_or("(no address)")
            )
        },
    );
    lines.push(Line::from(Span::styled(
        picked,
        Style::default().fg(Color::Green),
    )));
    lines.push(Line::from(Span::styled(
        "[F5] geocode place query  [Enter] create space  [F6] clear selection",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(bordered("Create parking space", Color::Cyan, lines), chunks[0]);

    let mut list = Vec::new();
    if app.spaces.is_empty() {
        list.push(Line::from(Span::styled(
            "No spaces yet",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (i, space) in app.spaces.iter().enumerate() {
        let selected = i == app.selected_space;
        let marker = if selected { "> " } else { "  " };
        list.push(Line::from(format!(
            "{marker}#{:<5}{:<28} {:<32} cap {:<3} {}",
            space.id,
            truncate(&space.title, 28),
            truncate(space.display_address(), 32),
            space.capacity,
            if space.is_active { "active" } else { "inactive" },
        )));
    }
    frame.render_widget(bordered("My spaces", Color::White, list), chunks[1]);
}

fn draw_availability_tab(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(3)])
        .split(area);

    let space_label = app.selected_space().map_or_else(
        || "-- select a space (Up/Down) --".to_string(),
        |s| format!("{} (#{})", s.title, s.id),
    );
    let mut lines = vec![Line::from(vec![
        Span::raw("  Space         "),
        Span::styled(space_label, Style::default().add_modifier(Modifier::BOLD)),
    ])];
    lines.extend(
        AvailabilityForm::LABELS
            .iter()
            .copied()
            .enumerate()
            .map(|(i, label)| {
                field_line(
                    label,
                    app.availability_form.field(i),
                    app.availability_form.focus == i,
                )
            }),
    );
    lines.push(Line::from(Span::styled(
        "[Enter] add availability  Up/Down choose space",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(
        bordered("Create availability window", Color::Cyan, lines),
        chunks[0],
    );

    let mut list = Vec::new();
    if app.availability.is_empty() {
        list.push(Line::from(Span::styled(
            "No active windows",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for av in &app.availability {
        list.push(Line::from(format!(
            "  #{:<5}{} -> {}  rate {:.2}/h  {}",
            av.id,
            time::format_display(&av.start_ts),
            time::format_display(&av.end_ts),
            av.base_price_per_hour,
            if av.is_active { "active" } else { "inactive" },
        )));
    }
    frame.render_widget(bordered("Availability", Color::White, list), chunks[1]);
}
