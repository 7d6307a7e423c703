//! Top-level TUI layout.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, View};

use super::panels;

/// Draw the full UI.
pub fn draw(frame: &mut Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(5),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    match app.view {
        View::Login => panels::draw_login(frame, app, chunks[1]),
        View::Dashboard => panels::draw_dashboard(frame, app, chunks[1]),
    }
    draw_status_bar(frame, app, chunks[2]);
}

fn draw_header(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let who = app.session.as_ref().map_or_else(
        || " | not logged in".to_string(),
        |s| format!(" | {} ({})", s.user.name, s.user.role),
    );
    let busy = if app.busy { " [working...]" } else { "" };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Parkgrid",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(who),
        Span::styled(busy, Style::default().fg(Color::Yellow)),
    ]));
    frame.render_widget(header, area);
}

fn draw_status_bar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let line = if let Some(error) = &app.error {
        Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        ))
    } else if let Some(success) = &app.success {
        Line::from(Span::styled(
            success.as_str(),
            Style::default().fg(Color::Green),
        ))
    } else {
        Line::from(Span::styled(
            app.status.as_str(),
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}
