//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::Severity;
use crate::export::SeveritySummary;

/// Render the header bar with the quota health overview.
///
/// Displays: worst severity, consumer counts by severity, backend.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled("QUOTAWATCH ", Style::default().add_modifier(Modifier::BOLD));

    let Some(rows) = app.quota_rows() else {
        let line = Line::from(vec![
            Span::raw(" "),
            title,
            Span::raw(format!("│ {} ", app.source_description())),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let summary = SeveritySummary::from_rows(&rows);
    let count = |n: usize, severity: Severity| {
        if n > 0 {
            Span::styled(n.to_string(), app.theme.status_style(severity))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        }
    };

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.status_style(summary.worst())),
        title,
        Span::raw("│ "),
        count(summary.ok, Severity::Ok),
        Span::raw(" ok "),
        count(summary.warning, Severity::Warning),
        Span::raw(" warn "),
        count(summary.critical, Severity::Critical),
        Span::raw(" crit "),
        count(summary.over_limit, Severity::OverLimit),
        Span::raw(" over │ "),
        Span::styled(
            summary.total.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" accounts │ {}", app.source_description())),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar, highlighting the current view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let selected = View::ALL
        .iter()
        .position(|v| *v == app.current_view)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows refresh countdown, failure notices and the available controls.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref err) = app.load_error {
        let paragraph = Paragraph::new(format!(" Error: {} | q:quit", err))
            .style(app.theme.status_style(Severity::Critical));
        frame.render_widget(paragraph, area);
        return;
    }

    let notices = app.current_notices();
    if let Some((category, message)) = notices.first() {
        let more = if notices.len() > 1 {
            format!(" (+{} more)", notices.len() - 1)
        } else {
            String::new()
        };
        let line = Line::from(vec![
            Span::styled(
                format!(" {} failed: ", category.label()),
                app.theme.status_style(Severity::Warning),
            ),
            Span::raw(format!("{}{} | r:retry", message, more)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let refresh = match app.countdown {
        Some(secs) => format!("Next refresh in {}s", secs),
        None => "Loading...".to_string(),
    };
    let updated = app
        .last_updated
        .map(|t| format!(" | Updated {:.1}s ago", t.elapsed().as_secs_f64()))
        .unwrap_or_default();

    let controls = if app.filter_active {
        "Type to search | Enter:apply Esc:cancel"
    } else {
        match app.current_view {
            View::Monitoring => "Tab:switch r:refresh e:export ?:help q:quit",
            View::Quotas => "/:search s:sort S:reverse Enter:detail r:refresh ?:help q:quit",
            View::Policies => "/:search ↑↓:select r:refresh ?:help q:quit",
        }
    };

    let status = format!(" {}{} | {}", refresh, updated, controls);
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |name: &'static str| {
        Line::from(vec![Span::styled(
            name,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ Tab     Switch views"),
        Line::from("  1/2/3       Jump to view"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Quota detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Quotas & Policies"),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 25u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
