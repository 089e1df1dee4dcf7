//! Quota detail overlay.
//!
//! A modal over the quota table showing the full assessment of the selected
//! consumer.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::{format_bytes, QuotaRow};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 44;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 14;

pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }
    let Some(row) = app.selected_quota() else {
        return;
    };

    let overlay_width = (area.width * 70 / 100).clamp(MIN_OVERLAY_WIDTH, 72);
    let overlay_height = (area.height * 70 / 100).clamp(MIN_OVERLAY_HEIGHT, 18);
    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(format!(" {} ", row.consumer.identity))
        .title_bottom(Line::from(" Esc:close ↑↓:next ").right_aligned())
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.status_style(row.report.status.severity));

    let paragraph = Paragraph::new(detail_lines(app, &row))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, overlay_area);
}

fn detail_lines(app: &App, row: &QuotaRow) -> Vec<Line<'static>> {
    let report = &row.report;
    let severity_style = app.theme.status_style(report.status.severity);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut lines = vec![
        Line::from(vec![
            Span::raw(" Status:     "),
            Span::styled(report.status.severity.label(), severity_style),
            Span::styled(format!("  {:.1}%", report.status.percentage), severity_style),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Used:       "),
            Span::styled(format_bytes(row.consumer.used), bold),
        ]),
    ];

    match report.limits {
        Some(limits) => {
            let source = if row.inherited {
                "default policy"
            } else {
                "own limits"
            };
            lines.push(Line::from(vec![
                Span::raw(" Soft limit: "),
                Span::raw(format_bytes(limits.soft)),
                Span::styled(flag(report.over_soft), severity_style),
            ]));
            lines.push(Line::from(vec![
                Span::raw(" Hard limit: "),
                Span::raw(format_bytes(limits.hard)),
                Span::styled(flag(report.over_hard), severity_style),
            ]));
            lines.push(Line::from(vec![
                Span::raw(" Available:  "),
                Span::raw(report.available.map(format_bytes).unwrap_or_default()),
            ]));
            lines.push(Line::from(vec![
                Span::raw(" Limits from "),
                Span::styled(source, dim),
            ]));
        }
        None => lines.push(Line::from(vec![
            Span::raw(" Limits:     "),
            Span::styled("none (no default policy)", dim),
        ])),
    }

    if let Some(grace) = &row.grace {
        lines.push(Line::from(vec![
            Span::raw(" Grace:      "),
            Span::raw(grace.clone()),
        ]));
    }

    let growth = app
        .history
        .growth_rate(&row.consumer.identity)
        .map(format_growth)
        .unwrap_or_else(|| "-".to_string());
    lines.push(Line::from(vec![Span::raw(" Growth:     "), Span::raw(growth)]));

    if let Some(notice) = report.notice {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" ⚠ {}", notice),
            severity_style.add_modifier(Modifier::BOLD),
        )));
    }

    lines
}

fn flag(over: bool) -> &'static str {
    if over {
        "  exceeded"
    } else {
        ""
    }
}

/// Bytes per second, signed, in the unit that reads best.
fn format_growth(rate: f64) -> String {
    let sign = if rate < 0.0 { "-" } else { "+" };
    format!("{}{}/s", sign, format_bytes(rate.abs().round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_growth() {
        assert_eq!(format_growth(2048.0), "+2.00 KiB/s");
        assert_eq!(format_growth(-1024.0 * 1024.0), "-1.00 MiB/s");
    }
}
