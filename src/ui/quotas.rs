//! Quota table view.
//!
//! One row per consumer with usage, limits, percentage of the hard limit,
//! a usage trend and the severity. Sortable and filterable by identity.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{format_bytes, AccountSummary, QuotaRow, Severity};
use crate::store::MetricCategory;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Column to sort the quota table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuotaSortColumn {
    #[default]
    Severity,
    Identity,
    Used,
    Limit,
    Percent,
}

impl QuotaSortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            QuotaSortColumn::Severity => QuotaSortColumn::Identity,
            QuotaSortColumn::Identity => QuotaSortColumn::Used,
            QuotaSortColumn::Used => QuotaSortColumn::Limit,
            QuotaSortColumn::Limit => QuotaSortColumn::Percent,
            QuotaSortColumn::Percent => QuotaSortColumn::Severity,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuotaSortColumn::Severity => "status",
            QuotaSortColumn::Identity => "identity",
            QuotaSortColumn::Used => "used",
            QuotaSortColumn::Limit => "limit",
            QuotaSortColumn::Percent => "percent",
        }
    }
}

/// Sort rows by `column`, falling back to identity for equal keys.
pub fn sort_rows_by(rows: &mut [QuotaRow], column: QuotaSortColumn, ascending: bool) {
    rows.sort_by(|a, b| {
        let primary = match column {
            QuotaSortColumn::Severity => a.report.status.severity.cmp(&b.report.status.severity),
            QuotaSortColumn::Identity => a.consumer.identity.cmp(&b.consumer.identity),
            QuotaSortColumn::Used => a.consumer.used.cmp(&b.consumer.used),
            QuotaSortColumn::Limit => {
                let limit = |r: &QuotaRow| r.report.limits.map(|l| l.hard).unwrap_or(0);
                limit(a).cmp(&limit(b))
            }
            QuotaSortColumn::Percent => a
                .report
                .status
                .percentage
                .partial_cmp(&b.report.status.percentage)
                .unwrap_or(Ordering::Equal),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        if primary == Ordering::Equal {
            a.consumer.identity.cmp(&b.consumer.identity)
        } else {
            primary
        }
    });
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let unquoted = app.visible_unquoted_accounts();
    if unquoted.is_empty() {
        render_table(frame, app, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);
    render_table(frame, app, chunks[0]);
    render_unquoted(frame, app, &unquoted, chunks[1]);
}

/// Accounts the backend reports that have no quota row.
fn render_unquoted(frame: &mut Frame, app: &App, accounts: &[AccountSummary], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
        .title(format!(" Accounts without quota ({}) ", accounts.len()));

    frame.render_widget(Paragraph::new(unquoted_line(accounts)).block(block), area);
}

fn unquoted_line(accounts: &[AccountSummary]) -> String {
    accounts
        .iter()
        .map(|a| match a.usage {
            Some(bytes) => format!("{} {}", a.identity, format_bytes(bytes)),
            None => a.identity.clone(),
        })
        .collect::<Vec<_>>()
        .join("  ·  ")
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(total) = app.quota_count() else {
        let text = match app.notice(MetricCategory::Quotas) {
            Some(notice) => format!(" {}", notice),
            None => " Loading quotas...".to_string(),
        };
        frame.render_widget(Paragraph::new(text).block(block.title(" Quotas ")), area);
        return;
    };

    let rows_data = app.visible_quota_rows();

    let header = Row::new(vec![
        Cell::from(format_header("Identity", QuotaSortColumn::Identity, app)),
        Cell::from(format_header("Used", QuotaSortColumn::Used, app)),
        Cell::from("Soft"),
        Cell::from(format_header("Hard", QuotaSortColumn::Limit, app)),
        Cell::from(format_header("Use%", QuotaSortColumn::Percent, app)),
        Cell::from("Trend"),
        Cell::from("Limits"),
        Cell::from(format_header("Status", QuotaSortColumn::Severity, app)),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = rows_data
        .iter()
        .map(|row| {
            let status = row.report.status;
            let status_style = app.theme.status_style(status.severity);
            let (soft, hard) = match row.report.limits {
                Some(limits) => (format_bytes(limits.soft), format_bytes(limits.hard)),
                None => ("-".to_string(), "-".to_string()),
            };
            let source = match (row.report.limits, row.inherited) {
                (None, _) => "none",
                (Some(_), true) => "default",
                (Some(_), false) => "own",
            };
            let used_style = if row.report.over_soft {
                app.theme.status_style(Severity::Warning)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(row.consumer.identity.clone()),
                Cell::from(format_bytes(row.consumer.used)).style(used_style),
                Cell::from(soft),
                Cell::from(hard),
                Cell::from(format!("{:.1}%", status.percentage)).style(status_style),
                Cell::from(render_sparkline(
                    &app.history.usage_sparkline(&row.consumer.identity),
                )),
                Cell::from(source).style(Style::default().add_modifier(Modifier::DIM)),
                Cell::from(status.severity.symbol()).style(status_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Min(8),
        Constraint::Min(7),
        Constraint::Min(6),
    ];

    let selected = app.selected_index.min(rows_data.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !rows_data.is_empty() {
        format!(" [{}/{}]", selected + 1, rows_data.len())
    } else {
        String::new()
    };

    let title = format!(
        " Quotas ({}/{}) [s:sort {}{}]{}{} ",
        rows_data.len(),
        total,
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title(title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, col: QuotaSortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

fn render_sparkline(levels: &[u8]) -> String {
    if levels.is_empty() {
        return "        ".to_string();
    }
    let start = levels.len().saturating_sub(8);
    levels[start..]
        .iter()
        .map(|&v| SPARKLINE_CHARS[v.min(7) as usize])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{assess, Consumer, Limits};

    fn row(identity: &str, used: u64, hard: u64) -> QuotaRow {
        let consumer = Consumer::new(identity, used);
        let limits = Limits::new(hard / 2, hard).ok().filter(|l| l.hard > 0);
        QuotaRow {
            report: assess(&consumer, limits),
            consumer,
            grace: None,
            inherited: false,
        }
    }

    #[test]
    fn test_unquoted_line() {
        let accounts = vec![
            AccountSummary { identity: "bob".into(), usage: Some(500 << 20) },
            AccountSummary { identity: "carl".into(), usage: None },
        ];
        assert_eq!(unquoted_line(&accounts), "bob 500.00 MiB  ·  carl");
    }

    fn identities(rows: &[QuotaRow]) -> Vec<&str> {
        rows.iter().map(|r| r.consumer.identity.as_str()).collect()
    }

    #[test]
    fn test_sort_by_severity_descending() {
        let mut rows = vec![
            row("carol", 100, 1000),
            row("alice", 900, 1000),
            row("bob", 950, 1000),
        ];
        sort_rows_by(&mut rows, QuotaSortColumn::Severity, false);

        assert_eq!(rows[0].report.status.severity, Severity::Critical);
        // Equal severity keeps identity order.
        assert_eq!(identities(&rows), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_sort_by_limit_treats_unlimited_as_zero() {
        let mut rows = vec![row("a", 1, 2000), row("b", 1, 0), row("c", 1, 1000)];
        sort_rows_by(&mut rows, QuotaSortColumn::Limit, true);
        assert_eq!(identities(&rows), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_by_percent() {
        let mut rows = vec![row("a", 100, 1000), row("b", 700, 1000), row("c", 300, 1000)];
        sort_rows_by(&mut rows, QuotaSortColumn::Percent, false);
        assert_eq!(identities(&rows), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_column_cycles() {
        let mut column = QuotaSortColumn::default();
        for _ in 0..5 {
            column = column.next();
        }
        assert_eq!(column, QuotaSortColumn::Severity);
    }

    #[test]
    fn test_sparkline_keeps_last_eight() {
        let levels: Vec<u8> = (0..10).map(|v| v % 8).collect();
        let line = render_sparkline(&levels);
        assert_eq!(line.chars().count(), 8);
        assert!(line.starts_with('▃'));
        assert_eq!(render_sparkline(&[]).len(), 8);
    }
}
