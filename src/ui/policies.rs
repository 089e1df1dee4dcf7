//! Policies view.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::format_bytes;
use crate::store::MetricCategory;

/// Render every quota policy, default marked with `*`.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(all) = app.policies() else {
        let text = match app.notice(MetricCategory::Policies) {
            Some(notice) => format!(" {}", notice),
            None => " Loading policies...".to_string(),
        };
        frame.render_widget(Paragraph::new(text).block(block.title(" Policies ")), area);
        return;
    };
    let policies = app.visible_policies();

    let header = Row::new(vec!["", "Name", "Soft", "Hard", "Description"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = policies
        .iter()
        .map(|p| {
            let marker = if p.is_default { "*" } else { "" };
            let style = if p.is_default {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(marker).style(Style::default().fg(app.theme.highlight)),
                Cell::from(p.name.clone()),
                Cell::from(format_bytes(p.soft_limit)),
                Cell::from(format_bytes(p.hard_limit)),
                Cell::from(p.description.clone().unwrap_or_default())
                    .style(Style::default().add_modifier(Modifier::DIM)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(4),
    ];

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };
    let default_name = all
        .iter()
        .find(|p| p.is_default)
        .map(|p| p.name.as_str())
        .unwrap_or("none");
    let title = format!(
        " Policies ({}/{}) default: {}{} ",
        policies.len(),
        all.len(),
        default_name,
        filter_info
    );

    let selected = app.selected_index.min(policies.len().saturating_sub(1));
    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title(title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(table, area, &mut state);
}
