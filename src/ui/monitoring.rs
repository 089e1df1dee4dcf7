//! Monitoring view: host gauges, services, filesystem and top consumers.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, List, ListItem, Paragraph, Sparkline},
    Frame,
};

use crate::app::App;
use crate::data::chart::{filesystem_chart, top_consumers_chart};
use crate::data::{
    format_bytes, ChartKind, ChartSpec, MetricPayload, ServiceStatus, Severity, UsageGauge,
};
use crate::store::MetricCategory;

const GAUGES: [MetricCategory; 3] = [
    MetricCategory::Cpu,
    MetricCategory::Memory,
    MetricCategory::Disk,
];

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::vertical([
        Constraint::Length(3), // Gauges
        Constraint::Length(3), // Load average and cpu trend
        Constraint::Min(6),    // Services, filesystem, consumers
    ])
    .split(area);

    render_gauges(frame, app, rows[0]);
    render_trend(frame, app, rows[1]);

    let columns = Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[2]);
    let left = Layout::vertical([Constraint::Min(3), Constraint::Length(6)]).split(columns[0]);

    render_services(frame, app, left[0]);
    render_filesystem(frame, app, left[1]);
    render_top_consumers(frame, app, columns[1]);
}

fn block<'a>(app: &App, title: impl Into<Line<'a>>) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// Placeholder text for a category without a snapshot yet.
fn pending_text(app: &App, category: MetricCategory) -> String {
    match app.notice(category) {
        Some(notice) => format!(" {}", notice),
        None => " Loading...".to_string(),
    }
}

fn gauge_of(app: &App, category: MetricCategory) -> Option<UsageGauge> {
    match &*app.snapshot(category)?.payload {
        MetricPayload::Gauge(gauge) => Some(*gauge),
        _ => None,
    }
}

fn render_gauges(frame: &mut Frame, app: &App, area: Rect) {
    let cells = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);

    for (category, cell) in GAUGES.into_iter().zip(cells.iter()) {
        let title = format!(" {} ", category.label());
        let Some(gauge) = gauge_of(app, category) else {
            frame.render_widget(
                Paragraph::new(pending_text(app, category)).block(block(app, title)),
                *cell,
            );
            continue;
        };

        let color = app.theme.severity_color(gauge.severity);
        let widget = Gauge::default()
            .block(block(app, title))
            .gauge_style(Style::default().fg(color).bg(app.theme.track))
            .ratio((gauge.percent / 100.0).clamp(0.0, 1.0))
            .label(Span::styled(
                format!("{:.1}%", gauge.percent),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        frame.render_widget(widget, *cell);
    }
}

fn render_trend(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::horizontal([Constraint::Length(30), Constraint::Min(10)]).split(area);

    let load = GAUGES
        .into_iter()
        .find_map(|c| gauge_of(app, c).and_then(|g| g.load_average));
    let load_text = match load {
        Some(load) => format!(" {:.2}  {:.2}  {:.2}", load.one, load.five, load.fifteen),
        None => " -".to_string(),
    };
    frame.render_widget(
        Paragraph::new(load_text).block(block(app, " Load 1m 5m 15m ")),
        columns[0],
    );

    let series = app.history.gauge_series(MetricCategory::Cpu);
    let color = gauge_of(app, MetricCategory::Cpu)
        .map(|g| app.theme.severity_color(g.severity))
        .unwrap_or(app.theme.highlight);
    let sparkline = Sparkline::default()
        .block(block(app, " CPU history "))
        .data(&series)
        .max(100)
        .style(Style::default().fg(color));
    frame.render_widget(sparkline, columns[1]);
}

fn render_services(frame: &mut Frame, app: &App, area: Rect) {
    let title = " Services ";
    let services = match app.snapshot(MetricCategory::Services).map(|s| s.payload) {
        Some(payload) => match &*payload {
            MetricPayload::Services(services) => services.clone(),
            _ => Vec::new(),
        },
        None => {
            frame.render_widget(
                Paragraph::new(pending_text(app, MetricCategory::Services))
                    .block(block(app, title)),
                area,
            );
            return;
        }
    };

    let items: Vec<ListItem> = services
        .iter()
        .map(|service| {
            let style = match service.status {
                ServiceStatus::Running => app.theme.status_style(Severity::Ok),
                ServiceStatus::Stopped => app.theme.status_style(Severity::Critical),
                ServiceStatus::Unknown => app.theme.status_style(Severity::Warning),
            };
            ListItem::new(Line::from(vec![
                Span::styled("● ", style),
                Span::raw(format!("{:<16}", service.name)),
                Span::styled(service.status.label(), style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block(app, title)), area);
}

fn render_filesystem(frame: &mut Frame, app: &App, area: Rect) {
    let Some(snapshot) = app.snapshot(MetricCategory::Storage) else {
        frame.render_widget(
            Paragraph::new(pending_text(app, MetricCategory::Storage))
                .block(block(app, " Filesystem ")),
            area,
        );
        return;
    };
    let MetricPayload::Storage(fs) = &*snapshot.payload else {
        return;
    };

    let spec = filesystem_chart(fs);
    let title = match &fs.mountpoint {
        Some(mount) => format!(" {} {} ", mount, spec.title),
        None => format!(" {} ", spec.title),
    };
    let inner = block(app, title);
    let content = inner.inner(area);
    frame.render_widget(inner, area);

    let parts = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).split(content);
    let color = app.theme.severity_color(fs.severity);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(color).bg(app.theme.track))
            .ratio((fs.percentage / 100.0).clamp(0.0, 1.0))
            .label(format!("{:.0}%", fs.percentage)),
        parts[0],
    );
    render_chart_legend(frame, &spec, parts[1]);
}

/// One line per point with its share of the whole.
fn render_chart_legend(frame: &mut Frame, spec: &ChartSpec, area: Rect) {
    let total = spec.total().max(1) as f64;
    let lines: Vec<Line> = spec
        .points
        .iter()
        .map(|p| {
            Line::from(format!(
                " {:<10}{:>12}  {:>5.1}%",
                p.label,
                format_bytes(p.value),
                p.value as f64 / total * 100.0
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_top_consumers(frame: &mut Frame, app: &App, area: Rect) {
    let Some(snapshot) = app.snapshot(MetricCategory::TopConsumers) else {
        frame.render_widget(
            Paragraph::new(pending_text(app, MetricCategory::TopConsumers))
                .block(block(app, " Top Consumers ")),
            area,
        );
        return;
    };
    let MetricPayload::TopConsumers(ranked) = &*snapshot.payload else {
        return;
    };

    let spec = top_consumers_chart(ranked);
    let title = format!(" {} ({}) ", spec.title, spec.series_label);
    if spec.points.is_empty() {
        frame.render_widget(
            Paragraph::new(" No usage reported").block(block(app, title)),
            area,
        );
        return;
    }

    frame.render_widget(bar_chart(app, &spec).block(block(app, title)), area);
}

fn bar_chart<'a>(app: &App, spec: &'a ChartSpec) -> BarChart<'a> {
    let bars: Vec<Bar> = spec
        .points
        .iter()
        .map(|p| {
            Bar::default()
                .value(p.value)
                .label(Line::from(p.label.as_str()))
                .text_value(format_bytes(p.value))
                .style(Style::default().fg(app.theme.highlight))
        })
        .collect();

    let direction = match spec.kind {
        ChartKind::HorizontalBar => Direction::Horizontal,
        ChartKind::Doughnut => Direction::Vertical,
    };

    BarChart::default()
        .direction(direction)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0)
        .max(spec.max_value().max(1))
}
