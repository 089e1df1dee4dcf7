//! Declarative chart descriptions.
//!
//! The engine describes what to draw; the TUI decides how. Values are byte
//! counts so the renderer can label them with [`format_bytes`].
//!
//! [`format_bytes`]: super::size::format_bytes

use serde::Serialize;

use super::metrics::FilesystemUsage;
use super::ranking::RankedConsumer;
use super::size::format_bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    /// One horizontal bar per point.
    HorizontalBar,
    /// Proportional split of a whole.
    Doughnut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub series_label: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    /// Largest value in the chart, or 0 when empty.
    pub fn max_value(&self) -> u64 {
        self.points.iter().map(|p| p.value).max().unwrap_or(0)
    }

    /// Sum of all values.
    pub fn total(&self) -> u64 {
        self.points.iter().map(|p| p.value).sum()
    }
}

/// Bar chart of the heaviest consumers, in ranking order.
pub fn top_consumers_chart(ranked: &[RankedConsumer]) -> ChartSpec {
    ChartSpec {
        title: "Top Consumers".to_string(),
        kind: ChartKind::HorizontalBar,
        series_label: "Disk Usage".to_string(),
        points: ranked
            .iter()
            .map(|c| ChartPoint {
                label: c.identity.clone(),
                value: c.used,
            })
            .collect(),
    }
}

/// Used versus available space on the storage filesystem.
pub fn filesystem_chart(fs: &FilesystemUsage) -> ChartSpec {
    ChartSpec {
        title: format!("Total: {}", format_bytes(fs.size)),
        kind: ChartKind::Doughnut,
        series_label: "Storage".to_string(),
        points: vec![
            ChartPoint {
                label: "Used".to_string(),
                value: fs.used,
            },
            ChartPoint {
                label: "Available".to_string(),
                value: fs.available,
            },
        ],
    }
}
