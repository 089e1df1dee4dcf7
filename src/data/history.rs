//! Historical usage tracking for sparklines and growth rates.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

use super::metrics::QuotaRow;
use crate::store::MetricCategory;

/// Maximum number of samples kept per series.
const MAX_HISTORY_SIZE: usize = 60;

fn push_capped<T>(series: &mut VecDeque<T>, value: T) {
    series.push_back(value);
    if series.len() > MAX_HISTORY_SIZE {
        series.pop_front();
    }
}

/// Tracks usage over time.
///
/// Consumer usage is recorded once per quota snapshot; host gauges once per
/// gauge snapshot.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Bytes used per consumer, oldest first.
    pub consumer_usage: HashMap<String, VecDeque<u64>>,
    /// When each quota snapshot was recorded.
    pub timestamps: VecDeque<Instant>,
    /// Gauge percentages per category.
    pub gauges: HashMap<MetricCategory, VecDeque<f64>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a quota snapshot.
    ///
    /// Consumers missing from the snapshot lose their series, so a consumer
    /// that comes back starts over in step with the latest timestamps.
    pub fn record_quotas(&mut self, rows: &[QuotaRow], at: Instant) {
        let present: HashSet<&str> = rows.iter().map(|r| r.consumer.identity.as_str()).collect();
        self.consumer_usage.retain(|identity, _| present.contains(identity.as_str()));

        for row in rows {
            let series = self
                .consumer_usage
                .entry(row.consumer.identity.clone())
                .or_default();
            push_capped(series, row.consumer.used);
        }
        push_capped(&mut self.timestamps, at);
    }

    pub fn record_gauge(&mut self, category: MetricCategory, percent: f64) {
        push_capped(self.gauges.entry(category).or_default(), percent);
    }

    /// Usage levels normalized to 0-7 for 8 bar levels.
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn usage_sparkline(&self, identity: &str) -> Vec<u8> {
        let Some(values) = self.consumer_usage.get(identity) else {
            return Vec::new();
        };
        if values.len() < 2 {
            return Vec::new();
        }

        let max = values.iter().copied().max().unwrap_or(0);
        let min = values.iter().copied().min().unwrap_or(0);
        let range = (max - min).max(1) as f64;

        values
            .iter()
            .map(|&v| (((v - min) as f64 / range * 7.0) as u8).min(7))
            .collect()
    }

    /// Gauge history as whole percentages, for ratatui's `Sparkline`.
    pub fn gauge_series(&self, category: MetricCategory) -> Vec<u64> {
        self.gauges
            .get(&category)
            .map(|s| s.iter().map(|p| p.clamp(0.0, 100.0).round() as u64).collect())
            .unwrap_or_default()
    }

    /// Growth in bytes per second between the last two quota snapshots.
    ///
    /// Returns None if there's not enough history to calculate a rate.
    pub fn growth_rate(&self, identity: &str) -> Option<f64> {
        let usage = self.consumer_usage.get(identity)?;
        if usage.len() < 2 || self.timestamps.len() < 2 {
            return None;
        }

        let current = *usage.back()?;
        let previous = *usage.get(usage.len() - 2)?;
        let delta = current as f64 - previous as f64;

        let current_time = self.timestamps.back()?;
        let previous_time = self.timestamps.get(self.timestamps.len() - 2)?;
        let elapsed = current_time.duration_since(*previous_time).as_secs_f64();

        if elapsed > 0.0 {
            Some(delta / elapsed)
        } else {
            None
        }
    }
}
