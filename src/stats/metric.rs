//! Metric identities and their unit-aware formatting

use std::fmt;

use crate::format;

/// One statistic exposed by the stats API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Height,
    Difficulty,
    Hashrate,
    AvgBlockTime,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Height,
        Metric::Difficulty,
        Metric::Hashrate,
        Metric::AvgBlockTime,
    ];

    /// Upper-case name used in logs and configuration dumps
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Height => "HEIGHT",
            Metric::Difficulty => "DIFFICULTY",
            Metric::Hashrate => "HASHRATE",
            Metric::AvgBlockTime => "AVG_BLOCK_TIME",
        }
    }

    /// Field holding the value in the endpoint's JSON body
    pub fn json_field(&self) -> &'static str {
        match self {
            Metric::Height => "height",
            Metric::Difficulty => "difficulty",
            Metric::Hashrate => "hashrate",
            Metric::AvgBlockTime => "avg_block_time",
        }
    }

    /// Human label for dashboards
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Height => "Block Height",
            Metric::Difficulty => "Difficulty",
            Metric::Hashrate => "Network Hashrate",
            Metric::AvgBlockTime => "Avg Block Time",
        }
    }

    pub fn format(&self, value: Option<f64>) -> String {
        match self {
            Metric::Height => format::format_block_height(value),
            Metric::Difficulty => format::format_difficulty(value),
            Metric::Hashrate => format::format_hashrate(value),
            Metric::AvgBlockTime => format::format_avg_block_time(value),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A metric resolved against the configured API base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricEndpoint {
    pub metric: Metric,
    pub url: String,
}

impl MetricEndpoint {
    pub fn new(metric: Metric, base_url: &str, suffix: &str) -> Self {
        Self {
            metric,
            url: join_url(base_url, suffix),
        }
    }
}

/// Raw value as fetched, formatted on demand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricValue {
    pub metric: Metric,
    pub raw: Option<f64>,
}

impl MetricValue {
    pub fn new(metric: Metric, raw: Option<f64>) -> Self {
        Self { metric, raw }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.metric.format(self.raw))
    }
}

pub(crate) fn join_url(base_url: &str, suffix: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if suffix.is_empty() {
        base.to_string()
    } else if suffix.starts_with('/') {
        format!("{}{}", base, suffix)
    } else {
        format!("{}/{}", base, suffix)
    }
}
