//! Display formatting for chain statistics
//!
//! All functions here are pure: they take a raw value (possibly absent) and
//! return the text shown to visitors. Absent, zero and non-finite inputs render
//! as [`NOT_AVAILABLE`].

/// Text shown when a metric has no usable value
pub const NOT_AVAILABLE: &str = "N/A";

const HASHRATE_UNITS: [&str; 7] = ["H/s", "KH/s", "MH/s", "GH/s", "TH/s", "PH/s", "EH/s"];

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// Scale a hashes-per-second figure by 1000 until it drops below 1000 or the
/// units run out, e.g. `2_500_000.0` becomes `"2.50 MH/s"`
pub fn format_hashrate(hashrate: Option<f64>) -> String {
    let Some(mut value) = usable(hashrate) else {
        return NOT_AVAILABLE.to_string();
    };

    let mut unit = 0;
    while value >= 1000.0 && unit < HASHRATE_UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    format!("{:.2} {}", value, HASHRATE_UNITS[unit])
}

pub fn format_difficulty(difficulty: Option<f64>) -> String {
    let Some(value) = usable(difficulty) else {
        return NOT_AVAILABLE.to_string();
    };

    if value >= 1_000_000.0 {
        format!("{:.2} M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.2} K", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    }
}

pub fn format_block_height(height: Option<f64>) -> String {
    match usable(height) {
        Some(value) if value > 0.0 => format_number(value.trunc() as u64),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// `"2m 5s"`, or `"45s"` when under a minute
pub fn format_avg_block_time(seconds: Option<f64>) -> String {
    let Some(value) = usable(seconds) else {
        return NOT_AVAILABLE.to_string();
    };

    // Round the total first so 119.6 becomes "2m 0s", never "1m 60s"
    let total = value.round().max(0.0) as u64;
    let (minutes, secs) = (total / 60, total % 60);

    if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Format number with thousand separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let len = s.len();

    for (i, c) in s.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result
}

/// Whole-second duration split into calendar components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBreakdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeBreakdown {
    pub fn from_seconds(total: u64) -> Self {
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }

    pub fn days_text(&self) -> String {
        self.days.to_string()
    }

    pub fn hours_text(&self) -> String {
        format!("{:02}", self.hours)
    }

    pub fn minutes_text(&self) -> String {
        format!("{:02}", self.minutes)
    }

    pub fn seconds_text(&self) -> String {
        format!("{:02}", self.seconds)
    }

    /// Long form used in API payloads, e.g. `"1 days, 2 hours, 5 seconds"`
    ///
    /// Zero days/hours/minutes are dropped; seconds always appear.
    pub fn to_words(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if self.days > 0 {
            parts.push(format!("{} days", self.days));
        }
        if self.hours > 0 {
            parts.push(format!("{} hours", self.hours));
        }
        if self.minutes > 0 {
            parts.push(format!("{} minutes", self.minutes));
        }
        parts.push(format!("{} seconds", self.seconds));
        parts.join(", ")
    }
}
