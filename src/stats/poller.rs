//! Periodic refresh of the mining statistics panel
//!
//! The poller owns no display state of its own: whatever a target last showed
//! stays there until a later successful fetch overwrites it.

use chrono::Local;
use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::SiteConfig;
use crate::error::FetchError;
use crate::stats::display::DisplaySink;
use crate::stats::fetcher::StatsSource;
use crate::stats::metric::{Metric, MetricValue};

/// Display target for the "Last updated" line
pub const LAST_UPDATE_TARGET: &str = "last-update";

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Metrics to poll and the display target each one renders into
    pub bindings: Vec<(Metric, String)>,
    pub refresh_interval: Duration,
    /// Text shown before the first successful fetch
    pub placeholder: String,
    pub last_update_target: Option<String>,
}

impl PollerConfig {
    pub fn from_site(site: &SiteConfig) -> Self {
        Self {
            bindings: Metric::ALL
                .iter()
                .map(|metric| (*metric, site.bindings.target(*metric).to_string()))
                .collect(),
            refresh_interval: Duration::from_millis(site.refresh_interval_ms),
            placeholder: site.placeholder.clone(),
            last_update_target: Some(LAST_UPDATE_TARGET.to_string()),
        }
    }
}

/// Outcome of one refresh cycle
#[derive(Debug, Default)]
pub struct CycleReport {
    pub updated: Vec<Metric>,
    pub failed: Vec<(Metric, FetchError)>,
    /// Set when the initial cycle fell back to placeholders
    pub fell_back: bool,
}

pub struct StatsPoller {
    config: PollerConfig,
    source: Arc<dyn StatsSource>,
    sink: Arc<dyn DisplaySink>,
    /// Held for a whole cycle; `true` until the initial cycle has run
    cycle: Mutex<bool>,
}

impl StatsPoller {
    pub fn new(config: PollerConfig, source: Arc<dyn StatsSource>, sink: Arc<dyn DisplaySink>) -> Self {
        Self {
            config,
            source,
            sink,
            cycle: Mutex::new(true),
        }
    }

    /// Render placeholders, run the first cycle, then refresh on the interval
    ///
    /// Aborting the returned handle stops further cycles.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.render_placeholders();

            let mut interval = tokio::time::interval(self.config.refresh_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // The first tick completes immediately
                interval.tick().await;
                let report = self.fetch_all().await;
                debug!(
                    updated = report.updated.len(),
                    failed = report.failed.len(),
                    fell_back = report.fell_back,
                    "Stats refresh cycle finished"
                );
            }
        })
    }

    pub fn render_placeholders(&self) {
        for (_, target) in &self.config.bindings {
            self.sink.set_text(target, &self.config.placeholder);
        }
    }

    /// Run one refresh cycle over every bound metric
    ///
    /// Requests run concurrently. On the very first cycle the results are
    /// joined and applied all-or-nothing; afterwards each result is applied
    /// as soon as it arrives and failures leave the previous text in place.
    ///
    /// Cycles never overlap: a call made while another cycle is in flight
    /// waits for it, so a late initial fallback cannot overwrite newer text.
    pub async fn fetch_all(&self) -> CycleReport {
        let mut initial = self.cycle.lock().await;
        if std::mem::replace(&mut *initial, false) {
            self.initial_cycle().await
        } else {
            self.refresh_cycle().await
        }
    }

    async fn initial_cycle(&self) -> CycleReport {
        let results = join_all(
            self.config
                .bindings
                .iter()
                .map(|(metric, target)| self.fetch_one(*metric, target)),
        )
        .await;

        let mut report = CycleReport::default();
        let mut values = Vec::with_capacity(results.len());
        for (metric, target, result) in results {
            match result {
                Ok(raw) => values.push((target, MetricValue::new(metric, raw))),
                Err(e) => report.failed.push((metric, e)),
            }
        }

        if !report.failed.is_empty() {
            warn!(
                failed = report.failed.len(),
                "Failed to fetch mining data on initial load, using fallback"
            );
            self.render_placeholders();
            report.fell_back = true;
            return report;
        }

        for (target, value) in values {
            self.sink.set_text(target, &value.to_string());
            report.updated.push(value.metric);
        }
        self.render_last_update();

        info!("Mining statistics updated successfully");
        report
    }

    async fn refresh_cycle(&self) -> CycleReport {
        let mut pending: FuturesUnordered<_> = self
            .config
            .bindings
            .iter()
            .map(|(metric, target)| self.fetch_one(*metric, target))
            .collect();

        let mut report = CycleReport::default();
        while let Some((metric, target, result)) = pending.next().await {
            match result {
                Ok(raw) => {
                    let value = MetricValue::new(metric, raw);
                    self.sink.set_text(target, &value.to_string());
                    report.updated.push(metric);
                }
                Err(e) => report.failed.push((metric, e)),
            }
        }

        if !report.updated.is_empty() {
            self.render_last_update();
        }

        report
    }

    async fn fetch_one<'a>(
        &self,
        metric: Metric,
        target: &'a str,
    ) -> (Metric, &'a str, Result<Option<f64>, FetchError>) {
        let result = self.source.fetch_metric(metric).await;
        match &result {
            Ok(raw) => {
                debug!(metric = %metric, value = ?raw, "Fetched metric");
                crate::metrics::record_fetch(metric.name(), "success");
            }
            Err(e) => {
                warn!(metric = %metric, error = %e, "Error fetching metric");
                crate::metrics::record_fetch(metric.name(), e.kind());
            }
        }
        (metric, target, result)
    }

    fn render_last_update(&self) {
        if let Some(target) = &self.config.last_update_target {
            let text = format!("Last updated: {}", Local::now().format("%H:%M:%S"));
            self.sink.set_text(target, &text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::display::Board;
    use crate::stats::testing::{Outcome, ScriptedSource};

    fn poller_with(source: ScriptedSource) -> (StatsPoller, Board) {
        let board = Board::new();
        let config = PollerConfig::from_site(&SiteConfig::default());
        let poller = StatsPoller::new(config, Arc::new(source), Arc::new(board.clone()));
        (poller, board)
    }

    fn healthy_source() -> ScriptedSource {
        ScriptedSource::new()
            .metric(Metric::Height, vec![Outcome::Value(Some(1_234_567.0))])
            .metric(Metric::Difficulty, vec![Outcome::Value(Some(54_321.0))])
            .metric(Metric::Hashrate, vec![Outcome::Value(Some(2_500_000.0))])
            .metric(Metric::AvgBlockTime, vec![Outcome::Value(Some(125.0))])
    }

    #[tokio::test]
    async fn test_initial_cycle_renders_all_metrics() {
        let (poller, board) = poller_with(healthy_source());
        poller.render_placeholders();

        let report = poller.fetch_all().await;

        assert_eq!(report.updated.len(), 4);
        assert!(!report.fell_back);
        assert_eq!(board.get("block-height").as_deref(), Some("1,234,567"));
        assert_eq!(board.get("difficulty").as_deref(), Some("54.32 K"));
        assert_eq!(board.get("network-hashrate").as_deref(), Some("2.50 MH/s"));
        assert_eq!(board.get("avg-block-time").as_deref(), Some("2m 5s"));
        assert!(board.get(LAST_UPDATE_TARGET).unwrap().starts_with("Last updated: "));
    }

    #[tokio::test]
    async fn test_initial_cycle_all_unreachable_keeps_placeholders() {
        let source = ScriptedSource::new()
            .metric(Metric::Height, vec![Outcome::Http(503)])
            .metric(Metric::Difficulty, vec![Outcome::Http(503)])
            .metric(Metric::Hashrate, vec![Outcome::Http(503)])
            .metric(Metric::AvgBlockTime, vec![Outcome::Http(503)]);
        let (poller, board) = poller_with(source);
        poller.render_placeholders();

        let report = poller.fetch_all().await;

        assert!(report.fell_back);
        assert_eq!(report.failed.len(), 4);
        for target in ["block-height", "difficulty", "network-hashrate", "avg-block-time"] {
            assert_eq!(board.get(target).as_deref(), Some("Loading..."));
        }
        assert!(board.get(LAST_UPDATE_TARGET).is_none());
    }

    #[tokio::test]
    async fn test_initial_cycle_partial_failure_is_all_or_nothing() {
        let source = healthy_source().metric(Metric::Difficulty, vec![Outcome::Parse]);
        let (poller, board) = poller_with(source);
        poller.render_placeholders();

        let report = poller.fetch_all().await;

        assert!(report.fell_back);
        assert!(report.updated.is_empty());
        assert_eq!(board.get("network-hashrate").as_deref(), Some("Loading..."));
        assert_eq!(board.get("block-height").as_deref(), Some("Loading..."));
    }

    #[tokio::test]
    async fn test_later_failure_keeps_previous_value() {
        let source = ScriptedSource::new()
            .metric(Metric::Height, vec![Outcome::Value(Some(100.0)), Outcome::Value(Some(101.0))])
            .metric(Metric::Difficulty, vec![Outcome::Value(Some(5_000.0)), Outcome::Http(500)])
            .metric(Metric::Hashrate, vec![Outcome::Value(Some(1_000.0)), Outcome::Value(Some(3_000_000_000.0))])
            .metric(Metric::AvgBlockTime, vec![Outcome::Value(Some(60.0)), Outcome::Parse]);
        let (poller, board) = poller_with(source);

        poller.fetch_all().await;
        assert_eq!(board.get("difficulty").as_deref(), Some("5.00 K"));

        let report = poller.fetch_all().await;

        assert!(!report.fell_back);
        assert_eq!(report.updated.len(), 2);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(board.get("block-height").as_deref(), Some("101"));
        assert_eq!(board.get("network-hashrate").as_deref(), Some("3.00 GH/s"));
        assert_eq!(board.get("difficulty").as_deref(), Some("5.00 K"));
        assert_eq!(board.get("avg-block-time").as_deref(), Some("1m 0s"));
    }

    #[tokio::test]
    async fn test_null_value_renders_not_available() {
        let source = healthy_source().metric(Metric::Hashrate, vec![Outcome::Value(None)]);
        let (poller, board) = poller_with(source);

        poller.fetch_all().await;

        assert_eq!(board.get("network-hashrate").as_deref(), Some("N/A"));
    }

    /// Height stalls on its first request and then fails; every later request succeeds
    struct StallingSource {
        inner: ScriptedSource,
        height_calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl StatsSource for StallingSource {
        async fn fetch_metric(&self, metric: Metric) -> Result<Option<f64>, FetchError> {
            if metric == Metric::Height
                && self.height_calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0
            {
                tokio::time::sleep(Duration::from_secs(10)).await;
                return Err(FetchError::Http { status: 504 });
            }
            self.inner.fetch_metric(metric).await
        }

        async fn fetch_halving(&self) -> Result<crate::stats::CountdownState, FetchError> {
            self.inner.fetch_halving().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_during_slow_initial_cycle_is_not_overwritten() {
        let source = StallingSource {
            inner: healthy_source(),
            height_calls: std::sync::atomic::AtomicUsize::new(0),
        };
        let board = Board::new();
        let poller = Arc::new(StatsPoller::new(
            PollerConfig::from_site(&SiteConfig::default()),
            Arc::new(source),
            Arc::new(board.clone()),
        ));
        poller.render_placeholders();

        let initial = tokio::spawn({
            let poller = poller.clone();
            async move { poller.fetch_all().await }
        });
        tokio::time::sleep(Duration::from_secs(2)).await;
        let manual = tokio::spawn({
            let poller = poller.clone();
            async move { poller.fetch_all().await }
        });

        let initial = initial.await.unwrap();
        let manual = manual.await.unwrap();

        assert!(initial.fell_back);
        assert!(!manual.fell_back);
        assert_eq!(manual.updated.len(), 4);
        assert_eq!(board.get("block-height").as_deref(), Some("1,234,567"));
        assert_eq!(board.get("network-hashrate").as_deref(), Some("2.50 MH/s"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_refreshes_on_interval() {
        let source = healthy_source()
            .metric(Metric::Height, vec![Outcome::Value(Some(10.0)), Outcome::Value(Some(11.0))]);
        let (poller, board) = poller_with(source);
        let handle = Arc::new(poller).start();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(board.get("block-height").as_deref(), Some("10"));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(board.get("block-height").as_deref(), Some("11"));

        handle.abort();
    }
}
