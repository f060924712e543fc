//! Halving countdown
//!
//! A single actor task owns the [`CountdownState`]. Local one-second ticks and
//! remote refreshes both go through it, so a refresh result can never be
//! half-applied or lost to a concurrent decrement. Refresh requests run on
//! their own tasks and report back over a channel, which keeps the ticks on
//! schedule while a request is slow.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{error, info, warn};

use crate::config::{RefreshFailurePolicy, SiteConfig};
use crate::error::FetchError;
use crate::format::{format_number, TimeBreakdown};
use crate::stats::display::DisplaySink;
use crate::stats::fetcher::StatsSource;

const ERROR_TEXT: &str = "Error loading";
const DASHES: &str = "--";

/// Seconds and blocks left until the next halving
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountdownState {
    pub eta_seconds: u64,
    pub blocks_remaining: u64,
}

impl CountdownState {
    /// One local second elapsed; stays at zero once reached
    pub fn tick(&mut self) {
        self.eta_seconds = self.eta_seconds.saturating_sub(1);
    }

    pub fn breakdown(&self) -> TimeBreakdown {
        TimeBreakdown::from_seconds(self.eta_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    Uninitialized,
    Loading,
    Running,
    Error,
}

/// What observers see of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownView {
    pub phase: CountdownPhase,
    pub state: Option<CountdownState>,
}

/// Element identifiers the countdown renders into
#[derive(Debug, Clone)]
pub struct CountdownTargets {
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
    pub blocks_remaining: String,
}

impl Default for CountdownTargets {
    fn default() -> Self {
        Self {
            days: "days".to_string(),
            hours: "hours".to_string(),
            minutes: "minutes".to_string(),
            seconds: "seconds".to_string(),
            blocks_remaining: "blocks-remaining".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CountdownOptions {
    pub tick: Duration,
    pub refresh: Duration,
    /// Used instead of entering Error when the first fetch fails
    pub fallback: Option<CountdownState>,
    pub on_refresh_failure: RefreshFailurePolicy,
    pub targets: CountdownTargets,
}

impl CountdownOptions {
    pub fn from_site(site: &SiteConfig) -> Self {
        let countdown = &site.countdown;
        Self {
            tick: Duration::from_secs(1),
            refresh: Duration::from_millis(countdown.refresh_ms),
            fallback: countdown.fallback.map(|f| CountdownState {
                eta_seconds: f.eta_seconds,
                blocks_remaining: f.blocks_remaining,
            }),
            on_refresh_failure: countdown.on_refresh_failure,
            targets: CountdownTargets::default(),
        }
    }
}

enum Command {
    Teardown,
}

pub struct CountdownTimer {
    options: CountdownOptions,
    source: Arc<dyn StatsSource>,
    sink: Arc<dyn DisplaySink>,
    view: watch::Sender<CountdownView>,
}

impl CountdownTimer {
    pub fn new(options: CountdownOptions, source: Arc<dyn StatsSource>, sink: Arc<dyn DisplaySink>) -> Self {
        let (view, _) = watch::channel(CountdownView {
            phase: CountdownPhase::Uninitialized,
            state: None,
        });
        let timer = Self {
            options,
            source,
            sink,
            view,
        };
        timer.publish(CountdownPhase::Loading, None);
        timer
    }

    pub fn phase(&self) -> CountdownPhase {
        self.view.borrow().phase
    }

    /// Start the actor: initial fetch, then ticking and refreshing
    ///
    /// Dropping the returned handle stops the countdown.
    pub fn spawn(self) -> CountdownHandle {
        let (commands, rx) = mpsc::channel(4);
        let view = self.view.subscribe();
        let task = tokio::spawn(self.run(rx));
        CountdownHandle { commands, view, task }
    }

    async fn run(self, mut commands: mpsc::Receiver<Command>) {
        let mut state = match self.source.fetch_halving().await {
            Ok(state) => {
                info!(
                    eta_seconds = state.eta_seconds,
                    blocks_remaining = state.blocks_remaining,
                    "Halving data fetched, starting countdown"
                );
                state
            }
            Err(e) => match self.options.fallback {
                Some(fallback) => {
                    warn!(error = %e, "Halving request failed, using fallback data");
                    fallback
                }
                None => {
                    error!(error = %e, "Error initializing halving countdown");
                    self.enter_error();
                    return;
                }
            },
        };

        self.publish(CountdownPhase::Running, Some(state));
        self.render(&state);

        let start = Instant::now();
        let mut tick = interval_at(start + self.options.tick, self.options.tick);
        let mut refresh = interval_at(start + self.options.refresh, self.options.refresh);
        let (results_tx, mut results) = mpsc::channel::<Result<CountdownState, FetchError>>(4);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    state.tick();
                    self.publish(CountdownPhase::Running, Some(state));
                    self.render(&state);
                }
                _ = refresh.tick() => {
                    let source = self.source.clone();
                    let tx = results_tx.clone();
                    tokio::spawn(async move {
                        let _ = tx.send(source.fetch_halving().await).await;
                    });
                }
                Some(result) = results.recv() => match result {
                    Ok(fresh) => {
                        state = fresh;
                        self.publish(CountdownPhase::Running, Some(state));
                        self.render(&state);
                    }
                    Err(e) => match self.options.on_refresh_failure {
                        RefreshFailurePolicy::KeepRunning => {
                            warn!(error = %e, "Failed to update halving data");
                        }
                        RefreshFailurePolicy::Teardown => {
                            error!(error = %e, "Halving refresh failed, tearing down countdown");
                            self.enter_error();
                            return;
                        }
                    },
                },
                command = commands.recv() => match command {
                    Some(Command::Teardown) => {
                        self.enter_error();
                        return;
                    }
                    None => return,
                },
            }
        }
    }

    fn publish(&self, phase: CountdownPhase, state: Option<CountdownState>) {
        self.view.send_replace(CountdownView { phase, state });
    }

    fn render(&self, state: &CountdownState) {
        let targets = &self.options.targets;
        let time = state.breakdown();
        self.sink.set_text(&targets.blocks_remaining, &format_number(state.blocks_remaining));
        self.sink.set_text(&targets.days, &time.days_text());
        self.sink.set_text(&targets.hours, &time.hours_text());
        self.sink.set_text(&targets.minutes, &time.minutes_text());
        self.sink.set_text(&targets.seconds, &time.seconds_text());
    }

    /// Timers stop with the actor; only the placeholders remain
    fn enter_error(&self) {
        let targets = &self.options.targets;
        self.sink.set_text(&targets.blocks_remaining, ERROR_TEXT);
        for target in [&targets.days, &targets.hours, &targets.minutes, &targets.seconds] {
            self.sink.set_text(target, DASHES);
        }
        self.publish(CountdownPhase::Error, None);
    }
}

/// Control and observation side of a spawned countdown
pub struct CountdownHandle {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<CountdownView>,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    pub fn view(&self) -> CountdownView {
        *self.view.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CountdownView> {
        self.view.clone()
    }

    /// Stop both timers and show the error placeholders
    pub async fn teardown(self) {
        if self.commands.send(Command::Teardown).await.is_err() {
            // Actor already finished
            return;
        }
        let _ = self.task.await;
    }

    /// Stop scheduling without touching the display
    pub fn stop(self) {
        self.task.abort();
    }
}
