//! Client side of the stats site
//!
//! This module polls the stats API and turns its answers into display text:
//! the mining statistics panel ([`poller`]), the halving countdown
//! ([`countdown`]) and a terminal dashboard that shows both ([`ui`]).

pub mod countdown;
pub mod display;
pub mod fetcher;
pub mod metric;
pub mod poller;
pub mod ui;

// Re-export commonly used types
pub use countdown::{CountdownHandle, CountdownOptions, CountdownState, CountdownTimer};
pub use display::{Board, DisplaySink};
pub use fetcher::{ApiClient, StatsSource};
pub use metric::{Metric, MetricEndpoint, MetricValue};
pub use poller::{PollerConfig, StatsPoller};
pub use ui::StatsApp;
