//! Watch command implementation
//!
//! Runs a [`StatsPoller`] and a [`CountdownTimer`] against the stats API and
//! draws what they render in a terminal dashboard.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, path::Path, sync::Arc, time::Duration};

use palladium_stats::{
    config::{self, SiteConfig},
    stats::{
        ApiClient, Board, CountdownHandle, CountdownOptions, CountdownTimer, PollerConfig,
        StatsApp, StatsPoller, StatsSource,
    },
};

/// Execute the watch command
///
/// # Arguments
/// * `config_path` - Optional configuration file
/// * `url` - Stats API base URL override
/// * `interval_secs` - Refresh interval override in seconds
pub async fn execute(
    config_path: Option<&Path>,
    url: Option<String>,
    interval_secs: Option<f64>,
) -> Result<()> {
    let mut site = config::load_config(config_path)?.site;
    apply_overrides(&mut site, url, interval_secs)?;

    run_dashboard(site).await
}

/// Apply command line overrides on top of the configured site section
fn apply_overrides(
    site: &mut SiteConfig,
    url: Option<String>,
    interval_secs: Option<f64>,
) -> Result<()> {
    if let Some(url) = url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("Invalid URL: '{}'. Must start with http:// or https://", url);
        }
        site.api_base_url = url;
    }

    if let Some(interval) = interval_secs {
        if !(0.1..=3600.0).contains(&interval) {
            anyhow::bail!(
                "Invalid interval: {}. Must be between 0.1 and 3600 seconds",
                interval
            );
        }
        site.refresh_interval_ms = (interval * 1000.0).round() as u64;
    }

    Ok(())
}

/// Run the stats dashboard
async fn run_dashboard(site: SiteConfig) -> Result<()> {
    let board = Board::new();
    let source: Arc<dyn StatsSource> = Arc::new(ApiClient::from_config(&site));

    let poller = Arc::new(StatsPoller::new(
        PollerConfig::from_site(&site),
        source.clone(),
        Arc::new(board.clone()),
    ));
    let poller_task = poller.clone().start();

    let countdown = CountdownTimer::new(
        CountdownOptions::from_site(&site),
        source,
        Arc::new(board.clone()),
    )
    .spawn();

    let mut app = StatsApp::new(board, site.bindings.clone(), site.api_base_url.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = event_loop(&mut terminal, &mut app, &poller, &countdown).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    poller_task.abort();
    countdown.stop();

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut StatsApp,
    poller: &Arc<StatsPoller>,
    countdown: &CountdownHandle,
) -> Result<()> {
    loop {
        app.countdown_phase = countdown.view().phase;
        terminal.draw(|f| app.render(f))?;

        // Poll with a timeout so the countdown redraws every tick
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if app.handle_key(key) {
                    return Ok(());
                }

                // Manual refresh (r key)
                if matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R')) {
                    let poller = poller.clone();
                    tokio::spawn(async move {
                        poller.fetch_all().await;
                    });
                }
            }
        }

        // Give the poller and countdown tasks a turn between frames
        tokio::task::yield_now().await;
    }
}
