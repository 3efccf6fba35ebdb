//! Polling weather fetcher.
//!
//! A single driver task owns all fetch state: queries arrive as commands,
//! observers watch a [`FetchState`] channel. The driver re-issues the active
//! query on a fixed interval and fences stale responses with a generation
//! counter, so observed state never regresses to a superseded query's data.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use stratus_store::PrefStore;

use crate::provider::WeatherProvider;
use crate::types::{LocationQuery, WeatherError, WeatherSnapshot};

/// Default re-fetch cadence for the active query
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Label used when an explicit query resolves without a caller-supplied name
const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Lifecycle of the current query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    /// No query set yet
    Idle,
    /// Explicit query issued, first response pending
    Loading,
    /// Last request succeeded
    Ready,
    /// Last request failed
    Failed,
}

/// Observable fetch state.
///
/// `snapshot` always holds the last successful result, including across
/// query changes and failed refreshes; `stale` marks a snapshot whose most
/// recent refresh failed.
#[derive(Debug, Clone)]
pub struct FetchState {
    pub phase: FetchPhase,
    pub snapshot: Option<Arc<WeatherSnapshot>>,
    pub error: Option<String>,
    pub stale: bool,
}

impl FetchState {
    fn idle() -> Self {
        Self {
            phase: FetchPhase::Idle,
            snapshot: None,
            error: None,
            stale: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }

    pub fn has_data(&self) -> bool {
        self.snapshot.is_some()
    }
}

enum Command {
    SetQuery {
        query: LocationQuery,
        label: Option<String>,
    },
}

struct FetchOutcome {
    generation: u64,
    background: bool,
    result: Result<WeatherSnapshot, WeatherError>,
}

/// Handle to the fetcher driver task.
///
/// Dropping the handle aborts the driver and any in-flight request; no state
/// is mutated after the consumer stops observing.
pub struct WeatherFetcher {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<FetchState>,
    driver: JoinHandle<()>,
}

impl WeatherFetcher {
    /// Spawn the driver task. `prefs` receives the last viewed location on
    /// each successful explicit query change.
    pub fn spawn(
        provider: WeatherProvider,
        prefs: Arc<PrefStore>,
        poll_interval: Duration,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(FetchState::idle());
        let driver = tokio::spawn(drive(provider, prefs, poll_interval, command_rx, state_tx));

        Self {
            commands,
            state,
            driver,
        }
    }

    /// Watch fetch state changes. The receiver starts at the current state.
    pub fn observe(&self) -> watch::Receiver<FetchState> {
        self.state.clone()
    }

    /// Switch to a new query.
    ///
    /// An identical query while a request for it is already in flight is a
    /// no-op. A different query supersedes the in-flight request: its late
    /// response is discarded, never published.
    pub fn set_query(&self, query: LocationQuery, label: Option<String>) {
        let _ = self.commands.send(Command::SetQuery { query, label });
    }
}

impl Drop for WeatherFetcher {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive(
    provider: WeatherProvider,
    prefs: Arc<PrefStore>,
    poll_interval: Duration,
    mut commands: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<FetchState>,
) {
    // A zero interval means polling is disabled; park the ticker far out.
    let poll_interval = if poll_interval.is_zero() {
        Duration::from_secs(60 * 60 * 24 * 365)
    } else {
        poll_interval
    };

    let (outcome_tx, mut outcomes) = mpsc::unbounded_channel::<FetchOutcome>();

    let mut query: Option<LocationQuery> = None;
    let mut label: Option<String> = None;
    let mut generation: u64 = 0;
    let mut inflight: Option<JoinHandle<()>> = None;

    let mut ticker = tokio::time::interval_at(
        tokio::time::Instant::now() + poll_interval,
        poll_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            cmd = commands.recv() => {
                let Some(Command::SetQuery { query: new_query, label: new_label }) = cmd else {
                    // Handle dropped; stop driving.
                    break;
                };

                // Re-observing the identical query while its request is in
                // flight must not issue a duplicate.
                if query == Some(new_query) && inflight.is_some() {
                    tracing::debug!("Ignoring duplicate query while in flight");
                    continue;
                }

                // Supersede: the old response must never be published.
                if let Some(task) = inflight.take() {
                    task.abort();
                }
                generation += 1;
                query = Some(new_query);
                label = new_label;

                let previous = state_tx.borrow().snapshot.clone();
                let _ = state_tx.send(FetchState {
                    phase: FetchPhase::Loading,
                    snapshot: previous,
                    error: None,
                    stale: false,
                });

                inflight = Some(start_fetch(
                    &provider,
                    new_query,
                    generation,
                    false,
                    outcome_tx.clone(),
                ));
                // Poll cadence is measured from the explicit change.
                ticker.reset();
            }

            _ = ticker.tick() => {
                let Some(active) = query else { continue };
                if inflight.is_some() {
                    continue;
                }
                generation += 1;
                tracing::debug!("Background refresh of active query");
                inflight = Some(start_fetch(
                    &provider,
                    active,
                    generation,
                    true,
                    outcome_tx.clone(),
                ));
            }

            outcome = outcomes.recv() => {
                // The driver owns the only sender clones handed to fetch
                // tasks, so the channel stays open for the loop's lifetime.
                let Some(outcome) = outcome else { break };

                if outcome.generation != generation {
                    tracing::debug!(
                        "Discarding fenced response (generation {} != {})",
                        outcome.generation,
                        generation
                    );
                    continue;
                }
                inflight = None;

                match outcome.result {
                    Ok(snapshot) => {
                        if !outcome.background {
                            if let Some(active) = query {
                                persist_location(&prefs, &active, label.as_deref());
                            }
                        }
                        let _ = state_tx.send(FetchState {
                            phase: FetchPhase::Ready,
                            snapshot: Some(Arc::new(snapshot)),
                            error: None,
                            stale: false,
                        });
                    }
                    Err(e) => {
                        // Stale-but-present beats blanking the view: the last
                        // good snapshot stays observable alongside the error.
                        let previous = state_tx.borrow().snapshot.clone();
                        let stale = previous.is_some();
                        if outcome.background {
                            tracing::warn!("Background refresh failed: {}", e);
                        } else {
                            tracing::warn!("Fetch failed: {}", e);
                        }
                        let _ = state_tx.send(FetchState {
                            phase: FetchPhase::Failed,
                            snapshot: previous,
                            error: Some(e.to_string()),
                            stale,
                        });
                    }
                }
            }
        }
    }
}

fn start_fetch(
    provider: &WeatherProvider,
    query: LocationQuery,
    generation: u64,
    background: bool,
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
) -> JoinHandle<()> {
    let provider = provider.clone();
    tokio::spawn(async move {
        let result = provider.fetch_forecast(&query).await;
        let _ = outcome_tx.send(FetchOutcome {
            generation,
            background,
            result,
        });
    })
}

/// Persist the resolved location so a future session restores it.
fn persist_location(prefs: &PrefStore, query: &LocationQuery, label: Option<&str>) {
    let name = label.unwrap_or(UNKNOWN_LOCATION);
    if let Err(e) =
        prefs.set_last_location(query.point.latitude, query.point.longitude, name)
    {
        tracing::warn!("Failed to persist last location: {}", e);
    }
}
