//! Cancellable background subscriptions.
//!
//! Live countdowns and device-location tracking are modeled as explicit
//! subscriptions tied to the lifetime of the view that created them, torn
//! down deterministically on exit (no leaked interval timers or sensor
//! watches).

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A periodic clock tick. Sends `msg.clone()` on every period until
/// stopped or the receiver goes away.
#[derive(Debug)]
pub struct Ticker {
    token: CancellationToken,
}

impl Ticker {
    pub fn spawn<T>(period: Duration, tx: mpsc::Sender<T>, msg: T) -> Self
    where
        T: Clone + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.child_token();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of tokio's interval fires immediately; skip it
            // so the first message arrives one period after spawn.
            interval.tick().await;
            loop {
                tokio::select! {
                    () = child.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(msg.clone()).await.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("ticker stopped");
        });
        Self { token }
    }

    /// Stop the tick task. Also invoked on drop.
    pub fn stop(&self) {
        self.token.cancel();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Source of continuous device-location updates. Implementations wrap a
/// real sensor, a fixed CLI-supplied coordinate, or a test script.
pub trait LocationSource: Send + 'static {
    /// The next coordinate update, or `None` when the source is exhausted.
    fn next_update(&mut self) -> impl std::future::Future<Output = Option<(f64, f64)>> + Send;
}

/// A single fixed coordinate, emitted once (e.g. supplied via `--gps`).
#[derive(Debug)]
pub struct FixedLocation {
    coord: Option<(f64, f64)>,
}

impl FixedLocation {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self {
            coord: Some((lat, lng)),
        }
    }
}

impl LocationSource for FixedLocation {
    async fn next_update(&mut self) -> Option<(f64, f64)> {
        self.coord.take()
    }
}

/// A scripted sequence of updates with a fixed delay between them.
#[derive(Debug)]
pub struct ScriptedLocation {
    updates: std::vec::IntoIter<(f64, f64)>,
    delay: Duration,
}

impl ScriptedLocation {
    pub fn new(updates: Vec<(f64, f64)>, delay: Duration) -> Self {
        Self {
            updates: updates.into_iter(),
            delay,
        }
    }
}

impl LocationSource for ScriptedLocation {
    async fn next_update(&mut self) -> Option<(f64, f64)> {
        let next = self.updates.next()?;
        tokio::time::sleep(self.delay).await;
        Some(next)
    }
}

/// A running device-location watch. Forwards updates until the source is
/// exhausted, the watch is stopped, or the receiver goes away.
#[derive(Debug)]
pub struct LocationWatch {
    token: CancellationToken,
}

impl LocationWatch {
    pub fn spawn<S, T, F>(mut source: S, tx: mpsc::Sender<T>, make: F) -> Self
    where
        S: LocationSource,
        T: Send + 'static,
        F: Fn(f64, f64) -> T + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.child_token();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = child.cancelled() => break,
                    update = source.next_update() => {
                        let Some((lat, lng)) = update else { break };
                        if tx.send(make(lat, lng)).await.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("location watch stopped");
        });
        Self { token }
    }

    /// Stop the watch task. Also invoked on drop.
    pub fn stop(&self) {
        self.token.cancel();
    }
}

impl Drop for LocationWatch {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
