// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Background rate refreshes.
//!
//! Each refresh runs the fetch pipeline on its own Tokio task and posts the
//! outcome to a single-consumer inbox. The UI side drains the inbox on its
//! own schedule and is the only place the rate table is ever replaced.
//!
//! Overlapping refreshes are neither merged nor cancelled, and reports are
//! delivered in completion order. Each report carries its attempt number so
//! the consumer can tell them apart.

use futures::Stream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::api::RateSource;
use crate::exchange_rates::{fetch_rates, FetchOutcome, FetchSettings};

/// The outcome of one refresh attempt, as delivered to the inbox.
#[derive(Debug)]
pub struct RefreshReport {
    /// Starts at 1 and increases with every trigger.
    pub attempt: u64,
    pub outcome: FetchOutcome,
}

/// Starts refreshes. Cheap to clone; all clones feed the same inbox.
#[derive(Clone)]
pub struct RateRefresher {
    source: Arc<dyn RateSource>,
    settings: Arc<FetchSettings>,
    outbox: mpsc::UnboundedSender<RefreshReport>,
    attempts: Arc<AtomicU64>,
    runtime: Handle,
}

/// Receiving end for refresh reports. Owned by the UI context.
pub struct RefreshInbox {
    rx: mpsc::UnboundedReceiver<RefreshReport>,
}

/// Completion handle for a single refresh.
pub struct RefreshHandle {
    attempt: u64,
    task: JoinHandle<()>,
}

/// Create a refresher and its inbox.
///
/// Must be called from within a Tokio runtime; workers are spawned on it.
pub fn refresh_channel(
    source: Arc<dyn RateSource>,
    settings: FetchSettings,
) -> (RateRefresher, RefreshInbox) {
    let (outbox, rx) = mpsc::unbounded_channel();
    let refresher = RateRefresher {
        source,
        settings: Arc::new(settings),
        outbox,
        attempts: Arc::new(AtomicU64::new(0)),
        runtime: Handle::current(),
    };
    (refresher, RefreshInbox { rx })
}

impl RateRefresher {
    /// Start a refresh in the background and return immediately.
    pub fn trigger_refresh(&self) -> RefreshHandle {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let source = Arc::clone(&self.source);
        let settings = Arc::clone(&self.settings);
        let outbox = self.outbox.clone();

        debug!(attempt, "Starting rate refresh");
        let task = self.runtime.spawn(async move {
            let outcome = fetch_rates(source.as_ref(), &settings).await;
            match &outcome {
                Ok(table) => info!(attempt, as_of = table.as_of(), "Rate refresh succeeded"),
                Err(e) => warn!(
                    attempt,
                    reason = %e,
                    detail = e.detail().unwrap_or(""),
                    "Rate refresh failed"
                ),
            }

            if outbox.send(RefreshReport { attempt, outcome }).is_err() {
                debug!(attempt, "Refresh inbox closed, dropping report");
            }
        });

        RefreshHandle { attempt, task }
    }

    /// Number of refreshes triggered so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

impl RefreshHandle {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the worker has run and posted its report.
    pub async fn finished(self) -> Result<(), JoinError> {
        self.task.await
    }
}

impl RefreshInbox {
    /// Wait for the next report. `None` once every refresher is dropped.
    pub async fn recv(&mut self) -> Option<RefreshReport> {
        self.rx.recv().await
    }

    /// Take a report if one is already waiting.
    pub fn try_recv(&mut self) -> Option<RefreshReport> {
        self.rx.try_recv().ok()
    }

    /// Take every report that is already waiting, oldest first.
    pub fn drain(&mut self) -> Vec<RefreshReport> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    pub fn into_stream(self) -> impl Stream<Item = RefreshReport> {
        futures::stream::unfold(self, |mut inbox| async move {
            inbox.recv().await.map(|report| (report, inbox))
        })
    }
}
