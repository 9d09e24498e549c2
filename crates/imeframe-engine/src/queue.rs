// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fire-and-forget geometry dispatch to the host's layout queue.
//
// The state machine runs on the UI thread and must never wait for the host's
// layout subsystem. Updates go into an unbounded channel; a worker on the
// layout side drains it and applies each update. There is no retry and no
// cancellation: when several updates for the same view are pending, only the
// newest is applied.

use imeframe_bridge::traits::LayoutSink;
use imeframe_core::error::{ImeframeError, Result};
use imeframe_core::types::{LayoutUpdate, ViewId};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Sending half, handed to the session as its `LayoutSink`.
#[derive(Debug, Clone)]
pub struct TokioLayoutQueue {
    tx: mpsc::UnboundedSender<LayoutUpdate>,
}

/// Create a queue and the worker that drains it into `sink`.
pub fn layout_queue<S: LayoutSink>(sink: S) -> (TokioLayoutQueue, LayoutWorker<S>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TokioLayoutQueue { tx }, LayoutWorker { rx, sink })
}

impl LayoutSink for TokioLayoutQueue {
    fn push(&self, update: &LayoutUpdate) -> Result<()> {
        self.tx.send(*update).map_err(|_| ImeframeError::QueueClosed)
    }
}

/// Counters returned when the worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub applied: u64,
    pub failed: u64,
    /// Updates dropped because a newer one for the same view was pending.
    pub superseded: u64,
}

/// Receiving half; runs on the host's layout task.
pub struct LayoutWorker<S> {
    rx: mpsc::UnboundedReceiver<LayoutUpdate>,
    sink: S,
}

impl<S: LayoutSink> LayoutWorker<S> {
    /// Apply updates until every queue handle has been dropped.
    pub async fn run(mut self) -> WorkerStats {
        let mut stats = WorkerStats::default();
        while let Some(first) = self.rx.recv().await {
            let mut batch = vec![first];
            while let Ok(next) = self.rx.try_recv() {
                batch.push(next);
            }
            let before = batch.len();
            let batch = coalesce(batch);
            stats.superseded += (before - batch.len()) as u64;

            for update in &batch {
                match self.sink.push(update) {
                    Ok(()) => stats.applied += 1,
                    Err(e) => {
                        warn!(view = %update.view(), error = %e, "layout update failed");
                        stats.failed += 1;
                    }
                }
            }
        }
        debug!(?stats, "layout worker stopped");
        stats
    }
}

#[derive(PartialEq, Eq)]
enum UpdateKey {
    Size(ViewId),
    Position(ViewId),
}

fn key(update: &LayoutUpdate) -> UpdateKey {
    match update {
        LayoutUpdate::Size { view, .. } => UpdateKey::Size(*view),
        LayoutUpdate::Position { view, .. } => UpdateKey::Position(*view),
    }
}

/// Keep only the newest update per view and kind, preserving the order in
/// which the survivors were queued.
fn coalesce(batch: Vec<LayoutUpdate>) -> Vec<LayoutUpdate> {
    let mut kept: Vec<LayoutUpdate> = Vec::with_capacity(batch.len());
    for (i, update) in batch.iter().enumerate() {
        let k = key(update);
        if !batch[i + 1..].iter().any(|later| key(later) == k) {
            kept.push(*update);
        }
    }
    kept
}
