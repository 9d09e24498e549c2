// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// imeframe-replay — run a recorded layout trace through a keyboard session.
//
// Usage: imeframe-replay <trace.json> [config.json]
//
// Every sample in the trace is fed to the session as one layout callback.
// Geometry goes through the same fire-and-forget queue a host would drain.
// A JSON summary is printed to stdout; logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use imeframe_bridge::traits::{HostDisplay, LayoutSink};
use imeframe_bridge::{HostTrace, ScriptedHost};
use imeframe_core::error::{ImeframeError, Result};
use imeframe_core::types::{KeyboardFrame, KeyboardTransition, LayoutUpdate, SessionId};
use imeframe_core::EngineConfig;
use imeframe_engine::queue::WorkerStats;
use imeframe_engine::{GeometryUpdate, KeyboardSession, OnKeyboardChangeListener, layout_queue};

#[derive(Debug, Serialize)]
struct ReplaySummary {
    session: SessionId,
    platform: String,
    profile: &'static str,
    samples: usize,
    transitions: Vec<KeyboardTransition>,
    /// Updates the layout worker actually applied, after coalescing.
    applied: Vec<LayoutUpdate>,
    final_geometry: GeometryUpdate,
    worker: WorkerStats,
}

/// Listener that only logs; the summary collects transitions directly.
struct LogListener;

impl OnKeyboardChangeListener for LogListener {
    fn on_keyboard_shown(&mut self, frame: &KeyboardFrame) -> Result<()> {
        info!(frame = %frame, height = frame.height(), "keyboard shown");
        Ok(())
    }

    fn on_keyboard_resized(&mut self, frame: &KeyboardFrame) -> Result<()> {
        info!(frame = %frame, height = frame.height(), "keyboard resized");
        Ok(())
    }

    fn on_keyboard_closed(&mut self) -> Result<()> {
        info!("keyboard closed");
        Ok(())
    }
}

/// Stand-in for the host layout engine.
#[derive(Default)]
struct CollectingSink {
    applied: Mutex<Vec<LayoutUpdate>>,
}

impl LayoutSink for CollectingSink {
    fn push(&self, update: &LayoutUpdate) -> Result<()> {
        debug!(?update, "applying layout update");
        self.applied
            .lock()
            .map_err(|_| ImeframeError::Bridge("layout sink poisoned".into()))?
            .push(*update);
        Ok(())
    }
}

async fn replay(trace: &HostTrace, config: EngineConfig) -> Result<ReplaySummary> {
    let host = ScriptedHost::from_trace(trace);
    let applied = Arc::new(CollectingSink::default());
    let (queue, worker) = layout_queue(Arc::clone(&applied));
    let worker = tokio::spawn(worker.run());

    let mut session = KeyboardSession::new(Box::new(host.clone()), Box::new(queue), config)?;
    session.set_cover_view(trace.cover_view);
    session.set_content_view(trace.content_view);
    session.set_placeholder_height(trace.placeholder_height);
    session.register_listener(Box::new(LogListener));
    session.attach()?;

    let mut transitions = Vec::new();
    for (index, rect) in trace.samples.iter().enumerate() {
        host.set_visible_frame(*rect);
        match session.on_layout_signal() {
            Ok(Some(transition)) => transitions.push(transition),
            Ok(None) => debug!(index, visible = %rect, "no transition"),
            Err(e) => warn!(index, error = %e, "layout signal failed"),
        }
    }

    let session_id = session.id();
    let profile = session.profile().name();
    let final_geometry = session.current_geometry();
    session.detach()?;
    // Dropping the session drops the queue sender and lets the worker finish.
    drop(session);

    let worker = worker
        .await
        .map_err(|e| ImeframeError::Bridge(format!("layout worker panicked: {e}")))?;
    let applied = applied
        .applied
        .lock()
        .map_err(|_| ImeframeError::Bridge("layout sink poisoned".into()))?
        .clone();

    Ok(ReplaySummary {
        session: session_id,
        platform: host.platform_name().to_string(),
        profile,
        samples: trace.samples.len(),
        transitions,
        applied,
        final_geometry,
        worker,
    })
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(trace_path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: imeframe-replay <trace.json> [config.json]");
        return ExitCode::from(2);
    };
    let config_path = args.next().map(PathBuf::from);

    let trace = match HostTrace::load(&trace_path) {
        Ok(trace) => trace,
        Err(e) => {
            error!(path = %trace_path.display(), error = %e, "failed to load trace");
            return ExitCode::FAILURE;
        }
    };
    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };

    info!(path = %trace_path.display(), samples = trace.samples.len(), "replaying trace");
    let summary = match replay(&trace, config).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "replay failed");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "failed to serialize summary");
            ExitCode::FAILURE
        }
    }
}
