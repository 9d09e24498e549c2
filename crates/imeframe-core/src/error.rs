// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for imeframe.

use thiserror::Error;

/// Top-level error type for all imeframe operations.
///
/// A zero-sized visible area is not an error; it means "not laid out yet".
#[derive(Debug, Error)]
pub enum ImeframeError {
    // -- Host bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    #[error("layout listener already registered")]
    AlreadyRegistered,

    // -- Fan-out / geometry push --
    #[error("keyboard listener {id} failed: {reason}")]
    Listener { id: u64, reason: String },

    #[error("geometry push for view {view} failed: {reason}")]
    LayoutPush { view: i32, reason: String },

    #[error("layout queue closed")]
    QueueClosed,

    // -- Configuration / traces --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid host trace: {0}")]
    Trace(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ImeframeError>;
