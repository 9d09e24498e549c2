// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// imeframe — Core geometry types, error definitions, and engine configuration
// shared across all crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, FanOutPolicy};
pub use error::ImeframeError;
pub use types::*;
