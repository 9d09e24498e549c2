// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! imeframe — Host display bridge abstractions.
//!
//! This crate defines the traits the keyboard engine uses to read window
//! geometry and device identity from the host UI layer, and to push view
//! geometry back into it. Android is served through JNI; desktop and CI
//! builds get a stub that reports `PlatformUnavailable`, plus a scripted host
//! that replays recorded layout traces.

pub mod scripted;
pub mod signal;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

pub use scripted::{HostTrace, RecordingSink, ScriptedHost};
pub use signal::{dispatch_layout_signal, set_layout_callback};
pub use traits::*;

/// Retrieves the host display implementation for the target operating system.
///
/// RETURNS: A boxed trait object (`dyn HostDisplay`) that abstracts away the
/// underlying window manager.
pub fn host_display() -> Box<dyn traits::HostDisplay> {
    #[cfg(target_os = "android")]
    {
        // Android: Uses `jni-rs` to query WindowManager and the root view.
        Box::new(android::AndroidHost::new())
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: No window manager to ask.
        Box::new(stub::StubHost)
    }
}
