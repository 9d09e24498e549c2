// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// imeframe engine — soft keyboard visibility tracking. Samples the host's
// visible display frame, classifies the device's navigation bar behavior,
// emits shown/resized/closed transitions, and reconciles cover/content view
// geometry against the keyboard.

pub mod geometry;
pub mod listeners;
pub mod profile;
pub mod queue;
pub mod sampler;
pub mod session;
pub mod state_machine;

pub use geometry::{GeometryReconciler, GeometryUpdate};
pub use listeners::{ListenerId, ListenerRegistry, OnKeyboardChangeListener};
pub use profile::DeviceProfile;
pub use queue::{LayoutWorker, TokioLayoutQueue, layout_queue};
pub use sampler::{LayoutSampler, SampleOutcome};
pub use session::{KeyboardSession, install_layout_callback};
pub use state_machine::{KeyboardStateMachine, Step};
