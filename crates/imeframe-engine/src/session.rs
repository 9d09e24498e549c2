// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keyboard session: one per attached host root view.
//
// Owns the whole pipeline for a window. The host calls `on_layout_signal`
// from its layout callback; the session samples the visible area, runs the
// state machine, fans transitions out to listeners, and pushes the resulting
// cover/content geometry to the layout sink. Everything runs synchronously on
// the caller's thread.

use std::cell::RefCell;
use std::rc::Rc;

use imeframe_bridge::signal::set_layout_callback;
use imeframe_bridge::traits::{HostDisplay, LayoutSink};
use imeframe_core::config::EngineConfig;
use imeframe_core::error::{ImeframeError, Result};
use imeframe_core::types::{
    DeviceMetadata, KeyboardTransition, KeyboardVisibility, ScreenMetrics, SessionId, ViewId,
    VisibleArea,
};
use tracing::{debug, info, warn};

use crate::geometry::{GeometryReconciler, GeometryUpdate};
use crate::listeners::{ListenerId, ListenerRegistry, OnKeyboardChangeListener};
use crate::profile::DeviceProfile;
use crate::sampler::{LayoutSampler, SampleOutcome};
use crate::state_machine::{KeyboardStateMachine, Step};

pub struct KeyboardSession {
    id: SessionId,
    host: Box<dyn HostDisplay>,
    sink: Box<dyn LayoutSink>,
    config: EngineConfig,
    sampler: LayoutSampler,
    machine: KeyboardStateMachine,
    listeners: ListenerRegistry,
    reconciler: GeometryReconciler,
    attached: bool,
    cover_view: Option<ViewId>,
    content_view: Option<ViewId>,
}

impl KeyboardSession {
    /// Read the device once and build the pipeline. Fails only if the host
    /// cannot report screen metrics.
    pub fn new(
        host: Box<dyn HostDisplay>,
        sink: Box<dyn LayoutSink>,
        config: EngineConfig,
    ) -> Result<Self> {
        let id = SessionId::new();
        let metrics = host.screen_metrics()?;

        let metadata = host.device_metadata().unwrap_or_else(|e| {
            warn!(session = %id, error = %e, "device metadata unavailable, using normal profile");
            DeviceMetadata::default()
        });
        let profile = DeviceProfile::select(&metadata, &config, &metrics);

        let root_height = host.root_height().unwrap_or(metrics.height_px);
        let reconciler = GeometryReconciler::new(metrics.width_px, metrics.height_px, root_height)
            .with_position_tracking(config.push_positions);
        info!(
            session = %id,
            platform = host.platform_name(),
            profile = profile.name(),
            width = metrics.width_px,
            height = metrics.height_px,
            "keyboard session created"
        );

        Ok(Self {
            id,
            host,
            sink,
            listeners: ListenerRegistry::new(config.fan_out),
            config,
            sampler: LayoutSampler::new(),
            machine: KeyboardStateMachine::new(metrics, profile, metadata.os_api_level),
            reconciler,
            attached: false,
            cover_view: None,
            content_view: None,
        })
    }

    /// Start listening for layout changes and process the current layout.
    ///
    /// Views may have been rebuilt while detached, so the last known geometry
    /// is pushed again even when the layout itself has not moved.
    pub fn attach(&mut self) -> Result<Option<KeyboardTransition>> {
        if self.attached {
            return Err(ImeframeError::AlreadyRegistered);
        }
        self.host.register_layout_listener()?;
        self.attached = true;
        self.refresh_root_height();
        self.reconciler.invalidate();
        info!(session = %self.id, "keyboard session attached");

        let signal = self.on_layout_signal();
        let update = self.reconciler.refresh();
        self.push_geometry(update);
        signal
    }

    /// Stop listening. Later signals are ignored until the next `attach`.
    pub fn detach(&mut self) -> Result<()> {
        if !self.attached {
            return Ok(());
        }
        self.attached = false;
        self.sampler.reset();
        self.reconciler.invalidate();
        info!(session = %self.id, "keyboard session detached");
        self.host.unregister_layout_listener()
    }

    /// Host layout callback.
    pub fn on_layout_signal(&mut self) -> Result<Option<KeyboardTransition>> {
        if !self.attached {
            debug!(session = %self.id, "layout signal while detached, ignoring");
            return Ok(None);
        }

        let area = VisibleArea(self.host.visible_display_frame()?);
        let area = match self.sampler.sample(area) {
            SampleOutcome::Changed(area) => area,
            SampleOutcome::Degenerate | SampleOutcome::Unchanged => return Ok(None),
        };

        let host = &self.host;
        let step = self.machine.step(area, || host.display_probe());
        match step {
            Step::Emitted(transition) => {
                self.reconciler.set_extra_height(self.machine.extra_height());
                let fan_out = self.listeners.notify(&transition);
                let update = self.reconciler.on_transition(&transition);
                self.push_geometry(update);
                let report = fan_out?;
                debug!(
                    session = %self.id,
                    notified = report.notified,
                    failed = report.failed.len(),
                    "transition delivered"
                );
                Ok(Some(transition))
            }
            Step::DegenerateFrame | Step::AwaitingClassification => {
                self.sampler.reset();
                Ok(None)
            }
            Step::Duplicate | Step::HiddenFrameMoved => Ok(None),
        }
    }

    /// Configuration change. The next signal is re-derived from scratch.
    pub fn on_orientation_changed(&mut self, metrics: ScreenMetrics) {
        info!(
            session = %self.id,
            orientation = ?metrics.orientation(),
            reclassify = self.config.reclassify_on_orientation_change,
            "screen metrics changed"
        );
        self.machine
            .set_metrics(metrics, self.config.reclassify_on_orientation_change);
        self.sampler.reset();
        self.reconciler
            .set_screen_size(metrics.width_px, metrics.height_px);
        self.refresh_root_height();
        self.reconciler.invalidate();
        let update = self.reconciler.refresh();
        self.push_geometry(update);
    }

    pub fn set_cover_view(&mut self, view: Option<ViewId>) {
        self.cover_view = view;
        self.reconciler.invalidate();
        let update = self.reconciler.refresh();
        self.push_geometry(update);
    }

    pub fn set_content_view(&mut self, view: Option<ViewId>) {
        self.content_view = view;
        self.reconciler.invalidate();
        let update = self.reconciler.refresh();
        self.push_geometry(update);
    }

    /// Reserve space for a keyboard that is not up yet (e.g. an emoji panel
    /// shown in its place). `None` or a non-positive height clears it.
    pub fn set_placeholder_height(&mut self, height: Option<i32>) {
        self.reconciler.set_placeholder_height(height);
        let update = self.reconciler.refresh();
        self.push_geometry(update);
    }

    pub fn set_root_height(&mut self, height: i32) {
        self.reconciler.set_root_height(height);
        let update = self.reconciler.refresh();
        self.push_geometry(update);
    }

    pub fn register_listener(&mut self, listener: Box<dyn OnKeyboardChangeListener>) -> ListenerId {
        self.listeners.register(listener)
    }

    pub fn unregister_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.unregister(id)
    }

    /// Height of the keyboard as last emitted, 0 while hidden.
    pub fn keyboard_height(&self) -> i32 {
        match self.machine.last_transition() {
            Some(t) if t.visibility.is_shown() => t.frame.height(),
            _ => 0,
        }
    }

    /// Pixels between `y` and the bottom of the visible area.
    pub fn remaining_height(&self, y: i32) -> Result<i32> {
        Ok(self.host.visible_display_frame()?.bottom - y)
    }

    /// Cheap check that does not go through the state machine: the input
    /// method is active and covers at least the configured minimum height.
    pub fn is_keyboard_likely_open(&self) -> Result<bool> {
        let metrics = self.machine.metrics();
        let min_height = metrics.dp_to_px(self.config.min_keyboard_height_dp);
        let covered = metrics.height_px - self.host.visible_display_frame()?.bottom;
        Ok(covered >= min_height && self.host.is_keyboard_active()?)
    }

    /// Focus the host's input view and request the soft keyboard.
    pub fn show_keyboard(&self) -> Result<()> {
        debug!(session = %self.id, "requesting keyboard");
        self.host.show_keyboard()
    }

    pub fn dismiss_keyboard(&self) -> Result<()> {
        debug!(session = %self.id, "dismissing keyboard");
        self.host.hide_keyboard()
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn profile(&self) -> DeviceProfile {
        self.machine.profile()
    }

    pub fn visibility(&self) -> KeyboardVisibility {
        self.machine.visibility()
    }

    pub fn last_transition(&self) -> Option<KeyboardTransition> {
        self.machine.last_transition()
    }

    pub fn state_machine(&self) -> &KeyboardStateMachine {
        &self.machine
    }

    /// Full cover/content targets for the current state.
    pub fn current_geometry(&self) -> GeometryUpdate {
        self.reconciler.current()
    }

    fn refresh_root_height(&mut self) {
        match self.host.root_height() {
            Ok(height) => self.reconciler.set_root_height(height),
            Err(e) => warn!(session = %self.id, error = %e, "root height unavailable"),
        }
    }

    fn push_geometry(&self, update: GeometryUpdate) {
        if update.is_empty() {
            return;
        }
        let calls =
            update.to_layout_updates(self.cover_view, self.content_view, self.config.push_positions);
        for call in &calls {
            if let Err(e) = self.sink.push(call) {
                warn!(session = %self.id, view = %call.view(), error = %e, "geometry push failed");
            }
        }
    }
}

/// Route host layout callbacks on this thread to `session`.
///
/// Only a weak handle is kept; once the session is dropped the callback does
/// nothing. A signal that arrives while the session is already borrowed is
/// skipped, the next layout pass carries the same information.
pub fn install_layout_callback(session: &Rc<RefCell<KeyboardSession>>) {
    let weak = Rc::downgrade(session);
    set_layout_callback(Some(Box::new(move || {
        let Some(session) = weak.upgrade() else {
            return;
        };
        let Ok(mut session) = session.try_borrow_mut() else {
            warn!("keyboard session busy, layout signal skipped");
            return;
        };
        if let Err(e) = session.on_layout_signal() {
            warn!(session = %session.id(), error = %e, "layout signal failed");
        }
    })));
}

impl std::fmt::Debug for KeyboardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardSession")
            .field("id", &self.id)
            .field("attached", &self.attached)
            .field("machine", &self.machine)
            .field("listeners", &self.listeners)
            .field("cover_view", &self.cover_view)
            .field("content_view", &self.content_view)
            .finish()
    }
}
