// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted host driven by a recorded layout trace.
//
// Used by the replay tool and by engine tests. The host is single-threaded
// like the real UI thread: handles share state through `Rc<RefCell<_>>`, so a
// test can keep a clone and move the visible frame while the session owns the
// boxed host.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use imeframe_core::error::{ImeframeError, Result};
use imeframe_core::types::{
    DeviceMetadata, DisplayProbe, LayoutUpdate, Rect, ScreenMetrics, Size, ViewId,
};

use crate::traits::*;

/// A recorded session: everything the host reported, plus the sequence of
/// visible display frames observed on each layout callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostTrace {
    pub metrics: ScreenMetrics,
    pub device: DeviceMetadata,
    pub probe: DisplayProbe,
    pub root_height: i32,
    #[serde(default)]
    pub cover_view: Option<ViewId>,
    #[serde(default)]
    pub content_view: Option<ViewId>,
    #[serde(default)]
    pub placeholder_height: Option<i32>,
    pub samples: Vec<Rect>,
}

impl HostTrace {
    pub fn from_json(json: &str) -> Result<Self> {
        let trace: Self = serde_json::from_str(json)?;
        if trace.metrics.width_px <= 0 || trace.metrics.height_px <= 0 {
            return Err(ImeframeError::Trace(format!(
                "screen must have a positive size, got {}x{}",
                trace.metrics.width_px, trace.metrics.height_px
            )));
        }
        Ok(trace)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[derive(Debug)]
struct HostState {
    metrics: ScreenMetrics,
    device: DeviceMetadata,
    probe: DisplayProbe,
    root_height: i32,
    visible: Rect,
    registered: bool,
    keyboard_active: bool,
    hide_requests: u32,
    show_requests: u32,
    probe_reads: u32,
    fail_probe: bool,
}

/// In-memory host. Cloning yields another handle to the same state.
#[derive(Debug, Clone)]
pub struct ScriptedHost {
    state: Rc<RefCell<HostState>>,
}

impl ScriptedHost {
    pub fn new(metrics: ScreenMetrics, device: DeviceMetadata, probe: DisplayProbe) -> Self {
        let root_height = metrics.height_px;
        Self {
            state: Rc::new(RefCell::new(HostState {
                metrics,
                device,
                probe,
                root_height,
                visible: Rect::ZERO,
                registered: false,
                keyboard_active: false,
                hide_requests: 0,
                show_requests: 0,
                probe_reads: 0,
                fail_probe: false,
            })),
        }
    }

    /// Host primed with a trace's static data; samples are fed by the caller.
    pub fn from_trace(trace: &HostTrace) -> Self {
        let host = Self::new(trace.metrics, trace.device.clone(), trace.probe);
        host.set_root_height(trace.root_height);
        host
    }

    pub fn set_visible_frame(&self, rect: Rect) {
        let mut state = self.state.borrow_mut();
        // An open keyboard shrinks the visible area from below.
        state.keyboard_active = rect.bottom != 0 && rect.bottom < state.metrics.height_px;
        state.visible = rect;
    }

    pub fn set_root_height(&self, height: i32) {
        self.state.borrow_mut().root_height = height;
    }

    pub fn set_metrics(&self, metrics: ScreenMetrics) {
        self.state.borrow_mut().metrics = metrics;
    }

    /// Make display probes fail until cleared.
    pub fn set_probe_failure(&self, fail: bool) {
        self.state.borrow_mut().fail_probe = fail;
    }

    pub fn is_registered(&self) -> bool {
        self.state.borrow().registered
    }

    pub fn hide_requests(&self) -> u32 {
        self.state.borrow().hide_requests
    }

    pub fn show_requests(&self) -> u32 {
        self.state.borrow().show_requests
    }

    /// Number of successful display probes served.
    pub fn probe_reads(&self) -> u32 {
        self.state.borrow().probe_reads
    }
}

impl HostDisplay for ScriptedHost {
    fn platform_name(&self) -> &str {
        "Scripted"
    }
}

impl DeviceInfo for ScriptedHost {
    fn vendor(&self) -> Result<String> {
        Ok(self.state.borrow().device.vendor.clone())
    }

    fn model(&self) -> Result<String> {
        Ok(self.state.borrow().device.model.clone())
    }

    fn os_api_level(&self) -> Result<u32> {
        Ok(self.state.borrow().device.os_api_level)
    }

    fn screen_real_size(&self) -> Result<Size> {
        Ok(self.state.borrow().probe.real_size)
    }

    fn screen_current_size(&self) -> Result<Size> {
        Ok(self.state.borrow().probe.current_size)
    }

    fn has_permanent_menu_key(&self) -> Result<bool> {
        Ok(self.state.borrow().probe.has_permanent_menu_key)
    }

    fn has_hardware_back_key(&self) -> Result<bool> {
        Ok(self.state.borrow().probe.has_hardware_back_key)
    }

    fn rounded_corner_inset(&self) -> Result<Option<i32>> {
        Ok(self.state.borrow().device.rounded_corner_inset)
    }

    fn display_probe(&self) -> Result<DisplayProbe> {
        let mut state = self.state.borrow_mut();
        if state.fail_probe {
            return Err(ImeframeError::Bridge("display not ready".into()));
        }
        state.probe_reads += 1;
        Ok(state.probe)
    }
}

impl WindowGeometry for ScriptedHost {
    fn visible_display_frame(&self) -> Result<Rect> {
        Ok(self.state.borrow().visible)
    }

    fn screen_metrics(&self) -> Result<ScreenMetrics> {
        Ok(self.state.borrow().metrics)
    }

    fn root_height(&self) -> Result<i32> {
        Ok(self.state.borrow().root_height)
    }
}

impl LayoutObserver for ScriptedHost {
    fn register_layout_listener(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.registered {
            return Err(ImeframeError::AlreadyRegistered);
        }
        state.registered = true;
        Ok(())
    }

    fn unregister_layout_listener(&mut self) -> Result<()> {
        self.state.borrow_mut().registered = false;
        Ok(())
    }
}

impl ImeControl for ScriptedHost {
    fn show_keyboard(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.show_requests += 1;
        state.keyboard_active = true;
        Ok(())
    }

    fn hide_keyboard(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.hide_requests += 1;
        state.keyboard_active = false;
        Ok(())
    }

    fn is_keyboard_active(&self) -> Result<bool> {
        Ok(self.state.borrow().keyboard_active)
    }
}

/// Layout sink that records every push. Views listed with `fail_view` reject
/// their pushes so failure isolation can be exercised.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pushed: Rc<RefCell<Vec<LayoutUpdate>>>,
    failing: Rc<RefCell<HashSet<ViewId>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_view(&self, view: ViewId) {
        self.failing.borrow_mut().insert(view);
    }

    pub fn updates(&self) -> Vec<LayoutUpdate> {
        self.pushed.borrow().clone()
    }

    pub fn take(&self) -> Vec<LayoutUpdate> {
        std::mem::take(&mut *self.pushed.borrow_mut())
    }
}

impl LayoutSink for RecordingSink {
    fn push(&self, update: &LayoutUpdate) -> Result<()> {
        let view = update.view();
        if self.failing.borrow().contains(&view) {
            return Err(ImeframeError::LayoutPush {
                view: view.0,
                reason: "view is no longer mounted".into(),
            });
        }
        self.pushed.borrow_mut().push(*update);
        Ok(())
    }
}
