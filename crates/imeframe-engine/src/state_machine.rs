// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keyboard visibility state machine.
//
// Consumes visible areas that already passed the sampler's height filter and
// turns them into shown/resized/closed transitions. Visibility is always
// decided on the raw frame; the device correction is applied afterwards and
// never feeds back into the threshold check.

use imeframe_core::error::Result;
use imeframe_core::types::{
    DisplayProbe, KeyboardFrame, KeyboardTransition, KeyboardVisibility, NavigationBarState,
    ScreenMetrics, TransitionKind, VisibleArea,
};
use tracing::{debug, info, warn};

use crate::profile::DeviceProfile;

/// Result of feeding one visible area to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A real change; fan it out.
    Emitted(KeyboardTransition),
    /// Same frame as last time.
    Duplicate,
    /// Keyboard still hidden; the frame was recorded without notifying anyone.
    HiddenFrameMoved,
    /// Correction collapsed a shown frame to nothing. Geometry is probably
    /// still settling; the caller should re-derive on the next signal.
    DegenerateFrame,
    /// The display could not be probed for classification yet.
    AwaitingClassification,
}

impl Step {
    pub fn transition(&self) -> Option<KeyboardTransition> {
        match self {
            Self::Emitted(t) => Some(*t),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct KeyboardStateMachine {
    metrics: ScreenMetrics,
    profile: DeviceProfile,
    os_api_level: u32,
    /// `None` until the first laid-out sample has been classified.
    navigation: Option<NavigationBarState>,
    /// Last recorded (corrected) frame, emitted or not.
    keyboard_frame: Option<KeyboardFrame>,
    visibility: KeyboardVisibility,
    last_emitted: Option<KeyboardTransition>,
}

impl KeyboardStateMachine {
    pub fn new(metrics: ScreenMetrics, profile: DeviceProfile, os_api_level: u32) -> Self {
        Self {
            metrics,
            profile,
            os_api_level,
            navigation: None,
            keyboard_frame: None,
            visibility: KeyboardVisibility::Hidden,
            last_emitted: None,
        }
    }

    /// Skip classification and use a known navigation-bar state.
    pub fn with_navigation_state(mut self, state: NavigationBarState) -> Self {
        self.navigation = Some(state);
        self
    }

    /// Contract form of [`step`](Self::step): the transition to emit, if any.
    pub fn on_new_visible_area<F>(&mut self, area: VisibleArea, probe: F) -> Option<KeyboardTransition>
    where
        F: FnOnce() -> Result<DisplayProbe>,
    {
        self.step(area, probe).transition()
    }

    /// Process one changed visible area. `probe` is only called for the
    /// first sample of a session.
    pub fn step<F>(&mut self, area: VisibleArea, probe: F) -> Step
    where
        F: FnOnce() -> Result<DisplayProbe>,
    {
        let nav = match self.navigation {
            Some(nav) => nav,
            None => match probe() {
                Ok(display) => {
                    let nav = self.profile.classify(
                        self.os_api_level,
                        &display,
                        area.bottom(),
                        area.right(),
                    );
                    self.navigation = Some(nav);
                    nav
                }
                Err(e) => {
                    warn!(error = %e, "display probe failed, deferring classification");
                    return Step::AwaitingClassification;
                }
            },
        };

        let raw = KeyboardFrame::below(&area, &self.metrics);
        if self.keyboard_frame == Some(raw) {
            debug!(frame = %raw, "raw frame matches recorded frame");
            return Step::Duplicate;
        }

        // Order matters: threshold on the raw frame, correct afterwards.
        let visibility = if raw.height() > self.threshold(&nav) {
            KeyboardVisibility::Shown
        } else {
            KeyboardVisibility::Hidden
        };
        let mut frame = self.profile.correct(raw, visibility, &nav, &self.metrics);

        if frame.height() <= 0 {
            if visibility.is_shown() {
                debug!(raw = %raw, corrected = %frame, "corrected frame is empty, not emitting");
                return Step::DegenerateFrame;
            }
            frame.0.top = frame.0.bottom;
        }

        if let Some(last) = self.last_emitted {
            if last.visibility == visibility && last.frame == frame {
                self.keyboard_frame = Some(frame);
                return Step::Duplicate;
            }
        }

        let previous = self.visibility;
        self.keyboard_frame = Some(frame);
        self.visibility = visibility;

        let kind = match (previous, visibility) {
            (KeyboardVisibility::Shown, KeyboardVisibility::Shown) => TransitionKind::Resized,
            (_, KeyboardVisibility::Shown) => TransitionKind::Shown,
            (KeyboardVisibility::Hidden, KeyboardVisibility::Hidden)
                if self.last_emitted.is_some() =>
            {
                debug!(frame = %frame, "hidden frame moved");
                return Step::HiddenFrameMoved;
            }
            (_, KeyboardVisibility::Hidden) => TransitionKind::Closed,
        };

        let transition = KeyboardTransition {
            kind,
            visibility,
            frame,
        };
        self.last_emitted = Some(transition);
        info!(?kind, frame = %frame, raw_height = raw.height(), "keyboard transition");
        Step::Emitted(transition)
    }

    /// Visibility threshold: the navigation bar if the ROM keeps it out of the
    /// visible area, otherwise the status bar.
    fn threshold(&self, nav: &NavigationBarState) -> i32 {
        if nav.vendor_hides_navigation_bar {
            self.metrics.navigation_bar_height
        } else {
            self.metrics.status_bar_height
        }
    }

    /// Replace the screen metrics after a configuration change. The recorded
    /// frame is dropped so the next sample is derived afresh.
    pub fn set_metrics(&mut self, metrics: ScreenMetrics, reclassify: bool) {
        self.metrics = metrics;
        self.keyboard_frame = None;
        if reclassify {
            info!("navigation bar classification reset");
            self.navigation = None;
        }
    }

    pub fn metrics(&self) -> &ScreenMetrics {
        &self.metrics
    }

    pub fn profile(&self) -> DeviceProfile {
        self.profile
    }

    pub fn keyboard_frame(&self) -> Option<KeyboardFrame> {
        self.keyboard_frame
    }

    pub fn visibility(&self) -> KeyboardVisibility {
        self.visibility
    }

    pub fn last_transition(&self) -> Option<KeyboardTransition> {
        self.last_emitted
    }

    pub fn navigation_bar_state(&self) -> Option<NavigationBarState> {
        self.navigation
    }

    /// False while the first sample is still pending classification.
    pub fn is_initialized(&self) -> bool {
        self.navigation.is_some()
    }

    /// Profile-specific height reserved above a placeholder.
    pub fn extra_height(&self) -> i32 {
        self.navigation
            .map(|nav| self.profile.extra_height(&nav, &self.metrics))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imeframe_core::error::ImeframeError;
    use imeframe_core::types::{Rect, Size};

    fn metrics() -> ScreenMetrics {
        ScreenMetrics {
            width_px: 1080,
            height_px: 1920,
            density: 3.0,
            status_bar_height: 60,
            navigation_bar_height: 120,
        }
    }

    fn probe() -> Result<DisplayProbe> {
        // Real 2040 tall, app sees 1920: a bar is drawn below the layout.
        Ok(DisplayProbe {
            real_size: Size::new(1080, 2040),
            current_size: Size::new(1080, 1920),
            has_permanent_menu_key: false,
            has_hardware_back_key: false,
        })
    }

    fn no_probe() -> Result<DisplayProbe> {
        panic!("classification must not run twice")
    }

    fn machine(nav: NavigationBarState) -> KeyboardStateMachine {
        KeyboardStateMachine::new(metrics(), DeviceProfile::Normal, 29).with_navigation_state(nav)
    }

    fn stock_nav() -> NavigationBarState {
        NavigationBarState {
            vendor_hides_navigation_bar: false,
            system_navigation_bar_present: true,
            navigation_bar_occupies_layout: false,
        }
    }

    #[test]
    fn first_sample_classifies_once() {
        let mut m = KeyboardStateMachine::new(metrics(), DeviceProfile::Normal, 29);
        assert!(!m.is_initialized());
        m.step(VisibleArea::new(0, 60, 1080, 1920), probe);
        assert!(m.is_initialized());
        let nav = m.navigation_bar_state().unwrap();
        assert!(nav.vendor_hides_navigation_bar);
        assert!(nav.system_navigation_bar_present);

        m.step(VisibleArea::new(0, 60, 1080, 1100), no_probe);
        assert_eq!(m.navigation_bar_state(), Some(nav));
    }

    #[test]
    fn probe_failure_defers_classification() {
        let mut m = KeyboardStateMachine::new(metrics(), DeviceProfile::Normal, 29);
        let step = m.step(VisibleArea::new(0, 60, 1080, 1920), || {
            Err(ImeframeError::Bridge("not ready".into()))
        });
        assert_eq!(step, Step::AwaitingClassification);
        assert!(!m.is_initialized());
        assert!(m.step(VisibleArea::new(0, 60, 1080, 1920), probe).transition().is_some());
    }

    #[test]
    fn initial_hidden_sample_emits_closed() {
        let mut m = machine(stock_nav());
        let t = m
            .on_new_visible_area(VisibleArea::new(0, 60, 1080, 1920), no_probe)
            .unwrap();
        assert_eq!(t.kind, TransitionKind::Closed);
        assert_eq!(t.frame.height(), 0);
    }

    #[test]
    fn keyboard_open_is_corrected_for_drawn_bar() {
        let mut m = machine(stock_nav());
        m.step(VisibleArea::new(0, 60, 1080, 1920), no_probe);
        let t = m
            .on_new_visible_area(VisibleArea::new(0, 60, 1080, 1100), no_probe)
            .unwrap();
        assert_eq!(t.kind, TransitionKind::Shown);
        assert_eq!(t.frame.rect(), Rect::new(0, 1220, 1080, 1920));
        assert_eq!(m.visibility(), KeyboardVisibility::Shown);
    }

    #[test]
    fn resize_then_close() {
        let mut m = machine(stock_nav());
        m.step(VisibleArea::new(0, 60, 1080, 1100), no_probe);
        let resized = m.step(VisibleArea::new(0, 60, 1080, 1000), no_probe);
        assert_eq!(resized.transition().unwrap().kind, TransitionKind::Resized);
        let closed = m.step(VisibleArea::new(0, 60, 1080, 1920), no_probe);
        assert_eq!(closed.transition().unwrap().kind, TransitionKind::Closed);
        assert_eq!(m.visibility(), KeyboardVisibility::Hidden);
    }

    #[test]
    fn shown_frame_collapsing_to_nothing_is_not_emitted() {
        // 1920 screen, bottom 1800: raw height 120 > status bar 60, so shown,
        // but pushing the top down by the 120px bar leaves nothing.
        let mut m = machine(stock_nav());
        let step = m.step(VisibleArea::new(0, 0, 1080, 1800), no_probe);
        assert_eq!(step, Step::DegenerateFrame);
        assert_eq!(m.keyboard_frame(), None);
        assert!(m.last_transition().is_none());
    }

    #[test]
    fn raw_frame_equal_to_recorded_frame_is_skipped() {
        let mut m = machine(NavigationBarState::default());
        m.step(VisibleArea::new(0, 60, 1080, 1100), no_probe);
        // Same bottom edge reached through a different top.
        assert_eq!(m.step(VisibleArea::new(0, 0, 1080, 1100), no_probe), Step::Duplicate);
    }

    #[test]
    fn hidden_frame_changes_are_absorbed() {
        let nav = NavigationBarState {
            vendor_hides_navigation_bar: true,
            ..Default::default()
        };
        let mut m = machine(nav);
        // 50px below the layout: under the 120px bar threshold.
        let first = m.step(VisibleArea::new(0, 60, 1080, 1870), no_probe);
        assert_eq!(first.transition().unwrap().visibility, KeyboardVisibility::Hidden);
        let second = m.step(VisibleArea::new(0, 60, 1080, 1820), no_probe);
        assert_eq!(second, Step::HiddenFrameMoved);
        assert_eq!(m.keyboard_frame().unwrap().top(), 1820);
    }

    #[test]
    fn threshold_uses_raw_frame() {
        // Raw height 100 beats the 60px status bar. The corrected frame
        // (top pushed 120px down) would not, and must not turn this into a
        // close.
        let mut m = machine(stock_nav());
        assert_eq!(
            m.step(VisibleArea::new(0, 60, 1080, 1820), no_probe),
            Step::DegenerateFrame
        );

        let mut m = machine(NavigationBarState::default());
        let t = m.step(VisibleArea::new(0, 60, 1080, 1820), no_probe).transition().unwrap();
        assert_eq!(t.visibility, KeyboardVisibility::Shown);
        assert_eq!(t.frame.height(), 100);
    }

    #[test]
    fn rounded_corner_hidden_frame_is_clamped() {
        let mut m = KeyboardStateMachine::new(metrics(), DeviceProfile::RoundedCorner { inset: 72 }, 27)
            .with_navigation_state(NavigationBarState::default());
        let t = m.step(VisibleArea::new(0, 60, 1080, 1900), no_probe).transition().unwrap();
        assert_eq!(t.visibility, KeyboardVisibility::Hidden);
        assert_eq!(t.frame.height(), 0);
        assert_eq!(t.frame.top(), 1920);
    }

    #[test]
    fn metrics_change_reclassifies_only_when_asked() {
        let mut m = KeyboardStateMachine::new(metrics(), DeviceProfile::Normal, 29);
        m.step(VisibleArea::new(0, 60, 1080, 1920), probe);
        m.set_metrics(metrics(), false);
        assert!(m.is_initialized());
        m.set_metrics(metrics(), true);
        assert!(!m.is_initialized());
    }

    #[test]
    fn extra_height_zero_before_classification() {
        let m = KeyboardStateMachine::new(metrics(), DeviceProfile::Normal, 29);
        assert_eq!(m.extra_height(), 0);
        assert_eq!(machine(stock_nav()).extra_height(), 120);
    }
}
