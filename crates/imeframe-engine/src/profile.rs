// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Device profiles and navigation-bar classification.
//
// ROMs disagree about whether the navigation bar is part of the visible
// display frame, whether it is really drawn, and whether rounded screen
// corners eat into the layout. A profile is picked once per session from the
// device identity and decides how the raw keyboard frame is corrected.

use imeframe_core::config::EngineConfig;
use imeframe_core::types::{
    DeviceMetadata, DisplayProbe, KeyboardFrame, KeyboardVisibility, NavigationBarState,
    ScreenMetrics,
};
use tracing::debug;

/// First API level with `Display.getRealSize`.
pub const API_REAL_SIZE: u32 = 17;

/// Oreo, from which the MIX 2 ROM stops reintroducing the navigation bar.
const API_OREO: u32 = 26;

const BRAND_SMARTISAN: &str = "SMARTISAN";
const MODEL_MIX_2: &str = "MIX 2";
const MODEL_VIVO_X21A: &str = "vivo X21A";

/// Frame-correction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceProfile {
    /// Stock behavior: the real navigation bar comes back with the keyboard.
    Normal,
    /// Rounded screen corners shrink the layout by `inset` pixels.
    RoundedCorner { inset: i32 },
    /// The ROM never reintroduces the navigation bar during IME transitions.
    NavigationBarExempt,
}

impl DeviceProfile {
    /// Static vendor/model/OS-version lookup. Unknown devices get `Normal`.
    pub fn select(meta: &DeviceMetadata, config: &EngineConfig, metrics: &ScreenMetrics) -> Self {
        let profile = if meta.vendor.to_ascii_uppercase().contains(BRAND_SMARTISAN)
            || (meta.model == MODEL_MIX_2 && meta.os_api_level >= API_OREO)
        {
            Self::NavigationBarExempt
        } else if meta.model == MODEL_VIVO_X21A {
            let inset = meta
                .rounded_corner_inset
                .unwrap_or_else(|| metrics.dp_to_px(config.rounded_corner_inset_dp));
            Self::RoundedCorner { inset }
        } else {
            Self::Normal
        };

        debug!(
            vendor = %meta.vendor,
            model = %meta.model,
            api = meta.os_api_level,
            profile = profile.name(),
            "selected device profile"
        );
        profile
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::RoundedCorner { .. } => "rounded-corner",
            Self::NavigationBarExempt => "navigation-bar-exempt",
        }
    }

    /// Pixels the rounded corners take away from the real screen size.
    pub fn corner_inset(&self) -> i32 {
        match self {
            Self::RoundedCorner { inset } => *inset,
            _ => 0,
        }
    }

    /// Decide how this device reports the navigation bar, from the first
    /// laid-out visible area.
    pub fn classify(
        &self,
        os_api_level: u32,
        probe: &DisplayProbe,
        visible_height: i32,
        visible_width: i32,
    ) -> NavigationBarState {
        let mut state = NavigationBarState::default();

        if os_api_level < API_REAL_SIZE {
            // No real-size query: guess from the hardware keys.
            let present = !(probe.has_permanent_menu_key || probe.has_hardware_back_key);
            state.vendor_hides_navigation_bar = present;
            state.system_navigation_bar_present = present;
            state.navigation_bar_occupies_layout = present;
            return state;
        }

        let inset = self.corner_inset();
        let real_height = probe.real_size.height - inset;
        let real_width = probe.real_size.width - inset;

        if visible_height != 0 {
            if visible_height == real_height {
                // Side navigation bar (landscape, tablets) shows up in the width.
                state.navigation_bar_occupies_layout = visible_width < real_width;
            } else if visible_height < real_height {
                state.vendor_hides_navigation_bar = true;
                state.navigation_bar_occupies_layout = true;
            }
        }

        state.system_navigation_bar_present =
            probe.real_size.height != probe.current_size.height + inset;

        debug!(
            profile = self.name(),
            visible_height,
            visible_width,
            real_height,
            vendor_hides = state.vendor_hides_navigation_bar,
            system_present = state.system_navigation_bar_present,
            occupies = state.navigation_bar_occupies_layout,
            "classified navigation bar"
        );
        state
    }

    /// Adjust a raw frame for space the OS gives back to the navigation bar
    /// while the keyboard is up. `visibility` must come from the raw frame.
    ///
    /// The result may have its top below its bottom; the caller decides
    /// whether that is degenerate or clamps it.
    pub fn correct(
        &self,
        raw: KeyboardFrame,
        visibility: KeyboardVisibility,
        nav: &NavigationBarState,
        metrics: &ScreenMetrics,
    ) -> KeyboardFrame {
        let shown = visibility.is_shown();
        let nav_height = metrics.navigation_bar_height;
        let dy = match self {
            Self::Normal => {
                if shown && nav.system_navigation_bar_present {
                    nav_height
                } else {
                    0
                }
            }
            Self::RoundedCorner { inset } => {
                if !nav.vendor_hides_navigation_bar {
                    *inset
                } else if shown && nav.system_navigation_bar_present {
                    nav_height
                } else {
                    0
                }
            }
            Self::NavigationBarExempt => 0,
        };
        KeyboardFrame(raw.rect().push_top(dy))
    }

    /// Height to reserve on top of a placeholder when the keyboard is not
    /// actually up, because the real keyboard will bring the bar with it.
    pub fn extra_height(&self, nav: &NavigationBarState, metrics: &ScreenMetrics) -> i32 {
        if !nav.system_navigation_bar_present {
            return 0;
        }
        match self {
            Self::Normal => metrics.navigation_bar_height,
            Self::RoundedCorner { inset } => {
                if nav.vendor_hides_navigation_bar {
                    metrics.navigation_bar_height
                } else {
                    *inset
                }
            }
            Self::NavigationBarExempt => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn meta(vendor: &str, model: &str, api: u32) -> DeviceMetadata {
        DeviceMetadata {
            vendor: vendor.into(),
            model: model.into(),
            os_api_level: api,
            rounded_corner_inset: None,
        }
    }

    fn probe(real: Size, current: Size) -> DisplayProbe {
        DisplayProbe {
            real_size: real,
            current_size: current,
            has_permanent_menu_key: false,
            has_hardware_back_key: false,
        }
    }

    fn select(m: &DeviceMetadata) -> DeviceProfile {
        DeviceProfile::select(m, &EngineConfig::default(), &metrics())
    }

    #[test]
    fn unknown_vendor_is_normal() {
        assert_eq!(select(&meta("UNKNOWNCO", "X1", 30)), DeviceProfile::Normal);
    }

    #[test]
    fn smartisan_brand_is_exempt() {
        assert_eq!(
            select(&meta("SMARTISAN", "OD103", 25)),
            DeviceProfile::NavigationBarExempt
        );
    }

    #[test]
    fn mix2_only_exempt_from_oreo() {
        assert_eq!(select(&meta("Xiaomi", "MIX 2", 26)), DeviceProfile::NavigationBarExempt);
        assert_eq!(select(&meta("Xiaomi", "MIX 2", 25)), DeviceProfile::Normal);
    }

    #[test]
    fn vivo_inset_prefers_reported_resource() {
        let mut m = meta("vivo", "vivo X21A", 27);
        assert_eq!(select(&m), DeviceProfile::RoundedCorner { inset: 72 });
        m.rounded_corner_inset = Some(80);
        assert_eq!(select(&m), DeviceProfile::RoundedCorner { inset: 80 });
    }

    #[test]
    fn legacy_api_uses_key_heuristic() {
        let mut p = probe(Size::new(1080, 1920), Size::new(1080, 1920));
        p.has_hardware_back_key = true;
        let state = DeviceProfile::Normal.classify(16, &p, 1920, 1080);
        assert_eq!(state, NavigationBarState::default());

        p.has_hardware_back_key = false;
        let state = DeviceProfile::Normal.classify(16, &p, 1920, 1080);
        assert!(state.vendor_hides_navigation_bar);
        assert!(state.system_navigation_bar_present);
    }

    #[test]
    fn full_height_layout_with_drawn_bar() {
        // Visible area reaches the physical bottom, but the OS still draws a bar.
        let p = probe(Size::new(1080, 2040), Size::new(1080, 1920));
        let state = DeviceProfile::Normal.classify(28, &p, 2040, 1080);
        assert!(!state.vendor_hides_navigation_bar);
        assert!(state.system_navigation_bar_present);
        assert!(!state.navigation_bar_occupies_layout);
    }

    #[test]
    fn side_navigation_bar_detected_from_width() {
        let p = probe(Size::new(2040, 1080), Size::new(1920, 1080));
        let state = DeviceProfile::Normal.classify(28, &p, 1080, 1920);
        assert!(!state.vendor_hides_navigation_bar);
        assert!(state.navigation_bar_occupies_layout);
        assert!(!state.system_navigation_bar_present);
    }

    #[test]
    fn short_layout_means_vendor_reserves_bar() {
        let p = probe(Size::new(1080, 2040), Size::new(1080, 1920));
        let state = DeviceProfile::Normal.classify(28, &p, 1920, 1080);
        assert!(state.vendor_hides_navigation_bar);
        assert!(state.navigation_bar_occupies_layout);
    }

    #[test]
    fn rounded_corner_shrinks_real_size() {
        let profile = DeviceProfile::RoundedCorner { inset: 72 };
        let p = probe(Size::new(1080, 2280), Size::new(1080, 2208));
        let state = profile.classify(27, &p, 2208, 1008);
        assert!(!state.vendor_hides_navigation_bar);
        assert!(!state.system_navigation_bar_present);
    }

    #[test]
    fn correction_adds_bar_only_when_shown() {
        let nav = NavigationBarState {
            system_navigation_bar_present: true,
            ..Default::default()
        };
        let raw = KeyboardFrame(Rect::new(0, 1100, 1080, 1920));
        let shown = DeviceProfile::Normal.correct(raw, KeyboardVisibility::Shown, &nav, &metrics());
        assert_eq!(shown.top(), 1220);
        let hidden =
            DeviceProfile::Normal.correct(raw, KeyboardVisibility::Hidden, &nav, &metrics());
        assert_eq!(hidden, raw);
    }

    #[test]
    fn exempt_profile_never_corrects() {
        let nav = NavigationBarState {
            vendor_hides_navigation_bar: true,
            system_navigation_bar_present: true,
            navigation_bar_occupies_layout: true,
        };
        let raw = KeyboardFrame(Rect::new(0, 1100, 1080, 1920));
        let profile = DeviceProfile::NavigationBarExempt;
        assert_eq!(profile.correct(raw, KeyboardVisibility::Shown, &nav, &metrics()), raw);
        assert_eq!(profile.extra_height(&nav, &metrics()), 0);
    }

    #[test]
    fn rounded_corner_correction_applies_while_hidden() {
        let profile = DeviceProfile::RoundedCorner { inset: 72 };
        let nav = NavigationBarState::default();
        let raw = KeyboardFrame(Rect::new(0, 1800, 1080, 1920));
        let hidden = profile.correct(raw, KeyboardVisibility::Hidden, &nav, &metrics());
        assert_eq!(hidden.top(), 1872);
    }

    #[test]
    fn extra_height_tracks_drawn_bar() {
        let mut nav = NavigationBarState::default();
        assert_eq!(DeviceProfile::Normal.extra_height(&nav, &metrics()), 0);
        nav.system_navigation_bar_present = true;
        assert_eq!(DeviceProfile::Normal.extra_height(&nav, &metrics()), 120);
        let rounded = DeviceProfile::RoundedCorner { inset: 72 };
        assert_eq!(rounded.extra_height(&nav, &metrics()), 72);
        nav.vendor_hides_navigation_bar = true;
        assert_eq!(rounded.extra_height(&nav, &metrics()), 120);
    }
}
