// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the host UI layer.
//
// The keyboard engine never talks to window managers directly. Everything it
// needs from the host (device identity, display sizes, the visible window
// frame, layout-change notifications) and everything it pushes back (view
// geometry) goes through these traits.

use imeframe_core::error::Result;
use imeframe_core::types::{
    DeviceMetadata, DisplayProbe, LayoutUpdate, Rect, ScreenMetrics, Size,
};

/// Unified host surface the engine attaches to.
pub trait HostDisplay: DeviceInfo + WindowGeometry + LayoutObserver + ImeControl {
    /// Human-readable platform name (e.g. "Android 14").
    fn platform_name(&self) -> &str;
}

/// Device identity and raw display capabilities.
pub trait DeviceInfo {
    /// Brand string set by the ROM.
    fn vendor(&self) -> Result<String>;

    fn model(&self) -> Result<String>;

    /// Platform API level (SDK_INT on Android).
    fn os_api_level(&self) -> Result<u32>;

    /// Physical display size including system decorations.
    fn screen_real_size(&self) -> Result<Size>;

    /// Display size available to the application right now.
    fn screen_current_size(&self) -> Result<Size>;

    fn has_permanent_menu_key(&self) -> Result<bool>;

    fn has_hardware_back_key(&self) -> Result<bool>;

    /// Rounded-corner inset in pixels, if the vendor publishes one.
    fn rounded_corner_inset(&self) -> Result<Option<i32>> {
        Ok(None)
    }

    /// Static identity, read once per session.
    fn device_metadata(&self) -> Result<DeviceMetadata> {
        Ok(DeviceMetadata {
            vendor: self.vendor()?,
            model: self.model()?,
            os_api_level: self.os_api_level()?,
            rounded_corner_inset: self.rounded_corner_inset()?,
        })
    }

    /// Snapshot used by navigation-bar classification.
    fn display_probe(&self) -> Result<DisplayProbe> {
        Ok(DisplayProbe {
            real_size: self.screen_real_size()?,
            current_size: self.screen_current_size()?,
            has_permanent_menu_key: self.has_permanent_menu_key()?,
            has_hardware_back_key: self.has_hardware_back_key()?,
        })
    }
}

/// Window geometry as the host currently reports it.
pub trait WindowGeometry {
    /// Visible display frame of the root view. A zero rectangle means the
    /// window has not been laid out yet.
    fn visible_display_frame(&self) -> Result<Rect>;

    fn screen_metrics(&self) -> Result<ScreenMetrics>;

    /// Height of the host root view the cover view lives in.
    fn root_height(&self) -> Result<i32>;
}

/// Subscription to "something about layout changed" notifications.
///
/// The host calls back into the session's `on_layout_signal` on its UI thread
/// while registered.
pub trait LayoutObserver {
    fn register_layout_listener(&mut self) -> Result<()>;

    fn unregister_layout_listener(&mut self) -> Result<()>;
}

/// Direct control over the input method.
pub trait ImeControl {
    /// Focus the input view and ask for the soft keyboard.
    fn show_keyboard(&self) -> Result<()>;

    /// Clear focus and hide the soft keyboard.
    fn hide_keyboard(&self) -> Result<()>;

    /// Whether the input method is currently bound to a focused view.
    fn is_keyboard_active(&self) -> Result<bool>;
}

/// Receiver of geometry pushes.
///
/// Implementations must tolerate being handed a value that a later push
/// supersedes before it lands.
pub trait LayoutSink {
    fn push(&self, update: &LayoutUpdate) -> Result<()>;
}

impl<T: LayoutSink + ?Sized> LayoutSink for Box<T> {
    fn push(&self, update: &LayoutUpdate) -> Result<()> {
        (**self).push(update)
    }
}

impl<T: LayoutSink + ?Sized> LayoutSink for std::sync::Arc<T> {
    fn push(&self, update: &LayoutUpdate) -> Result<()> {
        (**self).push(update)
    }
}
