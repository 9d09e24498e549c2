// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub host for desktop/CI builds where no mobile window manager exists.
//
// Every query returns `PlatformUnavailable`; the Android implementation lives
// in the `android` module and recorded traces are served by `ScriptedHost`.

use imeframe_core::error::{ImeframeError, Result};
use imeframe_core::types::{Rect, ScreenMetrics, Size};

use crate::traits::*;

/// No-op host returned on non-mobile platforms.
pub struct StubHost;

impl HostDisplay for StubHost {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl DeviceInfo for StubHost {
    fn vendor(&self) -> Result<String> {
        tracing::warn!("DeviceInfo::vendor called on stub host");
        Err(ImeframeError::PlatformUnavailable)
    }

    fn model(&self) -> Result<String> {
        Err(ImeframeError::PlatformUnavailable)
    }

    fn os_api_level(&self) -> Result<u32> {
        Err(ImeframeError::PlatformUnavailable)
    }

    fn screen_real_size(&self) -> Result<Size> {
        Err(ImeframeError::PlatformUnavailable)
    }

    fn screen_current_size(&self) -> Result<Size> {
        Err(ImeframeError::PlatformUnavailable)
    }

    fn has_permanent_menu_key(&self) -> Result<bool> {
        Err(ImeframeError::PlatformUnavailable)
    }

    fn has_hardware_back_key(&self) -> Result<bool> {
        Err(ImeframeError::PlatformUnavailable)
    }
}

impl WindowGeometry for StubHost {
    fn visible_display_frame(&self) -> Result<Rect> {
        tracing::warn!("WindowGeometry::visible_display_frame called on stub host");
        Err(ImeframeError::PlatformUnavailable)
    }

    fn screen_metrics(&self) -> Result<ScreenMetrics> {
        tracing::warn!("WindowGeometry::screen_metrics called on stub host");
        Err(ImeframeError::PlatformUnavailable)
    }

    fn root_height(&self) -> Result<i32> {
        Err(ImeframeError::PlatformUnavailable)
    }
}

impl LayoutObserver for StubHost {
    fn register_layout_listener(&mut self) -> Result<()> {
        tracing::warn!("LayoutObserver::register_layout_listener called on stub host");
        Err(ImeframeError::PlatformUnavailable)
    }

    fn unregister_layout_listener(&mut self) -> Result<()> {
        Err(ImeframeError::PlatformUnavailable)
    }
}

impl ImeControl for StubHost {
    fn show_keyboard(&self) -> Result<()> {
        tracing::warn!("ImeControl::show_keyboard called on stub host");
        Err(ImeframeError::PlatformUnavailable)
    }

    fn hide_keyboard(&self) -> Result<()> {
        tracing::warn!("ImeControl::hide_keyboard called on stub host");
        Err(ImeframeError::PlatformUnavailable)
    }

    fn is_keyboard_active(&self) -> Result<bool> {
        Err(ImeframeError::PlatformUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_query_is_unavailable() {
        let mut host = StubHost;
        assert!(matches!(host.device_metadata(), Err(ImeframeError::PlatformUnavailable)));
        assert!(matches!(host.visible_display_frame(), Err(ImeframeError::PlatformUnavailable)));
        assert!(matches!(
            host.register_layout_listener(),
            Err(ImeframeError::PlatformUnavailable)
        ));
        assert_eq!(host.platform_name(), "Desktop (stub)");
    }
}
