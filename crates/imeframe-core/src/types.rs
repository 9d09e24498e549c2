// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the keyboard frame engine.
//
// All geometry is in physical pixels with the origin at the top-left corner of
// the screen, matching what the host window manager reports.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one attach→detach session of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-side tag of a view whose geometry the engine pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(pub i32);

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Width/height pair as returned by the display size queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// True when the rectangle encloses no area.
    pub const fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Copy of this rectangle with the top edge moved down by `dy`.
    pub const fn push_top(self, dy: i32) -> Self {
        Self {
            top: self.top + dy,
            ..self
        }
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Region of the window not obscured by system decorations or the keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibleArea(pub Rect);

impl VisibleArea {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self(Rect::new(left, top, right, bottom))
    }

    pub const fn rect(&self) -> Rect {
        self.0
    }

    pub const fn bottom(&self) -> i32 {
        self.0.bottom
    }

    pub const fn right(&self) -> i32 {
        self.0.right
    }

    /// Vertical extent not covered by system chrome or the keyboard.
    pub const fn usable_height(&self) -> i32 {
        self.0.bottom - self.0.top
    }

    /// The host has not laid the window out yet.
    pub const fn is_degenerate(&self) -> bool {
        self.0.bottom == 0
    }
}

/// Region the keyboard is presumed to occupy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyboardFrame(pub Rect);

impl KeyboardFrame {
    /// Frame spanning from the visible bottom edge to the screen bottom.
    pub fn below(area: &VisibleArea, metrics: &ScreenMetrics) -> Self {
        let top = area.bottom().min(metrics.height_px);
        Self(Rect::new(0, top, metrics.width_px, metrics.height_px))
    }

    pub const fn rect(&self) -> Rect {
        self.0
    }

    pub const fn top(&self) -> i32 {
        self.0.top
    }

    pub const fn width(&self) -> i32 {
        self.0.width()
    }

    pub const fn height(&self) -> i32 {
        self.0.height()
    }
}

impl std::fmt::Display for KeyboardFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Per-session screen description. Replaced only on a reported
/// configuration change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenMetrics {
    pub width_px: i32,
    pub height_px: i32,
    /// Pixels per density-independent pixel.
    pub density: f32,
    pub status_bar_height: i32,
    pub navigation_bar_height: i32,
}

impl ScreenMetrics {
    pub fn dp_to_px(&self, dp: f32) -> i32 {
        (dp * self.density).round() as i32
    }

    pub fn orientation(&self) -> Orientation {
        if self.width_px > self.height_px {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// How this device reports navigation-bar geometry.
///
/// The vendor flag and the system flag are kept apart because some ROMs hide
/// the reported navigation-bar region while the OS still draws a real bar, or
/// the other way round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationBarState {
    /// The ROM keeps navigation-bar space out of the visible area.
    pub vendor_hides_navigation_bar: bool,
    /// The OS-level navigation bar is currently drawn.
    pub system_navigation_bar_present: bool,
    /// Ignoring orientation, the navigation bar consumes layout space.
    pub navigation_bar_occupies_layout: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyboardVisibility {
    #[default]
    Hidden,
    Shown,
}

impl KeyboardVisibility {
    pub fn is_shown(&self) -> bool {
        matches!(self, Self::Shown)
    }
}

/// What kind of change a transition represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Keyboard appeared.
    Shown,
    /// Keyboard stayed visible but its frame changed.
    Resized,
    /// Keyboard went away.
    Closed,
}

/// A single emitted keyboard change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardTransition {
    pub kind: TransitionKind,
    pub visibility: KeyboardVisibility,
    pub frame: KeyboardFrame,
}

/// Static device identity, read once per session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    /// Brand string as set by the ROM (e.g. "SMARTISAN", "vivo").
    pub vendor: String,
    pub model: String,
    pub os_api_level: u32,
    /// Rounded-corner inset published by the vendor resources, in pixels.
    #[serde(default)]
    pub rounded_corner_inset: Option<i32>,
}

/// One-shot display read used by navigation-bar classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayProbe {
    /// Physical display size including system decorations.
    pub real_size: Size,
    /// Application display size excluding drawn system decorations.
    pub current_size: Size,
    pub has_permanent_menu_key: bool,
    pub has_hardware_back_key: bool,
}

/// Content is always placed in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionType {
    Absolute,
}

/// A geometry push into the host layout system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutUpdate {
    Size {
        view: ViewId,
        width: i32,
        height: i32,
    },
    Position {
        view: ViewId,
        top: i32,
        height: i32,
        position: PositionType,
    },
}

impl LayoutUpdate {
    pub fn view(&self) -> ViewId {
        match self {
            Self::Size { view, .. } | Self::Position { view, .. } => *view,
        }
    }
}
