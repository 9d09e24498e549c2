// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cover/content view geometry.
//
//   +--------------+
//   |              |
//   |    cover     |   fills what the keyboard leaves of the root view
//   |              |
//   |--------------|
//   |   content    |   sits exactly over the keyboard frame
//   +--------------+
//
// The content rect is in screen coordinates, like the keyboard frame; the
// cover is sized against the root view.
//
// Every transition yields target rectangles for both views. Only values that
// differ from what was last pushed are returned, so rapid resize callbacks do
// not thrash the host layout engine.

use imeframe_core::types::{KeyboardTransition, LayoutUpdate, PositionType, Rect, ViewId};
use serde::Serialize;
use tracing::debug;

/// Geometry to push. `None` means "unchanged, do not push".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GeometryUpdate {
    pub cover: Option<Rect>,
    pub content: Option<Rect>,
}

impl GeometryUpdate {
    pub fn is_empty(&self) -> bool {
        self.cover.is_none() && self.content.is_none()
    }

    /// Host layout calls for this update.
    pub fn to_layout_updates(
        &self,
        cover_view: Option<ViewId>,
        content_view: Option<ViewId>,
        push_positions: bool,
    ) -> Vec<LayoutUpdate> {
        let mut updates = Vec::with_capacity(3);
        if let (Some(view), Some(rect)) = (cover_view, self.cover) {
            updates.push(LayoutUpdate::Size {
                view,
                width: rect.width(),
                height: rect.height(),
            });
        }
        if let (Some(view), Some(rect)) = (content_view, self.content) {
            updates.push(LayoutUpdate::Size {
                view,
                width: rect.width(),
                height: rect.height(),
            });
            if push_positions {
                updates.push(LayoutUpdate::Position {
                    view,
                    top: rect.top,
                    height: rect.height(),
                    position: PositionType::Absolute,
                });
            }
        }
        updates
    }
}

#[derive(Debug)]
pub struct GeometryReconciler {
    screen_width: i32,
    screen_height: i32,
    root_height: i32,
    placeholder_height: Option<i32>,
    extra_height: i32,
    /// Dedup content on its full rect, not just its size.
    track_position: bool,
    last_transition: Option<KeyboardTransition>,
    pushed_cover: Option<Rect>,
    pushed_content: Option<Rect>,
}

impl GeometryReconciler {
    pub fn new(screen_width: i32, screen_height: i32, root_height: i32) -> Self {
        Self {
            screen_width,
            screen_height,
            root_height,
            placeholder_height: None,
            extra_height: 0,
            track_position: true,
            last_transition: None,
            pushed_cover: None,
            pushed_content: None,
        }
    }

    /// Whether a content view that moves without changing size is re-pushed.
    /// Should match whether positions are sent to the host at all.
    pub fn with_position_tracking(mut self, track: bool) -> Self {
        self.track_position = track;
        self
    }

    /// Targets for a transition, deduplicated against earlier pushes.
    pub fn on_transition(&mut self, transition: &KeyboardTransition) -> GeometryUpdate {
        self.last_transition = Some(*transition);
        self.reconcile()
    }

    /// Recompute from the last transition after an input (root height,
    /// placeholder) moved. Deduplicated like [`on_transition`](Self::on_transition).
    pub fn refresh(&mut self) -> GeometryUpdate {
        self.reconcile()
    }

    /// Full targets for the last transition, ignoring what was pushed.
    pub fn current(&self) -> GeometryUpdate {
        let (cover, content) = self.targets();
        GeometryUpdate { cover, content }
    }

    /// Forget pushed values; the host may have rebuilt the views.
    pub fn invalidate(&mut self) {
        debug!("geometry invalidated");
        self.pushed_cover = None;
        self.pushed_content = None;
    }

    pub fn set_root_height(&mut self, height: i32) {
        self.root_height = height;
    }

    pub fn set_screen_size(&mut self, width: i32, height: i32) {
        self.screen_width = width;
        self.screen_height = height;
    }

    /// Reserve `height` pixels for the keyboard while it is not up.
    pub fn set_placeholder_height(&mut self, height: Option<i32>) {
        self.placeholder_height = height.filter(|h| *h > 0);
    }

    pub fn set_extra_height(&mut self, extra: i32) {
        self.extra_height = extra.max(0);
    }

    pub fn root_height(&self) -> i32 {
        self.root_height
    }

    /// Height currently taken away from the cover view.
    pub fn reserved_height(&self) -> i32 {
        match self.last_transition {
            Some(t) if t.visibility.is_shown() => t.frame.height(),
            _ => self
                .placeholder_height
                .map(|p| p + self.extra_height)
                .unwrap_or(0),
        }
    }

    fn targets(&self) -> (Option<Rect>, Option<Rect>) {
        let Some(transition) = self.last_transition else {
            return (None, None);
        };
        let reserved = self.reserved_height();
        let cover = Rect::new(0, 0, self.screen_width, (self.root_height - reserved).max(0));

        let content = if transition.visibility.is_shown() {
            Some(transition.frame.rect())
        } else if self.placeholder_height.is_some() {
            // Screen coordinates, where the keyboard it stands in for would sit.
            let top = (self.screen_height - reserved).max(0);
            Some(Rect::new(0, top, self.screen_width, self.screen_height))
        } else {
            None
        };
        (Some(cover), content)
    }

    fn reconcile(&mut self) -> GeometryUpdate {
        let (cover, content) = self.targets();
        let mut update = GeometryUpdate::default();

        if let Some(cover) = cover {
            if self.pushed_cover != Some(cover) {
                self.pushed_cover = Some(cover);
                update.cover = Some(cover);
            }
        }
        if let Some(content) = content {
            let changed = match self.pushed_content {
                None => true,
                Some(prev) if self.track_position => prev != content,
                Some(prev) => (prev.width(), prev.height()) != (content.width(), content.height()),
            };
            if changed {
                self.pushed_content = Some(content);
                update.content = Some(content);
            }
        }

        debug!(
            cover = ?update.cover,
            content = ?update.content,
            reserved = self.reserved_height(),
            "reconciled geometry"
        );
        update
    }
}
