// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout signal noise filter.
//
// The host fires its global-layout callback many times per real geometry
// change (initial layout, every IME animation frame, orientation changes).
// Only a change in usable height is worth running the state machine for.

use imeframe_core::types::VisibleArea;
use tracing::trace;

/// What a single layout signal amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Window not laid out yet; nothing to compute.
    Degenerate,
    /// Same usable height as the previous sample.
    Unchanged,
    /// Usable height moved.
    Changed(VisibleArea),
}

#[derive(Debug, Default)]
pub struct LayoutSampler {
    usable_height_previous: i32,
    ready: bool,
}

impl LayoutSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, area: VisibleArea) -> SampleOutcome {
        if area.is_degenerate() {
            trace!("visible area not laid out yet");
            return SampleOutcome::Degenerate;
        }
        self.ready = true;

        let usable_height_now = area.usable_height();
        if usable_height_now == self.usable_height_previous {
            trace!(usable_height_now, "usable height unchanged, dropping signal");
            return SampleOutcome::Unchanged;
        }
        self.usable_height_previous = usable_height_now;
        SampleOutcome::Changed(area)
    }

    /// Whether a non-degenerate area has been observed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn usable_height_previous(&self) -> i32 {
        self.usable_height_previous
    }

    /// Forget the recorded height so the next sample is processed even if
    /// nothing moved.
    pub fn reset(&mut self) {
        self.usable_height_previous = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_area_does_not_record() {
        let mut sampler = LayoutSampler::new();
        assert_eq!(sampler.sample(VisibleArea::default()), SampleOutcome::Degenerate);
        assert!(!sampler.is_ready());
        assert_eq!(sampler.usable_height_previous(), 0);
    }

    #[test]
    fn repeated_height_is_dropped() {
        let mut sampler = LayoutSampler::new();
        let area = VisibleArea::new(0, 60, 1080, 1800);
        assert_eq!(sampler.sample(area), SampleOutcome::Changed(area));
        assert_eq!(sampler.sample(area), SampleOutcome::Unchanged);
        assert_eq!(sampler.usable_height_previous(), 1740);
    }

    #[test]
    fn same_height_at_different_offset_is_dropped() {
        let mut sampler = LayoutSampler::new();
        sampler.sample(VisibleArea::new(0, 60, 1080, 1800));
        assert_eq!(
            sampler.sample(VisibleArea::new(0, 0, 1080, 1740)),
            SampleOutcome::Unchanged
        );
    }

    #[test]
    fn reset_lets_the_same_height_through() {
        let mut sampler = LayoutSampler::new();
        let area = VisibleArea::new(0, 60, 1080, 1800);
        sampler.sample(area);
        sampler.reset();
        assert_eq!(sampler.sample(area), SampleOutcome::Changed(area));
    }
}
