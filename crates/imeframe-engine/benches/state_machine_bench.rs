// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the per-layout-callback hot path: sampling,
// the state machine step, and geometry reconciliation.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use imeframe_core::types::{
    DisplayProbe, NavigationBarState, ScreenMetrics, Size, VisibleArea,
};
use imeframe_engine::{DeviceProfile, GeometryReconciler, KeyboardStateMachine, LayoutSampler};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn metrics() -> ScreenMetrics {
    ScreenMetrics {
        width_px: 1080,
        height_px: 1920,
        density: 3.0,
        status_bar_height: 60,
        navigation_bar_height: 120,
    }
}

fn probe() -> DisplayProbe {
    DisplayProbe {
        real_size: Size::new(1080, 2040),
        current_size: Size::new(1080, 1920),
        has_permanent_menu_key: false,
        has_hardware_back_key: false,
    }
}

/// One IME open/close animation: the visible bottom slides up then back.
fn animation() -> Vec<VisibleArea> {
    let up = (1100..=1920).rev().step_by(20);
    let down = (1100..=1920).step_by(20);
    up.chain(down)
        .map(|bottom| VisibleArea::new(0, 60, 1080, bottom))
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Sampler alone on a burst of repeated signals.
fn bench_sampler(c: &mut Criterion) {
    let areas = animation();

    c.bench_function("layout_sampler (animation, 3 signals per frame)", |b| {
        b.iter(|| {
            let mut sampler = LayoutSampler::new();
            for area in &areas {
                for _ in 0..3 {
                    black_box(sampler.sample(black_box(*area)));
                }
            }
        });
    });
}

/// Full state machine step including first-sample classification.
fn bench_state_machine(c: &mut Criterion) {
    let areas = animation();

    c.bench_function("state_machine_step (open + close animation)", |b| {
        b.iter(|| {
            let mut machine = KeyboardStateMachine::new(metrics(), DeviceProfile::Normal, 29);
            for area in &areas {
                black_box(machine.step(black_box(*area), || Ok(probe())));
            }
        });
    });

    c.bench_function("state_machine_step (rounded corner, preclassified)", |b| {
        b.iter(|| {
            let mut machine =
                KeyboardStateMachine::new(metrics(), DeviceProfile::RoundedCorner { inset: 72 }, 27)
                    .with_navigation_state(NavigationBarState::default());
            for area in &areas {
                black_box(machine.step(black_box(*area), || Ok(probe())));
            }
        });
    });
}

/// Machine plus geometry, as the session drives it per transition.
fn bench_reconcile(c: &mut Criterion) {
    let areas = animation();

    c.bench_function("geometry_reconcile (open + close animation)", |b| {
        b.iter(|| {
            let mut machine = KeyboardStateMachine::new(metrics(), DeviceProfile::Normal, 29);
            let mut reconciler = GeometryReconciler::new(1080, 1920, 1860);
            for area in &areas {
                if let Some(t) = machine.on_new_visible_area(*area, || Ok(probe())) {
                    black_box(reconciler.on_transition(&t));
                }
            }
        });
    });
}

criterion_group!(benches, bench_sampler, bench_state_machine, bench_reconcile);
criterion_main!(benches);
