// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Routing of host layout callbacks to the engine.
//!
//! The host's global-layout listener lives on the UI thread and knows
//! nothing about sessions. The engine installs one callback per UI thread
//! here; the host side calls [`dispatch_layout_signal`] every time the view
//! tree lays out.
//!
//! The callback is taken out of its slot while it runs, so a layout pass
//! triggered from inside the callback is dropped instead of re-entering it.

use std::cell::RefCell;

type LayoutCallback = Box<dyn FnMut()>;

thread_local! {
    static LAYOUT_CALLBACK: RefCell<Option<LayoutCallback>> = const { RefCell::new(None) };
}

/// Install (or with `None`, remove) the layout callback for this thread.
/// Returns the callback it replaced.
pub fn set_layout_callback(callback: Option<LayoutCallback>) -> Option<LayoutCallback> {
    LAYOUT_CALLBACK.with(|slot| std::mem::replace(&mut *slot.borrow_mut(), callback))
}

/// Run the installed callback. Returns `false` when there was none, or when
/// called from inside the callback itself.
pub fn dispatch_layout_signal() -> bool {
    let Some(mut callback) = LAYOUT_CALLBACK.with(|slot| slot.borrow_mut().take()) else {
        return false;
    };
    callback();
    LAYOUT_CALLBACK.with(|slot| {
        let mut slot = slot.borrow_mut();
        // Keep a replacement installed by the callback.
        if slot.is_none() {
            *slot = Some(callback);
        }
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use std::cell::Cell;

    // Each #[test] runs on its own thread, so the slot starts empty.

    #[test]
    fn dispatch_without_callback_is_a_no_op() {
        assert!(!dispatch_layout_signal());
    }

    #[test]
    fn dispatch_runs_installed_callback_every_time() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        set_layout_callback(Some(Box::new(move || counter.set(counter.get() + 1))));

        assert!(dispatch_layout_signal());
        assert!(dispatch_layout_signal());
        assert_eq!(calls.get(), 2);

        assert!(set_layout_callback(None).is_some());
        assert!(!dispatch_layout_signal());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn nested_dispatch_is_dropped() {
        let nested = Rc::new(Cell::new(None));
        let seen = Rc::clone(&nested);
        set_layout_callback(Some(Box::new(move || seen.set(Some(dispatch_layout_signal())))));

        assert!(dispatch_layout_signal());
        assert_eq!(nested.get(), Some(false));
        // Still installed afterwards.
        assert!(dispatch_layout_signal());
    }

    #[test]
    fn callback_can_replace_itself() {
        let hits = Rc::new(Cell::new(0));
        let replacement = Rc::clone(&hits);
        set_layout_callback(Some(Box::new(move || {
            let hits = Rc::clone(&replacement);
            set_layout_callback(Some(Box::new(move || hits.set(hits.get() + 10))));
        })));

        assert!(dispatch_layout_signal());
        assert!(dispatch_layout_signal());
        assert_eq!(hits.get(), 10);
    }
}
