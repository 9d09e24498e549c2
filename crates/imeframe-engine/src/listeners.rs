// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ordered fan-out of keyboard transitions to registered observers.

use imeframe_core::config::FanOutPolicy;
use imeframe_core::error::{ImeframeError, Result};
use imeframe_core::types::{KeyboardFrame, KeyboardTransition, TransitionKind};
use tracing::warn;

/// Observer of keyboard transitions.
pub trait OnKeyboardChangeListener {
    fn on_keyboard_shown(&mut self, frame: &KeyboardFrame) -> Result<()>;

    /// Keyboard stayed up but changed size. Defaults to a fresh "shown".
    fn on_keyboard_resized(&mut self, frame: &KeyboardFrame) -> Result<()> {
        self.on_keyboard_shown(frame)
    }

    fn on_keyboard_closed(&mut self) -> Result<()>;
}

/// Handle returned by [`ListenerRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Outcome of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutReport {
    /// Listeners that returned `Ok`.
    pub notified: usize,
    /// Listeners that failed, in notification order.
    pub failed: Vec<ListenerId>,
}

pub struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(ListenerId, Box<dyn OnKeyboardChangeListener>)>,
    policy: FanOutPolicy,
}

impl ListenerRegistry {
    pub fn new(policy: FanOutPolicy) -> Self {
        Self {
            next_id: 1,
            listeners: Vec::new(),
            policy,
        }
    }

    pub fn register(&mut self, listener: Box<dyn OnKeyboardChangeListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if the id was not registered.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver a transition to every listener in registration order.
    ///
    /// Under `BestEffort` a failing listener is logged and skipped; under
    /// `Strict` the first failure stops the fan-out and is returned.
    pub fn notify(&mut self, transition: &KeyboardTransition) -> Result<FanOutReport> {
        let mut report = FanOutReport::default();
        for (id, listener) in self.listeners.iter_mut() {
            let outcome = match transition.kind {
                TransitionKind::Shown => listener.on_keyboard_shown(&transition.frame),
                TransitionKind::Resized => listener.on_keyboard_resized(&transition.frame),
                TransitionKind::Closed => listener.on_keyboard_closed(),
            };
            match outcome {
                Ok(()) => report.notified += 1,
                Err(e) => match self.policy {
                    FanOutPolicy::Strict => {
                        return Err(ImeframeError::Listener {
                            id: id.0,
                            reason: e.to_string(),
                        });
                    }
                    FanOutPolicy::BestEffort => {
                        warn!(listener = id.0, error = %e, "keyboard listener failed");
                        report.failed.push(*id);
                    }
                },
            }
        }
        Ok(report)
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imeframe_core::types::{KeyboardVisibility, Rect};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Shown(&'static str, i32),
        Closed(&'static str),
    }

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<Event>>>,
        fail: bool,
    }

    impl OnKeyboardChangeListener for Recorder {
        fn on_keyboard_shown(&mut self, frame: &KeyboardFrame) -> Result<()> {
            if self.fail {
                return Err(ImeframeError::Bridge("view gone".into()));
            }
            self.log.borrow_mut().push(Event::Shown(self.name, frame.height()));
            Ok(())
        }

        fn on_keyboard_closed(&mut self) -> Result<()> {
            self.log.borrow_mut().push(Event::Closed(self.name));
            Ok(())
        }
    }

    fn shown() -> KeyboardTransition {
        KeyboardTransition {
            kind: TransitionKind::Shown,
            visibility: KeyboardVisibility::Shown,
            frame: KeyboardFrame(Rect::new(0, 1100, 1080, 1920)),
        }
    }

    fn recorder(name: &'static str, log: &Rc<RefCell<Vec<Event>>>, fail: bool) -> Box<Recorder> {
        Box::new(Recorder {
            name,
            log: Rc::clone(log),
            fail,
        })
    }

    #[test]
    fn notifies_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::new(FanOutPolicy::BestEffort);
        registry.register(recorder("a", &log, false));
        registry.register(recorder("b", &log, false));
        let report = registry.notify(&shown()).unwrap();
        assert_eq!(report.notified, 2);
        assert_eq!(*log.borrow(), vec![Event::Shown("a", 820), Event::Shown("b", 820)]);
    }

    #[test]
    fn best_effort_skips_failing_listener() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::new(FanOutPolicy::BestEffort);
        let bad = registry.register(recorder("bad", &log, true));
        registry.register(recorder("good", &log, false));
        let report = registry.notify(&shown()).unwrap();
        assert_eq!(report.failed, vec![bad]);
        assert_eq!(*log.borrow(), vec![Event::Shown("good", 820)]);
    }

    #[test]
    fn strict_stops_at_first_failure() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::new(FanOutPolicy::Strict);
        registry.register(recorder("bad", &log, true));
        registry.register(recorder("good", &log, false));
        let err = registry.notify(&shown()).unwrap_err();
        assert!(matches!(err, ImeframeError::Listener { id: 1, .. }));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn resize_defaults_to_shown_and_close_routes() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::new(FanOutPolicy::BestEffort);
        registry.register(recorder("a", &log, false));
        let mut resized = shown();
        resized.kind = TransitionKind::Resized;
        registry.notify(&resized).unwrap();
        registry
            .notify(&KeyboardTransition {
                kind: TransitionKind::Closed,
                visibility: KeyboardVisibility::Hidden,
                frame: KeyboardFrame(Rect::new(0, 1920, 1080, 1920)),
            })
            .unwrap();
        assert_eq!(*log.borrow(), vec![Event::Shown("a", 820), Event::Closed("a")]);
    }

    #[test]
    fn unregister_removes_only_that_listener() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::new(FanOutPolicy::BestEffort);
        let a = registry.register(recorder("a", &log, false));
        registry.register(recorder("b", &log, false));
        assert!(registry.unregister(a));
        assert!(!registry.unregister(a));
        registry.notify(&shown()).unwrap();
        assert_eq!(*log.borrow(), vec![Event::Shown("b", 820)]);
        assert_eq!(registry.len(), 1);
    }
}
