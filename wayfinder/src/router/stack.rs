//! Stack router: the single-slot state machine generalized to an ordered
//! stack within one scope. Push layers a new top, pop reveals the unit
//! below; the visible unit is always the top of the stack.

use crate::error::Error;
use crate::host::{SharedHost, TransitionSlot, reject};
use crate::presentable::SharedPresentable;
use crate::router::traits::{Completion, Router, ScopeId};

pub struct StackRouter {
    id: ScopeId,
    host: SharedHost,
    stack: Vec<SharedPresentable>,
    slot: TransitionSlot,
}

impl StackRouter {
    pub fn new(host: SharedHost, id: ScopeId) -> Self {
        Self {
            id,
            host,
            stack: Vec::new(),
            slot: TransitionSlot::default(),
        }
    }

    /// Push `module` onto the stack as the new visible top. Rejected while a
    /// transition is in flight; units beneath stay alive, merely covered.
    pub fn push(&mut self, module: SharedPresentable, animated: bool, completion: Option<Completion>) {
        if self.slot.is_busy() {
            tracing::error!(scope = %self.id, "push requested while a transition is in flight");
            reject(completion, Error::TransitionInFlight { scope: self.id });
            return;
        }
        if let Ok(mut unit) = module.lock() {
            unit.on_present();
        }
        self.stack.push(module.clone());
        let generation = self.slot.begin(completion);
        let ticket = self.slot.ticket(generation);
        self.host
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .attach(self.id, module, animated, ticket);
        if !animated {
            self.slot.settle(generation);
        }
    }

    /// Remove the top of the stack, revealing the unit below. Popping an
    /// empty stack is the same invariant violation as dismissing an empty
    /// single-slot router.
    pub fn pop(&mut self, animated: bool, completion: Option<Completion>) {
        if self.slot.is_busy() {
            tracing::error!(scope = %self.id, "pop requested while a transition is in flight");
            reject(completion, Error::TransitionInFlight { scope: self.id });
            return;
        }
        let Some(prev) = self.stack.pop() else {
            tracing::error!(scope = %self.id, "pop on an empty stack router");
            reject(completion, Error::DismissOnEmpty { scope: self.id });
            return;
        };
        if let Ok(mut prev) = prev.lock() {
            prev.on_dismiss();
        }
        drop(prev);
        let generation = self.slot.begin(completion);
        let ticket = self.slot.ticket(generation);
        let mut host = self
            .host
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match self.stack.last() {
            Some(top) => host.attach(self.id, top.clone(), animated, ticket),
            None => host.detach(self.id, animated, ticket),
        }
        drop(host);
        if !animated {
            self.slot.settle(generation);
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Router for StackRouter {
    /// Replaces the entire stack with `module`, releasing every unit that
    /// was on it. Supersedes any transition in flight.
    fn set_root(&mut self, module: SharedPresentable, animated: bool, completion: Option<Completion>) {
        let generation = self.slot.begin(completion);
        for prev in self.stack.drain(..) {
            if let Ok(mut prev) = prev.lock() {
                prev.on_dismiss();
            }
        }
        if let Ok(mut unit) = module.lock() {
            unit.on_present();
        }
        self.stack.push(module.clone());
        let ticket = self.slot.ticket(generation);
        self.host
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .attach(self.id, module, animated, ticket);
        if !animated {
            self.slot.settle(generation);
        }
    }

    fn dismiss(&mut self, animated: bool, completion: Option<Completion>) {
        self.pop(animated, completion);
    }

    fn visible(&self) -> Option<SharedPresentable> {
        self.stack.last().cloned()
    }

    fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }

    fn scope(&self) -> ScopeId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::host::fake::FakeHost;
    use crate::presentable::{Presentable, share};

    #[allow(dead_code)]
    struct Card(&'static str);

    impl Presentable for Card {
        fn render(&mut self, _frame: &mut ratatui::Frame, _area: ratatui::layout::Rect) {}
    }

    #[test]
    fn push_and_pop_track_the_visible_top() {
        let (_fake, shared) = FakeHost::shared();
        let mut router = StackRouter::new(shared, ScopeId::Root);

        let bottom = share(Card("list"));
        let top = share(Card("detail"));
        router.push(bottom.clone(), false, None);
        router.push(top.clone(), false, None);
        assert_eq!(router.depth(), 2);
        assert!(Arc::ptr_eq(&router.visible().unwrap(), &top));

        router.pop(false, None);
        assert_eq!(router.depth(), 1);
        assert!(Arc::ptr_eq(&router.visible().unwrap(), &bottom));
    }

    #[test]
    fn pop_on_empty_is_rejected() {
        let (_fake, shared) = FakeHost::shared();
        let mut router = StackRouter::new(shared, ScopeId::Root);

        let rejected = Arc::new(AtomicUsize::new(0));
        let seen = rejected.clone();
        router.pop(
            false,
            Some(Box::new(move |result| {
                assert!(matches!(result, Err(Error::DismissOnEmpty { .. })));
                seen.fetch_add(1, Ordering::SeqCst);
            })),
        );
        assert_eq!(rejected.load(Ordering::SeqCst), 1);
        assert_eq!(router.depth(), 0);
    }

    #[test]
    fn set_root_resets_the_whole_stack() {
        let (fake, shared) = FakeHost::shared();
        let mut router = StackRouter::new(shared, ScopeId::Root);

        let first = share(Card("a"));
        let weak = Arc::downgrade(&first);
        router.push(first, false, None);
        router.push(share(Card("b")), false, None);

        let fresh = share(Card("fresh"));
        router.set_root(fresh.clone(), false, None);
        assert_eq!(router.depth(), 1);
        assert!(Arc::ptr_eq(&router.visible().unwrap(), &fresh));
        assert!(weak.upgrade().is_none());
        assert_eq!(fake.lock().unwrap().layer_count(), 1);
    }

    #[test]
    fn push_while_in_flight_is_rejected() {
        let (fake, shared) = FakeHost::shared();
        let mut router = StackRouter::new(shared, ScopeId::Root);

        router.push(share(Card("slow")), true, None);

        let rejected = Arc::new(AtomicUsize::new(0));
        let seen = rejected.clone();
        router.push(
            share(Card("eager")),
            false,
            Some(Box::new(move |result| {
                assert!(matches!(result, Err(Error::TransitionInFlight { .. })));
                seen.fetch_add(1, Ordering::SeqCst);
            })),
        );
        assert_eq!(rejected.load(Ordering::SeqCst), 1);
        assert_eq!(router.depth(), 1);

        fake.lock().unwrap().settle_next();
        assert!(!router.is_busy());
    }

    #[test]
    fn pop_reveals_the_unit_below_on_the_host() {
        let (fake, shared) = FakeHost::shared();
        let mut router = StackRouter::new(shared, ScopeId::Root);

        let bottom = share(Card("bottom"));
        router.push(bottom.clone(), false, None);
        router.push(share(Card("top")), false, None);
        router.pop(false, None);

        let fake = fake.lock().unwrap();
        assert_eq!(fake.layer_count(), 1);
        assert!(Arc::ptr_eq(&fake.layers[0].1, &bottom));
    }
}
