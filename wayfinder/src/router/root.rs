//! Root and modal routers over a single-slot scope.

use std::sync::{Arc, Mutex};

use crate::error::Error;
use crate::host::{SharedHost, TransitionSlot, reject};
use crate::presentable::SharedPresentable;
use crate::router::traits::{Completion, Router, ScopeId};

/// Scopes of the modal contexts currently layered above the root, in
/// presentation order. Shared between the root router and the teardown
/// callbacks of the modal routers it spawned.
type ModalRegistry = Arc<Mutex<Vec<ScopeId>>>;

fn lock_registry(registry: &ModalRegistry) -> std::sync::MutexGuard<'_, Vec<ScopeId>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One navigation scope: the slot holding its current content plus the
/// bookkeeping for the single transition allowed in flight.
struct Scope {
    id: ScopeId,
    host: SharedHost,
    current: Option<SharedPresentable>,
    slot: TransitionSlot,
}

impl Scope {
    fn new(id: ScopeId, host: SharedHost) -> Self {
        Self {
            id,
            host,
            current: None,
            slot: TransitionSlot::default(),
        }
    }

    fn set_root(&mut self, module: SharedPresentable, animated: bool, completion: Option<Completion>) {
        let generation = self.slot.begin(completion);
        if let Some(prev) = self.current.take() {
            if let Ok(mut prev) = prev.lock() {
                prev.on_dismiss();
            }
        }
        if let Ok(mut unit) = module.lock() {
            unit.on_present();
        }
        self.current = Some(module.clone());
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
        if self.slot.is_busy() {
            tracing::error!(scope = %self.id, "dismiss requested while a transition is in flight");
            reject(completion, Error::TransitionInFlight { scope: self.id });
            return;
        }
        let Some(prev) = self.current.take() else {
            tracing::error!(scope = %self.id, "dismiss on an empty router scope");
            reject(completion, Error::DismissOnEmpty { scope: self.id });
            return;
        };
        if let Ok(mut prev) = prev.lock() {
            prev.on_dismiss();
        }
        drop(prev);
        let generation = self.slot.begin(completion);
        let ticket = self.slot.ticket(generation);
        self.host
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .detach(self.id, animated, ticket);
        if !animated {
            self.slot.settle(generation);
        }
    }
}

/// The router for the application's top-level visible content.
///
/// Exactly one is created per application, by [`crate::Application`] at
/// startup, and it lives until the process exits. Modal contexts are layered
/// above it with [`RootRouter::present`].
pub struct RootRouter {
    scope: Scope,
    modals: ModalRegistry,
}

impl RootRouter {
    pub fn new(host: SharedHost) -> Self {
        Self {
            scope: Scope::new(ScopeId::Root, host),
            modals: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Present `module` in a new modal context layered above this scope.
    ///
    /// The returned router governs the modal scope; dismissing its content
    /// tears the whole context down again.
    pub fn present(
        &mut self,
        module: SharedPresentable,
        animated: bool,
        completion: Option<Completion>,
    ) -> ModalRouter {
        present_modal(&self.scope.host, &self.modals, module, animated, completion)
    }

    /// Number of modal contexts currently layered above the root.
    pub fn active_modals(&self) -> usize {
        lock_registry(&self.modals).len()
    }
}

impl Router for RootRouter {
    fn set_root(&mut self, module: SharedPresentable, animated: bool, completion: Option<Completion>) {
        self.scope.set_root(module, animated, completion);
    }

    fn dismiss(&mut self, animated: bool, completion: Option<Completion>) {
        self.scope.dismiss(animated, completion);
    }

    fn visible(&self) -> Option<SharedPresentable> {
        self.scope.current.clone()
    }

    fn is_busy(&self) -> bool {
        self.scope.slot.is_busy()
    }

    fn scope(&self) -> ScopeId {
        self.scope.id
    }
}

fn present_modal(
    host: &SharedHost,
    registry: &ModalRegistry,
    module: SharedPresentable,
    animated: bool,
    completion: Option<Completion>,
) -> ModalRouter {
    let id = ScopeId::next_modal();
    lock_registry(registry).push(id);
    tracing::debug!(scope = %id, "modal context presented");
    let mut scope = Scope::new(id, host.clone());
    scope.set_root(module, animated, completion);
    let teardown_registry = registry.clone();
    ModalRouter {
        scope,
        registry: registry.clone(),
        on_teardown: Some(Box::new(move || {
            lock_registry(&teardown_registry).retain(|scope| *scope != id);
            tracing::debug!(scope = %id, "modal context released");
        })),
    }
}

/// A router scoped to one presented modal context.
///
/// Dismissing its content additionally signals the parent, through a
/// teardown callback captured at presentation time, to release the modal
/// context entirely. After that the router is spent and should be dropped;
/// it holds no path back into the parent's state.
pub struct ModalRouter {
    scope: Scope,
    registry: ModalRegistry,
    on_teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl ModalRouter {
    /// Layer a further modal context above this one.
    pub fn present(
        &mut self,
        module: SharedPresentable,
        animated: bool,
        completion: Option<Completion>,
    ) -> ModalRouter {
        present_modal(&self.scope.host, &self.registry, module, animated, completion)
    }
}

impl Router for ModalRouter {
    fn set_root(&mut self, module: SharedPresentable, animated: bool, completion: Option<Completion>) {
        self.scope.set_root(module, animated, completion);
    }

    fn dismiss(&mut self, animated: bool, completion: Option<Completion>) {
        let will_empty = self.scope.current.is_some() && !self.scope.slot.is_busy();
        self.scope.dismiss(animated, completion);
        if will_empty {
            // Structural removal is immediate; only the completion waits for
            // the animation. The context is released now.
            if let Some(teardown) = self.on_teardown.take() {
                teardown();
            }
        }
    }

    fn visible(&self) -> Option<SharedPresentable> {
        self.scope.current.clone()
    }

    fn is_busy(&self) -> bool {
        self.scope.slot.is_busy()
    }

    fn scope(&self) -> ScopeId {
        self.scope.id
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Weak;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::host::fake::FakeHost;
    use crate::presentable::{Presentable, share};

    struct Screen {
        presented: bool,
        dismissed: bool,
    }

    impl Screen {
        fn new() -> Self {
            Self {
                presented: false,
                dismissed: false,
            }
        }
    }

    impl Presentable for Screen {
        fn render(&mut self, _frame: &mut ratatui::Frame, _area: ratatui::layout::Rect) {}

        fn on_present(&mut self) {
            self.presented = true;
        }

        fn on_dismiss(&mut self) {
            self.dismissed = true;
        }
    }

    fn counting_completion(counter: &Arc<AtomicUsize>) -> Completion {
        let counter = counter.clone();
        Box::new(move |result| {
            if result.is_ok() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[test]
    fn set_root_replaces_and_releases_prior_module() {
        let (fake, shared) = FakeHost::shared();
        let mut router = RootRouter::new(shared);

        let mut weaks: Vec<Weak<_>> = Vec::new();
        for _ in 0..3 {
            let screen = share(Screen::new());
            weaks.push(Arc::downgrade(&screen));
            router.set_root(screen, false, None);
        }

        // Only the latest module is alive; the first two were released.
        assert!(weaks[0].upgrade().is_none());
        assert!(weaks[1].upgrade().is_none());
        assert!(weaks[2].upgrade().is_some());
        assert!(router.visible().is_some());
        assert_eq!(fake.lock().unwrap().layer_count(), 1);
    }

    #[test]
    fn set_root_calls_lifecycle_hooks() {
        let (_fake, shared) = FakeHost::shared();
        let mut router = RootRouter::new(shared);

        let first = Arc::new(Mutex::new(Screen::new()));
        let second = Arc::new(Mutex::new(Screen::new()));
        router.set_root(first.clone() as SharedPresentable, false, None);
        router.set_root(second.clone() as SharedPresentable, false, None);

        assert!(first.lock().unwrap().dismissed);
        let second = second.lock().unwrap();
        assert!(second.presented);
        assert!(!second.dismissed);
    }

    #[test]
    fn non_animated_completion_fires_before_return() {
        let (_fake, shared) = FakeHost::shared();
        let mut router = RootRouter::new(shared);

        let fired = Arc::new(AtomicUsize::new(0));
        router.set_root(share(Screen::new()), false, Some(counting_completion(&fired)));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn animated_completion_waits_for_settle() {
        let (fake, shared) = FakeHost::shared();
        let mut router = RootRouter::new(shared);

        let fired = Arc::new(AtomicUsize::new(0));
        router.set_root(share(Screen::new()), true, Some(counting_completion(&fired)));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(router.is_busy());

        fake.lock().unwrap().settle_next();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!router.is_busy());
    }

    #[test]
    fn superseded_completion_never_fires() {
        let (fake, shared) = FakeHost::shared();
        let mut router = RootRouter::new(shared);

        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        router.set_root(share(Screen::new()), true, Some(counting_completion(&first)));
        router.set_root(share(Screen::new()), true, Some(counting_completion(&second)));

        // Settling the stale ticket must not fire the superseded completion.
        fake.lock().unwrap().settle_next();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        fake.lock().unwrap().settle_next();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dismiss_on_empty_reports_failure_and_keeps_state() {
        let (fake, shared) = FakeHost::shared();
        let mut router = RootRouter::new(shared);

        let rejected = Arc::new(AtomicUsize::new(0));
        let seen = rejected.clone();
        router.dismiss(
            false,
            Some(Box::new(move |result| {
                assert!(matches!(result, Err(Error::DismissOnEmpty { scope: ScopeId::Root })));
                seen.fetch_add(1, Ordering::SeqCst);
            })),
        );

        assert_eq!(rejected.load(Ordering::SeqCst), 1);
        assert!(router.is_empty());
        assert!(!router.is_busy());
        assert_eq!(fake.lock().unwrap().layer_count(), 0);
    }

    #[test]
    fn dismiss_while_in_flight_is_rejected() {
        let (fake, shared) = FakeHost::shared();
        let mut router = RootRouter::new(shared);

        router.set_root(share(Screen::new()), true, None);

        let rejected = Arc::new(AtomicUsize::new(0));
        let seen = rejected.clone();
        router.dismiss(
            false,
            Some(Box::new(move |result| {
                assert!(matches!(result, Err(Error::TransitionInFlight { .. })));
                seen.fetch_add(1, Ordering::SeqCst);
            })),
        );

        assert_eq!(rejected.load(Ordering::SeqCst), 1);
        // The original transition is unaffected.
        assert!(router.visible().is_some());
        fake.lock().unwrap().settle_next();
        assert!(!router.is_busy());
    }

    #[test]
    fn dismiss_clears_scope_and_releases_module() {
        let (fake, shared) = FakeHost::shared();
        let mut router = RootRouter::new(shared);

        let screen = share(Screen::new());
        let weak = Arc::downgrade(&screen);
        router.set_root(screen, false, None);
        router.dismiss(false, None);

        assert!(router.is_empty());
        assert!(weak.upgrade().is_none());
        assert_eq!(fake.lock().unwrap().layer_count(), 0);
    }

    #[test]
    fn modal_present_and_dismiss_releases_context() {
        let (fake, shared) = FakeHost::shared();
        let mut router = RootRouter::new(shared);
        router.set_root(share(Screen::new()), false, None);

        let mut modal = router.present(share(Screen::new()), false, None);
        assert_eq!(router.active_modals(), 1);
        assert_eq!(fake.lock().unwrap().layer_count(), 2);
        assert!(matches!(modal.scope(), ScopeId::Modal(_)));

        modal.dismiss(false, None);
        assert_eq!(router.active_modals(), 0);
        assert_eq!(fake.lock().unwrap().layer_count(), 1);
        // The root scope is untouched.
        assert!(router.visible().is_some());
    }

    #[test]
    fn nested_modals_tear_down_independently() {
        let (_fake, shared) = FakeHost::shared();
        let mut router = RootRouter::new(shared);
        router.set_root(share(Screen::new()), false, None);

        let mut first = router.present(share(Screen::new()), false, None);
        let mut second = first.present(share(Screen::new()), false, None);
        assert_eq!(router.active_modals(), 2);

        second.dismiss(false, None);
        assert_eq!(router.active_modals(), 1);
        first.dismiss(false, None);
        assert_eq!(router.active_modals(), 0);
    }

    #[test]
    fn dismiss_on_empty_modal_does_not_tear_down() {
        let (_fake, shared) = FakeHost::shared();
        let mut router = RootRouter::new(shared);

        let mut modal = router.present(share(Screen::new()), false, None);
        modal.dismiss(false, None);
        assert_eq!(router.active_modals(), 0);

        let rejected = Arc::new(AtomicUsize::new(0));
        let seen = rejected.clone();
        modal.dismiss(
            false,
            Some(Box::new(move |result| {
                assert!(matches!(result, Err(Error::DismissOnEmpty { .. })));
                seen.fetch_add(1, Ordering::SeqCst);
            })),
        );
        assert_eq!(rejected.load(Ordering::SeqCst), 1);
    }
}
