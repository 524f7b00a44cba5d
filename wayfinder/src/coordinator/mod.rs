//! Coordinators decide which screen to show next and drive routers to
//! realize that decision.
//!
//! A coordinator owns its child coordinators exclusively, in presentation
//! order. Children never reach back into the parent; at start time each
//! child receives a [`FinishHandle`], a plain value it consumes to signal
//! that its navigation concern is done. The parent reaps finished children
//! out of its collection before they are dropped.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::error::{Result, UnknownChildSnafu};

/// Global counter for coordinator identifiers.
static NEXT_COORDINATOR_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one node in the coordinator tree, unique for the application
/// lifetime.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoordinatorId(NonZeroU64);

impl CoordinatorId {
    fn next() -> Self {
        let id = NEXT_COORDINATOR_ID.fetch_add(1, Ordering::Relaxed);
        // Starts at 1 and only increments, so never zero.
        Self(NonZeroU64::new(id).unwrap_or_else(|| unreachable!("coordinator id overflow")))
    }
}

impl std::fmt::Debug for CoordinatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CoordinatorId({})", self.0)
    }
}

impl std::fmt::Display for CoordinatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One-shot completion signal a coordinator uses to tell its parent that its
/// navigation concern is finished. Consuming `self` makes firing twice
/// unrepresentable.
pub struct FinishHandle {
    id: CoordinatorId,
    tx: mpsc::UnboundedSender<CoordinatorId>,
}

impl FinishHandle {
    /// Signal completion. The parent removes this coordinator from its
    /// child collection on the next reap.
    pub fn finished(self) {
        let _ = self.tx.send(self.id);
    }

    pub fn id(&self) -> CoordinatorId {
        self.id
    }

    /// Handle for a coordinator outside any tree (the application root).
    /// The receiver yields the coordinator's id once it finishes.
    pub fn standalone() -> (Self, mpsc::UnboundedReceiver<CoordinatorId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: CoordinatorId::next(),
                tx,
            },
            rx,
        )
    }
}

/// A non-UI controller for one navigation concern.
pub trait Coordinator: Send + 'static {
    /// Begin this coordinator's navigation concern, typically by
    /// constructing an initial presentable and handing it to a router.
    ///
    /// Starting the same instance twice is a broken invariant and must be
    /// rejected with [`crate::Error::AlreadyStarted`], leaving navigation
    /// state unchanged. [`Children::start`] enforces this for tree members;
    /// implementations guard direct calls by holding the handle in an
    /// `Option` and refusing when it is already taken.
    fn start(&mut self, finish: FinishHandle) -> Result<()>;

    /// Drain pending domain events and advance the flow. The application
    /// loop calls this between input events.
    fn process(&mut self) -> Result<()> {
        Ok(())
    }
}

struct ChildEntry {
    id: CoordinatorId,
    started: bool,
    coordinator: Box<dyn Coordinator>,
}

/// Ordered collection of child coordinators, mutated only by the owning
/// coordinator.
pub struct Children {
    entries: Vec<ChildEntry>,
    finished_tx: mpsc::UnboundedSender<CoordinatorId>,
    finished_rx: mpsc::UnboundedReceiver<CoordinatorId>,
}

impl Children {
    pub fn new() -> Self {
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        Self {
            entries: Vec::new(),
            finished_tx,
            finished_rx,
        }
    }

    /// Add a child in insertion order without starting it.
    pub fn add(&mut self, coordinator: Box<dyn Coordinator>) -> CoordinatorId {
        let id = CoordinatorId::next();
        self.entries.push(ChildEntry {
            id,
            started: false,
            coordinator,
        });
        id
    }

    /// Start a previously added child. A second start of the same child is
    /// rejected without touching the child again.
    pub fn start(&mut self, id: CoordinatorId) -> Result<()> {
        let finish = FinishHandle {
            id,
            tx: self.finished_tx.clone(),
        };
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| UnknownChildSnafu { id }.build())?;
        if entry.started {
            tracing::error!(%id, "coordinator started twice");
            return Err(crate::Error::AlreadyStarted { id });
        }
        entry.coordinator.start(finish)?;
        entry.started = true;
        Ok(())
    }

    pub fn add_and_start(&mut self, coordinator: Box<dyn Coordinator>) -> Result<CoordinatorId> {
        let id = self.add(coordinator);
        self.start(id)?;
        Ok(id)
    }

    /// Pump every started child's flow.
    pub fn process_all(&mut self) -> Result<()> {
        for entry in self.entries.iter_mut().filter(|entry| entry.started) {
            entry.coordinator.process()?;
        }
        Ok(())
    }

    /// Remove children that signaled completion since the last reap,
    /// dropping each one only after it left the collection. Returns the
    /// removed ids in signal order.
    pub fn reap(&mut self) -> Vec<CoordinatorId> {
        let mut removed = Vec::new();
        while let Ok(id) = self.finished_rx.try_recv() {
            let len = self.entries.len();
            self.entries.retain(|entry| entry.id != id);
            if self.entries.len() < len {
                tracing::debug!(%id, "child coordinator finished and removed");
                removed.push(id);
            } else {
                tracing::warn!(%id, "finish signal from a child no longer in the tree");
            }
        }
        removed
    }

    pub fn contains(&self, id: CoordinatorId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Children {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flow {
        finish: Option<FinishHandle>,
    }

    impl Flow {
        fn new() -> Self {
            Self { finish: None }
        }
    }

    impl Coordinator for Flow {
        fn start(&mut self, finish: FinishHandle) -> Result<()> {
            self.finish = Some(finish);
            Ok(())
        }

        fn process(&mut self) -> Result<()> {
            // Finish immediately once started.
            if let Some(finish) = self.finish.take() {
                finish.finished();
            }
            Ok(())
        }
    }

    #[test]
    fn double_start_is_rejected() {
        let mut children = Children::new();
        let id = children.add(Box::new(Flow::new()));

        children.start(id).unwrap();
        let err = children.start(id).unwrap_err();
        assert!(matches!(err, crate::Error::AlreadyStarted { .. }));
        // The child is still owned and still started exactly once.
        assert!(children.contains(id));
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn starting_an_unknown_child_fails() {
        let mut other = Children::new();
        let foreign = other.add(Box::new(Flow::new()));

        let mut children = Children::new();
        let err = children.start(foreign).unwrap_err();
        assert!(matches!(err, crate::Error::UnknownChild { .. }));
    }

    #[test]
    fn finished_child_is_removed_exactly_once() {
        let mut children = Children::new();
        let id = children.add_and_start(Box::new(Flow::new())).unwrap();
        let keeper = children.add(Box::new(Flow::new()));
        assert_eq!(children.len(), 2);

        children.process_all().unwrap();
        let removed = children.reap();
        assert_eq!(removed, vec![id]);
        assert_eq!(children.len(), 1);
        assert!(!children.contains(id));
        assert!(children.contains(keeper));

        // A second reap finds nothing.
        assert!(children.reap().is_empty());
    }

    #[test]
    fn unstarted_children_are_not_processed() {
        let mut children = Children::new();
        children.add(Box::new(Flow::new()));
        children.process_all().unwrap();
        assert!(children.reap().is_empty());
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn standalone_handle_reports_once() {
        let (finish, mut rx) = FinishHandle::standalone();
        let id = finish.id();
        finish.finished();
        assert_eq!(rx.try_recv().unwrap(), id);
        assert!(rx.try_recv().is_err());
    }
}

#[cfg(test)]
mod scenario_tests {
    //! The canonical flow end to end: welcome screen, then a child auth
    //! flow presenting login, then the conversations list once the child
    //! finishes and is reaped.

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::host::fake::FakeHost;
    use crate::presentable::{Presentable, SharedPresentable, share};
    use crate::router::{RootRouter, Router};

    #[allow(dead_code)]
    struct Screen(&'static str);

    impl Presentable for Screen {
        fn render(&mut self, _frame: &mut ratatui::Frame, _area: ratatui::layout::Rect) {}
    }

    struct AuthFlow {
        router: Arc<Mutex<RootRouter>>,
        login: SharedPresentable,
        done: Arc<AtomicBool>,
        finish: Option<FinishHandle>,
    }

    impl Coordinator for AuthFlow {
        fn start(&mut self, finish: FinishHandle) -> Result<()> {
            self.router.lock().unwrap().set_root(self.login.clone(), false, None);
            self.finish = Some(finish);
            Ok(())
        }

        fn process(&mut self) -> Result<()> {
            if self.done.load(Ordering::SeqCst) {
                if let Some(finish) = self.finish.take() {
                    finish.finished();
                }
            }
            Ok(())
        }
    }

    #[test]
    fn welcome_login_conversations_flow() {
        let (_fake, shared) = FakeHost::shared();
        let router = Arc::new(Mutex::new(RootRouter::new(shared)));
        assert!(router.lock().unwrap().is_empty());

        let welcome = share(Screen("welcome"));
        let welcome_weak = Arc::downgrade(&welcome);
        router.lock().unwrap().set_root(welcome, false, None);
        assert!(router.lock().unwrap().visible().is_some());

        let login = share(Screen("login"));
        let login_done = Arc::new(AtomicBool::new(false));
        let mut children = Children::new();
        let id = children
            .add_and_start(Box::new(AuthFlow {
                router: router.clone(),
                login: login.clone(),
                done: login_done.clone(),
                finish: None,
            }))
            .unwrap();

        // Login replaced welcome, and welcome was released.
        assert!(Arc::ptr_eq(&router.lock().unwrap().visible().unwrap(), &login));
        assert!(welcome_weak.upgrade().is_none());

        // Sign-in succeeds; the auth flow signals completion and is reaped.
        login_done.store(true, Ordering::SeqCst);
        children.process_all().unwrap();
        assert_eq!(children.reap(), vec![id]);
        assert!(!children.contains(id));
        assert!(children.is_empty());

        // The parent proceeds to the conversations list.
        let conversations = share(Screen("conversations"));
        router.lock().unwrap().set_root(conversations.clone(), false, None);
        assert!(Arc::ptr_eq(&router.lock().unwrap().visible().unwrap(), &conversations));
    }
}
