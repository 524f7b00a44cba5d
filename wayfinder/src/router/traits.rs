//! The router contract shared by root, modal and stack routers.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::presentable::SharedPresentable;

/// Global counter for modal scope identifiers.
static NEXT_MODAL_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies the navigation scope a router governs: the application root,
/// or one modal context layered above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeId {
    Root,
    Modal(u64),
}

impl ScopeId {
    pub(crate) fn next_modal() -> Self {
        ScopeId::Modal(NEXT_MODAL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeId::Root => write!(f, "root"),
            ScopeId::Modal(id) => write!(f, "modal#{id}"),
        }
    }
}

/// Outcome delivered through a transition's completion callback.
pub type TransitionResult = crate::Result<()>;

/// Completion callback for one transition. Fires exactly once for an
/// accepted or rejected call; never fires if a later `set_root` superseded
/// the transition while it was in flight.
pub type Completion = Box<dyn FnOnce(TransitionResult) + Send>;

/// A router owning one navigation scope.
///
/// All methods must be called from the single UI-affine execution context.
/// Failures are reported through the completion callback, never swallowed.
pub trait Router: Send {
    /// Replace whatever is currently visible in this scope with `module`.
    ///
    /// Always succeeds structurally; the previously visible unit is
    /// released. A transition still in flight is superseded and its
    /// completion is invalidated.
    fn set_root(&mut self, module: SharedPresentable, animated: bool, completion: Option<Completion>);

    /// Remove the currently visible unit, revealing whatever the host
    /// considers "below" this scope.
    ///
    /// Rejected with [`crate::Error::DismissOnEmpty`] when nothing is
    /// presented, and with [`crate::Error::TransitionInFlight`] while a
    /// transition is pending.
    fn dismiss(&mut self, animated: bool, completion: Option<Completion>);

    /// The unit currently visible in this scope, if any.
    fn visible(&self) -> Option<SharedPresentable>;

    /// Whether a transition is pending on this scope.
    fn is_busy(&self) -> bool;

    /// The scope this router governs.
    fn scope(&self) -> ScopeId;

    fn is_empty(&self) -> bool {
        self.visible().is_none()
    }
}
