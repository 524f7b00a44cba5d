//! Host UI capability the routers drive.
//!
//! The core never renders or animates anything itself. A [`Host`] supplies
//! the two primitives the routers need: attach a displayable unit to a scope
//! and detach it again, optionally animated. Animated transitions hand the
//! host a [`SettleTicket`]; the host settles it once the transition is
//! visually settled, which releases the pending completion callback.

use std::sync::{Arc, Mutex};

use crate::error::Error;
use crate::presentable::SharedPresentable;
use crate::router::{Completion, ScopeId};

/// Host environment capability.
///
/// Contract for animated calls: the ticket must be settled strictly after
/// `attach`/`detach` returns, on the same execution context as the request.
/// Settling re-entrantly from inside these methods would run the caller's
/// completion while the router still holds the host lock. Non-animated
/// tickets may be dropped; the router settles those itself before its call
/// returns.
pub trait Host: Send + 'static {
    /// Make `unit` the visible content of `scope`, replacing any prior unit.
    fn attach(&mut self, scope: ScopeId, unit: SharedPresentable, animated: bool, ticket: SettleTicket);

    /// Remove the visible content of `scope`, revealing whatever lies beneath.
    fn detach(&mut self, scope: ScopeId, animated: bool, ticket: SettleTicket);
}

/// Shared handle to the host, cloned into every router scoped to it.
pub type SharedHost = Arc<Mutex<dyn Host>>;

/// Tracks the single transition allowed in flight on one router scope.
///
/// Each new transition bumps the generation; a settle carrying a stale
/// generation finds nothing pending and is ignored, which is how a
/// superseded transition's completion is guaranteed never to fire.
#[derive(Clone, Default)]
pub(crate) struct TransitionSlot {
    inner: Arc<Mutex<SlotInner>>,
}

#[derive(Default)]
struct SlotInner {
    generation: u64,
    pending: Option<Pending>,
}

struct Pending {
    generation: u64,
    completion: Option<Completion>,
}

impl TransitionSlot {
    /// Begin a transition, superseding any pending one. The superseded
    /// completion is dropped unfired. Returns the new generation.
    pub(crate) fn begin(&self, completion: Option<Completion>) -> u64 {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.generation += 1;
        let generation = inner.generation;
        if let Some(old) = inner.pending.take() {
            tracing::debug!(superseded = old.generation, by = generation, "transition superseded in flight");
        }
        inner.pending = Some(Pending { generation, completion: Some(completion.unwrap_or_else(|| Box::new(|_| {}))) });
        generation
    }

    /// Settle the transition with the given generation. Stale generations
    /// are ignored. The completion runs outside the slot lock.
    pub(crate) fn settle(&self, generation: u64) {
        let completion = {
            let mut inner = match self.inner.lock() {
                Ok(inner) => inner,
                Err(poisoned) => poisoned.into_inner(),
            };
            match &mut inner.pending {
                Some(pending) if pending.generation == generation => {
                    let completion = pending.completion.take();
                    inner.pending = None;
                    completion
                }
                _ => None,
            }
        };
        if let Some(completion) = completion {
            completion(Ok(()));
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        match self.inner.lock() {
            Ok(inner) => inner.pending.is_some(),
            Err(poisoned) => poisoned.into_inner().pending.is_some(),
        }
    }

    pub(crate) fn ticket(&self, generation: u64) -> SettleTicket {
        SettleTicket {
            slot: self.clone(),
            generation,
        }
    }
}

/// One-shot token for a transition in flight. Settling it fires the pending
/// completion, unless a later transition superseded this one.
pub struct SettleTicket {
    slot: TransitionSlot,
    generation: u64,
}

impl SettleTicket {
    /// Mark the transition as visually settled.
    pub fn settle(self) {
        self.slot.settle(self.generation);
    }
}

impl std::fmt::Debug for SettleTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettleTicket({})", self.generation)
    }
}

/// Deliver a rejection through the completion channel. The violation is
/// logged where it is detected; this only carries the failure to the caller.
pub(crate) fn reject(completion: Option<Completion>, error: Error) {
    if let Some(completion) = completion {
        completion(Err(error));
    }
}
