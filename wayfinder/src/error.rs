use snafu::prelude::*;

use crate::coordinator::CoordinatorId;
use crate::router::ScopeId;

/// Navigation core errors.
///
/// The first four variants are broken navigation invariants. They are logged
/// at error level where they are detected and then delivered through the same
/// completion/Result channel as success, so callers can tell "transition
/// happened" from "transition rejected".
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("dismiss on empty {scope} scope"))]
    DismissOnEmpty { scope: ScopeId },

    #[snafu(display("transition already in flight on {scope} scope"))]
    TransitionInFlight { scope: ScopeId },

    #[snafu(display("coordinator {id} started twice"))]
    AlreadyStarted { id: CoordinatorId },

    #[snafu(display("no child coordinator {id}"))]
    UnknownChild { id: CoordinatorId },

    #[snafu(display("failed to lock mutex: poisoned"))]
    LockPoisoned,

    #[snafu(display("terminal error: {source}"))]
    Terminal { source: std::io::Error },

    #[snafu(display("string catalog already installed"))]
    CatalogInstalled,

    #[snafu(display("malformed string catalog: {source}"))]
    CatalogParse { source: serde_json::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
