//! Routers own one navigation scope's currently visible content.

mod root;
mod stack;
pub mod traits;

pub use root::{ModalRouter, RootRouter};
pub use stack::StackRouter;
pub use traits::{Completion, Router, ScopeId, TransitionResult};
