//! Composable router/coordinator navigation for terminal applications.
//!
//! Coordinators decide which screen to show next; routers own one
//! navigation scope each and mutate the visible layer stack through a host
//! capability. Neither knows about rendering policy or domain logic.

pub mod application;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod l10n;
pub mod presentable;
pub mod router;
pub mod tasks;
pub mod terminal;

pub use error::{Error, Result};

// Re-export common types for convenience
pub use application::Application;
pub use coordinator::{Children, Coordinator, CoordinatorId, FinishHandle};
pub use host::{Host, SettleTicket, SharedHost};
pub use presentable::{Input, Outcome, Presentable, SharedPresentable, share};
pub use router::{Completion, ModalRouter, RootRouter, Router, ScopeId, StackRouter, TransitionResult};
pub use tasks::FlowTasks;
pub use terminal::TerminalHost;
