//! Sign-in flow: presents the login screen and reports completion to the
//! parent once a session is established.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use wayfinder::{Coordinator, Error, FinishHandle, FlowTasks, Result, RootRouter, Router, share};

use crate::screens::LoginScreen;

#[derive(Debug)]
pub enum AuthEvent {
    /// The login screen validated the form; domain work may begin.
    Credentials { email: String },
    /// The (stubbed) sign-in request came back.
    SessionReady,
}

pub struct AuthCoordinator {
    router: Arc<Mutex<RootRouter>>,
    events_tx: mpsc::UnboundedSender<AuthEvent>,
    events_rx: mpsc::UnboundedReceiver<AuthEvent>,
    finish: Option<FinishHandle>,
    started: bool,
    tasks: FlowTasks,
}

impl AuthCoordinator {
    pub fn new(router: Arc<Mutex<RootRouter>>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            router,
            events_tx,
            events_rx,
            finish: None,
            started: false,
            tasks: FlowTasks::new(),
        }
    }

    fn router(&self) -> Result<MutexGuard<'_, RootRouter>> {
        self.router.lock().map_err(|_| Error::LockPoisoned)
    }
}

impl Coordinator for AuthCoordinator {
    fn start(&mut self, finish: FinishHandle) -> Result<()> {
        if self.started {
            tracing::error!("auth coordinator started twice");
            return Err(Error::AlreadyStarted { id: finish.id() });
        }
        self.started = true;
        self.router()?
            .set_root(share(LoginScreen::new(self.events_tx.clone())), false, None);
        self.finish = Some(finish);
        Ok(())
    }

    fn process(&mut self) -> Result<()> {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AuthEvent::Credentials { email } => {
                    tracing::info!(%email, "credentials accepted, signing in");
                    let done = self.events_tx.clone();
                    // Stand-in for the real sign-in request.
                    self.tasks.spawn(async move {
                        tokio::time::sleep(Duration::from_millis(400)).await;
                        let _ = done.send(AuthEvent::SessionReady);
                    });
                }
                AuthEvent::SessionReady => {
                    tracing::info!("session established, auth flow done");
                    self.tasks.abort_all();
                    if let Some(finish) = self.finish.take() {
                        finish.finished();
                    }
                }
            }
        }
        Ok(())
    }
}
