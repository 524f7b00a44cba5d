//! Root coordinator: owns the application-level flow from the welcome
//! screen through sign-in to the conversation list.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use wayfinder::{Children, Coordinator, Error, FinishHandle, Result, RootRouter, Router, share};

use crate::auth::AuthCoordinator;
use crate::screens::{ConversationsScreen, WelcomeScreen};

#[derive(Debug)]
pub enum AppEvent {
    SignInRequested,
}

pub struct AppCoordinator {
    router: Arc<Mutex<RootRouter>>,
    children: Children,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    finish: Option<FinishHandle>,
    started: bool,
}

impl AppCoordinator {
    pub fn new(router: RootRouter) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            router: Arc::new(Mutex::new(router)),
            children: Children::new(),
            events_tx,
            events_rx,
            finish: None,
            started: false,
        }
    }

    fn router(&self) -> Result<MutexGuard<'_, RootRouter>> {
        self.router.lock().map_err(|_| Error::LockPoisoned)
    }
}

impl Coordinator for AppCoordinator {
    fn start(&mut self, finish: FinishHandle) -> Result<()> {
        if self.started {
            tracing::error!("app coordinator started twice");
            return Err(Error::AlreadyStarted { id: finish.id() });
        }
        self.started = true;
        self.router()?
            .set_root(share(WelcomeScreen::new(self.events_tx.clone())), false, None);
        self.finish = Some(finish);
        Ok(())
    }

    fn process(&mut self) -> Result<()> {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AppEvent::SignInRequested => {
                    // A second Enter while auth is already running is a no-op.
                    if self.children.is_empty() {
                        self.children
                            .add_and_start(Box::new(AuthCoordinator::new(self.router.clone())))?;
                    }
                }
            }
        }

        self.children.process_all()?;
        for id in self.children.reap() {
            tracing::info!(%id, "auth flow finished, showing conversations");
            self.router()?
                .set_root(share(ConversationsScreen::new()), false, None);
        }
        Ok(())
    }
}
