//! The application run loop: the single UI-affine execution context every
//! router and coordinator operation happens on.

use std::io::stdout;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use snafu::ResultExt;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::coordinator::{Coordinator, CoordinatorId, FinishHandle};
use crate::error::{Result, TerminalSnafu};
use crate::host::SharedHost;
use crate::presentable::{Input, Outcome};
use crate::router::{RootRouter, ScopeId};
use crate::terminal::{TerminalHost, modal_area};

/// Main application handle.
///
/// Owns the terminal, the [`TerminalHost`] layer stack, and the root
/// coordinator. Creates the application's single [`RootRouter`] at startup
/// and hands it to the setup closure; the router scope is torn down only
/// when the process exits.
pub struct Application;

impl Application {
    pub fn new() -> Self {
        Self
    }

    /// Build the root coordinator from the root router and run until it
    /// finishes, the user quits, or a flow fails.
    pub fn run<F>(self, setup: F) -> Result<()>
    where
        F: FnOnce(RootRouter) -> Result<Box<dyn Coordinator>>,
    {
        let rt = Runtime::new().context(TerminalSnafu)?;
        let (redraw_tx, redraw_rx) = mpsc::unbounded_channel();
        let host = Arc::new(Mutex::new(TerminalHost::new(redraw_tx.clone())));
        let shared: SharedHost = host.clone();
        let router = RootRouter::new(shared);

        let mut root = setup(router)?;
        let (finish, finished_rx) = FinishHandle::standalone();

        // Starting the root may spawn flow tasks, so enter the runtime first.
        {
            let _guard = rt.enter();
            root.start(finish)?;
        }

        rt.block_on(self.run_loop(host, root, redraw_tx, redraw_rx, finished_rx))
    }

    async fn run_loop(
        &self,
        host: Arc<Mutex<TerminalHost>>,
        mut root: Box<dyn Coordinator>,
        redraw_tx: mpsc::UnboundedSender<()>,
        mut redraw_rx: mpsc::UnboundedReceiver<()>,
        mut finished_rx: mpsc::UnboundedReceiver<CoordinatorId>,
    ) -> Result<()> {
        enable_raw_mode().context(TerminalSnafu)?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen, EnableMouseCapture).context(TerminalSnafu)?;
        let backend = CrosstermBackend::new(out);
        let mut terminal = Terminal::new(backend).context(TerminalSnafu)?;

        let result = self
            .event_loop(&host, &mut root, &redraw_tx, &mut redraw_rx, &mut finished_rx, &mut terminal)
            .await;

        disable_raw_mode().context(TerminalSnafu)?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).context(TerminalSnafu)?;
        terminal.show_cursor().context(TerminalSnafu)?;

        result
    }

    async fn event_loop(
        &self,
        host: &Arc<Mutex<TerminalHost>>,
        root: &mut Box<dyn Coordinator>,
        redraw_tx: &mpsc::UnboundedSender<()>,
        redraw_rx: &mut mpsc::UnboundedReceiver<()>,
        finished_rx: &mut mpsc::UnboundedReceiver<CoordinatorId>,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ) -> Result<()> {
        // Initial frame.
        let _ = redraw_tx.send(());

        loop {
            tokio::select! {
                _ = redraw_rx.recv() => {
                    terminal.draw(|frame| draw_layers(frame, host)).context(TerminalSnafu)?;
                    // The frame is on screen; settle outside the host lock so
                    // completions may drive the routers again.
                    let tickets = lock(host).take_settled();
                    for ticket in tickets {
                        ticket.settle();
                    }
                }
                ready = async { event::poll(Duration::from_millis(100)) } => {
                    if let Ok(true) = ready {
                        let crossterm_event = event::read().context(TerminalSnafu)?;
                        if is_interrupt(&crossterm_event) {
                            return Ok(());
                        }
                        if let Some(input) = map_input(crossterm_event) {
                            if dispatch(host, input) == Outcome::Quit {
                                return Ok(());
                            }
                            let _ = redraw_tx.send(());
                        }
                    }
                }
            }

            root.process()?;
            if finished_rx.try_recv().is_ok() {
                tracing::info!("root coordinator finished, shutting down");
                return Ok(());
            }
        }
    }
}

fn lock(host: &Arc<Mutex<TerminalHost>>) -> MutexGuard<'_, TerminalHost> {
    host.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Draw the layer stack bottom-up; modal layers get a cleared centered sheet.
fn draw_layers(frame: &mut Frame<'_>, host: &Arc<Mutex<TerminalHost>>) {
    let layers = lock(host).layers();
    let area = frame.area();
    for (scope, unit) in layers {
        let target = match scope {
            ScopeId::Root => area,
            ScopeId::Modal(_) => modal_area(area),
        };
        if matches!(scope, ScopeId::Modal(_)) {
            frame.render_widget(ratatui::widgets::Clear, target);
        }
        if let Ok(mut unit) = unit.lock() {
            unit.render(frame, target);
        }
    }
}

/// Input goes to the topmost layer only.
fn dispatch(host: &Arc<Mutex<TerminalHost>>, input: Input) -> Outcome {
    let Some(top) = lock(host).top() else {
        return Outcome::Ignored;
    };
    match top.lock() {
        Ok(mut unit) => unit.handle_input(input),
        Err(_) => Outcome::Ignored,
    }
}

fn map_input(event: CrosstermEvent) -> Option<Input> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Input::Key(key)),
        CrosstermEvent::Mouse(mouse) => Some(Input::Mouse(mouse)),
        CrosstermEvent::Resize(w, h) => Some(Input::Resize(w, h)),
        CrosstermEvent::FocusGained => Some(Input::FocusGained),
        CrosstermEvent::FocusLost => Some(Input::FocusLost),
        CrosstermEvent::Paste(s) => Some(Input::Paste(s)),
        _ => None,
    }
}

/// Ctrl-C always quits, even with no layer attached yet.
fn is_interrupt(event: &CrosstermEvent) -> bool {
    matches!(
        event,
        CrosstermEvent::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
    )
}
