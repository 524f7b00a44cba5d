//! Terminal host: the concrete crossterm/ratatui environment the routers
//! drive.
//!
//! Visible content is a bottom-up stack of layers, one per scope: the root
//! layer plus any presented modal contexts. A terminal has no real
//! transition animation; an animated transition counts as visually settled
//! once the frame containing it has been drawn, so tickets are parked here
//! and handed back to the loop after each draw.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use tokio::sync::mpsc;

use crate::host::{Host, SettleTicket};
use crate::presentable::SharedPresentable;
use crate::router::ScopeId;

pub struct TerminalHost {
    layers: Vec<(ScopeId, SharedPresentable)>,
    pending: Vec<SettleTicket>,
    redraw_tx: mpsc::UnboundedSender<()>,
}

impl TerminalHost {
    pub fn new(redraw_tx: mpsc::UnboundedSender<()>) -> Self {
        Self {
            layers: Vec::new(),
            pending: Vec::new(),
            redraw_tx,
        }
    }

    /// Snapshot of the visible layers, bottom-up. Cloned out so the caller
    /// renders without holding the host lock.
    pub fn layers(&self) -> Vec<(ScopeId, SharedPresentable)> {
        self.layers.clone()
    }

    /// The topmost visible unit; input goes here.
    pub fn top(&self) -> Option<SharedPresentable> {
        self.layers.last().map(|(_, unit)| unit.clone())
    }

    /// Hand back the tickets of transitions drawn since the last call. The
    /// loop settles them after releasing the host lock.
    pub fn take_settled(&mut self) -> Vec<SettleTicket> {
        std::mem::take(&mut self.pending)
    }

    fn request_redraw(&self) {
        let _ = self.redraw_tx.send(());
    }
}

impl Host for TerminalHost {
    fn attach(&mut self, scope: ScopeId, unit: SharedPresentable, animated: bool, ticket: SettleTicket) {
        match self.layers.iter_mut().find(|(id, _)| *id == scope) {
            Some(layer) => layer.1 = unit,
            None => self.layers.push((scope, unit)),
        }
        if animated {
            self.pending.push(ticket);
        }
        self.request_redraw();
    }

    fn detach(&mut self, scope: ScopeId, animated: bool, ticket: SettleTicket) {
        self.layers.retain(|(id, _)| *id != scope);
        if animated {
            self.pending.push(ticket);
        }
        self.request_redraw();
    }
}

/// Area a modal layer is drawn into: a centered sheet above the root.
pub fn modal_area(area: Rect) -> Rect {
    let [horizontal] = Layout::horizontal([Constraint::Percentage(70)])
        .flex(Flex::Center)
        .areas(area);
    let [vertical] = Layout::vertical([Constraint::Percentage(70)])
        .flex(Flex::Center)
        .areas(horizontal);
    vertical
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_area_is_centered_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = modal_area(outer);
        assert!(inner.width < outer.width);
        assert!(inner.height < outer.height);
        assert!(inner.x > 0 && inner.y > 0);
        assert!(inner.right() <= outer.right() && inner.bottom() <= outer.bottom());
    }
}
