//! The `Presentable` capability: anything that can be shown as a screen.

use std::sync::{Arc, Mutex};

use ratatui::layout::Rect;

/// Terminal input forwarded to the visible presentable.
#[derive(Debug, Clone)]
pub enum Input {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize(u16, u16),
    FocusGained,
    FocusLost,
    Paste(String),
}

/// What a presentable did with an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Consumed,
    Ignored,
    Quit,
}

/// A thing that can be shown as a screen.
///
/// Deliberately minimal: a render capability is the displayable unit a router
/// attaches and detaches. Everything else has a do-nothing default so any
/// UI-producing type satisfies the trait without inheriting from a
/// navigation base type. Navigation decisions never live here; screens hand
/// domain events to their coordinator through whatever channel the
/// coordinator gave them at construction.
pub trait Presentable: Send + 'static {
    /// Render into the given area of the frame.
    fn render(&mut self, frame: &mut ratatui::Frame, area: Rect);

    /// Handle an input event while this unit is topmost.
    fn handle_input(&mut self, input: Input) -> Outcome {
        let _ = input;
        Outcome::Ignored
    }

    /// Called when a router attaches this unit to its scope.
    fn on_present(&mut self) {}

    /// Called when a router removes this unit from its scope.
    fn on_dismiss(&mut self) {}
}

/// Shared handle to a displayable unit. The router holding it in its scope
/// and the host layer it is attached to are the only owners; dropping both
/// releases the screen.
pub type SharedPresentable = Arc<Mutex<dyn Presentable>>;

/// Wrap a concrete screen into the shared handle routers take.
pub fn share<P: Presentable>(presentable: P) -> SharedPresentable {
    Arc::new(Mutex::new(presentable))
}
