pub mod keyboard;
pub mod movement;
pub mod window;

pub use keyboard::{KeyCode, KeyEvent, KeyState, Modifiers};
pub use movement::MovementEvent;
pub use window::{WindowEvent, WindowEventKind, WindowGeometry};

use crate::error::{BasiliskError, Result};
use crate::window::Window;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Instant;

/// Идентификатор окна-источника событий
pub type WindowId = u64;

/// Невладеющая ссылка на окно, породившее событие.
///
/// Событие никогда не продлевает жизнь окна: после закрытия окна
/// `upgrade()` возвращает `None`.
#[derive(Clone)]
pub struct WindowRef {
    id: WindowId,
    handle: Weak<dyn Window>,
}

impl WindowRef {
    pub fn new<W: Window + 'static>(window: &Arc<W>) -> Self {
        let handle: Weak<W> = Arc::downgrade(window);
        Self {
            id: window.id(),
            handle,
        }
    }

    /// Ссылка без живого окна (синтетические события, тесты)
    pub fn detached(id: WindowId) -> Self {
        let handle: Weak<dyn Window> = Weak::<crate::window::HeadlessWindow>::new();
        Self { id, handle }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn upgrade(&self) -> Option<Arc<dyn Window>> {
        self.handle.upgrade()
    }

    pub fn get(&self) -> Result<Arc<dyn Window>> {
        self.upgrade().ok_or(BasiliskError::WindowGone(self.id))
    }
}

impl PartialEq for WindowRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WindowRef {}

impl fmt::Debug for WindowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowRef")
            .field("id", &self.id)
            .field("alive", &(self.handle.strong_count() > 0))
            .finish()
    }
}

/// Событие, распространяемое через Topic и Spool.
///
/// Набор вариантов закрыт: обработчики разбирают событие через `match`.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key(KeyEvent),
    Movement(MovementEvent),
    Window(WindowEvent),
}

impl Event {
    pub fn description(&self) -> &'static str {
        match self {
            Event::Key(_) => "key pressed/released event",
            Event::Movement(_) => "pointer movement event",
            Event::Window(_) => "window lifecycle event",
        }
    }

    /// Окно, породившее событие
    pub fn window(&self) -> &WindowRef {
        match self {
            Event::Key(e) => e.window(),
            Event::Movement(e) => e.window(),
            Event::Window(e) => e.window(),
        }
    }

    pub fn time(&self) -> Instant {
        match self {
            Event::Key(e) => e.time(),
            Event::Movement(e) => e.time(),
            Event::Window(e) => e.time(),
        }
    }

    pub fn as_key(&self) -> Option<&KeyEvent> {
        match self {
            Event::Key(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Key(e) => write!(f, "{}", e),
            Event::Movement(e) => write!(f, "{}", e),
            Event::Window(e) => write!(f, "{}", e),
        }
    }
}

impl From<KeyEvent> for Event {
    fn from(event: KeyEvent) -> Self {
        Event::Key(event)
    }
}

impl From<MovementEvent> for Event {
    fn from(event: MovementEvent) -> Self {
        Event::Movement(event)
    }
}

impl From<WindowEvent> for Event {
    fn from(event: WindowEvent) -> Self {
        Event::Window(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_description_per_variant() {
        let key: Event = KeyEvent::press(KeyCode::Q, Modifiers::new(), WindowRef::detached(1)).into();
        let movement: Event = MovementEvent::new((3, 4), WindowRef::detached(1)).into();

        assert_eq!(key.description(), "key pressed/released event");
        assert_eq!(movement.description(), "pointer movement event");
        assert!(key.as_key().is_some());
        assert!(movement.as_key().is_none());
    }

    #[test]
    fn test_detached_window_ref() {
        let window = WindowRef::detached(7);
        assert_eq!(window.id(), 7);
        assert!(window.upgrade().is_none());
        assert!(matches!(window.get(), Err(BasiliskError::WindowGone(7))));
    }

    #[test]
    fn test_window_ref_does_not_keep_window_alive() {
        let (window, _input) = crate::window::HeadlessWindow::open("ref", (10, 10));
        let origin = WindowRef::new(&window);

        assert_eq!(origin.id(), window.id());
        assert_eq!(origin.get().unwrap().dimensions().unwrap(), (10, 10));

        drop(window);
        assert!(origin.upgrade().is_none());
        assert!(matches!(origin.get(), Err(BasiliskError::WindowGone(_))));
    }
}
