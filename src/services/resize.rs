use crate::bus::Publisher;
use crate::debug_if_enabled;
use crate::error::{BasiliskError, Result};
use crate::events::{Event, KeyCode, KeyEvent};
use std::sync::Arc;
use tracing::info;

/// Меняет размер окна-источника по Ctrl+= и Ctrl+-
#[derive(Debug, Clone, Copy)]
pub struct ResizeHandler {
    step: u32,
}

impl ResizeHandler {
    pub fn new(step: u32) -> Self {
        Self { step }
    }
}

impl Publisher for ResizeHandler {
    fn publish(&self, event: Arc<Event>) -> Result<()> {
        let Event::Key(key) = &*event else {
            return Ok(());
        };
        if !key.is_press() || !key.is_control_pressed() {
            return Ok(());
        }

        let grow = match key.code() {
            KeyCode::Equals => true,
            KeyCode::Dash => false,
            _ => return Ok(()),
        };

        match self.resize(key, grow) {
            // Окно могло закрыться, пока событие ждало в очереди
            Err(BasiliskError::WindowGone(id)) => {
                debug_if_enabled!("Окно {} уже закрыто, изменение размера пропущено", id);
                Ok(())
            }
            result => result,
        }
    }
}

impl ResizeHandler {
    fn resize(&self, key: &KeyEvent, grow: bool) -> Result<()> {
        let window = key.window().get()?;
        let (width, height) = window.dimensions()?;
        let resized = if grow {
            (width.saturating_add(self.step), height.saturating_add(self.step))
        } else {
            (
                width.saturating_sub(self.step).max(1),
                height.saturating_sub(self.step).max(1),
            )
        };
        window.set_dimensions(resized)?;

        info!(
            "Окно {}: размер {}x{} -> {}x{}",
            window.id(),
            width,
            height,
            resized.0,
            resized.1
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::handler_fn;
    use crate::events::{Modifiers, WindowRef};
    use crate::window::{HeadlessWindow, Window};

    fn ctrl_press(code: KeyCode, window: WindowRef) -> Arc<Event> {
        Arc::new(KeyEvent::press(code, Modifiers::new().with_ctrl(true), window).into())
    }

    #[test]
    fn test_resize_grows_and_shrinks() {
        let (window, _input) = HeadlessWindow::open("resize", (500, 600));
        let handler = ResizeHandler::new(50);
        let origin = WindowRef::new(&window);

        handler.publish(ctrl_press(KeyCode::Equals, origin.clone())).unwrap();
        assert_eq!(window.dimensions().unwrap(), (550, 650));

        handler.publish(ctrl_press(KeyCode::Dash, origin.clone())).unwrap();
        handler.publish(ctrl_press(KeyCode::Dash, origin)).unwrap();
        assert_eq!(window.dimensions().unwrap(), (450, 550));
    }

    #[test]
    fn test_resize_ignores_plain_keys() {
        let (window, _input) = HeadlessWindow::open("plain", (100, 100));
        let handler = ResizeHandler::new(10);
        let event: Arc<Event> =
            Arc::new(KeyEvent::press(KeyCode::Equals, Modifiers::new(), WindowRef::new(&window)).into());

        handler.publish(event).unwrap();
        assert_eq!(window.dimensions().unwrap(), (100, 100));
    }

    #[test]
    fn test_resize_skips_dropped_window() {
        let handler = ResizeHandler::new(10);
        let result = handler.publish(ctrl_press(KeyCode::Equals, WindowRef::detached(42)));
        assert!(result.is_ok());
    }

    #[test]
    fn test_resize_after_event_loop_closed_is_noop() {
        let (window, input) = HeadlessWindow::open("closing", (500, 600));
        let origin = WindowRef::new(&window);
        let handle = window.run_event_loop(handler_fn("sink", |_| Ok(()))).unwrap();

        // Окно живо, но его цикл уже завершён
        drop(input);
        handle.join().unwrap();
        assert!(window.is_closed());

        let handler = ResizeHandler::new(10);
        assert!(handler.publish(ctrl_press(KeyCode::Equals, origin)).is_ok());
        assert!(matches!(window.dimensions(), Err(BasiliskError::WindowGone(_))));
    }
}
