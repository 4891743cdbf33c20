use crate::bus::Publisher;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::{Event, WindowId};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone, Copy)]
struct Keystroke {
    time: Instant,
    character: char,
}

/// Собирает набранный текст по окнам и печатает его в лог.
///
/// Spool не упорядочивает задания между потоками, поэтому нажатия
/// хранятся отсортированными по времени события, а текст собирается
/// из них при чтении.
#[derive(Debug, Default)]
pub struct EchoHandler {
    buffers: DashMap<WindowId, Vec<Keystroke>>,
}

fn render(strokes: &[Keystroke]) -> String {
    let mut text = String::with_capacity(strokes.len());
    for stroke in strokes {
        if stroke.character == '\u{8}' {
            text.pop();
        } else {
            text.push(stroke.character);
        }
    }
    text
}

impl EchoHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Текст, набранный в окне на данный момент
    pub fn text(&self, window: WindowId) -> String {
        self.buffers
            .get(&window)
            .map(|entry| render(entry.value()))
            .unwrap_or_default()
    }

    pub fn windows(&self) -> Vec<WindowId> {
        let mut ids: Vec<WindowId> = self.buffers.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }
}

impl Publisher for EchoHandler {
    fn publish(&self, event: Arc<Event>) -> Result<()> {
        let Event::Key(key) = &*event else {
            return Ok(());
        };
        if !key.is_press() || !key.is_character() || key.is_control_pressed() {
            return Ok(());
        }

        let c = key.to_character()?;
        let window = key.window().id();
        let mut strokes = self.buffers.entry(window).or_default();
        let position = strokes.partition_point(|stroke| stroke.time <= key.time());
        strokes.insert(
            position,
            Keystroke {
                time: key.time(),
                character: c,
            },
        );

        debug_if_enabled!("Окно {}: символ {:?}", window, c);
        if c == '\n' {
            info!("Окно {}: {}", window, render(&strokes).trim_end());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KeyCode, KeyEvent, Modifiers, MovementEvent, WindowRef};

    fn press(code: KeyCode, modifiers: Modifiers, window: WindowId) -> Arc<Event> {
        Arc::new(KeyEvent::press(code, modifiers, WindowRef::detached(window)).into())
    }

    #[test]
    fn test_echo_collects_per_window() {
        let echo = EchoHandler::new();
        let shift = Modifiers::new().with_shift(true);

        echo.publish(press(KeyCode::H, shift, 1)).unwrap();
        echo.publish(press(KeyCode::I, Modifiers::new(), 1)).unwrap();
        echo.publish(press(KeyCode::Number1, shift, 1)).unwrap();
        echo.publish(press(KeyCode::X, Modifiers::new(), 2)).unwrap();

        assert_eq!(echo.text(1), "Hi!");
        assert_eq!(echo.text(2), "x");
        assert_eq!(echo.windows(), vec![1, 2]);
    }

    #[test]
    fn test_echo_ignores_non_characters_and_releases() {
        let echo = EchoHandler::new();
        let window = WindowRef::detached(1);

        echo.publish(press(KeyCode::F2, Modifiers::new(), 1)).unwrap();
        echo.publish(press(KeyCode::C, Modifiers::new().with_ctrl(true), 1)).unwrap();
        echo.publish(Arc::new(KeyEvent::release(KeyCode::A, Modifiers::new(), window.clone()).into()))
            .unwrap();
        echo.publish(Arc::new(MovementEvent::new((1, 1), window).into())).unwrap();

        assert_eq!(echo.text(1), "");
    }

    #[test]
    fn test_backspace_removes_last_character() {
        let echo = EchoHandler::new();
        echo.publish(press(KeyCode::A, Modifiers::new(), 1)).unwrap();
        echo.publish(press(KeyCode::B, Modifiers::new(), 1)).unwrap();
        echo.publish(press(KeyCode::BackSpace, Modifiers::new(), 1)).unwrap();

        assert_eq!(echo.text(1), "a");
    }

    #[test]
    fn test_out_of_order_delivery_keeps_typing_order() {
        let echo = EchoHandler::new();
        let mut events = Vec::new();
        for code in [KeyCode::A, KeyCode::B, KeyCode::BackSpace, KeyCode::C] {
            events.push(press(code, Modifiers::new(), 1));
            std::thread::sleep(std::time::Duration::from_millis(1));
        }

        // Рабочие потоки могут выполнить задания в любом порядке
        for index in [3, 0, 2, 1] {
            echo.publish(Arc::clone(&events[index])).unwrap();
        }

        assert_eq!(echo.text(1), "ac");
    }
}
