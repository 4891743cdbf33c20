use crate::events::WindowRef;
use std::fmt;
use std::time::Instant;

/// Перемещение указателя внутри окна
#[derive(Debug, Clone, PartialEq)]
pub struct MovementEvent {
    coordinates: (i32, i32),
    timestamp: Instant,
    window: WindowRef,
}

impl MovementEvent {
    pub fn new(coordinates: (i32, i32), window: WindowRef) -> Self {
        Self {
            coordinates,
            timestamp: Instant::now(),
            window,
        }
    }

    pub fn coordinates(&self) -> (i32, i32) {
        self.coordinates
    }

    pub fn time(&self) -> Instant {
        self.timestamp
    }

    pub fn window(&self) -> &WindowRef {
        &self.window
    }
}

impl fmt::Display for MovementEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Movement window={} to {:?} ({}ms)",
            self.window.id(),
            self.coordinates,
            self.timestamp.elapsed().as_millis()
        )
    }
}
