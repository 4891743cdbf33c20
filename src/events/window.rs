use crate::events::WindowRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Геометрия окна
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WindowGeometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl fmt::Display for WindowGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Тип события окна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowEventKind {
    Exposed,
    Resized,
    Moved,
    CloseRequested,
}

/// Событие жизненного цикла окна
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEvent {
    kind: WindowEventKind,
    geometry: WindowGeometry,
    timestamp: Instant,
    window: WindowRef,
}

impl WindowEvent {
    pub fn new(kind: WindowEventKind, geometry: WindowGeometry, window: WindowRef) -> Self {
        Self {
            kind,
            geometry,
            timestamp: Instant::now(),
            window,
        }
    }

    pub fn close_requested(geometry: WindowGeometry, window: WindowRef) -> Self {
        Self::new(WindowEventKind::CloseRequested, geometry, window)
    }

    pub fn kind(&self) -> WindowEventKind {
        self.kind
    }

    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    pub fn time(&self) -> Instant {
        self.timestamp
    }

    pub fn window(&self) -> &WindowRef {
        &self.window
    }
}

impl fmt::Display for WindowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: window={} {} ({}ms ago)",
            self.kind,
            self.window.id(),
            self.geometry,
            self.timestamp.elapsed().as_millis()
        )
    }
}
