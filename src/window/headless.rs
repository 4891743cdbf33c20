use crate::basilisk_error;
use crate::bus::Publisher;
use crate::error::{BasiliskError, Result};
use crate::events::{
    Event, KeyCode, KeyEvent, KeyState, Modifiers, MovementEvent, WindowEvent, WindowEventKind,
    WindowGeometry, WindowId, WindowRef,
};
use crate::trace_if_enabled;
use crate::window::{RawInput, Window};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

/// Отправитель необработанного ввода в окно.
/// Цикл событий завершается, когда все отправители удалены.
pub type InputSender = mpsc::UnboundedSender<RawInput>;

#[derive(Debug)]
struct WindowState {
    geometry: WindowGeometry,
    title: String,
    context_bound: bool,
    frames: u64,
    closed: bool,
}

enum Translation {
    Publish(Event),
    Close(Event),
    Ignore,
}

/// Окно без нативного бэкенда: геометрия и контекст хранятся в памяти,
/// ввод поступает через `InputSender`.
pub struct HeadlessWindow {
    id: WindowId,
    state: Mutex<WindowState>,
    input: Mutex<Option<mpsc::UnboundedReceiver<RawInput>>>,
}

impl HeadlessWindow {
    pub fn open(title: &str, dimensions: (u32, u32)) -> (Arc<Self>, InputSender) {
        let id = NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        let window = Arc::new(Self {
            id,
            state: Mutex::new(WindowState {
                geometry: WindowGeometry::new(0, 0, dimensions.0, dimensions.1),
                title: title.to_string(),
                context_bound: false,
                frames: 0,
                closed: false,
            }),
            input: Mutex::new(Some(receiver)),
        });

        info!("Окно {} открыто: \"{}\" {}x{}", id, title, dimensions.0, dimensions.1);
        (window, sender)
    }

    pub fn geometry(&self) -> WindowGeometry {
        self.state.lock().geometry
    }

    pub fn frames(&self) -> u64 {
        self.state.lock().frames
    }

    pub fn is_bound(&self) -> bool {
        self.state.lock().context_bound
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Запустить цикл событий в отдельном потоке.
    ///
    /// Каждый распознанный ввод публикуется в `sink`. Цикл завершается по
    /// запросу закрытия (`WM_DELETE_WINDOW`) или когда ввод закрыт.
    pub fn run_event_loop<P>(self: &Arc<Self>, sink: P) -> Result<JoinHandle<()>>
    where
        P: Publisher + 'static,
    {
        let input = self
            .input
            .lock()
            .take()
            .ok_or_else(|| basilisk_error!(backend, "цикл событий окна {} уже запущен", self.id))?;

        let window = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(format!("window-{}", self.id))
            .spawn(move || window.event_loop(input, sink))?;

        Ok(handle)
    }

    fn event_loop<P: Publisher>(self: Arc<Self>, mut input: mpsc::UnboundedReceiver<RawInput>, sink: P) {
        let origin = WindowRef::new(&self);
        info!("Окно {}: цикл событий запущен", self.id);

        while let Some(raw) = input.blocking_recv() {
            trace_if_enabled!("Окно {}: ввод {:?}", self.id, raw);

            let (event, last) = match self.translate(&raw, &origin) {
                Translation::Publish(event) => (event, false),
                Translation::Close(event) => (event, true),
                Translation::Ignore => continue,
            };

            if let Err(e) = sink.publish(Arc::new(event)) {
                warn!("Окно {}: не удалось опубликовать событие: {}", self.id, e);
            }

            if last {
                info!("Окно {}: получен запрос закрытия", self.id);
                break;
            }
        }

        self.release();
        info!("Окно {}: цикл событий завершён", self.id);
    }

    fn translate(&self, raw: &RawInput, origin: &WindowRef) -> Translation {
        match *raw {
            RawInput::KeyPress { keycode, state, x, y } => {
                Self::key(keycode, KeyState::Pressed, state, (x, y), origin)
            }
            RawInput::KeyRelease { keycode, state, x, y } => {
                Self::key(keycode, KeyState::Released, state, (x, y), origin)
            }
            RawInput::Motion { x, y } => {
                Translation::Publish(MovementEvent::new((x, y), origin.clone()).into())
            }
            RawInput::Expose => {
                let geometry = self.geometry();
                Translation::Publish(WindowEvent::new(WindowEventKind::Exposed, geometry, origin.clone()).into())
            }
            RawInput::Configure { x, y, width, height } => {
                let geometry = WindowGeometry::new(x, y, width, height);
                let previous = std::mem::replace(&mut self.state.lock().geometry, geometry);
                let kind = if previous.dimensions() != geometry.dimensions() {
                    WindowEventKind::Resized
                } else if previous.position() != geometry.position() {
                    WindowEventKind::Moved
                } else {
                    return Translation::Ignore;
                };
                Translation::Publish(WindowEvent::new(kind, geometry, origin.clone()).into())
            }
            RawInput::ClientMessage { .. } if raw.is_close_request() => {
                Translation::Close(WindowEvent::close_requested(self.geometry(), origin.clone()).into())
            }
            RawInput::ClientMessage { atom } => {
                debug!("Окно {}: неизвестное сообщение клиента {:#x}", self.id, atom);
                Translation::Ignore
            }
        }
    }

    fn key(keycode: u32, key_state: KeyState, mask: u32, position: (i32, i32), origin: &WindowRef) -> Translation {
        match KeyCode::from_raw(keycode) {
            Some(code) => Translation::Publish(
                KeyEvent::new(code, key_state, Modifiers::from_x_state(mask), position, origin.clone()).into(),
            ),
            None => {
                debug!("Окно {}: неизвестный код клавиши {}, событие пропущено", origin.id(), keycode);
                Translation::Ignore
            }
        }
    }

    fn release(&self) {
        let mut state = self.state.lock();
        state.context_bound = false;
        state.closed = true;
    }

    fn with_open_state<T>(&self, f: impl FnOnce(&mut WindowState) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(BasiliskError::WindowGone(self.id));
        }
        f(&mut state)
    }
}

impl Window for HeadlessWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn position(&self) -> Result<(i32, i32)> {
        self.with_open_state(|state| Ok(state.geometry.position()))
    }

    fn set_position(&self, position: (i32, i32)) -> Result<()> {
        self.with_open_state(|state| {
            state.geometry.x = position.0;
            state.geometry.y = position.1;
            Ok(())
        })
    }

    fn dimensions(&self) -> Result<(u32, u32)> {
        self.with_open_state(|state| Ok(state.geometry.dimensions()))
    }

    fn set_dimensions(&self, dimensions: (u32, u32)) -> Result<()> {
        self.with_open_state(|state| {
            state.geometry.width = dimensions.0;
            state.geometry.height = dimensions.1;
            Ok(())
        })
    }

    fn title(&self) -> Result<String> {
        self.with_open_state(|state| Ok(state.title.clone()))
    }

    fn set_title(&self, title: &str) -> Result<()> {
        self.with_open_state(|state| {
            state.title = title.to_string();
            Ok(())
        })
    }

    fn bind(&self) -> Result<()> {
        self.with_open_state(|state| {
            state.context_bound = true;
            Ok(())
        })
    }

    fn unbind(&self) -> Result<()> {
        self.with_open_state(|state| {
            state.context_bound = false;
            Ok(())
        })
    }

    fn swap(&self) -> Result<()> {
        let id = self.id;
        self.with_open_state(|state| {
            if !state.context_bound {
                return Err(basilisk_error!(backend, "окно {}: swap без привязанного контекста", id));
            }
            state.frames += 1;
            Ok(())
        })
    }
}
