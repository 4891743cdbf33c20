/// Атом протокола ICCCM, которым оконный менеджер просит закрыть окно
pub const WM_DELETE_WINDOW: u64 = 0x1d8;

/// Необработанный ввод в том виде, в каком его отдаёт бэкенд окон
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    KeyPress { keycode: u32, state: u32, x: i32, y: i32 },
    KeyRelease { keycode: u32, state: u32, x: i32, y: i32 },
    Motion { x: i32, y: i32 },
    Expose,
    Configure { x: i32, y: i32, width: u32, height: u32 },
    ClientMessage { atom: u64 },
}

impl RawInput {
    pub fn is_close_request(&self) -> bool {
        matches!(self, RawInput::ClientMessage { atom } if *atom == WM_DELETE_WINDOW)
    }
}
