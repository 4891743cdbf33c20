use crate::error::{BasiliskError, Result};
use crate::events::WindowRef;
use crate::mappings::KeyToChar;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Состояние клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Физический код клавиши (нумерация X11)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u32)]
pub enum KeyCode {
    Esc = 9,
    Number1 = 10,
    Number2 = 11,
    Number3 = 12,
    Number4 = 13,
    Number5 = 14,
    Number6 = 15,
    Number7 = 16,
    Number8 = 17,
    Number9 = 18,
    Number0 = 19,
    Dash = 20,
    Equals = 21,
    BackSpace = 22,
    Tab = 23,
    Q = 24,
    W = 25,
    E = 26,
    R = 27,
    T = 28,
    Y = 29,
    U = 30,
    I = 31,
    O = 32,
    P = 33,
    LeftBracket = 34,
    RightBracket = 35,
    Return = 36,
    LeftControl = 37,
    A = 38,
    S = 39,
    D = 40,
    F = 41,
    G = 42,
    H = 43,
    J = 44,
    K = 45,
    L = 46,
    Semicolon = 47,
    Quote = 48,
    BackTick = 49,
    LeftShift = 50,
    BackSlash = 51,
    Z = 52,
    X = 53,
    C = 54,
    V = 55,
    B = 56,
    N = 57,
    M = 58,
    Comma = 59,
    Period = 60,
    ForwardSlash = 61,
    RightShift = 62,
    Asterisk = 63,
    LeftAlternate = 64,
    Space = 65,
    CapsLock = 66,
    F1 = 67,
    F2 = 68,
    F3 = 69,
    F4 = 70,
    F5 = 71,
    F6 = 72,
    F7 = 73,
    F8 = 74,
    F9 = 75,
    F10 = 76,
    F11 = 95,
    F12 = 96,
    Up = 111,
    Left = 113,
    Right = 114,
    Down = 116,
}

impl KeyCode {
    pub const ALL: [KeyCode; 74] = [
        KeyCode::Esc,
        KeyCode::Number1,
        KeyCode::Number2,
        KeyCode::Number3,
        KeyCode::Number4,
        KeyCode::Number5,
        KeyCode::Number6,
        KeyCode::Number7,
        KeyCode::Number8,
        KeyCode::Number9,
        KeyCode::Number0,
        KeyCode::Dash,
        KeyCode::Equals,
        KeyCode::BackSpace,
        KeyCode::Tab,
        KeyCode::Q,
        KeyCode::W,
        KeyCode::E,
        KeyCode::R,
        KeyCode::T,
        KeyCode::Y,
        KeyCode::U,
        KeyCode::I,
        KeyCode::O,
        KeyCode::P,
        KeyCode::LeftBracket,
        KeyCode::RightBracket,
        KeyCode::Return,
        KeyCode::LeftControl,
        KeyCode::A,
        KeyCode::S,
        KeyCode::D,
        KeyCode::F,
        KeyCode::G,
        KeyCode::H,
        KeyCode::J,
        KeyCode::K,
        KeyCode::L,
        KeyCode::Semicolon,
        KeyCode::Quote,
        KeyCode::BackTick,
        KeyCode::LeftShift,
        KeyCode::BackSlash,
        KeyCode::Z,
        KeyCode::X,
        KeyCode::C,
        KeyCode::V,
        KeyCode::B,
        KeyCode::N,
        KeyCode::M,
        KeyCode::Comma,
        KeyCode::Period,
        KeyCode::ForwardSlash,
        KeyCode::RightShift,
        KeyCode::Asterisk,
        KeyCode::LeftAlternate,
        KeyCode::Space,
        KeyCode::CapsLock,
        KeyCode::F1,
        KeyCode::F2,
        KeyCode::F3,
        KeyCode::F4,
        KeyCode::F5,
        KeyCode::F6,
        KeyCode::F7,
        KeyCode::F8,
        KeyCode::F9,
        KeyCode::F10,
        KeyCode::F11,
        KeyCode::F12,
        KeyCode::Up,
        KeyCode::Left,
        KeyCode::Right,
        KeyCode::Down,
    ];

    /// Код от бэкенда; неизвестный код означает «событие не создаётся»
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| code.raw() == raw)
    }

    pub fn raw(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.raw())
    }
}

/// Модификаторы клавиш
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_key: bool,
}

impl Modifiers {
    const SHIFT_MASK: u32 = 1 << 0;
    const CONTROL_MASK: u32 = 1 << 2;
    const MOD1_MASK: u32 = 1 << 3;
    const MOD4_MASK: u32 = 1 << 6;

    pub fn new() -> Self {
        Self::default()
    }

    /// Разбор маски состояния X11 (ShiftMask, ControlMask, Mod1Mask, Mod4Mask)
    pub fn from_x_state(state: u32) -> Self {
        Self {
            ctrl: state & Self::CONTROL_MASK != 0,
            alt: state & Self::MOD1_MASK != 0,
            shift: state & Self::SHIFT_MASK != 0,
            super_key: state & Self::MOD4_MASK != 0,
        }
    }

    pub fn to_x_state(self) -> u32 {
        let mut state = 0;
        if self.shift { state |= Self::SHIFT_MASK; }
        if self.ctrl { state |= Self::CONTROL_MASK; }
        if self.alt { state |= Self::MOD1_MASK; }
        if self.super_key { state |= Self::MOD4_MASK; }
        state
    }

    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    pub fn with_alt(mut self, alt: bool) -> Self {
        self.alt = alt;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.super_key
    }

    pub fn to_vec(&self) -> Vec<&'static str> {
        let mut result = Vec::new();
        if self.ctrl { result.push("ctrl"); }
        if self.alt { result.push("alt"); }
        if self.shift { result.push("shift"); }
        if self.super_key { result.push("super"); }
        result
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = self.to_vec();
        if modifiers.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", modifiers.join("+"))
        }
    }
}

/// Событие клавиатуры.
///
/// Все поля фиксируются при создании; методы доступа ничего не пересчитывают.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    code: KeyCode,
    state: KeyState,
    modifiers: Modifiers,
    cursor_position: (i32, i32),
    timestamp: Instant,
    window: WindowRef,
}

impl KeyEvent {
    pub fn new(
        code: KeyCode,
        state: KeyState,
        modifiers: Modifiers,
        cursor_position: (i32, i32),
        window: WindowRef,
    ) -> Self {
        Self {
            code,
            state,
            modifiers,
            cursor_position,
            timestamp: Instant::now(),
            window,
        }
    }

    pub fn press(code: KeyCode, modifiers: Modifiers, window: WindowRef) -> Self {
        Self::new(code, KeyState::Pressed, modifiers, (0, 0), window)
    }

    pub fn release(code: KeyCode, modifiers: Modifiers, window: WindowRef) -> Self {
        Self::new(code, KeyState::Released, modifiers, (0, 0), window)
    }

    pub fn at(mut self, cursor_position: (i32, i32)) -> Self {
        self.cursor_position = cursor_position;
        self
    }

    pub fn code(&self) -> KeyCode {
        self.code
    }

    pub fn state(&self) -> KeyState {
        self.state
    }

    pub fn is_press(&self) -> bool {
        self.state == KeyState::Pressed
    }

    pub fn is_release(&self) -> bool {
        self.state == KeyState::Released
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_shift_pressed(&self) -> bool {
        self.modifiers.shift
    }

    pub fn is_control_pressed(&self) -> bool {
        self.modifiers.ctrl
    }

    pub fn is_character(&self) -> bool {
        KeyToChar::translate(self.code).is_some()
    }

    /// Печатный символ клавиши с учётом Shift.
    ///
    /// Перед вызовом нужно проверить `is_character()`.
    pub fn to_character(&self) -> Result<char> {
        match KeyToChar::translate(self.code) {
            Some(cases) if self.is_shift_pressed() => Ok(cases.uppercase),
            Some(cases) => Ok(cases.lowercase),
            None => Err(BasiliskError::InvalidOperation(format!(
                "to_character() вызван для не-символьной клавиши {}, сначала проверьте is_character()",
                self.code
            ))),
        }
    }

    pub fn cursor_position(&self) -> (i32, i32) {
        self.cursor_position
    }

    pub fn time(&self) -> Instant {
        self.timestamp
    }

    pub fn window(&self) -> &WindowRef {
        &self.window
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {:?} window={} at {:?} ({}ms)",
            self.code,
            self.modifiers,
            self.state,
            self.window.id(),
            self.cursor_position,
            self.timestamp.elapsed().as_millis()
        )
    }
}
