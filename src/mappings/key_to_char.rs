use crate::events::KeyCode;

/// Пара символов клавиши: без Shift и с Shift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterCases {
    pub lowercase: char,
    pub uppercase: char,
}

const fn cases(lowercase: char, uppercase: char) -> Option<CharacterCases> {
    Some(CharacterCases { lowercase, uppercase })
}

/// Таблица декодирования физических клавиш в печатные символы (раскладка US)
pub struct KeyToChar;

impl KeyToChar {
    /// `None` для функциональных клавиш, стрелок, Esc и модификаторов
    pub fn translate(code: KeyCode) -> Option<CharacterCases> {
        match code {
            // Буквенные клавиши
            KeyCode::Q => cases('q', 'Q'),
            KeyCode::W => cases('w', 'W'),
            KeyCode::E => cases('e', 'E'),
            KeyCode::R => cases('r', 'R'),
            KeyCode::T => cases('t', 'T'),
            KeyCode::Y => cases('y', 'Y'),
            KeyCode::U => cases('u', 'U'),
            KeyCode::I => cases('i', 'I'),
            KeyCode::O => cases('o', 'O'),
            KeyCode::P => cases('p', 'P'),
            KeyCode::A => cases('a', 'A'),
            KeyCode::S => cases('s', 'S'),
            KeyCode::D => cases('d', 'D'),
            KeyCode::F => cases('f', 'F'),
            KeyCode::G => cases('g', 'G'),
            KeyCode::H => cases('h', 'H'),
            KeyCode::J => cases('j', 'J'),
            KeyCode::K => cases('k', 'K'),
            KeyCode::L => cases('l', 'L'),
            KeyCode::Z => cases('z', 'Z'),
            KeyCode::X => cases('x', 'X'),
            KeyCode::C => cases('c', 'C'),
            KeyCode::V => cases('v', 'V'),
            KeyCode::B => cases('b', 'B'),
            KeyCode::N => cases('n', 'N'),
            KeyCode::M => cases('m', 'M'),

            // Цифровые клавиши (верхний ряд)
            KeyCode::Number1 => cases('1', '!'),
            KeyCode::Number2 => cases('2', '@'),
            KeyCode::Number3 => cases('3', '#'),
            KeyCode::Number4 => cases('4', '$'),
            KeyCode::Number5 => cases('5', '%'),
            KeyCode::Number6 => cases('6', '^'),
            KeyCode::Number7 => cases('7', '&'),
            KeyCode::Number8 => cases('8', '*'),
            KeyCode::Number9 => cases('9', '('),
            KeyCode::Number0 => cases('0', ')'),

            // Пробельные и управляющие
            KeyCode::Space => cases(' ', ' '),
            KeyCode::Tab => cases('\t', '\t'),
            KeyCode::BackSpace => cases('\u{8}', '\u{8}'),
            KeyCode::Return => cases('\n', '\n'),

            // Знаки пунктуации
            KeyCode::Dash => cases('-', '_'),
            KeyCode::Equals => cases('=', '+'),
            KeyCode::LeftBracket => cases('[', '{'),
            KeyCode::RightBracket => cases(']', '}'),
            KeyCode::Semicolon => cases(';', ':'),
            KeyCode::Quote => cases('\'', '"'),
            KeyCode::BackTick => cases('`', '~'),
            KeyCode::BackSlash => cases('\\', '|'),
            KeyCode::Comma => cases(',', '<'),
            KeyCode::Period => cases('.', '>'),
            KeyCode::ForwardSlash => cases('/', '?'),

            KeyCode::Esc
            | KeyCode::LeftControl
            | KeyCode::LeftShift
            | KeyCode::RightShift
            | KeyCode::LeftAlternate
            | KeyCode::CapsLock
            | KeyCode::Asterisk
            | KeyCode::F1
            | KeyCode::F2
            | KeyCode::F3
            | KeyCode::F4
            | KeyCode::F5
            | KeyCode::F6
            | KeyCode::F7
            | KeyCode::F8
            | KeyCode::F9
            | KeyCode::F10
            | KeyCode::F11
            | KeyCode::F12
            | KeyCode::Up
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Down => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_size() {
        let characters = KeyCode::ALL
            .iter()
            .filter(|code| KeyToChar::translate(**code).is_some())
            .count();
        // 26 букв + 10 цифр + 4 пробельных + 11 знаков
        assert_eq!(characters, 51);
    }

    #[test]
    fn test_letters_shift_to_uppercase() {
        for code in KeyCode::ALL {
            if let Some(cases) = KeyToChar::translate(code) {
                if cases.lowercase.is_ascii_lowercase() {
                    assert_eq!(cases.lowercase.to_ascii_uppercase(), cases.uppercase);
                }
            }
        }
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(KeyToChar::translate(KeyCode::Dash), cases('-', '_'));
        assert_eq!(KeyToChar::translate(KeyCode::ForwardSlash), cases('/', '?'));
        assert_eq!(KeyToChar::translate(KeyCode::BackSlash), cases('\\', '|'));
        assert_eq!(KeyToChar::translate(KeyCode::Asterisk), None);
    }
}
