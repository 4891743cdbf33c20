use crate::events::KeyCode;
use super::KeyToChar;

/// Обратная трансляция: символ в клавишу и состояние Shift.
/// Используется для эмуляции набора текста.
pub struct CharToKey;

impl CharToKey {
    /// Для символов с одинаковыми регистрами (пробел, таб) Shift не нужен
    pub fn translate(c: char) -> Option<(KeyCode, bool)> {
        let mut shifted = None;
        for code in KeyCode::ALL {
            let Some(cases) = KeyToChar::translate(code) else {
                continue;
            };
            if cases.lowercase == c {
                return Some((code, false));
            }
            if cases.uppercase == c && shifted.is_none() {
                shifted = Some((code, true));
            }
        }
        shifted
    }

    /// Трансляция целой строки; первый неподдерживаемый символ возвращается как ошибка
    pub fn translate_str(text: &str) -> Result<Vec<(KeyCode, bool)>, char> {
        text.chars()
            .map(|c| Self::translate(c).ok_or(c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_of_decode_table() {
        for code in KeyCode::ALL {
            if let Some(cases) = KeyToChar::translate(code) {
                assert_eq!(CharToKey::translate(cases.lowercase), Some((code, false)));
                if cases.uppercase != cases.lowercase {
                    assert_eq!(CharToKey::translate(cases.uppercase), Some((code, true)));
                }
            }
        }
    }

    #[test]
    fn test_translate_str() {
        let keys = CharToKey::translate_str("Hi!").unwrap();
        assert_eq!(
            keys,
            vec![(KeyCode::H, true), (KeyCode::I, false), (KeyCode::Number1, true)]
        );
        assert_eq!(CharToKey::translate(' '), Some((KeyCode::Space, false)));
        assert_eq!(CharToKey::translate_str("привет"), Err('п'));
    }
}
