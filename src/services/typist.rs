use crate::basilisk_error;
use crate::error::Result;
use crate::events::{KeyCode, Modifiers};
use crate::mappings::CharToKey;
use crate::window::{InputSender, RawInput, WM_DELETE_WINDOW};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const ORIGIN: (i32, i32) = (16, 24);
const GLYPH_WIDTH: i32 = 8;

/// Эмулирует набор текста: превращает строку в необработанный ввод окна
#[derive(Debug, Clone, Copy)]
pub struct Typist {
    interval: Duration,
}

impl Typist {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Набрать текст; неподдерживаемые символы пропускаются.
    /// Возвращает число отправленных нажатий.
    pub async fn type_text(&self, input: &InputSender, text: &str) -> Result<usize> {
        let mut x = ORIGIN.0;
        let y = ORIGIN.1;
        let mut typed = 0;

        for c in text.chars() {
            let Some((code, shift)) = CharToKey::translate(c) else {
                warn!("Символ {:?} не набирается на клавиатуре, пропущен", c);
                continue;
            };

            Self::send(input, RawInput::Motion { x, y })?;
            self.stroke(input, code, Modifiers::new().with_shift(shift), (x, y)).await?;
            typed += 1;
            x += GLYPH_WIDTH;
        }

        debug!("Набрано {} символов", typed);
        Ok(typed)
    }

    /// Нажать и отпустить клавишу с модификаторами
    pub async fn stroke(
        &self,
        input: &InputSender,
        code: KeyCode,
        modifiers: Modifiers,
        (x, y): (i32, i32),
    ) -> Result<()> {
        let state = modifiers.to_x_state();
        let keycode = code.raw();
        Self::send(input, RawInput::KeyPress { keycode, state, x, y })?;
        Self::send(input, RawInput::KeyRelease { keycode, state, x, y })?;

        if !self.interval.is_zero() {
            sleep(self.interval).await;
        }
        Ok(())
    }

    /// Попросить окно закрыться, как это делает оконный менеджер
    pub fn close(&self, input: &InputSender) -> Result<()> {
        Self::send(input, RawInput::ClientMessage { atom: WM_DELETE_WINDOW })
    }

    fn send(input: &InputSender, raw: RawInput) -> Result<()> {
        input
            .send(raw)
            .map_err(|_| basilisk_error!(backend, "ввод окна закрыт"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BasiliskError;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_type_text_produces_raw_input() {
        let (input, mut output) = mpsc::unbounded_channel();
        let typist = Typist::new(Duration::ZERO);

        let typed = typist.type_text(&input, "Aé").await.unwrap();
        typist.close(&input).unwrap();

        assert_eq!(typed, 1);
        assert_eq!(output.try_recv().unwrap(), RawInput::Motion { x: 16, y: 24 });
        assert_eq!(
            output.try_recv().unwrap(),
            RawInput::KeyPress { keycode: KeyCode::A.raw(), state: 0x1, x: 16, y: 24 }
        );
        assert_eq!(
            output.try_recv().unwrap(),
            RawInput::KeyRelease { keycode: KeyCode::A.raw(), state: 0x1, x: 16, y: 24 }
        );
        assert!(output.try_recv().unwrap().is_close_request());
        assert!(output.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_input_is_reported() {
        let (input, output) = mpsc::unbounded_channel();
        drop(output);

        let result = Typist::new(Duration::ZERO).type_text(&input, "a").await;
        assert!(matches!(result, Err(BasiliskError::Backend(_))));
    }
}
