pub mod echo;
pub mod resize;
pub mod typist;

pub use echo::EchoHandler;
pub use resize::ResizeHandler;
pub use typist::Typist;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{Spool, SpoolConfig, Subscriber};
    use crate::events::{KeyCode, Modifiers};
    use crate::window::{HeadlessWindow, Window};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_typed_text_flows_through_spool() {
        // Один поток: задания выполняются в порядке публикации
        let spool = Arc::new(
            Spool::new(SpoolConfig {
                workers: 1,
                ..SpoolConfig::default()
            })
            .unwrap(),
        );
        let echo = Arc::new(EchoHandler::new());
        spool.subscribe(echo.clone());
        spool.subscribe(Arc::new(ResizeHandler::new(10)));

        let (window, input) = HeadlessWindow::open("flow", (500, 600));
        let handle = window.run_event_loop(Arc::clone(&spool)).unwrap();

        let typist = Typist::new(Duration::ZERO);
        assert_eq!(typist.type_text(&input, "Hi, Q!\n").await.unwrap(), 7);
        typist
            .stroke(&input, KeyCode::Equals, Modifiers::new().with_ctrl(true), (0, 0))
            .await
            .unwrap();

        // Обработчик меняет размер асинхронно; закрываем окно только после этого
        for _ in 0..200 {
            if window.dimensions().unwrap() == (510, 610) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        typist.close(&input).unwrap();

        handle.join().unwrap();
        spool.shutdown(Duration::from_secs(2)).unwrap();

        assert_eq!(echo.text(window.id()), "Hi, Q!\n");
        assert_eq!(spool.stats().failed, 0);
        assert_eq!(window.geometry().dimensions(), (510, 610));
        assert!(window.dimensions().is_err());
    }
}
