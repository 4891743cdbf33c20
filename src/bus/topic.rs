use crate::bus::{HandlerSet, Publisher, Subscriber};
use crate::error::Result;
use crate::events::{Event, WindowId};
use crate::trace_if_enabled;
use std::sync::Arc;
use tracing::debug;

/// Предикат, решающий, пропускает ли Topic событие
pub trait Filter: Send + Sync {
    fn accept(&self, event: &Event) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&Event) -> bool + Send + Sync,
{
    fn accept(&self, event: &Event) -> bool {
        self(event)
    }
}

/// Пропускает только события клавиатуры
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyEvents;

impl Filter for KeyEvents {
    fn accept(&self, event: &Event) -> bool {
        matches!(event, Event::Key(_))
    }
}

/// Пропускает только события от одного окна
#[derive(Debug, Clone, Copy)]
pub struct FromWindow(pub WindowId);

impl Filter for FromWindow {
    fn accept(&self, event: &Event) -> bool {
        event.window().id() == self.0
    }
}

/// Фильтрующая синхронная точка распространения.
///
/// Все обработчики вызываются в потоке вызывающего, по порядку подписки.
/// Первая ошибка обработчика прерывает рассылку и возвращается вызывающему.
pub struct Topic<F> {
    name: String,
    filter: F,
    handlers: HandlerSet,
}

impl<F: Filter> Topic<F> {
    pub fn new(filter: F) -> Self {
        Self::named("topic", filter)
    }

    pub fn named(name: impl Into<String>, filter: F) -> Self {
        Self {
            name: name.into(),
            filter,
            handlers: HandlerSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl<F: Filter> Publisher for Topic<F> {
    fn publish(&self, event: Arc<Event>) -> Result<()> {
        if !self.filter.accept(&event) {
            trace_if_enabled!("Topic '{}' отфильтровал событие: {}", self.name, event);
            return Ok(());
        }

        for handler in self.handlers.snapshot() {
            if let Err(e) = handler.publish(Arc::clone(&event)) {
                debug!("Topic '{}': обработчик вернул ошибку, рассылка прервана: {}", self.name, e);
                return Err(e);
            }
        }

        Ok(())
    }
}

impl<F: Filter> Subscriber for Topic<F> {
    fn subscribe(&self, handler: Arc<dyn Publisher>) -> bool {
        self.handlers.insert(handler)
    }

    fn unsubscribe(&self, handler: &Arc<dyn Publisher>) -> bool {
        self.handlers.remove(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::handler_fn;
    use crate::error::BasiliskError;
    use crate::events::{KeyCode, KeyEvent, Modifiers, MovementEvent, WindowRef};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key_event(window: u64) -> Arc<Event> {
        Arc::new(KeyEvent::press(KeyCode::Q, Modifiers::new(), WindowRef::detached(window)).into())
    }

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Arc<dyn Publisher> {
        let log = Arc::clone(log);
        handler_fn(name, move |_| {
            log.lock().push(name);
            Ok(())
        })
    }

    #[test]
    fn test_filter_invoked_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let topic = Topic::new(move |_: &Event| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });
        let log = Arc::new(Mutex::new(Vec::new()));
        topic.subscribe(recorder(&log, "a"));
        topic.subscribe(recorder(&log, "b"));

        topic.publish(key_event(1)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*log.lock(), vec!["a", "b"]);
    }

    #[test]
    fn test_rejected_event_reaches_nobody() {
        let topic = Topic::new(|_: &Event| false);
        let log = Arc::new(Mutex::new(Vec::new()));
        topic.subscribe(recorder(&log, "a"));

        topic.publish(key_event(1)).unwrap();

        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_handler_error_aborts_fan_out() {
        let topic = Topic::new(KeyEvents);
        let log = Arc::new(Mutex::new(Vec::new()));
        topic.subscribe(recorder(&log, "first"));
        topic.subscribe(handler_fn("failing", |_| BasiliskError::handler("сбой")));
        topic.subscribe(recorder(&log, "never"));

        let result = topic.publish(key_event(1));

        assert!(matches!(result, Err(BasiliskError::Handler(_))));
        assert_eq!(*log.lock(), vec!["first"]);
    }

    #[test]
    fn test_subscribe_twice_registers_once() {
        let topic = Topic::new(KeyEvents);
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = recorder(&log, "a");

        assert!(topic.subscribe(handler.clone()));
        assert!(!topic.subscribe(handler.clone()));
        assert_eq!(topic.subscriber_count(), 1);

        topic.publish(key_event(1)).unwrap();
        assert_eq!(log.lock().len(), 1);

        assert!(topic.unsubscribe(&handler));
        assert!(!topic.unsubscribe(&handler));
        topic.publish(key_event(1)).unwrap();
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_builtin_filters() {
        let movement: Event = MovementEvent::new((1, 1), WindowRef::detached(5)).into();
        let key = key_event(4);

        assert!(KeyEvents.accept(&key));
        assert!(!KeyEvents.accept(&movement));
        assert!(FromWindow(5).accept(&movement));
        assert!(!FromWindow(5).accept(&key));
    }

    #[test]
    fn test_nested_topics() {
        let outer = Topic::named("windows", FromWindow(1));
        let inner = Arc::new(Topic::named("keys", KeyEvents));
        let log = Arc::new(Mutex::new(Vec::new()));
        inner.subscribe(recorder(&log, "key-handler"));
        outer.subscribe(inner.clone());

        outer.publish(key_event(1)).unwrap();
        outer.publish(key_event(2)).unwrap();
        outer
            .publish(Arc::new(MovementEvent::new((0, 0), WindowRef::detached(1)).into()))
            .unwrap();

        assert_eq!(*log.lock(), vec!["key-handler"]);
        assert_eq!(outer.name(), "windows");
    }
}
