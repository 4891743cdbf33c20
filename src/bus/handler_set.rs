use crate::bus::Publisher;
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::sync::Arc;

/// Снимок подписчиков на момент публикации
pub type Snapshot = SmallVec<[Arc<dyn Publisher>; 8]>;

/// Упорядоченный набор обработчиков без дубликатов.
///
/// Дубликаты определяются по идентичности `Arc`, а не по значению.
/// Блокировка защищает только членство: публикация работает со снимком
/// и никогда не держит её во время вызова обработчика.
#[derive(Default)]
pub struct HandlerSet {
    handlers: RwLock<Vec<Arc<dyn Publisher>>>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn same(a: &Arc<dyn Publisher>, b: &Arc<dyn Publisher>) -> bool {
        // Сравниваем только адрес данных: vtable может отличаться между единицами компиляции
        std::ptr::eq(
            Arc::as_ptr(a) as *const (),
            Arc::as_ptr(b) as *const (),
        )
    }

    pub fn insert(&self, handler: Arc<dyn Publisher>) -> bool {
        let mut handlers = self.handlers.write();
        if handlers.iter().any(|h| Self::same(h, &handler)) {
            return false;
        }
        handlers.push(handler);
        true
    }

    pub fn remove(&self, handler: &Arc<dyn Publisher>) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|h| !Self::same(h, handler));
        handlers.len() != before
    }

    pub fn contains(&self, handler: &Arc<dyn Publisher>) -> bool {
        self.handlers.read().iter().any(|h| Self::same(h, handler))
    }

    pub fn snapshot(&self) -> Snapshot {
        self.handlers.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::handler_fn;

    #[test]
    fn test_insert_is_idempotent() {
        let set = HandlerSet::new();
        let handler = handler_fn("noop", |_| Ok(()));

        assert!(set.insert(handler.clone()));
        assert!(!set.insert(handler.clone()));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&handler));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let set = HandlerSet::new();
        let present = handler_fn("present", |_| Ok(()));
        let absent = handler_fn("absent", |_| Ok(()));
        set.insert(present.clone());

        assert!(!set.remove(&absent));
        assert_eq!(set.len(), 1);
        assert!(set.remove(&present));
        assert!(set.is_empty());
    }

    #[test]
    fn test_snapshot_keeps_insertion_order() {
        let set = HandlerSet::new();
        let first = handler_fn("first", |_| Ok(()));
        let second = handler_fn("second", |_| Ok(()));
        set.insert(first.clone());
        set.insert(second.clone());

        let snapshot = set.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(Arc::ptr_eq(&snapshot[0], &first));
        assert!(Arc::ptr_eq(&snapshot[1], &second));

        // Снимок не меняется после отписки
        set.remove(&first);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(set.len(), 1);
    }
}
