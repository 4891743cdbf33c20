use crate::error::Result;
use crate::events::Event;
use std::fmt;
use std::sync::Arc;

/// Принимает событие и выполняет побочные эффекты обработчика.
///
/// `Err` означает отказ обработчика: Topic пробрасывает его вызывающему,
/// Spool логирует и считает.
pub trait Publisher: Send + Sync {
    fn publish(&self, event: Arc<Event>) -> Result<()>;
}

impl<T: Publisher + ?Sized> Publisher for &T {
    fn publish(&self, event: Arc<Event>) -> Result<()> {
        (**self).publish(event)
    }
}

impl<T: Publisher + ?Sized> Publisher for Arc<T> {
    fn publish(&self, event: Arc<Event>) -> Result<()> {
        (**self).publish(event)
    }
}

/// Управляет набором обработчиков точки распространения.
///
/// Обе операции идемпотентны; возвращаемое значение сообщает,
/// изменился ли набор.
pub trait Subscriber {
    fn subscribe(&self, handler: Arc<dyn Publisher>) -> bool;
    fn unsubscribe(&self, handler: &Arc<dyn Publisher>) -> bool;
}

/// Точка распространения, которая одновременно принимает события и
/// раздаёт их подписчикам.
pub trait PublishSubscriber: Publisher + Subscriber {}

impl<T: Publisher + Subscriber + ?Sized> PublishSubscriber for T {}

/// Обработчик на основе замыкания
pub struct FnHandler<F> {
    name: &'static str,
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&Event) -> Result<()> + Send + Sync,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> Publisher for FnHandler<F>
where
    F: Fn(&Event) -> Result<()> + Send + Sync,
{
    fn publish(&self, event: Arc<Event>) -> Result<()> {
        (self.f)(&event)
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("name", &self.name).finish()
    }
}

/// Упаковать замыкание в обработчик, готовый к подписке
pub fn handler_fn<F>(name: &'static str, f: F) -> Arc<dyn Publisher>
where
    F: Fn(&Event) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(FnHandler::new(name, f))
}
