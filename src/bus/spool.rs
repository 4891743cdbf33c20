use crate::bus::{HandlerSet, Publisher, Subscriber};
use crate::{debug_if_enabled, trace_if_enabled};
use crate::error::{BasiliskError, Result};
use crate::events::{Event, WindowId};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

static GLOBAL: OnceCell<Spool> = OnceCell::new();

const FAILURE_CHANNEL_CAPACITY: usize = 64;

thread_local! {
    static IN_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// Что делать с заданием, когда очередь заполнена
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Ждать места в очереди. Внутри асинхронного рантайма и в рабочих
    /// потоках самого Spool ждать нельзя, там задание отбрасывается.
    #[default]
    Block,
    /// Отбросить задание и учесть его в `SpoolStats::dropped`
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SpoolConfig {
    /// Число потоков-обработчиков
    pub workers: usize,
    /// Ёмкость очереди заданий
    pub queue_capacity: usize,
    pub shutdown_timeout_ms: u64,
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1024,
            shutdown_timeout_ms: 5000,
            overflow: OverflowPolicy::Block,
        }
    }
}

impl SpoolConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

/// Отказ обработчика, пойманный рабочим потоком
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    pub event: &'static str,
    pub window: WindowId,
    pub error: String,
    pub panicked: bool,
}

/// Счётчики Spool на момент вызова `stats()`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpoolStats {
    /// Выполненные задания, включая завершившиеся ошибкой
    pub dispatched: u64,
    pub failed: u64,
    /// Задания, отброшенные из-за переполненной очереди
    pub dropped: u64,
}

#[derive(Default)]
struct Counters {
    dispatched: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

struct Job {
    handler: Arc<dyn Publisher>,
    event: Arc<Event>,
}

/// Глобальная нефильтрующая точка распространения.
///
/// `publish` ставит по одному заданию на каждого подписчика в ограниченную
/// очередь и сразу возвращается. Задания выполняет фиксированный пул потоков,
/// порядок выполнения между заданиями не гарантируется.
pub struct Spool {
    handlers: HandlerSet,
    queue: RwLock<Option<mpsc::Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<Counters>,
    failures: broadcast::Sender<DispatchFailure>,
    overflow: OverflowPolicy,
}

impl Spool {
    pub fn new(config: SpoolConfig) -> Result<Self> {
        if config.workers == 0 || config.queue_capacity == 0 {
            return BasiliskError::invalid_operation(format!(
                "Spool требует workers > 0 и queue_capacity > 0, получено {:?}",
                config
            ));
        }

        info!(
            "Инициализация Spool: {} потоков, очередь на {} заданий, при переполнении {:?}",
            config.workers, config.queue_capacity, config.overflow
        );

        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let counters = Arc::new(Counters::default());
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);

        let mut workers = Vec::with_capacity(config.workers);
        for index in 0..config.workers {
            let receiver = Arc::clone(&receiver);
            let counters = Arc::clone(&counters);
            let failures = failures.clone();
            let handle = thread::Builder::new()
                .name(format!("spool-worker-{}", index))
                .spawn(move || Self::worker_loop(receiver, counters, failures))?;
            workers.push(handle);
        }

        Ok(Self {
            handlers: HandlerSet::new(),
            queue: RwLock::new(Some(sender)),
            workers: Mutex::new(workers),
            counters,
            failures,
            overflow: config.overflow,
        })
    }

    /// Явная однократная инициализация глобального экземпляра
    pub fn init_global(config: SpoolConfig) -> Result<&'static Spool> {
        let mut created = false;
        let spool = GLOBAL.get_or_try_init(|| {
            created = true;
            Spool::new(config)
        })?;

        if created {
            Ok(spool)
        } else {
            Err(BasiliskError::AlreadyInitialized("Spool".to_string()))
        }
    }

    /// Глобальный экземпляр; создаётся с настройками по умолчанию при первом обращении
    pub fn instance() -> Result<&'static Spool> {
        GLOBAL.get_or_try_init(|| Spool::new(SpoolConfig::default()))
    }

    pub fn stats(&self) -> SpoolStats {
        SpoolStats {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }

    /// Канал отказов обработчиков. Получатель видит только отказы после подписки.
    pub fn failures(&self) -> broadcast::Receiver<DispatchFailure> {
        self.failures.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_running(&self) -> bool {
        self.queue.read().is_some()
    }

    /// Прекратить приём событий, дождаться выполнения уже поставленных заданий.
    ///
    /// После таймаута незавершённые потоки остаются за Spool, и повторный
    /// вызов ждёт их снова. Когда все потоки завершены, вызов ничего не делает.
    pub fn shutdown(&self, timeout: Duration) -> Result<()> {
        if self.queue.write().take().is_some() {
            info!("Остановка Spool: приём событий прекращён");
        }

        let mut workers = self.workers.lock();
        if workers.is_empty() {
            return Ok(());
        }
        info!("Остановка Spool: ожидание {} рабочих потоков", workers.len());

        let deadline = Instant::now() + timeout;
        while let Some(handle) = workers.pop() {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    workers.push(handle);
                    warn!(
                        "Рабочие потоки Spool не завершились за {:?}, осталось {}",
                        timeout,
                        workers.len()
                    );
                    return Err(BasiliskError::ShutdownTimeout(format!(
                        "Spool не остановился за {:?}",
                        timeout
                    )));
                }
                thread::sleep(Duration::from_millis(5));
            }
            if handle.join().is_err() {
                error!("Рабочий поток Spool завершился паникой");
            }
        }

        info!("Spool остановлен, статистика: {:?}", self.stats());
        Ok(())
    }

    /// Очередь заполнена: подождать места или отбросить задание
    fn handle_overflow(&self, sender: &mpsc::Sender<Job>, job: Job) -> Result<()> {
        let may_block = self.overflow == OverflowPolicy::Block
            && tokio::runtime::Handle::try_current().is_err()
            && !IN_WORKER.with(Cell::get);

        if may_block {
            trace_if_enabled!("Очередь Spool заполнена, ожидание места");
            return sender.blocking_send(job).map_err(|_| BasiliskError::ShutDown);
        }

        let dropped = self.counters.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        warn!(
            "Очередь Spool переполнена, задание для '{}' отброшено (всего отброшено: {})",
            job.event.description(),
            dropped
        );
        Ok(())
    }

    fn worker_loop(
        receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
        counters: Arc<Counters>,
        failures: broadcast::Sender<DispatchFailure>,
    ) {
        IN_WORKER.with(|flag| flag.set(true));
        loop {
            // Очередь закрыта и пуста только после shutdown
            let job = receiver.lock().blocking_recv();
            let Some(job) = job else {
                break;
            };
            Self::dispatch(job, &counters, &failures);
        }

        debug!(
            "Рабочий поток {} завершён",
            thread::current().name().unwrap_or("spool-worker")
        );
    }

    fn dispatch(job: Job, counters: &Counters, failures: &broadcast::Sender<DispatchFailure>) {
        let Job { handler, event } = job;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.publish(Arc::clone(&event))));
        counters.dispatched.fetch_add(1, Ordering::Relaxed);

        let (message, panicked) = match outcome {
            Ok(Ok(())) => {
                debug_if_enabled!("Событие доставлено: {}", event);
                return;
            }
            Ok(Err(e)) => (e.to_string(), false),
            Err(payload) => (panic_message(payload.as_ref()), true),
        };

        counters.failed.fetch_add(1, Ordering::Relaxed);
        error!(
            "Обработчик не справился с событием '{}' (окно {}): {}",
            event.description(),
            event.window().id(),
            message
        );

        // Отсутствие получателей не ошибка
        let _ = failures.send(DispatchFailure {
            event: event.description(),
            window: event.window().id(),
            error: message,
            panicked,
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("паника: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("паника: {}", s)
    } else {
        "паника без сообщения".to_string()
    }
}

impl Publisher for Spool {
    /// Fire-and-forget: результат обработчиков вызывающему не виден
    fn publish(&self, event: Arc<Event>) -> Result<()> {
        // Копия отправителя: ожидание места не должно держать блокировку очереди
        let Some(sender) = self.queue.read().clone() else {
            return Err(BasiliskError::ShutDown);
        };

        for handler in self.handlers.snapshot() {
            let job = Job {
                handler,
                event: Arc::clone(&event),
            };
            match sender.try_send(job) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(job)) => self.handle_overflow(&sender, job)?,
                Err(mpsc::error::TrySendError::Closed(_)) => return Err(BasiliskError::ShutDown),
            }
        }

        Ok(())
    }
}

impl Subscriber for Spool {
    fn subscribe(&self, handler: Arc<dyn Publisher>) -> bool {
        let added = self.handlers.insert(handler);
        debug_if_enabled!("Spool: подписка (новая: {}), всего {}", added, self.handlers.len());
        added
    }

    fn unsubscribe(&self, handler: &Arc<dyn Publisher>) -> bool {
        let removed = self.handlers.remove(handler);
        debug_if_enabled!("Spool: отписка (удалён: {}), всего {}", removed, self.handlers.len());
        removed
    }
}

impl Drop for Spool {
    fn drop(&mut self) {
        // Потоки дорабатывают очередь и завершаются сами
        self.queue.write().take();
    }
}
