use anyhow::{Context, Result};
use basilisk::bus::{handler_fn, KeyEvents, Publisher, Spool, Subscriber, Topic};
use basilisk::config::Config;
use basilisk::events::{Event, KeyCode, Modifiers};
use basilisk::services::{EchoHandler, ResizeHandler, Typist};
use basilisk::window::{HeadlessWindow, Window};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "basilisk")]
#[command(about = "Демонстрация распространения событий ввода между окнами и обработчиками")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "basilisk.toml")]
    config: String,

    /// Уровень логирования (перекрывает logging.level и logging.filter)
    #[arg(long)]
    log_level: Option<String>,

    /// Число окон
    #[arg(long)]
    windows: Option<usize>,

    /// Текст, набираемый в каждом окне
    #[arg(long)]
    script: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let mut config = Config::load(&args.config)?;
    if let Some(windows) = args.windows {
        config.window.count = windows;
    }
    if let Some(script) = args.script.clone() {
        config.demo.script = script;
    }
    if let Some(level) = args.log_level.as_deref() {
        config.override_log_level(level);
    }
    config.validate()?;

    // Инициализация системы логирования
    init_tracing(&config.log_directives(), &config.logging.format)?;

    info!("Запуск basilisk v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    let spool = Spool::init_global(config.spool.clone()).context("Не удалось создать Spool")?;

    // Подписчики
    let echo = Arc::new(EchoHandler::new());
    spool.subscribe(echo.clone());
    spool.subscribe(Arc::new(ResizeHandler::new(config.demo.resize_step)));

    let keys = Arc::new(Topic::named("keys", KeyEvents));
    keys.subscribe(handler_fn("key-log", |event| {
        if let Event::Key(key) = event {
            debug!("Клавиша: {}", key);
        }
        Ok(())
    }));
    spool.subscribe(keys.clone());

    let mut failures = spool.failures();
    let failure_monitor = tokio::spawn(async move {
        loop {
            match failures.recv().await {
                Ok(failure) => warn!(
                    "Отказ обработчика (окно {}, {}): {}",
                    failure.window, failure.event, failure.error
                ),
                Err(RecvError::Lagged(skipped)) => warn!("Пропущено {} сообщений об отказах", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Окна и их циклы событий
    let mut windows = Vec::with_capacity(config.window.count);
    let mut loops = Vec::with_capacity(config.window.count);
    let mut typists = JoinSet::new();
    let typist = Typist::new(config.demo.keystroke_interval());

    for _ in 0..config.window.count {
        let (window, input) =
            HeadlessWindow::open(&config.window.title, (config.window.width, config.window.height));
        window.bind()?;
        window.swap()?;
        loops.push(window.run_event_loop(spool)?);

        let script = config.demo.script.clone();
        typists.spawn(async move {
            typist.type_text(&input, &script).await?;
            let ctrl = Modifiers::new().with_ctrl(true);
            typist.stroke(&input, KeyCode::Equals, ctrl, (0, 0)).await?;
            typist.close(&input)
        });
        windows.push(window);
    }

    info!("Открыто окон: {}, подписчиков Spool: {}", windows.len(), spool.subscriber_count());

    // Ожидание завершения набора или сигнала
    let interrupted = tokio::select! {
        _ = async {
            while let Some(result) = typists.join_next().await {
                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error!("Ошибка эмуляции ввода: {}", e),
                    Err(e) => error!("Задача ввода завершилась аварийно: {}", e),
                }
            }
        } => {
            info!("Набор текста завершён во всех окнах");
            false
        }
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
            }
            true
        }
    };

    if interrupted {
        // Удаление отправителей ввода завершает циклы событий
        typists.abort_all();
    }

    info!("Завершение работы...");

    let shutdown_timeout = config.spool.shutdown_timeout();
    let windows_closed = tokio::time::timeout(
        shutdown_timeout,
        tokio::task::spawn_blocking(move || {
            for handle in loops {
                if handle.join().is_err() {
                    error!("Цикл событий окна завершился паникой");
                }
            }
        }),
    )
    .await;
    if windows_closed.is_err() {
        warn!("Таймаут при закрытии окон");
    }

    let drained = tokio::task::spawn_blocking(move || spool.shutdown(shutdown_timeout)).await?;
    match drained {
        Ok(()) => info!("Spool остановлен корректно"),
        Err(e) => warn!("{}", e),
    }
    failure_monitor.abort();

    for window in &windows {
        let geometry = window.geometry();
        info!(
            "Окно {}: {:?}, размер {}x{}, кадров {}",
            window.id(),
            echo.text(window.id()).trim_end(),
            geometry.width,
            geometry.height,
            window.frames()
        );
    }

    let stats = spool.stats();
    info!(
        "Статистика: доставлено {}, отказов {}, отброшено {}",
        stats.dispatched, stats.failed, stats.dropped
    );

    // Topic больше не нужен
    let keys: Arc<dyn Publisher> = keys;
    spool.unsubscribe(&keys);

    info!("basilisk завершил работу");
    Ok(())
}

fn init_tracing(directives: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives))?;

    let compact = (format == "compact").then(|| tracing_subscriber::fmt::layer().compact());
    let full = (format != "compact").then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(compact)
        .with(full)
        .init();

    Ok(())
}
