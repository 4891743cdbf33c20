use thiserror::Error;

#[derive(Error, Debug)]
pub enum BasiliskError {
    #[error("Недопустимая операция: {0}")]
    InvalidOperation(String),

    #[error("Ошибка обработчика: {0}")]
    Handler(String),

    #[error("Spool остановлен, событие отклонено")]
    ShutDown,

    #[error("Таймаут при остановке: {0}")]
    ShutdownTimeout(String),

    #[error("Глобальный экземпляр уже инициализирован: {0}")]
    AlreadyInitialized(String),

    #[error("Окно {0} уже закрыто")]
    WindowGone(u64),

    #[error("Ошибка бэкенда окон: {0}")]
    Backend(String),

    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl BasiliskError {
    pub fn invalid_operation<T>(msg: impl Into<String>) -> Result<T> {
        Err(BasiliskError::InvalidOperation(msg.into()))
    }

    pub fn handler<T>(msg: impl Into<String>) -> Result<T> {
        Err(BasiliskError::Handler(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, BasiliskError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! basilisk_error {
    (invalid_operation, $($arg:tt)*) => {
        $crate::error::BasiliskError::InvalidOperation(format!($($arg)*))
    };
    (handler, $($arg:tt)*) => {
        $crate::error::BasiliskError::Handler(format!($($arg)*))
    };
    (backend, $($arg:tt)*) => {
        $crate::error::BasiliskError::Backend(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::BasiliskError::Internal(format!($($arg)*))
    };
}
