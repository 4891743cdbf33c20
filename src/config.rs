use crate::bus::SpoolConfig;
use crate::mappings::CharToKey;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub spool: SpoolConfig,
    pub window: WindowConfig,
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowConfig {
    pub count: usize,
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoConfig {
    /// Текст, который набирается в каждом окне
    pub script: String,
    pub keystroke_interval_ms: u64,
    /// Шаг изменения размера по Ctrl+= / Ctrl+-
    pub resize_step: u32,
}

impl DemoConfig {
    pub fn keystroke_interval(&self) -> Duration {
        Duration::from_millis(self.keystroke_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
                filter: "basilisk=info".to_string(),
            },
            spool: SpoolConfig::default(),
            window: WindowConfig {
                count: 4,
                title: "basilisk".to_string(),
                width: 500,
                height: 600,
            },
            demo: DemoConfig {
                script: "Hello, basilisk!\n".to_string(),
                keystroke_interval_ms: 20,
                resize_step: 50,
            },
        }
    }
}

impl Config {
    /// Значения по умолчанию, затем TOML-файл (если есть), затем переменные `BASILISK_*`
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("BASILISK_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    /// Директивы `EnvFilter`: общий уровень, затем уточнения по модулям из `filter`
    pub fn log_directives(&self) -> String {
        if self.logging.filter.is_empty() {
            self.logging.level.clone()
        } else {
            format!("{},{}", self.logging.level, self.logging.filter)
        }
    }

    /// Уровень из командной строки заменяет и общий уровень, и уровень модулей basilisk
    pub fn override_log_level(&mut self, level: &str) {
        self.logging.level = level.to_string();
        self.logging.filter = format!("basilisk={}", level);
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация Spool
        if self.spool.workers == 0 || self.spool.workers > 256 {
            anyhow::bail!("spool.workers должно быть от 1 до 256, получено {}", self.spool.workers);
        }

        if self.spool.queue_capacity == 0 {
            anyhow::bail!("spool.queue_capacity должно быть больше 0");
        }

        // Валидация окон
        if self.window.count == 0 || self.window.count > 64 {
            anyhow::bail!("window.count должно быть от 1 до 64, получено {}", self.window.count);
        }

        if self.window.width == 0 || self.window.height == 0 {
            anyhow::bail!(
                "Размер окна должен быть ненулевым: {}x{}",
                self.window.width,
                self.window.height
            );
        }

        // Сценарий должен набираться на клавиатуре целиком
        if let Err(c) = CharToKey::translate_str(&self.demo.script) {
            anyhow::bail!("Символ {:?} в demo.script нельзя набрать на клавиатуре", c);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_invalid_spool() {
        let mut config = Config::default();
        config.spool.workers = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.spool.queue_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_untypeable_script() {
        let mut config = Config::default();
        config.demo.script = "Привет".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_logging_and_window() {
        let mut config = Config::default();
        config.logging.format = "json".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.window.width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/basilisk.toml").unwrap();
        assert_eq!(config.window.count, 4);
        assert_eq!(config.spool, SpoolConfig::default());
    }

    #[test]
    fn test_log_directives_combine_level_and_filter() {
        let mut config = Config::default();
        config.logging.level = "warn".to_string();
        assert_eq!(config.log_directives(), "warn,basilisk=info");

        config.logging.filter.clear();
        assert_eq!(config.log_directives(), "warn");

        config.override_log_level("debug");
        assert_eq!(config.log_directives(), "debug,basilisk=debug");
        assert!(config.validate().is_ok());

        config.override_log_level("loud");
        assert!(config.validate().is_err());
    }
}
