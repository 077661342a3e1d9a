//! Configuração do laurel carregada a partir de `laurel.toml`.
//!
//! A struct [`LaurelConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `LAUREL_LOG` tem precedência sobre `log_filter`.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "laurel.toml";
pub const LOG_ENV: &str = "LAUREL_LOG";

/// Configuração de nível superior carregada de `laurel.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LaurelConfig {
    /// Prazo, em milissegundos, de cada requisição criada pela CLI.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Tamanho de página usado quando o filtro pede 0.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Limite superior para o tamanho de página.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Política de retentativa para gravar o histórico.
    #[serde(default)]
    pub history_retry: RetryConfig,

    /// Quantidade de estudantes no ranking das estatísticas.
    #[serde(default = "default_top_students")]
    pub top_students: usize,

    /// Filtro do `tracing` usado quando `LAUREL_LOG` não está definida.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_page_size() -> usize {
    10
}

fn default_max_page_size() -> usize {
    100
}

fn default_top_students() -> usize {
    10
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LaurelConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            history_retry: RetryConfig::default(),
            top_students: default_top_students(),
            log_filter: default_log_filter(),
        }
    }
}

impl LaurelConfig {
    /// Carrega de `path`, usando os defaults se o arquivo não existir.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str::<LaurelConfig>(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(filter) = std::env::var(LOG_ENV)
            && !filter.is_empty()
        {
            config.log_filter = filter;
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Configuração de retentativas para o histórico.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Número máximo de retentativas após a primeira tentativa.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Atraso base em milissegundos para o backoff exponencial.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    50
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    /// Atraso antes da retentativa `attempt` (a partir de 1): base_delay_ms * 2^(attempt - 1).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}
