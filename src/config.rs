//! Configuração do TalentFlow carregada a partir de `talentflow.toml`.
//!
//! A struct [`TalentflowConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `TALENTFLOW_LATENCY_MS` tem precedência sobre o
//! arquivo; as flags da CLI são aplicadas por cima em `main`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::TalentflowError;
use crate::transport::{FailurePolicy, MockTransportConfig};

pub const CONFIG_FILE: &str = "talentflow.toml";
pub const LATENCY_ENV: &str = "TALENTFLOW_LATENCY_MS";

/// Configuração de nível superior carregada de `talentflow.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TalentflowConfig {
    /// Latência artificial do transporte em milissegundos.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Tamanho de página do `list` quando nenhum é informado.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Quantidade de candidatos gerados para um conjunto de dados novo.
    #[serde(default = "default_seed_candidates")]
    pub seed_candidates: usize,

    /// Semente do RNG para geração de dados e injeção de falhas.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Arquivo JSON onde o snapshot é gravado.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Autor registrado nas notas quando `--author` não é informado.
    #[serde(default = "default_author")]
    pub default_author: String,

    /// Probabilidade de rejeição das escritas (candidatos, vagas e avaliações).
    #[serde(default)]
    pub update_failure_rate: f64,

    /// Probabilidade de rejeição de `reorder_jobs`.
    #[serde(default)]
    pub reorder_failure_rate: f64,
}

// Valor padrão para a latência: 300ms.
fn default_latency_ms() -> u64 {
    300
}

// Valor padrão para o tamanho de página: 50.
fn default_page_size() -> u32 {
    50
}

// Valor padrão para candidatos gerados: 1000.
fn default_seed_candidates() -> usize {
    1000
}

// Valor padrão para a semente: 42.
fn default_seed() -> u64 {
    42
}

// Valor padrão para o snapshot: "talentflow.json".
fn default_snapshot_path() -> PathBuf {
    PathBuf::from("talentflow.json")
}

// Valor padrão para o autor das notas: "Current User".
fn default_author() -> String {
    "Current User".to_string()
}

impl Default for TalentflowConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            page_size: default_page_size(),
            seed_candidates: default_seed_candidates(),
            seed: default_seed(),
            snapshot_path: default_snapshot_path(),
            default_author: default_author(),
            update_failure_rate: 0.0,
            reorder_failure_rate: 0.0,
        }
    }
}

impl TalentflowConfig {
    /// Carrega `talentflow.toml` do diretório atual e aplica as variáveis
    /// de ambiente.
    pub fn load() -> Result<Self, TalentflowError> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Carrega um arquivo de configuração.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load_from(path: &Path) -> Result<Self, TalentflowError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<TalentflowConfig>(&contents)?)
    }

    /// Aplica as sobrescritas vindas de `lookup` (normalmente `std::env::var`).
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), TalentflowError> {
        if let Some(raw) = lookup(LATENCY_ENV).filter(|v| !v.trim().is_empty()) {
            self.latency_ms = raw.trim().parse().map_err(|_| {
                TalentflowError::Config(format!(
                    "{LATENCY_ENV} must be a whole number of milliseconds, got {raw:?}"
                ))
            })?;
        }
        Ok(())
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn transport_config(&self) -> MockTransportConfig {
        MockTransportConfig {
            latency: self.latency(),
            read_failures: FailurePolicy::Never,
            update_failures: FailurePolicy::from_rate(self.update_failure_rate),
            reorder_failures: FailurePolicy::from_rate(self.reorder_failure_rate),
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = TalentflowConfig::default();
        assert_eq!(config.latency_ms, 300);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.seed_candidates, 1000);
        assert_eq!(config.snapshot_path, PathBuf::from("talentflow.json"));
        assert_eq!(config.default_author, "Current User");
        assert_eq!(config.update_failure_rate, 0.0);
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            latency_ms = 0
            update_failure_rate = 0.25
        "#;
        let config: TalentflowConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.latency_ms, 0);
        assert_eq!(config.update_failure_rate, 0.25);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn load_from_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TalentflowConfig::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, TalentflowConfig::default());
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "snapshot_path = \"data/board.json\"\nseed = 7\n").unwrap();

        let config = TalentflowConfig::load_from(&path).unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("data/board.json"));
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "latency_ms = \"slow\"").unwrap();
        let err = TalentflowConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, TalentflowError::Toml(_)));
    }

    #[test]
    fn unreadable_config_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TalentflowConfig::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, TalentflowError::Io(_)));
    }

    #[test]
    fn env_overrides_latency() {
        let mut config = TalentflowConfig::default();
        config
            .apply_env(|key| (key == LATENCY_ENV).then(|| "25".to_string()))
            .unwrap();
        assert_eq!(config.latency(), Duration::from_millis(25));
    }

    #[test]
    fn blank_env_is_ignored_and_garbage_rejected() {
        let mut config = TalentflowConfig::default();
        config.apply_env(|_| Some("  ".to_string())).unwrap();
        assert_eq!(config.latency_ms, 300);

        let err = config.apply_env(|_| Some("fast".to_string())).unwrap_err();
        assert!(matches!(err, TalentflowError::Config(ref msg) if msg.contains(LATENCY_ENV)));
        assert_eq!(config.latency_ms, 300);
    }

    #[test]
    fn transport_config_maps_rates_to_policies() {
        let config = TalentflowConfig {
            latency_ms: 10,
            update_failure_rate: 1.0,
            reorder_failure_rate: 0.1,
            ..Default::default()
        };
        let transport = config.transport_config();
        assert_eq!(transport.latency, Duration::from_millis(10));
        assert_eq!(transport.update_failures, FailurePolicy::Always);
        assert_eq!(transport.reorder_failures, FailurePolicy::Rate(0.1));
        assert_eq!(transport.read_failures, FailurePolicy::Never);
    }
}
