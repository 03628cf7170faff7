//! Configuração do rentflow carregada a partir de `rentflow.toml`.
//!
//! A struct [`RentflowConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `RENTFLOW_STORE` tem precedência sobre o arquivo.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::workflow::WorkflowSettings;

pub const CONFIG_FILE: &str = "rentflow.toml";
pub const STORE_ENV: &str = "RENTFLOW_STORE";

/// Configuração de nível superior carregada de `rentflow.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RentflowConfig {
    /// Caminho do documento JSON que serve de fonte da verdade.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Prefixo do contador usado ao gerar números de contrato.
    #[serde(default = "default_contract_prefix")]
    pub contract_prefix: String,

    /// Identidade registrada quando nenhum autor é informado.
    #[serde(default = "default_system_actor")]
    pub system_actor: String,

    /// Canal do outbox para notificações do ciclo de vida.
    #[serde(default = "default_notify_channel")]
    pub notify_channel: String,
}

// Valor padrão para o documento: "data/portal.json".
fn default_store_path() -> PathBuf {
    PathBuf::from("data/portal.json")
}

fn default_contract_prefix() -> String {
    "AO-C".to_string()
}

fn default_system_actor() -> String {
    "system".to_string()
}

fn default_notify_channel() -> String {
    "sms".to_string()
}

impl Default for RentflowConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            contract_prefix: default_contract_prefix(),
            system_actor: default_system_actor(),
            notify_channel: default_notify_channel(),
        }
    }
}

impl RentflowConfig {
    /// Carrega a configuração de `rentflow.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;

        // Variável de ambiente tem precedência sobre o arquivo para o caminho do documento.
        if let Ok(path) = std::env::var(STORE_ENV)
            && !path.is_empty()
        {
            config.store_path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Carrega de um caminho explícito; arquivo ausente significa defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("invalid config in {}", path.display()))
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            contract_prefix: self.contract_prefix.clone(),
            notify_channel: self.notify_channel.clone(),
        }
    }
}
