//! Configuração do stagegate carregada a partir de `stagegate.toml`.
//!
//! A struct [`EngineConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `STAGEGATE_DATA_DIR` tem precedência sobre o arquivo.

use serde::Deserialize;
use std::path::Path;

use crate::error::StagegateError;

/// Configuração de nível superior carregada de `stagegate.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Diretório onde os logs de tickets e eventos são gravados.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,

    /// Quando verdadeiro, divergência de schema_version interrompe a execução
    /// (stop) em vez de pedir correção (retry).
    #[serde(default = "default_strict_schema")]
    pub strict_schema: bool,
}

// Valor padrão para o diretório de dados: "stagegate_data".
fn default_storage_dir() -> String {
    "stagegate_data".to_string()
}

// Valor padrão para o modo estrito: habilitado.
fn default_strict_schema() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            strict_schema: default_strict_schema(),
        }
    }
}

impl EngineConfig {
    /// Carrega a configuração de `stagegate.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self, StagegateError> {
        let path = Path::new("stagegate.toml");
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<EngineConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração.
        if let Ok(dir) = std::env::var("STAGEGATE_DATA_DIR")
            && !dir.is_empty()
        {
            config.storage_dir = dir;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = EngineConfig::default();
        assert_eq!(config.storage_dir, "stagegate_data");
        assert!(config.strict_schema);
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            strict_schema = false
        "#;
        let config: EngineConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.strict_schema);
        assert_eq!(config.storage_dir, "stagegate_data");
    }

    #[test]
    fn deserialize_full_toml() {
        let toml_str = r#"
            storage_dir = "/tmp/gates"
            strict_schema = true
        "#;
        let config: EngineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.storage_dir, "/tmp/gates");
        assert!(config.strict_schema);
    }
}
