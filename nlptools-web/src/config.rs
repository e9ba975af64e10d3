//! Configuração do servidor, lida das variáveis de ambiente.

use std::env;
use std::path::PathBuf;

use tracing::info;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Endereço de escuta (`NLPTOOLS_ADDR`).
    pub addr: String,
    /// Raiz dos corpora de treino (`NLPTOOLS_DATA_DIR`).
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Variáveis ausentes ou vazias ficam com o valor padrão.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let config = Self {
            addr: get("NLPTOOLS_ADDR").unwrap_or(defaults.addr),
            data_dir: get("NLPTOOLS_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
        };
        info!(addr = %config.addr, data_dir = %config.data_dir.display(), "configuração carregada");
        config
    }
}
