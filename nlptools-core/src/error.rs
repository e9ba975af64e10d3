//! # Erros do nlptools
//!
//! Um único enum cobre toda a taxonomia de falhas da biblioteca:
//!
//! | Categoria  | Variantes                                                        |
//! |------------|------------------------------------------------------------------|
//! | Validação  | `InvalidRecord`, `MissingField`, `UnknownOption`, `MissingColumn`|
//! | Intervalo  | `InvalidDate`, `InvalidDateRange`, `SampleTooLarge`, `UnknownNumberWord` |
//! | Recursos   | `Io`, `Csv`, `Json`                                              |
//! | Treino     | `EmptyTrainingSet`                                               |
//!
//! Entradas degradadas (amostra grande demais, tabela desconhecida) não viram
//! erro: são registradas com `tracing::warn!` e o processamento continua.

use chrono::NaiveDate;
use thiserror::Error;

/// Erros que podem ocorrer em qualquer operação do nlptools.
#[derive(Debug, Error)]
pub enum Error {
    /// O registro de entrada não tem o formato esperado (ex: não é um objeto).
    #[error("registro inválido: {0}")]
    InvalidRecord(String),

    /// Um campo obrigatório está ausente.
    #[error("campo obrigatório ausente: `{0}`")]
    MissingField(String),

    /// Valor não reconhecido para uma opção enumerada (estilo, tipo, modo...).
    #[error("valor `{value}` inválido para `{option}`; use um de: {expected}")]
    UnknownOption {
        option: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Coluna inexistente em uma tabela de referência.
    #[error("a tabela `{table}` não possui a coluna `{column}`")]
    MissingColumn { table: String, column: String },

    /// Componentes de data que não formam uma data de calendário.
    #[error("data inválida: {0}")]
    InvalidDate(String),

    /// Intervalo vazio ou invertido.
    #[error("intervalo de datas inválido: {start} não é anterior a {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Pedido de amostra sem reposição maior que a população.
    #[error("amostra de {requested} itens excede os {available} disponíveis")]
    SampleTooLarge { requested: usize, available: usize },

    /// Palavra que não pertence ao vocabulário numérico espanhol.
    #[error("palavra numérica desconhecida: `{0}`")]
    UnknownNumberWord(String),

    /// Nenhum exemplo foi fornecido para o treino.
    #[error("o conjunto de treino está vazio")]
    EmptyTrainingSet,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Atalho para `UnknownOption`.
    pub(crate) fn unknown_option(
        option: &'static str,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Error::UnknownOption {
            option,
            value: value.into(),
            expected,
        }
    }
}

/// Resultado padrão das operações do nlptools.
pub type Result<T> = std::result::Result<T, Error>;
