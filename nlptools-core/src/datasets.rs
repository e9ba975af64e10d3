//! # Tabelas de Referência e Corpus de Treino
//!
//! O crate embute três tabelas CSV usadas pelos geradores e pelos gazetteers:
//!
//! | Tabela      | Arquivo          | Colunas                                |
//! |-------------|------------------|----------------------------------------|
//! | `calles`    | `data/calles.csv`    | `nombre`, `departamento`, `provincia` |
//! | `companies` | `data/companies.csv` | `name`                                |
//! | `persons`   | `data/persons.csv`   | `name`                                |
//!
//! Um nome de tabela desconhecido não é erro: [`load_reference_table`] devolve
//! `None` e registra um aviso. Já um corpus desconhecido ou ausente falha.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

const CALLES_CSV: &str = include_str!("../data/calles.csv");
const COMPANIES_CSV: &str = include_str!("../data/companies.csv");
const PERSONS_CSV: &str = include_str!("../data/persons.csv");

/// Corpus de estatutos anotados, relativo ao diretório de dados.
const ESTATUTOS_CORPUS: &str = "estatutos/tagged/spacy_dataset.json";

/// As tabelas de referência conhecidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    /// Ruas com departamento e província (`calles`).
    #[serde(rename = "calles")]
    Streets,
    Companies,
    Persons,
}

impl TableName {
    pub fn file_stem(&self) -> &'static str {
        match self {
            TableName::Streets => "calles",
            TableName::Companies => "companies",
            TableName::Persons => "persons",
        }
    }

    fn bundled_csv(&self) -> &'static str {
        match self {
            TableName::Streets => CALLES_CSV,
            TableName::Companies => COMPANIES_CSV,
            TableName::Persons => PERSONS_CSV,
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

impl FromStr for TableName {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "calles" => Ok(TableName::Streets),
            "companies" => Ok(TableName::Companies),
            "persons" => Ok(TableName::Persons),
            other => Err(Error::unknown_option("table", other, "calles, companies, persons")),
        }
    }
}

/// Uma tabela CSV carregada em memória. Todos os valores são strings.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    pub name: TableName,
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl ReferenceTable {
    /// Tabela embutida no crate.
    pub fn bundled(name: TableName) -> Result<Self> {
        Self::from_reader(name, name.bundled_csv().as_bytes())
    }

    /// Tabela lida de um arquivo CSV externo com as mesmas colunas.
    pub fn from_path(name: TableName, path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(name, BufReader::new(file))
    }

    pub fn from_reader<R: Read>(name: TableName, reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let records = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(table = %name, rows = records.len(), "tabela de referência carregada");
        Ok(Self {
            name,
            headers,
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    /// Todos os valores de uma coluna, na ordem do arquivo.
    pub fn column(&self, column: &str) -> Result<Vec<&str>> {
        let idx = self
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| Error::MissingColumn {
                table: self.name.to_string(),
                column: column.to_string(),
            })?;
        Ok(self
            .records
            .iter()
            .map(|r| r.get(idx).unwrap_or_default())
            .collect())
    }
}

/// Carrega uma das tabelas embutidas pelo nome (`calles`, `companies`, `persons`).
///
/// Nome desconhecido → `Ok(None)` e um aviso no log.
pub fn load_reference_table(name: &str) -> Result<Option<ReferenceTable>> {
    match name.parse::<TableName>() {
        Ok(table) => ReferenceTable::bundled(table).map(Some),
        Err(_) => {
            warn!("nenhuma tabela de referência chamada `{name}`");
            Ok(None)
        }
    }
}

/// Anotações de um exemplo de treino: spans `(start, end, label)` em caracteres.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    pub entities: Vec<(usize, usize, String)>,
}

/// Um exemplo de treino: `(texto, {"entities": [...]})`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample(pub String, pub Annotations);

impl TrainingExample {
    pub fn new(text: impl Into<String>, entities: Vec<(usize, usize, String)>) -> Self {
        Self(text.into(), Annotations { entities })
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    pub fn entities(&self) -> &[(usize, usize, String)] {
        &self.1.entities
    }
}

/// Caminho do corpus `name` dentro de `data_dir`.
pub fn training_corpus_path(name: &str, data_dir: impl AsRef<Path>) -> Result<PathBuf> {
    match name {
        "estatutos" => Ok(data_dir.as_ref().join(ESTATUTOS_CORPUS)),
        other => Err(Error::unknown_option("corpus", other, "estatutos")),
    }
}

/// Carrega um corpus de treino já anotado.
///
/// Corpus desconhecido → `UnknownOption`; arquivo ausente → `Io`.
pub fn load_training_corpus(name: &str, data_dir: impl AsRef<Path>) -> Result<Vec<TrainingExample>> {
    let path = training_corpus_path(name, data_dir)?;
    let file = File::open(&path)?;
    let examples: Vec<TrainingExample> = serde_json::from_reader(BufReader::new(file))?;
    debug!(corpus = name, examples = examples.len(), path = %path.display(), "corpus carregado");
    Ok(examples)
}
