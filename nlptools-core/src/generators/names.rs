//! Nomes de pessoas e empresas tirados das tabelas de referência.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Generator;
use crate::datasets::{ReferenceTable, TableName};
use crate::error::{Error, Result};

/// Teto de nomes por chamada.
pub const MAX_NAMES: usize = 20_000;

/// Quantos nomes de cada tabela entram no sorteio de [`NameKind::Any`].
const ANY_POOL_PER_KIND: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameKind {
    Company,
    Person,
    #[default]
    Any,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NameKind::Company => "company",
            NameKind::Person => "person",
            NameKind::Any => "any",
        })
    }
}

impl FromStr for NameKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "company" => Ok(NameKind::Company),
            "person" => Ok(NameKind::Person),
            "any" => Ok(NameKind::Any),
            other => Err(Error::unknown_option("name_type", other, "company, person, any")),
        }
    }
}

impl Generator {
    /// `n` nomes distintos das tabelas embutidas.
    pub fn names(&mut self, n: usize, kind: NameKind) -> Result<Vec<String>> {
        let persons = ReferenceTable::bundled(TableName::Persons)?;
        let companies = ReferenceTable::bundled(TableName::Companies)?;
        self.names_from(n, kind, &persons, &companies)
    }

    /// Como [`Generator::names`], sobre tabelas fornecidas pelo chamador.
    pub fn names_from(
        &mut self,
        n: usize,
        kind: NameKind,
        persons: &ReferenceTable,
        companies: &ReferenceTable,
    ) -> Result<Vec<String>> {
        let n = if n > MAX_NAMES {
            warn!(requested = n, max = MAX_NAMES, "amostra grande demais, limitando");
            MAX_NAMES
        } else {
            n
        };

        let pool: Vec<&str> = match kind {
            NameKind::Person => persons.column("name")?,
            NameKind::Company => companies.column("name")?,
            NameKind::Any => {
                let persons = persons.column("name")?;
                let companies = companies.column("name")?;
                let mut pool = self.sample(&persons, ANY_POOL_PER_KIND.min(persons.len()))?;
                pool.extend(self.sample(&companies, ANY_POOL_PER_KIND.min(companies.len()))?);
                pool
            }
        };

        Ok(self
            .sample(&pool, n)?
            .into_iter()
            .map(str::to_string)
            .collect())
    }
}

pub fn random_names(n: usize, kind: NameKind, seed: Option<u64>) -> Result<Vec<String>> {
    Generator::new(seed).names(n, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_distinct_and_from_the_table() {
        let persons = ReferenceTable::bundled(TableName::Persons).unwrap();
        let known: HashSet<&str> = persons.column("name").unwrap().into_iter().collect();

        let names = random_names(10, NameKind::Person, Some(3)).unwrap();
        assert_eq!(names.len(), 10);
        assert_eq!(names.iter().collect::<HashSet<_>>().len(), 10);
        assert!(names.iter().all(|n| known.contains(n.as_str())));
    }

    #[test]
    fn test_any_mixes_both_tables() {
        let persons = ReferenceTable::bundled(TableName::Persons).unwrap();
        let companies = ReferenceTable::bundled(TableName::Companies).unwrap();
        let total = persons.len() + companies.len();

        let names = random_names(total, NameKind::Any, Some(1)).unwrap();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_names_reproducible() {
        assert_eq!(
            random_names(5, NameKind::Company, Some(42)).unwrap(),
            random_names(5, NameKind::Company, Some(42)).unwrap()
        );
    }

    #[test]
    fn test_too_many_names() {
        assert!(matches!(
            random_names(500, NameKind::Person, None),
            Err(Error::SampleTooLarge { requested: 500, .. })
        ));
        // Acima do teto, o pedido é limitado antes de amostrar.
        assert!(matches!(
            random_names(MAX_NAMES + 1, NameKind::Company, None),
            Err(Error::SampleTooLarge { requested: MAX_NAMES, .. })
        ));
    }

    #[test]
    fn test_name_kind_from_str() {
        assert_eq!("person".parse::<NameKind>().unwrap(), NameKind::Person);
        assert!("animal".parse::<NameKind>().is_err());
    }
}
