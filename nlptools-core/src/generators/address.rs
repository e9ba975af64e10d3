//! Endereços fictícios montados com ruas, departamentos e províncias reais.

use super::{title_case, Generator};
use crate::datasets::{ReferenceTable, TableName};
use crate::error::Result;

const UNIT_CODES: [&str; 20] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "0", "1", "2", "3", "4", "5", "6", "7", "8",
    "9",
];

const LOCALITY_CONNECTORS: [&str; 4] = [
    ", de la localidad de ",
    ", partido de ",
    ", ",
    ", departamento de ",
];

const MAX_STREET_NUMBER: u64 = 5_000;

/// Colunas da tabela de ruas, já extraídas.
struct Streets<'a> {
    names: Vec<&'a str>,
    departments: Vec<&'a str>,
    provinces: Vec<&'a str>,
}

impl<'a> Streets<'a> {
    fn from_table(table: &'a ReferenceTable) -> Result<Self> {
        Ok(Self {
            names: table.column("nombre")?,
            departments: table.column("departamento")?,
            provinces: table.column("provincia")?,
        })
    }
}

impl Generator {
    /// `n` endereços a partir da tabela `calles` embutida.
    ///
    /// Com `legal`, apenas `"{departamento}, {provincia}"`, sem repetir linhas da tabela.
    pub fn addresses(&mut self, n: usize, legal: bool) -> Result<Vec<String>> {
        let table = ReferenceTable::bundled(TableName::Streets)?;
        self.addresses_from(&table, n, legal)
    }

    pub fn addresses_from(&mut self, table: &ReferenceTable, n: usize, legal: bool) -> Result<Vec<String>> {
        let streets = Streets::from_table(table)?;

        if legal {
            let rows: Vec<usize> = (0..table.len()).collect();
            return Ok(self
                .sample(&rows, n)?
                .into_iter()
                .map(|i| format!("{}, {}", streets.departments[i], streets.provinces[i]))
                .collect());
        }

        if streets.names.is_empty() {
            return self.sample(&Vec::<String>::new(), n);
        }
        Ok((0..n).map(|_| self.street_address(&streets)).collect())
    }

    /// Um dos quatro formatos, nas proporções 3:3:1:1.
    fn street_address(&mut self, streets: &Streets<'_>) -> String {
        let street = title_case(*self.pick(&streets.names));
        let number = self.int(0, MAX_STREET_NUMBER);

        match self.int(0, 7) {
            0..=2 => {
                let unit = self.unit();
                let connector = *self.pick(&LOCALITY_CONNECTORS);
                let department = *self.pick(&streets.departments);
                let province = *self.pick(&streets.provinces);
                format!("{street} {number}, {unit}{connector}{department}, {province}")
            }
            3..=5 => {
                let department = *self.pick(&streets.departments);
                let province = *self.pick(&streets.provinces);
                format!("{street} {number}, {department}, {province}")
            }
            6 => format!("{street} {number}, de esta ciudad"),
            _ => {
                let unit = self.unit();
                format!("{street} {number}, {unit}, de esta ciudad")
            }
        }
    }

    /// "piso 4, departamento B", "piso 12, oficina 3" ou "casa 7, manzana C".
    fn unit(&mut self) -> String {
        let floor = self.int(0, 20);
        let code = *self.pick(&UNIT_CODES);
        if self.int(0, 2) < 2 {
            let kind = *self.pick(&["departamento", "oficina"]);
            format!("piso {floor}, {kind} {code}")
        } else {
            format!("casa {floor}, manzana {code}")
        }
    }
}

pub fn addresses(n: usize, legal: bool, seed: Option<u64>) -> Result<Vec<String>> {
    Generator::new(seed).addresses(n, legal)
}
