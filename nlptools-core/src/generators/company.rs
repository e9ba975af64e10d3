//! Frases societárias: duração do mandato, vigência, tipo de sociedade,
//! capital social e aportes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{title_case, Generator};
use crate::error::{Error, Result};
use crate::numbers;

const TERM_PHRASES: [&str; 3] = [
    "término de duración de la sociedad",
    "plazo de duración de la sociedad",
    "vencimiento de la sociedad",
];

const COMPANY_TYPES: [&str; 5] = [
    "sociedad de responsabilidad limitada",
    "sociedad anónima",
    "sociedad por acciones simplificada",
    "sociedad anónima unipersonal",
    "sociedad por acciones simplificada unipersonal",
];

/// Como o capital social é escrito.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapitalStyle {
    /// Sorteia um dos outros três.
    #[default]
    Any,
    /// `ciento cincuenta mil quinientos`
    Written,
    /// `150.500`
    Number,
    /// `ciento cincuenta mil quinientos ($ 150.500)` ou `$150.500 (ciento ...)`
    Mixed,
}

impl fmt::Display for CapitalStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CapitalStyle::Any => "any",
            CapitalStyle::Written => "written",
            CapitalStyle::Number => "number",
            CapitalStyle::Mixed => "mixed",
        })
    }
}

impl FromStr for CapitalStyle {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "any" => Ok(CapitalStyle::Any),
            "written" => Ok(CapitalStyle::Written),
            "number" => Ok(CapitalStyle::Number),
            "mixed" => Ok(CapitalStyle::Mixed),
            other => Err(Error::unknown_option("style", other, "written, number, mixed, any")),
        }
    }
}

impl Generator {
    /// Duração do mandato: "3 años", "tres (3) ejercicios" ou uma frase fixa.
    pub fn company_duration_phrase(&mut self) -> String {
        if self.int(0, 2) > 0 {
            let years = self.int(1, 10);
            let unit = *self.pick(&["años", "ejercicios"]);
            let amount = self.number_form(years);
            format!("{amount} {unit}")
        } else {
            self.pick(&TERM_PHRASES).to_string()
        }
    }

    /// Anos de vigência da sociedade (1 a 100), em uma das quatro grafias.
    pub fn company_validity_phrase(&mut self) -> String {
        let years = self.int(1, 100);
        self.number_form(years)
    }

    /// Tipo societário em minúsculas, maiúsculas ou título.
    pub fn company_type_phrase(&mut self) -> String {
        let kind = *self.pick(&COMPANY_TYPES);
        match self.int(0, 2) {
            0 => kind.to_string(),
            1 => kind.to_uppercase(),
            _ => title_case(kind),
        }
    }

    /// Montante de capital social: até dez milhões, múltiplo de 500.
    pub fn capital_phrase(&mut self, style: CapitalStyle) -> String {
        let amount = if self.int(0, 1) == 1 {
            let thousands = self.int(0, 199) * 5;
            let hundreds = *self.pick(&["000", "500"]);
            let millions = self.int(1, 10);
            format!("{millions}.{thousands:03}.{hundreds}")
        } else {
            let thousands = self.int(0, 199) * 5;
            let hundreds = *self.pick(&["000", "500"]);
            format!("{thousands}.{hundreds}")
        };

        let style = match style {
            CapitalStyle::Any => *self.pick(&[CapitalStyle::Written, CapitalStyle::Number, CapitalStyle::Mixed]),
            concrete => concrete,
        };
        match style {
            CapitalStyle::Number | CapitalStyle::Any => amount,
            CapitalStyle::Written => numbers::cardinal(grouped_value(&amount)),
            CapitalStyle::Mixed => {
                let words = numbers::cardinal(grouped_value(&amount));
                if self.int(0, 1) == 0 {
                    format!("{words} ($ {amount})")
                } else {
                    format!("${amount} ({words})")
                }
            }
        }
    }

    /// Aporte de um sócio: `"125.500"` ou apenas os milhares (`"125"`).
    pub fn contribution_amount(&mut self) -> String {
        let thousands = self.int(0, 199) * 5;
        let hundreds = *self.pick(&["000", "500"]);
        if self.int(0, 1) == 1 {
            format!("{thousands}.{hundreds}")
        } else {
            thousands.to_string()
        }
    }
}

/// "1.500.000" → 1500000. Só recebe valores montados acima.
fn grouped_value(amount: &str) -> u64 {
    amount
        .chars()
        .filter(char::is_ascii_digit)
        .fold(0, |acc, c| acc * 10 + u64::from(c.to_digit(10).unwrap_or(0)))
}

pub fn company_duration_phrase(seed: Option<u64>) -> String {
    Generator::new(seed).company_duration_phrase()
}

pub fn company_validity_phrase(seed: Option<u64>) -> String {
    Generator::new(seed).company_validity_phrase()
}

pub fn company_type_phrase(seed: Option<u64>) -> String {
    Generator::new(seed).company_type_phrase()
}

pub fn capital_phrase(style: CapitalStyle, seed: Option<u64>) -> String {
    Generator::new(seed).capital_phrase(style)
}

/// Como [`capital_phrase`], com o estilo vindo de texto (`"written"`, `"mixed"`, ...).
pub fn capital_phrase_named(style: &str, seed: Option<u64>) -> Result<String> {
    Ok(capital_phrase(style.parse()?, seed))
}

pub fn contribution_amount(seed: Option<u64>) -> String {
    Generator::new(seed).contribution_amount()
}
