//! Datas aleatórias e sua escrita nos estilos usados em documentos legais.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Generator;
use crate::error::{Error, Result};
use crate::numbers;

const MONTHS: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio", "Julio", "Agosto", "Septiembre",
    "Octubre", "Noviembre", "Diciembre",
];

/// Intervalo `[start, end)` de sorteio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Monta o intervalo a partir de componentes soltos.
    ///
    /// Qualquer componente zero descarta todos e usa o intervalo padrão.
    pub fn from_ymd(
        start_year: i32,
        start_month: u32,
        start_day: u32,
        end_year: i32,
        end_month: u32,
        end_day: u32,
    ) -> Result<Self> {
        if start_year == 0
            || start_month == 0
            || start_day == 0
            || end_year == 0
            || end_month == 0
            || end_day == 0
        {
            warn!("componente de data igual a zero, usando o intervalo padrão");
            return Ok(Self::default());
        }
        Ok(Self {
            start: ymd(start_year, start_month, start_day)?,
            end: ymd(end_year, end_month, end_day)?,
        })
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2050, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::InvalidDate(format!("{year:04}-{month:02}-{day:02}")))
}

/// Estilo de escrita de uma data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formality {
    /// `27-12-1945`
    Basic,
    /// `27/12/1945`
    Basic2,
    /// `27 de Diciembre de 1945`
    Mixed,
    /// `27 de Diciembre de mil novecientos cuarenta y cinco`
    Mixed2,
    /// `veintisiete de Diciembre de mil novecientos cuarenta y cinco`
    Regular,
    /// `veintisiete del mes de Diciembre de ...`
    Formal,
    /// `vigésimo séptimo día del mes de Diciembre del año ...`
    VeryFormal,
    /// Um dos sete estilos acima, sorteado.
    #[default]
    Random,
}

impl Formality {
    pub const CONCRETE: [Formality; 7] = [
        Formality::Basic,
        Formality::Basic2,
        Formality::Mixed,
        Formality::Mixed2,
        Formality::Regular,
        Formality::Formal,
        Formality::VeryFormal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Formality::Basic => "basic",
            Formality::Basic2 => "basic2",
            Formality::Mixed => "mixed",
            Formality::Mixed2 => "mixed2",
            Formality::Regular => "regular",
            Formality::Formal => "formal",
            Formality::VeryFormal => "veryformal",
            Formality::Random => "random",
        }
    }
}

impl fmt::Display for Formality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Formality {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::CONCRETE
            .iter()
            .chain(std::iter::once(&Formality::Random))
            .find(|f| f.name() == s)
            .copied()
            .ok_or_else(|| {
                Error::unknown_option(
                    "formality",
                    s,
                    "basic, basic2, mixed, mixed2, regular, formal, veryformal, random",
                )
            })
    }
}

impl Generator {
    /// Data uniforme em `[start, end)`. `start == end` sorteia o próprio `start`.
    pub fn date(&mut self, range: DateRange) -> Result<NaiveDate> {
        let DateRange { start, mut end } = range;
        if start == end {
            end = end
                .checked_add_days(Days::new(1))
                .ok_or_else(|| Error::InvalidDate(end.to_string()))?;
        }
        if end < start {
            return Err(Error::InvalidDateRange { start, end });
        }
        let span = end.signed_duration_since(start).num_days() as u64;
        let offset = self.rng().gen_range(0..span);
        start
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| Error::InvalidDate(format!("{start} + {offset} dias")))
    }

    /// Escreve `date` no estilo pedido; `Random` sorteia um estilo concreto.
    pub fn format_date(&mut self, date: NaiveDate, formality: Formality, include_year: bool) -> String {
        let formality = match formality {
            Formality::Random => *self.pick(&Formality::CONCRETE),
            concrete => concrete,
        };
        render_date(date, formality, include_year)
    }
}

fn render_date(date: NaiveDate, formality: Formality, include_year: bool) -> String {
    let day = format!("{:02}", date.day());
    let month = format!("{:02}", date.month());
    let month_words = MONTHS[date.month0() as usize];
    let day_words = match formality {
        Formality::VeryFormal => numbers::ordinal(date.day() as u64),
        _ => numbers::cardinal(date.day() as u64),
    };

    if !include_year {
        return match formality {
            Formality::Basic => format!("{day}-{month}"),
            Formality::Basic2 => format!("{day}/{month}"),
            Formality::Mixed | Formality::Mixed2 => format!("{day} de {month_words}"),
            Formality::Regular => format!("{day_words} de {month_words}"),
            Formality::Formal => format!("{day_words} del mes de {month_words}"),
            Formality::VeryFormal | Formality::Random => {
                format!("{day_words} días del mes de {month_words}")
            }
        };
    }

    let year = date.year();
    let year_words = numbers::cardinal(year.unsigned_abs() as u64);
    match formality {
        Formality::Basic => format!("{day}-{month}-{year}"),
        Formality::Basic2 => format!("{day}/{month}/{year}"),
        Formality::Mixed => format!("{day} de {month_words} de {year}"),
        Formality::Mixed2 => format!("{day} de {month_words} de {year_words}"),
        Formality::Regular => format!("{day_words} de {month_words} de {year_words}"),
        Formality::Formal => format!("{day_words} del mes de {month_words} de {year_words}"),
        Formality::VeryFormal | Formality::Random => {
            format!("{day_words} día del mes de {month_words} del año {year_words}")
        }
    }
}

pub fn random_date(range: DateRange, seed: Option<u64>) -> Result<NaiveDate> {
    Generator::new(seed).date(range)
}

pub fn format_date(date: NaiveDate, formality: Formality, include_year: bool, seed: Option<u64>) -> String {
    Generator::new(seed).format_date(date, formality, include_year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_format_date_all_styles() {
        let date = d(1945, 12, 27);
        let cases = [
            (Formality::Basic, "27-12-1945"),
            (Formality::Basic2, "27/12/1945"),
            (Formality::Mixed, "27 de Diciembre de 1945"),
            (Formality::Mixed2, "27 de Diciembre de mil novecientos cuarenta y cinco"),
            (Formality::Regular, "veintisiete de Diciembre de mil novecientos cuarenta y cinco"),
            (
                Formality::Formal,
                "veintisiete del mes de Diciembre de mil novecientos cuarenta y cinco",
            ),
            (
                Formality::VeryFormal,
                "vigésimo séptimo día del mes de Diciembre del año mil novecientos cuarenta y cinco",
            ),
        ];
        for (formality, expected) in cases {
            assert_eq!(format_date(date, formality, true, None), expected);
        }
    }

    #[test]
    fn test_format_date_without_year() {
        let date = d(2021, 3, 5);
        assert_eq!(format_date(date, Formality::Basic, false, None), "05-03");
        assert_eq!(format_date(date, Formality::Mixed, false, None), "05 de Marzo");
        assert_eq!(
            format_date(date, Formality::VeryFormal, false, None),
            "quinto días del mes de Marzo"
        );
    }

    #[test]
    fn test_random_formality_is_one_of_the_concrete_styles() {
        let date = d(1945, 12, 27);
        let rendered: Vec<String> = Formality::CONCRETE
            .iter()
            .map(|f| format_date(date, *f, true, None))
            .collect();
        let mut g = Generator::seeded(9);
        for _ in 0..30 {
            let s = g.format_date(date, Formality::Random, true);
            assert!(rendered.contains(&s), "{s}");
        }
    }

    #[test]
    fn test_formality_from_str() {
        assert_eq!("veryformal".parse::<Formality>().unwrap(), Formality::VeryFormal);
        assert_eq!("random".parse::<Formality>().unwrap(), Formality::Random);
        assert!(matches!(
            "casual".parse::<Formality>(),
            Err(Error::UnknownOption { option: "formality", .. })
        ));
    }

    #[test]
    fn test_random_date_within_range() {
        let range = DateRange::new(d(2000, 1, 1), d(2000, 2, 1));
        let mut g = Generator::seeded(4);
        for _ in 0..100 {
            let date = g.date(range).unwrap();
            assert!(date >= range.start && date < range.end);
        }
    }

    #[test]
    fn test_random_date_same_day_range() {
        let day = d(1991, 2, 1);
        assert_eq!(random_date(DateRange::new(day, day), Some(1)).unwrap(), day);
    }

    #[test]
    fn test_random_date_inverted_range() {
        let range = DateRange::new(d(2000, 1, 2), d(2000, 1, 1));
        assert!(matches!(random_date(range, None), Err(Error::InvalidDateRange { .. })));
    }

    #[test]
    fn test_random_date_is_reproducible() {
        let range = DateRange::default();
        assert_eq!(random_date(range, Some(77)).unwrap(), random_date(range, Some(77)).unwrap());
    }

    #[test]
    fn test_from_ymd() {
        assert_eq!(DateRange::from_ymd(0, 1, 1, 2000, 1, 1).unwrap(), DateRange::default());
        assert!(matches!(DateRange::from_ymd(2000, 2, 30, 2001, 1, 1), Err(Error::InvalidDate(_))));
        let range = DateRange::from_ymd(2000, 1, 1, 2025, 12, 31).unwrap();
        assert_eq!(range.start, d(2000, 1, 1));
    }
}
