//! # Engenharia de Features para NER
//!
//! Para cada token, extrai um vetor esparso de features binárias que o
//! perceptron usa para pontuar as tags candidatas.
//!
//! ## Features Implementadas
//!
//! ### Token atual
//! - Forma da palavra (lowercase), prefixos e sufixos de 2 a 4 caracteres
//! - Capitalização: IsCapitalized, IsAllCaps, IsMixed
//! - Formato numérico: dígitos, número com milhar, DNI, CUIT
//! - Nome de mês, sigla societária
//!
//! ### Contexto (janela de 2 tokens)
//! - Palavras anterior e posterior, bigrama de contexto
//!
//! ### Gazetteers
//! - Pessoas, empresas e localidades (carregados das tabelas de referência)

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::datasets::{ReferenceTable, TableName};
use crate::error::Result;
use crate::generators::identity::{is_cuit, is_dni};
use crate::tokenizer::Token;

const MONTHS: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
    "octubre", "noviembre", "diciembre",
];

const COMPANY_MARKERS: [&str; 8] = [
    "s.a.", "s.r.l.", "s.a.s.", "s.a.u.", "srl", "sa", "sas", "sociedad",
];

/// Vetor esparso de features de um token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    /// O mapa de features ativas. Ex: `{"is_capitalized": 1.0, "word=córdoba": 1.0}`.
    pub features: HashMap<String, f64>,
    /// Índice do token original na sentença.
    pub token_index: usize,
}

impl FeatureVector {
    pub fn new(token_index: usize) -> Self {
        Self {
            features: HashMap::new(),
            token_index,
        }
    }

    /// Adiciona uma feature ao vetor com valor 1.0 (binária) ou customizado.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.features.insert(key.into(), value);
    }
}

/// Listas de entidades conhecidas, em minúsculas.
///
/// Nomes com várias palavras também entram palavra a palavra, já que as
/// features são extraídas por token.
#[derive(Debug, Clone, Default)]
pub struct Gazetteers {
    pub persons: HashSet<String>,
    pub companies: HashSet<String>,
    pub locations: HashSet<String>,
}

impl Gazetteers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compila os gazetteers a partir das tabelas de referência embutidas.
    pub fn from_reference_tables() -> Result<Self> {
        let mut gaz = Self::new();

        let persons = ReferenceTable::bundled(TableName::Persons)?;
        for name in persons.column("name")? {
            insert_words(&mut gaz.persons, name);
        }

        let companies = ReferenceTable::bundled(TableName::Companies)?;
        for name in companies.column("name")? {
            insert_words(&mut gaz.companies, name);
        }

        let streets = ReferenceTable::bundled(TableName::Streets)?;
        for column in ["departamento", "provincia"] {
            for place in streets.column(column)? {
                insert_words(&mut gaz.locations, place);
            }
        }

        Ok(gaz)
    }
}

fn insert_words(set: &mut HashSet<String>, value: &str) {
    let lower = value.to_lowercase();
    for word in lower.split_whitespace().filter(|w| w.chars().count() > 2) {
        set.insert(word.to_string());
    }
    set.insert(lower);
}

/// Gera vetores de features para toda a sequência de tokens.
///
/// O índice `i` do retorno corresponde ao token `i` da entrada.
pub fn extract_features(tokens: &[Token], gazetteers: &Gazetteers) -> Vec<FeatureVector> {
    (0..tokens.len())
        .map(|i| extract_for_token(tokens, i, gazetteers))
        .collect()
}

/// Extrai features para um único token em seu contexto
pub fn extract_for_token(tokens: &[Token], i: usize, gazetteers: &Gazetteers) -> FeatureVector {
    let mut fv = FeatureVector::new(i);
    let token = &tokens[i];
    let word = &token.text;
    let lower = word.to_lowercase();

    // === Features da palavra atual ===
    fv.insert(format!("word={lower}"), 1.0);
    fv.insert("bias", 1.0);

    if starts_upper(word) {
        fv.insert("is_capitalized", 1.0);
    }
    if word.chars().count() > 1 && word.chars().all(|c| c.is_uppercase() || !c.is_alphabetic()) {
        fv.insert("is_all_caps", 1.0);
    }
    if word.chars().skip(1).any(|c| c.is_uppercase()) {
        fv.insert("is_mixed_case", 1.0);
    }

    let chars: Vec<char> = lower.chars().collect();
    for n in 2..=4 {
        if chars.len() >= n {
            let prefix: String = chars[..n].iter().collect();
            let suffix: String = chars[chars.len() - n..].iter().collect();
            fv.insert(format!("prefix{n}={prefix}"), 1.0);
            fv.insert(format!("suffix{n}={suffix}"), 1.0);
        }
    }

    // Padrões numéricos e de pontuação
    if word.chars().all(|c| c.is_ascii_digit()) {
        fv.insert("is_digit", 1.0);
    }
    if word.contains('.') && word.chars().any(|c| c.is_ascii_digit()) {
        fv.insert("is_grouped_number", 1.0);
    }
    if is_dni(word) {
        fv.insert("is_dni", 1.0);
    }
    if is_cuit(word) {
        fv.insert("is_cuit", 1.0);
    }
    if word.contains('-') {
        fv.insert("has_hyphen", 1.0);
    }
    if word.chars().count() == 1 && !word.chars().all(char::is_alphanumeric) {
        fv.insert("is_punctuation", 1.0);
    }
    if MONTHS.contains(&lower.as_str()) {
        fv.insert("is_month", 1.0);
    }
    if COMPANY_MARKERS.contains(&lower.as_str()) {
        fv.insert("is_company_marker", 1.0);
    }

    if i == 0 {
        fv.insert("is_first", 1.0);
    }
    if i == tokens.len() - 1 {
        fv.insert("is_last", 1.0);
    }

    // === Features de contexto ===
    if i > 0 {
        let prev = &tokens[i - 1];
        fv.insert(format!("prev_word={}", prev.text.to_lowercase()), 1.0);
        if starts_upper(&prev.text) {
            fv.insert("prev_is_capitalized", 1.0);
        }
    } else {
        fv.insert("BOS", 1.0);
    }
    if i > 1 {
        fv.insert(format!("prev2_word={}", tokens[i - 2].text.to_lowercase()), 1.0);
    }
    if i + 1 < tokens.len() {
        let next = &tokens[i + 1];
        fv.insert(format!("next_word={}", next.text.to_lowercase()), 1.0);
        if starts_upper(&next.text) {
            fv.insert("next_is_capitalized", 1.0);
        }
    } else {
        fv.insert("EOS", 1.0);
    }
    if i + 2 < tokens.len() {
        fv.insert(format!("next2_word={}", tokens[i + 2].text.to_lowercase()), 1.0);
    }
    if i > 0 && i + 1 < tokens.len() {
        fv.insert(
            format!(
                "bigram={}_{}",
                tokens[i - 1].text.to_lowercase(),
                tokens[i + 1].text.to_lowercase()
            ),
            1.0,
        );
    }

    // === Features de Gazetteer ===
    if gazetteers.persons.contains(&lower) {
        fv.insert("in_person_gazetteer", 1.0);
    }
    if gazetteers.companies.contains(&lower) {
        fv.insert("in_company_gazetteer", 1.0);
    }
    if gazetteers.locations.contains(&lower) {
        fv.insert("in_location_gazetteer", 1.0);
    }

    fv
}

fn starts_upper(word: &str) -> bool {
    word.chars().next().map(char::is_uppercase).unwrap_or(false)
}
