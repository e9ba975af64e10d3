//! # Numerais em Espanhol
//!
//! Conversão entre inteiros e sua forma escrita em espanhol, como aparece em
//! estatutos e contratos ("mil novecientos cuarenta y cinco", "vigésimo séptimo").
//!
//! - [`cardinal`]: `1945` → `"mil novecientos cuarenta y cinco"`
//! - [`ordinal`]: `27` → `"vigésimo séptimo"`
//! - [`words_to_number`]: `"dos millones trescientos mil"` → `2_300_000`
//!
//! O alcance cobre até as centenas de milhões, suficiente para datas, prazos e
//! montantes de capital social. Decimais não são suportados.

use crate::error::{Error, Result};

const UNITS: [&str; 30] = [
    "cero", "uno", "dos", "tres", "cuatro", "cinco", "seis", "siete", "ocho", "nueve",
    "diez", "once", "doce", "trece", "catorce", "quince", "dieciséis", "diecisiete",
    "dieciocho", "diecinueve", "veinte", "veintiuno", "veintidós", "veintitrés",
    "veinticuatro", "veinticinco", "veintiséis", "veintisiete", "veintiocho", "veintinueve",
];

const TENS: [&str; 10] = [
    "", "", "", "treinta", "cuarenta", "cincuenta", "sesenta", "setenta", "ochenta", "noventa",
];

const HUNDREDS: [&str; 10] = [
    "", "ciento", "doscientos", "trescientos", "cuatrocientos", "quinientos",
    "seiscientos", "setecientos", "ochocientos", "novecientos",
];

const ORDINAL_UNITS: [&str; 10] = [
    "", "primero", "segundo", "tercero", "cuarto", "quinto", "sexto", "séptimo", "octavo",
    "noveno",
];

const ORDINAL_TENS: [&str; 10] = [
    "", "décimo", "vigésimo", "trigésimo", "cuadragésimo", "quincuagésimo", "sexagésimo",
    "septuagésimo", "octogésimo", "nonagésimo",
];

const ORDINAL_HUNDREDS: [&str; 10] = [
    "", "centésimo", "ducentésimo", "tricentésimo", "cuadringentésimo", "quingentésimo",
    "sexcentésimo", "septingentésimo", "octingentésimo", "noningentésimo",
];

/// Forma cardinal de `n`.
///
/// Antes de "mil" e "millón", "uno" é apocopado ("veintiún mil", "un millón").
pub fn cardinal(n: u64) -> String {
    if n == 0 {
        return UNITS[0].to_string();
    }
    let millions = n / 1_000_000;
    let thousands = (n / 1_000) % 1_000;
    let rest = n % 1_000;

    let mut parts: Vec<String> = Vec::new();
    match millions {
        0 => {}
        1 => parts.push("un millón".to_string()),
        m => parts.push(format!("{} millones", apocopate(&cardinal(m)))),
    }
    match thousands {
        0 => {}
        1 => parts.push("mil".to_string()),
        t => parts.push(format!("{} mil", apocopate(&below_thousand(t)))),
    }
    if rest > 0 {
        parts.push(below_thousand(rest));
    }
    parts.join(" ")
}

/// Forma ordinal masculina de `n` (1 ≤ n < 1000).
///
/// Valores fora desse intervalo caem para a forma cardinal.
pub fn ordinal(n: u64) -> String {
    if n == 0 || n >= 1_000 {
        return cardinal(n);
    }
    let hundreds = (n / 100) as usize;
    let tens = ((n / 10) % 10) as usize;
    let units = (n % 10) as usize;

    let mut parts: Vec<String> = Vec::new();
    if hundreds > 0 {
        parts.push(ORDINAL_HUNDREDS[hundreds].to_string());
    }
    match (tens, units) {
        (0, 0) => {}
        (0, u) => parts.push(ORDINAL_UNITS[u].to_string()),
        (1, 1) => parts.push("undécimo".to_string()),
        (1, 2) => parts.push("duodécimo".to_string()),
        (1, u) if u > 2 => parts.push(format!("decimo{}", ORDINAL_UNITS[u])),
        (t, 0) => parts.push(ORDINAL_TENS[t].to_string()),
        (t, u) => {
            parts.push(ORDINAL_TENS[t].to_string());
            parts.push(ORDINAL_UNITS[u].to_string());
        }
    }
    parts.join(" ")
}

fn below_thousand(n: u64) -> String {
    debug_assert!(n < 1_000);
    if n == 100 {
        return "cien".to_string();
    }
    let hundreds = (n / 100) as usize;
    let rest = (n % 100) as usize;

    let mut parts: Vec<String> = Vec::new();
    if hundreds > 0 {
        parts.push(HUNDREDS[hundreds].to_string());
    }
    if rest > 0 {
        if rest < 30 {
            parts.push(UNITS[rest].to_string());
        } else if rest % 10 == 0 {
            parts.push(TENS[rest / 10].to_string());
        } else {
            parts.push(format!("{} y {}", TENS[rest / 10], UNITS[rest % 10]));
        }
    }
    parts.join(" ")
}

/// "veintiuno" → "veintiún", "treinta y uno" → "treinta y un", "uno" → "un".
fn apocopate(words: &str) -> String {
    if let Some(stem) = words.strip_suffix("veintiuno") {
        format!("{stem}veintiún")
    } else if let Some(stem) = words.strip_suffix("uno") {
        format!("{stem}un")
    } else {
        words.to_string()
    }
}

/// Converte um numeral escrito em espanhol em inteiro.
///
/// O texto deve estar limpo (apenas o numeral). Aceita acentos opcionais,
/// a conjunção "y" e as formas apocopadas ("un", "veintiún").
///
/// ```rust
/// use nlptools_core::numbers::words_to_number;
///
/// assert_eq!(words_to_number("mil novecientos cuarenta y cinco").unwrap(), 1945);
/// assert_eq!(words_to_number("Dos Millones Trescientos Mil").unwrap(), 2_300_000);
/// ```
pub fn words_to_number(text: &str) -> Result<u64> {
    let mut total: u64 = 0;
    let mut current: u64 = 0;
    let mut seen_any = false;

    for raw in text.split_whitespace() {
        let word = strip_accents(&raw.to_lowercase());
        if word == "y" {
            continue;
        }
        seen_any = true;
        match word.as_str() {
            "mil" => {
                total += current.max(1) * 1_000;
                current = 0;
            }
            "millon" | "millones" => {
                total = (total + current.max(1)) * 1_000_000;
                current = 0;
            }
            other => {
                current += word_value(other).ok_or_else(|| Error::UnknownNumberWord(raw.to_string()))?;
            }
        }
    }

    if !seen_any {
        return Err(Error::UnknownNumberWord(text.to_string()));
    }
    Ok(total + current)
}

fn word_value(word: &str) -> Option<u64> {
    let value = match word {
        "un" | "una" => 1,
        "veintiun" => 21,
        "cien" => 100,
        _ => {
            if let Some(i) = UNITS.iter().position(|u| strip_accents(u) == word) {
                i as u64
            } else if let Some(i) = TENS.iter().position(|t| !t.is_empty() && *t == word) {
                i as u64 * 10
            } else if let Some(i) = HUNDREDS.iter().position(|h| !h.is_empty() && *h == word) {
                i as u64 * 100
            } else {
                return None;
            }
        }
    };
    Some(value)
}

fn strip_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_small() {
        assert_eq!(cardinal(0), "cero");
        assert_eq!(cardinal(5), "cinco");
        assert_eq!(cardinal(16), "dieciséis");
        assert_eq!(cardinal(27), "veintisiete");
        assert_eq!(cardinal(31), "treinta y uno");
        assert_eq!(cardinal(100), "cien");
        assert_eq!(cardinal(101), "ciento uno");
        assert_eq!(cardinal(500), "quinientos");
    }

    #[test]
    fn test_cardinal_years() {
        assert_eq!(cardinal(1945), "mil novecientos cuarenta y cinco");
        assert_eq!(cardinal(2000), "dos mil");
        assert_eq!(cardinal(2021), "dos mil veintiuno");
    }

    #[test]
    fn test_cardinal_large_amounts() {
        assert_eq!(cardinal(21_000), "veintiún mil");
        assert_eq!(cardinal(150_500), "ciento cincuenta mil quinientos");
        assert_eq!(cardinal(1_000_000), "un millón");
        assert_eq!(cardinal(3_995_500), "tres millones novecientos noventa y cinco mil quinientos");
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "primero");
        assert_eq!(ordinal(11), "undécimo");
        assert_eq!(ordinal(13), "decimotercero");
        assert_eq!(ordinal(20), "vigésimo");
        assert_eq!(ordinal(27), "vigésimo séptimo");
        assert_eq!(ordinal(31), "trigésimo primero");
    }

    #[test]
    fn test_words_to_number() {
        assert_eq!(words_to_number("veintisiete").unwrap(), 27);
        assert_eq!(words_to_number("veintiún mil").unwrap(), 21_000);
        assert_eq!(words_to_number("un millón quinientos mil").unwrap(), 1_500_000);
        assert_eq!(words_to_number("ciento cincuenta mil quinientos").unwrap(), 150_500);
    }

    #[test]
    fn test_words_to_number_inverts_cardinal() {
        for n in [0, 7, 19, 45, 99, 100, 345, 1_001, 21_000, 999_999, 10_250_500] {
            assert_eq!(words_to_number(&cardinal(n)).unwrap(), n, "{}", cardinal(n));
        }
    }

    #[test]
    fn test_words_to_number_rejects_unknown_words() {
        assert!(matches!(
            words_to_number("doce manzanas"),
            Err(Error::UnknownNumberWord(w)) if w == "manzanas"
        ));
        assert!(words_to_number("   ").is_err());
    }
}
