//! # Similaridade Aproximada de Palavras e Sentenças
//!
//! Conjunto de predicados para decidir se dois textos são "parecidos o suficiente".
//! Todas as pontuações são normalizadas em `[0, 1]` e derivadas da distância Indel
//! (só inserções e remoções), ou seja, da maior subsequência comum:
//!
//! $$ratio(a, b) = 1 - \frac{indel(a, b)}{|a| + |b|} = \frac{2 \cdot LCS(a, b)}{|a| + |b|}$$
//!
//! ## Funções de Pontuação
//!
//! | Função             | Pré-processamento         | Sensível à ordem |
//! |--------------------|---------------------------|------------------|
//! | [`ratio`]          | nenhum                    | sim              |
//! | [`quick_ratio`]    | minúsculas, sem pontuação | sim              |
//! | [`token_set_ratio`]| minúsculas, sem pontuação | não (conjuntos)  |
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use nlptools_core::comparison::{word_similarity, find_similar_word, RatioMode};
//!
//! assert!(word_similarity("Apple", "Aple", 0.7, RatioMode::Ratio));
//! assert!(!word_similarity("Apple", "Banana", 0.8, RatioMode::Ratio));
//!
//! let tokens = ["The", "Aple", "is", "red"];
//! assert_eq!(find_similar_word("Apple", &tokens, 0.5, RatioMode::Ratio), Some("Aple"));
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Limiar padrão usado pelos predicados.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Função de pontuação usada pelos predicados de palavra/sentença.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RatioMode {
    /// **Ratio**: compara os textos exatamente como foram fornecidos.
    #[default]
    #[serde(rename = "ratio")]
    Ratio,
    /// **QRatio**: normaliza caixa e pontuação antes de comparar.
    #[serde(rename = "QRatio", alias = "qratio")]
    QRatio,
}

impl RatioMode {
    pub fn name(&self) -> &'static str {
        match self {
            RatioMode::Ratio => "ratio",
            RatioMode::QRatio => "QRatio",
        }
    }

    /// Pontua o par de textos com a função correspondente ao modo.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        match self {
            RatioMode::Ratio => ratio(a, b),
            RatioMode::QRatio => quick_ratio(a, b),
        }
    }
}

impl fmt::Display for RatioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RatioMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ratio" => Ok(RatioMode::Ratio),
            "QRatio" | "qratio" => Ok(RatioMode::QRatio),
            other => Err(Error::unknown_option("mode", other, "ratio, QRatio")),
        }
    }
}

/// Parâmetros comuns aos predicados (limiar + modo).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityOptions {
    pub threshold: f64,
    pub mode: RatioMode,
}

impl Default for SimilarityOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            mode: RatioMode::Ratio,
        }
    }
}

/// Similaridade Indel normalizada, sem pré-processamento. Dois textos vazios valem 1.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    1.0 - indel_distance(&a, &b) as f64 / total as f64
}

/// Número mínimo de inserções e remoções para transformar `a` em `b`.
fn indel_distance(a: &[char], b: &[char]) -> usize {
    a.len() + b.len() - 2 * longest_common_subsequence(a, b)
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    // Uma linha da tabela de programação dinâmica por vez
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Minúsculas, caracteres não alfanuméricos viram espaço, bordas aparadas.
pub fn default_process(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    replaced.to_lowercase().trim().to_string()
}

/// [`ratio`] após [`default_process`]. Vale 0 se algum lado ficar vazio.
pub fn quick_ratio(a: &str, b: &str) -> f64 {
    let a = default_process(a);
    let b = default_process(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    ratio(&a, &b)
}

/// Compara os *conjuntos* de tokens dos dois textos, ignorando ordem e repetição.
///
/// Separa os tokens em interseção e diferenças, e devolve a melhor entre:
/// - diferença A vs diferença B;
/// - interseção vs interseção + diferença A;
/// - interseção vs interseção + diferença B.
///
/// Se a interseção não for vazia e um dos lados estiver contido no outro, vale 1.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let processed_a = default_process(a);
    let processed_b = default_process(b);
    let tokens_a: BTreeSet<&str> = processed_a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = processed_b.split_whitespace().collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 1.0;
    }

    let sect = intersection.join(" ");
    let ab = diff_ab.join(" ");
    let ba = diff_ba.join(" ");

    let mut best = ratio(&ab, &ba);
    if sect.is_empty() {
        return best;
    }

    let sect_ab = format!("{sect} {ab}");
    let sect_ba = format!("{sect} {ba}");
    best = best.max(ratio(&sect, &sect_ab));
    best = best.max(ratio(&sect, &sect_ba));
    best
}

/// Duas palavras são similares se a pontuação for **estritamente** maior que o limiar.
///
/// Entradas vazias nunca são similares.
pub fn word_similarity(a: &str, b: &str, threshold: f64, mode: RatioMode) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    mode.score(a, b) > threshold
}

/// Mesmo contrato de [`word_similarity`], na granularidade de sentenças.
pub fn sentence_similarity(a: &str, b: &str, threshold: f64, mode: RatioMode) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    mode.score(a, b) > threshold
}

/// Verdadeiro se algum token (comparado em minúsculas) for similar a `word`.
pub fn word_in_sentence<S: AsRef<str>>(
    word: &str,
    tokens: &[S],
    threshold: f64,
    mode: RatioMode,
) -> bool {
    find_similar_word(word, tokens, threshold, mode).is_some()
}

/// Verifica se uma sentença curta está (aproximadamente) contida numa longa.
///
/// ```rust
/// use nlptools_core::comparison::sentence_contained_in;
///
/// let long = "Is someone getting the best, the best, the best of you?";
/// assert!(sentence_contained_in("the best of you", long, 0.9));
/// assert!(!sentence_contained_in("the worst of you", long, 0.8));
/// ```
pub fn sentence_contained_in(shorter: &str, longer: &str, threshold: f64) -> bool {
    token_set_ratio(shorter, longer) > threshold
}

/// Devolve o primeiro token (na ordem original) similar a `word`.
///
/// A ausência de correspondência não é erro: retorna `None`.
pub fn find_similar_word<'a, S: AsRef<str>>(
    word: &str,
    tokens: &'a [S],
    threshold: f64,
    mode: RatioMode,
) -> Option<&'a str> {
    let word_lower = word.to_lowercase();
    tokens
        .iter()
        .map(AsRef::as_ref)
        .find(|token| sentence_similarity(&token.to_lowercase(), &word_lower, threshold, mode))
}

/// Verdadeiro se qualquer par (palavra da lista, token) passar do limiar.
///
/// Para na primeira combinação encontrada.
pub fn any_listed_word_in_tokens<W: AsRef<str>, T: AsRef<str>>(
    words: &[W],
    tokens: &[T],
    threshold: f64,
    mode: RatioMode,
) -> bool {
    words.iter().any(|word| {
        tokens
            .iter()
            .any(|token| word_similarity(word.as_ref(), token.as_ref(), threshold, mode))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTENCE: [&str; 8] = ["hola", "como", "te", "va?", "todo", "bien", "bueno", "chau"];

    #[test]
    fn test_word_similarity() {
        assert!(!word_similarity("Apple", "Banana", 0.8, RatioMode::Ratio));
        assert!(word_similarity("Apple", "Apple", 0.8, RatioMode::Ratio));
        assert!(word_similarity("Apple", "Aple", 0.7, RatioMode::Ratio));
    }

    #[test]
    fn test_equal_strings_are_similar() {
        for s in ["a", "contrato", "Sociedad Anónima", "20-12345678-9"] {
            for mode in [RatioMode::Ratio, RatioMode::QRatio] {
                assert!(word_similarity(s, s, 0.99, mode), "{s} / {mode}");
                assert!(sentence_similarity(s, s, 0.0, mode), "{s} / {mode}");
            }
        }
    }

    #[test]
    fn test_empty_inputs_are_not_similar() {
        assert!(!word_similarity("", "", 0.5, RatioMode::Ratio));
        assert!(!sentence_similarity("Luke", "", 0.0, RatioMode::Ratio));
        assert!(!sentence_similarity("", "Luke", 0.0, RatioMode::QRatio));
    }

    #[test]
    fn test_sentence_similarity() {
        let luke = "Luke, I am your Father....";
        assert!(!sentence_similarity(luke, "Noooooooooooo!", 0.8, RatioMode::Ratio));
        assert!(sentence_similarity(luke, "Luke, I am probably your Father", 0.4, RatioMode::Ratio));
        assert!(sentence_similarity(luke, "Luke, I am not your Father", 0.5, RatioMode::QRatio));
    }

    #[test]
    fn test_quick_ratio_ignores_case_and_punctuation() {
        assert_eq!(quick_ratio("VA?", "va"), 1.0);
        assert_eq!(quick_ratio("???", "va"), 0.0);
    }

    #[test]
    fn test_sentence_contained_in() {
        let long = "Is someone getting the best, the best, the best of you?";
        assert!(sentence_contained_in("the best of you", long, 0.8));
        assert!(!sentence_contained_in("the worst of you", long, 0.8));
        assert!(sentence_contained_in("the best of you", long, 0.9));
    }

    #[test]
    fn test_word_in_sentence() {
        let tokens = ["The", "cat", "is", "under", "the", "table"];
        assert!(word_in_sentence("cat", &tokens, 0.8, RatioMode::Ratio));
        let typo = ["The", "catd", "is", "under", "the", "table"];
        assert!(!word_in_sentence("cat", &typo, 0.9, RatioMode::Ratio));
    }

    #[test]
    fn test_find_similar_word() {
        let tokens = ["The", "Aple", "is", "red"];
        assert_eq!(find_similar_word("Apple", &tokens, 0.5, RatioMode::Ratio), Some("Aple"));
        assert_eq!(find_similar_word("Apple", &["The", "Apple", "is", "red"], 0.8, RatioMode::Ratio), Some("Apple"));
    }

    #[test]
    fn test_find_similar_word_absent() {
        let tokens = ["estatuto", "social", "de", "la", "sociedad"];
        assert_eq!(find_similar_word("xylophone", &tokens, 0.8, RatioMode::Ratio), None);
        assert_eq!(find_similar_word("xylophone", &tokens, 0.8, RatioMode::QRatio), None);
        let empty: [&str; 0] = [];
        assert_eq!(find_similar_word("estatuto", &empty, 0.8, RatioMode::Ratio), None);
    }

    #[test]
    fn test_find_similar_word_keeps_original_order() {
        let tokens = ["Gerente", "gerente", "GERENTE"];
        assert_eq!(find_similar_word("gerente", &tokens, 0.9, RatioMode::Ratio), Some("Gerente"));
    }

    #[test]
    fn test_any_listed_word_in_tokens() {
        assert!(any_listed_word_in_tokens(&["hola", "chau"], &SENTENCE, 0.7, RatioMode::Ratio));
        assert!(!any_listed_word_in_tokens(&["ninguna"], &SENTENCE, 0.7, RatioMode::Ratio));
        assert!(any_listed_word_in_tokens(&["va", "bueno"], &SENTENCE, 0.8, RatioMode::QRatio));
        assert!(!any_listed_word_in_tokens(&["holiss", "tuvieja"], &SENTENCE, 0.8, RatioMode::QRatio));
    }

    #[test]
    fn test_ratio_is_indel_based() {
        // 1 - 1/7: uma remoção sobre sete caracteres
        assert!((ratio("hola", "hol") - 6.0 / 7.0).abs() < 1e-9);
        assert!((ratio("Apple", "Aple") - 8.0 / 9.0).abs() < 1e-9);
        // Uma troca custa remoção + inserção
        assert!((ratio("casa", "cosa") - 0.75).abs() < 1e-9);
        assert_eq!(ratio("", ""), 1.0);
        assert_eq!(ratio("abc", ""), 0.0);
        assert!((ratio("Córdoba", "Cordoba") - 12.0 / 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_borderline_similarity_at_default_threshold() {
        let t = DEFAULT_THRESHOLD;
        assert!(word_similarity("hola", "hol", t, RatioMode::Ratio));
        assert!(word_similarity("Apple", "Aple", t, RatioMode::Ratio));
        assert!(!word_similarity("casa", "cosa", t, RatioMode::Ratio));
        assert_eq!(find_similar_word("hol", &SENTENCE, t, RatioMode::Ratio), Some("hola"));
        assert!(any_listed_word_in_tokens(&["buen"], &SENTENCE, t, RatioMode::Ratio));
    }

    #[test]
    fn test_token_set_ratio_scores() {
        assert_eq!(token_set_ratio("de la sociedad", "la SOCIEDAD, de"), 1.0);
        // sect = "social", sect + diff = "social capital" / "social contrato"
        let score = token_set_ratio("capital social", "contrato social");
        assert!((score - 12.0 / 20.0).abs() < 1e-9, "{score}");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("ratio".parse::<RatioMode>().unwrap(), RatioMode::Ratio);
        assert_eq!("QRatio".parse::<RatioMode>().unwrap(), RatioMode::QRatio);
        let err = "WRatio".parse::<RatioMode>().unwrap_err();
        assert!(matches!(err, Error::UnknownOption { option: "mode", .. }));
    }
}
