//! # Esquema BIO sobre Rótulos Livres
//!
//! Os corpora de estatutos usam rótulos definidos pelo anotador (`PER`,
//! `RAZON_SOCIAL`, `FECHA`, `DNI`...), então as tags são strings:
//!
//! - `B-TAG`: primeiro token de uma entidade
//! - `I-TAG`: tokens seguintes da mesma entidade
//! - `O`: fora de qualquer entidade
//!
//! As anotações vêm em offsets de caracteres e os tokens em offsets de bytes;
//! as conversões abaixo fazem a ponte entre os dois.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tokenizer::Token;

/// Tag dos tokens fora de entidades.
pub const OUTSIDE: &str = "O";

pub fn begin(label: &str) -> String {
    format!("B-{label}")
}

pub fn inside(label: &str) -> String {
    format!("I-{label}")
}

/// `"B-PER"` → `Some(("B", "PER"))`, `"O"` → `None`.
fn split_tag(tag: &str) -> Option<(&str, &str)> {
    match tag.split_once('-') {
        Some((prefix @ ("B" | "I"), label)) if !label.is_empty() => Some((prefix, label)),
        _ => None,
    }
}

/// Uma entidade reconstruída a partir das tags. Offsets em caracteres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub text: String,
}

/// Tabela de conversão byte → caractere para um texto.
pub(crate) struct CharIndex {
    /// `byte_to_char[b]` = número de caracteres antes do byte `b` (válido em fronteiras).
    byte_to_char: Vec<usize>,
    /// Offset em bytes de cada caractere, mais `text.len()`.
    char_to_byte: Vec<usize>,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut byte_to_char = vec![0; text.len() + 1];
        let mut char_to_byte = Vec::with_capacity(text.len() + 1);
        for (i, (byte, _)) in text.char_indices().enumerate() {
            byte_to_char[byte] = i;
            char_to_byte.push(byte);
        }
        byte_to_char[text.len()] = char_to_byte.len();
        char_to_byte.push(text.len());
        Self {
            byte_to_char,
            char_to_byte,
        }
    }

    pub(crate) fn to_char(&self, byte: usize) -> usize {
        self.byte_to_char[byte]
    }

    /// `None` se `ch` estiver além do fim do texto.
    pub(crate) fn to_byte(&self, ch: usize) -> Option<usize> {
        self.char_to_byte.get(ch).copied()
    }
}

/// Converte spans `(start, end, label)` em caracteres para uma tag BIO por token.
///
/// Um token só recebe a tag da entidade se estiver inteiramente dentro dela;
/// entidades que cortam um token ao meio ficam como `O`.
pub fn spans_to_bio(text: &str, tokens: &[Token], spans: &[(usize, usize, String)]) -> Vec<String> {
    let index = CharIndex::new(text);
    let mut tags = vec![OUTSIDE.to_string(); tokens.len()];

    for (start, end, label) in spans {
        let (Some(byte_start), Some(byte_end)) = (index.to_byte(*start), index.to_byte(*end)) else {
            debug!(start, end, label = %label, "span fora do texto ignorado");
            continue;
        };
        let mut first = true;
        for (tag, token) in tags.iter_mut().zip(tokens) {
            if token.start >= byte_start && token.end <= byte_end {
                *tag = if first { begin(label) } else { inside(label) };
                first = false;
            }
        }
        if first {
            debug!(start, end, label = %label, "span não alinhado com nenhum token");
        }
    }
    tags
}

/// Reconstrói as entidades a partir das tags BIO de cada token.
///
/// - `B-X` abre uma entidade;
/// - `I-X` continua a entidade aberta de mesmo rótulo, ou abre uma nova;
/// - `O` fecha a entidade aberta.
pub fn bio_to_spans<S: AsRef<str>>(text: &str, tokens: &[Token], tags: &[S]) -> Vec<EntitySpan> {
    let index = CharIndex::new(text);
    let mut spans = Vec::new();
    // (primeiro token, último token, rótulo)
    let mut open: Option<(usize, usize, &str)> = None;

    let close = |open: Option<(usize, usize, &str)>, spans: &mut Vec<EntitySpan>| {
        if let Some((first, last, label)) = open {
            let (byte_start, byte_end) = (tokens[first].start, tokens[last].end);
            spans.push(EntitySpan {
                start: index.to_char(byte_start),
                end: index.to_char(byte_end),
                label: label.to_string(),
                text: text[byte_start..byte_end].to_string(),
            });
        }
    };

    for (i, tag) in tags.iter().enumerate().take(tokens.len()) {
        match split_tag(tag.as_ref()) {
            Some(("I", label)) if matches!(open, Some((_, _, l)) if l == label) => {
                if let Some(span) = open.as_mut() {
                    span.1 = i;
                }
            }
            Some((_, label)) => {
                close(open.take(), &mut spans);
                open = Some((i, i, label));
            }
            None => close(open.take(), &mut spans),
        }
    }
    close(open, &mut spans);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_spans_to_bio() {
        let text = "Juan Pablo vive en Córdoba";
        let tokens = tokenize(text);
        let spans = vec![(0, 10, "PER".to_string()), (19, 26, "LOC".to_string())];

        let tags = spans_to_bio(text, &tokens, &spans);
        assert_eq!(tags, vec!["B-PER", "I-PER", "O", "O", "B-LOC"]);
    }

    #[test]
    fn test_bio_to_spans_char_offsets() {
        let text = "Compañía Pérez y Córdoba";
        let tokens = tokenize(text);
        let tags = ["B-ORG", "I-ORG", "O", "B-LOC"];

        let spans = bio_to_spans(text, &tokens, &tags);
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[0].end), (0, 14));
        assert_eq!(spans[0].text, "Compañía Pérez");
        assert_eq!((spans[1].start, spans[1].end), (17, 24));
        assert_eq!(spans[1].label, "LOC");
    }

    #[test]
    fn test_bio_repairs_inconsistent_tags() {
        let text = "a b c d";
        let tokens = tokenize(text);
        // I- sem B- abre entidade; I- de outro rótulo também
        let tags = ["I-PER", "I-PER", "I-LOC", "O"];

        let spans = bio_to_spans(text, &tokens, &tags);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "a b");
        assert_eq!(spans[1].text, "c");
    }

    #[test]
    fn test_round_trip_through_tokens() {
        let text = "El socio Ana Gómez, DNI 12.345.678.";
        let tokens = tokenize(text);
        let gold = vec![(9, 18, "PER".to_string()), (24, 34, "DNI".to_string())];

        let tags = spans_to_bio(text, &tokens, &gold);
        let spans: Vec<(usize, usize, String)> = bio_to_spans(text, &tokens, &tags)
            .into_iter()
            .map(|s| (s.start, s.end, s.label))
            .collect();
        assert_eq!(spans, gold);
    }
}
