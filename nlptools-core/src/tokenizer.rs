//! # Tokenizador para Textos Jurídicos em Espanhol
//!
//! Divide o texto bruto em tokens (palavras, números, pontuação). Cada token
//! preserva sua posição original no texto (offset em bytes), o que permite
//! alinhar as predições do modelo com os spans anotados.
//!
//! ## Esquema de Tokenização
//!
//! - **Standard**: Palavras separadas por espaços/pontuações. Preserva abreviações
//!   ("Dr.", "Av.", "S.R.L."), números com separador de milhar ("1.500.000") e
//!   identificadores com hífen ("20-12345678-9").
//! - **Conservative**: Como o Standard, mas mantém juntos topônimos compostos
//!   ("Buenos Aires", "Santiago del Estero").
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use nlptools_core::tokenizer::{tokenize_with_mode, TokenizerMode};
//!
//! let text = "Dr. Pérez, CUIT 20-12345678-9, domiciliado en Buenos Aires.";
//!
//! let tokens = tokenize_with_mode(text, TokenizerMode::Conservative);
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert!(texts.contains(&"Dr."));
//! assert!(texts.contains(&"20-12345678-9"));
//! assert!(texts.contains(&"Buenos Aires"));
//! ```

use serde::{Deserialize, Serialize};

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "Pérez", ",", "1.500.000").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

/// Estratégias de tokenização disponíveis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    /// **Padrão**: separa por espaços e pontuações, preservando abreviações e números.
    #[default]
    Standard,
    /// **Conservador**: mantém topônimos compostos como um único token.
    Conservative,
}

/// Abreviações comuns em estatutos que não devem ter o ponto tratado como fim de sentença.
///
/// Siglas societárias aparecem em todos os estágios do acúmulo ("S", "S.R", "S.R.L").
const ABBREVIATIONS: &[&str] = &[
    "Dr", "Dra", "Sr", "Sra", "Srta", "Lic", "Ing", "Arq", "Cdor", "Cra", "Esc", "Prof",
    "Av", "Avda", "Bv", "Pje", "Dpto", "Depto", "Pcia", "Prov", "Loc", "Mz", "Nro", "Nº",
    "Art", "Inc", "Cap", "Tit", "Ley", "Dec", "Res", "Exp", "Fs", "Pág", "Cfr", "etc",
    "S", "S.A", "S.R", "S.R.L", "S.A.S", "S.A.U", "S.C", "S.C.A", "S.H",
];

/// Locuções mantidas juntas no modo Conservative.
const COMPOUNDS: &[&str] = &[
    "buenos aires", "ciudad autónoma de buenos aires", "santa fe", "santa cruz",
    "santiago del estero", "tierra del fuego", "entre ríos", "la pampa", "la rioja",
    "san juan", "san luis", "río negro", "mar del plata", "la plata", "san miguel de tucumán",
    "san isidro", "vicente lópez", "bahía blanca", "villa maría", "río cuarto",
];

/// Tokeniza um texto usando o algoritmo padrão.
pub fn tokenize(text: &str) -> Vec<Token> {
    tokenize_with_mode(text, TokenizerMode::Standard)
}

/// Tokeniza um texto com o modo especificado.
pub fn tokenize_with_mode(text: &str, mode: TokenizerMode) -> Vec<Token> {
    let mut tokens = match mode {
        TokenizerMode::Conservative => tokenize_conservative(text),
        TokenizerMode::Standard => tokenize_standard(text),
    };

    // Re-indexa os tokens
    for (i, token) in tokens.iter_mut().enumerate() {
        token.index = i;
    }
    tokens
}

fn tokenize_conservative(text: &str) -> Vec<Token> {
    let standard = tokenize_standard(text);
    if standard.is_empty() {
        return standard;
    }

    let mut merged = Vec::new();
    let mut i = 0;

    while i < standard.len() {
        // Maior locução começando em i ("Ciudad Autónoma de Buenos Aires" tem 5 tokens)
        let mut best_match_len = 0;

        for window in 2..=5 {
            if i + window > standard.len() {
                break;
            }

            let candidate = &standard[i..i + window];
            // Só junta tokens separados por espaço em branco
            let is_adjacent = candidate
                .windows(2)
                .all(|w| text[w[0].end..w[1].start].chars().all(char::is_whitespace));

            if is_adjacent {
                let combined = candidate
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase();
                if COMPOUNDS.contains(&combined.as_str()) {
                    best_match_len = window;
                }
            }
        }

        if best_match_len > 0 {
            let first = &standard[i];
            let last = &standard[i + best_match_len - 1];
            merged.push(Token {
                text: text[first.start..last.end].to_string(),
                start: first.start,
                end: last.end,
                index: 0,
            });
            i += best_match_len;
        } else {
            merged.push(standard[i].clone());
            i += 1;
        }
    }

    merged
}

fn tokenize_standard(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current_start = 0;
    let mut current_text = String::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    for (i, &(byte_pos, ch)) in chars.iter().enumerate() {
        let next = chars.get(i + 1).map(|&(_, c)| c);

        if ch.is_alphanumeric() || ch == 'º' || (ch == '-' && !current_text.is_empty()) {
            if current_text.is_empty() {
                current_start = byte_pos;
            }
            current_text.push(ch);
        } else if ch == '.' && !current_text.is_empty() {
            let is_abbrev = ABBREVIATIONS.contains(&current_text.as_str());
            // Separador de milhar: "1.500.000"
            let current_is_num = current_text
                .chars()
                .all(|c| c.is_ascii_digit() || c == '.');
            let next_is_num = next.map(|c| c.is_ascii_digit()).unwrap_or(false);

            if is_abbrev || (current_is_num && next_is_num) {
                current_text.push('.');
            } else {
                flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
                push_token(&mut tokens, ".".to_string(), byte_pos, byte_pos + 1);
            }
        } else if ch == ',' && next.map(|c| c.is_ascii_digit()).unwrap_or(false)
            && !current_text.is_empty()
            && current_text.chars().all(|c| c.is_ascii_digit() || c == '.')
        {
            // Decimal com vírgula: "1.500,50"
            current_text.push(ch);
        } else if ch.is_whitespace() {
            flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
        } else {
            flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
            push_token(&mut tokens, ch.to_string(), byte_pos, byte_pos + ch.len_utf8());
        }
    }

    flush_token(&mut tokens, &mut current_text, current_start, text.len());
    tokens
}

/// Fecha o token acumulado e adiciona à lista (se não vazio)
fn flush_token(tokens: &mut Vec<Token>, text: &mut String, start: usize, end: usize) {
    if !text.is_empty() {
        tokens.push(Token {
            text: text.clone(),
            start,
            end,
            index: 0, // será atribuído depois
        });
        text.clear();
    }
}

/// Adiciona um token de pontuação diretamente
fn push_token(tokens: &mut Vec<Token>, text: String, start: usize, end: usize) {
    tokens.push(Token {
        text,
        start,
        end,
        index: 0,
    });
}
