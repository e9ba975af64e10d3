//! # Documentos Anotados e Reindexação de Spans
//!
//! Um [`TaggedDocument`] envolve um registro exportado pela ferramenta de
//! anotação:
//!
//! ```json
//! {"doc_id": "d1", "text": "Juan vive en Cordoba",
//!  "entities": {"tags": [{"start": 0, "end": 4, "tag": "PER", "text": "Juan", "new_text": "Juan Pablo"}]}}
//! ```
//!
//! ## Aumento de Dados
//!
//! Para gerar documentos sintéticos, cada entidade recebe um `new_text`
//! (tipicamente vindo de [`crate::generators`]). Ao trocar o texto, os spans
//! seguintes se deslocam pela diferença de comprimento:
//!
//! ```text
//! "Juan vive en Cordoba"        Juan → Juan Pablo (diff = +6)
//!  [0,4) PER  [13,20) LOC
//! "Juan Pablo vive en Cordoba"
//!  [0,10) PER [19,26) LOC
//! ```
//!
//! Offsets são sempre contados em caracteres Unicode, não em bytes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::datasets::TrainingExample;
use crate::error::{Error, Result};

/// Uma entidade anotada. `[start, end)` em caracteres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedEntity {
    pub start: usize,
    pub end: usize,
    pub tag: String,
    pub text: String,
    /// Texto substituto usado no aumento de dados.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_text: Option<String>,
}

impl TaggedEntity {
    /// Diferença de comprimento, em caracteres, entre `new_text` e `text`.
    fn length_diff(&self) -> Option<isize> {
        self.new_text
            .as_ref()
            .map(|new| new.chars().count() as isize - self.text.chars().count() as isize)
    }
}

/// Documento com texto e entidades, sempre ordenadas por `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedDocument {
    pub doc_id: String,
    pub text: String,
    pub entities: Vec<TaggedEntity>,
}

/// Entidade no formato de renderização (`start`, `end`, `label`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplacyEntity {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

/// Documento no formato de renderização manual de entidades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplacyDoc {
    pub text: String,
    pub ents: Vec<DisplacyEntity>,
    pub title: String,
}

/// Trecho contíguo do texto; `label` presente quando é uma entidade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub text: String,
    pub label: Option<String>,
}

impl TaggedDocument {
    /// Valida um registro JSON e constrói o documento.
    pub fn from_value(value: Value) -> Result<Self> {
        let record = match value {
            Value::Object(record) => record,
            other => {
                return Err(Error::InvalidRecord(format!(
                    "esperado um objeto JSON, recebido {}",
                    json_kind(&other)
                )))
            }
        };

        for field in ["doc_id", "text", "entities"] {
            if !record.contains_key(field) {
                return Err(Error::MissingField(field.to_string()));
            }
        }

        let doc_id = match &record["doc_id"] {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(Error::InvalidRecord(format!(
                    "`doc_id` deve ser texto ou número, recebido {}",
                    json_kind(other)
                )))
            }
        };
        let text = record["text"]
            .as_str()
            .ok_or_else(|| Error::InvalidRecord("`text` deve ser texto".to_string()))?
            .to_string();
        let tags = record["entities"]
            .get("tags")
            .ok_or_else(|| Error::MissingField("entities.tags".to_string()))?;
        let mut entities: Vec<TaggedEntity> = serde_json::from_value(tags.clone())
            .map_err(|e| Error::InvalidRecord(format!("`entities.tags`: {e}")))?;

        let offsets = char_offsets(&text);
        let len = offsets.len() - 1;
        for entity in &entities {
            if entity.start >= entity.end || entity.end > len {
                return Err(Error::InvalidRecord(format!(
                    "span [{}, {}) de `{}` fora do texto de {len} caracteres",
                    entity.start, entity.end, entity.tag
                )));
            }
            // O deslocamento do reindexador vem de `text`; ele precisa ser o trecho do span
            let covered = span_text(&text, &offsets, entity.start, entity.end).unwrap_or_default();
            if covered != entity.text {
                return Err(Error::InvalidRecord(format!(
                    "span [{}, {}) cobre {covered:?}, mas `text` é {:?}",
                    entity.start, entity.end, entity.text
                )));
            }
        }
        entities.sort_by_key(|e| e.start);

        Ok(Self {
            doc_id,
            text,
            entities,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Reposiciona os spans como se cada `text` tivesse sido trocado por `new_text`.
    ///
    /// Para cada entidade com diferença `d != 0`, em ordem de `start`: o próprio
    /// `end` anda `d` e todas as entidades seguintes andam `d` inteiras. Se
    /// alguma entidade não tiver `new_text`, nada é alterado.
    ///
    /// Não é idempotente: chamar duas vezes desloca duas vezes.
    pub fn index_augmentation(&mut self) -> Result<&[TaggedEntity]> {
        let diffs = self
            .entities
            .iter()
            .map(|e| e.length_diff().ok_or_else(|| Error::MissingField("new_text".to_string())))
            .collect::<Result<Vec<_>>>()?;

        for (i, diff) in diffs.into_iter().enumerate() {
            if diff == 0 {
                continue;
            }
            self.entities[i].end = self.entities[i].end.saturating_add_signed(diff);
            for later in &mut self.entities[i + 1..] {
                later.start = later.start.saturating_add_signed(diff);
                later.end = later.end.saturating_add_signed(diff);
            }
        }
        Ok(&self.entities)
    }

    /// O texto com cada span trocado pelo seu `new_text`. Usa os spans atuais,
    /// portanto deve ser chamado antes de [`TaggedDocument::index_augmentation`]:
    /// spans que não cobrem mais o seu `text` são rejeitados com `InvalidRecord`.
    pub fn augmented_text(&self) -> Result<String> {
        let offsets = char_offsets(&self.text);
        let mut out = String::with_capacity(self.text.len());
        let mut cursor = 0;

        for entity in &self.entities {
            let new_text = entity
                .new_text
                .as_deref()
                .ok_or_else(|| Error::MissingField("new_text".to_string()))?;
            if entity.start < cursor {
                return Err(Error::InvalidRecord(format!(
                    "span [{}, {}) sobrepõe a entidade anterior",
                    entity.start, entity.end
                )));
            }
            let covered = span_text(&self.text, &offsets, entity.start, entity.end);
            if covered != Some(entity.text.as_str()) {
                return Err(Error::InvalidRecord(format!(
                    "span [{}, {}) não cobre mais {:?}; os spans já foram reindexados?",
                    entity.start, entity.end, entity.text
                )));
            }
            // `covered` garante start e end dentro de `offsets`
            out.push_str(&self.text[offsets[cursor]..offsets[entity.start]]);
            out.push_str(new_text);
            cursor = entity.end;
        }
        out.push_str(&self.text[offsets[cursor]..]);
        Ok(out)
    }

    /// Novo documento com o texto reescrito e os spans reindexados.
    ///
    /// As entidades do resultado têm `text` igual ao antigo `new_text`.
    pub fn augment(&self) -> Result<TaggedDocument> {
        let text = self.augmented_text()?;
        let mut doc = self.clone();
        doc.index_augmentation()?;
        for entity in &mut doc.entities {
            if let Some(new_text) = entity.new_text.take() {
                entity.text = new_text;
            }
        }
        doc.text = text;
        Ok(doc)
    }

    /// Formato `{text, ents, title}` usado para renderizar entidades.
    pub fn displacy_format(&self) -> DisplacyDoc {
        DisplacyDoc {
            text: self.text.clone(),
            ents: self
                .entities
                .iter()
                .map(|e| DisplacyEntity {
                    start: e.start,
                    end: e.end,
                    label: e.tag.clone(),
                })
                .collect(),
            title: self.doc_id.clone(),
        }
    }

    /// Divide o texto em trechos simples e trechos rotulados.
    ///
    /// Entidades que se sobrepõem à anterior são ignoradas.
    pub fn segments(&self) -> Vec<Segment> {
        let offsets = char_offsets(&self.text);
        let len = offsets.len() - 1;
        let mut segments = Vec::new();
        let mut cursor = 0;

        for entity in &self.entities {
            if entity.start < cursor || entity.end > len {
                continue;
            }
            if entity.start > cursor {
                segments.push(Segment {
                    text: self.text[offsets[cursor]..offsets[entity.start]].to_string(),
                    label: None,
                });
            }
            segments.push(Segment {
                text: self.text[offsets[entity.start]..offsets[entity.end]].to_string(),
                label: Some(entity.tag.clone()),
            });
            cursor = entity.end;
        }
        if cursor < len {
            segments.push(Segment {
                text: self.text[offsets[cursor]..].to_string(),
                label: None,
            });
        }
        segments
    }

    /// `(texto, {"entities": [(start, end, TAG)]})`, com rótulos em maiúsculas.
    pub fn training_example(&self) -> TrainingExample {
        TrainingExample::new(
            self.text.clone(),
            self.entities
                .iter()
                .map(|e| (e.start, e.end, e.tag.to_uppercase()))
                .collect(),
        )
    }
}

/// Trecho `[start, end)` em caracteres; `None` se o intervalo não couber no texto.
fn span_text<'t>(text: &'t str, offsets: &[usize], start: usize, end: usize) -> Option<&'t str> {
    if start > end {
        return None;
    }
    Some(&text[*offsets.get(start)?..*offsets.get(end)?])
}

/// Offset em bytes de cada caractere, mais `text.len()` no final.
fn char_offsets(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "booleano",
        Value::Number(_) => "número",
        Value::String(_) => "texto",
        Value::Array(_) => "lista",
        Value::Object(_) => "objeto",
    }
}
