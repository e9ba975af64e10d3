//! # nlptools-core - Preparação e Aumento de Documentos Jurídicos Anotados
//!
//! Ferramentas de texto para montar datasets de NER a partir de estatutos
//! societários argentinos (em espanhol). O crate cobre o ciclo completo:
//!
//! 1.  **Comparação** ([`comparison`]): predicados de similaridade aproximada entre palavras e sentenças.
//! 2.  **Documentos** ([`document`]): registros anotados, com reindexação dos spans após substituir entidades.
//! 3.  **Geradores** ([`generators`]): datas, nomes, DNI/CUIT, endereços e frases societárias sintéticas,
//!     todos reprodutíveis por semente.
//! 4.  **Datasets** ([`datasets`]): tabelas de referência embutidas e corpus de treino.
//! 5.  **Treino** ([`training`]): reconhecedor de entidades (tokenizador + features + perceptron)
//!     com políticas de parada.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use nlptools_core::TaggedDocument;
//! use nlptools_core::generators::Generator;
//!
//! let mut doc = TaggedDocument::from_json(r#"{
//!     "doc_id": "d1",
//!     "text": "Juan vive en Cordoba",
//!     "entities": {"tags": [{"start": 0, "end": 4, "tag": "PER", "text": "Juan"}]}
//! }"#).unwrap();
//!
//! // Troca a pessoa por um nome sintético
//! let mut generator = Generator::new(Some(42));
//! let name = generator.names(1, nlptools_core::generators::names::NameKind::Person).unwrap();
//! doc.entities[0].new_text = Some(name[0].clone());
//!
//! let augmented = doc.augment().unwrap();
//! assert!(augmented.text.ends_with(" vive en Cordoba"));
//! assert_eq!(augmented.entities[0].end, name[0].chars().count());
//! ```
//!
//! ## Módulos de Apoio
//!
//! - [`tokenizer`]: segmentação com offsets, ciente de abreviações e siglas societárias.
//! - [`features`]: engenharia de características por token e gazetteers.
//! - [`tagger`]: conversão entre spans e tags BIO.
//! - [`perceptron`]: classificador de tags com pesos médios.
//! - [`numbers`]: numerais em espanhol.

pub mod comparison;
pub mod datasets;
pub mod document;
pub mod error;
pub mod features;
pub mod generators;
pub mod numbers;
pub mod perceptron;
pub mod tagger;
pub mod tokenizer;
pub mod training;

pub use comparison::{RatioMode, SimilarityOptions};
pub use datasets::{load_reference_table, load_training_corpus, ReferenceTable, TableName, TrainingExample};
pub use document::{TaggedDocument, TaggedEntity};
pub use error::{Error, Result};
pub use generators::Generator;
pub use tagger::EntitySpan;
pub use tokenizer::{Token, TokenizerMode};
pub use training::{train_new_model, train_streaming, EntityRecognizer, TrainingConfig, TrainingEvent};
