//! # Treino de Reconhecedores de Entidades
//!
//! Monta um modelo vazio a partir dos rótulos do corpus e o treina por épocas,
//! com três políticas de parada:
//!
//! 1. **Épocas**: no máximo `epochs` passadas pelo corpus (padrão 300).
//! 2. **Perda alvo**: com `target_loss`, para assim que a perda fica abaixo dela.
//! 3. **Convergência**: sem perda alvo, acompanha a menor perda vista. Uma época que
//!    a melhora só atualiza o mínimo; nas demais, o treino para quando
//!    - a perda passa de `min * (1 + loss_tolerance)` (esquecimento), ou
//!    - a perda fica abaixo de `start * (1 - success_threshold)`, ou abaixo de 1.
//!
//! A perda de uma época é o número de tokens que o perceptron errou.
//!
//! ## Eventos
//!
//! [`train_streaming`] emite um [`TrainingEvent`] por época num canal `mpsc`,
//! o que permite ao servidor web transmitir o progresso por WebSocket. Fechar o
//! receptor interrompe o treino.

use std::sync::mpsc;
use std::time::Instant;

use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::datasets::TrainingExample;
use crate::error::{Error, Result};
use crate::features::{extract_features, FeatureVector, Gazetteers};
use crate::generators::Generator;
use crate::perceptron::Perceptron;
use crate::tagger::{begin, bio_to_spans, inside, spans_to_bio, EntitySpan};
use crate::tokenizer::{tokenize_with_mode, TokenizerMode};

/// Hiperparâmetros do treino. Campos ausentes no JSON usam os padrões.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    /// Para quando a perda da época ficar abaixo deste valor.
    pub target_loss: Option<f64>,
    /// Probabilidade de descartar cada feature numa correção.
    pub dropout: f64,
    /// Fração de redução da perda inicial considerada sucesso.
    pub success_threshold: f64,
    /// Tolerância de piora relativa à menor perda antes de parar.
    pub loss_tolerance: Option<f64>,
    pub seed: Option<u64>,
    pub tokenizer: TokenizerMode,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 300,
            target_loss: None,
            dropout: 0.1,
            success_threshold: 0.9,
            loss_tolerance: None,
            seed: None,
            tokenizer: TokenizerMode::Standard,
        }
    }
}

/// Por que o laço de treino terminou.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EpochsExhausted,
    TargetLossReached,
    LossDiverged,
    Converged,
    /// O receptor dos eventos foi fechado.
    Cancelled,
}

/// Eventos emitidos durante o treino.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TrainingEvent {
    /// Modelo vazio criado e features extraídas.
    Started {
        examples: usize,
        labels: Vec<String>,
        epochs: usize,
    },
    /// Uma passada completa pelo corpus.
    EpochCompleted { epoch: usize, loss: f64, min_loss: f64 },
    Finished {
        epochs_run: usize,
        final_loss: Option<f64>,
        stop_reason: StopReason,
        elapsed_ms: u64,
    },
    Error { message: String },
}

/// Reconhecedor de entidades: tokenizador, gazetteers e perceptron.
#[derive(Debug, Clone)]
pub struct EntityRecognizer {
    model: Perceptron,
    gazetteers: Gazetteers,
    tokenizer: TokenizerMode,
}

impl EntityRecognizer {
    /// Modelo sem pesos, com uma tag `B-`/`I-` para cada rótulo visto no corpus.
    pub fn blank(examples: &[TrainingExample], tokenizer: TokenizerMode) -> Result<Self> {
        let mut model = Perceptron::new();
        for example in examples {
            for (_, _, label) in example.entities() {
                model.add_label(&begin(label));
                model.add_label(&inside(label));
            }
        }
        Ok(Self {
            model,
            gazetteers: Gazetteers::from_reference_tables()?,
            tokenizer,
        })
    }

    /// Tags BIO conhecidas pelo modelo, `O` primeiro.
    pub fn labels(&self) -> &[String] {
        self.model.labels()
    }

    pub fn tokenizer(&self) -> TokenizerMode {
        self.tokenizer
    }

    /// Entidades encontradas em `text`, com offsets em caracteres.
    pub fn predict(&self, text: &str) -> Vec<EntitySpan> {
        let tokens = tokenize_with_mode(text, self.tokenizer);
        if tokens.is_empty() {
            return Vec::new();
        }
        let features = extract_features(&tokens, &self.gazetteers);
        let tags = self.model.predict(&features);
        bio_to_spans(text, &tokens, &tags)
    }

    /// Features e tags-ouro de cada exemplo, extraídas em paralelo.
    fn prepare(&self, examples: &[TrainingExample]) -> Vec<(Vec<FeatureVector>, Vec<String>)> {
        examples
            .par_iter()
            .map(|example| {
                let tokens = tokenize_with_mode(example.text(), self.tokenizer);
                let features = extract_features(&tokens, &self.gazetteers);
                let gold = spans_to_bio(example.text(), &tokens, example.entities());
                (features, gold)
            })
            .collect()
    }
}

/// As políticas de parada, avaliadas ao fim de cada época.
#[derive(Debug, Clone)]
struct StopPolicy {
    target_loss: Option<f64>,
    loss_tolerance: Option<f64>,
    success_threshold: f64,
    start_loss: Option<f64>,
    min_loss: f64,
}

impl StopPolicy {
    fn new(config: &TrainingConfig) -> Self {
        Self {
            target_loss: config.target_loss,
            loss_tolerance: config.loss_tolerance,
            success_threshold: config.success_threshold,
            start_loss: None,
            min_loss: f64::INFINITY,
        }
    }

    /// Épocas que melhoram a menor perda só a registram; as demais podem parar o treino.
    fn observe(&mut self, loss: f64) -> Option<StopReason> {
        let start = *self.start_loss.get_or_insert(loss);

        if let Some(target) = self.target_loss {
            return (loss < target).then_some(StopReason::TargetLossReached);
        }

        let tolerance = self.loss_tolerance.filter(|t| *t > 0.0);
        if loss < self.min_loss {
            self.min_loss = loss;
            None
        } else if tolerance.is_some_and(|t| loss > self.min_loss * (1.0 + t)) {
            Some(StopReason::LossDiverged)
        } else if loss < start * (1.0 - self.success_threshold) || loss < 1.0 {
            Some(StopReason::Converged)
        } else {
            None
        }
    }
}

/// Resultado de um treino.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: EntityRecognizer,
    /// Perda de cada época executada.
    pub losses: Vec<f64>,
    pub stop_reason: StopReason,
    pub elapsed_ms: u64,
}

/// Treina um reconhecedor novo sobre `examples`.
pub fn train_new_model(examples: &[TrainingExample], config: &TrainingConfig) -> Result<TrainingOutcome> {
    run(examples, config, |_| true)
}

/// Como [`train_new_model`], enviando um [`TrainingEvent`] por etapa em `tx`.
///
/// Se o receptor for fechado, o treino para na época corrente com
/// [`StopReason::Cancelled`].
pub fn train_streaming(
    examples: &[TrainingExample],
    config: &TrainingConfig,
    tx: mpsc::Sender<TrainingEvent>,
) -> Result<TrainingOutcome> {
    let result = run(examples, config, |event| tx.send(event).is_ok());
    if let Err(e) = &result {
        let _ = tx.send(TrainingEvent::Error {
            message: e.to_string(),
        });
    }
    result
}

fn run(
    examples: &[TrainingExample],
    config: &TrainingConfig,
    // Devolve `false` quando ninguém mais escuta os eventos.
    mut emit: impl FnMut(TrainingEvent) -> bool,
) -> Result<TrainingOutcome> {
    if examples.is_empty() {
        return Err(Error::EmptyTrainingSet);
    }
    let started = Instant::now();

    let mut recognizer = EntityRecognizer::blank(examples, config.tokenizer)?;
    let prepared = recognizer.prepare(examples);
    info!(
        examples = examples.len(),
        labels = recognizer.labels().len(),
        epochs = config.epochs,
        "treino iniciado"
    );
    let listening = emit(TrainingEvent::Started {
        examples: examples.len(),
        labels: recognizer.labels().to_vec(),
        epochs: config.epochs,
    });

    let mut generator = Generator::new(config.seed);
    let mut order: Vec<usize> = (0..prepared.len()).collect();
    let mut policy = StopPolicy::new(config);
    let mut losses = Vec::new();
    let mut stop_reason = StopReason::EpochsExhausted;
    let epochs = if listening {
        config.epochs
    } else {
        stop_reason = StopReason::Cancelled;
        0
    };

    for epoch in 0..epochs {
        order.shuffle(generator.rng());
        let mut loss = 0usize;
        for &i in &order {
            let (features, gold) = &prepared[i];
            loss += recognizer
                .model
                .update(features, gold, config.dropout, generator.rng());
        }
        let loss = loss as f64;
        losses.push(loss);

        let decision = policy.observe(loss);
        debug!(epoch, loss, min_loss = policy.min_loss, "época concluída");
        let listening = emit(TrainingEvent::EpochCompleted {
            epoch,
            loss,
            min_loss: policy.min_loss,
        });
        if !listening {
            info!(epoch, "receptor de eventos fechado, treino interrompido");
            stop_reason = StopReason::Cancelled;
            break;
        }
        if let Some(reason) = decision {
            stop_reason = reason;
            break;
        }
    }

    recognizer.model.finalize();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    info!(
        epochs_run = losses.len(),
        final_loss = ?losses.last(),
        ?stop_reason,
        elapsed_ms,
        "treino concluído"
    );
    emit(TrainingEvent::Finished {
        epochs_run: losses.len(),
        final_loss: losses.last().copied(),
        stop_reason,
        elapsed_ms,
    });

    Ok(TrainingOutcome {
        model: recognizer,
        losses,
        stop_reason,
        elapsed_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<TrainingExample> {
        vec![
            TrainingExample::new(
                "Juan Pérez vive en Córdoba",
                vec![(0, 10, "PER".into()), (19, 26, "LOC".into())],
            ),
            TrainingExample::new(
                "María Gómez vive en Rosario",
                vec![(0, 11, "PER".into()), (20, 27, "LOC".into())],
            ),
            TrainingExample::new(
                "Pedro Díaz vive en Mendoza",
                vec![(0, 10, "PER".into()), (19, 26, "LOC".into())],
            ),
        ]
    }

    fn fixed_epochs(epochs: usize) -> TrainingConfig {
        TrainingConfig {
            epochs,
            // nunca alcançada: roda todas as épocas
            target_loss: Some(-1.0),
            dropout: 0.0,
            seed: Some(1),
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_blank_registers_labels() {
        let recognizer = EntityRecognizer::blank(&corpus(), TokenizerMode::Standard).unwrap();
        assert_eq!(recognizer.labels(), ["O", "B-LOC", "B-PER", "I-LOC", "I-PER"]);
    }

    #[test]
    fn test_empty_training_set() {
        assert!(matches!(
            train_new_model(&[], &TrainingConfig::default()),
            Err(Error::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_training_learns_the_corpus() {
        let outcome = train_new_model(&corpus(), &fixed_epochs(30)).unwrap();
        assert_eq!(outcome.stop_reason, StopReason::EpochsExhausted);
        assert_eq!(outcome.losses.len(), 30);
        assert_eq!(outcome.losses.last(), Some(&0.0));

        let entities = outcome.model.predict("María Gómez vive en Rosario");
        let spans: Vec<(usize, usize, &str)> = entities
            .iter()
            .map(|e| (e.start, e.end, e.label.as_str()))
            .collect();
        assert_eq!(spans, vec![(0, 11, "PER"), (20, 27, "LOC")]);
    }

    #[test]
    fn test_default_policy_stops_on_convergence() {
        let config = TrainingConfig {
            dropout: 0.0,
            seed: Some(3),
            ..TrainingConfig::default()
        };
        let outcome = train_new_model(&corpus(), &config).unwrap();
        assert_eq!(outcome.stop_reason, StopReason::Converged);
        assert!(outcome.losses.len() < 300);
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        let config = TrainingConfig {
            epochs: 5,
            seed: Some(9),
            ..TrainingConfig::default()
        };
        let a = train_new_model(&corpus(), &config).unwrap();
        let b = train_new_model(&corpus(), &config).unwrap();
        assert_eq!(a.losses, b.losses);
    }

    #[test]
    fn test_streaming_events() {
        let (tx, rx) = mpsc::channel();
        let outcome = train_streaming(&corpus(), &fixed_epochs(3), tx).unwrap();
        let events: Vec<TrainingEvent> = rx.try_iter().collect();

        assert!(matches!(events.first(), Some(TrainingEvent::Started { examples: 3, .. })));
        let epochs = events
            .iter()
            .filter(|e| matches!(e, TrainingEvent::EpochCompleted { .. }))
            .count();
        assert_eq!(epochs, outcome.losses.len());
        assert!(matches!(
            events.last(),
            Some(TrainingEvent::Finished { epochs_run: 3, .. })
        ));
    }

    #[test]
    fn test_streaming_stops_when_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let outcome = train_streaming(&corpus(), &fixed_epochs(50), tx).unwrap();
        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
        assert!(outcome.losses.is_empty());
    }

    #[test]
    fn test_streaming_reports_errors() {
        let (tx, rx) = mpsc::channel();
        assert!(train_streaming(&[], &TrainingConfig::default(), tx).is_err());
        assert!(matches!(rx.try_recv(), Ok(TrainingEvent::Error { .. })));
    }

    #[test]
    fn test_stop_policy() {
        let target = TrainingConfig {
            target_loss: Some(5.0),
            ..TrainingConfig::default()
        };
        let mut policy = StopPolicy::new(&target);
        assert_eq!(policy.observe(10.0), None);
        assert_eq!(policy.observe(4.0), Some(StopReason::TargetLossReached));

        let tolerant = TrainingConfig {
            loss_tolerance: Some(0.5),
            ..TrainingConfig::default()
        };
        let mut policy = StopPolicy::new(&tolerant);
        assert_eq!(policy.observe(100.0), None);
        assert_eq!(policy.observe(40.0), None);
        assert_eq!(policy.observe(55.0), None);
        assert_eq!(policy.observe(61.0), Some(StopReason::LossDiverged));

        // Uma época que melhora só registra a nova menor perda
        let mut policy = StopPolicy::new(&TrainingConfig::default());
        assert_eq!(policy.observe(100.0), None);
        assert_eq!(policy.observe(9.0), None);
        assert_eq!(policy.min_loss, 9.0);
        assert_eq!(policy.observe(9.5), Some(StopReason::Converged));

        let mut policy = StopPolicy::new(&TrainingConfig::default());
        assert_eq!(policy.observe(0.5), None);
        assert_eq!(policy.observe(0.5), Some(StopReason::Converged));

        // Sem melhora e acima de 10% da perda inicial: continua
        let mut policy = StopPolicy::new(&TrainingConfig::default());
        assert_eq!(policy.observe(100.0), None);
        assert_eq!(policy.observe(50.0), None);
        assert_eq!(policy.observe(60.0), None);
    }

    #[test]
    fn test_zero_tolerance_is_ignored() {
        let config = TrainingConfig {
            loss_tolerance: Some(0.0),
            ..TrainingConfig::default()
        };
        let mut policy = StopPolicy::new(&config);
        assert_eq!(policy.observe(100.0), None);
        assert_eq!(policy.observe(50.0), None);
        assert_eq!(policy.observe(51.0), None);
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: TrainingConfig = serde_json::from_str(r#"{"epochs": 10}"#).unwrap();
        assert_eq!(config.epochs, 10);
        assert_eq!(config.dropout, 0.1);
        assert_eq!(config.success_threshold, 0.9);
        assert_eq!(config.target_loss, None);
    }
}
