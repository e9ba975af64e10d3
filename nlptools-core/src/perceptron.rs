//! # Averaged Perceptron para NER
//!
//! Classificador de tags por token, treinado online e guiado por erros.
//! Utiliza "Lazy Averaging" para evitar custo O(N*T) na atualização dos pesos médios.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::tagger::OUTSIDE;

/// Peso de um par (feature, tag) com o acumulado para a média.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct Weight {
    value: f64,
    /// $\sum w_t$ até `last_step`.
    total: f64,
    last_step: usize,
}

impl Weight {
    /// Acumula o valor atual até `step` e aplica `delta`.
    fn update(&mut self, step: usize, delta: f64) {
        self.total += (step - self.last_step) as f64 * self.value;
        self.last_step = step;
        self.value += delta;
    }
}

/// Modelo Perceptron Médio (Averaged Perceptron).
///
/// # Averaged Perceptron
/// A versão padrão do Perceptron oscila muito. O "Averaged" usa a **média** dos pesos
/// de todos os passos como modelo final, o que reduz overfitting e estabiliza o aprendizado.
///
/// # Lazy Averaging
/// Cada peso guarda o passo da sua última alteração; a média só é
/// acumulada quando o peso muda e, uma última vez, em [`Perceptron::finalize`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Perceptron {
    /// feature → tag → peso.
    weights: HashMap<String, HashMap<String, Weight>>,
    /// Tags conhecidas; `O` sempre na frente para vencer empates.
    labels: Vec<String>,
    /// Número de tokens processados no treino.
    steps: usize,
    finalized: bool,
}

impl Perceptron {
    pub fn new() -> Self {
        Self {
            labels: vec![OUTSIDE.to_string()],
            ..Self::default()
        }
    }

    /// Registra uma tag. Tags repetidas são ignoradas.
    pub fn add_label(&mut self, label: &str) {
        if !self.labels.iter().any(|l| l == label) {
            self.labels.push(label.to_string());
            self.labels[1..].sort();
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn score(&self, fv: &FeatureVector, label: &str) -> f64 {
        fv.features
            .iter()
            .filter_map(|(name, value)| {
                self.weights
                    .get(name)
                    .and_then(|per_label| per_label.get(label))
                    .map(|w| w.value * value)
            })
            .sum()
    }

    /// Tag de maior pontuação para um token. Empates ficam com a primeira tag.
    pub fn predict_tag(&self, fv: &FeatureVector) -> &str {
        let mut best = self.labels.first().map(String::as_str).unwrap_or(OUTSIDE);
        let mut best_score = f64::NEG_INFINITY;
        for label in &self.labels {
            let score = self.score(fv, label);
            if score > best_score {
                best_score = score;
                best = label.as_str();
            }
        }
        best
    }

    pub fn predict(&self, sentence: &[FeatureVector]) -> Vec<String> {
        sentence.iter().map(|fv| self.predict_tag(fv).to_string()).collect()
    }

    /// Um passo de treino sobre uma sentença; devolve o número de tokens errados.
    ///
    /// Em cada correção, cada feature é descartada com probabilidade `dropout`.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        sentence: &[FeatureVector],
        gold: &[String],
        dropout: f64,
        rng: &mut R,
    ) -> usize {
        let mut mistakes = 0;
        for (fv, truth) in sentence.iter().zip(gold) {
            let guess = self.predict_tag(fv).to_string();
            if &guess != truth {
                mistakes += 1;
                // Ordem fixa para que o sorteio do dropout dependa só da semente
                let mut names: Vec<&String> = fv.features.keys().collect();
                names.sort_unstable();
                for name in names {
                    if dropout > 0.0 && rng.gen_bool(dropout.min(1.0)) {
                        continue;
                    }
                    self.update_feature(name, truth, 1.0);
                    self.update_feature(name, &guess, -1.0);
                }
            }
            self.steps += 1;
        }
        mistakes
    }

    fn update_feature(&mut self, name: &str, label: &str, delta: f64) {
        let step = self.steps;
        self.weights
            .entry(name.to_string())
            .or_default()
            .entry(label.to_string())
            .or_default()
            .update(step, delta);
    }

    /// Substitui os pesos pela média de todos os passos. Chamadas repetidas não têm efeito.
    pub fn finalize(&mut self) {
        if self.finalized || self.steps == 0 {
            return;
        }
        let steps = self.steps as f64;
        for per_label in self.weights.values_mut() {
            for weight in per_label.values_mut() {
                weight.update(self.steps, 0.0);
                weight.value = weight.total / steps;
                weight.total = 0.0;
                weight.last_step = self.steps;
            }
        }
        self.finalized = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{extract_features, Gazetteers};
    use crate::tokenizer::tokenize;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tags(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_perceptron_learning_lazy() {
        let gaz = Gazetteers::default();
        let sentence = extract_features(&tokenize("Juan es socio"), &gaz);
        let gold = tags(&["B-PER", "O", "O"]);

        let mut model = Perceptron::new();
        model.add_label("B-PER");
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..5 {
            model.update(&sentence, &gold, 0.0, &mut rng);
        }
        model.finalize();

        let test = extract_features(&tokenize("Juan es"), &gaz);
        assert_eq!(model.predict(&test)[0], "B-PER");
    }

    #[test]
    fn test_mistakes_decrease() {
        let gaz = Gazetteers::default();
        let sentence = extract_features(&tokenize("La firma Pérez S.R.L. en Rosario"), &gaz);
        let gold = tags(&["O", "O", "B-ORG", "I-ORG", "O", "B-LOC"]);

        let mut model = Perceptron::new();
        for label in ["B-ORG", "I-ORG", "B-LOC"] {
            model.add_label(label);
        }
        let mut rng = StdRng::seed_from_u64(1);
        let first = model.update(&sentence, &gold, 0.0, &mut rng);
        let mut last = first;
        for _ in 0..50 {
            last = model.update(&sentence, &gold, 0.0, &mut rng);
        }
        assert!(first >= 3);
        assert_eq!(last, 0);
    }

    #[test]
    fn test_labels_keep_outside_first() {
        let mut model = Perceptron::new();
        model.add_label("I-PER");
        model.add_label("B-PER");
        model.add_label("B-PER");
        assert_eq!(model.labels(), ["O", "B-PER", "I-PER"]);
    }
}
