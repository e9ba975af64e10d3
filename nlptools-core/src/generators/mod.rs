//! # Geradores de Campos Sintéticos
//!
//! Produzem valores plausíveis para substituir entidades anotadas em estatutos:
//! datas, nomes, documentos, montantes, endereços e frases societárias.
//!
//! ## Determinismo
//!
//! Não existe estado aleatório global. Todo gerador é um método de
//! [`Generator`], que carrega o seu próprio `StdRng`:
//!
//! - `Generator::new(Some(seed))` → sequência reprodutível;
//! - `Generator::new(None)` → semente tirada da entropia do sistema.
//!
//! As funções livres (`random_date`, `id_number`, ...) recebem `seed: Option<u64>`
//! e criam um `Generator` novo a cada chamada: mesma semente ⇒ mesma saída.
//!
//! ```rust
//! use nlptools_core::generators::{Generator, identity::id_number};
//!
//! let mut a = Generator::new(Some(42));
//! let mut b = Generator::new(Some(42));
//! assert_eq!(a.id_number(true), b.id_number(true));
//! assert_eq!(id_number(false, Some(7)), id_number(false, Some(7)));
//! ```

pub mod address;
pub mod company;
pub mod date;
pub mod identity;
pub mod names;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};
use crate::numbers;

/// Handle explícito do gerador pseudoaleatório.
#[derive(Debug, Clone)]
pub struct Generator {
    rng: StdRng,
    seed: Option<u64>,
}

impl Generator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, seed }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    /// Semente usada na criação, se houver.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Acesso direto ao RNG, para quem precisa de distribuições próprias.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Inteiro uniforme em `[low, high]`.
    pub(crate) fn int(&mut self, low: u64, high: u64) -> u64 {
        self.rng.gen_range(low..=high)
    }

    /// Elemento uniforme de uma lista não vazia.
    pub(crate) fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.gen_range(0..items.len())]
    }

    /// `n` elementos distintos, em ordem aleatória.
    pub(crate) fn sample<T: Clone>(&mut self, items: &[T], n: usize) -> Result<Vec<T>> {
        if n > items.len() {
            return Err(Error::SampleTooLarge {
                requested: n,
                available: items.len(),
            });
        }
        Ok(index::sample(&mut self.rng, items.len(), n)
            .into_iter()
            .map(|i| items[i].clone())
            .collect())
    }

    /// Uma das quatro grafias de um número: `7`, `siete`, `siete (7)` ou `7 (siete)`.
    pub(crate) fn number_form(&mut self, n: u64) -> String {
        let words = numbers::cardinal(n);
        match self.rng.gen_range(0..4) {
            0 => n.to_string(),
            1 => words,
            2 => format!("{words} ({n})"),
            _ => format!("{n} ({words})"),
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Capitaliza cada palavra e põe o resto em minúsculas ("SOCIEDAD ANÓNIMA" → "Sociedad Anónima").
pub fn title_case(s: &str) -> String {
    s.split_word_bounds()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Generator::seeded(42);
        let mut b = Generator::seeded(42);
        let xs: Vec<u64> = (0..20).map(|_| a.int(0, 1000)).collect();
        let ys: Vec<u64> = (0..20).map(|_| b.int(0, 1000)).collect();
        assert_eq!(xs, ys);
        assert_eq!(a.seed(), Some(42));
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut g = Generator::seeded(1);
        let items: Vec<u32> = (0..10).collect();
        let mut picked = g.sample(&items, 10).unwrap();
        picked.sort();
        assert_eq!(picked, items);

        assert!(matches!(
            g.sample(&items, 11),
            Err(Error::SampleTooLarge { requested: 11, available: 10 })
        ));
    }

    #[test]
    fn test_number_form_mentions_the_number() {
        let mut g = Generator::seeded(3);
        for _ in 0..20 {
            let form = g.number_form(12);
            assert!(form.contains("12") || form.contains("doce"), "{form}");
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("sociedad anónima"), "Sociedad Anónima");
        assert_eq!(title_case("AVENIDA CORRIENTES"), "Avenida Corrientes");
        assert_eq!(title_case("24 DE SEPTIEMBRE"), "24 De Septiembre");
    }
}
