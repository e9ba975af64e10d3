//! Documentos de identidade argentinos: DNI (`M.TTT.HHH`) e CUIT (`PP-MMTTTHHH-V`).

use std::sync::OnceLock;

use regex::Regex;

use super::Generator;

fn dni_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,2}\.\d{3}\.\d{3}$").expect("regex de DNI válida"))
}

fn cuit_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}-\d{8}-\d$").expect("regex de CUIT válida"))
}

impl Generator {
    /// Um DNI (`7.042.318`) ou, com `is_cuit`, um CUIT (`27-07042318-4`).
    pub fn id_number(&mut self, is_cuit: bool) -> String {
        let millions = self.int(0, 99);
        let thousands = self.int(0, 999);
        let hundreds = self.int(0, 999);

        if is_cuit {
            let prefix = self.int(20, 35);
            let check = self.int(1, 9);
            format!("{prefix}-{millions:02}{thousands:03}{hundreds:03}-{check}")
        } else {
            format!("{millions}.{thousands:03}.{hundreds:03}")
        }
    }
}

pub fn id_number(is_cuit: bool, seed: Option<u64>) -> String {
    Generator::new(seed).id_number(is_cuit)
}

/// `true` se `s` tem o formato de um DNI com separadores de milhar.
pub fn is_dni(s: &str) -> bool {
    dni_regex().is_match(s)
}

/// `true` se `s` tem o formato de um CUIT/CUIL com hífens.
pub fn is_cuit(s: &str) -> bool {
    cuit_regex().is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_match_patterns() {
        let mut g = Generator::seeded(11);
        for _ in 0..200 {
            let dni = g.id_number(false);
            assert!(is_dni(&dni), "{dni}");
            let cuit = g.id_number(true);
            assert!(is_cuit(&cuit), "{cuit}");

            let prefix: u32 = cuit[..2].parse().unwrap();
            assert!((20..=35).contains(&prefix));
            assert_ne!(cuit.chars().last(), Some('0'));
        }
    }

    #[test]
    fn test_seeded_id_is_reproducible() {
        assert_eq!(id_number(true, Some(5)), id_number(true, Some(5)));
        assert_eq!(id_number(false, Some(5)), id_number(false, Some(5)));
    }

    #[test]
    fn test_validators() {
        assert!(is_dni("7.042.318"));
        assert!(is_dni("30.000.001"));
        assert!(!is_dni("300.000.001"));
        assert!(!is_dni("30000001"));

        assert!(is_cuit("20-12345678-9"));
        assert!(!is_cuit("20-1234567-9"));
        assert!(!is_cuit("20123456789"));
    }
}
