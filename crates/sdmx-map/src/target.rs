//! Default TARGET derivation for newly seen SOURCE values.

use sdmx_model::{INDICATOR, NOT_APPLICABLE};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const MEASURE_WORD_LEN: usize = 5;

/// Remove diacritics: `"Málaga"` becomes `"Malaga"`.
pub fn fold_accents(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Default TARGET for a generic dimension value.
///
/// Accents are folded, letters uppercased and every run of characters outside
/// `[A-Z0-9]` collapses to a single `_`. Values with nothing usable map to `_Z`.
pub fn default_target(source: &str) -> String {
    let folded = fold_accents(source);
    let mut target = String::with_capacity(folded.len());
    let mut last_was_underscore = true;
    for ch in folded.chars() {
        if ch.is_ascii_alphanumeric() {
            target.push(ch.to_ascii_uppercase());
            last_was_underscore = false;
        } else if !last_was_underscore {
            target.push('_');
            last_was_underscore = true;
        }
    }
    if target.ends_with('_') {
        target.pop();
    }
    if target.is_empty() {
        return NOT_APPLICABLE.to_string();
    }
    target
}

/// Abbreviated id for a measure label.
///
/// Each space-separated word contributes its first five characters,
/// uppercased; words are joined with `_` and accents folded:
/// `"Número de personas"` becomes `"NUMER_DE_PERSO"`.
pub fn measure_target(label: &str) -> String {
    let id = label
        .split(' ')
        .map(|word| {
            let word = word.replace('%', "PCT").replace('*', "");
            word.chars()
                .take(MEASURE_WORD_LEN)
                .collect::<String>()
                .to_uppercase()
        })
        .collect::<Vec<_>>()
        .join("_");
    fold_accents(&id)
}

/// TARGET derivation rule for `dimension`.
pub fn target_for(dimension: &str, source: &str) -> String {
    if dimension == INDICATOR {
        measure_target(source)
    } else {
        default_target(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn folds_spanish_accents() {
        assert_eq!(fold_accents("Almería, Cádiz y Jaén"), "Almeria, Cadiz y Jaen");
        assert_eq!(fold_accents("Año"), "Ano");
    }

    #[test]
    fn default_target_sanitizes() {
        assert_eq!(default_target("Hombres"), "HOMBRES");
        assert_eq!(default_target("De 16 a 19 años"), "DE_16_A_19_ANOS");
        assert_eq!(default_target("  Málaga (capital) "), "MALAGA_CAPITAL");
        assert_eq!(default_target("2005-01"), "2005_01");
        assert_eq!(default_target("---"), "_Z");
    }

    #[test]
    fn measure_target_abbreviates_words() {
        assert_eq!(measure_target("Número de personas"), "NUMER_DE_PERSO");
        assert_eq!(measure_target("Tasa"), "TASA");
        assert_eq!(measure_target("% de variación"), "PCT_DE_VARIA");
    }

    #[test]
    fn indicator_uses_measure_rule() {
        assert_eq!(target_for("INDICATOR", "Número de personas"), "NUMER_DE_PERSO");
        assert_eq!(target_for("D_SEXO_0", "Número de personas"), "NUMERO_DE_PERSONAS");
    }

    proptest! {
        #[test]
        fn default_target_is_sdmx_safe(source in "\\PC{0,40}") {
            let target = default_target(&source);
            prop_assert!(!target.is_empty());
            prop_assert!(target == "_Z" || target.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'));
            prop_assert!(!target.contains("__"));
        }

        #[test]
        fn default_target_is_deterministic(source in "[a-zA-Záéíóúñ ]{0,20}") {
            prop_assert_eq!(default_target(&source), default_target(&source));
        }
    }
}
