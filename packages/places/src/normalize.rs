//! Canonical place-name forms.
//!
//! Applied symmetrically wherever names are compared: the gazetteer side
//! of the join, and synthetic place-id generation. The pipeline is
//! deterministic and locale-independent; it never consults the process
//! locale.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Canonicalizes a place name: NFD-decompose, drop combining marks
/// (diacritics), upper-case.
///
/// Strings with no decomposable diacritics pass through unchanged except
/// for case-folding; the empty string maps to itself. Idempotent.
#[must_use]
pub fn canonical_name(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase()
}

/// Extracts the city portion of a `"CITY (UF)"` composite display string
/// by dropping the trailing UF token.
///
/// Used only for place-id generation, never for matching. Strings without
/// a trailing `(UF)` token pass through unchanged.
#[must_use]
pub fn strip_uf(display: &str) -> &str {
    match display.rsplit_once(' ') {
        Some((city, last)) if last.starts_with('(') && last.ends_with(')') => city,
        _ => display,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics_and_uppercases() {
        assert_eq!(canonical_name("São Paulo"), "SAO PAULO");
        assert_eq!(canonical_name("Florianópolis"), "FLORIANOPOLIS");
        assert_eq!(canonical_name("Brasília"), "BRASILIA");
    }

    #[test]
    fn handles_cedilla() {
        assert_eq!(canonical_name("Piçarras"), "PICARRAS");
    }

    #[test]
    fn plain_ascii_only_case_folds() {
        assert_eq!(canonical_name("MANAUS"), "MANAUS");
        assert_eq!(canonical_name("manaus"), "MANAUS");
    }

    #[test]
    fn empty_maps_to_empty() {
        assert_eq!(canonical_name(""), "");
    }

    #[test]
    fn idempotent() {
        for name in ["São Paulo", "Piçarras", "MANAUS", "", "Três Lagoas"] {
            let once = canonical_name(name);
            assert_eq!(canonical_name(&once), once, "not idempotent for {name:?}");
        }
    }

    #[test]
    fn strips_trailing_uf_token() {
        assert_eq!(strip_uf("BELEM (PA)"), "BELEM");
        assert_eq!(strip_uf("SAO JOSE DOS CAMPOS (SP)"), "SAO JOSE DOS CAMPOS");
    }

    #[test]
    fn strip_uf_passthrough_without_token() {
        assert_eq!(strip_uf("BELEM"), "BELEM");
        assert_eq!(strip_uf("PORTO (ALEGRE"), "PORTO (ALEGRE");
    }
}
