//! Command normalization and validation
//!
//! The classifier is instructed to answer with exactly one label from a
//! fixed alphabet, but its output is never trusted: everything it returns is
//! canonicalized by [`normalize`] and checked byte-for-byte by [`is_allowed`]
//! before being surfaced. Output that fails validation is coerced to
//! [`NOT_RECOGNIZED`].

/// Distinguished "not recognized" label (exact casing preserved)
pub const NOT_RECOGNIZED: &str = "Orden no reconocida";

/// The canonical command alphabet — the only strings ever displayed as a
/// recognized command. This set never changes at runtime.
pub const ALLOWED: [&str; 10] = [
    "avanzar",
    "retroceder",
    "detener",
    "vuelta derecha",
    "vuelta izquierda",
    "90° derecha",
    "90° izquierda",
    "360° derecha",
    "360° izquierda",
    NOT_RECOGNIZED,
];

/// Synonym table mapping spelled-out degree phrases to their canonical form
const DEGREE_SYNONYMS: [(&str, &str); 8] = [
    ("90 derecha", "90° derecha"),
    ("90 grados derecha", "90° derecha"),
    ("90 izquierda", "90° izquierda"),
    ("90 grados izquierda", "90° izquierda"),
    ("360 derecha", "360° derecha"),
    ("360 grados derecha", "360° derecha"),
    ("360 izquierda", "360° izquierda"),
    ("360 grados izquierda", "360° izquierda"),
];

/// Canonicalize raw classifier output.
///
/// Order matters: trim, then the "not recognized" special case (returned in
/// its canonical casing, bypassing everything else), then lowercase, the
/// `º` → `°` glyph fix, whitespace collapse and finally the degree-phrase
/// synonym table.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.eq_ignore_ascii_case(NOT_RECOGNIZED) {
        return NOT_RECOGNIZED.to_string();
    }

    let lowered = trimmed.to_lowercase().replace('º', "°");
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    for (synonym, canonical) in DEGREE_SYNONYMS {
        if collapsed == synonym {
            return canonical.to_string();
        }
    }

    collapsed
}

/// Membership test against the canonical alphabet (byte-exact)
#[must_use]
pub fn is_allowed(normalized: &str) -> bool {
    ALLOWED.contains(&normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_degree_synonyms() {
        assert_eq!(normalize("90 Grados Derecha"), "90° derecha");
        assert_eq!(normalize("90 derecha"), "90° derecha");
        assert_eq!(normalize("90º derecha"), "90° derecha");
        assert_eq!(normalize("360 grados izquierda"), "360° izquierda");
    }

    #[test]
    fn normalize_preserves_not_recognized_casing() {
        assert_eq!(normalize("  ORDEN NO RECONOCIDA  "), "Orden no reconocida");
        assert_eq!(normalize("orden no reconocida"), "Orden no reconocida");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  vuelta   derecha "), "vuelta derecha");
    }

    #[test]
    fn validation_is_byte_exact() {
        assert!(is_allowed("avanzar"));
        assert!(is_allowed("90° derecha"));
        assert!(is_allowed(NOT_RECOGNIZED));
        // Wrong casing of the distinguished label is not a member
        assert!(!is_allowed("orden no reconocida"));
        assert!(!is_allowed("avanza"));
        assert!(!is_allowed(""));
    }

    #[test]
    fn alphabet_has_ten_members() {
        assert_eq!(ALLOWED.len(), 10);
        assert!(ALLOWED.contains(&NOT_RECOGNIZED));
    }
}
