//! Deterministic fallback names for unrenameable local variables.

use std::collections::HashMap;

use crate::descriptor;

/// Per-method synthetic name generator.
///
/// One occurrence counter per derived base name, scoped to a single method
/// visitation. Counters must never be shared across methods; the engine
/// creates a fresh namer for every method it wraps.
#[derive(Debug, Default)]
pub struct LocalNamer {
    counts: HashMap<String, u32>,
}

impl LocalNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next synthetic name for a local of the given (already remapped)
    /// descriptor type: element-type simple name, first character lowercased,
    /// `s` for arrays, then `_N` with a 1-based per-base counter.
    pub fn next(&mut self, desc: &str) -> String {
        let (mut base, plural) = descriptor::synthetic_base_name(desc);
        if plural {
            base.push('s');
        }

        let count = self.counts.entry(base.clone()).or_insert(0);
        *count += 1;
        format!("{}_{}", base, count)
    }
}

/// Whether `s` is a valid Java identifier: an identifier-start character
/// followed by identifier-continuation characters. The empty string is not.
///
/// Java admits currency symbols and connector punctuation in identifiers, so
/// both categories are accepted alongside alphanumerics. Rarities Java also
/// tolerates in continuation position (combining marks, ignorable control
/// characters) are not; a false negative only costs a synthetic rename.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_part),
        _ => false,
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || is_currency_symbol(c) || is_connector_punctuation(c)
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || is_currency_symbol(c) || is_connector_punctuation(c)
}

/// Unicode category Sc.
fn is_currency_symbol(c: char) -> bool {
    matches!(c,
        '$'
        | '\u{A2}'..='\u{A5}'
        | '\u{58F}'
        | '\u{60B}'
        | '\u{7FE}'..='\u{7FF}'
        | '\u{9F2}'..='\u{9F3}'
        | '\u{9FB}'
        | '\u{AF1}'
        | '\u{BF9}'
        | '\u{E3F}'
        | '\u{17DB}'
        | '\u{20A0}'..='\u{20C0}'
        | '\u{A838}'
        | '\u{FDFC}'
        | '\u{FE69}'
        | '\u{FF04}'
        | '\u{FFE0}'..='\u{FFE1}'
        | '\u{FFE5}'..='\u{FFE6}')
}

/// Unicode category Pc.
fn is_connector_punctuation(c: char) -> bool {
    matches!(c,
        '_'
        | '\u{203F}'..='\u{2040}'
        | '\u{2054}'
        | '\u{FE33}'..='\u{FE34}'
        | '\u{FE4D}'..='\u{FE4F}'
        | '\u{FF3F}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_independent_counters_per_base_name() {
        let mut namer = LocalNamer::new();
        assert_eq!(namer.next("[I"), "ints_1");
        assert_eq!(namer.next("[I"), "ints_2");
        assert_eq!(namer.next("I"), "int_1");
        assert_eq!(namer.next("[I"), "ints_3");
    }

    #[test]
    fn test_object_and_array_names() {
        let mut namer = LocalNamer::new();
        assert_eq!(namer.next("Ljava/lang/String;"), "string_1");
        assert_eq!(namer.next("[Ljava/lang/String;"), "strings_1");
        assert_eq!(namer.next("La/b/Outer$Inner;"), "outer$Inner_1");
    }

    #[test]
    fn test_fresh_namer_restarts_counters() {
        let mut first = LocalNamer::new();
        assert_eq!(first.next("I"), "int_1");
        let mut second = LocalNamer::new();
        assert_eq!(second.next("I"), "int_1");
    }

    #[test]
    fn test_identifier_validity() {
        assert!(is_valid_identifier("name"));
        assert!(is_valid_identifier("_name"));
        assert!(is_valid_identifier("$lambda$0"));
        assert!(is_valid_identifier("név"));
        assert!(is_valid_identifier("x2"));

        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2x"));
        assert!(!is_valid_identifier("has space"));
        assert!(!is_valid_identifier("☃"));
    }

    #[test]
    fn test_currency_and_connector_identifiers() {
        // Currency symbols and connector punctuation are legal anywhere in a
        // Java identifier.
        assert!(is_valid_identifier("¤total"));
        assert!(is_valid_identifier("€"));
        assert!(is_valid_identifier("a‿b"));
        assert!(is_valid_identifier("＿x"));

        // Combining marks in continuation position stay outside the accepted
        // set even though Java would allow them.
        assert!(!is_valid_identifier("a\u{301}b"));
    }
}
