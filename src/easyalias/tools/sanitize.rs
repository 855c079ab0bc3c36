//! Turns free-form cell text into identifier-valid aliases.
//!
//! The pipeline is deterministic and locale independent: trim, transliterate
//! through [`TRANSLITERATIONS`], collapse whitespace runs into `_`, drop every
//! character outside `[A-Za-z0-9_]`, and guard against a leading digit.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed replacement table for non-ASCII letters. Characters not listed here
/// are dropped by the character filter.
pub const TRANSLITERATIONS: &[(char, &str)] = &[
    ('ä', "ae"),
    ('ö', "oe"),
    ('ü', "ue"),
    ('Ä', "Ae"),
    ('Ö', "Oe"),
    ('Ü', "Ue"),
    ('ß', "ss"),
];

/// Raised when nothing usable is left of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("empty source text")]
pub struct EmptyAliasError;

/// Raised when a string offered as an alias breaks the identifier grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid alias")]
pub struct InvalidAliasError(pub String);

/// A non-empty identifier made of ASCII letters, digits and underscores that
/// does not start with a digit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alias(String);

impl Alias {
    /// Accepts `value` only if it already satisfies the identifier grammar.
    pub fn parse(value: &str) -> Option<Self> {
        is_identifier(value).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Alias {
    type Error = InvalidAliasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_identifier(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidAliasError(value))
        }
    }
}

impl From<Alias> for String {
    fn from(alias: Alias) -> Self {
        alias.0
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Alias {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Alias {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Sanitizes `raw` into an [`Alias`], failing only when the cleaned text is
/// empty.
pub fn sanitize(raw: &str) -> Result<Alias, EmptyAliasError> {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        Err(EmptyAliasError)
    } else {
        Ok(Alias(normalized))
    }
}

/// Runs the sanitization steps without the emptiness check. The result is
/// either empty or a valid identifier.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_whitespace = false;

    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;

        match transliterate(ch) {
            Some(replacement) => out.push_str(replacement),
            None if is_alias_char(ch) => out.push(ch),
            None => {}
        }
    }

    if out.starts_with(|ch: char| ch.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Returns the text between the last `)` and the closest `(` before it, if
/// any. Used for the `Label (alias)` convention.
pub fn extract_custom_alias(raw: &str) -> Option<&str> {
    let close = raw.rfind(')')?;
    let open = raw[..close].rfind('(')?;
    Some(&raw[open + 1..close])
}

/// Checks the identifier grammar every [`Alias`] satisfies.
pub fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => chars.all(is_alias_char),
        _ => false,
    }
}

fn transliterate(ch: char) -> Option<&'static str> {
    TRANSLITERATIONS
        .iter()
        .find(|(source, _)| *source == ch)
        .map(|(_, replacement)| *replacement)
}

fn is_alias_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn alias(raw: &str) -> String {
        sanitize(raw).expect("alias produced").into_string()
    }

    const SAMPLES: &[&str] = &[
        "radius",
        "  outer radius  ",
        "Länge",
        "groß",
        "O'Brien's",
        "2nd",
        "Überhöhe der Straße",
        "a - b",
        "tab\tand\nnewline",
        "price (€)",
        "café crème",
        "x.y.z",
        "_hidden",
        "42",
        "   ",
        "'''",
        "",
        "ÄÖÜ äöü ß",
        "1 2 3",
        "élan",
    ];

    #[test]
    fn umlauts_are_transliterated() {
        assert_eq!(alias("Länge"), "Laenge");
        assert_eq!(alias("groß"), "gross");
        assert_eq!(alias("ÄÖÜ äöü ß"), "AeOeUe_aeoeue_ss");
    }

    #[test]
    fn apostrophes_and_punctuation_are_removed() {
        assert_eq!(alias("O'Brien's"), "OBriens");
        assert_eq!(alias("a - b"), "a__b");
        assert_eq!(alias("x.y.z"), "xyz");
    }

    #[test]
    fn whitespace_runs_become_single_underscores() {
        assert_eq!(alias("  outer radius  "), "outer_radius");
        assert_eq!(alias("tab\tand\nnewline"), "tab_and_newline");
        assert_eq!(alias("wall   thickness"), "wall_thickness");
    }

    #[test]
    fn leading_digit_is_guarded() {
        assert_eq!(alias("2nd"), "_2nd");
        assert_eq!(alias("42"), "_42");
        assert_eq!(alias("1 2 3"), "_1_2_3");
    }

    #[test]
    fn unmapped_non_ascii_letters_are_dropped() {
        assert_eq!(alias("café crème"), "caf_crme");
        assert_eq!(alias("élan"), "lan");
    }

    #[test]
    fn empty_results_are_rejected() {
        assert_eq!(sanitize("   "), Err(EmptyAliasError));
        assert_eq!(sanitize(""), Err(EmptyAliasError));
        assert_eq!(sanitize("'''"), Err(EmptyAliasError));
        assert_eq!(sanitize("€ ?"), Ok(Alias("_".to_string())));
    }

    #[test]
    fn output_is_empty_or_an_identifier() {
        for raw in SAMPLES {
            let normalized = normalize(raw);
            assert!(
                normalized.is_empty() || is_identifier(&normalized),
                "{raw:?} normalized to {normalized:?}"
            );
            assert!(!normalized.contains(['\'', ' ', '-', '.']));
        }
    }

    #[test]
    fn sanitize_is_idempotent() {
        for raw in SAMPLES {
            if let Ok(first) = sanitize(raw) {
                assert_eq!(sanitize(first.as_str()), Ok(first.clone()), "input {raw:?}");
            }
        }
    }

    #[test]
    fn custom_alias_uses_the_last_parenthesised_part() {
        assert_eq!(extract_custom_alias("Outer radius (r_out)"), Some("r_out"));
        assert_eq!(extract_custom_alias("a (b) (c)"), Some("c"));
        assert_eq!(extract_custom_alias("a (b) tail"), Some("b"));
        assert_eq!(extract_custom_alias("empty ()"), Some(""));
        assert_eq!(extract_custom_alias("no parens"), None);
        assert_eq!(extract_custom_alias("a (b) (c"), Some("b"));
        assert_eq!(extract_custom_alias("open ( only"), None);
        assert_eq!(extract_custom_alias("close ) only"), None);
    }

    #[test]
    fn parse_checks_the_grammar() {
        assert!(Alias::parse("radius_2").is_some());
        assert!(Alias::parse("_2nd").is_some());
        assert!(Alias::parse("2nd").is_none());
        assert!(Alias::parse("").is_none());
        assert!(Alias::parse("a.b").is_none());
    }

    #[test]
    fn deserializing_enforces_the_grammar() {
        let radius: Alias = serde_json::from_str("\"radius\"").unwrap();
        assert_eq!(radius.as_str(), "radius");
        assert_eq!(serde_json::to_string(&radius).unwrap(), "\"radius\"");

        let error = serde_json::from_str::<Alias>("\"2nd o'clock\"").unwrap_err();
        assert!(error.to_string().contains("is not a valid alias"));
    }

    /// Label-like text: ASCII, transliterated letters, other diacritics,
    /// mixed whitespace and punctuation.
    fn label_text() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z0-9_ äöüÄÖÜßéñ€'\\-.,()\t\n\u{a0}\u{3000}]{0,40}",
            any::<String>(),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            failure_persistence: None,
            .. ProptestConfig::default()
        })]

        #[test]
        fn normalized_text_is_empty_or_an_identifier(raw in label_text()) {
            let normalized = normalize(&raw);
            prop_assert!(normalized.is_empty() || is_identifier(&normalized));
            prop_assert!(!normalized.contains(|ch: char| ch == '\'' || ch.is_whitespace()));
            prop_assert_eq!(sanitize(&raw).is_err(), normalized.is_empty());
        }

        #[test]
        fn sanitizing_twice_changes_nothing(raw in label_text()) {
            if let Ok(first) = sanitize(&raw) {
                prop_assert_eq!(sanitize(first.as_str()), Ok(first.clone()));
            }
        }

        #[test]
        fn transliterated_letters_never_vanish(prefix in "[a-z]{1,8}", umlaut in "[äöüÄÖÜß]") {
            let alias = alias(&format!("{prefix}{umlaut}"));
            prop_assert!(alias.starts_with(&prefix));
            prop_assert_eq!(alias.len(), prefix.len() + 2);
        }
    }
}
