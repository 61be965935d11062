//! Escaping of generated script tokens.
//!
//! Gateway commands are emitted as single-quoted shell literals inside a
//! template language with `/* ... */` block comments, so free text is stripped
//! of single quotes and has its comment delimiters broken up. Identifiers that
//! collide with reserved words get a replacement name.

use std::collections::{BTreeMap, BTreeSet};

use crate::utils::lower_camelize;
use crate::Error;

/// Words that generated identifiers must never use verbatim
pub const RESERVED_WORDS: &[&str] = &["sample1", "sample2"];

/// Remove every single quote so the text fits inside a `'...'` literal.
pub fn escape_quote(text: &str) -> String {
    text.replace('\'', "")
}

/// Break up `*/` and `/*` so the text can never close or open a block comment.
pub fn escape_comment_delimiters(text: &str) -> String {
    text.replace("*/", "*_/").replace("/*", "/_*")
}

/// Both free-text escapes, in the order the templates expect
pub fn escape_text(text: &str) -> String {
    escape_comment_delimiters(&escape_quote(text))
}

/// Reserved-word aware identifier escaping
#[derive(Debug, Clone)]
pub struct IdentifierEscaper {
    /// Lower-cased reserved words
    words: BTreeSet<String>,
    /// Explicit replacements, keyed by the lower-cased reserved word
    mappings: BTreeMap<String, String>,
}

impl Default for IdentifierEscaper {
    fn default() -> Self {
        Self {
            words: RESERVED_WORDS.iter().map(|w| w.to_string()).collect(),
            mappings: BTreeMap::new(),
        }
    }
}

impl IdentifierEscaper {
    /// Build an escaper with user supplied `reserved -> replacement` mappings.
    ///
    /// A replacement that is itself reserved is rejected, as is a mapping for
    /// a word that is not reserved. Keys match any spelling of the word.
    pub fn with_mappings(mappings: BTreeMap<String, String>) -> crate::Result<Self> {
        let escaper = Self {
            mappings: mappings
                .into_iter()
                .map(|(word, replacement)| (word.to_lowercase(), replacement))
                .collect(),
            ..Self::default()
        };
        for (word, replacement) in &escaper.mappings {
            if !escaper.is_reserved(word) {
                return Err(Error::config(format!(
                    "reserved word mapping '{}={}': '{}' is not a reserved word",
                    word, replacement, word
                )));
            }
            if replacement.is_empty() || escaper.is_reserved(replacement) {
                return Err(Error::config(format!(
                    "reserved word mapping '{}={}': replacement must be a non-reserved name",
                    word, replacement
                )));
            }
        }
        Ok(escaper)
    }

    /// Case-insensitive reserved word check
    pub fn is_reserved(&self, name: &str) -> bool {
        self.words.contains(&name.to_lowercase())
    }

    /// The mapped replacement for `name`, or `_name` when there is none.
    pub fn escape_reserved(&self, name: &str) -> String {
        match self.mappings.get(&name.to_lowercase()) {
            Some(replacement) => replacement.clone(),
            None => format!("_{}", name),
        }
    }

    /// Escape `name` only when it is reserved
    pub fn to_identifier(&self, name: &str) -> String {
        if self.is_reserved(name) {
            self.escape_reserved(name)
        } else {
            name.to_string()
        }
    }

    /// Parameter variable name: separators folded into lowerCamelCase, then escaped
    pub fn to_param_name(&self, name: &str) -> String {
        self.to_identifier(&lower_camelize(name))
    }

    /// Operation identifier used for route names and helper functions
    pub fn to_operation_id(&self, id: &str) -> String {
        self.to_identifier(&lower_camelize(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_quote_is_idempotent() {
        for s in ["it's", "''", "none", "a'b'c'", ""] {
            let once = escape_quote(s);
            assert!(!once.contains('\''));
            assert_eq!(escape_quote(&once), once);
        }
        assert_eq!(escape_quote("it's ok"), "its ok");
    }

    #[test]
    fn test_comment_delimiters_never_survive() {
        for s in ["/*/", "*/*", "a /* b */ c", "**//", "/**/", "*/*/*/", "plain"] {
            let out = escape_comment_delimiters(s);
            assert!(!out.contains("*/"), "{} -> {}", s, out);
            assert!(!out.contains("/*"), "{} -> {}", s, out);
        }
        assert_eq!(escape_comment_delimiters("a /* b */"), "a /_* b *_/");
    }

    #[test]
    fn test_escape_reserved_defaults_to_underscore() {
        let escaper = IdentifierEscaper::default();
        assert_eq!(escaper.escape_reserved("sample1"), "_sample1");
        assert_eq!(escaper.escape_reserved("anything"), "_anything");
    }

    #[test]
    fn test_reserved_escaping_is_stable() -> crate::Result<()> {
        let mut mappings = BTreeMap::new();
        mappings.insert("sample2".to_string(), "exampleTwo".to_string());
        let escaper = IdentifierEscaper::with_mappings(mappings)?;

        for word in RESERVED_WORDS {
            let escaped = escaper.to_identifier(word);
            assert!(escaped == escaper.escape_reserved(word));
            assert!(!escaper.is_reserved(&escaped));
            assert_eq!(escaper.to_identifier(&escaped), escaped);
        }
        assert_eq!(escaper.to_identifier("sample2"), "exampleTwo");
        assert_eq!(escaper.to_identifier("SAMPLE1"), "_SAMPLE1");
        Ok(())
    }

    #[test]
    fn test_mappings_apply_to_any_spelling() -> crate::Result<()> {
        let mut mappings = BTreeMap::new();
        mappings.insert("Sample1".to_string(), "exampleOne".to_string());
        let escaper = IdentifierEscaper::with_mappings(mappings)?;
        assert_eq!(escaper.to_identifier("sample1"), "exampleOne");
        assert_eq!(escaper.to_identifier("Sample1"), "exampleOne");
        assert_eq!(escaper.to_identifier("SAMPLE1"), "exampleOne");
        assert_eq!(escaper.to_identifier("sample2"), "_sample2");
        Ok(())
    }

    #[test]
    fn test_invalid_mappings_are_rejected() {
        let mut to_reserved = BTreeMap::new();
        to_reserved.insert("sample1".to_string(), "sample2".to_string());
        assert!(IdentifierEscaper::with_mappings(to_reserved).is_err());

        let mut not_reserved = BTreeMap::new();
        not_reserved.insert("petId".to_string(), "id".to_string());
        assert!(IdentifierEscaper::with_mappings(not_reserved).is_err());
    }

    #[test]
    fn test_param_and_operation_names() {
        let escaper = IdentifierEscaper::default();
        assert_eq!(escaper.to_param_name("pet-id"), "petId");
        assert_eq!(escaper.to_param_name("api_key"), "apiKey");
        assert_eq!(escaper.to_param_name("sample1"), "_sample1");
        assert_eq!(escaper.to_operation_id("find pets by status"), "findPetsByStatus");
    }
}
