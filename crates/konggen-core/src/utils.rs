//! Naming helpers shared by the translator and the template context builders

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Split on anything that is not an ASCII letter or digit and capitalize each part.
///
/// Inner capitals are preserved, so `petId` becomes `PetId` and `UUID` stays `UUID`.
pub fn camelize(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect()
}

/// Like [`camelize`] but with a lower-case first letter (`pet-id` -> `petId`)
pub fn lower_camelize(s: &str) -> String {
    let upper = camelize(s);
    let mut chars = upper.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
    }
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
///
/// A leading digit gets a `_` prefix so the result is a valid identifier in
/// bash, PCRE group names and most template languages.
pub fn sanitize_name(s: &str) -> String {
    let cleaned = NON_WORD.replace_all(s, "_").to_string();
    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", cleaned)
    } else {
        cleaned
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").to_string()
}

/// True when `s` can be used as a bash variable name
pub fn is_shell_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("pet_store"), "PetStore");
        assert_eq!(camelize("petId"), "PetId");
        assert_eq!(camelize("find-pets-by-status"), "FindPetsByStatus");
        assert_eq!(camelize("UUID"), "UUID");
        assert_eq!(camelize("get"), "Get");
        assert_eq!(camelize(""), "");
    }

    #[test]
    fn test_lower_camelize() {
        assert_eq!(lower_camelize("pet-id"), "petId");
        assert_eq!(lower_camelize("PetId"), "petId");
        assert_eq!(lower_camelize("x:y;z#w"), "xYZW");
        assert_eq!(lower_camelize("store"), "store");
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("pet-id"), "pet_id");
        assert_eq!(sanitize_name("9lives"), "_9lives");
        assert_eq!(sanitize_name("ok_name"), "ok_name");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\n b\tc "), "a b c");
    }

    #[test]
    fn test_is_shell_identifier() {
        assert!(is_shell_identifier("petId"));
        assert!(is_shell_identifier("_x1"));
        assert!(!is_shell_identifier("pet-id"));
        assert!(!is_shell_identifier("1abc"));
        assert!(!is_shell_identifier(""));
    }
}
