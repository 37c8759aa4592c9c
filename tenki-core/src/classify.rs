use std::sync::LazyLock;

use regex::Regex;

use crate::tables;

/// Derived facts about a free-text location query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryClass {
    pub is_postal_code: bool,
    pub is_japanese_domain: bool,
}

static POSTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]{7}|[0-9]{3}-[0-9]{4})$").expect("valid postal regex"));

static JAPANESE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{Han}|\p{Hiragana}|\p{Katakana}").expect("valid script regex")
});

/// Seven ASCII digits, optionally written as `ddd-dddd`.
pub fn is_postal_code(query: &str) -> bool {
    POSTAL_RE.is_match(query)
}

/// Japanese script, a postal code, or a known Japanese place name.
pub fn is_japanese_domain(query: &str) -> bool {
    JAPANESE_RE.is_match(query) || is_postal_code(query) || tables::city_name(query).is_some()
}

pub fn classify(query: &str) -> QueryClass {
    QueryClass {
        is_postal_code: is_postal_code(query),
        is_japanese_domain: is_japanese_domain(query),
    }
}

/// Digits of a postal code with any separators removed.
pub fn postal_digits(query: &str) -> String {
    query.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postal_code_shapes() {
        assert!(is_postal_code("1000001"));
        assert!(is_postal_code("612-8483"));

        assert!(!is_postal_code("123456"));
        assert!(!is_postal_code("12345678"));
        assert!(!is_postal_code("1234-567"));
        assert!(!is_postal_code(" 1000001"));
        assert!(!is_postal_code("１０００００１"));
        assert!(!is_postal_code("abc-defg"));
    }

    #[test]
    fn japanese_script_is_detected() {
        assert!(is_japanese_domain("東京"));
        assert!(is_japanese_domain("さいたま"));
        assert!(is_japanese_domain("カナダ"));
        assert!(is_japanese_domain("Osaka 大阪"));
        assert!(!is_japanese_domain("London"));
        assert!(!is_japanese_domain("Paris, France"));
    }

    #[test]
    fn postal_codes_are_japanese_domain() {
        let class = classify("123-4567");
        assert!(class.is_postal_code);
        assert!(class.is_japanese_domain);
    }

    #[test]
    fn classification_is_deterministic() {
        for q in ["東京", "1234567", "Berlin", ""] {
            assert_eq!(classify(q), classify(q));
        }
        assert_eq!(classify(""), QueryClass::default());
    }

    #[test]
    fn digits_are_extracted() {
        assert_eq!(postal_digits("612-8483"), "6128483");
        assert_eq!(postal_digits("1000001"), "1000001");
    }
}
