//! Text folding primitives
//!
//! Every comparison in the crate goes through [`fold`], on both the input
//! side and the reference side:
//! - Unicode NFKD with combining marks dropped ("Fryslân" -> "fryslan")
//! - Lowercase conversion
//! - Whitespace collapsing

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

lazy_static! {
    /// "s gravenhage", "'s gravenzande", "s-hertogenbosch" ...
    static ref S_PREFIX: Regex = Regex::new(r"^'?s[\s-]+(graven|hertogen)").unwrap();
    /// Telephone area codes: 0 followed by 1-3 digits
    static ref AREA_CODE: Regex = Regex::new(r"^0\d{1,3}$").unwrap();
    /// Statistical municipality codes: "gm0363", "0363", "363"
    static ref STAT_CODE: Regex = Regex::new(r"^(?:gm)?\s*0*(\d{1,4})$").unwrap();
    /// Elided Dutch articles that belong to the name: "'s-heerenberg", "'t harde"
    static ref ELIDED_ARTICLE: Regex = Regex::new(r"^'[st][\s-]").unwrap();
}

/// Fold a string into its comparison key.
///
/// # Examples
///
/// ```
/// use nlmuni_core::normalize::fold;
///
/// assert_eq!(fold("  Súdwest-Fryslân "), "sudwest-fryslan");
/// assert_eq!(fold("Den   Haag"), "den haag");
/// ```
pub fn fold(s: &str) -> String {
    let stripped: String = s
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '`' => '\'',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip leading and trailing whitespace and punctuation.
///
/// A leading `'s` or `'t` article keeps its apostrophe, since reference
/// names carry it too.
pub fn strip_punctuation(s: &str) -> &str {
    let trimmed = s.trim_end_matches(|c: char| !c.is_alphanumeric());
    let start = trimmed
        .find(char::is_alphanumeric)
        .unwrap_or(trimmed.len());

    if start > 0 && trimmed[..start].ends_with('\'') {
        let with_apostrophe = &trimmed[start - 1..];
        if ELIDED_ARTICLE.is_match(with_apostrophe) {
            return with_apostrophe;
        }
    }
    &trimmed[start..]
}

/// Restore the official `'s-` prefix of 's-Gravenhage style names.
///
/// Expects folded input with surrounding punctuation already stripped.
pub fn canonical_s_prefix(s: &str) -> String {
    S_PREFIX.replace(s, "'s-$1").into_owned()
}

/// Whether a token has the shape of a telephone area code
pub fn is_area_code(s: &str) -> bool {
    AREA_CODE.is_match(s)
}

/// Digits of a statistical code without prefix or leading zeros.
///
/// Returns `None` when the string is not code-shaped.
pub fn statistical_code(s: &str) -> Option<String> {
    let caps = STAT_CODE.captures(s.trim())?;
    let digits = caps[1].trim_start_matches('0');
    if digits.is_empty() {
        return None;
    }
    Some(digits.to_string())
}

/// Remove every whole-word occurrence of `word` from `haystack`.
///
/// Hyphens count as part of a word, so removing "holland" leaves both
/// "hollandscheveld" and "noord-holland" alone.
pub fn remove_word(haystack: &str, word: &str) -> String {
    let word = word.trim();
    if word.is_empty() {
        return haystack.to_string();
    }

    let mut out = String::with_capacity(haystack.len());
    let mut rest = haystack;

    while let Some(pos) = rest.find(word) {
        let end = pos + word.len();
        let before_ok = rest[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = rest[end..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));

        if before_ok && after_ok {
            out.push_str(&rest[..pos]);
            out.push(' ');
        } else {
            // Not a whole word; keep it and move past its first char
            let step = rest[pos..].chars().next().map_or(1, char::len_utf8);
            out.push_str(&rest[..pos + step]);
            rest = &rest[pos + step..];
            continue;
        }
        rest = &rest[end..];
    }
    out.push_str(rest);

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_diacritics_and_case() {
        assert_eq!(fold("Súdwest-Fryslân"), "sudwest-fryslan");
        assert_eq!(fold("NOORDOOSTPOLDER"), "noordoostpolder");
    }

    #[test]
    fn test_fold_collapses_whitespace() {
        assert_eq!(fold("\tden   bosch \n"), "den bosch");
    }

    #[test]
    fn test_strip_punctuation() {
        assert_eq!(strip_punctuation("..amsterdam!"), "amsterdam");
        assert_eq!(strip_punctuation("---"), "");
        assert_eq!(strip_punctuation("'"), "");
    }

    #[test]
    fn test_strip_punctuation_keeps_elided_article() {
        assert_eq!(strip_punctuation("'s-heerenberg"), "'s-heerenberg");
        assert_eq!(strip_punctuation(" \"'t harde\"."), "'t harde");
        assert_eq!(strip_punctuation("'s gravenhage"), "'s gravenhage");
        // Only a lone s or t is an article
        assert_eq!(strip_punctuation("'sneek'"), "sneek");
        assert_eq!(strip_punctuation("'tiel"), "tiel");
    }

    #[test]
    fn test_fold_typographic_apostrophe() {
        assert_eq!(fold("\u{2019}t Zandt"), "'t zandt");
    }

    #[test]
    fn test_canonical_s_prefix() {
        assert_eq!(canonical_s_prefix("s gravenhage"), "'s-gravenhage");
        assert_eq!(canonical_s_prefix("s-hertogenbosch"), "'s-hertogenbosch");
        assert_eq!(canonical_s_prefix("'s gravenzande"), "'s-gravenzande");
        assert_eq!(canonical_s_prefix("schiedam"), "schiedam");
    }

    #[test]
    fn test_area_code_shape() {
        assert!(is_area_code("020"));
        assert!(is_area_code("0546"));
        assert!(!is_area_code("20"));
        assert!(!is_area_code("02001"));
        assert!(!is_area_code("0a0"));
    }

    #[test]
    fn test_statistical_code() {
        assert_eq!(statistical_code("GM0363".to_lowercase().as_str()), Some("363".into()));
        assert_eq!(statistical_code("0363"), Some("363".into()));
        assert_eq!(statistical_code("363"), Some("363".into()));
        assert_eq!(statistical_code("0000"), None);
        assert_eq!(statistical_code("amsterdam"), None);
    }

    #[test]
    fn test_remove_word_respects_boundaries() {
        assert_eq!(remove_word("gemeente utrecht", "gemeente"), "utrecht");
        assert_eq!(remove_word("zwolle nederland", "nederland"), "zwolle");
        assert_eq!(remove_word("hollandscheveld", "holland"), "hollandscheveld");
        assert_eq!(remove_word("noord-holland", "holland"), "noord-holland");
        assert_eq!(
            remove_word("utrecht, the netherlands", "the netherlands"),
            "utrecht,"
        );
    }
}
