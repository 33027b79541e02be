//! Text normalization and string similarity used by the matcher.
//!
//! Catalogs disagree on case, punctuation, diacritics and decorations such as
//! "(TV Size)" or "- Artist ( Anime OP )". Everything is folded to a plain
//! lowercase alphanumeric form before comparison.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^()]*\)|\[[^\[\]]*\]|\{[^{}]*\}").unwrap());

/// Fold text to lowercase alphanumeric words separated by single spaces.
///
/// Diacritics are removed via NFKD decomposition; every other
/// non-alphanumeric character acts as a word separator.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove `(...)`, `[...]` and `{...}` segments.
pub fn strip_brackets(text: &str) -> String {
    let mut current = text.to_string();
    // Nested brackets peel one level per pass
    loop {
        let next = BRACKETED.replace_all(&current, " ").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Remove every occurrence of `phrase` from `text`, on word boundaries.
/// Both arguments must already be normalized.
fn remove_phrase(text: &str, phrase: &str) -> String {
    let phrase: Vec<&str> = phrase.split(' ').filter(|w| !w.is_empty()).collect();
    if phrase.is_empty() {
        return text.to_string();
    }

    let words: Vec<&str> = text.split(' ').filter(|w| !w.is_empty()).collect();
    let mut kept = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        if words.len() - i >= phrase.len() && words[i..i + phrase.len()] == phrase[..] {
            i += phrase.len();
        } else {
            kept.push(words[i]);
            i += 1;
        }
    }
    kept.join(" ")
}

/// Normalized spellings of a title worth comparing.
///
/// Yields the full title, the title without bracketed decorations, and both
/// with any of the track's artist names removed (map repositories and video
/// uploads often embed "Title - Artist"). Empty and duplicate variants are dropped.
pub fn title_variants(title: &str, artists: &[String]) -> Vec<String> {
    let mut bases = vec![normalize(title)];
    let stripped = normalize(&strip_brackets(title));
    if !bases.contains(&stripped) {
        bases.push(stripped);
    }

    let mut variants: Vec<String> = Vec::new();
    for base in bases {
        let mut without_artists = base.clone();
        for artist in artists {
            without_artists = remove_phrase(&without_artists, artist);
        }
        for candidate in [base, without_artists] {
            if !candidate.is_empty() && !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }
    }
    variants
}

/// Score for the shorter string appearing as a whole-word run inside the longer.
///
/// Ranges from 0.5 (tiny fragment of a long title) towards 1.0 as the lengths
/// converge. 0 when there is no such overlap.
fn containment(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let padded_long = format!(" {} ", long);
    let padded_short = format!(" {} ", short);
    if !padded_long.contains(&padded_short) {
        return 0.0;
    }
    let short_len = short.chars().count() as f64;
    let long_len = long.chars().count() as f64;
    0.5 + 0.5 * (short_len / long_len)
}

/// Similarity of two normalized strings in [0, 1].
///
/// The better of normalized Levenshtein similarity and whole-word containment.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b).max(containment(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_case_punctuation_diacritics() {
        assert_eq!(normalize("  Beyoncé — Déjà Vu!! "), "beyonce deja vu");
        assert_eq!(normalize("MAN WITH A MISSION"), "man with a mission");
        assert_eq!(normalize("AC/DC"), "ac dc");
    }

    #[test]
    fn test_normalize_keeps_non_latin_letters() {
        assert_eq!(normalize("紅蓮華"), "紅蓮華");
        assert_eq!(normalize("Ｆｕｌｌｗｉｄｔｈ"), "fullwidth");
    }

    #[test]
    fn test_strip_brackets() {
        assert_eq!(normalize(&strip_brackets("My Hero (TV Size)")), "my hero");
        assert_eq!(
            normalize(&strip_brackets("Song [Remastered] (Live (2009))")),
            "song"
        );
    }

    #[test]
    fn test_remove_phrase_on_word_boundaries() {
        assert_eq!(
            remove_phrase("my hero man with a mission", "man with a mission"),
            "my hero"
        );
        assert_eq!(remove_phrase("missions", "mission"), "missions");
    }

    #[test]
    fn test_title_variants() {
        let variants = title_variants(
            "My Hero - MAN WITH A MISSION ( Inuyashiki OP )",
            &["man with a mission".to_string()],
        );
        assert!(variants.contains(&"my hero".to_string()));
        assert!(variants.contains(&"my hero man with a mission inuyashiki op".to_string()));
        assert!(variants.iter().all(|v| !v.is_empty()));
    }

    #[test]
    fn test_title_variants_title_equal_to_artist() {
        let variants = title_variants("Queen", &["queen".to_string()]);
        assert_eq!(variants, vec!["queen".to_string()]);
    }

    #[test]
    fn test_containment_on_word_boundaries() {
        let r = ratio("beyonce", "beyonce knowles");
        assert!(r > 0.7 && r < 1.0);
        assert_eq!(containment("hero", "heroes"), 0.0);
        assert_eq!(ratio("my hero", "hero"), ratio("hero", "my hero"));
    }

    #[test]
    fn test_ratio_bounds() {
        assert_eq!(ratio("abc", "abc"), 1.0);
        assert_eq!(ratio("", "abc"), 0.0);
        let r = ratio("rachmaninov", "rahmaninov");
        assert!(r > 0.8 && r < 1.0);
        assert_eq!(ratio("kitten", "sitting"), ratio("sitting", "kitten"));
    }
}
