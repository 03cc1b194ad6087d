//! Spanish (es-ES) collation
//!
//! Builds a three-level sort key per string:
//! - primary: base letters without accents or case, with `ñ` as its own
//!   letter between `n` and `o`
//! - secondary: accents, unaccented first
//! - tertiary: case, lowercase first
//!
//! Keys compare lexicographically level by level, so two strings only tie
//! when they are identical at every level.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Comparable collation key for a single string
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    primary: Vec<u32>,
    secondary: Vec<u32>,
    tertiary: Vec<u8>,
}

/// Secondary weights of the common diacritics, in Unicode collation order
const ACCENT_ORDER: &[(char, u32)] = &[
    ('\u{0301}', 1),  // acute
    ('\u{0300}', 2),  // grave
    ('\u{0306}', 3),  // breve
    ('\u{0302}', 4),  // circumflex
    ('\u{030C}', 5),  // caron
    ('\u{030A}', 6),  // ring above
    ('\u{0308}', 7),  // diaeresis
    ('\u{030B}', 8),  // double acute
    ('\u{0303}', 9),  // tilde
    ('\u{0307}', 10), // dot above
    ('\u{0327}', 11), // cedilla
    ('\u{0328}', 12), // ogonek
    ('\u{0304}', 13), // macron
];

/// Marks missing from `ACCENT_ORDER` sort after the listed ones
const OTHER_ACCENT_BASE: u32 = 0x100;

/// Secondary weight of letters folded through `fold_letter`, after every accent
const FOLDED_WEIGHT: u32 = 0x1000;

const fn primary_weight(ch: char) -> u32 {
    (ch as u32) << 1
}

fn accent_weight(mark: char) -> u32 {
    ACCENT_ORDER
        .iter()
        .find(|(m, _)| *m == mark)
        .map_or(OTHER_ACCENT_BASE + mark as u32, |(_, weight)| *weight)
}

/// Base letters of lowercase letters that have no canonical decomposition
fn fold_letter(ch: char) -> Option<&'static str> {
    match ch {
        'ß' => Some("ss"),
        'æ' => Some("ae"),
        'œ' => Some("oe"),
        'ø' => Some("o"),
        'ł' => Some("l"),
        'đ' | 'ð' => Some("d"),
        'þ' => Some("th"),
        'ı' => Some("i"),
        _ => None,
    }
}

impl SortKey {
    fn push(&mut self, primary: u32, secondary: u32, case: u8) {
        self.primary.push(primary);
        self.secondary.push(secondary);
        self.tertiary.push(case);
    }
}

/// Build the collation key of `s`
pub fn sort_key(s: &str) -> SortKey {
    let mut key = SortKey::default();

    for ch in s.chars() {
        let case = u8::from(ch.is_uppercase());

        for lower in ch.to_lowercase() {
            if lower == 'ñ' {
                key.push(primary_weight('n') + 1, 0, case);
                continue;
            }

            if let Some(folded) = fold_letter(lower) {
                for base in folded.chars() {
                    key.push(primary_weight(base), FOLDED_WEIGHT, case);
                }
                continue;
            }

            let mut base = None;
            let mut accent = 0;
            for part in std::iter::once(lower).nfd() {
                if is_combining_mark(part) {
                    if accent == 0 {
                        accent = accent_weight(part);
                    }
                } else if base.is_none() {
                    base = Some(part);
                }
            }

            // A lone combining mark carries no letter
            let Some(base) = base else {
                continue;
            };

            key.push(primary_weight(base), accent, case);
        }
    }

    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    fn compare(a: &str, b: &str) -> Ordering {
        sort_key(a).cmp(&sort_key(b))
    }

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = names.iter().map(ToString::to_string).collect();
        v.sort_by(|a, b| compare(a, b));
        v
    }

    #[test]
    fn test_accents_sort_next_to_plain_letters() {
        assert_eq!(
            sorted(&["Zapata", "Álvarez", "Bécquer", "Alvarez", "Arias"]),
            vec!["Alvarez", "Álvarez", "Arias", "Bécquer", "Zapata"]
        );
    }

    #[test]
    fn test_accent_ranking() {
        assert_eq!(
            sorted(&["Pêra", "Pèra", "Péra", "Pera", "Përa"]),
            vec!["Pera", "Péra", "Pèra", "Pêra", "Përa"]
        );
    }

    #[test]
    fn test_letters_without_decomposition() {
        assert_eq!(
            sorted(&["Zapata", "Øverland", "Pérez", "Łopez", "Martín"]),
            vec!["Łopez", "Martín", "Øverland", "Pérez", "Zapata"]
        );
        assert_eq!(
            sorted(&["Strausz", "Strauß", "Strauss", "Đurić", "Dumas", "Ærø"]),
            vec!["Ærø", "Dumas", "Đurić", "Strauss", "Strauß", "Strausz"]
        );
    }

    #[test]
    fn test_enye_is_a_separate_letter() {
        assert_eq!(
            sorted(&["Ñúñez", "Oliva", "Nyman", "Nuño", "Nuñez"]),
            vec!["Nuñez", "Nuño", "Nyman", "Ñúñez", "Oliva"]
        );
    }

    #[test]
    fn test_case_is_tertiary() {
        assert_eq!(compare("de la Cruz", "De la Cruz"), Ordering::Less);
        assert_eq!(compare("De la Cruz", "de la Cruza"), Ordering::Less);
        assert_eq!(compare("dumas", "DUMAS"), Ordering::Less);
    }

    #[test]
    fn test_identical_strings_tie() {
        assert_eq!(compare("García Márquez", "García Márquez"), Ordering::Equal);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(compare("Dum", "Dumas"), Ordering::Less);
        assert_eq!(compare("", "A"), Ordering::Less);
    }
}
