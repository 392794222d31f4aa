//! Diacritic Handling
//!
//! Two operations over accented text:
//! - [`normalize`] composes decomposed sequences (`e` + combining acute) into
//!   their precomposed glyphs so that equal words compare equal.
//! - [`fold`] strips diacritics down to an ASCII-safe alternate, used to
//!   index an unaccented variant next to every accented stem.

use std::borrow::Cow;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::{is_nfc_quick, IsNormalized, UnicodeNormalization};

/// Compose decomposed diacritic sequences (NFC). Idempotent.
pub fn normalize(text: &str) -> Cow<'_, str> {
    if is_nfc_quick(text.chars()) == IsNormalized::Yes {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.nfc().collect())
    }
}

/// Fold `text` to its unaccented form.
///
/// Letters that do not decompose (`ł`, `ø`, `ß`, ...) are mapped explicitly.
/// Marks are stripped from Latin, Greek and Cyrillic letters only; in other
/// scripts (Devanagari vowel signs, Hebrew points) they are part of the word
/// and stay.
pub fn fold(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }

    let mut stripped = String::with_capacity(text.len());
    let mut strip_marks = true;
    let mut changed = false;
    for c in text.nfd() {
        if is_combining_mark(c) {
            if strip_marks {
                changed = true;
            } else {
                stripped.push(c);
            }
            continue;
        }
        strip_marks = has_foldable_marks(c);
        match special_fold(c) {
            Some(replacement) => {
                stripped.push_str(replacement);
                changed = true;
            }
            None => stripped.push(c),
        }
    }

    if !changed {
        return Cow::Borrowed(text);
    }
    // recompose what was decomposed without losing marks (e.g. Hangul)
    Cow::Owned(stripped.nfc().collect())
}

/// Latin, Greek and Cyrillic blocks.
fn has_foldable_marks(base: char) -> bool {
    matches!(
        base,
        '\u{0000}'..='\u{024F}'
            | '\u{1E00}'..='\u{1EFF}'
            | '\u{0370}'..='\u{03FF}'
            | '\u{1F00}'..='\u{1FFF}'
            | '\u{0400}'..='\u{052F}'
    )
}

/// Whether folding changes `text`.
pub fn has_diacritics(text: &str) -> bool {
    matches!(fold(text), Cow::Owned(_))
}

fn special_fold(c: char) -> Option<&'static str> {
    let replacement = match c {
        'ł' => "l",
        'Ł' => "L",
        'đ' => "d",
        'Đ' => "D",
        'ø' => "o",
        'Ø' => "O",
        'ħ' => "h",
        'Ħ' => "H",
        'ı' => "i",
        'ŀ' => "l",
        'Ŀ' => "L",
        'ß' => "ss",
        'ẞ' => "SS",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'þ' => "th",
        'Þ' => "TH",
        'ð' => "d",
        'Ð' => "D",
        '\u{2019}' => "'",
        _ => return None,
    };
    Some(replacement)
}
