//! Character⇄Morse translation.
//!
//! Translation never fails: characters or symbol groups without a mapping
//! are skipped (text → Morse) or replaced with a placeholder (Morse → text)
//! and reported alongside the partial output.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholder emitted for a Morse group with no known character.
pub const PLACEHOLDER: char = '?';

/// Character to symbol-group table. The text space maps to the `/` word
/// separator, so encoding handles spacing through the table itself.
const MORSE_TABLE: &[(char, &str)] = &[
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('.', ".-.-.-"),
    (',', "--..--"),
    ('?', "..--.."),
    ('\'', ".----."),
    ('!', "-.-.--"),
    ('/', "-..-."),
    ('(', "-.--."),
    (')', "-.--.-"),
    ('&', ".-..."),
    (':', "---..."),
    (';', "-.-.-."),
    ('=', "-...-"),
    ('+', ".-.-."),
    ('-', "-....-"),
    ('_', "..--.-"),
    ('"', ".-..-."),
    ('$', "...-..-"),
    ('@', ".--.-."),
    (' ', "/"),
];

static FORWARD: Lazy<HashMap<char, &'static str>> =
    Lazy::new(|| MORSE_TABLE.iter().copied().collect());

static REVERSE: Lazy<HashMap<&'static str, char>> =
    Lazy::new(|| MORSE_TABLE.iter().map(|&(c, m)| (m, c)).collect());

/// Outcome of a translation: the partial output plus the units that had no
/// mapping, deduplicated in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub output: String,
    pub untranslated: Vec<String>,
}

impl Conversion {
    /// True if every unit of the input was translated.
    pub fn is_complete(&self) -> bool {
        self.untranslated.is_empty()
    }
}

/// Normalize a Morse-formatted string: pad `/` separators with single
/// spaces and collapse runs of whitespace, trimming both ends.
pub fn normalize(morse: &str) -> String {
    let padded = morse.replace('/', " / ");
    padded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Translate text to Morse. Input is case-normalized to uppercase; symbol
/// groups are joined by single spaces and words separated by `/`. Unmapped
/// non-whitespace characters are omitted and reported.
pub fn encode(text: &str) -> Conversion {
    let mut groups = Vec::new();
    let mut untranslated = Vec::new();

    for ch in text.to_uppercase().chars() {
        if let Some(group) = FORWARD.get(&ch) {
            groups.push(*group);
        } else if !ch.is_whitespace() {
            push_unique(&mut untranslated, ch.to_string());
        }
    }

    Conversion {
        output: groups.join(" "),
        untranslated,
    }
}

/// Translate Morse to text. The input is normalized first, so repeated
/// whitespace and unpadded `/` separators are tolerated. Unknown symbol
/// groups become [`PLACEHOLDER`] in the output and are reported.
pub fn decode(morse: &str) -> Conversion {
    let normalized = normalize(morse);
    let mut words = Vec::new();
    let mut untranslated = Vec::new();

    for word in normalized.split('/') {
        let mut text = String::new();
        for group in word.split_whitespace() {
            if let Some(ch) = REVERSE.get(group) {
                text.push(*ch);
            } else {
                text.push(PLACEHOLDER);
                push_unique(&mut untranslated, group.to_string());
            }
        }
        if !text.is_empty() {
            words.push(text);
        }
    }

    Conversion {
        output: words.join(" "),
        untranslated,
    }
}

fn push_unique(list: &mut Vec<String>, unit: String) {
    if !list.contains(&unit) {
        list.push(unit);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_sos() {
        let result = encode("SOS");
        assert_eq!(result.output, "... --- ...");
        assert!(result.is_complete());
    }

    #[test]
    fn test_encode_lowercase() {
        assert_eq!(encode("sos").output, "... --- ...");
    }

    #[test]
    fn test_encode_words() {
        assert_eq!(encode("HI YOU").output, ".... .. / -.-- --- ..-");
    }

    #[test]
    fn test_encode_empty() {
        let result = encode("");
        assert!(result.output.is_empty());
        assert!(result.untranslated.is_empty());
    }

    #[test]
    fn test_encode_unknown_char_deduplicated() {
        let result = encode("A#B#");
        assert_eq!(result.output, ".- -...");
        assert_eq!(result.untranslated, vec!["#".to_string()]);
    }

    #[test]
    fn test_decode_basic() {
        let result = decode("... --- ...");
        assert_eq!(result.output, "SOS");
        assert!(result.is_complete());
    }

    #[test]
    fn test_decode_words() {
        assert_eq!(decode(".... .. / -.-- --- ..-").output, "HI YOU");
    }

    #[test]
    fn test_decode_unknown_group_placeholder() {
        let result = decode(".- .-.-.-.- .- .-.-.-.-");
        assert_eq!(result.output, "A?A?");
        assert_eq!(result.untranslated, vec![".-.-.-.-".to_string()]);
    }

    #[test]
    fn test_decode_tolerates_messy_spacing() {
        assert_eq!(decode("  ....   ../ -.-- ---   ..- ").output, "HI YOU");
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode("").output, "");
        assert_eq!(decode("   ").output, "");
    }

    #[test]
    fn test_normalize_pads_slashes() {
        assert_eq!(normalize("-.--/.."), "-.-- / ..");
        assert_eq!(normalize(".   .-"), ". .-");
    }

    proptest! {
        #[test]
        fn prop_round_trip(text in "[A-Z0-9]{1,12}( [A-Z0-9]{1,12}){0,3}") {
            let morse = encode(&text);
            prop_assert!(morse.is_complete());
            let back = decode(&morse.output);
            prop_assert!(back.is_complete());
            prop_assert_eq!(back.output, text);
        }
    }
}
