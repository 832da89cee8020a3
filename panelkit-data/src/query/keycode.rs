//! Keystroke normalization for `likecode` matching.
//!
//! Hangul syllables are decomposed into the compatibility jamo a 2-set
//! keyboard types, with compound vowels and final clusters split into their
//! individual keystrokes. A partially typed syllable ("하" while typing
//! "한") is then a substring of the full word's keystroke sequence.

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;

const INITIALS: [&str; 19] = [
    "ㄱ", "ㄲ", "ㄴ", "ㄷ", "ㄸ", "ㄹ", "ㅁ", "ㅂ", "ㅃ", "ㅅ", "ㅆ", "ㅇ", "ㅈ", "ㅉ", "ㅊ", "ㅋ",
    "ㅌ", "ㅍ", "ㅎ",
];

const MEDIALS: [&str; 21] = [
    "ㅏ", "ㅐ", "ㅑ", "ㅒ", "ㅓ", "ㅔ", "ㅕ", "ㅖ", "ㅗ", "ㅗㅏ", "ㅗㅐ", "ㅗㅣ", "ㅛ", "ㅜ",
    "ㅜㅓ", "ㅜㅔ", "ㅜㅣ", "ㅠ", "ㅡ", "ㅡㅣ", "ㅣ",
];

const FINALS: [&str; 28] = [
    "", "ㄱ", "ㄲ", "ㄱㅅ", "ㄴ", "ㄴㅈ", "ㄴㅎ", "ㄷ", "ㄹ", "ㄹㄱ", "ㄹㅁ", "ㄹㅂ", "ㄹㅅ",
    "ㄹㅌ", "ㄹㅍ", "ㄹㅎ", "ㅁ", "ㅂ", "ㅂㅅ", "ㅅ", "ㅆ", "ㅇ", "ㅈ", "ㅊ", "ㅋ", "ㅌ", "ㅍ",
    "ㅎ",
];

/// Standalone compound jamo split into keystrokes.
fn split_compound(c: char) -> Option<&'static str> {
    Some(match c {
        'ㄳ' => "ㄱㅅ",
        'ㄵ' => "ㄴㅈ",
        'ㄶ' => "ㄴㅎ",
        'ㄺ' => "ㄹㄱ",
        'ㄻ' => "ㄹㅁ",
        'ㄼ' => "ㄹㅂ",
        'ㄽ' => "ㄹㅅ",
        'ㄾ' => "ㄹㅌ",
        'ㄿ' => "ㄹㅍ",
        'ㅀ' => "ㄹㅎ",
        'ㅄ' => "ㅂㅅ",
        'ㅘ' => "ㅗㅏ",
        'ㅙ' => "ㅗㅐ",
        'ㅚ' => "ㅗㅣ",
        'ㅝ' => "ㅜㅓ",
        'ㅞ' => "ㅜㅔ",
        'ㅟ' => "ㅜㅣ",
        'ㅢ' => "ㅡㅣ",
        _ => return None,
    })
}

/// Converts text into its lowercase keystroke sequence.
pub fn keycode(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        let code = c as u32;
        if (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&code) {
            let index = code - SYLLABLE_BASE;
            out.push_str(INITIALS[(index / 588) as usize]);
            out.push_str(MEDIALS[((index % 588) / 28) as usize]);
            out.push_str(FINALS[(index % 28) as usize]);
        } else if let Some(keys) = split_compound(c) {
            out.push_str(keys);
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Returns `true` if `needle`'s keystrokes occur within `haystack`'s.
pub fn matches_keycode(haystack: &str, needle: &str) -> bool {
    keycode(haystack).contains(&keycode(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decomposes_syllables() {
        assert_eq!(keycode("한"), "ㅎㅏㄴ");
        assert_eq!(keycode("값"), "ㄱㅏㅂㅅ");
        assert_eq!(keycode("Hi"), "hi");
    }

    #[test]
    fn test_partial_syllable_matches() {
        assert!(matches_keycode("한글", "하"));
        assert!(matches_keycode("한글", "한그"));
        assert!(!matches_keycode("한글", "국"));
    }

    #[test]
    fn test_compound_vowel_prefix_matches() {
        // "과" is typed ㄱ ㅗ ㅏ, so "고" is a prefix
        assert!(matches_keycode("과자", "고"));
    }
}
