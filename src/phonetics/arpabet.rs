/// ARPAbet base symbols (stress stripped) to IPA, as emitted by English G2P
/// front ends.
const ARPABET_TO_IPA: &[(&str, &str)] = &[
    ("B", "b"),
    ("P", "p"),
    ("T", "t"),
    ("D", "d"),
    ("K", "k"),
    ("G", "ɡ"),
    ("F", "f"),
    ("V", "v"),
    ("TH", "θ"),
    ("DH", "ð"),
    ("S", "s"),
    ("Z", "z"),
    ("SH", "ʃ"),
    ("ZH", "ʒ"),
    ("HH", "h"),
    ("CH", "tʃ"),
    ("JH", "dʒ"),
    ("M", "m"),
    ("N", "n"),
    ("NG", "ŋ"),
    ("L", "l"),
    ("R", "ɹ"),
    ("Y", "j"),
    ("W", "w"),
    ("IY", "i"),
    ("IH", "ɪ"),
    ("EY", "e"),
    ("EH", "ɛ"),
    ("AE", "æ"),
    ("AA", "ɑ"),
    ("AH", "ə"),
    ("AO", "ɔ"),
    ("UH", "ʊ"),
    ("UW", "u"),
    ("ER", "ɝ"),
    ("OW", "o"),
    ("AY", "aɪ"),
    ("AW", "aʊ"),
    ("OY", "ɔɪ"),
];

/// Maps one ARPAbet token (e.g. `"AH0"`, `"hh"`) to IPA.
///
/// Returns `None` for punctuation, word separators and unknown symbols.
pub fn arpabet_to_ipa(token: &str) -> Option<&'static str> {
    let base: String = token
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if base.is_empty() {
        return None;
    }
    ARPABET_TO_IPA
        .iter()
        .find(|(arpa, _)| *arpa == base)
        .map(|&(_, ipa)| ipa)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stress_digits_are_ignored() {
        assert_eq!(arpabet_to_ipa("AH0"), Some("ə"));
        assert_eq!(arpabet_to_ipa("AE1"), Some("æ"));
        assert_eq!(arpabet_to_ipa("ER2"), Some("ɝ"));
    }

    #[test]
    fn lowercase_input_is_accepted() {
        assert_eq!(arpabet_to_ipa("k"), Some("k"));
        assert_eq!(arpabet_to_ipa("ng"), Some("ŋ"));
    }

    #[test]
    fn non_phoneme_tokens_map_to_none() {
        assert_eq!(arpabet_to_ipa(" "), None);
        assert_eq!(arpabet_to_ipa("'"), None);
        assert_eq!(arpabet_to_ipa("XX"), None);
    }
}
