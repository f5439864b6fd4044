//! Wordlist registry.
//!
//! Each supported language maps to a fixed 2048-word table plus a reverse
//! index from word to position. The registry also tracks a process-wide
//! *active* language, which the codec functions use when no explicit
//! language is supplied. The active language is read-mostly: it is set once
//! at startup (e.g. from a CLI flag) and only read during derivation.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Number of entries in every BIP39 wordlist.
pub const WORDLIST_SIZE: usize = 2048;

/// A mnemonic wordlist language.
///
/// The variants mirror the languages published with the BIP39 standard.
/// [`Language::parse`] accepts the short codes used on the command line
/// (`en`, `zh-cn`, `zh-tw`, `fr`, `it`, `ja`, `ko`, `es`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    ChineseSimplified,
    ChineseTraditional,
    French,
    Italian,
    Japanese,
    Korean,
    Spanish,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 8] = [
        Language::English,
        Language::ChineseSimplified,
        Language::ChineseTraditional,
        Language::French,
        Language::Italian,
        Language::Japanese,
        Language::Korean,
        Language::Spanish,
    ];

    /// Parses a short language code, defaulting to English for anything
    /// unrecognized.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyvault_bip39::Language;
    ///
    /// assert_eq!(Language::parse("zh-cn"), Language::ChineseSimplified);
    /// assert_eq!(Language::parse("ko"), Language::Korean);
    /// assert_eq!(Language::parse("klingon"), Language::English);
    /// ```
    pub fn parse(code: &str) -> Language {
        match code {
            "zh-cn" => Language::ChineseSimplified,
            "zh-tw" => Language::ChineseTraditional,
            "fr" => Language::French,
            "it" => Language::Italian,
            "ja" => Language::Japanese,
            "ko" => Language::Korean,
            "es" => Language::Spanish,
            _ => Language::English,
        }
    }

    /// The short code for this language.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::ChineseSimplified => "zh-cn",
            Language::ChineseTraditional => "zh-tw",
            Language::French => "fr",
            Language::Italian => "it",
            Language::Japanese => "ja",
            Language::Korean => "ko",
            Language::Spanish => "es",
        }
    }

    fn upstream(self) -> bip39_upstream::Language {
        match self {
            Language::English => bip39_upstream::Language::English,
            Language::ChineseSimplified => bip39_upstream::Language::SimplifiedChinese,
            Language::ChineseTraditional => bip39_upstream::Language::TraditionalChinese,
            Language::French => bip39_upstream::Language::French,
            Language::Italian => bip39_upstream::Language::Italian,
            Language::Japanese => bip39_upstream::Language::Japanese,
            Language::Korean => bip39_upstream::Language::Korean,
            Language::Spanish => bip39_upstream::Language::Spanish,
        }
    }
}

/// A 2048-word table with a reverse index from word to position.
pub struct Wordlist {
    words: &'static [&'static str; WORDLIST_SIZE],
    index: HashMap<&'static str, u16>,
}

impl Wordlist {
    fn new(words: &'static [&'static str; WORDLIST_SIZE]) -> Self {
        let index = words
            .iter()
            .enumerate()
            .map(|(i, &word)| (word, i as u16))
            .collect();
        Wordlist { words, index }
    }

    /// Returns the word at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 2048`. The codec only produces 11-bit indices.
    pub fn word(&self, index: u16) -> &'static str {
        self.words[index as usize]
    }

    /// Looks a word up in the reverse index.
    pub fn index_of(&self, word: &str) -> Option<u16> {
        self.index.get(word).copied()
    }

    /// The underlying word table.
    pub fn words(&self) -> &'static [&'static str; WORDLIST_SIZE] {
        self.words
    }
}

static WORDLISTS: Lazy<HashMap<Language, Wordlist>> = Lazy::new(|| {
    Language::ALL
        .iter()
        .map(|&language| (language, Wordlist::new(language.upstream().word_list())))
        .collect()
});

static ACTIVE: RwLock<Language> = RwLock::new(Language::English);

/// Returns the wordlist for `language`.
///
/// Lists (and their reverse indexes) are built once per process on first
/// use and shared afterwards.
pub fn wordlist(language: Language) -> &'static Wordlist {
    &WORDLISTS[&language]
}

/// Sets the process-wide active wordlist language.
pub fn set_active_language(language: Language) {
    *ACTIVE.write() = language;
}

/// Returns the process-wide active wordlist language.
///
/// Defaults to [`Language::English`].
pub fn active_language() -> Language {
    *ACTIVE.read()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_codes() {
        assert_eq!(Language::parse("en"), Language::English);
        assert_eq!(Language::parse("zh-cn"), Language::ChineseSimplified);
        assert_eq!(Language::parse("zh-tw"), Language::ChineseTraditional);
        assert_eq!(Language::parse("fr"), Language::French);
        assert_eq!(Language::parse("it"), Language::Italian);
        assert_eq!(Language::parse("ja"), Language::Japanese);
        assert_eq!(Language::parse("ko"), Language::Korean);
        assert_eq!(Language::parse("es"), Language::Spanish);
    }

    #[test]
    fn test_parse_unknown_defaults_to_english() {
        assert_eq!(Language::parse(""), Language::English);
        assert_eq!(Language::parse("de"), Language::English);
    }

    #[test]
    fn test_code_round_trip() {
        for language in Language::ALL {
            assert_eq!(Language::parse(language.code()), language);
        }
    }

    #[test]
    fn test_wordlist_size() {
        for language in Language::ALL {
            assert_eq!(wordlist(language).words().len(), WORDLIST_SIZE);
        }
    }

    #[test]
    fn test_english_wordlist_contents() {
        let list = wordlist(Language::English);
        assert_eq!(list.word(0), "abandon");
        assert_eq!(list.word(2047), "zoo");
    }

    #[test]
    fn test_reverse_index() {
        let list = wordlist(Language::English);
        assert_eq!(list.index_of("abandon"), Some(0));
        assert_eq!(list.index_of("zoo"), Some(2047));
        assert_eq!(list.index_of("notaword"), None);
    }

    #[test]
    fn test_reverse_index_is_complete() {
        let list = wordlist(Language::English);
        for (i, word) in list.words().iter().enumerate() {
            assert_eq!(list.index_of(word), Some(i as u16));
        }
    }
}
