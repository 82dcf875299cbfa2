//! Static distress keyword store
//!
//! Keywords are lowercase tokens tagged with their source language. The
//! store is built once at startup and only ever iterated or scanned; list
//! order is significant because the first matching entry wins.

use std::fmt;

/// Source language of a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Kiswahili,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Kiswahili => write!(f, "Kiswahili"),
        }
    }
}

/// English distress keywords
pub const ENGLISH_KEYWORDS: [&str; 7] =
    ["help", "stop", "no", "afraid", "pain", "robbery", "emergency"];

/// Kiswahili distress keywords, common phrases used in distress
pub const KISWAHILI_KEYWORDS: [&str; 11] = [
    "saidia",  // help
    "acha",    // stop
    "hapana",  // no
    "naogopa", // I'm afraid
    "maumivu", // pain
    "wezi",    // robbers
    "hatari",  // danger
    "naibiwa", // I'm being robbed
    "polisi",  // police
    "mwizi",   // thief
    "napigwa", // I'm being beaten
];

/// A single distress keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyword {
    text: &'static str,
    language: Language,
}

impl Keyword {
    pub fn text(&self) -> &'static str {
        self.text
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Ordered, immutable set of distress keywords
pub struct KeywordSet {
    entries: Vec<Keyword>,
    languages: Vec<Language>,
}

impl KeywordSet {
    /// English keywords only
    pub fn english() -> Self {
        Self {
            entries: tagged(&ENGLISH_KEYWORDS, Language::English),
            languages: vec![Language::English],
        }
    }

    /// English keywords followed by Kiswahili keywords
    pub fn bilingual() -> Self {
        let mut entries = tagged(&ENGLISH_KEYWORDS, Language::English);
        entries.extend(tagged(&KISWAHILI_KEYWORDS, Language::Kiswahili));
        Self {
            entries,
            languages: vec![Language::English, Language::Kiswahili],
        }
    }

    /// Find the first keyword contained in the transcript.
    ///
    /// Matching is case-insensitive substring containment. List order
    /// breaks ties: when several keywords are present, the earliest entry
    /// wins and scanning stops.
    pub fn first_match(&self, transcript: &str) -> Option<&Keyword> {
        let text = transcript.to_lowercase();
        self.entries.iter().find(|k| text.contains(k.text))
    }

    /// Iterate keywords in scan order
    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.entries.iter()
    }

    /// Languages covered by this set, for display
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn tagged(words: &[&'static str], language: Language) -> Vec<Keyword> {
    words
        .iter()
        .map(|&text| Keyword { text, language })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bilingual_order() {
        let set = KeywordSet::bilingual();
        assert_eq!(
            set.len(),
            ENGLISH_KEYWORDS.len() + KISWAHILI_KEYWORDS.len()
        );

        // English entries precede Kiswahili entries
        let first = set.iter().next().unwrap();
        assert_eq!(first.language(), Language::English);
        let last = set.iter().last().unwrap();
        assert_eq!(last.language(), Language::Kiswahili);
    }

    #[test]
    fn test_first_match_by_list_order() {
        let set = KeywordSet::bilingual();

        // "wezi" (Kiswahili) also matches, but "help" comes first in scan order
        let matched = set.first_match("please help me there are wezi outside");
        assert_eq!(matched.map(|k| k.text()), Some("help"));
        assert_eq!(matched.map(|k| k.language()), Some(Language::English));
    }

    #[test]
    fn test_no_match() {
        let set = KeywordSet::bilingual();
        assert!(set.first_match("hakuna shida leo").is_none());
        assert!(set.first_match("").is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let set = KeywordSet::bilingual();
        let matched = set.first_match("HELP me");
        assert_eq!(matched.map(|k| k.text()), Some("help"));
    }

    #[test]
    fn test_substring_containment() {
        let set = KeywordSet::bilingual();
        // "no" is a substring of "nothing"; containment semantics accept it
        let matched = set.first_match("there is nothing here");
        assert_eq!(matched.map(|k| k.text()), Some("no"));
    }

    #[test]
    fn test_english_only_set() {
        let set = KeywordSet::english();
        assert_eq!(set.len(), ENGLISH_KEYWORDS.len());
        assert!(set.first_match("kuna wezi hapa").is_none());
        assert_eq!(set.languages(), &[Language::English]);
    }
}
