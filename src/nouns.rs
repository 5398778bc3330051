/*!
 * Noun records and the result types produced by the oracle.
 *
 * Every noun carries one of three grammatical genders. On the wire a gender is
 * written as the German definite article (`der`, `die`, `das`); the English
 * names are accepted as well since some models prefer them.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grammatical gender of a German noun
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenderMarker {
    Masculine,
    Feminine,
    Neuter,
}

impl GenderMarker {
    /// All markers in display order
    pub const ALL: [GenderMarker; 3] = [Self::Masculine, Self::Feminine, Self::Neuter];

    /// The definite article for this gender (nominative singular)
    pub fn article(&self) -> &'static str {
        match self {
            Self::Masculine => "der",
            Self::Feminine => "die",
            Self::Neuter => "das",
        }
    }

    /// Lowercase English name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Masculine => "masculine",
            Self::Feminine => "feminine",
            Self::Neuter => "neuter",
        }
    }
}

impl fmt::Display for GenderMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for GenderMarker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "der" | "masculine" | "m" => Ok(Self::Masculine),
            "die" | "feminine" | "f" => Ok(Self::Feminine),
            "das" | "neuter" | "n" => Ok(Self::Neuter),
            other => Err(format!("Unknown gender marker: {}", other)),
        }
    }
}

impl Serialize for GenderMarker {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.article())
    }
}

impl<'de> Deserialize<'de> for GenderMarker {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A noun found in the German translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NounRecord {
    /// The noun in German, singular form
    #[serde(rename = "germanWord")]
    pub word: String,

    /// Grammatical gender
    #[serde(rename = "article")]
    pub gender: GenderMarker,

    /// Meaning of the noun in the gloss language
    pub translation: String,
}

impl NounRecord {
    pub fn new(word: impl Into<String>, gender: GenderMarker, translation: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            gender,
            translation: translation.into(),
        }
    }

    /// Article and word, e.g. "die Mutter"
    pub fn with_article(&self) -> String {
        format!("{} {}", self.gender.article(), self.word)
    }
}

/// Outcome of a successful analyze call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisResult {
    /// Full German translation of the input
    pub translated_text: String,
    /// Nouns of the translation, in order of appearance
    pub nouns: Vec<NounRecord>,
}

/// One noun substitution made while rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteChange {
    pub original_word: String,
    pub rewritten_word: String,
}

impl RewriteChange {
    pub fn new(original_word: impl Into<String>, rewritten_word: impl Into<String>) -> Self {
        Self {
            original_word: original_word.into(),
            rewritten_word: rewritten_word.into(),
        }
    }
}

/// Outcome of a successful rewrite call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RewriteResult {
    /// Rewritten text in the input's own language
    pub rewritten_text: String,
    /// German translation of the rewritten text
    pub rewritten_translated_text: String,
    pub changes: Vec<RewriteChange>,
    pub nouns: Vec<NounRecord>,
}

/// Nouns split by gender, each group keeping input order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategorizedNouns {
    pub masculine: Vec<NounRecord>,
    pub feminine: Vec<NounRecord>,
    pub neuter: Vec<NounRecord>,
}

impl CategorizedNouns {
    /// Partition `nouns` by gender. `None` yields three empty groups.
    pub fn from_nouns(nouns: Option<&[NounRecord]>) -> Self {
        let mut categorized = Self::default();
        for noun in nouns.unwrap_or_default() {
            match noun.gender {
                GenderMarker::Masculine => categorized.masculine.push(noun.clone()),
                GenderMarker::Feminine => categorized.feminine.push(noun.clone()),
                GenderMarker::Neuter => categorized.neuter.push(noun.clone()),
            }
        }
        categorized
    }

    /// The group for one gender
    pub fn group(&self, gender: GenderMarker) -> &[NounRecord] {
        match gender {
            GenderMarker::Masculine => &self.masculine,
            GenderMarker::Feminine => &self.feminine,
            GenderMarker::Neuter => &self.neuter,
        }
    }

    pub fn total(&self) -> usize {
        self.masculine.len() + self.feminine.len() + self.neuter.len()
    }
}
