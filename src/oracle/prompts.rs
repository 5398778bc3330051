/*!
 * Prompt templates for the analysis and rewrite calls.
 *
 * Both prompts ask for a single JSON object whose field names match what
 * `oracle::payload` decodes.
 */

use crate::nouns::NounRecord;

/// A system prompt and a user prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Template builder for oracle prompts.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    gloss_language: String,
}

impl PromptTemplate {
    pub const ANALYSIS_SYSTEM: &'static str = r#"You are an expert translator and German grammarian.

## Task
1. Translate the user's text into German.
2. Identify every noun in the German translation.
3. For each noun give its definite article (der, die or das), which marks its grammatical gender.
4. For each noun give its meaning in {gloss_language}.

## Output Requirements
Return ONLY one JSON object, no other text:
{
  "germanTranslation": "<the full German translation>",
  "nouns": [
    {"germanWord": "<noun, singular>", "article": "der|die|das", "translation": "<meaning>"}
  ]
}"#;

    pub const REWRITE_SYSTEM: &'static str = r#"You are an expert in German and a creative rewriting assistant.

## Gender pH
- Masculine nouns (der) are acidic, toward pH 1.
- Feminine nouns (die) are alkaline, toward pH 14.
- Neuter nouns (das) are neutral and pull the value toward pH 7.
- The pH is mainly decided by the ratio of masculine to feminine nouns: 100% masculine is pH 1, 100% feminine is pH 14.

## Task
Rewrite the original text, keeping its language, context and meaning as far as possible, by replacing nouns with other nouns so that the German translation of the rewritten text moves toward the target pH.
- To lower the pH, replace feminine or neuter nouns with fitting masculine ones.
- To raise the pH, replace masculine or neuter nouns with fitting feminine ones.
Report every replacement you made. Give noun meanings in {gloss_language}.

## Output Requirements
Return ONLY one JSON object, no other text:
{
  "rewrittenText": "<the rewritten text, in the original language>",
  "rewrittenGerman": "<German translation of the rewritten text>",
  "changes": [{"originalWord": "<replaced word>", "rewrittenWord": "<replacement>"}],
  "newNouns": [{"germanWord": "<noun>", "article": "der|die|das", "translation": "<meaning>"}]
}"#;

    /// `gloss_language` of "auto" means the language of the input text
    pub fn new(gloss_language: &str) -> Self {
        let gloss_language = if gloss_language.trim().eq_ignore_ascii_case("auto") {
            "the language of the original text".to_string()
        } else {
            gloss_language.trim().to_string()
        };
        Self { gloss_language }
    }

    fn render(&self, template: &str) -> String {
        template.replace("{gloss_language}", &self.gloss_language)
    }

    /// Prompt for translating and tagging `text`
    pub fn analysis(&self, text: &str) -> Prompt {
        Prompt {
            system: self.render(Self::ANALYSIS_SYSTEM),
            user: format!("Text: \"{}\"", text),
        }
    }

    /// Prompt for rewriting `text` toward `target_score`
    pub fn rewrite(&self, text: &str, current_nouns: &[NounRecord], target_score: f64) -> Prompt {
        let nouns_json = serde_json::to_string(current_nouns).unwrap_or_else(|_| "[]".to_string());
        Prompt {
            system: self.render(Self::REWRITE_SYSTEM),
            user: format!(
                "Original text: \"{}\"\nCurrent German nouns: {}\nTarget pH: {}",
                text, nouns_json, target_score
            ),
        }
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new("auto")
    }
}
