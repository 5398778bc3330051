/*!
 * Decoding of oracle completions into analysis and rewrite results.
 *
 * Models do not always honour the requested format, so decoding is lenient at
 * the entry level: a noun without a usable word, translation or gender marker
 * is dropped and the rest of the payload is kept. Only a completion that holds
 * no JSON object at all, or one whose top-level shape is wrong, is an error.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::OracleError;
use crate::nouns::{AnalysisResult, GenderMarker, NounRecord, RewriteChange, RewriteResult};

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*\})\s*```").expect("valid fenced JSON pattern")
});

/// Analysis payload as sent by the model
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default, rename = "germanTranslation", alias = "translatedText")]
    translated_text: Option<Value>,
    #[serde(default)]
    nouns: Option<Vec<Value>>,
}

/// Rewrite payload as sent by the model
#[derive(Debug, Deserialize)]
struct RawRewrite {
    #[serde(default, rename = "rewrittenText", alias = "rewrittenOriginalLanguageText")]
    rewritten_text: Option<Value>,
    #[serde(default, rename = "rewrittenGerman", alias = "rewrittenTranslatedText")]
    rewritten_translated_text: Option<Value>,
    #[serde(default)]
    changes: Option<Vec<Value>>,
    #[serde(default, rename = "newNouns", alias = "nouns")]
    nouns: Option<Vec<Value>>,
}

/// Locate the JSON object in a completion: the whole text, a fenced block,
/// or the span between the first `{` and the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }

    if let Some(captures) = FENCED_JSON.captures(trimmed) {
        return captures.get(1).map(|m| m.as_str());
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (start < end).then(|| &trimmed[start..=end])
}

fn decode<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T, OracleError> {
    if text.trim().is_empty() {
        return Err(OracleError::EmptyResponse);
    }

    let json = extract_json_object(text)
        .ok_or_else(|| OracleError::MalformedResponse("no JSON object in completion".to_string()))?;

    serde_json::from_str(json).map_err(|e| OracleError::MalformedResponse(e.to_string()))
}

fn string_field<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| entry.get(*key).and_then(Value::as_str))
}

fn text_or_empty(value: Option<Value>) -> String {
    match value {
        Some(Value::String(text)) => text,
        _ => String::new(),
    }
}

/// Turn one raw entry into a noun, or `None` when it is unusable
pub fn validate_noun(entry: &Value) -> Option<NounRecord> {
    let word = string_field(entry, &["germanWord", "word"])?.trim();
    if word.is_empty() {
        return None;
    }
    let gender: GenderMarker = string_field(entry, &["article", "gender", "genderMarker"])?
        .parse()
        .ok()?;
    let translation = string_field(entry, &["translation", "translationBack", "meaning"])?;

    Some(NounRecord::new(word, gender, translation.trim()))
}

/// Keep the valid entries, in order
pub fn sanitize_nouns(entries: &[Value]) -> Vec<NounRecord> {
    let nouns: Vec<NounRecord> = entries.iter().filter_map(validate_noun).collect();
    if nouns.len() < entries.len() {
        debug!("Dropped {} malformed noun entries", entries.len() - nouns.len());
    }
    nouns
}

fn sanitize_changes(entries: &[Value]) -> Vec<RewriteChange> {
    entries.iter()
        .filter_map(|entry| {
            let original = string_field(entry, &["originalWord", "from"])?;
            let rewritten = string_field(entry, &["rewrittenWord", "to"])?;
            Some(RewriteChange::new(original, rewritten))
        })
        .collect()
}

/// Decode an analyze completion
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, OracleError> {
    let raw: RawAnalysis = decode(text)?;
    Ok(AnalysisResult {
        translated_text: text_or_empty(raw.translated_text),
        nouns: sanitize_nouns(&raw.nouns.unwrap_or_default()),
    })
}

/// Decode a rewrite completion, with the same per-entry validation as analysis
pub fn parse_rewrite(text: &str) -> Result<RewriteResult, OracleError> {
    let raw: RawRewrite = decode(text)?;
    Ok(RewriteResult {
        rewritten_text: text_or_empty(raw.rewritten_text),
        rewritten_translated_text: text_or_empty(raw.rewritten_translated_text),
        changes: sanitize_changes(&raw.changes.unwrap_or_default()),
        nouns: sanitize_nouns(&raw.nouns.unwrap_or_default()),
    })
}
