/*!
 * Terminal rendering of a session snapshot.
 *
 * Everything here is a pure function of its inputs and returns a `String`, so
 * the CLI decides where output goes and tests can compare text directly.
 */

use regex::Regex;

use crate::nouns::{CategorizedNouns, GenderMarker, NounRecord, RewriteChange};
use crate::scoring::{self, ScoreBand, Tilt};
use crate::session::{OperationKind, OperationOutcome, OperationStatus, SessionState};

const RESET: &str = "\x1B[0m";
const BOLD: &str = "\x1B[1m";
const DIM: &str = "\x1B[2m";
const HIGHLIGHT: &str = "\x1B[1;30;43m";
const ERROR: &str = "\x1B[1;31m";

/// Width of the gauge bar in cells
pub const GAUGE_WIDTH: usize = 40;

/// A run of rewritten text, highlighted when it is one of the changed words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self { text: text.to_string(), highlighted: false }
    }

    fn marked(text: &str) -> Self {
        Self { text: text.to_string(), highlighted: true }
    }
}

/// Split `text` around every occurrence of a rewritten word.
///
/// Empty rewritten words are ignored. Longer words win when several match at
/// the same position. Without usable changes the whole text is one plain segment.
pub fn highlight_changes(text: &str, changes: &[RewriteChange]) -> Vec<Segment> {
    let mut words: Vec<&str> = changes.iter()
        .map(|c| c.rewritten_word.as_str())
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return vec![Segment::plain(text)];
    }

    words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    words.dedup();

    let pattern = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
    let Ok(re) = Regex::new(&pattern) else {
        return vec![Segment::plain(text)];
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::plain(&text[last..m.start()]));
        }
        segments.push(Segment::marked(m.as_str()));
        last = m.end();
    }
    if last < text.len() || segments.is_empty() {
        segments.push(Segment::plain(&text[last..]));
    }
    segments
}

/// `「father」→「mother」、 「car」→「bike」`
pub fn format_changes(changes: &[RewriteChange]) -> String {
    changes.iter()
        .map(|c| format!("「{}」→「{}」", c.original_word, c.rewritten_word))
        .collect::<Vec<_>>()
        .join("、 ")
}

/// User-facing message for an operation that did not succeed; `None` on success
pub fn outcome_message(kind: OperationKind, outcome: OperationOutcome, state: &SessionState) -> Option<String> {
    match outcome {
        OperationOutcome::Succeeded => None,
        OperationOutcome::Skipped => Some(format!("Nothing to {}: analyze a text first", kind)),
        OperationOutcome::Busy => Some(format!("Another {} is already running", kind)),
        OperationOutcome::Discarded => Some(format!("The {} result was superseded by a newer analysis", kind)),
        OperationOutcome::Failed | OperationOutcome::Rejected => Some(
            state.error(kind)
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("{} failed", kind)),
        ),
    }
}

/// Renders session snapshots, with or without ANSI colours
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.color {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }

    /// Score line plus a bar with a marker at the score's position
    pub fn gauge(&self, score: Option<f64>) -> String {
        let label = scoring::format_score(score);

        let Some(value) = score else {
            let bar = format!("[{}]", "-".repeat(GAUGE_WIDTH));
            return format!("{}\n{}", self.paint(&label, BOLD), self.paint(&bar, DIM));
        };

        let band = ScoreBand::of(value);
        let marker = (scoring::gauge_position(value) * (GAUGE_WIDTH - 1) as f64).round() as usize;
        let bar: String = (0..GAUGE_WIDTH)
            .map(|i| if i == marker { '▼' } else { '=' })
            .collect();

        format!(
            "{}  {}\n1 [{}] 14",
            self.paint(&label, band.ansi_color()),
            Tilt::of(value).description(),
            self.paint(&bar, band.ansi_color()),
        )
    }

    fn noun_line(noun: &NounRecord) -> String {
        if noun.translation.is_empty() {
            format!("  {}", noun.with_article())
        } else {
            format!("  {} ({})", noun.with_article(), noun.translation)
        }
    }

    /// One block per gender, in Masculine, Feminine, Neuter order
    pub fn noun_groups(&self, groups: &CategorizedNouns) -> String {
        let mut out = Vec::new();
        for gender in GenderMarker::ALL {
            let nouns = groups.group(gender);
            let heading = format!("{} ({}): {}", gender.name(), gender.article(), nouns.len());
            out.push(self.paint(&heading, BOLD));
            if nouns.is_empty() {
                out.push(self.paint("  none", DIM));
            }
            out.extend(nouns.iter().map(Self::noun_line));
        }
        out.join("\n")
    }

    fn status_line(&self, state: &SessionState, kind: OperationKind) -> Option<String> {
        if state.status(kind) == OperationStatus::Running {
            return Some(self.paint(&format!("{}...", kind), DIM));
        }
        state.error(kind)
            .map(|e| self.paint(&format!("{} error: {}", kind, e), ERROR))
    }

    /// Translation, original score and the nouns on display
    pub fn analysis_panel(&self, state: &SessionState) -> String {
        let mut out = Vec::new();
        if let Some(line) = self.status_line(state, OperationKind::Analyze) {
            out.push(line);
        }

        let Some(analysis) = &state.analysis else {
            if out.is_empty() {
                out.push(self.paint("No analysis yet.", DIM));
            }
            return out.join("\n");
        };

        out.push(self.paint("German", BOLD));
        out.push(analysis.translated_text.clone());
        out.push(String::new());
        out.push(self.gauge(state.displayed_score()));
        out.push(String::new());
        if state.is_rewritten() {
            out.push(self.paint("Nouns after rewrite", DIM));
        }
        out.push(self.noun_groups(&state.categorized_nouns()));
        out.join("\n")
    }

    /// Rewritten text with changed words highlighted, plus the change list
    pub fn rewrite_panel(&self, state: &SessionState) -> String {
        let mut out = Vec::new();
        if let Some(line) = self.status_line(state, OperationKind::Rewrite) {
            out.push(line);
        }

        let Some(rewrite) = &state.rewrite else {
            return out.join("\n");
        };

        if let Some(target) = state.last_target_score {
            out.push(self.paint(&format!("Rewrite toward pH {:.1}", target), BOLD));
        }

        let highlighted: String = highlight_changes(&rewrite.rewritten_text, &rewrite.changes)
            .iter()
            .map(|s| if s.highlighted { self.paint(&s.text, HIGHLIGHT) } else { s.text.clone() })
            .collect();
        out.push(highlighted);
        out.push(rewrite.rewritten_translated_text.clone());
        out.push(String::new());
        out.push(self.gauge(state.rewrite_score()));

        if !rewrite.changes.is_empty() {
            out.push(String::new());
            out.push(format!("Changes: {}", format_changes(&rewrite.changes)));
        }
        out.join("\n")
    }

    /// Both panels; the rewrite panel only when there is something in it
    pub fn session(&self, state: &SessionState) -> String {
        let analysis = self.analysis_panel(state);
        let rewrite = self.rewrite_panel(state);
        if rewrite.is_empty() {
            analysis
        } else {
            format!("{}\n\n{}", analysis, rewrite)
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(true)
    }
}
