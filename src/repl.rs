/*!
 * Line commands of the interactive session.
 *
 * A plain line replaces the input text; lines starting with `:` are commands.
 */

use crate::scoring::snap_target;

/// One parsed line of interactive input
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Replace the input text
    SetInput(String),
    Analyze,
    /// Rewrite toward the given (already snapped) target, or the default one
    Rewrite(Option<f64>),
    Show,
    Help,
    Quit,
    /// A line the session cannot act on, with the message to print
    Invalid(String),
}

pub const HELP: &str = "\
Type any text to make it the input, then:
  :analyze          translate and score the input
  :rewrite [pH]     rewrite toward a pH between 1 and 14
  :show             print the current results
  :help             show this help
  :quit             leave the session";

impl ReplCommand {
    /// Parse one line; blank lines yield `None`
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }

        let Some(command) = line.trim_start().strip_prefix(':') else {
            return Some(Self::SetInput(line.to_string()));
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or("").to_lowercase();
        let argument = parts.next();

        let parsed = match name.as_str() {
            "analyze" | "a" => Self::Analyze,
            "rewrite" | "r" => match argument {
                None => Self::Rewrite(None),
                Some(raw) => match raw.parse::<f64>() {
                    Ok(value) if value.is_finite() => Self::Rewrite(Some(snap_target(value))),
                    _ => Self::Invalid(format!("Not a pH value: {}", raw)),
                },
            },
            "show" | "s" => Self::Show,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => Self::Invalid(format!("Unknown command :{} (try :help)", other)),
        };
        Some(parsed)
    }
}
