//! Prompt construction and model-output parsing for brain dump analysis.
//!
//! # Invariants
//! - The prompt template is fixed; only the original text varies.
//! - Parsing is strict: the content must be one JSON object carrying all four
//!   analysis keys with the expected types.

use crate::model::brain_dump::Analysis;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PROMPT_HEADER: &str = "
Analyze this brain dump and help the person find clarity. Extract:

1. A brief, empathetic summary (2-3 sentences)
2. What matters most (3-5 key points that are important/actionable)
3. What doesn't matter right now (2-4 things that are distractions or less urgent)
4. One clear, specific actionable focus for today

Be compassionate and practical. Help them feel heard while providing clarity.

Brain dump:
";

const PROMPT_FOOTER: &str = r#"

Respond in this exact JSON format:
{
  "summary": "Brief empathetic summary here",
  "whatMatters": ["Important point 1", "Important point 2", "Important point 3"],
  "whatDoesnt": ["Distraction 1", "Less urgent item 2"],
  "actionableFocus": "One specific action they can take today"
}"#;

/// Model output could not be turned into an `Analysis`.
#[derive(Debug)]
pub struct AnalysisParseError(serde_json::Error);

impl Display for AnalysisParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "model output is not a valid analysis: {}", self.0)
    }
}

impl Error for AnalysisParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

/// Builds the analysis prompt for one brain dump.
pub fn build_analysis_prompt(original_text: &str) -> String {
    let mut prompt =
        String::with_capacity(PROMPT_HEADER.len() + original_text.len() + PROMPT_FOOTER.len() + 2);
    prompt.push_str(PROMPT_HEADER);
    prompt.push('"');
    prompt.push_str(original_text);
    prompt.push('"');
    prompt.push_str(PROMPT_FOOTER);
    prompt
}

/// Parses model message content into an `Analysis`.
///
/// Unknown keys are ignored; missing keys, `null` values and wrong types fail.
pub fn parse_analysis(content: &str) -> Result<Analysis, AnalysisParseError> {
    serde_json::from_str(content).map_err(AnalysisParseError)
}

#[cfg(test)]
mod tests {
    use super::{build_analysis_prompt, parse_analysis};

    #[test]
    fn prompt_embeds_text_between_quotes() {
        let prompt = build_analysis_prompt("too much to do");
        assert!(prompt.contains("Brain dump:\n\"too much to do\"\n"));
        assert!(prompt.contains("3-5 key points"));
        assert!(prompt.contains("2-4 things"));
        assert!(prompt.contains("\"actionableFocus\""));
        assert!(prompt.ends_with('}'));
    }

    #[test]
    fn parses_complete_object_verbatim() {
        let analysis = parse_analysis(
            r#"{"summary":"...","whatMatters":["a","b"],"whatDoesnt":["c"],"actionableFocus":"d"}"#,
        )
        .expect("valid analysis");
        assert_eq!(analysis.summary, "...");
        assert_eq!(analysis.what_matters, vec!["a", "b"]);
        assert_eq!(analysis.what_doesnt, vec!["c"]);
        assert_eq!(analysis.actionable_focus, "d");
    }

    #[test]
    fn ignores_unknown_keys() {
        let analysis = parse_analysis(
            r#"{"summary":"s","whatMatters":[],"whatDoesnt":[],"actionableFocus":"f","mood":"calm"}"#,
        )
        .expect("extra keys are tolerated");
        assert_eq!(analysis.actionable_focus, "f");
    }

    #[test]
    fn rejects_missing_keys_wrong_types_and_prose() {
        assert!(parse_analysis(r#"{"summary":"s","whatMatters":[],"whatDoesnt":[]}"#).is_err());
        assert!(parse_analysis(
            r#"{"summary":"s","whatMatters":"a","whatDoesnt":[],"actionableFocus":"f"}"#
        )
        .is_err());
        assert!(parse_analysis(
            r#"{"summary":null,"whatMatters":[],"whatDoesnt":[],"actionableFocus":"f"}"#
        )
        .is_err());
        assert!(parse_analysis("Sure! Here is your analysis.").is_err());
    }
}
