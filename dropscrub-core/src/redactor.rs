//! The PII redaction engine.
//!
//! `PatternRedactor` is a pure text transform: given raw text it returns
//! text with PII substrings replaced by fixed placeholder tokens. It does
//! no I/O and holds no mutable state, so one instance can be shared by
//! every pipeline worker.
//!
//! Pass order is a correctness requirement, not an implementation detail:
//! whitespace stripping first, then the regex token rules in rule-file
//! order (phone, email, IPv4), then the two user-path rewrites, then the
//! JSON name pass. Each pass operates on the output of the previous one.
//!
//! License: MIT OR Apache-2.0

use std::sync::Arc;

use log::debug;
use serde_json::Value;

use crate::compiler::{get_or_compile_rules, CompiledRules};
use crate::errors::ScrubError;
use crate::paths;
use crate::rules::RuleSet;

/// Placeholder substituted for JSON `"name"` values.
pub const NAME_TOKEN: &str = "<name>";

#[derive(Debug)]
pub struct PatternRedactor {
    compiled: Arc<CompiledRules>,
}

impl PatternRedactor {
    /// Builds a redactor from the given rule set, compiling (or reusing)
    /// its regex rules.
    pub fn new(rules: RuleSet) -> Result<Self, ScrubError> {
        let compiled = get_or_compile_rules(&rules)?;
        Ok(Self { compiled })
    }

    /// Builds a redactor over the embedded default rules.
    pub fn with_default_rules() -> Result<Self, ScrubError> {
        let rules = RuleSet::load_default_rules()
            .map_err(|e| ScrubError::Fatal(format!("default rules failed to load: {e}")))?;
        Self::new(rules)
    }

    /// Applies every redaction pass and returns the transformed text.
    ///
    /// Matching is performed against the whitespace-stripped form of the
    /// input; the stripped text is what is returned. Absence of matches is
    /// the normal case at every step, never an error.
    pub fn redact(&self, content: &str) -> String {
        let mut text: String = content.chars().filter(|c| !c.is_whitespace()).collect();

        for rule in &self.compiled.rules {
            let hits = rule.regex.find_iter(&text).count();
            if hits == 0 {
                continue;
            }
            debug!("Replaced {} span(s) with {}", hits, rule.replace_with);
            text = rule
                .regex
                .replace_all(&text, rule.replace_with.as_str())
                .into_owned();
        }

        let text = paths::scrub_windows_user_paths(&text);
        let text = paths::scrub_linux_home_paths(&text);

        scrub_json_names(&text)
    }
}

/// Attempts to parse the entire text as a JSON array of objects and
/// overwrite every `"name"` value with the placeholder token.
///
/// Text that is not valid JSON is an expected branch for non-JSON
/// payloads, so it is passed through unchanged and never logged as an
/// error.
fn scrub_json_names(text: &str) -> String {
    let parsed: Value = match serde_json::from_str(text) {
        Ok(value) => {
            debug!("Payload parsed as JSON");
            value
        }
        Err(_) => {
            debug!("Payload is not JSON; name pass skipped");
            return text.to_string();
        }
    };

    let Value::Array(mut items) = parsed else {
        return text.to_string();
    };

    let mut hits = 0usize;
    for item in &mut items {
        if let Value::Object(fields) = item {
            if let Some(value) = fields.get_mut("name") {
                *value = Value::String(NAME_TOKEN.to_string());
                hits += 1;
            }
        }
    }
    if hits > 0 {
        debug!("Replaced {} JSON name value(s)", hits);
    }

    serde_json::to_string(&Value::Array(items)).unwrap_or_else(|_| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redactor() -> PatternRedactor {
        PatternRedactor::with_default_rules().unwrap()
    }

    #[test]
    fn whitespace_is_stripped_before_matching() {
        assert_eq!(redactor().redact("plain words only"), "plainwordsonly");
    }

    #[test]
    fn spaced_phone_numbers_match_in_stripped_form() {
        // "555 123 4567" collapses to a bare ten-digit run.
        let out = redactor().redact("call 555 123 4567 now");
        assert_eq!(out, "call<phone>now");
    }

    #[test]
    fn json_name_pass_reserializes_compactly() {
        let out = redactor().redact(r#"[{"name": "Alice", "age": 30}]"#);
        assert_eq!(out, r#"[{"name":"<name>","age":30}]"#);
    }

    #[test]
    fn json_objects_without_name_are_preserved() {
        let out = redactor().redact(r#"[{"age":30}]"#);
        assert_eq!(out, r#"[{"age":30}]"#);
    }

    #[test]
    fn top_level_json_object_is_left_alone() {
        let out = redactor().redact(r#"{"name":"Alice"}"#);
        assert_eq!(out, r#"{"name":"Alice"}"#);
    }
}
