//! Redaction rule definitions for `dropscrub-core`.
//!
//! The token-substitution passes of the redaction engine (phone, email,
//! IPv4) are data, not code: they live in a YAML rule file that is embedded
//! into the binary and may be overlaid with user-supplied rules. Rule order
//! in the file is the order of application, which is a correctness
//! requirement because later passes operate on already-rewritten text.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// A single token-substitution rule applied by the redaction engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct RedactionRule {
    /// Unique identifier for the rule (e.g. "phone").
    pub name: String,
    /// Human-readable description of what the rule targets.
    pub description: Option<String>,
    /// The regex pattern string, matched against whitespace-stripped text.
    pub pattern: Option<String>,
    /// The placeholder token substituted for every match.
    pub replace_with: String,
    /// Explicit override for enabling/disabling the rule.
    pub enabled: Option<bool>,
}

impl Default for RedactionRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            pattern: None,
            replace_with: "<redacted>".to_string(),
            enabled: None,
        }
    }
}

/// The ordered set of token-substitution rules.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleSet {
    pub rules: Vec<RedactionRule>,
}

impl RuleSet {
    /// Loads rules from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading custom rules from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        let rules: RuleSet = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse rules file {}", path.display()))?;

        validate_rules(&rules.rules)?;
        info!("Loaded {} rules from file {}.", rules.rules.len(), path.display());

        Ok(rules)
    }

    /// Loads the built-in phone/email/IPv4 rules from the embedded configuration.
    pub fn load_default_rules() -> Result<Self> {
        debug!("Loading default rules from embedded string...");
        let default_yaml = include_str!("../config/default_rules.yaml");
        let rules: RuleSet =
            serde_yml::from_str(default_yaml).context("Failed to parse default rules")?;

        debug!("Loaded {} default rules.", rules.rules.len());
        Ok(rules)
    }
}

/// Merges user-defined rules over the defaults.
///
/// A user rule with the same name replaces the default in place, so the
/// application order of the default passes is preserved; genuinely new
/// rules are appended and run after the built-in passes.
pub fn merge_rules(default_rules: RuleSet, user_rules: Option<RuleSet>) -> RuleSet {
    let mut merged = default_rules.rules;

    if let Some(user) = user_rules {
        debug!("User rules provided. Merging {} rules.", user.rules.len());
        for user_rule in user.rules {
            match merged.iter_mut().find(|r| r.name == user_rule.name) {
                Some(existing) => *existing = user_rule,
                None => merged.push(user_rule),
            }
        }
    }

    debug!("Final total rules after merge: {}", merged.len());
    RuleSet { rules: merged }
}

/// Validates rule integrity (names, pattern presence, regex compilation).
fn validate_rules(rules: &[RedactionRule]) -> Result<()> {
    let mut rule_names = HashSet::new();
    let mut errors = Vec::new();

    for rule in rules {
        if rule.name.is_empty() {
            errors.push("A rule has an empty `name` field.".to_string());
        } else if !rule_names.insert(rule.name.clone()) {
            errors.push(format!("Duplicate rule name found: '{}'.", rule.name));
        }

        let pattern = match &rule.pattern {
            Some(p) => p,
            None => {
                warn!("Rule '{}' has no pattern and will never match.", rule.name);
                continue;
            }
        };

        if pattern.is_empty() {
            errors.push(format!("Rule '{}' has an empty `pattern` field.", rule.name));
        } else if let Err(e) = Regex::new(pattern) {
            errors.push(format!(
                "Rule '{}' has an invalid regex pattern: {}",
                rule.name, e
            ));
        }
    }

    if !errors.is_empty() {
        Err(anyhow!(format!(
            "Rule validation failed:\n{}",
            errors.join("\n")
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, pattern: &str, token: &str) -> RedactionRule {
        RedactionRule {
            name: name.to_string(),
            pattern: Some(pattern.to_string()),
            replace_with: token.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn default_rules_load_in_documented_order() {
        let rules = RuleSet::load_default_rules().unwrap();
        let names: Vec<&str> = rules.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["phone", "email", "ipv4"]);
    }

    #[test]
    fn merge_replaces_in_place_and_appends_new() {
        let defaults = RuleSet {
            rules: vec![rule("phone", r"\d+", "<phone>"), rule("email", "@", "<email>")],
        };
        let user = RuleSet {
            rules: vec![rule("phone", r"\d{3}", "<phone>"), rule("ssn", r"\d{9}", "<ssn>")],
        };

        let merged = merge_rules(defaults, Some(user));
        let names: Vec<&str> = merged.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["phone", "email", "ssn"]);
        assert_eq!(merged.rules[0].pattern.as_deref(), Some(r"\d{3}"));
    }

    #[test]
    fn validation_rejects_duplicates_and_bad_patterns() {
        let rules = vec![
            rule("phone", r"\d+", "<phone>"),
            rule("phone", r"(", "<phone>"),
        ];
        let err = validate_rules(&rules).unwrap_err().to_string();
        assert!(err.contains("Duplicate rule name"));
        assert!(err.contains("invalid regex"));
    }
}
