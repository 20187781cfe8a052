//! compiler.rs - Manages the compilation and caching of redaction rules.
//!
//! This module provides a thread-safe, cached mechanism to convert a
//! `RuleSet` into `CompiledRules`, which are optimized for efficient
//! redaction. It uses a global, shared cache to avoid redundant
//! compilation when multiple pipeline components share one rule set.
//!
//! License: MIT OR Apache-2.0

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::RegexBuilder;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use crate::errors::ScrubError;
use crate::rules::{RedactionRule, RuleSet, MAX_PATTERN_LENGTH};

/// A single compiled token-substitution rule.
#[derive(Debug)]
pub struct CompiledRule {
    /// The compiled regular expression used for matching.
    pub regex: regex::Regex,
    /// The placeholder token substituted for every match.
    pub replace_with: String,
    /// The unique name of the rule.
    pub name: String,
}

/// The ordered collection of compiled rules for one redaction engine.
#[derive(Debug)]
pub struct CompiledRules {
    pub rules: Vec<CompiledRule>,
}

/// A thread-safe, global cache for compiled rules, keyed by a hash of the
/// rule set. Application order matters, so the rules are hashed in order.
static COMPILED_RULES_CACHE: Lazy<RwLock<HashMap<u64, Arc<CompiledRules>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn hash_rules(rules: &RuleSet) -> u64 {
    let mut hasher = DefaultHasher::new();
    rules.rules.hash(&mut hasher);
    hasher.finish()
}

/// Compiles a list of `RedactionRule`s into `CompiledRules`, preserving
/// their order. This is the low-level function that performs the actual
/// regex compilation.
pub fn compile_rules(rules_to_compile: Vec<RedactionRule>) -> Result<CompiledRules, ScrubError> {
    debug!("Starting compilation of {} rules.", rules_to_compile.len());

    let mut compiled_rules = Vec::new();

    for rule in rules_to_compile {
        if let Some(false) = rule.enabled {
            debug!("Skipping disabled rule '{}'.", rule.name);
            continue;
        }

        let pattern = match rule.pattern.as_ref() {
            Some(pattern) => pattern,
            None => {
                warn!("Skipping rule '{}' because its pattern is missing.", rule.name);
                continue;
            }
        };

        if pattern.len() > MAX_PATTERN_LENGTH {
            return Err(ScrubError::PatternLengthExceeded(
                rule.name,
                pattern.len(),
                MAX_PATTERN_LENGTH,
            ));
        }

        let regex = RegexBuilder::new(pattern)
            .size_limit(10 * (1 << 20))
            .build()
            .map_err(|e| ScrubError::RuleCompilation(rule.name.clone(), e))?;

        debug!("Rule '{}' compiled successfully.", rule.name);
        compiled_rules.push(CompiledRule {
            regex,
            replace_with: rule.replace_with,
            name: rule.name,
        });
    }

    debug!("Finished compiling rules. Total compiled: {}.", compiled_rules.len());
    Ok(CompiledRules { rules: compiled_rules })
}

/// Gets a `CompiledRules` instance from the cache or compiles it if absent.
///
/// Returns an `Arc` so compiled rule sets are cheap to share across the
/// pipeline workers.
pub fn get_or_compile_rules(rules: &RuleSet) -> Result<Arc<CompiledRules>, ScrubError> {
    let cache_key = hash_rules(rules);

    {
        let cache = COMPILED_RULES_CACHE.read().unwrap_or_else(|e| e.into_inner());
        if let Some(compiled) = cache.get(&cache_key) {
            debug!("Serving compiled rules from cache for key: {}", &cache_key);
            return Ok(Arc::clone(compiled));
        }
    }

    debug!("Compiled rules not found in cache. Compiling now.");
    let compiled = Arc::new(compile_rules(rules.rules.clone())?);

    COMPILED_RULES_CACHE
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .insert(cache_key, Arc::clone(&compiled));

    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_default_rules_in_order() {
        let rules = RuleSet::load_default_rules().unwrap();
        let compiled = compile_rules(rules.rules).unwrap();
        let names: Vec<&str> = compiled.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["phone", "email", "ipv4"]);
    }

    #[test]
    fn disabled_rules_are_dropped() {
        let mut rules = RuleSet::load_default_rules().unwrap();
        rules.rules[0].enabled = Some(false);
        let compiled = compile_rules(rules.rules).unwrap();
        assert!(compiled.rules.iter().all(|r| r.name != "phone"));
    }

    #[test]
    fn oversized_patterns_are_rejected() {
        let rule = RedactionRule {
            name: "huge".to_string(),
            pattern: Some("a".repeat(MAX_PATTERN_LENGTH + 1)),
            replace_with: "<huge>".to_string(),
            ..Default::default()
        };
        let err = compile_rules(vec![rule]).unwrap_err();
        assert!(matches!(err, ScrubError::PatternLengthExceeded(_, _, _)));
    }

    #[test]
    fn cache_returns_shared_instances() {
        let rules = RuleSet::load_default_rules().unwrap();
        let first = get_or_compile_rules(&rules).unwrap();
        let second = get_or_compile_rules(&rules).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
