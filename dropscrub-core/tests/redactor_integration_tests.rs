// dropscrub-core/tests/redactor_integration_tests.rs
//! End-to-end coverage of the redaction engine's pass pipeline: the
//! documented token categories, exact path rewrites, JSON handling, and
//! the idempotence guarantee that placeholder tokens never re-match.

use anyhow::Result;
use dropscrub_core::{PatternRedactor, RedactionRule, RuleSet};

fn engine() -> Result<PatternRedactor> {
    Ok(PatternRedactor::new(RuleSet::load_default_rules()?)?)
}

#[test]
fn phone_email_and_ip_are_tokenized() -> Result<()> {
    let out = engine()?.redact("Contact me at 555-123-4567 or a@b.com from 10.0.0.5");

    assert!(out.contains("<phone>"), "missing phone token: {out}");
    assert!(out.contains("<email>"), "missing email token: {out}");
    assert!(out.contains("<ip>"), "missing ip token: {out}");
    assert!(!out.contains("555-123-4567"), "phone leaked: {out}");
    assert!(!out.contains("a@b.com"), "email leaked: {out}");
    assert!(!out.contains("10.0.0.5"), "ip leaked: {out}");
    Ok(())
}

#[test]
fn windows_user_path_is_rewritten_exactly() -> Result<()> {
    let out = engine()?.redact(r"C:\Users\alice\Documents\f.txt");
    assert_eq!(out, r"<d>:\Users\<u>\Documents\f.txt");
    Ok(())
}

#[test]
fn linux_home_path_is_rewritten_exactly() -> Result<()> {
    let out = engine()?.redact("/home/alice/docs/f.txt");
    assert_eq!(out, "/home/<u>/docs/f.txt");
    Ok(())
}

#[test]
fn json_name_values_are_replaced_and_reserialized() -> Result<()> {
    let out = engine()?.redact(r#"[{"name":"Alice","age":30}]"#);
    assert_eq!(out, r#"[{"name":"<name>","age":30}]"#);
    Ok(())
}

#[test]
fn text_without_pii_is_unchanged_modulo_whitespace() -> Result<()> {
    let out = engine()?.redact("nothing sensitive in this note");
    assert_eq!(out, "nothingsensitiveinthisnote");
    Ok(())
}

#[test]
fn redaction_is_idempotent_across_all_categories() -> Result<()> {
    let engine = engine()?;
    let inputs = [
        "Contact me at 555-123-4567 or a@b.com from 10.0.0.5",
        r"C:\Users\alice\Documents\f.txt",
        "/home/alice/docs/f.txt",
        r#"[{"name":"Alice","age":30}]"#,
        "nothing sensitive in this note",
    ];

    for input in inputs {
        let once = engine.redact(input);
        let twice = engine.redact(&once);
        assert_eq!(once, twice, "not a fixed point for input: {input}");
    }
    Ok(())
}

#[test]
fn user_rules_extend_the_default_passes() -> Result<()> {
    let defaults = RuleSet::load_default_rules()?;
    let user = RuleSet {
        rules: vec![RedactionRule {
            name: "badge".to_string(),
            pattern: Some(r"BADGE-\d{4}".to_string()),
            replace_with: "<badge>".to_string(),
            ..Default::default()
        }],
    };

    let engine = PatternRedactor::new(dropscrub_core::merge_rules(defaults, Some(user)))?;
    let out = engine.redact("holder of BADGE-9913 called 555-123-4567");
    assert!(out.contains("<badge>"), "custom rule did not fire: {out}");
    assert!(out.contains("<phone>"), "default rule lost: {out}");
    Ok(())
}
