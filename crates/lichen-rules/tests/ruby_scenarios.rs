//! End-to-end scenarios over real Ruby source, parsed with the
//! tree-sitter adapter.

use lichen_languages::TreeSitterParser;
use lichen_rules::{
    DEFAULT_MAX_PASSES, Rule, RuleRegistry, SourceText, builtin_registry, run_pass,
    run_to_fixpoint,
};

fn rename_rule(id: &str, from: &'static str, to: &str) -> Rule {
    Rule::new(id, format!("Prefer `{to}` over `{from}`"))
        .pattern(&format!(r#"(identifier "{from}")"#))
        .expect("should compile")
        .fix(to)
}

#[test]
fn test_flag_without_fix_when_option_missing() {
    // `accepts_nested_attributes_for` without an `update_only` option gets
    // flagged at the method name; no safe rewrite exists without knowing
    // the value, so no edit is proposed.
    let rule = Rule::new(
        "nested-attributes-update-only",
        "Specify an `update_only` option",
    )
    .pattern(r#"(identifier "accepts_nested_attributes_for")"#)
    .expect("should compile")
    .check(|ctx, report| {
        let call = ctx.ancestors.parent();
        let has_option = call.is_some_and(|call| {
            call.descendants().any(|n| {
                n.value()
                    .is_some_and(|v| v.trim_matches(':') == "update_only")
            })
        });
        if !has_option {
            report.flag(ctx.node.span());
        }
    });

    let mut registry = RuleRegistry::new();
    registry.register(rule).expect("should register");

    let parser = TreeSitterParser::ruby();
    let sources = builtin_registry();

    let flagged = SourceText::new("accepts_nested_attributes_for :avatar");
    let result = run_pass(&flagged, &registry, &parser, &sources).expect("should run");
    assert_eq!(result.findings.len(), 1);
    assert_eq!(
        flagged.slice(result.findings[0].span).expect("valid span"),
        "accepts_nested_attributes_for"
    );
    assert_eq!(result.edits_applied, 0);
    assert_eq!(result.text.as_str(), flagged.as_str());

    let fine = SourceText::new("accepts_nested_attributes_for :avatar, update_only: true");
    let result = run_pass(&fine, &registry, &parser, &sources).expect("should run");
    assert!(result.findings.is_empty());
}

#[test]
fn test_rename_rewrites_and_settles() {
    let mut registry = RuleRegistry::new();
    registry
        .register(rename_rule(
            "update-attributes",
            "update_attributes",
            "update",
        ))
        .expect("should register");

    let parser = TreeSitterParser::ruby();
    let sources = builtin_registry();
    let source = SourceText::new(r#"book.update_attributes(author: "Alice")"#);

    // First pass: one finding anchored at the method name, one edit.
    let pass = run_pass(&source, &registry, &parser, &sources).expect("should run");
    assert_eq!(pass.findings.len(), 1);
    assert_eq!(
        source.slice(pass.findings[0].span).expect("valid span"),
        "update_attributes"
    );
    assert_eq!(pass.edits_applied, 1);
    assert_eq!(pass.text.as_str(), r#"book.update(author: "Alice")"#);

    // The fixpoint loop reaches the same text and a clean final pass.
    let result = run_to_fixpoint(&source, &registry, &parser, &sources, DEFAULT_MAX_PASSES)
        .expect("should settle");
    assert_eq!(result.text.as_str(), r#"book.update(author: "Alice")"#);
    assert_eq!(result.passes, 2);
    assert!(result.findings.is_empty());
}

#[test]
fn test_independent_edits_on_one_call_both_apply() {
    // Two rules rewrite different parts of the same call; the spans do not
    // overlap, so a single pass takes both.
    let mut registry = RuleRegistry::new();
    registry
        .register(rename_rule(
            "update-attributes",
            "update_attributes",
            "update",
        ))
        .expect("should register");
    registry
        .register(rename_rule("author-to-writer", "author", "writer"))
        .expect("should register");

    let parser = TreeSitterParser::ruby();
    let sources = builtin_registry();
    let source = SourceText::new("book.update_attributes(author)");

    let pass = run_pass(&source, &registry, &parser, &sources).expect("should run");
    assert_eq!(pass.edits_applied, 2);
    assert_eq!(pass.text.as_str(), "book.update(writer)");

    let result = run_to_fixpoint(&source, &registry, &parser, &sources, DEFAULT_MAX_PASSES)
        .expect("should settle");
    assert_eq!(result.text.as_str(), "book.update(writer)");
    assert_eq!(result.passes, 2);
}

#[test]
fn test_conflicting_rewrites_resolve_by_registration_order() {
    // Both rules target the exact same identifier with different
    // replacements; the earlier-registered rule wins the pass and the
    // loser's edit is deferred, then made moot by the rewrite.
    let mut registry = RuleRegistry::new();
    registry
        .register(rename_rule("winner", "update_attributes", "update"))
        .expect("should register");
    registry
        .register(rename_rule("loser", "update_attributes", "update!"))
        .expect("should register");

    let parser = TreeSitterParser::ruby();
    let sources = builtin_registry();
    let source = SourceText::new("book.update_attributes(name)");

    let pass = run_pass(&source, &registry, &parser, &sources).expect("should run");
    assert_eq!(pass.edits_applied, 1);
    assert_eq!(pass.edits_deferred, 1);
    assert_eq!(pass.text.as_str(), "book.update(name)");
    // Both rules still surface their findings for this pass.
    assert_eq!(pass.findings.len(), 2);

    let result = run_to_fixpoint(&source, &registry, &parser, &sources, DEFAULT_MAX_PASSES)
        .expect("should settle");
    assert_eq!(result.text.as_str(), "book.update(name)");
    assert!(result.findings.is_empty());
}

#[test]
fn test_fixpoint_output_is_a_fixpoint() {
    let mut registry = RuleRegistry::new();
    registry
        .register(rename_rule(
            "update-attributes",
            "update_attributes",
            "update",
        ))
        .expect("should register");

    let parser = TreeSitterParser::ruby();
    let sources = builtin_registry();
    let source = SourceText::new("a.update_attributes(x)\nb.update_attributes(y)\n");

    let first = run_to_fixpoint(&source, &registry, &parser, &sources, DEFAULT_MAX_PASSES)
        .expect("should settle");
    let second = run_to_fixpoint(&first.text, &registry, &parser, &sources, DEFAULT_MAX_PASSES)
        .expect("should settle");
    assert_eq!(second.passes, 1);
    assert_eq!(second.text.as_str(), first.text.as_str());
    assert_eq!(second.findings, first.findings);
}

#[test]
fn test_runs_are_deterministic() {
    let mut registry = RuleRegistry::new();
    registry
        .register(rename_rule(
            "update-attributes",
            "update_attributes",
            "update",
        ))
        .expect("should register");
    registry
        .register(
            Rule::new("flag-saves", "bare save")
                .pattern(r#"(identifier "save")"#)
                .expect("should compile"),
        )
        .expect("should register");

    let parser = TreeSitterParser::ruby();
    let sources = builtin_registry();
    let source = SourceText::new("a.update_attributes(x)\nb.save\nc.save\n");

    let one = run_to_fixpoint(&source, &registry, &parser, &sources, DEFAULT_MAX_PASSES)
        .expect("should settle");
    let two = run_to_fixpoint(&source, &registry, &parser, &sources, DEFAULT_MAX_PASSES)
        .expect("should settle");
    assert_eq!(one.text.as_str(), two.text.as_str());
    assert_eq!(one.findings, two.findings);
    assert_eq!(one.passes, two.passes);
}

#[test]
fn test_allow_comment_suppresses_in_ruby() {
    let mut registry = RuleRegistry::new();
    registry
        .register(rename_rule(
            "update-attributes",
            "update_attributes",
            "update",
        ))
        .expect("should register");

    let parser = TreeSitterParser::ruby();
    let sources = builtin_registry();
    let source = SourceText::new(
        "book.update_attributes(x) # lichen-allow: update-attributes\nbook.update_attributes(y)\n",
    );

    let result = run_to_fixpoint(&source, &registry, &parser, &sources, DEFAULT_MAX_PASSES)
        .expect("should settle");
    // Only the unsuppressed line is rewritten.
    assert_eq!(
        result.text.as_str(),
        "book.update_attributes(x) # lichen-allow: update-attributes\nbook.update(y)\n"
    );
}
