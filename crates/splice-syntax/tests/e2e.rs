//! End-to-end tests for splice-syntax through its public API.
//!
//! Rewritten sources are checked with inline insta snapshots.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clarity and assertions"
)]

use insta::assert_snapshot;
use rstest::{fixture, rstest};

use splice_core::{CodeEdit, EngineConfig, QuerySpec, SubItemSpec};
use splice_syntax::{
    Codemod, ParseResult, Parser, Query, SupportedLanguage, SyntaxError,
};

#[fixture]
fn tsx() -> Parser {
    Parser::new(SupportedLanguage::TypeScript).unwrap_or_else(|err| panic!("parser: {err}"))
}

fn parse(parser: &mut Parser, source: &str) -> ParseResult {
    parser
        .parse(source)
        .unwrap_or_else(|err| panic!("parse: {err}"))
}

fn console_log_query() -> Query {
    let spec = QuerySpec::new("expression_statement")
        .with_capture("statement")
        .with_item(
            SubItemSpec::kind("call_expression").with_item(
                SubItemSpec::field("function")
                    .with_capture("callee")
                    .with_text("console.log"),
            ),
        );
    Query::compile(&spec).unwrap_or_else(|err| panic!("query: {err}"))
}

// =============================================================================
// Happy Path: Codemods
// =============================================================================

#[rstest]
fn codemod_renames_console_log_callee() {
    let result = Codemod::default()
        .run("let x = 1;\nconsole.log(x);", &console_log_query(), |captures| {
            captures
                .byte_range("callee")
                .map(|range| CodeEdit::replace(range, "logger.info"))
        })
        .unwrap_or_else(|err| panic!("codemod: {err}"));

    assert_eq!(result.edits_applied(), 1);
    assert_snapshot!(result.output(), @r"
    let x = 1;
    logger.info(x);
    ");
}

#[rstest]
fn codemod_rewrites_every_statement_in_one_pass() {
    let source = "console.log(1);\nwarn(2);\nconsole.log(3);\nconsole.log(4);\n";
    let result = Codemod::default()
        .run(source, &console_log_query(), |captures| {
            let statement = captures.text("statement")?;
            let range = captures.byte_range("statement")?;
            Some(CodeEdit::replace(range, format!("/* {statement} */")))
        })
        .unwrap_or_else(|err| panic!("codemod: {err}"));

    assert_eq!(result.edits_applied(), 3);
    assert_snapshot!(result.output(), @r"
    /* console.log(1); */
    warn(2);
    /* console.log(3); */
    /* console.log(4); */
    ");
}

#[rstest]
fn codemod_deletes_matched_statements() {
    let source = "a();\nconsole.log(a);\nb();";
    let result = Codemod::default()
        .run(source, &console_log_query(), |captures| {
            captures.byte_range("statement").map(CodeEdit::delete)
        })
        .unwrap_or_else(|err| panic!("codemod: {err}"));

    assert_eq!(result.output(), "a();\n\nb();");
}

// =============================================================================
// Happy Path: Capture Modes
// =============================================================================

#[rstest]
fn capture_all_yields_one_set_per_pair_in_source_order(mut tsx: Parser) {
    let parsed = parse(
        &mut tsx,
        "const config = { host: 'localhost', port: 8080, secure: true };",
    );
    let query = Query::from_json(
        r#"{
            "type": "object",
            "captureAll": true,
            "items": [{
                "type": "pair",
                "items": [
                    { "field": "key", "capture": "key" },
                    { "field": "value", "capture": "value" }
                ]
            }]
        }"#,
    )
    .unwrap_or_else(|err| panic!("query: {err}"));

    let found = query
        .find_all(&parsed)
        .unwrap_or_else(|err| panic!("search: {err}"));
    let rendered: Vec<String> = found
        .iter()
        .map(|set| {
            format!(
                "{} = {}",
                set.text("key").unwrap_or_default(),
                set.text("value").unwrap_or_default()
            )
        })
        .collect();

    assert_snapshot!(rendered.join("\n"), @r"
    host = 'localhost'
    port = 8080
    secure = true
    ");
}

#[rstest]
fn optional_item_is_absent_when_unmatched(mut tsx: Parser) {
    let parsed = parse(&mut tsx, "function f(a, b = 2) {}");
    let query = Query::compile(
        &QuerySpec::new(["required_parameter", "optional_parameter"].as_slice())
            .with_capture("param")
            .with_item(SubItemSpec::field("pattern").with_capture("name"))
            .with_item(SubItemSpec::field("value").with_capture("default").optional()),
    )
    .unwrap_or_else(|err| panic!("query: {err}"));

    let found = query
        .find_all(&parsed)
        .unwrap_or_else(|err| panic!("search: {err}"));

    assert_eq!(found.len(), 2);
    let defaults: Vec<_> = found.iter().map(|set| set.text("default")).collect();
    assert_eq!(defaults, [None, Some("2")]);
}

#[rstest]
fn regex_text_predicate_selects_matching_callees(mut tsx: Parser) {
    let parsed = parse(&mut tsx, "useState(0);\nuseEffect(f);\nrender();");
    let query = Query::compile(
        &QuerySpec::new("call_expression")
            .with_item(SubItemSpec::field("function").with_capture("hook").with_regex("^use[A-Z]")),
    )
    .unwrap_or_else(|err| panic!("query: {err}"));

    let found = query
        .find_all(&parsed)
        .unwrap_or_else(|err| panic!("search: {err}"));
    let hooks: Vec<_> = found.iter().filter_map(|set| set.text("hook")).collect();

    assert_eq!(hooks, ["useState", "useEffect"]);
}

// =============================================================================
// Unhappy Paths
// =============================================================================

#[rstest]
fn duplicate_capture_names_are_rejected() {
    let err = Query::from_json(
        r#"{
            "type": "call_expression",
            "capture": "node",
            "items": [{ "field": "function", "capture": "node" }]
        }"#,
    )
    .expect_err("duplicate capture should fail");

    assert!(matches!(err, SyntaxError::DuplicateCapture { ref name } if name == "node"));
}

#[rstest]
fn malformed_query_json_is_rejected() {
    let err = Query::from_json(r#"{ "type": 42 }"#).expect_err("malformed query");

    assert!(matches!(err, SyntaxError::Spec(_)), "{err}");
}

#[rstest]
fn codemod_refuses_broken_sources_when_configured() {
    let codemod = Codemod::new(
        SupportedLanguage::TypeScript,
        EngineConfig::new(true, true, 1),
    );
    let err = codemod
        .run("console.log(;", &console_log_query(), |_| None)
        .expect_err("broken source should be refused");

    assert!(matches!(err, SyntaxError::ParseRejected { .. }), "{err}");
}

#[rstest]
fn unknown_extension_is_reported() {
    let err = Parser::for_path(std::path::Path::new("notes.txt"))
        .expect_err("unknown extension");

    assert!(matches!(err, SyntaxError::UnknownLanguage { .. }), "{err}");
}
