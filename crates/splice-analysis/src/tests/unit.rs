//! Unit tests for scope collection and boolean resolution.

use rstest::{fixture, rstest};
use splice_core::EngineConfig;
use splice_syntax::{ParseResult, Parser, SupportedLanguage, SyntaxNode};

use crate::{
    AnalysisError, BindingKind, BooleanResolver, Resolution, ScopeAnalysis, eliminate_unused_bindings,
};

#[fixture]
fn tsx() -> Parser {
    Parser::new(SupportedLanguage::TypeScript).expect("parser")
}

fn parse(parser: &mut Parser, source: &str) -> ParseResult {
    parser.parse(source).expect("parse")
}

fn analyse(parsed: &ParseResult) -> ScopeAnalysis<'_> {
    ScopeAnalysis::collect(parsed).expect("scope collection")
}

fn nth_of_kind<'t>(parsed: &'t ParseResult, kind: &str, index: usize) -> SyntaxNode<'t> {
    parsed
        .root()
        .descendants()
        .filter(|node| node.kind() == kind)
        .nth(index)
        .unwrap_or_else(|| panic!("no {kind} #{index}"))
}

fn references_of(analysis: &ScopeAnalysis<'_>, name: &str) -> Vec<usize> {
    analysis
        .bindings_named(name)
        .map(crate::Binding::references)
        .collect()
}

// =============================================================================
// Bindings
// =============================================================================

#[rstest]
fn collects_every_kind_of_binding(mut tsx: Parser) {
    let parsed = parse(
        &mut tsx,
        "import x, { y as z } from 'm';\n\
         const a = 1;\n\
         let [b, ...rest] = [];\n\
         function f(p, { q }, r = 2) {}\n\
         class C {}\n\
         try {} catch (e) {}\n\
         for (const k of []) {}\n",
    );
    let analysis = analyse(&parsed);

    let declared: Vec<_> = analysis
        .bindings()
        .iter()
        .map(|binding| (binding.name(), binding.kind()))
        .collect();
    assert_eq!(
        declared,
        [
            ("x", BindingKind::Import),
            ("z", BindingKind::Import),
            ("a", BindingKind::Variable { constant: true }),
            ("b", BindingKind::Variable { constant: false }),
            ("rest", BindingKind::Variable { constant: false }),
            ("f", BindingKind::Function),
            ("p", BindingKind::Parameter { index: 0 }),
            ("q", BindingKind::Parameter { index: 1 }),
            ("r", BindingKind::Parameter { index: 2 }),
            ("C", BindingKind::Class),
            ("e", BindingKind::CatchParameter),
            ("k", BindingKind::LoopVariable),
        ]
    );
}

#[rstest]
fn declarations_are_not_counted_as_references(mut tsx: Parser) {
    let parsed = parse(&mut tsx, "const a = 1;\nfunction f(a) {\n  return a;\n}\nf(a);");
    let analysis = analyse(&parsed);

    assert_eq!(references_of(&analysis, "a"), [1, 1]);
    assert_eq!(references_of(&analysis, "f"), [1]);
}

#[rstest]
fn inner_declarations_shadow_outer_ones(mut tsx: Parser) {
    let parsed = parse(
        &mut tsx,
        "const a = 1;\nfunction run() {\n  const a = 2;\n  console.log(a);\n}",
    );
    let analysis = analyse(&parsed);
    let use_site = nth_of_kind(&parsed, "identifier", 4);

    assert_eq!(use_site.text(), "a");
    let resolved = analysis
        .resolve(use_site)
        .and_then(|id| analysis.binding(id))
        .expect("resolved binding");
    assert_eq!(resolved.name_node().start_position(), (3, 9));
    assert_eq!(references_of(&analysis, "a"), [0, 1]);
}

#[rstest]
fn hoisted_declarations_resolve(mut tsx: Parser) {
    let parsed = parse(&mut tsx, "run();\nfunction run() {}");
    let analysis = analyse(&parsed);

    assert_eq!(references_of(&analysis, "run"), [1]);
}

#[rstest]
fn writes_mark_bindings_as_mutated(mut tsx: Parser) {
    let parsed = parse(
        &mut tsx,
        "let a = 1;\na = 2;\nlet b = 0;\nb++;\nlet c = 0;\n[c] = [1];\nlet d = 0;\nd += 1;\nconst e = 0;\nuse(e);",
    );
    let analysis = analyse(&parsed);

    let mutated: Vec<_> = analysis
        .bindings()
        .iter()
        .map(|binding| (binding.name(), binding.is_mutated()))
        .collect();
    assert_eq!(
        mutated,
        [("a", true), ("b", true), ("c", true), ("d", true), ("e", false)]
    );
}

#[rstest]
fn exported_and_loop_header_bindings_are_flagged(mut tsx: Parser) {
    let parsed = parse(
        &mut tsx,
        "export const a = 1;\nexport function f() {\n  const b = 2;\n}\nfor (let i = 0; i < 1; i++) {}",
    );
    let analysis = analyse(&parsed);

    let flags: Vec<_> = analysis
        .bindings()
        .iter()
        .map(|binding| (binding.name(), binding.is_exported(), binding.is_loop_header()))
        .collect();
    assert_eq!(
        flags,
        [("a", true, false), ("f", true, false), ("b", false, false), ("i", false, true)]
    );
}

#[rstest]
fn redeclaration_in_one_scope_is_rejected(mut tsx: Parser) {
    let parsed = parse(&mut tsx, "const a = 1;\nlet a = 2;");
    let err = ScopeAnalysis::collect(&parsed).expect_err("redeclaration");

    assert!(
        matches!(
            err,
            AnalysisError::Redeclaration { ref name, line: 2, column: 5 } if name == "a"
        ),
        "{err}"
    );
}

#[rstest]
fn non_tsx_trees_are_unsupported() {
    let mut parser = Parser::new(SupportedLanguage::Python).expect("parser");
    let parsed = parser.parse("x = 1\n").expect("parse");
    let err = ScopeAnalysis::collect(&parsed).expect_err("python tree");

    assert!(
        matches!(err, AnalysisError::UnsupportedLanguage { language: SupportedLanguage::Python }),
        "{err}"
    );
}

#[rstest]
fn var_declarations_bind_in_the_function_body(mut tsx: Parser) {
    let parsed = parse(
        &mut tsx,
        "function f(c) {\n  if (c) {\n    var x = 1;\n  }\n  return x;\n}",
    );
    let analysis = analyse(&parsed);
    let binding = analysis.bindings_named("x").next().expect("x binding");
    let scope = analysis.scope(binding.scope()).expect("x scope");

    assert_eq!(binding.references(), 1);
    assert_eq!(scope.node().kind(), "statement_block");
    assert_eq!(
        scope.node().parent().map(|parent| parent.kind()),
        Some("function_declaration")
    );
}

#[rstest]
fn declaring_a_var_again_reuses_its_binding(mut tsx: Parser) {
    let parsed = parse(&mut tsx, "var a = 1;\nif (x) {\n  var a = 2;\n}\nuse(a);");
    let analysis = analyse(&parsed);

    let bindings: Vec<_> = analysis
        .bindings_named("a")
        .map(|binding| (binding.references(), binding.is_mutated()))
        .collect();
    assert_eq!(bindings, [(1, true)]);
}

#[rstest]
fn declarations_wrapped_in_an_export_are_exported(mut tsx: Parser) {
    let parsed = parse(
        &mut tsx,
        "export declare const a: number;\nexport default function f() {\n  const b = 1;\n}",
    );
    let analysis = analyse(&parsed);

    let flags: Vec<_> = analysis
        .bindings()
        .iter()
        .map(|binding| (binding.name(), binding.is_exported()))
        .collect();
    assert_eq!(flags, [("a", true), ("f", true), ("b", false)]);
}

// =============================================================================
// Scopes
// =============================================================================

#[rstest]
fn blocks_redeclaring_outer_names_shadow(mut tsx: Parser) {
    let parsed = parse(
        &mut tsx,
        "const a = 1;\nif (x) {\n  const a = 2;\n}\nif (y) {\n  const b = 3;\n}\n{\n  const c = 4;\n}\nconst c = 5;",
    );
    let analysis = analyse(&parsed);

    let shadows: Vec<_> = (0..3)
        .map(|index| {
            let block = nth_of_kind(&parsed, "statement_block", index);
            analysis.scope_of(block).expect("block scope").shadows()
        })
        .collect();
    assert_eq!(shadows, [true, false, true]);
}

#[rstest]
fn scopes_close_innermost_first(mut tsx: Parser) {
    let parsed = parse(&mut tsx, "function f() {\n  {\n  }\n}\nfor (;;) {}");
    let analysis = analyse(&parsed);

    let kinds: Vec<_> = analysis
        .exit_order()
        .iter()
        .filter_map(|id| analysis.scope(*id))
        .map(|scope| scope.node().kind())
        .collect();
    assert_eq!(
        kinds,
        [
            "statement_block",
            "statement_block",
            "function_declaration",
            "statement_block",
            "for_statement",
            "program",
        ]
    );
}

// =============================================================================
// Boolean Resolution
// =============================================================================

#[rstest]
#[case::literal("if (true) {}", Resolution::Resolved(true))]
#[case::parenthesised("if (((false))) {}", Resolution::Resolved(false))]
#[case::member("if (a.state) {}", Resolution::Unresolved)]
#[case::const_chain("const a = true;\nconst b = a;\nif (b) {}", Resolution::Resolved(true))]
#[case::let_binding("let a = true;\nif (a) {}", Resolution::Unresolved)]
#[case::exported("export const a = true;\nif (a) {}", Resolution::Unresolved)]
#[case::cycle("const a = b;\nconst b = a;\nif (a) {}", Resolution::Unresolved)]
#[case::agreeing_calls(
    "function f(a) {\n  if (a) {}\n}\nf(true);\nf(true);",
    Resolution::Resolved(true)
)]
#[case::disagreeing_calls("function f(a) {\n  if (a) {}\n}\nf(true);\nf(false);", Resolution::Unresolved)]
#[case::default_without_calls("function f(a = false) {\n  if (a) {}\n}", Resolution::Resolved(false))]
#[case::default_for_omitted_argument(
    "function f(a = false) {\n  if (a) {}\n}\nf();",
    Resolution::Resolved(false)
)]
#[case::default_disagrees("function f(a = false) {\n  if (a) {}\n}\nf(true);\nf();", Resolution::Unresolved)]
#[case::no_calls_no_default("function f(a) {\n  if (a) {}\n}", Resolution::Unresolved)]
#[case::escaping_function("function f(a) {\n  if (a) {}\n}\nconst g = f;\nf(true);", Resolution::Unresolved)]
#[case::spread_argument("function f(a) {\n  if (a) {}\n}\nf(...args);", Resolution::Unresolved)]
#[case::exported_function("export function f(a = true) {\n  if (a) {}\n}", Resolution::Unresolved)]
#[case::arrow_through_const(
    "const c = true;\nconst run = (a) => {\n  if (a) {}\n};\nrun(c);",
    Resolution::Resolved(true)
)]
#[case::recursive_argument("function f(a) {\n  if (a) {}\n  f(a);\n}", Resolution::Unresolved)]
#[case::method_parameter("class C {\n  m(a = true) {\n    if (a) {}\n  }\n}", Resolution::Unresolved)]
fn resolves_if_conditions(mut tsx: Parser, #[case] source: &str, #[case] expected: Resolution) {
    let parsed = parse(&mut tsx, source);
    let analysis = analyse(&parsed);
    let condition = nth_of_kind(&parsed, "if_statement", 0)
        .child_by_field("condition")
        .expect("condition");

    assert_eq!(BooleanResolver::new(&analysis).resolve(condition), expected);
}

#[rstest]
fn conditionals_are_recorded_in_pre_order(mut tsx: Parser) {
    let parsed = parse(&mut tsx, "if (a) {\n  x = b ? 1 : 2;\n} else if (c) {}");
    let analysis = analyse(&parsed);

    let starts: Vec<_> = analysis
        .conditionals()
        .iter()
        .map(|node| (node.kind(), node.start_byte()))
        .collect();
    assert_eq!(
        starts,
        [("if_statement", 0), ("ternary_expression", 15), ("if_statement", 33)]
    );
}

// =============================================================================
// Passes
// =============================================================================

#[rstest]
#[case::single_pass(1, "const a = 1;\nconsole.log(0);", 1, 1)]
#[case::fixed_point(5, "console.log(0);", 2, 3)]
#[case::limit_reached(2, "console.log(0);", 2, 2)]
fn unused_bindings_iterate_up_to_the_pass_limit(
    #[case] max_passes: usize,
    #[case] expected: &str,
    #[case] edits: usize,
    #[case] passes: usize,
) {
    let config = EngineConfig::new(true, false, max_passes);
    let outcome = eliminate_unused_bindings("const a = 1;\nconst b = a;\nconsole.log(0);", &config)
        .expect("pass");

    assert_eq!(outcome.output(), expected);
    assert_eq!(outcome.edits_applied(), edits);
    assert_eq!(outcome.passes(), passes);
}
