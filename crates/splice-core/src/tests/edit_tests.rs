//! Tests for [`apply_edits`] and [`validate_edits`].

use insta::assert_snapshot;
use rstest::rstest;

use crate::{CodeEdit, EditError, apply_edits, validate_edits};

#[test]
fn empty_edit_list_is_identity() {
    let source = "const a = 1;\nconsole.log(a);";
    assert_eq!(apply_edits(source, &[]).expect("apply"), source);
}

#[test]
fn single_replacement() {
    let source = "let x = 1;\nconsole.log(x);";
    let output = apply_edits(source, &[CodeEdit::new(11, 22, "logger.info")]).expect("apply");
    assert_eq!(output, "let x = 1;\nlogger.info(x);");
}

#[test]
fn equal_start_and_end_inserts() {
    let output = apply_edits("ac", &[CodeEdit::insert(1, "b")]).expect("apply");
    assert_eq!(output, "abc");
}

#[test]
fn empty_replacement_deletes() {
    let output = apply_edits("abc", &[CodeEdit::delete(1..2)]).expect("apply");
    assert_eq!(output, "ac");
}

/// Regression: the adjustment must accumulate across edits. Keeping only the
/// last edit's length change shifts the third edit onto the wrong bytes.
#[test]
fn offsets_accumulate_across_three_or_more_edits() {
    let source = "aa bb cc dd";
    let edits = [
        CodeEdit::new(0, 2, "AAAA"),
        CodeEdit::new(3, 5, "BBBB"),
        CodeEdit::new(6, 8, "C"),
        CodeEdit::new(9, 11, "DDD"),
    ];
    let output = apply_edits(source, &edits).expect("apply");
    assert_eq!(output, "AAAA BBBB C DDD");
}

#[test]
fn growing_and_shrinking_edits_mix() {
    let source = "console.log(a); console.log(b); console.log(c);";
    let edits = [
        CodeEdit::new(0, 11, "log"),
        CodeEdit::new(16, 27, "logger.info"),
        CodeEdit::new(32, 43, "x"),
    ];
    let output = apply_edits(source, &edits).expect("apply");
    assert_snapshot!(output, @"log(a); logger.info(b); x(c);");
}

#[test]
fn adjacent_edits_do_not_overlap() {
    let edits = [CodeEdit::delete(0..3), CodeEdit::delete(3..6)];
    assert_eq!(validate_edits(&edits), Ok(()));
    assert_eq!(apply_edits("abcdefg", &edits).expect("apply"), "g");
}

#[test]
fn insertions_at_the_same_offset_apply_in_order() {
    let edits = [CodeEdit::insert(1, "x"), CodeEdit::insert(1, "y")];
    assert_eq!(validate_edits(&edits), Ok(()));
    assert_eq!(apply_edits("ab", &edits).expect("apply"), "axyb");
}

#[rstest]
#[case(
    vec![CodeEdit::delete(4..6), CodeEdit::delete(0..2)],
    EditError::Unsorted { index: 1, previous: 0 }
)]
#[case(
    vec![CodeEdit::delete(0..4), CodeEdit::delete(2..6)],
    EditError::Overlapping { index: 1, previous: 0 }
)]
#[case(
    vec![CodeEdit::new(5, 2, "")],
    EditError::InvertedRange { index: 0, start: 5, end: 2 }
)]
fn validation_reports_contract_violations(
    #[case] edits: Vec<CodeEdit>,
    #[case] expected: EditError,
) {
    assert_eq!(validate_edits(&edits), Err(expected));
}

#[test]
fn validation_error_renders_positions() {
    let error = validate_edits(&[CodeEdit::delete(4..6), CodeEdit::delete(0..2)])
        .expect_err("unsorted edits");
    assert_snapshot!(error.to_string(), @"edit 1 starts before edit 0 (edits must be sorted ascending)");
}

#[test]
fn out_of_bounds_edit_is_reported() {
    let result = apply_edits("abc", &[CodeEdit::delete(1..10)]);
    assert_eq!(
        result,
        Err(EditError::OutOfBounds {
            start: 1,
            end: 10,
            len: 3
        })
    );
}

#[test]
fn edit_splitting_a_character_is_reported() {
    let result = apply_edits("é", &[CodeEdit::delete(1..2)]);
    assert_eq!(result, Err(EditError::NotCharBoundary { offset: 1 }));
}

#[test]
fn code_edit_serialises_with_camel_case_keys() {
    let json = serde_json::to_string(&CodeEdit::new(1, 4, "x")).expect("serialise");
    assert_eq!(json, r#"{"startIndex":1,"endIndex":4,"newText":"x"}"#);
}
