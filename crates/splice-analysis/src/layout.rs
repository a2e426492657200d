//! Line-oriented helpers for shaping removals and unwrapped blocks.

use std::ops::Range;

/// Node types whose named children form a statement list.
const STATEMENT_LISTS: [&str; 4] = ["program", "statement_block", "switch_case", "switch_default"];

/// Returns whether a node of type `parent_kind` holds its children as a
/// statement list.
pub(crate) fn is_statement_list(parent_kind: &str) -> bool {
    STATEMENT_LISTS.contains(&parent_kind)
}

/// Byte offset of the start of the line containing `offset`.
pub(crate) fn line_start(source: &str, offset: usize) -> usize {
    source
        .get(..offset)
        .and_then(|before| before.rfind('\n'))
        .map_or(0, |newline| newline + 1)
}

/// Leading whitespace of the line containing `offset`.
pub(crate) fn line_indent(source: &str, offset: usize) -> &str {
    let start = line_start(source, offset);
    let line = source.get(start..).unwrap_or_default();
    let width = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    line.get(..width).unwrap_or_default()
}

/// Widens `range` to whole lines, trailing newline included, when nothing
/// but whitespace shares those lines with it.
pub(crate) fn whole_lines(source: &str, range: Range<usize>) -> Range<usize> {
    let start = line_start(source, range.start);
    let before = source.get(start..range.start).unwrap_or_default();
    if !before.chars().all(|c| c == ' ' || c == '\t') {
        return range;
    }
    let rest = source.get(range.end..).unwrap_or_default();
    let end = rest
        .find('\n')
        .map_or(source.len(), |newline| range.end + newline + 1);
    let after = source.get(range.end..end).unwrap_or_default();
    if !after.trim().is_empty() {
        return range;
    }
    start..end
}

/// Moves every line after the first from indentation `from` to `to`.
///
/// Lines that do not start with `from` are kept as they are.
pub(crate) fn reindent(text: &str, from: &str, to: &str) -> String {
    let mut lines = text.split('\n');
    let mut output = String::with_capacity(text.len());
    output.push_str(lines.next().unwrap_or_default());
    for line in lines {
        let (indent, rest) = line.strip_prefix(from).map_or(("", line), |rest| (to, rest));
        output.push('\n');
        output.push_str(indent);
        output.push_str(rest);
    }
    output
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::own_line("a();\n  if (x) {}\nb();", 7..16, (5, 17))]
    #[case::last_line_without_newline("a();\nif (x) {}", 5..14, (5, 14))]
    #[case::shares_line_before("a(); if (x) {}\nb();", 5..14, (5, 14))]
    #[case::shares_line_after("if (x) {} b();", 0..9, (0, 9))]
    #[case::trailing_spaces("if (x) {}  \nb();", 0..9, (0, 12))]
    fn whole_lines_only_widens_lone_constructs(
        #[case] source: &str,
        #[case] range: Range<usize>,
        #[case] expected: (usize, usize),
    ) {
        let widened = whole_lines(source, range);
        assert_eq!((widened.start, widened.end), expected);
    }

    #[rstest]
    fn line_indent_reports_leading_whitespace() {
        let source = "{\n\t  x();\n}";
        assert_eq!(line_indent(source, 5), "\t  ");
        assert_eq!(line_indent(source, 0), "");
    }

    #[rstest]
    #[case::dedent("a();\n    b();\n\n    c();", "    ", "  ", "a();\n  b();\n\n  c();")]
    #[case::foreign_indent("a();\n b();", "    ", "", "a();\n b();")]
    #[case::single_line("a();", "  ", "", "a();")]
    fn reindent_moves_following_lines(
        #[case] text: &str,
        #[case] from: &str,
        #[case] to: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(reindent(text, from, to), expected);
    }
}
