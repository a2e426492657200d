//! Tree-sitter parsing wrapper with error reporting.

use std::ops::Range;
use std::path::Path;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::node::SyntaxNode;

/// Longest snippet, in characters, kept for a parse issue.
const SNIPPET_CHARS: usize = 48;

/// A parsed source and its tree.
///
/// Tree-sitter recovers from syntax errors, so a parse result always carries
/// a tree; ERROR and MISSING nodes mark the regions it could not parse.
#[derive(Debug)]
pub struct ParseResult {
    tree: tree_sitter::Tree,
    source: String,
    language: SupportedLanguage,
}

impl ParseResult {
    /// Returns the parsed syntax tree.
    #[must_use]
    pub const fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Returns the source code that was parsed.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the language of the parsed code.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns the root of the tree.
    #[must_use]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode::new(self.tree.root_node(), &self.source)
    }

    /// Returns whether the tree contains ERROR or MISSING nodes.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Collects every ERROR and MISSING node in source order.
    #[must_use]
    pub fn errors(&self) -> Vec<ParseIssue> {
        if !self.has_errors() {
            return Vec::new();
        }
        self.root()
            .descendants()
            .filter(|node| node.raw().is_error() || node.raw().is_missing())
            .map(ParseIssue::from_node)
            .collect()
    }

    /// Fails with [`SyntaxError::ParseRejected`] when the tree has errors.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first syntax error found.
    pub fn ensure_clean(&self) -> Result<(), SyntaxError> {
        let errors = self.errors();
        let Some(first) = errors.first() else {
            return Ok(());
        };
        Err(SyntaxError::ParseRejected {
            language: self.language,
            count: errors.len(),
            line: first.line,
            column: first.column,
        })
    }
}

/// A syntax error located in a parsed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Byte range of the error in the source.
    pub byte_range: Range<usize>,
    /// One-based line where the error starts.
    pub line: u32,
    /// One-based column where the error starts.
    pub column: u32,
    /// The offending source text, truncated.
    pub snippet: String,
    /// Human-readable description of the error.
    pub message: String,
}

impl ParseIssue {
    fn from_node(node: SyntaxNode<'_>) -> Self {
        let (line, column) = node.start_position();
        let text = node.text();
        let snippet = if text.chars().count() > SNIPPET_CHARS {
            let head: String = text.chars().take(SNIPPET_CHARS).collect();
            format!("{head}...")
        } else {
            text.to_owned()
        };
        let message = if node.raw().is_missing() {
            format!("missing {}", node.kind())
        } else {
            "syntax error".to_owned()
        };

        Self {
            byte_range: node.byte_range(),
            line,
            column,
            snippet,
            message,
        }
    }
}

/// Tree-sitter parser configured for one language.
pub struct Parser {
    inner: tree_sitter::Parser,
    language: SupportedLanguage,
}

impl Parser {
    /// Creates a parser for `language`.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded.
    pub fn new(language: SupportedLanguage) -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.grammar())
            .map_err(|err| SyntaxError::parser_init(language, err.to_string()))?;

        Ok(Self { inner, language })
    }

    /// Creates a parser for the language implied by `path`'s extension.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::UnknownLanguage`] when the extension is not
    /// recognised, or an initialisation error from [`Parser::new`].
    pub fn for_path(path: &Path) -> Result<Self, SyntaxError> {
        let language = SupportedLanguage::from_path(path)
            .ok_or_else(|| SyntaxError::unknown_language(path.to_path_buf()))?;
        Self::new(language)
    }

    /// Returns the language this parser is configured for.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Parses `source` into a tree.
    ///
    /// Syntax errors do not fail the parse; inspect
    /// [`ParseResult::has_errors`] instead.
    ///
    /// # Errors
    ///
    /// Returns an error if Tree-sitter produces no tree at all.
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, SyntaxError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse(self.language, "parser produced no tree"))?;

        Ok(ParseResult {
            tree,
            source: source.to_owned(),
            language: self.language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SupportedLanguage::TypeScript, "const a: number = 1;")]
    #[case(SupportedLanguage::TypeScript, "const el = <Component foo=\"bar\" />;")]
    #[case(SupportedLanguage::Rust, "fn main() {}")]
    #[case(SupportedLanguage::Python, "def hello():\n    pass")]
    fn parses_valid_source(#[case] language: SupportedLanguage, #[case] source: &str) {
        let mut parser = Parser::new(language).expect("parser init");
        let result = parser.parse(source).expect("parse");

        assert!(!result.has_errors());
        assert!(result.ensure_clean().is_ok());
        assert_eq!(result.root().text(), source);
    }

    #[rstest]
    #[case(SupportedLanguage::TypeScript, "function broken( {")]
    #[case(SupportedLanguage::Rust, "fn broken() {")]
    fn reports_syntax_errors(#[case] language: SupportedLanguage, #[case] source: &str) {
        let mut parser = Parser::new(language).expect("parser init");
        let result = parser.parse(source).expect("parse");

        assert!(result.has_errors());
        let first = result.errors().into_iter().next().expect("an error");
        assert!(first.line >= 1 && first.column >= 1);
        assert!(matches!(
            result.ensure_clean(),
            Err(SyntaxError::ParseRejected { count, .. }) if count >= 1
        ));
    }

    #[test]
    fn selects_parser_from_path() {
        let parser = Parser::for_path(Path::new("src/widget.jsx")).expect("parser");
        assert_eq!(parser.language(), SupportedLanguage::TypeScript);
    }

    #[test]
    fn rejects_unknown_path() {
        let result = Parser::for_path(Path::new("BUILD.bazel"));
        assert!(matches!(result, Err(SyntaxError::UnknownLanguage { .. })));
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}
