//! Language detection and grammar selection.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Languages a source can be parsed as.
///
/// TypeScript is the default and is parsed with the TSX grammar, which also
/// accepts plain JavaScript and JSX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SupportedLanguage {
    /// TypeScript, TSX, JavaScript, and JSX sources.
    #[default]
    TypeScript,
    /// Rust source files (`.rs`).
    Rust,
    /// Python source files (`.py`, `.pyi`).
    Python,
}

const EXTENSIONS: &[(&str, SupportedLanguage)] = &[
    ("ts", SupportedLanguage::TypeScript),
    ("tsx", SupportedLanguage::TypeScript),
    ("mts", SupportedLanguage::TypeScript),
    ("cts", SupportedLanguage::TypeScript),
    ("js", SupportedLanguage::TypeScript),
    ("jsx", SupportedLanguage::TypeScript),
    ("mjs", SupportedLanguage::TypeScript),
    ("cjs", SupportedLanguage::TypeScript),
    ("rs", SupportedLanguage::Rust),
    ("py", SupportedLanguage::Python),
    ("pyi", SupportedLanguage::Python),
];

impl SupportedLanguage {
    /// Detects the language from a file extension, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use splice_syntax::SupportedLanguage;
    ///
    /// assert_eq!(
    ///     SupportedLanguage::from_extension("TSX"),
    ///     Some(SupportedLanguage::TypeScript)
    /// );
    /// assert_eq!(SupportedLanguage::from_extension("json"), None);
    /// ```
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        EXTENSIONS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(ext))
            .map(|(_, language)| *language)
    }

    /// Detects the language from a file path by examining its extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use splice_syntax::SupportedLanguage;
    ///
    /// assert_eq!(
    ///     SupportedLanguage::from_path(Path::new("src/widget.jsx")),
    ///     Some(SupportedLanguage::TypeScript)
    /// );
    /// assert_eq!(
    ///     SupportedLanguage::from_path(Path::new("BUILD")),
    ///     None
    /// );
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns the Tree-sitter grammar for this language.
    #[must_use]
    pub fn grammar(self) -> tree_sitter::Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
        }
    }

    /// Returns the lower-case identifier for this language.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Rust => "rust",
            Self::Python => "python",
        }
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing a language identifier fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported language: '{0}'")]
pub struct LanguageParseError(String);

impl LanguageParseError {
    /// Returns the input that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}

impl FromStr for SupportedLanguage {
    type Err = LanguageParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalised = input.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "typescript" | "ts" | "tsx" | "javascript" | "js" => Ok(Self::TypeScript),
            "rust" | "rs" => Ok(Self::Rust),
            "python" | "py" => Ok(Self::Python),
            other => Err(LanguageParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("tsx", SupportedLanguage::TypeScript)]
    #[case("TSX", SupportedLanguage::TypeScript)]
    #[case("JSX", SupportedLanguage::TypeScript)]
    #[case("mjs", SupportedLanguage::TypeScript)]
    #[case("rs", SupportedLanguage::Rust)]
    #[case("pyi", SupportedLanguage::Python)]
    fn recognises_extensions(#[case] ext: &str, #[case] expected: SupportedLanguage) {
        assert_eq!(SupportedLanguage::from_extension(ext), Some(expected));
    }

    #[rstest]
    #[case("json")]
    #[case("")]
    fn rejects_unknown_extensions(#[case] ext: &str) {
        assert_eq!(SupportedLanguage::from_extension(ext), None);
    }

    #[rstest]
    #[case("src/app/view.tsx", Some(SupportedLanguage::TypeScript))]
    #[case("src/widget.jsx", Some(SupportedLanguage::TypeScript))]
    #[case("BUILD", None)]
    #[case("notes.md", None)]
    fn detects_language_from_path(
        #[case] path: &str,
        #[case] expected: Option<SupportedLanguage>,
    ) {
        assert_eq!(SupportedLanguage::from_path(Path::new(path)), expected);
    }

    #[rstest]
    #[case(" JavaScript ", SupportedLanguage::TypeScript)]
    #[case("rust", SupportedLanguage::Rust)]
    #[case("PY", SupportedLanguage::Python)]
    fn parses_language_names(#[case] input: &str, #[case] expected: SupportedLanguage) {
        assert_eq!(input.parse::<SupportedLanguage>(), Ok(expected));
    }

    #[test]
    fn reports_unknown_language_name() {
        let err = "go".parse::<SupportedLanguage>().expect_err("go is unsupported");
        assert_eq!(err.input(), "go");
    }

    #[test]
    fn defaults_to_typescript() {
        assert_eq!(SupportedLanguage::default(), SupportedLanguage::TypeScript);
    }
}
