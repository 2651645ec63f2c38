use serde::{Deserialize, Serialize};
use std::path::Path;

/// The recognized content kinds of the indexing pipeline: structured
/// source files are parsed into a syntax tree, prose files are sectioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Python,
    Markdown,
    Unknown,
}

impl ContentKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "py" => ContentKind::Python,
            "md" | "mdx" | "markdown" => ContentKind::Markdown,
            _ => ContentKind::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(ContentKind::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Python => "python",
            ContentKind::Markdown => "markdown",
            ContentKind::Unknown => "unknown",
        }
    }

    /// Prose kinds are chunked into sections rather than parsed for
    /// declarations.
    pub fn is_prose(&self) -> bool {
        matches!(self, ContentKind::Markdown)
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_from_extension() {
        assert_eq!(ContentKind::from_extension("py"), ContentKind::Python);
        assert_eq!(ContentKind::from_extension("md"), ContentKind::Markdown);
        assert_eq!(ContentKind::from_extension("mdx"), ContentKind::Markdown);
        assert_eq!(
            ContentKind::from_extension("markdown"),
            ContentKind::Markdown
        );
        assert_eq!(ContentKind::from_extension("rs"), ContentKind::Unknown);
    }

    #[test]
    fn test_content_kind_from_path() {
        assert_eq!(
            ContentKind::from_path(Path::new("src/embd/parser.py")),
            ContentKind::Python
        );
        assert_eq!(
            ContentKind::from_path(Path::new("README.md")),
            ContentKind::Markdown
        );
        assert_eq!(
            ContentKind::from_path(Path::new("Makefile")),
            ContentKind::Unknown
        );
    }
}
