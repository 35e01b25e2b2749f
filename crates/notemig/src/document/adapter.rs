//! Document format adapter trait and the Markdown link matcher
//!
//! An adapter decides which files count as documents and finds the inline
//! link references inside their text. Markdown is treated as flat text: one
//! regex scan, no AST, no reference-style links, no code-fence awareness.

use regex::Regex;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

/// Inline link or image: optional `!`, a bracketed label, a parenthesized target.
///
/// The label is non-greedy and the target cannot contain `)`.
static LINK_REGEX: OnceLock<Regex> = OnceLock::new();

fn link_regex() -> &'static Regex {
    LINK_REGEX.get_or_init(|| {
        Regex::new(r"(!?\[.*?\])\(([^)]+)\)").expect("Link regex should compile")
    })
}

/// A single link reference found in a document's text
///
/// Borrowed from the document content; only lives for one rewrite pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef<'a> {
    /// Byte range of the whole match (`label(target)`) in the content
    pub span: Range<usize>,
    /// Label including the optional `!` and the brackets, e.g. `![alt]`
    pub label: &'a str,
    /// Target exactly as written between the parentheses
    pub target: &'a str,
}

/// Trait for document format adapters
///
/// # Example
///
/// ```
/// use notemig::document::{DocFormatAdapter, MarkdownAdapter};
/// use std::path::Path;
///
/// let adapter = MarkdownAdapter;
/// assert_eq!(adapter.id(), "markdown");
/// assert!(adapter.supports_path(Path::new("notes/readme.md")));
///
/// let links: Vec<_> = adapter.scan_links("see ![logo](img/logo.png)").collect();
/// assert_eq!(links[0].target, "img/logo.png");
/// ```
pub trait DocFormatAdapter {
    /// Returns the adapter identifier (e.g., "markdown")
    fn id(&self) -> &str;

    /// Check if this adapter handles the given file, based on extension
    fn supports_path(&self, path: &Path) -> bool;

    /// Lazily yield link references left to right, non-overlapping
    fn scan_links<'a>(&self, content: &'a str) -> Box<dyn Iterator<Item = LinkRef<'a>> + 'a>;
}

/// Markdown format adapter
///
/// Handles files with the `.md` extension. Images (`![alt](path)`) and
/// inline links (`[text](path)`) are matched by the same pattern and are not
/// distinguished for relocation purposes.
pub struct MarkdownAdapter;

impl DocFormatAdapter for MarkdownAdapter {
    fn id(&self) -> &str {
        "markdown"
    }

    fn supports_path(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "md")
    }

    fn scan_links<'a>(&self, content: &'a str) -> Box<dyn Iterator<Item = LinkRef<'a>> + 'a> {
        Box::new(link_regex().captures_iter(content).filter_map(|cap| {
            let whole = cap.get(0)?;
            let label = cap.get(1)?;
            let target = cap.get(2)?;
            Some(LinkRef {
                span: whole.range(),
                label: label.as_str(),
                target: target.as_str(),
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(content: &str) -> Vec<LinkRef<'_>> {
        MarkdownAdapter.scan_links(content).collect()
    }

    #[test]
    fn test_markdown_adapter_id() {
        assert_eq!(MarkdownAdapter.id(), "markdown");
    }

    #[test]
    fn test_markdown_supports_path() {
        let adapter = MarkdownAdapter;

        assert!(adapter.supports_path(Path::new("README.md")));
        assert!(adapter.supports_path(Path::new("notes/deep/x.md")));

        assert!(!adapter.supports_path(Path::new("file.markdown")));
        assert!(!adapter.supports_path(Path::new("file.txt")));
        assert!(!adapter.supports_path(Path::new("md")));
    }

    #[test]
    fn test_scan_image_and_link() {
        let links = scan("Logo: ![Logo](./assets/logo.png)\nGuide: [Guide](../docs/guide.pdf)");

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].label, "![Logo]");
        assert_eq!(links[0].target, "./assets/logo.png");
        assert!(links[0].label.starts_with('!'));
        assert_eq!(links[1].label, "[Guide]");
        assert_eq!(links[1].target, "../docs/guide.pdf");
    }

    #[test]
    fn test_span_covers_whole_match() {
        let content = "before [a](b.png) after";
        let links = scan(content);

        assert_eq!(&content[links[0].span.clone()], "[a](b.png)");
    }

    #[test]
    fn test_label_is_non_greedy() {
        let links = scan("[one](a.png) and [two](b.png)");

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].label, "[one]");
        assert_eq!(links[1].label, "[two]");
    }

    #[test]
    fn test_empty_label_matches() {
        let links = scan("![](pic.png)");

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label, "![]");
    }

    #[test]
    fn test_target_stops_at_first_closing_paren() {
        let links = scan("[x](file(1).png)");

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, "file(1");
    }

    #[test]
    fn test_empty_target_does_not_match() {
        assert!(scan("[x]()").is_empty());
    }

    #[test]
    fn test_reference_style_links_ignored() {
        assert!(scan("[label]: ./img.png\n[label][ref]").is_empty());
    }

    #[test]
    fn test_urls_are_still_matched() {
        let links = scan("![ext](https://example.com/a.png)");

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, "https://example.com/a.png");
    }
}
