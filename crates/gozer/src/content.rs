use crate::error::{IoContext, Result};
use crate::parsing::{MarkdownRenderer, render_djot, strip_frontmatter};
use log::warn;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Markdown,
    Djot,
    Html,
    Unknown,
}

impl ContentKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("md") => Self::Markdown,
            Some("dj") => Self::Djot,
            Some("html") => Self::Html,
            _ => Self::Unknown,
        }
    }
}

#[derive(Default)]
pub struct ContentRenderer {
    markdown: MarkdownRenderer,
}

impl ContentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files of unknown kind are never read. Invalid UTF-8 in the others is
    /// replaced rather than rejected.
    pub fn render_body(&self, path: &Path) -> Result<String> {
        let kind = ContentKind::from_path(path);
        if kind == ContentKind::Unknown {
            return Ok(self.render(kind, "", path));
        }

        let bytes = fs::read(path).io_context("reading", path)?;
        let file_content = String::from_utf8_lossy(&bytes);
        let body = strip_frontmatter(&file_content, path)?;
        Ok(self.render(kind, body, path))
    }

    pub fn render(&self, kind: ContentKind, body: &str, path: &Path) -> String {
        match kind {
            ContentKind::Markdown => self.markdown.render(body),
            ContentKind::Djot => render_djot(body),
            ContentKind::Html => body.to_string(),
            ContentKind::Unknown => {
                warn!("Unknown content type for {}, rendering empty body", path.display());
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_kind_from_extension() {
        assert_eq!(ContentKind::from_path(Path::new("a/b.md")), ContentKind::Markdown);
        assert_eq!(ContentKind::from_path(Path::new("a/b.dj")), ContentKind::Djot);
        assert_eq!(ContentKind::from_path(Path::new("a/b.html")), ContentKind::Html);
        assert_eq!(ContentKind::from_path(Path::new("a/b.txt")), ContentKind::Unknown);
        assert_eq!(ContentKind::from_path(Path::new("a/README")), ContentKind::Unknown);
    }

    #[test]
    fn test_render_body_markdown_without_frontmatter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.md");
        fs::write(&path, "+++\ntitle = \"My site\"\n+++\n\nHey, welcome on my site!\n").unwrap();

        let html = ContentRenderer::new().render_body(&path).unwrap();
        assert_eq!(html, "<p>Hey, welcome on my site!</p>\n");
    }

    #[test]
    fn test_render_body_html_passthrough() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.html");
        fs::write(&path, "+++\ntitle = \"Raw\"\n+++\n<section>*not markdown*</section>").unwrap();

        let html = ContentRenderer::new().render_body(&path).unwrap();
        assert_eq!(html, "<section>*not markdown*</section>");
    }

    #[test]
    fn test_render_body_djot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.dj");
        fs::write(&path, "A *strong* claim.\n").unwrap();

        let html = ContentRenderer::new().render_body(&path).unwrap();
        assert!(html.contains("<strong>strong</strong>"));
    }

    #[test]
    fn test_render_body_unknown_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "plain text").unwrap();

        let html = ContentRenderer::new().render_body(&path).unwrap();
        assert!(html.is_empty());
    }

    #[test]
    fn test_render_body_binary_unknown_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logo.png");
        fs::write(&path, [0x89, b'P', b'N', b'G', 0xff, 0xfe, 0]).unwrap();

        let html = ContentRenderer::new().render_body(&path).unwrap();
        assert!(html.is_empty());
    }

    #[test]
    fn test_render_body_latin1_markdown() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cafe.md");
        fs::write(&path, b"Caf\xe9 au lait\n").unwrap();

        let html = ContentRenderer::new().render_body(&path).unwrap();
        assert_eq!(html, "<p>Caf\u{FFFD} au lait</p>\n");
    }

    #[test]
    fn test_render_body_missing_file() {
        let renderer = ContentRenderer::new();
        assert!(renderer.render_body(Path::new("does/not/exist.md")).is_err());
    }
}
