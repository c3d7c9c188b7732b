//! Markup rendering into blog entries.

use pulldown_cmark::{Options, Parser, html};
use thiserror::Error;
use tracing::debug;

use crate::{
    collector::{PostName, SourceDocument},
    template::{TemplateContext, escape_html},
};

/// Rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Post content is not UTF-8 text.
    #[error("{file_name}: content is not valid UTF-8")]
    NotUtf8 { file_name: String },

    /// Post does not start with a `# Title` line.
    #[error("{file_name}: no title found")]
    MissingTitle { file_name: String },
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Format of the machine-readable publish date, RFC 822 style for feeds.
const PUB_DATE_FORMAT: &str = "%a, %-d %b %Y 00:00:00 +0000";

/// HTML that is inserted into pages without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Html(String);

impl Html {
    /// Wrap markup produced by a trusted converter.
    #[must_use]
    pub fn trusted(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// The markup as a plain string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Converts lightweight markup to HTML.
pub trait MarkupConverter {
    /// Convert `source` to an HTML fragment. Must be deterministic.
    fn convert(&self, source: &str) -> Html;
}

/// CommonMark converter using pulldown-cmark.
#[derive(Debug, Clone)]
pub struct MarkdownConverter {
    options: Options,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter {
    /// Create a converter with tables, footnotes and strikethrough enabled.
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        Self { options }
    }
}

impl MarkupConverter for MarkdownConverter {
    fn convert(&self, source: &str) -> Html {
        let parser = Parser::new_ext(source, self.options);
        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Html(out)
    }
}

/// One rendered blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Registry key, blog prefix followed by the slug.
    pub url: String,

    /// Text of the leading `# ` heading.
    pub title: String,

    /// Rendered body, heading included.
    pub content: Html,

    /// Human-readable date, the file name's date segment.
    pub date: String,

    /// Machine-readable date, e.g. `Mon, 2 Jan 2006 00:00:00 +0000`.
    pub pub_date: String,
}

impl Entry {
    /// Template variables for this entry. Text fields are HTML-escaped.
    pub fn context(&self) -> TemplateContext {
        TemplateContext::new()
            .with_var("url", escape_html(&self.url))
            .with_var("title", escape_html(&self.title))
            .with_var("date", escape_html(&self.date))
            .with_var("pub_date", escape_html(&self.pub_date))
            .with_var("content", self.content.as_str())
    }
}

/// Text of a first line of the form `# <title>`.
pub fn extract_title(source: &str) -> Option<&str> {
    let first_line = source.split('\n').next()?;
    let title = first_line.strip_prefix("# ")?.trim_end_matches('\r').trim();
    (!title.is_empty()).then_some(title)
}

/// Renders markup posts into entries.
#[derive(Debug)]
pub struct ContentRenderer<C = MarkdownConverter> {
    converter: C,
    blog_prefix: String,
}

impl ContentRenderer<MarkdownConverter> {
    /// Create a renderer using the default markdown converter.
    #[must_use]
    pub fn new(blog_prefix: impl Into<String>) -> Self {
        Self::with_converter(MarkdownConverter::new(), blog_prefix)
    }
}

impl<C: MarkupConverter> ContentRenderer<C> {
    /// Create a renderer with a custom converter.
    #[must_use]
    pub fn with_converter(converter: C, blog_prefix: impl Into<String>) -> Self {
        Self {
            converter,
            blog_prefix: blog_prefix.into(),
        }
    }

    /// Render one post document.
    pub fn render(&self, document: &SourceDocument, post: &PostName) -> Result<Entry> {
        let source =
            std::str::from_utf8(&document.bytes).map_err(|_| RenderError::NotUtf8 {
                file_name: document.file_name.clone(),
            })?;

        let title = extract_title(source).ok_or_else(|| RenderError::MissingTitle {
            file_name: document.file_name.clone(),
        })?;

        let entry = Entry {
            url: format!("{}{}", self.blog_prefix, post.slug),
            title: title.to_string(),
            content: self.converter.convert(source),
            date: post.date_str.clone(),
            pub_date: post.date.format(PUB_DATE_FORMAT).to_string(),
        };

        debug!(url = %entry.url, title = %entry.title, "rendered entry");
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::collector::SourceKind;

    fn document(file_name: &str, content: &[u8]) -> (SourceDocument, PostName) {
        let post = PostName::parse(file_name).unwrap();
        let doc = SourceDocument {
            path: PathBuf::from("blog").join(file_name),
            file_name: file_name.to_string(),
            kind: SourceKind::Post(post.clone()),
            bytes: content.to_vec(),
        };
        (doc, post)
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(extract_title("# Hello\nbody"), Some("Hello"));
        assert_eq!(extract_title("# Hello"), Some("Hello"));
        assert_eq!(extract_title("# Windows\r\nbody"), Some("Windows"));
        assert_eq!(extract_title("## Subheading\n"), None);
        assert_eq!(extract_title("#NoSpace\n"), None);
        assert_eq!(extract_title("intro\n# Late title\n"), None);
        assert_eq!(extract_title("#  \n"), None);
        assert_eq!(extract_title(""), None);
    }

    #[test]
    fn test_render_entry() {
        let (doc, post) = document(
            "2006-01-02-first-post.md",
            b"# First *post*\n\nSome text.\n",
        );
        let entry = ContentRenderer::new("/blog/").render(&doc, &post).unwrap();

        assert_eq!(entry.url, "/blog/first-post");
        assert_eq!(entry.title, "First *post*");
        assert_eq!(entry.date, "2006-01-02");
        assert_eq!(entry.pub_date, "Mon, 2 Jan 2006 00:00:00 +0000");
        assert!(entry.content.as_str().contains("<h1>First <em>post</em></h1>"));
        assert!(entry.content.as_str().contains("<p>Some text.</p>"));
    }

    #[test]
    fn test_render_two_digit_day() {
        let (doc, post) = document("2019-12-31-eve.md", b"# Eve\n");
        let entry = ContentRenderer::new("/blog/").render(&doc, &post).unwrap();
        assert_eq!(entry.pub_date, "Tue, 31 Dec 2019 00:00:00 +0000");
    }

    #[test]
    fn test_render_is_deterministic() {
        let (doc, post) = document("2020-05-05-same.md", b"# Same\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        let renderer = ContentRenderer::new("/blog/");
        assert_eq!(
            renderer.render(&doc, &post).unwrap(),
            renderer.render(&doc, &post).unwrap()
        );
    }

    #[test]
    fn test_render_missing_title() {
        let (doc, post) = document("2020-01-01-untitled.md", b"no heading here\n");
        let err = ContentRenderer::new("/blog/")
            .render(&doc, &post)
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingTitle { .. }));
        assert!(err.to_string().contains("2020-01-01-untitled.md"));
    }

    #[test]
    fn test_render_not_utf8() {
        let (doc, post) = document("2020-01-01-binary.md", &[b'#', b' ', 0xff, 0xfe]);
        let err = ContentRenderer::new("/blog/")
            .render(&doc, &post)
            .unwrap_err();
        assert!(matches!(err, RenderError::NotUtf8 { .. }));
    }

    #[test]
    fn test_entry_context_escapes_text() {
        let entry = Entry {
            url: "/blog/a".to_string(),
            title: "Fish & <Chips>".to_string(),
            content: Html::trusted("<p>raw</p>"),
            date: "2020-01-01".to_string(),
            pub_date: "Wed, 1 Jan 2020 00:00:00 +0000".to_string(),
        };
        let ctx = entry.context();

        assert_eq!(ctx.get("title"), Some("Fish &amp; &lt;Chips&gt;"));
        assert_eq!(ctx.get("content"), Some("<p>raw</p>"));
    }

    struct Shouting;

    impl MarkupConverter for Shouting {
        fn convert(&self, source: &str) -> Html {
            Html::trusted(source.to_uppercase())
        }
    }

    #[test]
    fn test_custom_converter() {
        let (doc, post) = document("2020-01-01-loud.md", b"# quiet\n");
        let entry = ContentRenderer::with_converter(Shouting, "/posts/")
            .render(&doc, &post)
            .unwrap();
        assert_eq!(entry.url, "/posts/loud");
        assert_eq!(entry.content.as_str(), "# QUIET\n");
    }
}
