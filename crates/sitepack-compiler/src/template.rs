//! Placeholder expansion for generated pages.
//!
//! A template is plain text with `{{ name }}` slots. A trailing `?` marks
//! a slot that may be absent from the context and expands to nothing.
//! Substituted values are never scanned again, so entry bodies that happen
//! to contain braces come through untouched.
//!
//! Each template name ships with a built-in default. A file named
//! `<name>.<ext>` in the site's templates directory takes its place.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Template lookup and expansion errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A required placeholder has no value in the context.
    #[error("no value for placeholder `{0}`")]
    MissingVariable(String),

    /// No template is registered under the name.
    #[error("no template named `{0}`")]
    NotFound(String),

    /// An opening delimiter is never closed.
    #[error("template `{template}` is malformed: {message}")]
    InvalidSyntax { template: String, message: String },

    /// A template override could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Placeholder values, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: HashMap<String, String>,
}

impl TemplateContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one value, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Builder form of [`TemplateContext::insert`].
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Layer `overrides` on top of this context.
    pub fn extend(&mut self, overrides: &TemplateContext) {
        self.vars.extend(
            overrides
                .vars
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// One slot found while scanning a template.
struct Slot<'a> {
    name: &'a str,
    optional: bool,
}

impl<'a> Slot<'a> {
    fn parse(inner: &'a str) -> Self {
        let inner = inner.trim();
        match inner.strip_suffix('?') {
            Some(name) => Self {
                name: name.trim_end(),
                optional: true,
            },
            None => Self {
                name: inner,
                optional: false,
            },
        }
    }
}

/// A named template source.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    source: String,
}

impl Template {
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expand every slot against `ctx`.
    ///
    /// Fails on a required slot with no value or on an opening `{{` that is
    /// never closed.
    pub fn render(&self, ctx: &TemplateContext) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();

        while let Some(open) = rest.find(OPEN) {
            out.push_str(&rest[..open]);
            let after_open = &rest[open + OPEN.len()..];
            let Some(close) = after_open.find(CLOSE) else {
                return Err(TemplateError::InvalidSyntax {
                    template: self.name.clone(),
                    message: format!("`{OPEN}` without matching `{CLOSE}`"),
                });
            };

            let slot = Slot::parse(&after_open[..close]);
            match ctx.get(slot.name) {
                Some(value) => out.push_str(value),
                None if slot.optional => {}
                None => return Err(TemplateError::MissingVariable(slot.name.to_string())),
            }
            rest = &after_open[close + CLOSE.len()..];
        }
        out.push_str(rest);

        Ok(out)
    }
}

const BUILTIN: [(&str, &str); 7] = [
    ("entry", DEFAULT_ENTRY_TEMPLATE),
    ("list", DEFAULT_LIST_TEMPLATE),
    ("list_item", DEFAULT_LIST_ITEM_TEMPLATE),
    ("home", DEFAULT_HOME_TEMPLATE),
    ("home_item", DEFAULT_HOME_ITEM_TEMPLATE),
    ("style", DEFAULT_STYLE_TEMPLATE),
    ("footer", DEFAULT_FOOTER_TEMPLATE),
];

/// Templates available to the assembler, by name.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    by_name: HashMap<String, Template>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// A registry holding the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        let by_name = BUILTIN
            .iter()
            .map(|(name, source)| (name.to_string(), Template::new(*name, *source)))
            .collect();
        Self { by_name }
    }

    pub fn register(&mut self, template: Template) {
        self.by_name.insert(template.name.clone(), template);
    }

    /// Replace templates with the files in `dir`, keyed by file stem.
    ///
    /// Returns how many files were loaded. Dotfiles are ignored and a
    /// missing directory loads nothing.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "templates directory absent, using defaults");
            return Ok(0);
        }

        let read_err = |source| TemplateError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(read_err)?
            .map(|entry| entry.map(|e| e.path()).map_err(read_err))
            .collect::<Result<_>>()?;
        files.retain(|path| {
            path.is_file()
                && !path
                    .file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with('.'))
        });
        files.sort();

        let mut loaded = 0;
        for path in files {
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            let source = fs::read_to_string(&path).map_err(|source| TemplateError::Io {
                path: path.clone(),
                source,
            })?;
            debug!(template = %stem, path = %path.display(), "template override");
            self.register(Template::new(stem, source));
            loaded += 1;
        }

        Ok(loaded)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.by_name.get(name)
    }

    /// Look up `name` and expand it.
    pub fn render(&self, name: &str, ctx: &TemplateContext) -> Result<String> {
        self.get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?
            .render(ctx)
    }
}

/// Escape text for HTML content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Default single entry page.
pub const DEFAULT_ENTRY_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{ title }} - {{ site_title }}</title>
<link rel="alternate" type="application/rss+xml" title="{{ site_title }}" href="{{ feed_url }}">
<style>{{ stylesheet }}</style>
</head>
<body>
<nav><a href="/">{{ site_title }}</a> / <a href="{{ blog_url }}">blog</a></nav>
<article>
<p class="date"><time datetime="{{ date }}">{{ date }}</time></p>
{{ content }}
</article>
{{ footer }}
</body>
</html>
"#;

/// Default archive listing page.
pub const DEFAULT_LIST_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Blog - {{ site_title }}</title>
<link rel="alternate" type="application/rss+xml" title="{{ site_title }}" href="{{ feed_url }}">
<style>{{ stylesheet }}</style>
</head>
<body>
<nav><a href="/">{{ site_title }}</a></nav>
<h1>Blog</h1>
<ul class="archive">
{{ entries }}</ul>
{{ footer }}
</body>
</html>
"#;

/// Default archive line for one entry.
pub const DEFAULT_LIST_ITEM_TEMPLATE: &str =
    r#"<li><a href="{{ url }}">{{ title }}</a> <time datetime="{{ date }}">{{ date }}</time></li>
"#;

/// Default homepage.
pub const DEFAULT_HOME_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{ site_title }}</title>
<meta name="description" content="{{ site_description? }}">
<link rel="alternate" type="application/rss+xml" title="{{ site_title }}" href="{{ feed_url }}">
<style>{{ stylesheet }}</style>
</head>
<body>
<h1>{{ site_title }}</h1>
<section class="recent">
{{ entries }}</section>
<p><a href="{{ blog_url }}">All posts</a></p>
{{ footer }}
</body>
</html>
"#;

/// Default homepage block for one entry.
pub const DEFAULT_HOME_ITEM_TEMPLATE: &str = r#"<article>
<p class="date"><a href="{{ url }}">{{ date }}</a></p>
{{ content }}
</article>
"#;

/// Default inline stylesheet.
pub const DEFAULT_STYLE_TEMPLATE: &str = r#"body { max-width: 42em; margin: 2em auto; padding: 0 1em; font-family: sans-serif; line-height: 1.5; }
pre { overflow-x: auto; }
.date { color: #666; }
"#;

/// Default shared footer.
pub const DEFAULT_FOOTER_TEMPLATE: &str =
    r#"<footer><a href="{{ feed_url }}">feed</a></footer>
"#;
