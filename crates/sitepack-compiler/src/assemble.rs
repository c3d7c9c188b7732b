//! Artifact assembly.
//!
//! Derives the published documents from the ordered entry sequence: one page
//! per entry, the archive listing, the syndication feed and the homepage.

use sitepack_core::Config;
use thiserror::Error;
use tracing::debug;

use crate::{
    feed::{FeedError, FeedGenerator},
    render::Entry,
    template::{Template, TemplateContext, TemplateError, TemplateRegistry, escape_html},
};

/// Assembly errors.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// Template expansion failed.
    #[error("template error in {artifact}: {source}")]
    Template {
        artifact: String,
        #[source]
        source: TemplateError,
    },

    /// Feed generation failed.
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Result type for assembly operations.
pub type Result<T> = std::result::Result<T, AssembleError>;

/// A rendered document and the registry key it is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Absolute URL path.
    pub key: String,

    /// Document bytes.
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Create an artifact.
    pub fn new(key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            bytes: bytes.into(),
        }
    }
}

/// Builds artifacts from entries using the site templates.
#[derive(Debug)]
pub struct ArtifactAssembler<'a> {
    config: &'a Config,
    templates: &'a TemplateRegistry,
    site: TemplateContext,
}

impl<'a> ArtifactAssembler<'a> {
    /// Create an assembler. Renders the shared `style` and `footer`
    /// templates once so every page can embed them.
    pub fn new(config: &'a Config, templates: &'a TemplateRegistry) -> Result<Self> {
        let mut site = TemplateContext::new()
            .with_var("site_title", escape_html(&config.site.title))
            .with_var("base_url", escape_html(&config.site.base_url))
            .with_var("feed_url", escape_html(&config.paths.feed))
            .with_var("blog_url", escape_html(&config.paths.blog_prefix));
        if let Some(description) = &config.site.description {
            site.insert("site_description", escape_html(description));
        }

        let stylesheet = Self::expand(templates, "style", "style", &site)?;
        let footer = Self::expand(templates, "footer", "footer", &site)?;
        site.insert("stylesheet", stylesheet);
        site.insert("footer", footer);

        Ok(Self {
            config,
            templates,
            site,
        })
    }

    /// The page for one entry, keyed by its URL.
    pub fn entry_page(&self, entry: &Entry) -> Result<Artifact> {
        let html = self.render_with(&entry.url, "entry", entry.context())?;
        Ok(Artifact::new(entry.url.clone(), html))
    }

    /// Every entry as a compact title and date line.
    pub fn archive(&self, entries: &[Entry]) -> Result<Artifact> {
        let key = &self.config.paths.blog_prefix;
        let items = self.render_items(key, "list_item", entries)?;
        let ctx = TemplateContext::new()
            .with_var("entries", items)
            .with_var("count", entries.len().to_string());
        let html = self.render_with(key, "list", ctx)?;
        Ok(Artifact::new(key.clone(), html))
    }

    /// The syndication feed. Fails when there are no entries.
    pub fn feed(&self, entries: &[Entry]) -> Result<Artifact> {
        let xml = FeedGenerator::new(self.config).generate(entries)?;
        Ok(Artifact::new(self.config.paths.feed.clone(), xml))
    }

    /// The homepage: the newest entries up to the configured limit.
    pub fn home(&self, entries: &[Entry]) -> Result<Artifact> {
        let key = &self.config.paths.home;
        let recent = &entries[..entries.len().min(self.config.build.home_limit)];
        let items = self.render_items(key, "home_item", recent)?;
        let ctx = TemplateContext::new()
            .with_var("entries", items)
            .with_var("count", recent.len().to_string());
        let html = self.render_with(key, "home", ctx)?;

        debug!(shown = recent.len(), total = entries.len(), "assembled homepage");
        Ok(Artifact::new(key.clone(), html))
    }

    /// A fixed page: `source` expanded with the site context only.
    pub fn fixed_page(&self, key: impl Into<String>, source: &str) -> Result<Artifact> {
        let key = key.into();
        let template = Template::new(key.clone(), source);
        let html = template
            .render(&self.site)
            .map_err(|source| AssembleError::Template {
                artifact: key.clone(),
                source,
            })?;
        Ok(Artifact::new(key, html))
    }

    fn render_items(&self, artifact: &str, template: &str, entries: &[Entry]) -> Result<String> {
        entries
            .iter()
            .map(|entry| self.render_with(artifact, template, entry.context()))
            .collect()
    }

    fn render_with(&self, artifact: &str, template: &str, vars: TemplateContext) -> Result<String> {
        let mut ctx = self.site.clone();
        ctx.extend(&vars);
        Self::expand(self.templates, artifact, template, &ctx)
    }

    fn expand(
        templates: &TemplateRegistry,
        artifact: &str,
        template: &str,
        ctx: &TemplateContext,
    ) -> Result<String> {
        templates
            .render(template, ctx)
            .map_err(|source| AssembleError::Template {
                artifact: artifact.to_string(),
                source,
            })
    }
}
