//! RSS feed generation.
//!
//! Generates an RSS 2.0 feed with an Atom self link. The feed's last build
//! date is the publish date of the newest entry, never the wall clock, so
//! rebuilding unchanged sources yields the same bytes.

use rss::{
    ChannelBuilder, GuidBuilder, Item, ItemBuilder,
    extension::atom::{AtomExtension, Link},
    validation::Validate,
};
use sitepack_core::Config;
use thiserror::Error;
use tracing::debug;

use crate::render::Entry;

/// RSS generation errors.
#[derive(Debug, Error)]
pub enum FeedError {
    /// There is no newest entry to date the feed with.
    #[error("cannot build a feed from zero entries")]
    NoEntries,

    /// The generated channel failed RSS validation.
    #[error("invalid feed: {0}")]
    Invalid(String),
}

/// Result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;

/// RSS feed generator.
#[derive(Debug)]
pub struct FeedGenerator<'a> {
    config: &'a Config,
}

impl<'a> FeedGenerator<'a> {
    /// Create a new feed generator.
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Generate feed XML listing every entry, newest first.
    pub fn generate(&self, entries: &[Entry]) -> Result<String> {
        let latest = entries.first().ok_or(FeedError::NoEntries)?;

        debug!(count = entries.len(), latest = %latest.url, "generating feed");

        let items: Vec<Item> = entries.iter().map(|entry| self.entry_to_item(entry)).collect();

        let self_link = Link {
            href: self.config.url_for(&self.config.paths.feed),
            rel: "self".to_string(),
            mime_type: Some("application/rss+xml".to_string()),
            hreflang: None,
            title: None,
            length: None,
        };

        let channel = ChannelBuilder::default()
            .title(&self.config.site.title)
            .link(&self.config.site.base_url)
            .description(
                self.config
                    .site
                    .description
                    .as_deref()
                    .unwrap_or(&self.config.site.title),
            )
            .last_build_date(Some(latest.pub_date.clone()))
            .atom_ext(Some(AtomExtension {
                links: vec![self_link],
            }))
            .items(items)
            .build();

        channel
            .validate()
            .map_err(|e| FeedError::Invalid(e.to_string()))?;

        Ok(channel.to_string())
    }

    /// Convert an entry to an RSS item.
    fn entry_to_item(&self, entry: &Entry) -> Item {
        let url = self.config.url_for(&entry.url);

        let guid = GuidBuilder::default().value(&url).permalink(true).build();

        let mut builder = ItemBuilder::default();
        builder.title(Some(entry.title.clone()));
        builder.link(Some(url));
        builder.guid(Some(guid));
        builder.pub_date(Some(entry.pub_date.clone()));
        builder.description(Some(entry.content.as_str().to_string()));

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Html;

    fn test_config() -> Config {
        let mut config = Config::new("Test Blog", "https://example.com");
        config.site.description = Some("A test blog".to_string());
        config
    }

    fn test_entry(slug: &str, title: &str, pub_date: &str) -> Entry {
        Entry {
            url: format!("/blog/{slug}"),
            title: title.to_string(),
            content: Html::trusted(format!("<h1>{title}</h1>\n<p>Body of {slug}</p>\n")),
            date: String::new(),
            pub_date: pub_date.to_string(),
        }
    }

    #[test]
    fn test_generate_feed() {
        let config = test_config();
        let entries = vec![
            test_entry("newer", "Newer Post", "Sat, 1 May 2021 00:00:00 +0000"),
            test_entry("older", "Older Post", "Wed, 1 Jan 2020 00:00:00 +0000"),
        ];

        let xml = FeedGenerator::new(&config).generate(&entries).unwrap();

        assert!(xml.contains("<title>Test Blog</title>"));
        assert!(xml.contains("<link>https://example.com</link>"));
        assert!(xml.contains("<description>A test blog</description>"));
        assert!(xml.contains("<link>https://example.com/blog/newer</link>"));
        assert!(xml.contains("https://example.com/blog/older</guid>"));
        assert!(xml.contains("<pubDate>Wed, 1 Jan 2020 00:00:00 +0000</pubDate>"));
        assert!(xml.contains("xmlns:atom"));
        assert!(xml.contains(r#"href="https://example.com/atom.xml""#));
        assert!(xml.contains(r#"rel="self""#));

        let newer = xml.find("Newer Post").unwrap();
        let older = xml.find("Older Post").unwrap();
        assert!(newer < older, "entries must keep their order");
    }

    #[test]
    fn test_last_build_date_is_newest_entry() {
        let config = test_config();
        let entries = vec![
            test_entry("b", "B", "Sat, 1 May 2021 00:00:00 +0000"),
            test_entry("a", "A", "Wed, 1 Jan 2020 00:00:00 +0000"),
        ];

        let xml = FeedGenerator::new(&config).generate(&entries).unwrap();
        assert!(xml.contains("<lastBuildDate>Sat, 1 May 2021 00:00:00 +0000</lastBuildDate>"));
    }

    #[test]
    fn test_description_carries_escaped_html() {
        let config = test_config();
        let entries = vec![test_entry("x", "X", "Wed, 1 Jan 2020 00:00:00 +0000")];

        let xml = FeedGenerator::new(&config).generate(&entries).unwrap();
        assert!(xml.contains("&lt;p&gt;Body of x&lt;/p&gt;") || xml.contains("<![CDATA[<h1>X</h1>"));
    }

    #[test]
    fn test_empty_feed_fails() {
        let config = test_config();
        let err = FeedGenerator::new(&config).generate(&[]).unwrap_err();
        assert!(matches!(err, FeedError::NoEntries));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let config = test_config();
        let entries = vec![test_entry("x", "X", "Wed, 1 Jan 2020 00:00:00 +0000")];
        let generator = FeedGenerator::new(&config);

        assert_eq!(
            generator.generate(&entries).unwrap(),
            generator.generate(&entries).unwrap()
        );
    }
}
