//! `sitepack.toml`: site identity, source layout and published paths.

use std::{io, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Prefix of environment overrides, e.g. `SITEPACK__SITE__BASE_URL`.
pub const ENV_PREFIX: &str = "SITEPACK";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Identity of the site as shown in pages and the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: String,
    /// Absolute origin, e.g. `https://example.com`. Feed links are built on it.
    pub base_url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Source directories, relative to the site root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub blog_dir: String,
    pub templates_dir: String,
    pub pages_dir: String,
    pub static_dir: String,
    /// Entries shown on the homepage, newest first.
    pub home_limit: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            blog_dir: "blog".into(),
            templates_dir: "templates".into(),
            pages_dir: "pages".into(),
            static_dir: "static".into(),
            home_limit: 5,
        }
    }
}

/// Registry keys of the generated artifacts.
///
/// `blog_prefix` is both the archive key and the prefix of every entry key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub blog_prefix: String,
    pub feed: String,
    pub home: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            blog_prefix: "/blog/".into(),
            feed: "/atom.xml".into(),
            home: "/".into(),
        }
    }
}

impl Config {
    /// A config with the given identity and default layout.
    pub fn new(title: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            site: SiteConfig {
                title: title.into(),
                base_url: base_url.into(),
                description: None,
            },
            build: BuildConfig::default(),
            paths: PathsConfig::default(),
        }
    }

    /// Parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => {
                CoreError::config(format!("{} not found", path.display()))
            }
            _ => CoreError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let config: Self = toml::from_str(&text).map_err(|e| {
            CoreError::config_with_source(format!("{} is not valid", path.display()), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], with `SITEPACK__<SECTION>__<KEY>` variables
    /// taking precedence over the file.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let site = &self.site;
        if site.title.trim().is_empty() {
            return Err(CoreError::config("site.title is empty"));
        }
        if site.base_url.trim().is_empty() {
            return Err(CoreError::config("site.base_url is empty"));
        }
        if site.base_url.ends_with('/') {
            tracing::warn!(base_url = %site.base_url, "trailing slash in site.base_url is ignored");
        }
        if self.build.home_limit < 1 {
            return Err(CoreError::config("build.home_limit is 0"));
        }

        let keys = [
            ("paths.blog_prefix", &self.paths.blog_prefix),
            ("paths.feed", &self.paths.feed),
            ("paths.home", &self.paths.home),
        ];
        if let Some((field, value)) = keys.iter().find(|(_, v)| !v.starts_with('/')) {
            return Err(CoreError::config(format!(
                "{field} = {value:?} is not an absolute path"
            )));
        }
        if !self.paths.blog_prefix.ends_with('/') {
            return Err(CoreError::config(format!(
                "paths.blog_prefix = {:?} needs a trailing '/'",
                self.paths.blog_prefix
            )));
        }

        Ok(())
    }

    /// Absolute URL of a registry key.
    pub fn url_for(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.site.base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const SITE: &str = r#"
[site]
title = "Field Notes"
base_url = "https://notes.example.com"
description = "Short notes"

[build]
blog_dir = "posts"
home_limit = 3

[paths]
feed = "/rss.xml"
"#;

    fn write(dir: &TempDir, text: &str) -> std::path::PathBuf {
        let path = dir.path().join("sitepack.toml");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_merges_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&write(&dir, SITE)).unwrap();

        assert_eq!(config.site.title, "Field Notes");
        assert_eq!(config.site.description.as_deref(), Some("Short notes"));
        assert_eq!(config.build.blog_dir, "posts");
        assert_eq!(config.build.pages_dir, "pages");
        assert_eq!(config.build.home_limit, 3);
        assert_eq!(config.paths.feed, "/rss.xml");
        assert_eq!(config.paths.blog_prefix, "/blog/");
        assert_eq!(config.paths.home, "/");
    }

    #[test]
    fn test_site_section_only() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[site]\ntitle = \"t\"\nbase_url = \"https://t.example\"\n");
        let config = Config::load(&path).unwrap();

        assert_eq!(config.build.templates_dir, "templates");
        assert_eq!(config.build.static_dir, "static");
        assert_eq!(config.build.home_limit, 5);
        assert_eq!(config.paths.feed, "/atom.xml");
    }

    #[test]
    fn test_load_with_env_reads_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_with_env(&write(&dir, SITE)).unwrap();

        assert_eq!(config.site.base_url, "https://notes.example.com");
        assert_eq!(config.build.blog_dir, "posts");
    }

    #[test]
    fn test_missing_site_section() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&write(&dir, "[build]\nhome_limit = 2\n")).unwrap_err();
        assert!(matches!(err, CoreError::Config { source: Some(_), .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("sitepack.toml")).unwrap_err();
        assert!(err.to_string().ends_with("sitepack.toml not found"));
    }

    #[test]
    fn test_rejects_unusable_values() {
        let base = Config::new("Notes", "https://example.com");
        assert!(base.validate().is_ok());

        let mut c = base.clone();
        c.site.title = "  ".into();
        assert!(c.validate().unwrap_err().to_string().contains("site.title"));

        let mut c = base.clone();
        c.build.home_limit = 0;
        assert!(c.validate().is_err());

        let mut c = base.clone();
        c.paths.feed = "atom.xml".into();
        assert!(c.validate().unwrap_err().to_string().contains("paths.feed"));

        let mut c = base;
        c.paths.blog_prefix = "/blog".into();
        assert!(c.validate().unwrap_err().to_string().contains("trailing"));
    }

    #[test]
    fn test_url_for() {
        let config = Config::new("Notes", "https://example.com/");

        assert_eq!(config.url_for("/blog/hello"), "https://example.com/blog/hello");
        assert_eq!(config.url_for("atom.xml"), "https://example.com/atom.xml");
        assert_eq!(config.url_for("/"), "https://example.com/");
    }
}
