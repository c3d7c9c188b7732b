//! Source document collection.
//!
//! Lists the blog directory and classifies every file either as a dated
//! markup post or as an opaque passthrough file. Discovery order is strict
//! reverse-lexicographic over file names: with a `YYYY-MM-DD-` prefix this
//! is newest first, as long as nothing after the prefix disturbs the sort.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

/// Content collection errors.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// IO error.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Markup file whose name is not `YYYY-MM-DD-<slug>.<ext>`.
    #[error("{file_name}: markup file name does not match YYYY-MM-DD-<slug>.md")]
    BadFileName { file_name: String },

    /// Date segment that is not a calendar date.
    #[error("{file_name}: invalid date {date:?}: {source}")]
    BadDate {
        file_name: String,
        date: String,
        #[source]
        source: chrono::ParseError,
    },

    /// File name that is not valid UTF-8.
    #[error("invalid content path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

static POST_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.+)\.(?i:md|markdown)$").expect("valid post name regex")
});

/// Whether a file extension marks a markup post.
pub fn is_markup_extension(ext: &str) -> bool {
    matches!(ext.to_lowercase().as_str(), "md" | "markdown")
}

/// Structured result of parsing a post file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostName {
    /// Date segment exactly as written in the file name.
    pub date_str: String,

    /// Parsed calendar date.
    pub date: NaiveDate,

    /// Remainder of the file name without the extension.
    pub slug: String,
}

impl PostName {
    /// Parse `YYYY-MM-DD-<slug>.md`.
    pub fn parse(file_name: &str) -> Result<Self> {
        let captures =
            POST_NAME_RE
                .captures(file_name)
                .ok_or_else(|| CollectorError::BadFileName {
                    file_name: file_name.to_string(),
                })?;

        let date_str = captures[1].to_string();
        let slug = captures[2].to_string();
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|source| {
            CollectorError::BadDate {
                file_name: file_name.to_string(),
                date: date_str.clone(),
                source,
            }
        })?;

        Ok(Self {
            date_str,
            date,
            slug,
        })
    }
}

/// How a source document is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Dated markup post, rendered into an entry.
    Post(PostName),

    /// Any other file, published unmodified.
    Passthrough,
}

/// One file from the blog directory.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Full path on disk.
    pub path: PathBuf,

    /// File name, the sort key.
    pub file_name: String,

    /// Classification.
    pub kind: SourceKind,

    /// Raw file content.
    pub bytes: Vec<u8>,
}

/// Collector for the blog directory.
#[derive(Debug)]
pub struct SourceCollector {
    blog_dir: PathBuf,
}

impl SourceCollector {
    /// Create a new collector over `blog_dir`.
    #[must_use]
    pub fn new(blog_dir: impl Into<PathBuf>) -> Self {
        Self {
            blog_dir: blog_dir.into(),
        }
    }

    /// Read and classify every file, newest first.
    pub fn collect(&self) -> Result<Vec<SourceDocument>> {
        info!(dir = %self.blog_dir.display(), "collecting source documents");

        let mut file_names = self.list_file_names()?;
        file_names.sort_by(|a, b| b.cmp(a));

        let documents = file_names
            .into_iter()
            .map(|file_name| self.read_document(file_name))
            .collect::<Result<Vec<_>>>()?;

        info!(count = documents.len(), "source documents collected");
        Ok(documents)
    }

    /// Non-hidden regular files directly inside the blog directory.
    fn list_file_names(&self) -> Result<Vec<String>> {
        let io_err = |source| CollectorError::Io {
            path: self.blog_dir.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.blog_dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if !path.is_file() {
                continue;
            }

            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| CollectorError::InvalidPath(path.clone()))?;
            if name.starts_with('.') {
                continue;
            }
            names.push(name.to_string());
        }
        Ok(names)
    }

    fn read_document(&self, file_name: String) -> Result<SourceDocument> {
        let path = self.blog_dir.join(&file_name);
        let kind = classify(&path, &file_name)?;
        let bytes = fs::read(&path).map_err(|source| CollectorError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(file = %file_name, ?kind, "collected document");
        Ok(SourceDocument {
            path,
            file_name,
            kind,
            bytes,
        })
    }
}

fn classify(path: &Path, file_name: &str) -> Result<SourceKind> {
    let markup = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(is_markup_extension);

    if markup {
        Ok(SourceKind::Post(PostName::parse(file_name)?))
    } else {
        Ok(SourceKind::Passthrough)
    }
}
