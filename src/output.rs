//! Output layout on disk
//!
//! Every run writes into `<base>/<YYYY-MM-DD>/<domain>/`, with the page saved
//! as `index.md` next to its images.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

/// Name of the Markdown file inside an output directory
pub const MARKDOWN_FILE_NAME: &str = "index.md";

/// Directory a single run writes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    dir: PathBuf,
}

impl OutputLocation {
    /// Compute the location for `url` fetched on `date`
    pub fn new(base: &Path, date: NaiveDate, url: &Url) -> Result<Self> {
        let domain = extract_domain(url)?;
        let dir = base
            .join(date.format("%Y-%m-%d").to_string())
            .join(domain);
        Ok(Self { dir })
    }

    /// The directory itself
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the Markdown file
    pub fn markdown_path(&self) -> PathBuf {
        self.dir.join(MARKDOWN_FILE_NAME)
    }
}

/// Extracts the host of a URL for use in the output path
pub fn extract_domain(url: &Url) -> Result<String> {
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidUrl {
            url: url.to_string(),
            reason: "missing host".to_string(),
        })
}

/// Writes converted pages below the configured output root
#[derive(Debug, Clone)]
pub struct OutputWriter {
    base: PathBuf,
}

impl OutputWriter {
    /// Create a writer rooted at the configured output directory
    pub fn new(config: &Config) -> Self {
        Self {
            base: config.base_output_dir.clone(),
        }
    }

    /// Location for `url` fetched on `date`
    pub fn location(&self, url: &Url, date: NaiveDate) -> Result<OutputLocation> {
        OutputLocation::new(&self.base, date, url)
    }

    /// Write the Markdown file, creating the directory if needed
    #[instrument(skip(self, markdown), fields(dir = %location.dir().display()))]
    pub async fn write_markdown(&self, location: &OutputLocation, markdown: &str) -> Result<PathBuf> {
        fs::create_dir_all(location.dir())
            .await
            .map_err(|e| Error::write(location.dir(), e))?;

        let path = location.markdown_path();
        fs::write(&path, markdown)
            .await
            .map_err(|e| Error::write(&path, e))?;

        debug!("Wrote {} bytes to {}", markdown.len(), path.display());
        Ok(path)
    }
}
