//! # Image Resolution
//!
//! Images referenced by a page are downloaded next to the Markdown file and
//! rewritten to local paths. The converter only sees the [`ImageResolver`]
//! trait; how a path is produced is up to the implementation.
//!
//! A page is converted twice: first with a [`SourceCollector`] to learn which
//! images will actually be rendered, then, after [`ImageDownloader`] has
//! fetched them, with the resulting [`ResolvedImages`].
//!
//! Download problems (bad URL, network error, non-image response) never fail
//! the run; the image keeps its remote URL instead. Failing to write a
//! downloaded image to disk does fail the run.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use reqwest::Client as ReqwestClient;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::fetch::media_type;
use crate::output::MARKDOWN_FILE_NAME;

/// Longest file name stem kept from an image URL
const MAX_STEM_LEN: usize = 80;

/// Maps an image `src` attribute to a local path
pub trait ImageResolver {
    /// Local path for `src`, or `None` to keep the original reference
    fn resolve(&mut self, src: &str) -> Option<String>;
}

/// Resolver that keeps every image pointing at its original URL
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepRemote;

impl ImageResolver for KeepRemote {
    fn resolve(&mut self, _src: &str) -> Option<String> {
        None
    }
}

/// Records image sources in document order without resolving them
#[derive(Debug, Clone, Default)]
pub struct SourceCollector {
    sources: Vec<String>,
    seen: HashSet<String>,
}

impl SourceCollector {
    /// Distinct sources, first occurrence first
    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

impl ImageResolver for SourceCollector {
    fn resolve(&mut self, src: &str) -> Option<String> {
        if self.seen.insert(src.to_string()) {
            self.sources.push(src.to_string());
        }
        None
    }
}

/// Local paths for the images that were downloaded
#[derive(Debug, Clone, Default)]
pub struct ResolvedImages {
    paths: HashMap<String, String>,
    files: Vec<PathBuf>,
}

impl ResolvedImages {
    /// Files written to disk, one per distinct image
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl ImageResolver for ResolvedImages {
    fn resolve(&mut self, src: &str) -> Option<String> {
        self.paths.get(src).cloned()
    }
}

/// Reasons an image is left pointing at its remote URL
#[derive(Debug, Error)]
pub enum ImageError {
    /// `src` could not be turned into an absolute URL
    #[error("invalid image URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Inline or non-HTTP source
    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),

    /// Network failure
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success response
    #[error("HTTP {0}")]
    Status(u16),

    /// Response is not an image
    #[error("not an image (content-type '{0}')")]
    NotAnImage(String),
}

/// Downloads page images into the output directory
#[derive(Debug)]
pub struct ImageDownloader {
    client: ReqwestClient,
    page_url: Url,
    dir: PathBuf,
    used_names: HashSet<String>,
    by_url: HashMap<Url, String>,
    dir_ready: bool,
}

impl ImageDownloader {
    /// Create a downloader resolving relative sources against `page_url`
    pub fn new(client: ReqwestClient, page_url: Url, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            page_url,
            dir: dir.into(),
            used_names: HashSet::from([MARKDOWN_FILE_NAME.to_string()]),
            by_url: HashMap::new(),
            dir_ready: false,
        }
    }

    /// Download every source in order, one at a time
    ///
    /// Sources that resolve to the same absolute URL share one file.
    pub async fn download_all(&mut self, sources: &[String]) -> Result<ResolvedImages> {
        let mut resolved = ResolvedImages::default();

        for src in sources {
            let url = match self.absolute_url(src) {
                Ok(url) => url,
                Err(e) => {
                    warn!("Keeping remote image {}: {}", src, e);
                    continue;
                }
            };

            if let Some(name) = self.by_url.get(&url) {
                debug!("Image {} already saved as {}", url, name);
                resolved.paths.insert(src.clone(), name.clone());
                continue;
            }

            if let Some((name, path)) = self.download(&url).await? {
                self.by_url.insert(url, name.clone());
                resolved.paths.insert(src.clone(), name);
                resolved.files.push(path);
            }
        }

        info!("Saved {} images", resolved.files.len());
        Ok(resolved)
    }

    fn absolute_url(&self, src: &str) -> std::result::Result<Url, ImageError> {
        let url = self.page_url.join(src)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ImageError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Fetch one image; `Ok(None)` means it is kept remote
    #[instrument(skip(self, url), fields(url = %url))]
    async fn download(&mut self, url: &Url) -> Result<Option<(String, PathBuf)>> {
        let (bytes, content_type) = match self.fetch(url).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Keeping remote image {}: {}", url, e);
                return Ok(None);
            }
        };

        let name = self.claim_name(&file_name_for(url, &content_type));
        let path = self.dir.join(&name);

        if !self.dir_ready {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .map_err(|e| Error::write(&self.dir, e))?;
            self.dir_ready = true;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| Error::write(&path, e))?;

        debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(Some((name, path)))
    }

    async fn fetch(&self, url: &Url) -> std::result::Result<(Vec<u8>, String), ImageError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(media_type)
            .unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(ImageError::NotAnImage(content_type));
        }

        let bytes = response.bytes().await?;
        Ok((bytes.to_vec(), content_type))
    }

    /// Reserve a file name, suffixing `-2`, `-3`, ... on collision
    fn claim_name(&mut self, candidate: &str) -> String {
        let path = Path::new(candidate);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(candidate)
            .to_string();
        let ext = path.extension().and_then(|e| e.to_str()).map(str::to_string);

        let mut name = candidate.to_string();
        let mut counter = 2;
        while self.used_names.contains(&name) {
            name = match &ext {
                Some(ext) => format!("{}-{}.{}", stem, counter, ext),
                None => format!("{}-{}", stem, counter),
            };
            counter += 1;
        }
        self.used_names.insert(name.clone());
        name
    }
}

/// File name derived from the last path segment of the image URL
fn file_name_for(url: &Url, content_type: &str) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    let sanitized: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_start_matches('.');

    let (stem, ext) = match sanitized.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            (stem.to_string(), Some(ext.to_ascii_lowercase()))
        }
        _ => (sanitized.trim_end_matches('.').to_string(), None),
    };

    let mut stem: String = stem.chars().take(MAX_STEM_LEN).collect();
    if stem.is_empty() {
        stem = "image".to_string();
    }

    let ext = ext.unwrap_or_else(|| extension_for(content_type).to_string());
    format!("{}.{}", stem, ext)
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        "image/bmp" => "bmp",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        _ => "img",
    }
}
