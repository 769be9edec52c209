//! End-to-end conversion of one page
//!
//! fetch → parse → collect images → download images → convert →
//! optional transcript clean-up → write `index.md`
//!
//! Everything runs sequentially on the caller's task.

use chrono::{Local, NaiveDate};
use scraper::Html;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::convert::{ConverterConfig, MarkdownConverter};
use crate::error::{Error, Result};
use crate::fetch::{PageFetcher, build_client, parse_url};
use crate::images::{ImageDownloader, SourceCollector};
use crate::output::OutputWriter;
use crate::transcript::clean_transcripts;

/// Per-run options
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Reformat speaker transcripts after conversion
    pub clean_transcripts: bool,

    /// Converter settings
    pub converter: ConverterConfig,
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Path of the written Markdown file
    pub markdown_path: PathBuf,

    /// Number of image files written
    pub images_saved: usize,
}

/// Convert `url` and write it under today's output directory
pub async fn run(url: &str, options: &RunOptions, config: &Config) -> Result<RunReport> {
    run_on(Local::now().date_naive(), url, options, config).await
}

/// Convert `url` as if it were fetched on `date`
#[instrument(skip(options, config))]
pub async fn run_on(
    date: NaiveDate,
    url: &str,
    options: &RunOptions,
    config: &Config,
) -> Result<RunReport> {
    let url = parse_url(url)?;
    let writer = OutputWriter::new(config);
    let location = writer.location(&url, date)?;

    let client = build_client(config)?;
    let html = PageFetcher::new(client.clone()).fetch(&url).await?;

    let document = Html::parse_document(&html);
    let converter = MarkdownConverter::new(options.converter.clone());

    let mut collector = SourceCollector::default();
    converter.convert(&document, &mut collector);
    info!("Found {} images", collector.sources().len());

    let mut downloader = ImageDownloader::new(client, url.clone(), location.dir());
    let mut images = downloader.download_all(collector.sources()).await?;

    let mut markdown = converter.convert(&document, &mut images);
    if options.clean_transcripts {
        markdown = clean_transcripts(&markdown);
    }

    if markdown.trim().is_empty() {
        warn!("Conversion of {} produced no content", url);
        return Err(Error::EmptyContent {
            url: url.to_string(),
        });
    }

    let markdown_path = writer.write_markdown(&location, &markdown).await?;
    info!("Markdown saved to {}", markdown_path.display());

    Ok(RunReport {
        markdown_path,
        images_saved: images.files().len(),
    })
}
