//! # web2md - Save a Web Page as Markdown
//!
//! This crate fetches a single web page, converts its content to Markdown
//! and stores the result together with the page's images in a dated,
//! per-domain directory. Links are kept in the output but never followed.
//!
//! ## Features
//!
//! - Structural HTML to Markdown conversion (headings, lists, emphasis,
//!   links, images, code, quotes)
//! - Heuristic removal of navigation chrome and sharing widgets
//! - Local copies of referenced images, downloaded once per URL
//! - Optional clean-up of speaker transcripts that lost their line breaks
//!
//! ## Example
//!
//! ```rust,no_run
//! use web2md::{Config, RunOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let options = RunOptions {
//!         clean_transcripts: true,
//!         ..RunOptions::default()
//!     };
//!
//!     let report = web2md::run("https://example.com/page", &options, &config).await?;
//!     println!("Markdown saved to: {}", report.markdown_path.display());
//!     Ok(())
//! }
//! ```

mod config;
mod error;

pub mod convert;
pub mod fetch;
pub mod images;
pub mod output;
pub mod pipeline;
pub mod transcript;

pub use config::{BASE_OUTPUT_DIR_ENV, Config, ConfigBuilder, DEFAULT_BASE_OUTPUT_DIR};
pub use convert::html_to_markdown;
pub use error::Error;
pub use pipeline::{RunOptions, RunReport, run, run_on};
pub use transcript::clean_transcripts;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
