//! ramblings: content build pipeline for a personal website and blog
//!
//! Markdown documents are parsed into a syntax tree, run through directive
//! and enrichment passes, and rendered to HTML pages together with an RSS
//! feed, a sitemap and a search index.

pub mod commands;
pub mod config;
pub mod content;
pub mod convert;
pub mod directives;
pub mod error;
pub mod generator;
pub mod hast;
pub mod helpers;
pub mod highlight;
pub mod layout;
pub mod mdast;
pub mod structured_data;
pub mod transformers;

use anyhow::Result;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "_config.yml";

/// A site on disk
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content (source) directory
    pub content_dir: PathBuf,
    /// Output directory
    pub output_dir: PathBuf,
}

impl Site {
    /// Open the site in `base_dir`; without a `_config.yml` the defaults apply
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let output_dir = base_dir.join(&config.output_dir);
        Self {
            config,
            base_dir,
            content_dir,
            output_dir,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    /// Build the site
    pub fn build(&self) -> Result<generator::BuildReport> {
        commands::build::run(self, &commands::build::BuildOptions::default())
    }

    /// Remove the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
