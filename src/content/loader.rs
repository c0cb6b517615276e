//! Content loader - loads documents and finds static assets in the content directory

use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::Document;
use crate::error::{BuildError, Result};
use crate::Site;

/// Everything found in the content directory
#[derive(Debug, Default)]
pub struct Content {
    pub documents: Vec<Document>,
    /// Static files, relative to the content directory
    pub assets: Vec<PathBuf>,
}

/// Loads content from the content directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    exclude: Vec<Pattern>,
}

impl<'a> ContentLoader<'a> {
    pub fn new(site: &'a Site) -> Self {
        let exclude = site
            .config
            .exclude
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::warn!("Ignoring invalid exclude pattern {:?}: {}", p, e);
                    None
                }
            })
            .collect();
        Self { site, exclude }
    }

    /// Load all documents and list all assets.
    /// A document that fails to load is logged and skipped.
    pub fn load(&self) -> Result<Content> {
        let content_dir = &self.site.content_dir;
        if !content_dir.exists() {
            tracing::warn!("Content directory {:?} does not exist", content_dir);
            return Ok(Content::default());
        }

        let mut content = Content::default();

        for entry in WalkDir::new(content_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(content_dir).unwrap_or(path);
            if self.is_excluded(relative) {
                tracing::debug!("Excluded {:?}", relative);
                continue;
            }

            if is_markdown_file(path) {
                match self.load_document(path, relative) {
                    Ok(doc) => content.documents.push(doc),
                    Err(e) => tracing::warn!("Failed to load {:?}: {}", path, e),
                }
            } else {
                content.assets.push(relative.to_path_buf());
            }
        }

        tracing::debug!(
            "Loaded {} documents and {} assets",
            content.documents.len(),
            content.assets.len()
        );

        Ok(content)
    }

    /// Load a single document
    pub fn load_document(&self, path: &Path, relative: &Path) -> Result<Document> {
        let text = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        Document::parse(
            relative.to_path_buf(),
            path.to_path_buf(),
            &text,
            &self.site.config,
        )
        .map_err(|e| BuildError::FrontMatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
