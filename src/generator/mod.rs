//! Generator module - renders every document, copies assets and writes the
//! feed, sitemap and search index

pub mod feed;
pub mod search;
pub mod sitemap;

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::content::loader::{Content, ContentLoader};
use crate::content::{target_file, Document, SiteIndex};
use crate::convert::{self, ConvertOptions};
use crate::directives::{transform_directives, DirectiveContext, Directives};
use crate::error::{self, BuildError};
use crate::hast;
use crate::layout;
use crate::mdast;
use crate::structured_data::structured_data;
use crate::transformers::{Pipeline, TransformContext};
use crate::Site;

use self::feed::FeedItem;
use self::search::SearchEntry;

/// Outcome of a build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: usize,
    pub assets: usize,
    pub failed: usize,
    pub skipped_drafts: usize,
}

/// Static site generator
pub struct Generator {
    site: Site,
    directives: Directives,
    pipeline: Pipeline,
}

impl Generator {
    /// Create a generator with the built-in directives and transformers
    pub fn new(site: &Site) -> Self {
        Self {
            site: site.clone(),
            directives: Directives::builtin(),
            pipeline: Pipeline::standard(&site.config),
        }
    }

    pub fn with_directives(mut self, directives: Directives) -> Self {
        self.directives = directives;
        self
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Build the entire site
    pub fn build(&self) -> Result<BuildReport> {
        let started = Instant::now();
        let output_dir = &self.site.output_dir;

        let content = ContentLoader::new(&self.site).load()?;

        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {:?}", output_dir))?;

        let mut report = BuildReport {
            assets: self.copy_assets(&content)?,
            ..Default::default()
        };

        // Every page can see every other page's metadata
        let index = SiteIndex::from_documents(&content.documents);

        let render_drafts = self.site.config.render_drafts;
        let (pages, drafts): (Vec<&Document>, Vec<&Document>) = content
            .documents
            .iter()
            .partition(|doc| render_drafts || !doc.meta.draft);
        report.skipped_drafts = drafts.len();

        let written: Vec<bool> = pages
            .par_iter()
            .map(|doc| match self.write_page(doc, &index) {
                Ok(path) => {
                    tracing::debug!("Generated: {:?}", path);
                    true
                }
                Err(e) => {
                    tracing::warn!("Failed to build {:?}: {}", doc.source, e);
                    false
                }
            })
            .collect();
        report.pages = written.iter().filter(|ok| **ok).count();
        report.failed = written.len() - report.pages;

        self.write_feed(&content.documents, &index)?;
        self.write_sitemap(&index)?;
        self.write_search_index(&content.documents, &index)?;

        tracing::info!(
            "Generated {} pages and copied {} assets in {:.2?}",
            report.pages,
            report.assets,
            started.elapsed()
        );
        if report.failed > 0 {
            tracing::warn!("{} pages failed", report.failed);
        }

        Ok(report)
    }

    /// Render a document to a complete HTML page
    pub fn render_page(&self, doc: &Document, index: &SiteIndex) -> error::Result<String> {
        let config = &self.site.config;

        let mut tree = doc.tree.clone();
        let ctx = DirectiveContext {
            page: &doc.meta,
            site: index,
        };
        transform_directives(&mut tree, &self.directives, &ctx);

        let fragment = convert::to_hast(&tree, &ConvertOptions::page(&config.shell_user));
        let data = structured_data(&doc.meta, config);
        let mut document = layout::document(&doc.meta, fragment, config, &data);

        let ctx = TransformContext {
            meta: &doc.meta,
            config,
        };
        self.pipeline.run(&mut document, &ctx)?;

        Ok(hast::render(&document))
    }

    /// Body of a document for syndication: no title, plain code blocks,
    /// absolute URLs
    pub fn render_minimal(&self, doc: &Document, index: &SiteIndex) -> hast::Root {
        let mut tree = doc.tree.clone();
        mdast::remove_document_title(&mut tree);
        let ctx = DirectiveContext {
            page: &doc.meta,
            site: index,
        };
        transform_directives(&mut tree, &self.directives, &ctx);

        let mut fragment = convert::to_hast(&tree, &ConvertOptions::minimal());
        feed::absolutize(&mut fragment, &self.site.config);
        fragment
    }

    fn write_page(&self, doc: &Document, index: &SiteIndex) -> error::Result<PathBuf> {
        let html = self.render_page(doc, index)?;
        let path = target_file(&self.site.output_dir, &doc.meta.pathname);
        write(&path, html)?;
        Ok(path)
    }

    /// Copy static files from the content directory
    fn copy_assets(&self, content: &Content) -> Result<usize> {
        for relative in &content.assets {
            let source = self.site.content_dir.join(relative);
            let dest = self.site.output_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {:?}", parent))?;
            }
            fs::copy(&source, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", source, dest))?;
        }
        Ok(content.assets.len())
    }

    fn write_feed(&self, documents: &[Document], index: &SiteIndex) -> Result<()> {
        let config = &self.site.config;

        let mut entries: Vec<&Document> = documents
            .iter()
            .filter(|doc| !doc.meta.draft && doc.meta.page_type.is_blog_entry())
            .collect();
        entries.sort_by(|a, b| crate::content::newest_first(&a.meta, &b.meta));
        if let Some(limit) = config.blog.feed_limit {
            entries.truncate(limit);
        }

        let items: Vec<FeedItem> = entries
            .par_iter()
            .map(|doc| FeedItem {
                meta: &doc.meta,
                content: hast::render_fragment(&self.render_minimal(doc, index)),
            })
            .collect();

        let path = self
            .site
            .output_dir
            .join(config.blog.feed_pathname.trim_start_matches('/'));
        write(&path, feed::render(config, &items))?;
        tracing::info!("Generated {}", config.blog.feed_pathname);
        Ok(())
    }

    fn write_sitemap(&self, index: &SiteIndex) -> Result<()> {
        let path = self.site.output_dir.join("sitemap.txt");
        write(&path, sitemap::render(index))?;
        tracing::info!("Generated sitemap.txt");
        Ok(())
    }

    fn write_search_index(&self, documents: &[Document], index: &SiteIndex) -> Result<()> {
        let entries: Vec<SearchEntry> = documents
            .iter()
            .filter(|doc| !doc.meta.draft && doc.meta.page_type.is_blog_entry())
            .enumerate()
            .map(|(id, doc)| {
                let text = self.render_minimal(doc, index).text_content();
                SearchEntry::new(id, &doc.meta, &text)
            })
            .collect();

        let path = self.site.output_dir.join("search.json");
        write(&path, search::render(&entries)?)?;
        tracing::info!("Generated search.json");
        Ok(())
    }
}

/// Write a file, creating its parent directories
fn write(path: &Path, contents: String) -> error::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| BuildError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site(files: &[(&str, &str)]) -> (TempDir, Site) {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let site = Site::new(dir.path()).unwrap();
        (dir, site)
    }

    fn document(site: &Site, path: &str, content: &str) -> Document {
        Document::parse(path.into(), path.into(), content, &site.config).unwrap()
    }

    #[test]
    fn test_render_page() {
        let (_dir, site) = site(&[]);
        let generator = Generator::new(&site);
        let doc = document(
            &site,
            "articles/a.md",
            "---\npublished: 2024-01-05\n---\n# Hello\n\nSome `code`.\n\n```json\n{}\n```\n",
        );
        let index = SiteIndex::from_documents(std::slice::from_ref(&doc));
        let html = generator.render_page(&doc, &index).unwrap();

        assert!(html.starts_with("<!doctype html>\n"));
        assert!(html.contains("<header>\n"));
        assert!(html.contains("<h1 id=\"hello\">Hello</h1>"));
        assert!(html.contains("<time datetime=\"2024-01-05\">January 5, 2024</time>"));
        assert!(html.contains("<p>Some <code>code</code>.</p>"));
        assert!(html.contains("class=\"language-json hljs\""));
        assert!(html.contains("type=\"speculationrules\""));
    }

    #[test]
    fn test_render_page_with_directive() {
        let (_dir, site) = site(&[]);
        let generator = Generator::new(&site);
        let docs = vec![
            document(&site, "blog.md", "# Blog\n\n::BLOG_INDEX\n"),
            document(
                &site,
                "articles/a.md",
                "---\npublished: 2024-01-05\n---\n# First\n",
            ),
        ];
        let index = SiteIndex::from_documents(&docs);
        let html = generator.render_page(&docs[0], &index).unwrap();
        assert!(html.contains("<ul class=\"index\">"));
        assert!(html.contains("href=\"/articles/a\""));
    }

    #[test]
    fn test_custom_directives_and_pipeline() {
        let (_dir, site) = site(&[]);
        let mut directives = Directives::new();
        directives.register("NOTE", |d, _| {
            Ok(hast::h("aside")
                .class("note")
                .text(mdast::nodes_to_string(&d.children)))
        });
        let generator = Generator::new(&site)
            .with_directives(directives)
            .with_pipeline(Pipeline::new());

        let doc = document(&site, "about.md", "# About\n\n::NOTE[Heads up]\n");
        let html = generator.render_page(&doc, &SiteIndex::default()).unwrap();
        assert!(html.contains(r#"<aside class="note">Heads up</aside>"#));
        assert!(!html.contains("speculationrules"));
        assert!(!html.contains("localStorage"));
    }

    #[test]
    fn test_render_minimal() {
        let (_dir, site) = site(&[]);
        let generator = Generator::new(&site);
        let doc = document(
            &site,
            "articles/a.md",
            "# Title\n\nSee [b](/articles/b).\n\n```shell\n$ ls\n```\n",
        );
        let out = hast::render_fragment(&generator.render_minimal(&doc, &SiteIndex::default()));
        assert!(!out.contains("Title"));
        assert!(out.contains("<a href=\"https://example.org/articles/b\">b</a>"));
        assert!(out.contains("<pre><code class=\"language-shell\">$ ls\n</code></pre>"));
    }

    #[test]
    fn test_build() {
        let (dir, site) = site(&[
            ("content/index.md", "# Home\n"),
            ("content/articles/a.md", "---\npublished: 2024-01-05\n---\n# A\n\nBody A\n"),
            ("content/articles/d.md", "---\ndraft: true\n---\n# D\n"),
            ("content/img/x.png", "png"),
        ]);
        let report = Generator::new(&site).build().unwrap();

        assert_eq!(
            report,
            BuildReport {
                pages: 2,
                assets: 1,
                failed: 0,
                skipped_drafts: 1,
            }
        );

        let dist = dir.path().join("dist");
        assert!(dist.join("index.html").exists());
        assert!(dist.join("articles/a/index.html").exists());
        assert!(!dist.join("articles/d/index.html").exists());
        assert_eq!(fs::read_to_string(dist.join("img/x.png")).unwrap(), "png");

        let feed = fs::read_to_string(dist.join("blog/feed.xml")).unwrap();
        assert!(feed.contains("<link>https://example.org/articles/a</link>"));
        assert!(!feed.contains("/articles/d"));

        let sitemap = fs::read_to_string(dist.join("sitemap.txt")).unwrap();
        assert_eq!(sitemap, "https://example.org\nhttps://example.org/articles/a\n");

        let search = fs::read_to_string(dist.join("search.json")).unwrap();
        assert!(search.contains("\"content\":\"Body A\""));
    }
}
