//! Document and page metadata models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::FrontMatter;
use crate::config::{AuthorConfig, Image, Logo, SiteConfig};
use crate::mdast;

/// Kind of page, drives layout and enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Page,
    Blog,
    Article,
    Scrap,
    Reference,
}

impl PageType {
    /// Page type from a path relative to the content directory
    pub fn from_path(relative: &Path) -> Self {
        let first = relative
            .components()
            .next()
            .and_then(|c| c.as_os_str().to_str())
            .unwrap_or_default();
        let is_nested = relative.components().count() > 1;

        match first {
            "articles" if is_nested => PageType::Article,
            "scraps" if is_nested => PageType::Scrap,
            "references" if is_nested => PageType::Reference,
            "blog.md" => PageType::Blog,
            _ => PageType::Page,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "page" => Some(PageType::Page),
            "blog" => Some(PageType::Blog),
            "article" => Some(PageType::Article),
            "scrap" => Some(PageType::Scrap),
            "reference" => Some(PageType::Reference),
            _ => None,
        }
    }

    /// Articles and scraps are listed in the blog
    pub fn is_blog_entry(self) -> bool {
        matches!(self, PageType::Article | PageType::Scrap)
    }

    /// Content directory where new documents of this type are created
    pub fn directory(self) -> Option<&'static str> {
        match self {
            PageType::Article => Some("articles"),
            PageType::Scrap => Some("scraps"),
            PageType::Reference => Some("references"),
            PageType::Page | PageType::Blog => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Page => "page",
            PageType::Blog => "blog",
            PageType::Article => "article",
            PageType::Scrap => "scrap",
            PageType::Reference => "reference",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Site pathname of a document, e.g. `articles/foo.md` → `/articles/foo`
pub fn pathname_for(relative: &Path) -> String {
    let mut segments: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|c| c.as_os_str().to_str().map(str::to_string))
        .collect();

    if segments.last().map(|s| s == "index").unwrap_or(false) {
        segments.pop();
    }

    format!("/{}", segments.join("/"))
}

/// Output file of a pathname
pub fn target_file(output_dir: &Path, pathname: &str) -> PathBuf {
    let trimmed = pathname.trim_matches('/');
    if trimmed.is_empty() {
        output_dir.join("index.html")
    } else {
        output_dir.join(trimmed).join("index.html")
    }
}

/// Metadata of a page, shared with every stage of the pipeline
#[derive(Debug, Clone)]
pub struct PageMeta {
    pub page_type: PageType,
    pub title: String,
    pub description: Option<String>,
    pub pathname: String,
    /// Absolute URL
    pub href: String,
    pub published: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub draft: bool,
    pub image: Option<Image>,
    pub tags: Vec<String>,
    pub class: Option<String>,
    pub author: AuthorConfig,
    pub logo: Option<Logo>,
    pub stylesheets: Vec<String>,
    pub scripts: Vec<String>,
}

impl PageMeta {
    pub fn new(
        relative: &Path,
        fm: &FrontMatter,
        tree: &mdast::Root,
        config: &SiteConfig,
    ) -> Self {
        let page_type = fm
            .page_type
            .unwrap_or_else(|| PageType::from_path(relative));
        let pathname = pathname_for(relative);
        let defaults = config.defaults_for(page_type);

        let title = fm
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| {
                let heading = mdast::document_title(tree);
                (!heading.is_empty()).then_some(heading)
            })
            .unwrap_or_else(|| config.name.clone());

        let image = match &fm.image {
            Some(src) => Some(Image {
                src: src.clone(),
                alt: title.clone(),
            }),
            None => defaults.image.clone(),
        };

        Self {
            page_type,
            title,
            description: fm.description.clone(),
            href: config.absolute(&pathname),
            pathname,
            published: fm.published_date(),
            modified: fm.modified_date(),
            draft: fm.draft,
            image,
            tags: fm.tags.clone(),
            class: fm.class.clone(),
            author: config.author.clone(),
            logo: defaults.logo,
            stylesheets: defaults.stylesheets,
            scripts: defaults.scripts,
        }
    }
}

/// A loaded Markdown document
#[derive(Debug, Clone)]
pub struct Document {
    /// Source path relative to the content directory
    pub source: PathBuf,
    /// Full source path
    pub full_source: PathBuf,
    pub meta: PageMeta,
    /// Markdown without front-matter
    pub body: String,
    pub tree: mdast::Root,
}

impl Document {
    /// Parse a document from its file contents
    pub fn parse(
        source: PathBuf,
        full_source: PathBuf,
        content: &str,
        config: &SiteConfig,
    ) -> Result<Self, serde_yaml::Error> {
        let (fm, body) = FrontMatter::parse(content)?;
        let tree = mdast::parse(body);
        let meta = PageMeta::new(&source, &fm, &tree, config);

        Ok(Self {
            source,
            full_source,
            meta,
            body: body.to_string(),
            tree,
        })
    }
}
