//! Index of every loaded document's metadata

use std::cmp::Ordering;

use super::{Document, PageMeta, PageType};

/// Metadata of all documents, available to every page while it is built
#[derive(Debug, Clone, Default)]
pub struct SiteIndex {
    pub entries: Vec<PageMeta>,
}

impl SiteIndex {
    pub fn from_documents(documents: &[Document]) -> Self {
        Self {
            entries: documents.iter().map(|doc| doc.meta.clone()).collect(),
        }
    }

    /// Non-draft pages
    pub fn published(&self) -> impl Iterator<Item = &PageMeta> {
        self.entries.iter().filter(|meta| !meta.draft)
    }

    /// Non-draft articles and scraps, newest first
    pub fn blog_entries(&self) -> Vec<&PageMeta> {
        let mut entries: Vec<_> = self
            .published()
            .filter(|meta| meta.page_type.is_blog_entry())
            .collect();
        entries.sort_by(|a, b| newest_first(a, b));
        entries
    }

    /// Non-draft references, by title
    pub fn references(&self) -> Vec<&PageMeta> {
        let mut entries: Vec<_> = self
            .published()
            .filter(|meta| meta.page_type == PageType::Reference)
            .collect();
        entries.sort_by(|a, b| a.title.cmp(&b.title));
        entries
    }
}

/// Order by published date, newest first; undated documents go last
pub fn newest_first(a: &PageMeta, b: &PageMeta) -> Ordering {
    match (&a.published, &b.published) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.title.cmp(&b.title),
    }
}
