//! Client side search index

use serde::Serialize;

use crate::content::PageMeta;

/// A searchable document
#[derive(Debug, Serialize)]
pub struct SearchEntry {
    pub id: usize,
    pub title: String,
    pub description: String,
    pub pathname: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl SearchEntry {
    pub fn new(id: usize, meta: &PageMeta, content: &str) -> Self {
        Self {
            id,
            title: meta.title.clone(),
            description: meta.description.clone().unwrap_or_default(),
            pathname: meta.pathname.clone(),
            content: collapse_whitespace(content),
            tags: meta.tags.clone(),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn render(entries: &[SearchEntry]) -> serde_json::Result<String> {
    serde_json::to_string(entries)
}
