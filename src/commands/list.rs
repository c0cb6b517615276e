//! List site content

use anyhow::Result;
use std::collections::HashMap;

use crate::content::loader::ContentLoader;
use crate::content::{newest_first, Document, PageType};
use crate::helpers::date;
use crate::Site;

/// List documents, all of them or those of one type, or the tags in use
pub fn run(site: &Site, content_type: Option<&str>) -> Result<()> {
    let content = ContentLoader::new(site).load()?;
    for line in lines(&content.documents, content_type)? {
        println!("{}", line);
    }
    Ok(())
}

fn lines(documents: &[Document], content_type: Option<&str>) -> Result<Vec<String>> {
    let Some(content_type) = content_type else {
        return Ok(document_lines("Documents", documents.iter().collect()));
    };

    if matches!(content_type, "tag" | "tags") {
        return Ok(tag_lines(documents));
    }

    let singular = content_type.strip_suffix('s').unwrap_or(content_type);
    let Some(page_type) = PageType::parse(singular) else {
        anyhow::bail!(
            "Unknown type: {}. Available: page, blog, article, scrap, reference, tag",
            content_type
        );
    };

    let selected = documents
        .iter()
        .filter(|doc| doc.meta.page_type == page_type)
        .collect();
    Ok(document_lines(&format!("{}s", page_type), selected))
}

fn document_lines(heading: &str, mut documents: Vec<&Document>) -> Vec<String> {
    documents.sort_by(|a, b| newest_first(&a.meta, &b.meta));

    let mut lines = vec![format!("{} ({}):", heading, documents.len())];
    for doc in documents {
        let published = doc
            .meta
            .published
            .as_ref()
            .map(date::short)
            .unwrap_or_else(|| "----------".to_string());
        let draft = if doc.meta.draft { " (draft)" } else { "" };
        lines.push(format!(
            "  {} - {}{} [{}]",
            published,
            doc.meta.title,
            draft,
            doc.source.display()
        ));
    }
    lines
}

fn tag_lines(documents: &[Document]) -> Vec<String> {
    let mut tags: HashMap<&str, usize> = HashMap::new();
    for doc in documents {
        for tag in &doc.meta.tags {
            *tags.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut tags: Vec<_> = tags.into_iter().collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let mut lines = vec![format!("Tags ({}):", tags.len())];
    lines.extend(
        tags.into_iter()
            .map(|(tag, count)| format!("  {} ({})", tag, count)),
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    fn documents() -> Vec<Document> {
        let config = SiteConfig::default();
        [
            ("about.md", "# About\n"),
            (
                "articles/old.md",
                "---\npublished: 2023-03-01\ntags: css\n---\n# Old\n",
            ),
            (
                "articles/new.md",
                "---\npublished: 2024-05-01\ndraft: true\ntags: [css, rust]\n---\n# New\n",
            ),
        ]
        .into_iter()
        .map(|(path, content)| Document::parse(path.into(), path.into(), content, &config).unwrap())
        .collect()
    }

    #[test]
    fn test_list_type() {
        let docs = documents();
        assert_eq!(
            lines(&docs, Some("articles")).unwrap(),
            vec![
                "articles (2):",
                "  2024-05-01 - New (draft) [articles/new.md]",
                "  2023-03-01 - Old [articles/old.md]",
            ]
        );
        assert_eq!(lines(&docs, None).unwrap().len(), 4);
    }

    #[test]
    fn test_list_tags() {
        assert_eq!(
            lines(&documents(), Some("tags")).unwrap(),
            vec!["Tags (2):", "  css (2)", "  rust (1)"]
        );
    }

    #[test]
    fn test_unknown_type() {
        assert!(lines(&documents(), Some("posts")).is_err());
    }
}
