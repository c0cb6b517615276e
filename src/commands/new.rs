//! Create a new document

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::PageType;
use crate::Site;

const DEFAULT_SCAFFOLD: &str = "---
published: {{ date }}
draft: true
---

# {{ title }}
";

/// Scaffold a Markdown document for `title` in the directory of its type.
/// A `scaffolds/<type>.md` file in the site root replaces the default template.
pub fn create(site: &Site, title: &str, page_type: PageType) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let target_dir = match page_type.directory() {
        Some(dir) => site.content_dir.join(dir),
        None => site.content_dir.clone(),
    };
    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let scaffold_path = site
        .base_dir
        .join("scaffolds")
        .join(format!("{}.md", page_type));
    let scaffold = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)
            .with_context(|| format!("Failed to read {:?}", scaffold_path))?
    } else {
        DEFAULT_SCAFFOLD.to_string()
    };

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let content = scaffold
        .replace("{{ title }}", title)
        .replace("{{ date }}", &today);

    fs::create_dir_all(&target_dir)?;
    fs::write(&file_path, content).with_context(|| format!("Failed to write {:?}", file_path))?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}
