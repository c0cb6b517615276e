//! Content module - documents, their metadata and the site index

mod document;
mod frontmatter;
pub mod loader;
mod site_index;

pub use document::{pathname_for, target_file, Document, PageMeta, PageType};
pub use frontmatter::{split_tags, FrontMatter};
pub use site_index::{newest_first, SiteIndex};
