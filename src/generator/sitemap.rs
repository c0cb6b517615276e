//! Plain text sitemap

use crate::content::SiteIndex;

/// One absolute URL per published page, sorted, newline terminated
pub fn render(index: &SiteIndex) -> String {
    let mut urls: Vec<&str> = index.published().map(|meta| meta.href.as_str()).collect();
    urls.sort_unstable();
    urls.dedup();

    let mut out = urls.join("\n");
    out.push('\n');
    out
}
