//! schema.org structured data (JSON-LD)

use serde_json::{json, Map, Value};

use crate::config::SiteConfig;
use crate::content::{PageMeta, PageType};
use crate::helpers::date;

/// Merge `patch` into `target`: objects recursively, anything else replaces.
/// `null` values in the patch are skipped.
pub fn deep_merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                if value.is_null() {
                    continue;
                }
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => {
            if !patch.is_null() {
                *target = patch;
            }
        }
    }
}

/// Structured data for a page
pub fn structured_data(meta: &PageMeta, config: &SiteConfig) -> Value {
    let mut data = json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "mainEntityOfPage": { "@type": "WebPage", "@id": meta.href },
    });

    let mut base = Map::new();
    if let Some(published) = &meta.published {
        base.insert("datePublished".into(), date::iso(published).into());
    }
    if let Some(modified) = &meta.modified {
        base.insert("dateModified".into(), date::iso(modified).into());
    }
    base.insert("inLanguage".into(), config.language.clone().into());
    if !meta.tags.is_empty() {
        base.insert("keywords".into(), meta.tags.join(",").into());
    }
    base.insert(
        "author".into(),
        json!({ "@type": "Person", "name": meta.author.name, "url": meta.author.href }),
    );

    let publisher = &config.publisher;
    let logo = config.absolute(&publisher.logo);
    base.insert(
        "publisher".into(),
        json!({
            "@type": "Organization",
            "@id": format!("{}/#organization", publisher.href.trim_end_matches('/')),
            "name": publisher.name,
            "logo": { "@type": "ImageObject", "url": logo },
        }),
    );
    deep_merge(&mut data, Value::Object(base));

    match meta.page_type {
        PageType::Article | PageType::Scrap => {
            let image = meta
                .image
                .as_ref()
                .map(|image| config.absolute(&image.src))
                .unwrap_or(logo);
            deep_merge(
                &mut data,
                json!({
                    "headline": meta.title,
                    "description": meta.description,
                    "image": image,
                }),
            );
        }
        PageType::Page | PageType::Blog | PageType::Reference => {
            deep_merge(
                &mut data,
                json!({ "@type": "WebSite", "sameAs": config.same_as }),
            );
        }
    }

    data
}
