use crate::config::SiteConfig;
use crate::content::{PageMeta, PageType};
use crate::hast::{h, Element, Node};
use crate::helpers::url::{share_on_hacker_news, share_on_twitter};

/// Link with an icon from the sprite sheet
fn icon(href: &str, title: &str, sprite: &str, config: &SiteConfig) -> Element {
    h("a").attr("href", href).attr("title", title).child(
        h("svg")
            .child(h("title").text(title))
            .child(h("use").attr("href", format!("{}#{}", config.sprites, sprite))),
    )
}

fn blog_links(config: &SiteConfig) -> Vec<Node> {
    let feed_title = format!("{} RSS feed", config.blog.name);
    let social = &config.social;

    let mut links = vec![icon(&config.blog.feed_pathname, &feed_title, "rss", config)];
    if let Some(source) = &social.source {
        links.push(icon(
            source,
            "The content of this website on GitHub",
            "github",
            config,
        ));
    }
    if let Some(mastodon) = &social.mastodon {
        links.push(icon(mastodon, "Me on Mastodon", "mastodon", config));
    }
    if let Some(twitter) = &social.twitter {
        links.push(icon(twitter, "Me on Twitter", "twitter", config));
    }
    if let Some(stats) = &social.stats {
        links.push(icon(stats, "Website statistics", "stats", config));
    }
    links.into_iter().map(Node::from).collect()
}

fn feedback(config: &SiteConfig) -> Vec<Node> {
    let Some(source) = &config.social.source else {
        return Vec::new();
    };
    vec![
        h("p")
            .text("Do you have a question or did you find an issue in this article?")
            .into(),
        h("p")
            .child(h("a").attr("href", source.as_str()).text("Please let me know!"))
            .text(" This website is fully open-sourced at GitHub.")
            .into(),
    ]
}

/// Footer content for a page type
pub fn footer(meta: &PageMeta, config: &SiteConfig) -> Vec<Node> {
    match meta.page_type {
        PageType::Blog => vec![h("p").class("icons").children(blog_links(config)).into()],
        PageType::Article | PageType::Scrap => {
            let mut links = blog_links(config);
            links.push(
                icon(
                    &share_on_twitter(&meta.href, &meta.title),
                    "Share this article on Twitter",
                    "share",
                    config,
                )
                .into(),
            );
            links.push(
                icon(
                    &share_on_hacker_news(&meta.href, &meta.title),
                    "Share this article on Hacker News",
                    "hacker-news",
                    config,
                )
                .into(),
            );

            let mut nodes: Vec<Node> = vec![h("p").class("icons").children(links).into()];
            nodes.extend(feedback(config));
            nodes
        }
        PageType::Page | PageType::Reference => Vec::new(),
    }
}
