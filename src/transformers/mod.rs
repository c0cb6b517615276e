//! HTML tree enrichment pipeline
//!
//! Every page runs through the same ordered list of transformers once it
//! has been laid out. A transformer may opt out per page.

mod plugins;

use crate::config::SiteConfig;
use crate::content::PageMeta;
use crate::error::Result;
use crate::hast;

pub use plugins::{
    Analytics, ArticleHeading, BootScript, Highlight, RelMe, SpeculationRules, Sprites,
};

/// Page being transformed
pub struct TransformContext<'a> {
    pub meta: &'a PageMeta,
    pub config: &'a SiteConfig,
}

/// A pass over a page's HTML tree
pub trait Transformer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the transformer runs for this page
    fn applies(&self, _meta: &PageMeta) -> bool {
        true
    }

    fn transform(&self, tree: &mut hast::Root, ctx: &TransformContext) -> Result<()>;
}

/// Ordered list of transformers
#[derive(Default)]
pub struct Pipeline {
    transformers: Vec<Box<dyn Transformer>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Transformer + 'static>(mut self, transformer: T) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    /// The site's transformers, in order
    pub fn standard(config: &SiteConfig) -> Self {
        let mut pipeline = Self::new();
        if config.speculation_rules {
            pipeline = pipeline.with(SpeculationRules {
                origin_trial: config.origin_trial.clone(),
            });
        }
        pipeline = pipeline
            .with(BootScript)
            .with(ArticleHeading)
            .with(Sprites);
        if config.highlight.enable {
            pipeline = pipeline.with(Highlight::new(&config.highlight));
        }
        if let Some(analytics) = &config.analytics {
            pipeline = pipeline.with(Analytics::new(analytics));
        }
        if !config.me_links.is_empty() {
            pipeline = pipeline.with(RelMe::new(&config.me_links));
        }
        pipeline
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.transformers.iter().map(|t| t.name()).collect()
    }

    /// Run every applicable transformer; stops at the first failure
    pub fn run(&self, tree: &mut hast::Root, ctx: &TransformContext) -> Result<()> {
        for transformer in &self.transformers {
            if !transformer.applies(ctx.meta) {
                continue;
            }
            transformer.transform(tree, ctx)?;
        }
        Ok(())
    }
}
