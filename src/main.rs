//! CLI entry point for ramblings

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ramblings::commands::build::BuildOptions;
use ramblings::content::PageType;

#[derive(Parser)]
#[command(name = "ramblings")]
#[command(version)]
#[command(about = "Builds a website and blog from Markdown content", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site
    #[command(alias = "b")]
    Build {
        /// Rebuild on changes
        #[arg(short, long)]
        watch: bool,

        /// Render drafts
        #[arg(long)]
        drafts: bool,
    },

    /// Remove the output directory
    Clean,

    /// List documents (page, blog, article, scrap, reference) or tags
    List {
        r#type: Option<String>,
    },

    /// Create a new document
    New {
        /// Title of the new document
        title: String,

        /// Type of document (article, scrap, page, reference)
        #[arg(short, long, default_value = "article", value_parser = parse_page_type)]
        r#type: PageType,
    },

    /// Display version information
    Version,
}

fn parse_page_type(value: &str) -> Result<PageType, String> {
    PageType::parse(value).ok_or_else(|| format!("unknown document type: {}", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "ramblings=debug,info"
    } else {
        "ramblings=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    match cli.command {
        Commands::Build { watch, drafts } => {
            let site = ramblings::Site::new(&base_dir)?;
            let options = BuildOptions { drafts };
            tracing::info!("Building {:?}...", site.base_dir);

            let report = ramblings::commands::build::run(&site, &options)?;
            println!(
                "Built {} pages, copied {} assets ({} failed, {} drafts skipped)",
                report.pages, report.assets, report.failed, report.skipped_drafts
            );

            if watch {
                ramblings::commands::build::watch(&site, options).await?;
            }
        }

        Commands::Clean => {
            let site = ramblings::Site::new(&base_dir)?;
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = ramblings::Site::new(&base_dir)?;
            ramblings::commands::list::run(&site, r#type.as_deref())?;
        }

        Commands::New { title, r#type } => {
            let site = ramblings::Site::new(&base_dir)?;
            let path = ramblings::commands::new::create(&site, &title, r#type)?;
            println!("Created: {}", path.display());
        }

        Commands::Version => {
            println!("ramblings version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
