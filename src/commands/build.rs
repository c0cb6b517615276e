//! Build the site, optionally rebuilding on changes

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::generator::{BuildReport, Generator};
use crate::Site;

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Options of the build command
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Render documents marked as draft
    pub drafts: bool,
}

impl BuildOptions {
    fn apply(&self, site: &Site) -> Site {
        let mut site = site.clone();
        if self.drafts {
            site.config.render_drafts = true;
        }
        site
    }
}

/// Build the site once
pub fn run(site: &Site, options: &BuildOptions) -> Result<BuildReport> {
    let site = options.apply(site);
    Generator::new(&site).build()
}

/// Rebuild whenever the content or the configuration changes, until Ctrl+C
pub async fn watch(site: &Site, options: BuildOptions) -> Result<()> {
    let (tx, rx) = mpsc::channel::<DebounceEventResult>(16);

    let mut debouncer = new_debouncer(DEBOUNCE, move |res: DebounceEventResult| {
        let _ = tx.blocking_send(res);
    })?;

    debouncer
        .watcher()
        .watch(&site.content_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {:?}", site.content_dir))?;

    let config_path = site.config_path();
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let base_dir = site.base_dir.clone();
    // Configuration changes apply to the next build
    let rebuild = move || {
        let site = Site::new(&base_dir)?;
        run(&site, &options)
    };
    let rebuilds = rebuild_on_events(rx, tokio::signal::ctrl_c(), rebuild).await?;
    tracing::info!("Stopped watching after {} rebuilds", rebuilds);

    Ok(())
}

/// Run `rebuild` on a blocking thread for every batch of events until
/// `shutdown` completes or the event channel closes. A shutdown that fires
/// during a rebuild ends the loop once that rebuild is done.
/// Returns the number of rebuilds.
async fn rebuild_on_events<S, F>(
    mut rx: mpsc::Receiver<DebounceEventResult>,
    shutdown: S,
    rebuild: F,
) -> Result<usize>
where
    S: Future,
    F: Fn() -> Result<BuildReport> + Send + Sync + 'static,
{
    let rebuild = Arc::new(rebuild);
    let mut rebuilds = 0;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(res) = event else { break };
                match res {
                    Ok(events) => {
                        for event in &events {
                            tracing::debug!("Changed: {:?}", event.path);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Watch error: {}", e);
                        continue;
                    }
                }

                tracing::info!("Files changed, rebuilding...");
                let rebuild = Arc::clone(&rebuild);
                let result = tokio::task::spawn_blocking(move || rebuild()).await?;
                rebuilds += 1;
                match result {
                    Ok(report) => tracing::info!("Rebuilt {} pages", report.pages),
                    Err(e) => tracing::error!("Build failed: {:#}", e),
                }
            }
            _ = &mut shutdown => break,
        }
    }

    Ok(rebuilds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::sync::oneshot;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_with_drafts() {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("content/articles");
        fs::create_dir_all(&content).unwrap();
        fs::write(content.join("d.md"), "---\ndraft: true\n---\n# Draft\n").unwrap();
        let site = Site::new(dir.path()).unwrap();

        let report = run(&site, &BuildOptions::default()).unwrap();
        assert_eq!(report.pages, 0);
        assert_eq!(report.skipped_drafts, 1);

        let report = run(&site, &BuildOptions { drafts: true }).unwrap();
        assert_eq!(report.pages, 1);
        assert!(dir.path().join("dist/articles/d/index.html").exists());
        // the site itself is left untouched
        assert!(!site.config.render_drafts);
    }

    #[tokio::test]
    async fn test_shutdown_during_rebuild_stops_watching() {
        let (tx, rx) = mpsc::channel::<DebounceEventResult>(4);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let stop = Mutex::new(Some(stop_tx));

        // Ctrl+C arrives while the first rebuild is still running
        let rebuild = move || {
            if let Some(stop) = stop.lock().unwrap().take() {
                let _ = stop.send(());
            }
            Ok(BuildReport::default())
        };

        tx.send(Ok(Vec::new())).await.unwrap();
        let rebuilds = rebuild_on_events(rx, stop_rx, rebuild).await.unwrap();
        assert_eq!(rebuilds, 1);
        drop(tx);
    }

    #[tokio::test]
    async fn test_closed_channel_ends_watch() {
        let (tx, rx) = mpsc::channel::<DebounceEventResult>(4);
        tx.send(Ok(Vec::new())).await.unwrap();
        tx.send(Ok(Vec::new())).await.unwrap();
        drop(tx);

        let rebuilds = rebuild_on_events(rx, std::future::pending::<()>(), || {
            Ok(BuildReport::default())
        })
        .await
        .unwrap();
        assert_eq!(rebuilds, 2);
    }
}
