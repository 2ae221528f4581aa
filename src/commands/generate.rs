//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::Folio;

/// Compile all posts and write the site. Any content error aborts the build
/// before a single file is written.
pub fn run(folio: &Folio) -> Result<()> {
    let start = Instant::now();

    let posts = folio.load_posts()?;
    Generator::new(folio)?.generate(&posts)?;

    tracing::info!(
        "Generated {} posts in {:.2}s",
        posts.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Watch content, static assets and the config file, rebuilding the whole
/// site after each burst of changes. Blocks until the watcher shuts down.
pub fn watch(base_dir: &Path) -> Result<()> {
    let folio = Folio::new(base_dir)?;
    let (tx, rx) = std::sync::mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&folio.content_dir, &folio.static_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    let config_path = folio.base_dir.join("_config.yml");
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant(&e.path))
                    .collect();
                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                // Reload so config edits take effect
                match Folio::new(base_dir).and_then(|folio| run(&folio)) {
                    Ok(()) => tracing::info!("Regenerated successfully"),
                    Err(e) => tracing::error!("Generation failed: {:#}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Editor swap files and VCS metadata do not trigger rebuilds
fn is_relevant(path: &Path) -> bool {
    if path
        .components()
        .any(|c| matches!(c.as_os_str().to_str(), Some(".git" | ".DS_Store")))
    {
        return false;
    }
    let path_str = path.to_string_lossy();
    !path_str.ends_with('~') && !path_str.ends_with(".swp")
}
