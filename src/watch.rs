//! Rebuild on content change.
//!
//! Filesystem events under the content root are filtered to the ones that can
//! change the catalog (content files, ordering files, directories), then
//! debounced: a rebuild starts once no relevant event has arrived for
//! `watch.debounce_ms`. Rebuilds go through [`CatalogStore::rebuild`], so a
//! failed build is logged and the previous catalog keeps being served.

use crate::config::{ContentConfig, SiteConfig};
use crate::store::{CatalogStore, RebuildOutcome};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("watch error: {0}")]
    Notify(#[from] notify::Error),
}

/// Pending changes waiting out the debounce window.
struct WatcherState {
    pending_changes: HashSet<PathBuf>,
    last_change: Option<Instant>,
    debounce: Duration,
}

impl WatcherState {
    fn new(debounce: Duration) -> Self {
        Self {
            pending_changes: HashSet::new(),
            last_change: None,
            debounce,
        }
    }

    fn add_change(&mut self, path: PathBuf) {
        self.pending_changes.insert(path);
        self.last_change = Some(Instant::now());
    }

    fn should_rebuild(&self) -> bool {
        match self.last_change {
            Some(last) => !self.pending_changes.is_empty() && last.elapsed() >= self.debounce,
            None => false,
        }
    }

    fn take_changes(&mut self) -> Vec<PathBuf> {
        let changes: Vec<_> = self.pending_changes.drain().collect();
        self.last_change = None;
        changes
    }
}

/// Whether a changed path can affect the catalog.
///
/// Paths inside skipped directories never matter. Otherwise content files,
/// ordering files, and extension-less paths (directories, which may have been
/// created, renamed, or removed) do.
pub fn is_relevant(path: &Path, root: &Path, content: &ContentConfig) -> bool {
    let Ok(rel) = path.strip_prefix(root) else {
        return false;
    };
    let names: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    let Some((file_name, parents)) = names.split_last() else {
        return false;
    };
    if parents.iter().any(|p| content.is_excluded(p)) {
        return false;
    }

    *file_name == content.ordering_file
        || (!content.is_excluded(file_name)
            && (content.is_content_file(file_name) || Path::new(file_name).extension().is_none()))
}

/// Watch `root` and rebuild the store on relevant changes until `running`
/// is cleared.
pub fn watch(
    store: &CatalogStore,
    root: &Path,
    config: &SiteConfig,
    running: &AtomicBool,
) -> Result<(), WatchError> {
    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
            Err(e) => warn!(error = %e, "watch event error"),
        },
        Config::default(),
    )?;
    watcher.watch(root, RecursiveMode::Recursive)?;
    info!(root = %root.display(), "watching for changes");

    let mut state = WatcherState::new(Duration::from_millis(config.watch.debounce_ms));
    while running.load(Ordering::SeqCst) {
        if let Ok(path) = rx.recv_timeout(POLL_INTERVAL)
            && is_relevant(&path, root, &config.content)
        {
            debug!(path = %path.display(), "content changed");
            state.add_change(path);
        }

        if state.should_rebuild() {
            let changes = state.take_changes();
            info!(changes = changes.len(), "rebuilding catalog");
            // Failures are logged by the store; the previous catalog stays.
            if let Ok(RebuildOutcome::Coalesced) = store.rebuild() {
                debug!("rebuild coalesced into an earlier pass");
            }
        }
    }

    info!("watch stopped");
    Ok(())
}
