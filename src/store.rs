//! The published catalog and its rebuild protocol.
//!
//! A [`CatalogStore`] owns the single shared mutable value in the system: a
//! pointer to the current [`Catalog`]. Readers clone the `Arc` and keep a
//! consistent snapshot for as long as they like; publishing a new catalog is
//! a pointer swap, so a reader sees either the old catalog or the new one.
//!
//! ## Rebuilds
//!
//! Builds never run concurrently. Each [`CatalogStore::rebuild`] call takes a
//! ticket from `requested`, then waits for the build lock. Once it holds the
//! lock:
//!
//! - if a build that started after the ticket was issued has already been
//!   published (`completed >= ticket`), the request is satisfied and returns
//!   [`RebuildOutcome::Coalesced`] without building again
//! - otherwise it records the latest ticket as its target, builds, and on
//!   success publishes and marks the target as completed
//!
//! A burst of change events therefore costs at most one build in flight plus
//! one queued behind it. A failed build publishes nothing: the previous
//! catalog stays current and the error is returned to the caller.

use crate::catalog::{self, Catalog};
use crate::config::SiteConfig;
use crate::error::{BuildError, NotFoundError};
use crate::views::{self, ContentDocument, ListingEntry};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, error, info};

/// Something that can produce a complete catalog.
pub trait CatalogSource: Send + Sync {
    fn build(&self) -> Result<Catalog, BuildError>;
}

/// Builds from a content directory with a fixed configuration.
#[derive(Debug, Clone)]
pub struct ContentDirSource {
    root: PathBuf,
    config: SiteConfig,
}

impl ContentDirSource {
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }
}

impl CatalogSource for ContentDirSource {
    fn build(&self) -> Result<Catalog, BuildError> {
        catalog::build(&self.root, &self.config)
    }
}

/// Result of a successful [`CatalogStore::rebuild`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// This call built and published a new catalog.
    Published { generation: u64, documents: usize },
    /// A build that began after this request already published.
    Coalesced,
}

pub struct CatalogStore {
    source: Box<dyn CatalogSource>,
    current: RwLock<Arc<Catalog>>,
    build_lock: Mutex<()>,
    requested: AtomicU64,
    completed: AtomicU64,
}

impl CatalogStore {
    /// Perform the first build and publish it.
    ///
    /// Fails closed: if the first build fails there is no store at all.
    pub fn open(source: impl CatalogSource + 'static) -> Result<Self, BuildError> {
        let catalog = source.build()?;
        info!(documents = catalog.len(), "initial catalog published");
        Ok(Self {
            source: Box::new(source),
            current: RwLock::new(Arc::new(catalog)),
            build_lock: Mutex::new(()),
            requested: AtomicU64::new(0),
            completed: AtomicU64::new(0),
        })
    }

    /// Snapshot of the published catalog.
    pub fn current(&self) -> Arc<Catalog> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Highest rebuild ticket covered by the published catalog. 0 until the
    /// first successful rebuild.
    pub fn generation(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    /// Number of rebuild requests issued so far.
    pub fn requested(&self) -> u64 {
        self.requested.load(Ordering::SeqCst)
    }

    /// Rebuild from the source and publish on success.
    pub fn rebuild(&self) -> Result<RebuildOutcome, BuildError> {
        let ticket = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = self
            .build_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.completed.load(Ordering::SeqCst) >= ticket {
            debug!(ticket, "rebuild request already satisfied");
            return Ok(RebuildOutcome::Coalesced);
        }

        let target = self.requested.load(Ordering::SeqCst);
        match self.source.build() {
            Ok(catalog) => {
                let documents = catalog.len();
                self.publish(catalog);
                self.completed.store(target, Ordering::SeqCst);
                info!(generation = target, documents, "catalog rebuilt");
                Ok(RebuildOutcome::Published {
                    generation: target,
                    documents,
                })
            }
            Err(e) => {
                error!(error = %e, "rebuild failed, keeping previous catalog");
                Err(e)
            }
        }
    }

    fn publish(&self, catalog: Catalog) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(catalog);
    }

    pub fn listing(&self) -> Vec<ListingEntry> {
        views::listing(&self.current())
    }

    pub fn get_content(&self, slug: &str) -> Result<ContentDocument, NotFoundError> {
        views::get_content(&self.current(), slug)
    }

    pub fn aggregated_export(&self) -> String {
        views::aggregated_export(&self.current())
    }
}
