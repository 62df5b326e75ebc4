//! Layout file watcher.
//!
//! Every change to the watched file is re-loaded and validated; only layouts
//! that pass are forwarded, so a half-saved file never reaches the builder.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::LayoutConfig;

/// Poll interval for platforms without native file notifications.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Watches a layout file and streams validated reloads.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<LayoutConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its reloads.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<LayoutConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Dropping the returned handle stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_content_change(&event.kind) => reload(&path, &tx),
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Layout watch error"),
            },
            Config::default().with_poll_interval(POLL_INTERVAL),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, "Layout watcher started");
        Ok(watcher)
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}

fn reload(path: &Path, tx: &mpsc::UnboundedSender<LayoutConfig>) {
    match load_config(path) {
        Ok(layout) => {
            tracing::info!(path = ?path, mounts = layout.mounts.len(), "Layout reloaded");
            if tx.send(layout).is_err() {
                tracing::debug!("Layout receiver dropped");
            }
        }
        Err(e) => {
            tracing::error!(
                path = ?path,
                error = %e,
                "Failed to reload layout, keeping current one"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reload_forwards_only_valid_layouts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        writeln!(file, "[listener]\nbind_address = \"\"").unwrap();
        reload(file.path(), &tx);
        assert!(rx.try_recv().is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[mounts]]\npath = \"/status\"").unwrap();
        reload(file.path(), &tx);
        assert_eq!(rx.try_recv().unwrap().mounts[0].path, "/status");
    }

    #[test]
    fn test_access_events_ignored() {
        use notify::event::{AccessKind, CreateKind};
        assert!(!is_content_change(&EventKind::Access(AccessKind::Any)));
        assert!(is_content_change(&EventKind::Create(CreateKind::File)));
    }
}
