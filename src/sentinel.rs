//! Visibility trigger for the loader.
//!
//! A `Sentinel` stands in for the element at the end of a rendered list.
//! Whatever watches the viewport reports visibility changes to it, and an
//! attached loader loads the next page each time the sentinel enters view.

use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::item::Identified;
use crate::loader::PagedCollectionLoader;
use crate::source::PageSource;

/// Current state of a sentinel as seen by its subscribers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visibility {
    pub visible: bool,
    /// Number of times the sentinel has entered view.
    pub entries: u64,
}

/// Attachment point observed by a viewport watcher.
#[derive(Debug)]
pub struct Sentinel {
    tx: watch::Sender<Visibility>,
}

impl Default for Sentinel {
    fn default() -> Self {
        Self::new()
    }
}

impl Sentinel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Visibility::default());
        Sentinel { tx }
    }

    /// Report the sentinel's visibility. Repeating the current value is a
    /// no-op; only a hidden-to-visible change counts as entering view.
    pub fn set_visible(&self, visible: bool) {
        self.tx.send_if_modified(|state| {
            if state.visible == visible {
                return false;
            }
            state.visible = visible;
            if visible {
                state.entries += 1;
            }
            true
        });
    }

    pub fn is_visible(&self) -> bool {
        self.tx.borrow().visible
    }

    /// How many times the sentinel has entered view so far.
    pub fn entries(&self) -> u64 {
        self.tx.borrow().entries
    }

    /// Watch the sentinel. The receiver is notified on every change of
    /// visibility; `entries` tells entries apart even when changes coalesce.
    pub fn subscribe(&self) -> watch::Receiver<Visibility> {
        self.tx.subscribe()
    }
}

/// A live subscription of a loader to a sentinel.
///
/// Dropping the attachment (or calling `detach`) stops the observer task;
/// no load is triggered against the loader after that.
#[derive(Debug)]
pub struct Attachment {
    task: JoinHandle<()>,
}

impl Attachment {
    /// Stop observing. The observer task is aborted by `Drop`.
    pub fn detach(self) {}

    pub fn is_attached(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl<S> PagedCollectionLoader<S>
where
    S: PageSource,
    S::Item: Identified + Clone,
{
    /// Observe `sentinel` and call `load_more` each time it enters view
    ///
    /// If the sentinel is already visible when attached, that counts as one
    /// entry. Entries that happen while a load is in flight are dropped, the
    /// same way a direct `load_more` call would be skipped.
    ///
    /// The observer only holds a weak reference to the loader state. It ends
    /// as soon as the sentinel is dropped, or at the next entry after every
    /// loader handle is gone.
    /// Must be called from within a Tokio runtime.
    ///
    /// # Arguments
    /// * `sentinel` - The sentinel to observe
    ///
    /// # Returns
    /// * `Attachment` - Handle that detaches the observer when dropped
    pub fn attach(&self, sentinel: &Sentinel) -> Attachment {
        let weak = self.downgrade();
        let mut rx = sentinel.subscribe();

        // Baseline is taken here, not in the task, so entries made before
        // the task first runs are still seen as new.
        let initial = *rx.borrow_and_update();
        let mut handled = if initial.visible {
            initial.entries.saturating_sub(1)
        } else {
            initial.entries
        };

        let task = tokio::spawn(async move {
            loop {
                let entries = rx.borrow_and_update().entries;
                if entries != handled {
                    let Some(loader) = PagedCollectionLoader::upgrade(&weak) else {
                        break;
                    };
                    debug!("sentinel entered view, loading page {}", loader.cursor());
                    loader.load_more().await;
                    handled = rx.borrow_and_update().entries;
                }

                if rx.changed().await.is_err() {
                    break;
                }
            }
        });

        Attachment { task }
    }
}
