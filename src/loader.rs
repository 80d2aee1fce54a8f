use log::{debug, warn};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::Notify;

use crate::config::{FailurePolicy, HasMoreRule, InitialLoadMode, LoaderConfig};
use crate::error::ConfigError;
use crate::item::Identified;
use crate::source::PageSource;

/// Why a load request did not issue a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another fetch is still in flight.
    InFlight,
    /// The last reported `totalCount` says there is nothing left.
    Exhausted,
    /// `activate` has already run, or another `activate` call got there first.
    AlreadyActivated,
}

/// Result of one `activate` or `load_more` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded {
        page: u32,
        /// Items the server returned for this page.
        fetched: usize,
        /// Items that were new to the collection.
        added: usize,
        total_count: u64,
    },
    /// The fetch failed. The failure has been logged and the collection is
    /// unchanged.
    Failed { page: u32 },
    Skipped(SkipReason),
}

/// Point-in-time copy of the loader state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSnapshot<T> {
    pub items: Vec<T>,
    pub cursor: u32,
    pub has_more: bool,
    pub is_loading: bool,
}

struct LoaderState<T: Identified> {
    items: Vec<T>,
    seen: HashSet<T::Id>,
    cursor: u32,
    has_more: bool,
    is_loading: bool,
    activated: bool,
}

impl<T: Identified> LoaderState<T> {
    fn new(initial_items: Vec<T>, cursor: u32) -> Self {
        let mut state = LoaderState {
            items: Vec::with_capacity(initial_items.len()),
            seen: HashSet::new(),
            cursor,
            has_more: true,
            is_loading: false,
            activated: false,
        };
        state.merge(initial_items);
        state
    }

    /// Union by id: items already present keep their position, new ones are
    /// appended in the order given. Returns the number appended.
    fn merge(&mut self, incoming: Vec<T>) -> usize {
        let before = self.items.len();
        for item in incoming {
            if self.seen.insert(item.id()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    fn replace(&mut self, incoming: Vec<T>) -> usize {
        self.items.clear();
        self.seen.clear();
        self.merge(incoming)
    }
}

pub(crate) struct Inner<S: PageSource>
where
    S::Item: Identified,
{
    source: S,
    config: LoaderConfig,
    state: Mutex<LoaderState<S::Item>>,
    /// Signalled each time a fetch finishes.
    idle: Notify,
}

/// Clears `is_loading` when a fetch finishes or its future is dropped.
struct LoadingGuard<'a, T: Identified> {
    state: &'a Mutex<LoaderState<T>>,
    idle: &'a Notify,
}

impl<T: Identified> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        lock_state(self.state).is_loading = false;
        self.idle.notify_waiters();
    }
}

fn lock_state<T: Identified>(state: &Mutex<LoaderState<T>>) -> MutexGuard<'_, LoaderState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Copy)]
enum Apply {
    Replace,
    Merge,
}

/// Incrementally grows a deduplicated item collection from a paged list
/// endpoint.
///
/// The loader is a handle: clones share the same state, so one clone can be
/// handed to a sentinel observer while another is read by the view. At most
/// one fetch is in flight at any time; a trigger that arrives while a fetch
/// is pending is skipped rather than queued.
///
/// # Examples
/// ```
/// use paged_loader::{FetchError, Identified, LoadOutcome, Page, PagedCollectionLoader, source};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Row { id: u32 }
///
/// impl Identified for Row {
///     type Id = u32;
///     fn id(&self) -> u32 { self.id }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let loader = PagedCollectionLoader::new(
///     source::from_fn(|page: u32| async move {
///         Ok::<_, FetchError>(Page::new(vec![Row { id: page }], 10))
///     }),
///     Vec::new(),
/// );
///
/// assert!(matches!(loader.activate().await, LoadOutcome::Loaded { page: 2, .. }));
/// assert_eq!(loader.items(), vec![Row { id: 2 }]);
/// assert_eq!(loader.cursor(), 3);
/// # }
/// ```
pub struct PagedCollectionLoader<S: PageSource>
where
    S::Item: Identified,
{
    inner: Arc<Inner<S>>,
}

impl<S: PageSource> Clone for PagedCollectionLoader<S>
where
    S::Item: Identified,
{
    fn clone(&self) -> Self {
        PagedCollectionLoader {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> PagedCollectionLoader<S>
where
    S: PageSource,
    S::Item: Identified + Clone,
{
    /// Create a loader with the default configuration
    ///
    /// The first fetch goes to page 2, on the assumption that `initial_items`
    /// is page 1.
    ///
    /// # Arguments
    /// * `source` - Accessor for the remote list endpoint
    /// * `initial_items` - Starting collection, deduplicated by id
    pub fn new(source: S, initial_items: Vec<S::Item>) -> Self {
        Self::build(source, initial_items, LoaderConfig::default())
    }

    /// Create a loader with an explicit configuration
    ///
    /// # Arguments
    /// * `source` - Accessor for the remote list endpoint
    /// * `initial_items` - Starting collection, deduplicated by id
    /// * `config` - Loader settings
    ///
    /// # Returns
    /// * `Result<Self, ConfigError>` - The loader, or the reason `config` was rejected
    pub fn with_config(
        source: S,
        initial_items: Vec<S::Item>,
        config: LoaderConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(source, initial_items, config))
    }

    fn build(source: S, initial_items: Vec<S::Item>, config: LoaderConfig) -> Self {
        let state = LoaderState::new(initial_items, config.start_page);
        PagedCollectionLoader {
            inner: Arc::new(Inner {
                source,
                config,
                state: Mutex::new(state),
                idle: Notify::new(),
            }),
        }
    }

    /// Run the initial load
    ///
    /// Fetches the page at the current cursor once. With the default
    /// `InitialLoadMode::Replace` the fetched items replace the collection,
    /// initial items included; with `Merge` they are merged like any later
    /// page. Later calls return `Skipped(AlreadyActivated)`.
    ///
    /// If a `load_more` is in flight, activation waits for it to finish and
    /// then fetches the page after it; it is never skipped.
    pub async fn activate(&self) -> LoadOutcome {
        let page = loop {
            let idle = self.inner.idle.notified();
            tokio::pin!(idle);
            {
                let mut state = self.lock();
                if state.activated {
                    return LoadOutcome::Skipped(SkipReason::AlreadyActivated);
                }
                if !state.is_loading {
                    state.activated = true;
                    state.is_loading = true;
                    break state.cursor;
                }
                // Registered under the lock so the wake-up cannot be missed
                idle.as_mut().enable();
            }
            debug!("activation waiting for the in-flight load");
            idle.await;
        };

        let apply = match self.inner.config.initial_load {
            InitialLoadMode::Replace => Apply::Replace,
            InitialLoadMode::Merge => Apply::Merge,
        };
        self.fetch_and_apply(page, apply).await
    }

    /// Load the next page
    ///
    /// Does nothing while a fetch is in flight or once `has_more` is false.
    /// Otherwise fetches the page at the cursor, merges it by id, recomputes
    /// `has_more` and advances the cursor. A failed fetch is logged and
    /// leaves the collection and `has_more` untouched.
    pub async fn load_more(&self) -> LoadOutcome {
        let page = {
            let mut state = self.lock();
            if state.is_loading {
                return LoadOutcome::Skipped(SkipReason::InFlight);
            }
            if !state.has_more {
                return LoadOutcome::Skipped(SkipReason::Exhausted);
            }
            state.is_loading = true;
            state.cursor
        };

        self.fetch_and_apply(page, Apply::Merge).await
    }

    async fn fetch_and_apply(&self, page: u32, apply: Apply) -> LoadOutcome {
        let _loading = LoadingGuard {
            state: &self.inner.state,
            idle: &self.inner.idle,
        };

        debug!("fetching page {}", page);
        let result = self.inner.source.fetch_page(page).await;

        let mut state = self.lock();
        match result {
            Ok(fetched) => {
                let before = state.items.len();
                let fetched_len = fetched.items.len();
                let total_count = fetched.total_count;

                let added = match apply {
                    Apply::Replace => state.replace(fetched.items),
                    Apply::Merge => state.merge(fetched.items),
                };

                let compared = match self.inner.config.has_more {
                    HasMoreRule::PreMerge => before,
                    HasMoreRule::PostMerge => state.items.len(),
                };
                state.has_more = (compared as u64) < total_count;
                state.cursor = state.cursor.saturating_add(1);

                debug!(
                    "page {}: {} fetched, {} new, {} of {} held, has_more={}",
                    page,
                    fetched_len,
                    added,
                    state.items.len(),
                    total_count,
                    state.has_more
                );

                LoadOutcome::Loaded {
                    page,
                    fetched: fetched_len,
                    added,
                    total_count,
                }
            }
            Err(e) => {
                warn!("failed to load page {}: {}", page, e);
                if self.inner.config.on_failure == FailurePolicy::Advance {
                    state.cursor = state.cursor.saturating_add(1);
                }
                LoadOutcome::Failed { page }
            }
        }
    }

    /// Current collection, in order.
    pub fn items(&self) -> Vec<S::Item> {
        self.lock().items.clone()
    }

    pub fn snapshot(&self) -> LoaderSnapshot<S::Item> {
        let state = self.lock();
        LoaderSnapshot {
            items: state.items.clone(),
            cursor: state.cursor,
            has_more: state.has_more,
            is_loading: state.is_loading,
        }
    }
}

impl<S> PagedCollectionLoader<S>
where
    S: PageSource,
    S::Item: Identified,
{
    fn lock(&self) -> MutexGuard<'_, LoaderState<S::Item>> {
        lock_state(&self.inner.state)
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    /// Next page number to request.
    pub fn cursor(&self) -> u32 {
        self.lock().cursor
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    pub(crate) fn downgrade(&self) -> Weak<Inner<S>> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(inner: &Weak<Inner<S>>) -> Option<Self> {
        inner.upgrade().map(|inner| PagedCollectionLoader { inner })
    }
}
