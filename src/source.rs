use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::FetchError;
use crate::item::Page;

/// Accessor for one page of a remote list endpoint.
///
/// Page numbers are 1-indexed. The loader never calls `fetch_page`
/// concurrently on the same source.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Item: Send + 'static;

    async fn fetch_page(&self, page: u32) -> Result<Page<Self::Item>, FetchError>;
}

#[async_trait]
impl<S: PageSource> PageSource for Arc<S> {
    type Item = S::Item;

    async fn fetch_page(&self, page: u32) -> Result<Page<Self::Item>, FetchError> {
        (**self).fetch_page(page).await
    }
}

/// A `PageSource` backed by a closure.
pub struct FnSource<T, F> {
    fetch: F,
    _item: PhantomData<fn() -> T>,
}

/// Wrap an async closure `page -> Result<Page<T>, FetchError>` as a source.
///
/// # Examples
/// ```
/// use paged_loader::{FetchError, Page, source};
///
/// let source = source::from_fn(|page: u32| async move {
///     Ok::<_, FetchError>(Page::new(vec![page], 10))
/// });
/// # let _ = source;
/// ```
pub fn from_fn<T, F, Fut>(fetch: F) -> FnSource<T, F>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, FetchError>>,
{
    FnSource {
        fetch,
        _item: PhantomData,
    }
}

#[async_trait]
impl<T, F, Fut> PageSource for FnSource<T, F>
where
    T: Send + 'static,
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Page<T>, FetchError>> + Send + 'static,
{
    type Item = T;

    async fn fetch_page(&self, page: u32) -> Result<Page<T>, FetchError> {
        (self.fetch)(page).await
    }
}
