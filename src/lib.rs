/*!
# Paged Loader

Client-side infinite scroll for dashboard lists, built in Rust.

## Overview

A list view starts out with its first page of items and grows as the user
scrolls. When the element at the end of the list comes into view, the next
page is fetched from the list endpoint and merged into what is already on
screen. Items are matched by id, so a row that shows up again on a later
page (because the list shifted on the server) is not shown twice.

## Architecture

### Loader
- **PagedCollectionLoader** - Holds the ordered, deduplicated collection,
  the page cursor, and the `is_loading` / `has_more` flags
- **PageSource** - The `fetch_page(n)` accessor the loader calls; closures
  via `source::from_fn`, HTTP endpoints via `HttpPageSource`
- **Sentinel** - Visibility trigger; an attached loader loads the next page
  each time the sentinel enters view

### Application support
- **SessionContext** - Session state injected from the application root
  instead of read ad hoc from storage
- **guard** - One routing decision per navigation (allow or redirect)
- **dates** - Date formatting helpers for list rows

### Demo server (`web` feature)
- **app** - axum server exposing `GET /api/items?page=&pageSize=` over an
  in-memory article catalogue

## Loading rules

- Page 1 is expected to arrive as the initial items, so the first fetch
  asks for page 2 (configurable)
- At most one fetch is in flight; triggers that arrive meanwhile are
  skipped, not queued
- `has_more` is recomputed after every successful fetch from the reported
  `totalCount`
- A failed fetch is logged and leaves the collection untouched; the cursor
  still advances unless `FailurePolicy::Retry` is configured

## Modules

- **item**: `Identified` trait and the `Page` payload
- **source**: `PageSource` trait and closure adapter
- **http_source**: reqwest-backed `PageSource`
- **loader**: `PagedCollectionLoader`
- **sentinel**: Visibility trigger and `Attachment`
- **config**: Loader and server configuration
- **session**: Session context and file store
- **guard**: Route guard
- **dates**: Date formatting
- **error**: Error types
- **app**: Demo list server
*/

pub mod config;
pub mod dates;
pub mod error;
pub mod guard;
pub mod item;
pub mod loader;
pub mod sentinel;
pub mod session;
pub mod source;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod http_source;

/// Re-export the loader-facing types to make them easier to use
pub use config::{FailurePolicy, HasMoreRule, InitialLoadMode, LoaderConfig};
pub use error::*;
pub use item::*;
pub use loader::*;
pub use sentinel::*;
pub use source::PageSource;

#[cfg(feature = "web")]
pub use http_source::HttpPageSource;
