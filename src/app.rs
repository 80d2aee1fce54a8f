#![cfg(feature = "web")]

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::dates;
use crate::item::{Identified, Page};

/// Hours between consecutive articles in the generated catalogue.
const PUBLISH_INTERVAL_HOURS: i64 = 6;

/// One entry of the demo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub published_at: DateTime<Utc>,
    /// `published_at` rendered with `dates::format_date`.
    pub published_label: String,
}

impl Identified for Article {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

/// In-memory article list served page by page, newest first.
#[derive(Debug, Clone)]
pub struct Catalogue {
    articles: Vec<Article>,
}

impl Catalogue {
    /// Generate `count` articles, the first published at `newest` and each
    /// following one six hours earlier.
    pub fn generate(count: u64, newest: DateTime<Utc>) -> Self {
        let articles = (1..=count)
            .map(|id| {
                let offset = i64::try_from(id - 1).unwrap_or(i64::MAX);
                let published_at = Duration::try_hours(offset.saturating_mul(PUBLISH_INTERVAL_HOURS))
                    .and_then(|age| newest.checked_sub_signed(age))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                Article {
                    id,
                    title: format!("Article {}", id),
                    published_at,
                    published_label: dates::format_date(published_at),
                }
            })
            .collect();

        Catalogue { articles }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Slice out 1-indexed `page`. Pages past the end are empty but still
    /// report the full count.
    pub fn page(&self, page: u32, page_size: u32) -> Page<Article> {
        let total_count = self.articles.len() as u64;
        let start = (page.saturating_sub(1) as usize).saturating_mul(page_size as usize);

        let items = self
            .articles
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();

        Page::new(items, total_count)
    }
}

pub struct AppState {
    catalogue: Catalogue,
    config: ServerConfig,
}

impl AppState {
    pub fn new(catalogue: Catalogue, config: ServerConfig) -> Self {
        AppState { catalogue, config }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageQuery {
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: Option<String>,
}

/// Build the list server router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/items", get(list_items))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the demo catalogue until the process is stopped
///
/// # Arguments
/// * `config` - Bind address and catalogue settings
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Error if the address cannot be bound or serving fails
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let catalogue = Catalogue::generate(config.catalogue_size, Utc::now());
    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(catalogue, config));

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_items(Query(query): Query<PageQuery>, State(state): State<Arc<AppState>>) -> Response {
    let page = query.page.unwrap_or(1);
    if page == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                status: "error".to_string(),
                message: Some("page numbers start at 1".to_string()),
            }),
        )
            .into_response();
    }

    let page_size = query
        .page_size
        .unwrap_or(state.config.default_page_size)
        .clamp(1, state.config.max_page_size);

    let body = state.catalogue.page(page, page_size);
    debug!(
        "page {} (size {}): {} of {} items",
        page,
        page_size,
        body.items.len(),
        body.total_count
    );

    Json(body).into_response()
}
