//! JSON API for a browser client.
//!
//! # Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/items?zone=&category=&sort=` - Rows of one zone tab
//! - `GET /api/items/:id` - Single item
//! - `POST /api/items` - Add an item (item form body)
//! - `PUT /api/items/:id` - Edit an item (item form body)
//! - `DELETE /api/items/:id` - Delete an item
//! - `POST /api/items/batch-delete` - Delete a list of ids
//! - `POST /api/items/purge-expired` - Delete expired items of a zone
//! - `POST /api/items/purge-category` - Delete a zone's items of one category
//! - `GET /api/zones` - Per-zone counts
//! - `GET /api/settings` - Settings document
//! - `PUT /api/settings/reminder-days` - Update the reminder window
//! - `PUT /api/settings/font-size` - Update the font size preference
//! - `POST /api/categories` - Add a category
//! - `DELETE /api/categories/:name` - Delete a category

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::entities::{AppSettings, FontSize, InventoryItem, StorageZone};
use crate::error::InventoryError;
use crate::form::{FieldError, ItemForm};
use crate::store::InventoryStore;
use crate::view::{row_ids, zone_summaries, CategoryFilter, ItemRow, ListView, SortKey, ZoneSummary};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<InventoryStore>>,
    static_dir: Option<PathBuf>,
    today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(store: InventoryStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            static_dir: None,
            today: None,
        }
    }

    /// Serve a browser client from `dir` for every non-API path
    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Pin "today" (tests); otherwise the local date is used per request
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    fn lock(&self) -> Result<MutexGuard<'_, InventoryStore>, ApiError> {
        self.store
            .lock()
            .map_err(|_| ApiError::internal("store lock poisoned"))
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error body: `{ "error": code, "message": text, "fields": [...] }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    fields: Vec<FieldError>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        let message = err.to_string();
        if err.is_user_error() {
            debug!(error = %message, "request rejected");
        } else {
            error!(error = %message, "storage failure");
        }

        match err {
            InventoryError::ItemNotFound(_) | InventoryError::CategoryNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "not_found", message)
            }
            InventoryError::EmptyCategory | InventoryError::NoCategorySelected => {
                Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
            }
            InventoryError::CategoryInUse(_) | InventoryError::LastCategory(_) => {
                Self::new(StatusCode::CONFLICT, "conflict", message)
            }
            InventoryError::Validation(fields) => Self {
                fields,
                ..Self::new(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", message)
            },
            InventoryError::Storage(_) | InventoryError::Serialization(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.code,
            "message": self.message,
        });
        if !self.fields.is_empty() {
            body["fields"] = json!(self.fields);
        }
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Query for the item list; every field optional
#[derive(Debug, Default, Deserialize)]
pub struct ItemsQuery {
    pub zone: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListResponse {
    pub zone: StorageZone,
    pub category: String,
    pub sort: SortKey,
    pub reminder_days: u32,
    pub items: Vec<ItemRow>,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PurgeExpiredRequest {
    pub zone: String,
}

#[derive(Debug, Deserialize)]
pub struct PurgeCategoryRequest {
    pub zone: String,
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: usize,
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDaysRequest {
    pub reminder_days: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSizeRequest {
    /// null resets to the system size
    pub font_size: Option<FontSize>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub added: bool,
    pub categories: Vec<String>,
}

fn parse_zone(raw: &str) -> ApiResult<StorageZone> {
    raw.parse::<StorageZone>()
        .map_err(|e| ApiError::bad_request(e.to_string()))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// GET /api/items
async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemsQuery>,
) -> ApiResult<Json<ItemListResponse>> {
    let zone = match query.zone.as_deref() {
        Some(raw) => parse_zone(raw)?,
        None => StorageZone::default(),
    };
    let sort = match query.sort.as_deref() {
        Some(raw) => raw.parse::<SortKey>().map_err(ApiError::bad_request)?,
        None => SortKey::default(),
    };
    let category = CategoryFilter::from_param(query.category.as_deref());

    let mut view = ListView::new(zone);
    view.set_sort_key(sort);
    view.set_category(category.clone());

    let store = state.lock()?;
    let reminder_days = store.settings().reminder_days;
    let items = view.rows(store.items(), reminder_days, state.today());

    Ok(Json(ItemListResponse {
        zone,
        category: category.to_string(),
        sort,
        reminder_days,
        items,
    }))
}

/// GET /api/items/:id
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<InventoryItem>> {
    let store = state.lock()?;
    store
        .find_item(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| InventoryError::ItemNotFound(id).into())
}

/// POST /api/items
async fn create_item(
    State(state): State<AppState>,
    Json(form): Json<ItemForm>,
) -> ApiResult<(StatusCode, Json<InventoryItem>)> {
    let mut store = state.lock()?;
    let item = form.submit(&mut store, None)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/items/:id
async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<ItemForm>,
) -> ApiResult<Json<InventoryItem>> {
    let mut store = state.lock()?;
    let existing = store
        .find_item(&id)
        .cloned()
        .ok_or(InventoryError::ItemNotFound(id))?;
    let item = form.submit(&mut store, Some(&existing))?;
    Ok(Json(item))
}

/// DELETE /api/items/:id
async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = state.lock()?;
    if store.delete_item(&id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(InventoryError::ItemNotFound(id).into())
    }
}

/// POST /api/items/batch-delete
async fn batch_delete(
    State(state): State<AppState>,
    Json(request): Json<BatchDeleteRequest>,
) -> ApiResult<Json<DeleteResponse>> {
    let mut store = state.lock()?;
    let deleted = store.delete_items(&request.ids)?;
    Ok(Json(DeleteResponse {
        deleted,
        ids: request.ids,
    }))
}

/// POST /api/items/purge-expired
async fn purge_expired(
    State(state): State<AppState>,
    Json(request): Json<PurgeExpiredRequest>,
) -> ApiResult<Json<DeleteResponse>> {
    let view = ListView::new(parse_zone(&request.zone)?);

    let mut store = state.lock()?;
    let rows = view.rows(store.items(), store.settings().reminder_days, state.today());
    let ids = row_ids(&view.expired_rows(&rows));
    let deleted = store.delete_items(&ids)?;

    Ok(Json(DeleteResponse { deleted, ids }))
}

/// POST /api/items/purge-category
async fn purge_category(
    State(state): State<AppState>,
    Json(request): Json<PurgeCategoryRequest>,
) -> ApiResult<Json<DeleteResponse>> {
    let mut view = ListView::new(parse_zone(&request.zone)?);
    view.set_category(CategoryFilter::from_param(Some(&request.category)));

    let mut store = state.lock()?;
    let rows = view.rows(store.items(), store.settings().reminder_days, state.today());
    let ids = row_ids(&view.category_rows(&rows)?);
    let deleted = store.delete_items(&ids)?;

    Ok(Json(DeleteResponse { deleted, ids }))
}

/// GET /api/zones
async fn list_zones(State(state): State<AppState>) -> ApiResult<Json<Vec<ZoneSummary>>> {
    let store = state.lock()?;
    Ok(Json(zone_summaries(
        store.items(),
        store.settings().reminder_days,
        state.today(),
    )))
}

/// GET /api/settings
async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<AppSettings>> {
    let store = state.lock()?;
    Ok(Json(store.settings().clone()))
}

/// PUT /api/settings/reminder-days
async fn update_reminder_days(
    State(state): State<AppState>,
    Json(request): Json<ReminderDaysRequest>,
) -> ApiResult<Json<AppSettings>> {
    let mut store = state.lock()?;
    store.update_reminder_days(request.reminder_days)?;
    Ok(Json(store.settings().clone()))
}

/// PUT /api/settings/font-size
async fn update_font_size(
    State(state): State<AppState>,
    Json(request): Json<FontSizeRequest>,
) -> ApiResult<Json<AppSettings>> {
    let mut store = state.lock()?;
    store.set_font_size(request.font_size)?;
    Ok(Json(store.settings().clone()))
}

/// POST /api/categories
async fn add_category(
    State(state): State<AppState>,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    let mut store = state.lock()?;
    let added = store.add_category(&request.name)?;
    Ok(Json(CategoryResponse {
        added,
        categories: store.settings().custom_categories.clone(),
    }))
}

/// DELETE /api/categories/:name
async fn delete_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<CategoryResponse>> {
    let mut store = state.lock()?;
    store.delete_category(&name)?;
    Ok(Json(CategoryResponse {
        added: false,
        categories: store.settings().custom_categories.clone(),
    }))
}

// ============================================================================
// Router
// ============================================================================

/// Build the full application router
pub fn create_router(state: AppState) -> Router {
    let static_dir = state.static_dir.clone();

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/items", get(list_items).post(create_item))
        .route("/items/batch-delete", post(batch_delete))
        .route("/items/purge-expired", post(purge_expired))
        .route("/items/purge-category", post(purge_category))
        .route(
            "/items/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/zones", get(list_zones))
        .route("/settings", get(get_settings))
        .route("/settings/reminder-days", put(update_reminder_days))
        .route("/settings/font-size", put(update_font_size))
        .route("/categories", post(add_category))
        .route("/categories/:name", delete(delete_category))
        .with_state(state);

    let app = Router::new().nest("/api", api_routes);

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}
