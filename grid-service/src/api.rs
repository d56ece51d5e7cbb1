//! HTTP surface for the form, table, map and download collaborators.
//!
//! Every request makes one registry/store call and returns; nothing runs in
//! the background.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use grid_client::{
    domain::{
        AssetKind, NewContactMessage, NewCustomer, NewOutage, NewPointAsset, NewPowerLine, Record,
        Table,
    },
    ErrorClass, GridError, Store,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::MapConfig,
    export::{self, ExportFilter},
    importer,
    map::{MapRenderer, MapView},
    notify::{Notifier, NotifyError},
    registry::AssetRegistry,
};

#[derive(Clone)]
pub struct AppState {
    registry: AssetRegistry,
    renderer: MapRenderer,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(store: Store, map: &MapConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            registry: AssetRegistry::new(store),
            renderer: MapRenderer::new(map),
            notifier,
        }
    }

    fn store(&self) -> &Store {
        self.registry.store()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tables/:table", get(list_table).delete(clear_table))
        .route("/tables/:table/:id", delete(delete_record))
        .route("/tables/:table/import", post(import_table))
        .route("/tables/:table/export", get(export_table))
        .route("/customers", post(submit_customer))
        .route("/assets/:kind", post(submit_point_asset))
        .route("/power_lines", post(submit_power_line))
        .route("/contact_center", post(submit_contact_message))
        .route("/contact_center/:id/response", post(respond_to_message))
        .route("/outages", post(report_outage))
        .route("/map", get(map_view))
        .route("/map/geojson", get(map_geojson))
        .route("/notifications", post(send_notification))
        .with_state(state)
}

/// `axum::Json` with rejections reported as `ApiError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

pub enum ApiError {
    Grid(GridError),
    Notify(NotifyError),
    /// Body, path or query string that does not fit the route.
    Request(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Request(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Request(format!("invalid path: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Request(format!("invalid query string: {}", rejection.body_text()))
    }
}

impl From<GridError> for ApiError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<NotifyError> for ApiError {
    fn from(e: NotifyError) -> Self {
        Self::Notify(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            Self::Grid(e) => {
                let (status, error) = match e.class() {
                    ErrorClass::BadInput => (StatusCode::BAD_REQUEST, "bad_input"),
                    ErrorClass::NotFound => (StatusCode::NOT_FOUND, "not_found"),
                    ErrorClass::Conflict => (StatusCode::CONFLICT, "conflict"),
                    ErrorClass::Storage => {
                        tracing::error!(error = %e, "store failure while handling request");
                        (StatusCode::SERVICE_UNAVAILABLE, "storage_failure")
                    }
                };
                (status, error, e.user_message())
            }
            Self::Notify(e) => {
                tracing::warn!(error = %e, "notification failed");
                (StatusCode::BAD_GATEWAY, "notification_failed", e.to_string())
            }
            Self::Request(message) => {
                tracing::debug!(%message, "request rejected");
                (StatusCode::BAD_REQUEST, "bad_input", message)
            }
        };
        metrics::counter!("http_api_errors_total", "error" => error).increment(1);
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct FilterParams {
    column: Option<String>,
    value: Option<String>,
}

impl FilterParams {
    fn into_filter(self, table: Table) -> Result<Option<ExportFilter>, GridError> {
        match self.column {
            None => Ok(None),
            Some(column) => {
                let raw = self.value.unwrap_or_default();
                ExportFilter::parse(table, &column, &raw).map(Some)
            }
        }
    }
}

#[derive(Serialize)]
struct Created {
    id: i64,
}

fn created(id: i64) -> (StatusCode, Json<Created>) {
    (StatusCode::CREATED, Json(Created { id }))
}

async fn list_table(
    State(state): State<AppState>,
    AppPath(table): AppPath<String>,
    AppQuery(params): AppQuery<FilterParams>,
) -> ApiResult<Json<Vec<Record>>> {
    let table: Table = table.parse()?;
    let records = match params.into_filter(table)? {
        Some(f) => state.store().select_where(table, &f.column, f.value).await?,
        None => state.store().select_all(table).await?,
    };
    Ok(Json(records))
}

#[derive(Serialize)]
struct Removed {
    removed: u64,
}

async fn clear_table(
    State(state): State<AppState>,
    AppPath(table): AppPath<String>,
) -> ApiResult<Json<Removed>> {
    let removed = state.registry.clear_table(table.parse()?).await?;
    Ok(Json(Removed { removed }))
}

async fn delete_record(
    State(state): State<AppState>,
    AppPath((table, id)): AppPath<(String, i64)>,
) -> ApiResult<StatusCode> {
    state.registry.delete_record(table.parse()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
struct Appended {
    appended: u64,
}

async fn import_table(
    State(state): State<AppState>,
    AppPath(table): AppPath<String>,
    body: Bytes,
) -> ApiResult<Json<Appended>> {
    let appended = importer::import_csv(state.store(), table.parse()?, &body).await?;
    Ok(Json(Appended { appended }))
}

async fn export_table(
    State(state): State<AppState>,
    AppPath(table): AppPath<String>,
    AppQuery(params): AppQuery<FilterParams>,
) -> ApiResult<Response> {
    let table: Table = table.parse()?;
    let filter = params.into_filter(table)?;
    let csv = export::export_csv(state.store(), table, filter.as_ref()).await?;
    let disposition = format!("attachment; filename=\"{}\"", export::file_name(table));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

async fn submit_customer(
    State(state): State<AppState>,
    AppJson(customer): AppJson<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    Ok(created(state.registry.submit_customer(&customer).await?))
}

async fn submit_point_asset(
    State(state): State<AppState>,
    AppPath(kind): AppPath<String>,
    AppJson(asset): AppJson<NewPointAsset>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let kind: AssetKind = kind.parse()?;
    Ok(created(state.registry.submit_point_asset(kind, &asset).await?))
}

async fn submit_power_line(
    State(state): State<AppState>,
    AppJson(line): AppJson<NewPowerLine>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    Ok(created(state.registry.submit_power_line(&line).await?))
}

async fn submit_contact_message(
    State(state): State<AppState>,
    AppJson(message): AppJson<NewContactMessage>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    Ok(created(state.registry.submit_contact_message(&message).await?))
}

#[derive(Deserialize)]
struct ResponseBody {
    response: String,
}

async fn respond_to_message(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<ResponseBody>,
) -> ApiResult<StatusCode> {
    state.registry.respond_to_message(id, &body.response).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn report_outage(
    State(state): State<AppState>,
    AppJson(outage): AppJson<NewOutage>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    Ok(created(state.registry.report_outage(&outage).await?))
}

async fn map_view(State(state): State<AppState>) -> ApiResult<Json<MapView>> {
    Ok(Json(state.renderer.render(state.store()).await?))
}

async fn map_geojson(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let view = state.renderer.render(state.store()).await?;
    Ok(Json(view.to_geojson()))
}

#[derive(Deserialize)]
struct NotificationBody {
    message: String,
    recipients: Vec<String>,
}

async fn send_notification(
    State(state): State<AppState>,
    AppJson(body): AppJson<NotificationBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let reply = state.notifier.send(&body.message, &body.recipients).await?;
    Ok(Json(reply))
}
