//! HTTP endpoints for accounts, applications, the catalog and scoring.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use crate::accounts::{Admin, Credentials};
use crate::applications::{ApplicationId, ApplicationInput};
use crate::error::ValidationError;
use crate::repository::Store;
use crate::service::{RiskScoringService, ScoringRequest, ServiceError};

type SharedService<S> = Arc<RiskScoringService<S>>;

/// Router builder exposing the credit-risk API.
pub fn api_router<S>(service: Arc<RiskScoringService<S>>) -> Router
where
    S: Store + 'static,
{
    Router::new()
        .route("/register", post(register_handler::<S>))
        .route("/login", post(login_handler::<S>))
        .route(
            "/applications",
            get(list_applications_handler::<S>).post(create_application_handler::<S>),
        )
        .route(
            "/applications/:id",
            get(get_application_handler::<S>)
                .put(update_application_handler::<S>)
                .delete(delete_application_handler::<S>),
        )
        .route("/groups", get(groups_handler::<S>))
        .route("/scoring", post(submit_scoring_handler::<S>))
        .route("/scoring/:id", get(scoring_details_handler::<S>))
        .with_state(service)
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let payload = json!({ "message": self.public_message() });
        (status, Json(payload)).into_response()
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        ValidationError::new("body", format!("Invalid request body: {}", rejection.body_text()))
            .into()
    })
}

fn application_id(path: Result<Path<i64>, PathRejection>) -> Result<ApplicationId, ServiceError> {
    path.map(|Path(id)| ApplicationId(id))
        .map_err(|_| ValidationError::new("id", "Application ID must be a number").into())
}

/// Runs a service call on the blocking pool; storage access and per-application locks block.
async fn blocking<T, F>(work: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .unwrap_or_else(|err| Err(ServiceError::Worker(err.to_string())))
}

fn authenticate<S>(
    service: &RiskScoringService<S>,
    headers: &HeaderMap,
) -> Result<Admin, ServiceError>
where
    S: Store + 'static,
{
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    service.authenticate(authorization)
}

pub(crate) async fn register_handler<S>(
    State(service): State<SharedService<S>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Response
where
    S: Store + 'static,
{
    let result = blocking(move || {
        let credentials = body(payload)?;
        service.register(&credentials)
    })
    .await;
    match result {
        Ok(admin) => {
            let payload = json!({ "id": admin.id, "email": admin.email });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn login_handler<S>(
    State(service): State<SharedService<S>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Response
where
    S: Store + 'static,
{
    let result = blocking(move || {
        let credentials = body(payload)?;
        service.login(&credentials)
    })
    .await;
    match result {
        Ok(token) => (StatusCode::OK, Json(json!({ "access_token": token }))).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_applications_handler<S>(
    State(service): State<SharedService<S>>,
    headers: HeaderMap,
) -> Response
where
    S: Store + 'static,
{
    let result = blocking(move || {
        let admin = authenticate(&service, &headers)?;
        service.list_applications(&admin)
    })
    .await;
    match result {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn create_application_handler<S>(
    State(service): State<SharedService<S>>,
    headers: HeaderMap,
    payload: Result<Json<ApplicationInput>, JsonRejection>,
) -> Response
where
    S: Store + 'static,
{
    let result = blocking(move || {
        let admin = authenticate(&service, &headers)?;
        let input = body(payload)?;
        service.create_application(&admin, input)
    })
    .await;
    match result {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn get_application_handler<S>(
    State(service): State<SharedService<S>>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Response
where
    S: Store + 'static,
{
    let result = blocking(move || {
        let admin = authenticate(&service, &headers)?;
        let id = application_id(path)?;
        service.get_application(&admin, id)
    })
    .await;
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn update_application_handler<S>(
    State(service): State<SharedService<S>>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ApplicationInput>, JsonRejection>,
) -> Response
where
    S: Store + 'static,
{
    let result = blocking(move || {
        let admin = authenticate(&service, &headers)?;
        let id = application_id(path)?;
        let input = body(payload)?;
        service.update_application(&admin, id, input)
    })
    .await;
    match result {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn delete_application_handler<S>(
    State(service): State<SharedService<S>>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Response
where
    S: Store + 'static,
{
    let result = blocking(move || {
        let admin = authenticate(&service, &headers)?;
        let id = application_id(path)?;
        service.delete_application(&admin, id)
    })
    .await;
    match result {
        Ok(()) => {
            let payload = json!({ "message": "Application deleted successfully" });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn groups_handler<S>(
    State(service): State<SharedService<S>>,
    headers: HeaderMap,
) -> Response
where
    S: Store + 'static,
{
    let result = blocking(move || {
        authenticate(&service, &headers)?;
        service.catalog()
    })
    .await;
    match result {
        Ok(catalog) => (StatusCode::OK, Json(catalog)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn submit_scoring_handler<S>(
    State(service): State<SharedService<S>>,
    headers: HeaderMap,
    payload: Result<Json<ScoringRequest>, JsonRejection>,
) -> Response
where
    S: Store + 'static,
{
    let result = blocking(move || {
        let admin = authenticate(&service, &headers)?;
        let request = body(payload)?;
        service.submit_scoring(&admin, request)
    })
    .await;
    match result {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn scoring_details_handler<S>(
    State(service): State<SharedService<S>>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Response
where
    S: Store + 'static,
{
    let result = blocking(move || {
        let admin = authenticate(&service, &headers)?;
        let id = application_id(path)?;
        service.scoring_details(&admin, id)
    })
    .await;
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => err.into_response(),
    }
}
