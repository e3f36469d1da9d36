use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{ContactRequest, FieldEdit, FieldErrors, ServiceCategory};
use super::form::{FormId, FormView, SubmitOutcome};
use super::lead::LeadSink;
use super::registry::FormRegistry;
use super::validation::validate;
use crate::error::AppError;

/// Router builder exposing the contact form endpoints.
pub fn contact_router<S>(registry: Arc<FormRegistry<S>>) -> Router
where
    S: LeadSink + 'static,
{
    Router::new()
        .route("/api/v1/contact/validate", post(validate_handler))
        .route("/api/v1/contact/services", get(services_handler))
        .route("/api/v1/contact/forms", post(open_handler::<S>))
        .route(
            "/api/v1/contact/forms/:form_id",
            get(view_handler::<S>)
                .patch(edit_handler::<S>)
                .delete(close_handler::<S>),
        )
        .route(
            "/api/v1/contact/forms/:form_id/submit",
            post(submit_handler::<S>),
        )
        .with_state(registry)
}

#[derive(Debug, Serialize)]
pub(crate) struct ValidationResponse {
    pub(crate) valid: bool,
    pub(crate) errors: FieldErrors,
}

#[derive(Debug, Serialize)]
pub(crate) struct ServiceOption {
    pub(crate) value: &'static str,
    pub(crate) label: &'static str,
}

pub(crate) async fn validate_handler(
    Json(request): Json<ContactRequest>,
) -> Json<ValidationResponse> {
    let errors = validate(&request);
    Json(ValidationResponse {
        valid: errors.is_empty(),
        errors,
    })
}

pub(crate) async fn services_handler() -> Json<Vec<ServiceOption>> {
    Json(
        ServiceCategory::ALL
            .iter()
            .map(|category| ServiceOption {
                value: category.value(),
                label: category.label(),
            })
            .collect(),
    )
}

pub(crate) async fn open_handler<S>(State(registry): State<Arc<FormRegistry<S>>>) -> Response
where
    S: LeadSink + 'static,
{
    (StatusCode::CREATED, Json(registry.open())).into_response()
}

pub(crate) async fn view_handler<S>(
    State(registry): State<Arc<FormRegistry<S>>>,
    Path(form_id): Path<String>,
) -> Result<Json<FormView>, AppError>
where
    S: LeadSink + 'static,
{
    Ok(Json(registry.view(&FormId(form_id))?))
}

pub(crate) async fn edit_handler<S>(
    State(registry): State<Arc<FormRegistry<S>>>,
    Path(form_id): Path<String>,
    Json(edit): Json<FieldEdit>,
) -> Result<Json<FormView>, AppError>
where
    S: LeadSink + 'static,
{
    Ok(Json(registry.edit(&FormId(form_id), edit)?))
}

pub(crate) async fn submit_handler<S>(
    State(registry): State<Arc<FormRegistry<S>>>,
    Path(form_id): Path<String>,
) -> Result<Response, AppError>
where
    S: LeadSink + 'static,
{
    let response = match registry.submit(&FormId(form_id))? {
        (SubmitOutcome::Accepted, view) => (StatusCode::ACCEPTED, Json(view)).into_response(),
        (SubmitOutcome::Invalid(_), view) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(view)).into_response()
        }
        (SubmitOutcome::Busy(state), view) => {
            let payload = json!({
                "error": format!("form is {}", state.label()),
                "form": view,
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
    };
    Ok(response)
}

pub(crate) async fn close_handler<S>(
    State(registry): State<Arc<FormRegistry<S>>>,
    Path(form_id): Path<String>,
) -> Result<StatusCode, AppError>
where
    S: LeadSink + 'static,
{
    registry.close(&FormId(form_id))?;
    Ok(StatusCode::NO_CONTENT)
}
