use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::json;

use super::catalog::DiscountCatalog;
use super::cep::format_cep;
use super::service::{EligibilityRequest, QuoteRequest, QuoteService, QuoteServiceError};

/// Router builder exposing HTTP endpoints for eligibility and quoting.
pub fn enrollment_router<C>(service: Arc<QuoteService<C>>) -> Router
where
    C: DiscountCatalog + 'static,
{
    Router::new()
        .route(
            "/api/v1/enrollment/eligibility",
            post(eligibility_handler::<C>),
        )
        .route("/api/v1/enrollment/quote", post(quote_handler::<C>))
        .route("/api/v1/enrollment/cep/:cep", get(cep_handler::<C>))
        .with_state(service)
}

pub(crate) async fn eligibility_handler<C>(
    State(service): State<Arc<QuoteService<C>>>,
    axum::Json(request): axum::Json<EligibilityRequest>,
) -> Response
where
    C: DiscountCatalog + 'static,
{
    match service.eligibility(&request, Utc::now()) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn quote_handler<C>(
    State(service): State<Arc<QuoteService<C>>>,
    axum::Json(request): axum::Json<QuoteRequest>,
) -> Response
where
    C: DiscountCatalog + 'static,
{
    match service.quote(&request, Utc::now()) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cep_handler<C>(
    State(service): State<Arc<QuoteService<C>>>,
    Path(cep): Path<String>,
) -> Response
where
    C: DiscountCatalog + 'static,
{
    let classification = service.classify(&cep);
    let payload = json!({
        "cep": format_cep(&cep),
        "category": classification.category,
        "district": classification.district,
        "matched": classification.matched,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn error_response(error: QuoteServiceError) -> Response {
    match error {
        QuoteServiceError::UnknownDiscount(_) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
