use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::enrollment::catalog::{CatalogError, Discount, DiscountCatalog, InMemoryCatalog};
use crate::enrollment::cep::CepRangeTable;
use crate::enrollment::router::enrollment_router;
use crate::enrollment::service::QuoteService;

pub(super) fn catalog() -> Vec<Discount> {
    Discount::reference_catalog()
}

pub(super) fn discount(code: &str) -> Discount {
    catalog()
        .into_iter()
        .find(|entry| entry.code == code)
        .unwrap_or_else(|| panic!("reference catalog is missing {code}"))
}

pub(super) fn discount_at(code: &str, percentage: f64) -> Discount {
    let mut entry = discount(code);
    entry.percentage = percentage;
    entry
}

pub(super) fn custom_discount(code: &str, percentage: f64) -> Discount {
    Discount {
        id: code.to_ascii_lowercase(),
        code: code.to_string(),
        name: format!("Desconto {code}"),
        percentage,
        requires_document: false,
        max_cumulative_percentage: 60.0,
        category: None,
        description: None,
    }
}

pub(super) fn ranges() -> CepRangeTable {
    CepRangeTable::reference()
}

pub(super) fn clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 14, 0, 0).single().expect("valid timestamp")
}

pub(super) fn build_service() -> QuoteService<InMemoryCatalog> {
    QuoteService::new(Arc::new(InMemoryCatalog::reference()), Arc::new(ranges()))
}

pub(super) struct UnavailableCatalog;

impl DiscountCatalog for UnavailableCatalog {
    fn discounts(&self) -> Result<Vec<Discount>, CatalogError> {
        Err(CatalogError::Unavailable("catalog offline".to_string()))
    }
}

pub(super) fn enrollment_router_with_service(
    service: QuoteService<InMemoryCatalog>,
) -> axum::Router {
    enrollment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
