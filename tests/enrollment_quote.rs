//! Integration scenarios for the enrollment quote pipeline.
//!
//! Scenarios exercise the public service facade and HTTP router end to end:
//! CEP resolution, eligibility, combination validation, and pricing together,
//! without reaching into private modules.

mod common {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use matricula_engine::enrollment::catalog::{Discount, InMemoryCatalog};
    use matricula_engine::enrollment::cep::CepRangeTable;
    use matricula_engine::enrollment::router::enrollment_router;
    use matricula_engine::enrollment::service::QuoteService;

    pub(super) fn clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 14, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    pub(super) fn discount(code: &str) -> Discount {
        Discount::reference_catalog()
            .into_iter()
            .find(|entry| entry.code == code)
            .unwrap_or_else(|| panic!("reference catalog is missing {code}"))
    }

    pub(super) fn build_service() -> QuoteService<InMemoryCatalog> {
        QuoteService::new(
            Arc::new(InMemoryCatalog::reference()),
            Arc::new(CepRangeTable::reference()),
        )
    }

    pub(super) fn build_router() -> axum::Router {
        enrollment_router(Arc::new(build_service()))
    }

    pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }
}

mod quotes {
    use super::common::*;
    use matricula_engine::enrollment::cep::CepCategory;
    use matricula_engine::enrollment::pricing::ApprovalLevel;
    use matricula_engine::enrollment::service::QuoteRequest;

    #[test]
    fn baixa_family_stacks_sibling_and_cash_discounts() {
        let service = build_service();

        let outcome = service
            .quote(
                &QuoteRequest {
                    cep: Some("37705-000".to_string()),
                    trilho: None,
                    base_value: 1000.0,
                    material_value: 150.0,
                    discounts: vec!["IIR".to_string()],
                },
                clock(),
            )
            .expect("quote succeeds");

        assert_eq!(outcome.category, Some(CepCategory::Baixa));
        assert!(outcome.pricing.is_valid);
        assert_eq!(outcome.pricing.final_monthly_value, 900.0);
        assert_eq!(outcome.pricing.total_monthly_cost(), 1050.0);
        assert_eq!(outcome.pricing.approval_level, ApprovalLevel::Automatic);
    }

    #[test]
    fn full_scholarship_on_the_special_track_zeroes_tuition() {
        let service = build_service();

        let outcome = service
            .quote(
                &QuoteRequest {
                    cep: Some("37701-000".to_string()),
                    trilho: Some(matricula_engine::enrollment::catalog::Trilho::Especial),
                    base_value: 1450.0,
                    material_value: 0.0,
                    discounts: vec!["ABI".to_string()],
                },
                clock(),
            )
            .expect("quote succeeds");

        assert!(outcome.pricing.is_valid);
        assert_eq!(outcome.pricing.final_monthly_value, 0.0);
        assert_eq!(outcome.pricing.approval_level, ApprovalLevel::Director);

        let abi = outcome
            .eligibility
            .iter()
            .find(|result| result.discount.code == "ABI")
            .expect("ABI evaluated");
        assert!(abi.eligible);
    }

    #[test]
    fn conflicting_scholarships_invalidate_the_quote() {
        let service = build_service();

        let outcome = service
            .quote(
                &QuoteRequest {
                    cep: None,
                    trilho: None,
                    base_value: 1000.0,
                    material_value: 0.0,
                    discounts: vec!["ABI".to_string(), "PASS".to_string()],
                },
                clock(),
            )
            .expect("quote computes even for invalid selections");

        assert!(!outcome.pricing.is_valid);
        assert!(outcome
            .pricing
            .validation_errors
            .contains(&"não é possível combinar múltiplos descontos de 100%".to_string()));
        // The raw tier still reflects the selected total.
        assert_eq!(outcome.pricing.approval_level, ApprovalLevel::Director);
    }

    #[test]
    fn over_cap_combination_is_rejected_but_still_priced() {
        let service = build_service();

        let outcome = service
            .quote(
                &QuoteRequest {
                    cep: Some("01310-100".to_string()),
                    trilho: None,
                    base_value: 1000.0,
                    material_value: 0.0,
                    discounts: vec!["COL".to_string(), "RES".to_string()],
                },
                clock(),
            )
            .expect("quote computes");

        assert_eq!(outcome.category, Some(CepCategory::Fora));
        assert!(!outcome.pricing.is_valid);
        assert_eq!(outcome.pricing.total_discount_percentage, 70.0);
        assert_eq!(outcome.pricing.final_monthly_value, 300.0);
    }
}

mod routes {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use super::common::*;

    #[tokio::test]
    async fn quote_route_round_trips_json() {
        let router = build_router();

        let body = json!({
            "cep": "37701-000",
            "trilho": "combinado",
            "base_value": 1000.0,
            "discounts": ["IIR", "PAV"],
        });

        let response = router
            .oneshot(
                axum::http::Request::post("/api/v1/enrollment/quote")
                    .header(axum::http::header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["category"], json!("alta"));
        assert_eq!(payload["pricing"]["total_discount_percentage"], json!(25.0));
        assert_eq!(payload["pricing"]["final_monthly_value"], json!(750.0));
        assert_eq!(payload["pricing"]["approval_level"], json!("coordinator"));
    }

    #[tokio::test]
    async fn eligibility_route_blocks_residency_discount_in_town() {
        let router = build_router();

        let body = json!({
            "cep": "37701-000",
            "trilho": "combinado",
        });

        let response = router
            .oneshot(
                axum::http::Request::post("/api/v1/enrollment/eligibility")
                    .header(axum::http::header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;

        let res = payload["results"]
            .as_array()
            .expect("results array")
            .iter()
            .find(|result| result["discount"]["code"] == json!("RES"))
            .expect("RES evaluated")
            .clone();
        assert_eq!(res["eligible"], json!(false));
        assert_eq!(res["rule_source"], json!("hardcoded"));
    }

    #[tokio::test]
    async fn unknown_discount_codes_are_unprocessable() {
        let router = build_router();

        let body = json!({
            "base_value": 1000.0,
            "discounts": ["XYZ"],
        });

        let response = router
            .oneshot(
                axum::http::Request::post("/api/v1/enrollment/quote")
                    .header(axum::http::header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn discounts_verbatim_from_the_catalog_price_consistently() {
        let router = build_router();
        let pav = discount("PAV");

        let body = json!({
            "base_value": 800.0,
            "discounts": [pav.code],
        });

        let response = router
            .oneshot(
                axum::http::Request::post("/api/v1/enrollment/quote")
                    .header(axum::http::header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        let payload = read_json_body(response).await;
        assert_eq!(payload["pricing"]["total_discount_value"], json!(120.0));
        assert_eq!(payload["pricing"]["final_monthly_value"], json!(680.0));
    }
}
