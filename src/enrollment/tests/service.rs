use std::sync::Arc;

use chrono::Duration;

use super::common::*;
use crate::enrollment::catalog::Trilho;
use crate::enrollment::cep::{CepCategory, CepRange, CepRangeTable};
use crate::enrollment::eligibility::RuleSource;
use crate::enrollment::pricing::ApprovalLevel;
use crate::enrollment::service::{
    EligibilityRequest, QuoteRequest, QuoteService, QuoteServiceError,
};

#[test]
fn eligibility_resolves_category_from_cep() {
    let service = build_service();
    let request = EligibilityRequest {
        cep: Some("37701-000".to_string()),
        trilho: Some(Trilho::Combinado),
        already_applied: Vec::new(),
    };

    let report = service
        .eligibility(&request, clock())
        .expect("catalog available");

    assert_eq!(report.category, Some(CepCategory::Alta));
    let res = report
        .results
        .iter()
        .find(|result| result.discount.code == "RES")
        .expect("RES in catalog");
    assert!(!res.eligible);
    assert_eq!(res.rule_source, RuleSource::Hardcoded);
}

#[test]
fn eligibility_without_cep_skips_resolution() {
    let service = build_service();
    let report = service
        .eligibility(&EligibilityRequest::default(), clock())
        .expect("catalog available");

    assert_eq!(report.category, None);
    assert!(report.results.iter().all(|result| result.eligible));
    assert_eq!(report.summary.ineligible, 0);
}

#[test]
fn quote_combines_eligibility_and_pricing() {
    let service = build_service();
    let request = QuoteRequest {
        cep: Some("37705-000".to_string()),
        trilho: Some(Trilho::Combinado),
        base_value: 1000.0,
        material_value: 150.0,
        discounts: vec!["IIR".to_string(), "PAV".to_string()],
    };

    let outcome = service.quote(&request, clock()).expect("catalog available");

    assert_eq!(outcome.category, Some(CepCategory::Baixa));
    assert!(outcome.pricing.is_valid);
    assert_eq!(outcome.pricing.total_discount_percentage, 25.0);
    assert_eq!(outcome.pricing.final_monthly_value, 750.0);
    assert_eq!(outcome.pricing.approval_level, ApprovalLevel::Coordinator);
}

#[test]
fn quote_rejects_unknown_discount_codes() {
    let service = build_service();
    let request = QuoteRequest {
        cep: None,
        trilho: None,
        base_value: 1000.0,
        material_value: 0.0,
        discounts: vec!["NOPE".to_string()],
    };

    match service.quote(&request, clock()) {
        Err(QuoteServiceError::UnknownDiscount(code)) => assert_eq!(code, "NOPE"),
        other => panic!("expected unknown discount error, got {other:?}"),
    }
}

#[test]
fn quote_matches_codes_case_insensitively() {
    let service = build_service();
    let request = QuoteRequest {
        cep: None,
        trilho: None,
        base_value: 1000.0,
        material_value: 0.0,
        discounts: vec!["iir".to_string()],
    };

    let outcome = service.quote(&request, clock()).expect("catalog available");
    assert_eq!(outcome.pricing.discounts[0].code, "IIR");
}

#[test]
fn eligibility_surfaces_catalog_failures() {
    let service = QuoteService::new(Arc::new(UnavailableCatalog), Arc::new(ranges()));

    match service.eligibility(&EligibilityRequest::default(), clock()) {
        Err(QuoteServiceError::Catalog(_)) => {}
        other => panic!("expected catalog error, got {other:?}"),
    }
}

#[test]
fn resolve_category_serves_cached_entries_until_the_table_changes_matter() {
    // The cache pins the first resolution for the TTL window even if a call
    // happens against the same service later.
    let service = build_service();
    let now = clock();

    let first = service.resolve_category("37704-100", now);
    assert_eq!(first, CepCategory::Baixa);
    assert_eq!(
        service.resolve_category("37704-100", now + Duration::minutes(2)),
        first
    );
}

#[test]
fn resolve_category_with_custom_table() {
    let table = CepRangeTable::new(vec![CepRange {
        start: 10000000,
        end: 20000000,
        category: CepCategory::Baixa,
        district: None,
    }]);
    let service = QuoteService::new(
        Arc::new(crate::enrollment::catalog::InMemoryCatalog::reference()),
        Arc::new(table),
    );

    assert_eq!(service.resolve_category("15000-000", clock()), CepCategory::Baixa);
    assert_eq!(service.resolve_category("25000-000", clock()), CepCategory::Alta);
}
