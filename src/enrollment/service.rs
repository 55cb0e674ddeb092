use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{CatalogError, Discount, DiscountCatalog, Trilho};
use super::cep::cache::CepCache;
use super::cep::{CepCategory, CepClassification, CepRangeTable};
use super::eligibility::{self, EligibilityResult, EligibilitySummary};
use super::pricing::{self, PricingResult};

/// Service composing the range table, catalog snapshot, and rule engine.
///
/// Stateless apart from the CEP cache; every call recomputes eligibility and
/// pricing from the inputs it is given.
pub struct QuoteService<C> {
    catalog: Arc<C>,
    ranges: Arc<CepRangeTable>,
    cache: Mutex<CepCache>,
}

impl<C> QuoteService<C>
where
    C: DiscountCatalog + 'static,
{
    pub fn new(catalog: Arc<C>, ranges: Arc<CepRangeTable>) -> Self {
        Self {
            catalog,
            ranges,
            cache: Mutex::new(CepCache::default()),
        }
    }

    /// Resolve a CEP through the cache, falling back to the range table.
    pub fn resolve_category(&self, cep: &str, now: DateTime<Utc>) -> CepCategory {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(category) = cache.get(cep, now) {
                return category;
            }
            let category = self.ranges.resolve(cep);
            cache.insert(cep.to_string(), category, now);
            return category;
        }
        // Poisoned cache lock: skip caching, the table alone is authoritative.
        self.ranges.resolve(cep)
    }

    /// Classify a CEP for display, keeping the matched district.
    pub fn classify(&self, cep: &str) -> CepClassification {
        self.ranges.classify(cep)
    }

    /// Evaluate the whole catalog for one student.
    pub fn eligibility(
        &self,
        request: &EligibilityRequest,
        now: DateTime<Utc>,
    ) -> Result<EligibilityReport, QuoteServiceError> {
        let discounts = self.catalog.discounts()?;
        let category = request
            .cep
            .as_deref()
            .map(|cep| self.resolve_category(cep, now));

        let results = eligibility::evaluate_all(
            &discounts,
            category,
            request.trilho,
            &request.already_applied,
        );
        let summary = eligibility::summarize(&results);

        Ok(EligibilityReport {
            category,
            results,
            summary,
        })
    }

    /// Full quote: eligibility for the catalog plus validated pricing for the
    /// selected codes.
    pub fn quote(
        &self,
        request: &QuoteRequest,
        now: DateTime<Utc>,
    ) -> Result<QuoteOutcome, QuoteServiceError> {
        let discounts = self.catalog.discounts()?;
        let category = request
            .cep
            .as_deref()
            .map(|cep| self.resolve_category(cep, now));

        let selected = select_discounts(&discounts, &request.discounts)?;
        let results = eligibility::evaluate_all(&discounts, category, request.trilho, &[]);
        let pricing = pricing::calculate(request.base_value, request.material_value, &selected);

        Ok(QuoteOutcome {
            category,
            eligibility: results,
            pricing,
        })
    }
}

fn select_discounts(
    catalog: &[Discount],
    codes: &[String],
) -> Result<Vec<Discount>, QuoteServiceError> {
    codes
        .iter()
        .map(|code| {
            catalog
                .iter()
                .find(|discount| discount.code.eq_ignore_ascii_case(code))
                .cloned()
                .ok_or_else(|| QuoteServiceError::UnknownDiscount(code.clone()))
        })
        .collect()
}

/// Inputs for a catalog-wide eligibility evaluation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EligibilityRequest {
    #[serde(default)]
    pub cep: Option<String>,
    #[serde(default)]
    pub trilho: Option<Trilho>,
    #[serde(default)]
    pub already_applied: Vec<String>,
}

/// Inputs for a priced quote over a concrete selection.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub cep: Option<String>,
    #[serde(default)]
    pub trilho: Option<Trilho>,
    pub base_value: f64,
    #[serde(default)]
    pub material_value: f64,
    #[serde(default)]
    pub discounts: Vec<String>,
}

/// Eligibility verdicts for every catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CepCategory>,
    pub results: Vec<EligibilityResult>,
    pub summary: EligibilitySummary,
}

/// A complete quote response.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CepCategory>,
    pub eligibility: Vec<EligibilityResult>,
    pub pricing: PricingResult,
}

/// Error raised by the quote service.
#[derive(Debug, thiserror::Error)]
pub enum QuoteServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("unknown discount code: {0}")]
    UnknownDiscount(String),
}
