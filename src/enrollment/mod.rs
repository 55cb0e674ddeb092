//! Discount eligibility and pricing for tuition enrollment.
//!
//! Pipeline: resolve the student's CEP to an income category, evaluate every
//! catalog discount against the category and chosen track, validate the
//! selected combination, and price the result with its approval tier. The
//! engine holds no enrollment state; persistence belongs to the portal that
//! calls it.

pub mod catalog;
pub mod cep;
pub mod eligibility;
pub mod pricing;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use catalog::{
    required_documents, CatalogError, Discount, DiscountCatalog, DiscountCategory,
    InMemoryCatalog, Trilho,
};
pub use cep::cache::CepCache;
pub use cep::{clean_cep, format_cep, CepCategory, CepClassification, CepRange, CepRangeTable};
pub use eligibility::{
    evaluate, evaluate_all, Confidence, EligibilityResult, EligibilitySummary, RuleSource,
};
pub use pricing::{calculate, AppliedDiscount, ApprovalLevel, PricingResult};
pub use router::enrollment_router;
pub use service::{
    EligibilityReport, EligibilityRequest, QuoteOutcome, QuoteRequest, QuoteService,
    QuoteServiceError,
};
pub use validation::{validate, CombinationReport};
