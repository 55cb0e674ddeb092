//! Per-discount eligibility rules.
//!
//! Precedence, first match wins: special-track override, hardcoded category
//! rule, default-eligible. Missing category or track never fails an
//! evaluation; the engine falls back to treating every discount as eligible
//! so the form can render before the CEP lookup settles. That permissive
//! fallback is deliberate product behavior, not an oversight.

mod rules;

use serde::{Deserialize, Serialize};

use super::catalog::{Discount, Trilho};
use super::cep::CepCategory;

/// Which rule produced an eligibility verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleSource {
    TrilhoEspecial,
    Hardcoded,
    Default,
}

impl RuleSource {
    pub const fn label(self) -> &'static str {
        match self {
            RuleSource::TrilhoEspecial => "trilho-especial",
            RuleSource::Hardcoded => "hardcoded",
            RuleSource::Default => "default",
        }
    }
}

/// Informational only; `low` marks the permissive default verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

/// Verdict for a single discount, computed fresh on every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub discount: Discount,
    pub eligible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub rule_source: RuleSource,
    pub confidence: Confidence,
}

/// Whether a discount belongs to the special-track set.
pub fn is_special_discount(discount: &Discount) -> bool {
    rules::is_special_code(&discount.code)
}

/// Evaluate a single discount against the resolved category and track.
pub fn evaluate(
    discount: &Discount,
    category: Option<CepCategory>,
    track: Option<Trilho>,
) -> EligibilityResult {
    if track == Some(Trilho::Especial) && rules::is_special_code(&discount.code) {
        return EligibilityResult {
            discount: discount.clone(),
            eligible: true,
            reason: None,
            suggestion: None,
            rule_source: RuleSource::TrilhoEspecial,
            confidence: Confidence::High,
        };
    }

    // Lookup not performed yet: render optimistically.
    let Some(category) = category else {
        return default_result(discount);
    };

    if let Some(rule) = rules::find_category_rule(&discount.code) {
        let eligible = rule.allows(category);
        return EligibilityResult {
            discount: discount.clone(),
            eligible,
            reason: if eligible {
                None
            } else {
                rule.restriction_for(category).map(str::to_string)
            },
            suggestion: rule.suggestion_for(category).map(str::to_string),
            rule_source: RuleSource::Hardcoded,
            confidence: Confidence::High,
        };
    }

    default_result(discount)
}

/// Evaluate a whole catalog snapshot. Codes in `already_applied` that survive
/// the category rules are reported ineligible so the form does not offer the
/// same discount twice.
pub fn evaluate_all(
    discounts: &[Discount],
    category: Option<CepCategory>,
    track: Option<Trilho>,
    already_applied: &[String],
) -> Vec<EligibilityResult> {
    discounts
        .iter()
        .map(|discount| {
            let result = evaluate(discount, category, track);
            if result.eligible
                && result.rule_source != RuleSource::TrilhoEspecial
                && already_applied
                    .iter()
                    .any(|code| code.eq_ignore_ascii_case(&discount.code))
            {
                return EligibilityResult {
                    eligible: false,
                    reason: Some("desconto já selecionado".to_string()),
                    suggestion: None,
                    ..result
                };
            }
            result
        })
        .collect()
}

/// Keep only the discounts a user may still pick.
pub fn eligible_discounts(results: &[EligibilityResult]) -> Vec<Discount> {
    results
        .iter()
        .filter(|result| result.eligible)
        .map(|result| result.discount.clone())
        .collect()
}

/// Counts for the summary badges next to the discount list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EligibilitySummary {
    pub total: usize,
    pub eligible: usize,
    pub ineligible: usize,
}

pub fn summarize(results: &[EligibilityResult]) -> EligibilitySummary {
    let eligible = results.iter().filter(|result| result.eligible).count();
    EligibilitySummary {
        total: results.len(),
        eligible,
        ineligible: results.len() - eligible,
    }
}

fn default_result(discount: &Discount) -> EligibilityResult {
    EligibilityResult {
        discount: discount.clone(),
        eligible: true,
        reason: None,
        suggestion: None,
        rule_source: RuleSource::Default,
        confidence: Confidence::Low,
    }
}
