//! Final price and approval-tier computation.

use serde::{Deserialize, Serialize};

use super::catalog::Discount;
use super::validation;

/// Staff tier required to approve an enrollment, a pure function of the
/// total discount percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalLevel {
    Automatic,
    Coordinator,
    Director,
}

impl ApprovalLevel {
    pub fn from_percentage(total_percentage: f64) -> Self {
        if total_percentage <= 20.0 {
            ApprovalLevel::Automatic
        } else if total_percentage <= 50.0 {
            ApprovalLevel::Coordinator
        } else {
            ApprovalLevel::Director
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ApprovalLevel::Automatic => "automatic",
            ApprovalLevel::Coordinator => "coordinator",
            ApprovalLevel::Director => "director",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            ApprovalLevel::Automatic => "aprovação automática",
            ApprovalLevel::Coordinator => "aprovação da coordenação necessária",
            ApprovalLevel::Director => "aprovação da direção necessária",
        }
    }
}

/// One applied discount with its computed monthly value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub id: String,
    pub code: String,
    pub name: String,
    pub percentage: f64,
    pub value: f64,
}

/// Full pricing breakdown, recomputed on every selection change and never
/// persisted by this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub base_value: f64,
    pub material_value: f64,
    pub discounts: Vec<AppliedDiscount>,
    pub total_discount_percentage: f64,
    pub total_discount_value: f64,
    pub final_monthly_value: f64,
    pub approval_level: ApprovalLevel,
    pub is_valid: bool,
    pub validation_errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl PricingResult {
    /// Monthly total including the undiscounted material cost.
    pub fn total_monthly_cost(&self) -> f64 {
        self.final_monthly_value + self.material_value
    }

    fn invalid(base_value: f64, material_value: f64, error: String) -> Self {
        Self {
            base_value,
            material_value,
            discounts: Vec::new(),
            total_discount_percentage: 0.0,
            total_discount_value: 0.0,
            final_monthly_value: 0.0,
            approval_level: ApprovalLevel::Automatic,
            is_valid: false,
            validation_errors: vec![error],
            warnings: Vec::new(),
        }
    }
}

/// Compute the pricing breakdown for a validated selection.
///
/// Percentages are never rounded here; rounding happens at display time so
/// repeated recalculation while the user edits does not compound error.
pub fn calculate(base_value: f64, material_value: f64, selected: &[Discount]) -> PricingResult {
    if !base_value.is_finite() || base_value <= 0.0 {
        return PricingResult::invalid(
            base_value,
            material_value,
            "valor base inválido".to_string(),
        );
    }

    let discounts: Vec<AppliedDiscount> = selected
        .iter()
        .map(|discount| AppliedDiscount {
            id: discount.id.clone(),
            code: discount.code.clone(),
            name: discount.name.clone(),
            percentage: discount.percentage,
            value: base_value * discount.percentage / 100.0,
        })
        .collect();

    let total_discount_percentage: f64 = discounts.iter().map(|item| item.percentage).sum();
    let total_discount_value: f64 = discounts.iter().map(|item| item.value).sum();
    let final_monthly_value = (base_value - total_discount_value).max(0.0);

    let combination = validation::validate(selected);

    PricingResult {
        base_value,
        material_value,
        discounts,
        total_discount_percentage,
        total_discount_value,
        final_monthly_value,
        approval_level: ApprovalLevel::from_percentage(total_discount_percentage),
        is_valid: combination.is_valid,
        validation_errors: combination.errors,
        warnings: combination.warnings,
    }
}
