//! Combination rules for a chosen set of discounts.
//!
//! Pure and total: any selection, including the empty one, yields a
//! well-formed report. Blocking problems land in `errors`; advisory ones in
//! `warnings`.

use serde::{Deserialize, Serialize};

use super::catalog::Discount;

/// Cap when no full scholarship is present.
pub const DEFAULT_CAP: f64 = 60.0;
/// Cap once a flagged full-scholarship code at >=100% is selected.
pub const FULL_SCHOLARSHIP_CAP: f64 = 100.0;
/// Above this total the report suggests double-checking documents.
pub const HIGH_DISCOUNT_WARNING_THRESHOLD: f64 = 50.0;
/// A payment-in-full discount does not combine with companions above this.
const CASH_COMPANION_THRESHOLD: f64 = 10.0;

/// Codes whose 100% variant lifts the cap to the full-scholarship ceiling.
const FULL_SCHOLARSHIP_CODES: &[&str] = &["ABI", "PASS"];
/// Payment-in-full style codes.
const CASH_DISCOUNT_CODES: &[&str] = &["PAV"];
/// The automatic postal discount, stacking-warning only.
const AUTOMATIC_CEP_CODES: &[&str] = &["CEP", "CEP5", "CEP10"];

struct ExclusionGroup {
    codes: &'static [&'static str],
    message: &'static str,
}

/// Mutually exclusive code groups; more than one match is an error. New
/// exclusions are new entries here, not new control flow.
const EXCLUSION_GROUPS: &[ExclusionGroup] = &[
    ExclusionGroup {
        codes: &["ABI", "ABP"],
        message: "bolsa integral e parcial de filantropia não podem ser combinadas",
    },
    ExclusionGroup {
        codes: &["PASS", "PBS"],
        message: "descontos de professores do IESJE e de outras instituições não podem ser combinados",
    },
    ExclusionGroup {
        codes: &["COL", "SAE"],
        message: "descontos de funcionários do IESJE e de outros estabelecimentos não podem ser combinados",
    },
];

/// Outcome of validating a discount selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationReport {
    pub is_valid: bool,
    pub total_percentage: f64,
    pub cap: f64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CombinationReport {
    fn valid_empty() -> Self {
        Self {
            is_valid: true,
            total_percentage: 0.0,
            cap: DEFAULT_CAP,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// The cap that applies to this selection: 100% with a full scholarship at
/// >=100%, 60% otherwise.
pub fn cap_for_selection(selected: &[Discount]) -> f64 {
    let has_full_scholarship = selected.iter().any(|discount| {
        discount.percentage >= 100.0
            && FULL_SCHOLARSHIP_CODES
                .iter()
                .any(|code| code.eq_ignore_ascii_case(&discount.code))
    });

    if has_full_scholarship {
        FULL_SCHOLARSHIP_CAP
    } else {
        DEFAULT_CAP
    }
}

/// Validate a selection against the cap and the combination rules.
pub fn validate(selected: &[Discount]) -> CombinationReport {
    if selected.is_empty() {
        return CombinationReport::valid_empty();
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let total_percentage: f64 = selected.iter().map(|discount| discount.percentage).sum();
    let cap = cap_for_selection(selected);

    if total_percentage > cap {
        errors.push(format!(
            "desconto total de {total_percentage}% excede o limite máximo de {cap}%"
        ));
    }

    for group in EXCLUSION_GROUPS {
        let matches = selected
            .iter()
            .filter(|discount| {
                group
                    .codes
                    .iter()
                    .any(|code| code.eq_ignore_ascii_case(&discount.code))
            })
            .count();
        if matches > 1 {
            errors.push(group.message.to_string());
        }
    }

    let full_value_count = selected
        .iter()
        .filter(|discount| discount.percentage >= 100.0)
        .count();
    if full_value_count > 1 {
        errors.push("não é possível combinar múltiplos descontos de 100%".to_string());
    }

    let has_cash_discount = selected.iter().any(is_cash_discount);
    if has_cash_discount {
        let significant_companions = selected
            .iter()
            .filter(|discount| {
                !is_cash_discount(discount) && discount.percentage > CASH_COMPANION_THRESHOLD
            })
            .count();
        if significant_companions > 0 {
            errors.push(
                "desconto à vista não pode ser combinado com outros descontos significativos"
                    .to_string(),
            );
        }
    }

    if total_percentage > HIGH_DISCOUNT_WARNING_THRESHOLD && total_percentage <= cap {
        warnings.push("desconto alto - verificar documentação necessária".to_string());
    }

    let has_automatic_cep = selected.iter().any(|discount| {
        AUTOMATIC_CEP_CODES
            .iter()
            .any(|code| code.eq_ignore_ascii_case(&discount.code))
    });
    if has_automatic_cep && selected.len() > 1 {
        warnings.push("desconto CEP aplicado junto com outros descontos".to_string());
    }

    CombinationReport {
        is_valid: errors.is_empty(),
        total_percentage,
        cap,
        errors,
        warnings,
    }
}

fn is_cash_discount(discount: &Discount) -> bool {
    CASH_DISCOUNT_CODES
        .iter()
        .any(|code| code.eq_ignore_ascii_case(&discount.code))
}
