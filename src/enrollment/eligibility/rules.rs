use crate::enrollment::cep::CepCategory;

/// Codes always granted on the special track (hardship and staff
/// scholarships), independent of where the family lives.
pub(crate) const SPECIAL_DISCOUNT_CODES: &[&str] = &["ABI", "ABP", "PASS", "PBS", "COL", "SAE"];

pub(crate) fn is_special_code(code: &str) -> bool {
    SPECIAL_DISCOUNT_CODES
        .iter()
        .any(|special| special.eq_ignore_ascii_case(code))
}

/// Per-category verdict for a code the business rules pin down. Arrays are
/// indexed by [`CepCategory::index`] (alta, baixa, fora). Adding a new
/// category-sensitive code is a new entry in [`CATEGORY_RULES`], not a new
/// branch in the evaluator.
pub(crate) struct CategoryRule {
    pub(crate) code: &'static str,
    allowed: [bool; 3],
    restriction: [Option<&'static str>; 3],
    suggestion: [Option<&'static str>; 3],
}

impl CategoryRule {
    pub(crate) fn allows(&self, category: CepCategory) -> bool {
        self.allowed[category.index()]
    }

    pub(crate) fn restriction_for(&self, category: CepCategory) -> Option<&'static str> {
        self.restriction[category.index()]
    }

    pub(crate) fn suggestion_for(&self, category: CepCategory) -> Option<&'static str> {
        self.suggestion[category.index()]
    }
}

pub(crate) const CATEGORY_RULES: &[CategoryRule] = &[
    // Out-of-town residency discount: only for families outside the city.
    CategoryRule {
        code: "RES",
        allowed: [false, false, true],
        restriction: [
            Some("desconto para outras cidades não se aplica a residentes de Poços de Caldas"),
            Some("desconto para outras cidades não se aplica a residentes de Poços de Caldas"),
            None,
        ],
        suggestion: [
            Some("explore outros tipos de desconto disponíveis para sua situação"),
            Some("considere o desconto CEP automático disponível para sua região"),
            None,
        ],
    },
    // Automatic postal discount: lower-income districts only; out-of-town
    // families use RES instead.
    CategoryRule {
        code: "CEP",
        allowed: [false, true, false],
        restriction: [
            Some("desconto CEP automático não disponível para bairros de maior renda"),
            None,
            Some("desconto CEP não se aplica para fora de Poços de Caldas (use o desconto RES)"),
        ],
        suggestion: [
            Some("outros tipos de desconto podem estar disponíveis para sua situação"),
            None,
            Some("o desconto RES (outras cidades) está disponível para você"),
        ],
    },
    CategoryRule {
        code: "CEP5",
        allowed: [false, true, false],
        restriction: [
            Some("desconto CEP5 disponível apenas para bairros de menor renda"),
            None,
            Some("desconto CEP5 não se aplica para fora de Poços de Caldas"),
        ],
        suggestion: [
            Some("explore outros tipos de desconto disponíveis"),
            None,
            Some("considere o desconto RES (outras cidades)"),
        ],
    },
    CategoryRule {
        code: "CEP10",
        allowed: [false, false, true],
        restriction: [
            Some("desconto CEP10 não se aplica para residentes de Poços de Caldas"),
            Some("desconto CEP10 não se aplica para residentes de Poços de Caldas"),
            None,
        ],
        suggestion: [
            Some("explore outros tipos de desconto disponíveis"),
            Some("o desconto CEP5 pode estar disponível para sua região"),
            None,
        ],
    },
];

pub(crate) fn find_category_rule(code: &str) -> Option<&'static CategoryRule> {
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.code.eq_ignore_ascii_case(code))
}
