//! CEP (Brazilian postal code) category resolution.
//!
//! A CEP maps to one of three categories via an externally owned range table:
//! `alta` (higher-income in-city), `baixa` (lower-income in-city), or `fora`
//! (outside the home city). Resolution never fails; anything the table cannot
//! place resolves to the default category so the form always has an
//! eligibility state to render.

pub mod cache;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::catalog::CatalogError;

pub const CEP_DIGITS: usize = 8;

/// Income category derived from a CEP. Never stored by this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CepCategory {
    Alta,
    Baixa,
    Fora,
}

impl CepCategory {
    pub const fn label(self) -> &'static str {
        match self {
            CepCategory::Alta => "alta",
            CepCategory::Baixa => "baixa",
            CepCategory::Fora => "fora",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            CepCategory::Alta => 0,
            CepCategory::Baixa => 1,
            CepCategory::Fora => 2,
        }
    }
}

impl Default for CepCategory {
    /// Fallback for malformed codes and unmatched lookups: no automatic
    /// discount, residency discount blocked.
    fn default() -> Self {
        CepCategory::Alta
    }
}

/// Half-open numeric range `[start, end)` owned by the external range table.
/// Non-overlap is an external-data invariant, not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CepRange {
    pub start: u32,
    pub end: u32,
    pub category: CepCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

impl CepRange {
    pub fn contains(&self, cep: u32) -> bool {
        self.start <= cep && cep < self.end
    }
}

/// Ordered range table; the first matching range wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CepRangeTable {
    ranges: Vec<CepRange>,
}

impl CepRangeTable {
    pub fn new(ranges: Vec<CepRange>) -> Self {
        Self { ranges }
    }

    /// The Poços de Caldas table the portal ships with. Out-of-town ranges
    /// are listed explicitly so unmatched codes keep the neutral default.
    pub fn reference() -> Self {
        fn range(start: u32, end: u32, category: CepCategory, district: &str) -> CepRange {
            CepRange {
                start,
                end,
                category,
                district: Some(district.to_string()),
            }
        }

        Self::new(vec![
            range(37701000, 37702000, CepCategory::Alta, "Centro"),
            range(37702000, 37702500, CepCategory::Alta, "Jardim dos Estados"),
            range(37702500, 37703000, CepCategory::Alta, "Country Club"),
            range(37703000, 37703500, CepCategory::Alta, "Vila Cruz"),
            range(37709000, 37720000, CepCategory::Alta, "Outros bairros centrais"),
            range(37704000, 37705000, CepCategory::Baixa, "Região Sul"),
            range(37705000, 37706000, CepCategory::Baixa, "São José"),
            range(37706000, 37707000, CepCategory::Baixa, "Vila Nova"),
            range(37707000, 37708000, CepCategory::Baixa, "Kennedy"),
            range(37708000, 37709000, CepCategory::Baixa, "Zona Leste"),
            range(0, 37701000, CepCategory::Fora, "Fora de Poços de Caldas"),
            range(37703500, 37704000, CepCategory::Fora, "Fora de Poços de Caldas"),
            range(37720000, 100000000, CepCategory::Fora, "Fora de Poços de Caldas"),
        ])
    }

    pub fn ranges(&self) -> &[CepRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Resolve a raw CEP to its category. Total: malformed input and
    /// unmatched codes yield the default category rather than an error.
    pub fn resolve(&self, cep: &str) -> CepCategory {
        match clean_cep(cep) {
            Some(numeric) => self
                .ranges
                .iter()
                .find(|range| range.contains(numeric))
                .map(|range| range.category)
                .unwrap_or_default(),
            None => CepCategory::default(),
        }
    }

    /// Like [`resolve`](Self::resolve), but keeps the matched district for
    /// display next to the category badge.
    pub fn classify(&self, cep: &str) -> CepClassification {
        let Some(numeric) = clean_cep(cep) else {
            return CepClassification {
                category: CepCategory::default(),
                district: None,
                matched: false,
            };
        };

        match self.ranges.iter().find(|range| range.contains(numeric)) {
            Some(range) => CepClassification {
                category: range.category,
                district: range.district.clone(),
                matched: true,
            },
            None => CepClassification {
                category: CepCategory::default(),
                district: None,
                matched: false,
            },
        }
    }

    /// Whether the CEP falls inside the home city (alta or baixa).
    pub fn is_local(&self, cep: &str) -> bool {
        matches!(self.resolve(cep), CepCategory::Alta | CepCategory::Baixa)
    }
}

/// Resolution outcome enriched with the matched range's district.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CepClassification {
    pub category: CepCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    pub matched: bool,
}

/// Strip formatting and require exactly eight digits.
pub fn clean_cep(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != CEP_DIGITS {
        return None;
    }
    digits.parse::<u32>().ok()
}

/// Format a cleaned CEP as `00000-000`; inputs without eight digits pass
/// through untouched.
pub fn format_cep(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != CEP_DIGITS {
        return raw.to_string();
    }
    format!("{}-{}", &digits[..5], &digits[5..])
}

#[derive(Debug, Deserialize)]
struct RangeRow {
    start: u32,
    end: u32,
    category: CepCategory,
    #[serde(default)]
    district: Option<String>,
}

/// Parse a range table exported as CSV with headers
/// `start,end,category[,district]`; `end` is exclusive.
pub fn parse_ranges_csv<R: Read>(reader: R) -> Result<CepRangeTable, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut ranges = Vec::new();

    for record in csv_reader.deserialize::<RangeRow>() {
        let row = record?;
        ranges.push(CepRange {
            start: row.start,
            end: row.end,
            category: row.category,
            district: row.district.filter(|value| !value.trim().is_empty()),
        });
    }

    Ok(CepRangeTable::new(ranges))
}

pub fn load_ranges_csv(path: &Path) -> Result<CepRangeTable, CatalogError> {
    let file = File::open(path)?;
    parse_ranges_csv(file)
}
