use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Display grouping used by the admin catalog. The eligibility rules key off
/// discount codes, never off this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountCategory {
    Especial,
    Regular,
    Negociacao,
}

impl DiscountCategory {
    pub const fn label(self) -> &'static str {
        match self {
            DiscountCategory::Especial => "especial",
            DiscountCategory::Regular => "regular",
            DiscountCategory::Negociacao => "negociacao",
        }
    }
}

/// Enrollment track, selected once per session. The special track is reserved
/// for hardship/staff scholarships and overrides category-based restrictions
/// for the codes flagged as special.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trilho {
    Especial,
    Combinado,
    Comercial,
}

impl Trilho {
    pub const fn label(self) -> &'static str {
        match self {
            Trilho::Especial => "especial",
            Trilho::Combinado => "combinado",
            Trilho::Comercial => "comercial",
        }
    }
}

/// Catalog entry owned by the external discount store. Immutable once fetched;
/// the engine references it by value and never writes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub id: String,
    pub code: String,
    pub name: String,
    /// 0-100; may be 0 for variable discounts resolved by the form layer.
    pub percentage: f64,
    pub requires_document: bool,
    /// Cap this discount contributes when combined with others.
    pub max_cumulative_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<DiscountCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Discount {
    /// The fixed catalog shipped with the enrollment portal, used for demos
    /// and as the fallback when no CSV override is configured.
    pub fn reference_catalog() -> Vec<Discount> {
        fn entry(
            id: &str,
            code: &str,
            name: &str,
            percentage: f64,
            requires_document: bool,
            category: DiscountCategory,
        ) -> Discount {
            Discount {
                id: id.to_string(),
                code: code.to_string(),
                name: name.to_string(),
                percentage,
                requires_document,
                max_cumulative_percentage: if percentage >= 100.0 { 100.0 } else { 60.0 },
                category: Some(category),
                description: None,
            }
        }

        vec![
            entry("1", "IIR", "Alunos Irmãos Carnal", 10.0, true, DiscountCategory::Regular),
            entry("2", "RES", "Alunos de Outras Cidades", 20.0, true, DiscountCategory::Regular),
            entry("9", "PAV", "Pagamento à Vista", 15.0, true, DiscountCategory::Regular),
            entry("3", "PASS", "Filhos de Prof. do IESJE Sindicalizados", 100.0, true, DiscountCategory::Especial),
            entry("4", "PBS", "Filhos de Prof. Sind. de Outras Instituições", 40.0, true, DiscountCategory::Especial),
            entry("5", "COL", "Filhos de Func. do IESJE Sindicalizados", 50.0, true, DiscountCategory::Especial),
            entry("6", "SAE", "Filhos de Func. de Outros Estabelec. (SAAE)", 40.0, true, DiscountCategory::Especial),
            entry("7", "ABI", "Bolsa Integral Filantropia", 100.0, true, DiscountCategory::Especial),
            entry("8", "ABP", "Bolsa Parcial Filantropia", 50.0, true, DiscountCategory::Especial),
            entry("C1", "CEP10", "Comercial — CEP fora de Poços de Caldas", 10.0, false, DiscountCategory::Negociacao),
            entry("C2", "CEP5", "Comercial — CEP em bairro de menor renda", 5.0, false, DiscountCategory::Negociacao),
            entry("C3", "ADIM2", "Comercial — Adimplente perfeito", 2.0, false, DiscountCategory::Negociacao),
        ]
    }
}

/// Documents a discount code requires, for checklist display. Completeness
/// tracking happens elsewhere; this is reference data only.
pub fn required_documents(code: &str) -> &'static [&'static str] {
    match code.to_ascii_uppercase().as_str() {
        "IIR" => &["Certidão de nascimento dos irmãos"],
        "RES" => &["Comprovante de residência fora de Poços de Caldas"],
        "PASS" | "PBS" => &["Comprovante de vínculo docente", "Comprovante de sindicalização"],
        "COL" | "SAE" => &["Comprovante de vínculo empregatício", "Carteira sindical SAAE"],
        "ABI" | "ABP" => &[
            "Formulário socioeconômico preenchido",
            "Comprovantes de renda do núcleo familiar",
            "Comprovante de residência",
        ],
        "PAV" => &["Comprovante de pagamento integral anual"],
        _ => &[],
    }
}

/// Read-only snapshot source so the quote service can be exercised in
/// isolation from whatever store actually holds the catalog.
pub trait DiscountCatalog: Send + Sync {
    fn discounts(&self) -> Result<Vec<Discount>, CatalogError>;
}

/// Error enumeration for catalog loading failures.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed catalog row: {0}")]
    Csv(#[from] csv::Error),
}

/// Catalog backed by an owned snapshot.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    discounts: Vec<Discount>,
}

impl InMemoryCatalog {
    pub fn new(discounts: Vec<Discount>) -> Self {
        Self { discounts }
    }

    pub fn reference() -> Self {
        Self::new(Discount::reference_catalog())
    }
}

impl DiscountCatalog for InMemoryCatalog {
    fn discounts(&self) -> Result<Vec<Discount>, CatalogError> {
        Ok(self.discounts.clone())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    code: String,
    name: String,
    percentage: f64,
    requires_document: bool,
    #[serde(default)]
    max_cumulative_percentage: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
}

impl CatalogRow {
    fn into_discount(self) -> Discount {
        let category = self.category.as_deref().map(|raw| {
            match raw.trim().to_ascii_lowercase().as_str() {
                "especial" => DiscountCategory::Especial,
                "negociacao" => DiscountCategory::Negociacao,
                _ => DiscountCategory::Regular,
            }
        });

        let max_cumulative_percentage = self
            .max_cumulative_percentage
            .unwrap_or(if self.percentage >= 100.0 { 100.0 } else { 60.0 });

        Discount {
            id: self.id,
            code: self.code.trim().to_ascii_uppercase(),
            name: self.name,
            percentage: self.percentage,
            requires_document: self.requires_document,
            max_cumulative_percentage,
            category,
            description: self.description,
        }
    }
}

/// Parse a discount catalog exported by the admin area as CSV with headers
/// `id,code,name,percentage,requires_document[,max_cumulative_percentage,category,description]`.
pub fn parse_catalog_csv<R: Read>(reader: R) -> Result<Vec<Discount>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut discounts = Vec::new();

    for record in csv_reader.deserialize::<CatalogRow>() {
        discounts.push(record?.into_discount());
    }

    Ok(discounts)
}

pub fn load_catalog_csv(path: &Path) -> Result<Vec<Discount>, CatalogError> {
    let file = File::open(path)?;
    parse_catalog_csv(file)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
