use super::common::*;
use crate::enrollment::catalog::{
    parse_catalog_csv, required_documents, DiscountCategory, Trilho,
};
use crate::enrollment::cep::{parse_ranges_csv, CepCategory};

#[test]
fn reference_catalog_covers_the_published_codes() {
    let codes: Vec<String> = catalog().iter().map(|entry| entry.code.clone()).collect();
    for code in [
        "IIR", "RES", "PAV", "PASS", "PBS", "COL", "SAE", "ABI", "ABP", "CEP10", "CEP5", "ADIM2",
    ] {
        assert!(codes.contains(&code.to_string()), "missing {code}");
    }

    assert_eq!(discount("ABI").percentage, 100.0);
    assert_eq!(discount("ABI").max_cumulative_percentage, 100.0);
    assert_eq!(discount("IIR").max_cumulative_percentage, 60.0);
    assert_eq!(discount("CEP5").category, Some(DiscountCategory::Negociacao));
}

#[test]
fn track_labels_are_stable() {
    assert_eq!(Trilho::Especial.label(), "especial");
    assert_eq!(Trilho::Combinado.label(), "combinado");
    assert_eq!(Trilho::Comercial.label(), "comercial");
}

#[test]
fn catalog_csv_parses_and_normalizes_codes() {
    let csv = "\
id,code,name,percentage,requires_document,max_cumulative_percentage,category,description
1,iir,Alunos Irmãos,10,true,,regular,
2,ABI,Bolsa Integral,100,true,,especial,Bolsa filantropia
";

    let discounts = parse_catalog_csv(csv.as_bytes()).expect("csv parses");

    assert_eq!(discounts.len(), 2);
    assert_eq!(discounts[0].code, "IIR");
    assert_eq!(discounts[0].max_cumulative_percentage, 60.0);
    assert_eq!(discounts[0].description, None);
    assert_eq!(discounts[1].max_cumulative_percentage, 100.0);
    assert_eq!(discounts[1].category, Some(DiscountCategory::Especial));
    assert_eq!(discounts[1].description.as_deref(), Some("Bolsa filantropia"));
}

#[test]
fn catalog_csv_rejects_malformed_rows() {
    let csv = "\
id,code,name,percentage,requires_document
1,IIR,Alunos Irmãos,not-a-number,true
";

    assert!(parse_catalog_csv(csv.as_bytes()).is_err());
}

#[test]
fn range_csv_parses_with_exclusive_end() {
    let csv = "\
start,end,category,district
37701000,37702000,alta,Centro
37704000,37705000,baixa,
0,37701000,fora,Fora
";

    let table = parse_ranges_csv(csv.as_bytes()).expect("csv parses");

    assert_eq!(table.ranges().len(), 3);
    assert_eq!(table.resolve("37701-999"), CepCategory::Alta);
    assert_eq!(table.resolve("37704-500"), CepCategory::Baixa);
    assert_eq!(table.ranges()[1].district, None);
}

#[test]
fn required_documents_list_known_codes() {
    assert!(!required_documents("ABI").is_empty());
    assert!(!required_documents("pass").is_empty());
    assert_eq!(required_documents("ADIM2"), &[] as &[&str]);
}
