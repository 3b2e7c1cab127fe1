use std::io::Cursor;

use super::common::*;

use crate::buyers::domain::{BuyerSource, BuyerType};
use crate::buyers::import::parse_buyer_rows;

const HEADER: &str = "firstName,lastName,email,phone,buyerType,preferredAreas\n";

#[test]
fn valid_rows_become_drafts() {
    let csv = format!(
        "{HEADER}Avery,Sutton,avery@example.com,515-555-0101,investor,Des Moines;Ankeny\n\
         Blair,Nakamura,blair@example.com,515-555-0102,builder,\n"
    );

    let report = parse_buyer_rows(Cursor::new(csv.into_bytes())).expect("csv parses");

    assert_eq!(report.accepted.len(), 2);
    assert!(report.errors.is_empty());
    assert_eq!(report.accepted[0].row, 2);
    assert_eq!(report.accepted[0].draft.buyer_type, BuyerType::Investor);
    assert_eq!(
        report.accepted[0].draft.preferred_areas,
        vec!["Des Moines".to_string(), "Ankeny".to_string()]
    );
    assert_eq!(report.accepted[1].draft.preferred_areas, Vec::<String>::new());
}

#[test]
fn row_missing_required_columns_produces_one_error_with_row_number() {
    let csv = format!(
        "{HEADER}Avery,Sutton,avery@example.com,515-555-0101,,\n\
         ,Nakamura,,515-555-0102,,\n\
         Casey,Ortiz,casey@example.com,515-555-0103,,\n"
    );

    let report = parse_buyer_rows(Cursor::new(csv.into_bytes())).expect("csv parses");

    assert_eq!(report.accepted.len(), 2);
    assert_eq!(report.errors.len(), 1);
    // First data row is row 2, so the bad second row reports as row 3.
    assert_eq!(report.errors[0].row, 3);
    assert!(report.errors[0].message.contains("row 3"));
    assert!(report.errors[0].message.contains("firstName"));
    assert!(report.errors[0].message.contains("email"));
}

#[test]
fn unknown_buyer_type_falls_back_to_investor() {
    let csv = format!("{HEADER}Avery,Sutton,avery@example.com,515-555-0101,landlord,\n");
    let report = parse_buyer_rows(Cursor::new(csv.into_bytes())).expect("csv parses");
    assert_eq!(report.accepted[0].draft.buyer_type, BuyerType::Investor);
}

#[tokio::test]
async fn import_persists_valid_rows_and_reports_duplicates() {
    let (service, _) = build_service();
    service
        .create(draft(), BuyerSource::ManualEntry)
        .await
        .expect("existing buyer");

    let csv = format!(
        "{HEADER}Avery,Sutton,avery.sutton@example.com,999-000,investor,\n\
         Blair,Nakamura,blair@example.com,515-555-0102,builder,\n"
    );

    let outcome = service.import_csv(&csv).await.expect("import runs");

    assert_eq!(outcome.imported.len(), 1);
    assert_eq!(outcome.imported[0].email, "blair@example.com");
    assert_eq!(outcome.imported[0].source, BuyerSource::CsvImport);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].message.contains("row 2"));
    assert!(outcome.errors[0].message.contains("email"));
}
