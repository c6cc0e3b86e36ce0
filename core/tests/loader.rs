//! Loader: CSV parsing, normalization, schema checks and source fallback.

use churn_core::{
    config::{DatasetConfig, MissingSource},
    domain::{Contract, InternetService, PaymentMethod, YesNo},
    error::ChurnError,
    loader::{self, normalize},
};
use std::path::PathBuf;

const HEADER: &str = "customerID,gender,SeniorCitizen,Partner,Dependents,tenure,PhoneService,\
MultipleLines,InternetService,OnlineSecurity,OnlineBackup,DeviceProtection,TechSupport,\
StreamingTV,StreamingMovies,Contract,PaperlessBilling,PaymentMethod,MonthlyCharges,\
TotalCharges,Churn";

const ROWS: &[&str] = &[
    "7590-VHVEG,Female,0,Yes,No,1,No,No phone service,DSL,No,Yes,No,No,No,No,Month-to-month,Yes,Electronic check,29.85,29.85,No",
    "5575-GNVDE,Male,0,No,No,34,Yes,No,DSL,Yes,No,Yes,No,No,No,One year,No,Mailed check,56.95,1889.5,No",
    "3668-QPYBK,Male,0,No,No,2,Yes,No,DSL,Yes,Yes,No,No,No,No,Month-to-month,Yes,Mailed check,53.85,108.15,Yes",
    "4472-LVYGI,Female,0,Yes,Yes,0,No,No phone service,DSL,Yes,No,Yes,Yes,Yes,No,Two year,Yes,Bank transfer (automatic),52.55, ,No",
    "9305-CDSKC,Female,1,No,No,8,Yes,Yes,Fiber optic,No,No,Yes,No,Yes,Yes,Month-to-month,Yes,Electronic check,99.65,820.5,Yes",
];

fn csv_with(rows: &[&str]) -> String {
    let mut out = String::from(HEADER);
    for row in rows {
        out.push('\n');
        out.push_str(row);
    }
    out.push('\n');
    out
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("churn-loader-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).expect("write temp csv");
    path
}

#[test]
fn parses_sample_rows() {
    let records = loader::read_records(csv_with(ROWS).as_bytes()).unwrap();
    assert_eq!(records.len(), 5);

    let first = &records[0];
    assert_eq!(first.tenure, 1);
    assert_eq!(first.contract, Contract::MonthToMonth);
    assert_eq!(first.payment_method, PaymentMethod::ElectronicCheck);
    assert_eq!(first.churn, YesNo::No);

    assert_eq!(records[4].internet_service, InternetService::FiberOptic);
    assert!(records[2].churned());
}

#[test]
fn blank_total_charges_take_monthly_charges() {
    let records = loader::read_records(csv_with(ROWS).as_bytes()).unwrap();
    let blank = &records[3];
    assert_eq!(blank.tenure, 0);
    assert_eq!(
        blank.total_charges, blank.monthly_charges,
        "Blank TotalCharges should fall back to MonthlyCharges"
    );
}

#[test]
fn unparsable_total_charges_take_monthly_charges() {
    let row = "x,Male,0,No,No,3,Yes,No,DSL,No,No,No,No,No,No,Month-to-month,No,Mailed check,45.10,n/a,No";
    let records = loader::read_records(csv_with(&[row]).as_bytes()).unwrap();
    assert_eq!(records[0].total_charges, 45.10);
}

#[test]
fn senior_indicator_maps_to_yes_no() {
    let records = loader::read_records(csv_with(ROWS).as_bytes()).unwrap();
    assert_eq!(records[0].senior_citizen, YesNo::No);
    assert_eq!(records[4].senior_citizen, YesNo::Yes);

    assert_eq!(normalize::senior_citizen("Yes").unwrap(), YesNo::Yes);
    assert!(normalize::senior_citizen("2").is_err());
}

#[test]
fn tenure_accepts_whole_floats_only() {
    assert_eq!(normalize::tenure("5").unwrap(), 5);
    assert_eq!(normalize::tenure(" 5.0 ").unwrap(), 5);
    assert!(normalize::tenure("5.5").is_err());
    assert!(normalize::tenure("-1").is_err());
}

#[test]
fn missing_column_is_schema_mismatch() {
    let header = HEADER.trim_end_matches(",Churn");
    let input = format!("{header}\n");
    match loader::read_records(input.as_bytes()) {
        Err(ChurnError::SchemaMismatch { missing }) => {
            assert_eq!(missing, vec!["Churn".to_string()]);
        }
        other => panic!("Expected SchemaMismatch, got {other:?}"),
    }
}

#[test]
fn out_of_domain_value_reports_row() {
    let bad = "x,Male,0,No,No,3,Yes,No,DSL,No,No,No,No,No,No,Monthly,No,Mailed check,45.10,45.10,No";
    let input = csv_with(&[ROWS[0], bad]);
    match loader::read_records(input.as_bytes()) {
        Err(ChurnError::InvalidRow { row, source }) => {
            assert_eq!(row, 2);
            assert!(
                matches!(*source, ChurnError::DomainViolation { field: "Contract", .. }),
                "Expected a Contract domain violation, got {source}"
            );
        }
        other => panic!("Expected InvalidRow, got {other:?}"),
    }
}

#[test]
fn non_positive_monthly_charges_rejected() {
    let bad = "x,Male,0,No,No,3,Yes,No,DSL,No,No,No,No,No,No,One year,No,Mailed check,0,0,No";
    let err = loader::read_records(csv_with(&[bad]).as_bytes()).unwrap_err();
    assert!(matches!(err, ChurnError::InvalidRow { row: 1, .. }), "got {err}");
}

#[test]
fn reads_configured_file() {
    let path = temp_file("ok.csv", &csv_with(ROWS));
    let records = loader::load(&DatasetConfig::from_csv(&path)).unwrap();
    assert_eq!(records.len(), 5);
    let _ = std::fs::remove_file(path);
}

#[test]
fn missing_file_falls_back_to_synthetic() {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = DatasetConfig {
        rows: Some(100),
        ..DatasetConfig::from_csv("/nonexistent/churn/telco.csv")
    };
    assert_eq!(config.missing_source, MissingSource::Synthetic);
    let records = loader::load(&config).unwrap();
    assert_eq!(records.len(), 100);
}

#[test]
fn missing_file_fails_when_configured_to() {
    let config = DatasetConfig {
        missing_source: MissingSource::Fail,
        ..DatasetConfig::from_csv("/nonexistent/churn/telco.csv")
    };
    match loader::load(&config) {
        Err(ChurnError::DataUnavailable { path, .. }) => {
            assert_eq!(path, PathBuf::from("/nonexistent/churn/telco.csv"));
        }
        other => panic!("Expected DataUnavailable, got {other:?}"),
    }
}

#[test]
fn malformed_file_is_data_unavailable() {
    // Second data row is short a column.
    let contents = format!("{HEADER}\n{}\nx,Male,0\n", ROWS[0]);
    let path = temp_file("malformed.csv", &contents);
    let result = loader::load(&DatasetConfig::from_csv(&path));
    let _ = std::fs::remove_file(&path);
    assert!(
        matches!(result, Err(ChurnError::DataUnavailable { .. })),
        "Expected DataUnavailable, got {result:?}"
    );
}
