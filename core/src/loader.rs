//! Dataset loader and normalizer.
//!
//! Produces the validated record set from the configured CSV, or from the
//! synthetic generator when no source is configured (or the configured file
//! is missing and the config allows the fallback).
//!
//! Normalization applies to both sources:
//!   - TotalCharges is coerced to a number; blank or unparsable values take
//!     the row's MonthlyCharges.
//!   - The raw senior-citizen indicator (0/1) becomes the Yes/No domain.

use crate::{
    config::{DatasetConfig, MissingSource},
    domain::{
        AddOnService, Categorical, Contract, Gender, InternetService, MultipleLines,
        PaymentMethod, YesNo,
    },
    error::{ChurnError, ChurnResult},
    record::CustomerRecord,
    synthetic::SyntheticGenerator,
};
use serde::Deserialize;
use std::{fs::File, io, path::Path};

/// Header names every source file must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "tenure",
    "PhoneService",
    "MultipleLines",
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
    "MonthlyCharges",
    "TotalCharges",
    "Churn",
];

/// Load the record set described by `config`.
pub fn load(config: &DatasetConfig) -> ChurnResult<Vec<CustomerRecord>> {
    let Some(path) = config.source_path.as_deref() else {
        log::info!(
            "loader: no source configured, generating synthetic dataset (preset={}, seed={})",
            config.preset.name(),
            config.seed,
        );
        return generate_synthetic(config);
    };

    match File::open(path) {
        Ok(file) => {
            let records = read_records(file).map_err(|e| match e {
                ChurnError::Csv(csv_err) => ChurnError::DataUnavailable {
                    path:   path.to_path_buf(),
                    reason: csv_err.to_string(),
                },
                other => other,
            })?;
            log::info!("loader: read {} records from {}", records.len(), path.display());
            Ok(records)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => match config.missing_source {
            MissingSource::Synthetic => {
                log::warn!(
                    "loader: {} not found, using synthetic dataset (preset={}, seed={})",
                    path.display(),
                    config.preset.name(),
                    config.seed,
                );
                generate_synthetic(config)
            }
            MissingSource::Fail => Err(unavailable(path, "file not found")),
        },
        Err(e) => Err(unavailable(path, e.to_string())),
    }
}

/// Read, normalize and validate CSV rows from any reader.
pub fn read_records<R: io::Read>(input: R) -> ChurnResult<Vec<CustomerRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ChurnError::SchemaMismatch { missing });
    }

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<RawCustomerRow>().enumerate() {
        let row_number = index + 1;
        let record = row?
            .normalize()
            .map_err(|e| ChurnError::InvalidRow { row: row_number, source: Box::new(e) })?;
        records.push(record);
    }
    Ok(records)
}

fn generate_synthetic(config: &DatasetConfig) -> ChurnResult<Vec<CustomerRecord>> {
    SyntheticGenerator::from_preset(config.preset, config.seed)
        .with_rows(config.synthetic_rows())
        .generate()
}

fn unavailable(path: &Path, reason: impl Into<String>) -> ChurnError {
    ChurnError::DataUnavailable { path: path.to_path_buf(), reason: reason.into() }
}

// ── Raw rows ───────────────────────────────────────────────────────────────

/// A CSV row exactly as read, before normalization.
#[derive(Debug, Clone, Deserialize)]
struct RawCustomerRow {
    #[serde(rename = "gender")]
    gender:            String,
    #[serde(rename = "SeniorCitizen")]
    senior_citizen:    String,
    #[serde(rename = "Partner")]
    partner:           String,
    #[serde(rename = "Dependents")]
    dependents:        String,
    #[serde(rename = "tenure")]
    tenure:            String,
    #[serde(rename = "PhoneService")]
    phone_service:     String,
    #[serde(rename = "MultipleLines")]
    multiple_lines:    String,
    #[serde(rename = "InternetService")]
    internet_service:  String,
    #[serde(rename = "OnlineSecurity")]
    online_security:   String,
    #[serde(rename = "OnlineBackup")]
    online_backup:     String,
    #[serde(rename = "DeviceProtection")]
    device_protection: String,
    #[serde(rename = "TechSupport")]
    tech_support:      String,
    #[serde(rename = "StreamingTV")]
    streaming_tv:      String,
    #[serde(rename = "StreamingMovies")]
    streaming_movies:  String,
    #[serde(rename = "Contract")]
    contract:          String,
    #[serde(rename = "PaperlessBilling")]
    paperless_billing: String,
    #[serde(rename = "PaymentMethod")]
    payment_method:    String,
    #[serde(rename = "MonthlyCharges")]
    monthly_charges:   String,
    #[serde(rename = "TotalCharges")]
    total_charges:     String,
    #[serde(rename = "Churn")]
    churn:             String,
}

impl RawCustomerRow {
    fn normalize(self) -> ChurnResult<CustomerRecord> {
        let monthly_charges = normalize::coerce_numeric(&self.monthly_charges)
            .ok_or_else(|| ChurnError::domain("MonthlyCharges", self.monthly_charges.as_str()))?;
        let total_charges = normalize::total_charges(
            normalize::coerce_numeric(&self.total_charges),
            monthly_charges,
        );

        let record = CustomerRecord {
            gender:            Gender::parse("gender", &self.gender)?,
            senior_citizen:    normalize::senior_citizen(&self.senior_citizen)?,
            partner:           YesNo::parse("Partner", &self.partner)?,
            dependents:        YesNo::parse("Dependents", &self.dependents)?,
            tenure:            normalize::tenure(&self.tenure)?,
            phone_service:     YesNo::parse("PhoneService", &self.phone_service)?,
            multiple_lines:    MultipleLines::parse("MultipleLines", &self.multiple_lines)?,
            internet_service:  InternetService::parse("InternetService", &self.internet_service)?,
            online_security:   AddOnService::parse("OnlineSecurity", &self.online_security)?,
            online_backup:     AddOnService::parse("OnlineBackup", &self.online_backup)?,
            device_protection: AddOnService::parse("DeviceProtection", &self.device_protection)?,
            tech_support:      AddOnService::parse("TechSupport", &self.tech_support)?,
            streaming_tv:      AddOnService::parse("StreamingTV", &self.streaming_tv)?,
            streaming_movies:  AddOnService::parse("StreamingMovies", &self.streaming_movies)?,
            contract:          Contract::parse("Contract", &self.contract)?,
            paperless_billing: YesNo::parse("PaperlessBilling", &self.paperless_billing)?,
            payment_method:    PaymentMethod::parse("PaymentMethod", &self.payment_method)?,
            monthly_charges,
            total_charges,
            churn:             YesNo::parse("Churn", &self.churn)?,
        };
        record.validate()?;
        Ok(record)
    }
}

/// Normalization rules shared by the CSV reader and the synthetic generator.
pub mod normalize {
    use crate::{
        domain::{Categorical, YesNo},
        error::{ChurnError, ChurnResult},
        types::{Charge, Months},
    };

    /// Parse a numeric cell. Blank, unparsable and non-finite values yield `None`.
    pub fn coerce_numeric(raw: &str) -> Option<f64> {
        raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// TotalCharges never stays empty: a missing value takes MonthlyCharges.
    pub fn total_charges(coerced: Option<Charge>, monthly_charges: Charge) -> Charge {
        coerced.unwrap_or(monthly_charges)
    }

    pub fn senior_from_indicator(indicator: u8) -> ChurnResult<YesNo> {
        YesNo::from_indicator("SeniorCitizen", indicator)
    }

    /// Accepts the raw 0/1 indicator or an already-mapped Yes/No label.
    pub fn senior_citizen(raw: &str) -> ChurnResult<YesNo> {
        match raw.trim() {
            "0" => senior_from_indicator(0),
            "1" => senior_from_indicator(1),
            other => YesNo::parse("SeniorCitizen", other),
        }
    }

    /// Whole, non-negative months. "5" and "5.0" are both accepted.
    pub fn tenure(raw: &str) -> ChurnResult<Months> {
        let raw = raw.trim();
        if let Ok(months) = raw.parse::<Months>() {
            return Ok(months);
        }
        match coerce_numeric(raw) {
            Some(v) if v >= 0.0 && v.fract() == 0.0 && v <= f64::from(Months::MAX) => {
                Ok(v as Months)
            }
            _ => Err(ChurnError::domain("tenure", raw)),
        }
    }
}
