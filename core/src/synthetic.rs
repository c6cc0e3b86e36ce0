//! Deterministic synthetic churn dataset.
//!
//! Stands in for the source CSV when none is configured (or when it is
//! missing and the config allows the fallback). One RNG stream is consumed
//! row by row, columns in header order, one draw per column. Changing that
//! order, or the number of draws per column, changes every generated dataset.

use crate::{
    domain::{
        AddOnService, Contract, Gender, InternetService, MultipleLines, PaymentMethod, YesNo,
    },
    error::ChurnResult,
    loader::normalize,
    record::CustomerRecord,
    rng::{RngBank, StreamRng, StreamSlot},
};
use serde::{Deserialize, Serialize};

/// Named generator presets. Both share one generator and one schema; they
/// differ only in size and a few weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorPreset {
    /// Full-size stand-in for the telecom churn dataset (7043 rows).
    #[default]
    Full,
    /// Quick-view dataset (1000 rows, payment methods equally weighted).
    Compact,
}

impl GeneratorPreset {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Compact => "compact",
        }
    }

    pub fn spec(&self) -> GeneratorSpec {
        match self {
            Self::Full => GeneratorSpec::FULL,
            Self::Compact => GeneratorSpec {
                rows: 1000,
                payment_method: &[
                    (PaymentMethod::ElectronicCheck, 0.25),
                    (PaymentMethod::MailedCheck, 0.25),
                    (PaymentMethod::BankTransferAuto, 0.25),
                    (PaymentMethod::CreditCardAuto, 0.25),
                ],
                ..GeneratorSpec::FULL
            },
        }
    }
}

impl std::str::FromStr for GeneratorPreset {
    type Err = crate::error::ChurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "full" => Ok(Self::Full),
            "compact" => Ok(Self::Compact),
            other => Err(crate::error::ChurnError::domain("preset", other)),
        }
    }
}

/// Sampling weights for every column. Weights within a column sum to 1.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorSpec {
    pub rows:              usize,
    pub gender:            &'static [(Gender, f64)],
    /// Raw 0/1 indicator; mapped to Yes/No by the normalizer like CSV input.
    pub senior_indicator:  &'static [(u8, f64)],
    pub partner:           &'static [(YesNo, f64)],
    pub dependents:        &'static [(YesNo, f64)],
    /// Inclusive month range.
    pub tenure:            (u32, u32),
    pub phone_service:     &'static [(YesNo, f64)],
    pub multiple_lines:    &'static [(MultipleLines, f64)],
    pub internet_service:  &'static [(InternetService, f64)],
    /// Shared by the six add-on service columns.
    pub add_on:            &'static [(AddOnService, f64)],
    pub contract:          &'static [(Contract, f64)],
    pub paperless_billing: &'static [(YesNo, f64)],
    pub payment_method:    &'static [(PaymentMethod, f64)],
    /// Half-open range [low, high).
    pub monthly_charges:   (f64, f64),
    /// Half-open range [low, high).
    pub total_charges:     (f64, f64),
    pub churn:             &'static [(YesNo, f64)],
}

impl GeneratorSpec {
    pub const FULL: GeneratorSpec = GeneratorSpec {
        rows: 7043,
        gender: &[(Gender::Male, 0.5), (Gender::Female, 0.5)],
        senior_indicator: &[(0, 0.8), (1, 0.2)],
        partner: &[(YesNo::Yes, 0.5), (YesNo::No, 0.5)],
        dependents: &[(YesNo::Yes, 0.3), (YesNo::No, 0.7)],
        tenure: (1, 72),
        phone_service: &[(YesNo::Yes, 0.9), (YesNo::No, 0.1)],
        multiple_lines: &[
            (MultipleLines::Yes, 0.4),
            (MultipleLines::No, 0.4),
            (MultipleLines::NoPhoneService, 0.2),
        ],
        internet_service: &[
            (InternetService::Dsl, 0.4),
            (InternetService::FiberOptic, 0.3),
            (InternetService::No, 0.3),
        ],
        add_on: &[
            (AddOnService::Yes, 0.3),
            (AddOnService::No, 0.4),
            (AddOnService::NoInternetService, 0.3),
        ],
        contract: &[
            (Contract::MonthToMonth, 0.5),
            (Contract::OneYear, 0.3),
            (Contract::TwoYear, 0.2),
        ],
        paperless_billing: &[(YesNo::Yes, 0.6), (YesNo::No, 0.4)],
        payment_method: &[
            (PaymentMethod::ElectronicCheck, 0.3),
            (PaymentMethod::MailedCheck, 0.2),
            (PaymentMethod::BankTransferAuto, 0.25),
            (PaymentMethod::CreditCardAuto, 0.25),
        ],
        monthly_charges: (18.0, 120.0),
        total_charges: (18.0, 8000.0),
        churn: &[(YesNo::Yes, 0.265), (YesNo::No, 0.735)],
    };
}

pub struct SyntheticGenerator {
    spec: GeneratorSpec,
    rng:  StreamRng,
}

impl SyntheticGenerator {
    pub fn new(spec: GeneratorSpec, seed: u64) -> Self {
        Self {
            spec,
            rng: RngBank::new(seed).for_slot(StreamSlot::SyntheticDataset),
        }
    }

    pub fn from_preset(preset: GeneratorPreset, seed: u64) -> Self {
        Self::new(preset.spec(), seed)
    }

    pub fn with_rows(mut self, rows: usize) -> Self {
        self.spec.rows = rows;
        self
    }

    /// Generate the full record set.
    pub fn generate(mut self) -> ChurnResult<Vec<CustomerRecord>> {
        let n = self.spec.rows;
        let mut records = Vec::with_capacity(n);
        for _ in 0..n {
            records.push(self.next_record()?);
        }
        log::debug!("{}: generated {} synthetic records", self.rng.name, records.len());
        Ok(records)
    }

    fn next_record(&mut self) -> ChurnResult<CustomerRecord> {
        let spec = &self.spec;
        let rng = &mut self.rng;

        // Draw order is header order. Do not reorder.
        let gender            = rng.pick_weighted(spec.gender);
        let senior_indicator  = rng.pick_weighted(spec.senior_indicator);
        let partner           = rng.pick_weighted(spec.partner);
        let dependents        = rng.pick_weighted(spec.dependents);
        let tenure            = rng.uniform_int(spec.tenure.0, spec.tenure.1);
        let phone_service     = rng.pick_weighted(spec.phone_service);
        let multiple_lines    = rng.pick_weighted(spec.multiple_lines);
        let internet_service  = rng.pick_weighted(spec.internet_service);
        let online_security   = rng.pick_weighted(spec.add_on);
        let online_backup     = rng.pick_weighted(spec.add_on);
        let device_protection = rng.pick_weighted(spec.add_on);
        let tech_support      = rng.pick_weighted(spec.add_on);
        let streaming_tv      = rng.pick_weighted(spec.add_on);
        let streaming_movies  = rng.pick_weighted(spec.add_on);
        let contract          = rng.pick_weighted(spec.contract);
        let paperless_billing = rng.pick_weighted(spec.paperless_billing);
        let payment_method    = rng.pick_weighted(spec.payment_method);
        let monthly_charges   = rng.uniform_f64(spec.monthly_charges.0, spec.monthly_charges.1);
        let total_raw         = rng.uniform_f64(spec.total_charges.0, spec.total_charges.1);
        let churn             = rng.pick_weighted(spec.churn);

        Ok(CustomerRecord {
            gender,
            senior_citizen: normalize::senior_from_indicator(senior_indicator)?,
            partner,
            dependents,
            tenure,
            phone_service,
            multiple_lines,
            internet_service,
            online_security,
            online_backup,
            device_protection,
            tech_support,
            streaming_tv,
            streaming_movies,
            contract,
            paperless_billing,
            payment_method,
            monthly_charges,
            total_charges: normalize::total_charges(Some(total_raw), monthly_charges),
            churn,
        })
    }
}
