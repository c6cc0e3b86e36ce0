//! The customer record and the field vocabulary used to address it.
//!
//! Records are immutable once loaded. Derived columns (tenure band, charge
//! segment) are projections computed on read, never stored.

use crate::{
    domain::{
        AddOnService, Categorical, ChargeSegment, Contract, Gender, InternetService,
        MultipleLines, PaymentMethod, TenureBand, YesNo,
    },
    error::{ChurnError, ChurnResult},
    types::{Charge, Months},
};
use serde::{Deserialize, Serialize, Serializer};
use std::{cmp::Ordering, fmt, str::FromStr};

/// One row of the churn dataset. Identity-free: no customer id is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "gender")]
    pub gender:            Gender,
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen:    YesNo,
    #[serde(rename = "Partner")]
    pub partner:           YesNo,
    #[serde(rename = "Dependents")]
    pub dependents:        YesNo,
    #[serde(rename = "tenure")]
    pub tenure:            Months,
    #[serde(rename = "PhoneService")]
    pub phone_service:     YesNo,
    #[serde(rename = "MultipleLines")]
    pub multiple_lines:    MultipleLines,
    #[serde(rename = "InternetService")]
    pub internet_service:  InternetService,
    #[serde(rename = "OnlineSecurity")]
    pub online_security:   AddOnService,
    #[serde(rename = "OnlineBackup")]
    pub online_backup:     AddOnService,
    #[serde(rename = "DeviceProtection")]
    pub device_protection: AddOnService,
    #[serde(rename = "TechSupport")]
    pub tech_support:      AddOnService,
    #[serde(rename = "StreamingTV")]
    pub streaming_tv:      AddOnService,
    #[serde(rename = "StreamingMovies")]
    pub streaming_movies:  AddOnService,
    #[serde(rename = "Contract")]
    pub contract:          Contract,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: YesNo,
    #[serde(rename = "PaymentMethod")]
    pub payment_method:    PaymentMethod,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges:   Charge,
    #[serde(rename = "TotalCharges")]
    pub total_charges:     Charge,
    #[serde(rename = "Churn")]
    pub churn:             YesNo,
}

impl CustomerRecord {
    pub fn churned(&self) -> bool {
        self.churn.is_yes()
    }

    pub fn tenure_band(&self) -> TenureBand {
        TenureBand::from_tenure(self.tenure)
    }

    pub fn charge_segment(&self) -> ChargeSegment {
        ChargeSegment::from_monthly_charges(self.monthly_charges)
    }

    /// Check the numeric columns. Categorical columns are valid by construction.
    pub fn validate(&self) -> ChurnResult<()> {
        if !self.monthly_charges.is_finite() || self.monthly_charges <= 0.0 {
            return Err(ChurnError::domain("MonthlyCharges", self.monthly_charges.to_string()));
        }
        if !self.total_charges.is_finite() || self.total_charges < 0.0 {
            return Err(ChurnError::domain("TotalCharges", self.total_charges.to_string()));
        }
        Ok(())
    }
}

// ── Group-key values ─────────────────────────────────────────────────────────

/// One component of a group key: a categorical value ordered by its position
/// in the domain, so grouped output follows domain order rather than
/// alphabetical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryValue {
    pub rank:  u8,
    pub label: &'static str,
}

impl CategoryValue {
    pub fn of<T: Categorical>(value: T) -> Self {
        Self { rank: value.rank(), label: value.label() }
    }
}

impl Ord for CategoryValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank.cmp(&other.rank).then_with(|| self.label.cmp(other.label))
    }
}

impl PartialOrd for CategoryValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

impl Serialize for CategoryValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label)
    }
}

// ── Field vocabulary ─────────────────────────────────────────────────────────

/// A categorical column (source or derived) that records can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Gender,
    SeniorCitizen,
    Partner,
    Dependents,
    PhoneService,
    MultipleLines,
    InternetService,
    OnlineSecurity,
    OnlineBackup,
    DeviceProtection,
    TechSupport,
    StreamingTv,
    StreamingMovies,
    Contract,
    PaperlessBilling,
    PaymentMethod,
    Churn,
    /// Derived: tenure partitioned into [`TenureBand`]s.
    TenureGroup,
    /// Derived: monthly charges partitioned into [`ChargeSegment`]s.
    ChargesGroup,
}

impl Field {
    pub const ALL: &'static [Field] = &[
        Self::Gender,
        Self::SeniorCitizen,
        Self::Partner,
        Self::Dependents,
        Self::PhoneService,
        Self::MultipleLines,
        Self::InternetService,
        Self::OnlineSecurity,
        Self::OnlineBackup,
        Self::DeviceProtection,
        Self::TechSupport,
        Self::StreamingTv,
        Self::StreamingMovies,
        Self::Contract,
        Self::PaperlessBilling,
        Self::PaymentMethod,
        Self::Churn,
        Self::TenureGroup,
        Self::ChargesGroup,
    ];

    /// Demographic columns.
    pub const DEMOGRAPHICS: &'static [Field] = &[
        Self::Gender,
        Self::SeniorCitizen,
        Self::Partner,
        Self::Dependents,
    ];

    /// Service columns, in the order the services view lists them.
    pub const SERVICES: &'static [Field] = &[
        Self::PhoneService,
        Self::MultipleLines,
        Self::InternetService,
        Self::OnlineSecurity,
        Self::OnlineBackup,
        Self::DeviceProtection,
        Self::TechSupport,
        Self::StreamingTv,
        Self::StreamingMovies,
    ];

    /// Column header (source fields) or derived column name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gender           => "gender",
            Self::SeniorCitizen    => "SeniorCitizen",
            Self::Partner          => "Partner",
            Self::Dependents       => "Dependents",
            Self::PhoneService     => "PhoneService",
            Self::MultipleLines    => "MultipleLines",
            Self::InternetService  => "InternetService",
            Self::OnlineSecurity   => "OnlineSecurity",
            Self::OnlineBackup     => "OnlineBackup",
            Self::DeviceProtection => "DeviceProtection",
            Self::TechSupport      => "TechSupport",
            Self::StreamingTv      => "StreamingTV",
            Self::StreamingMovies  => "StreamingMovies",
            Self::Contract         => "Contract",
            Self::PaperlessBilling => "PaperlessBilling",
            Self::PaymentMethod    => "PaymentMethod",
            Self::Churn            => "Churn",
            Self::TenureGroup      => "tenure_group",
            Self::ChargesGroup     => "charges_group",
        }
    }

    /// The value of this field for `record`.
    pub fn value_of(&self, record: &CustomerRecord) -> CategoryValue {
        match self {
            Self::Gender           => CategoryValue::of(record.gender),
            Self::SeniorCitizen    => CategoryValue::of(record.senior_citizen),
            Self::Partner          => CategoryValue::of(record.partner),
            Self::Dependents       => CategoryValue::of(record.dependents),
            Self::PhoneService     => CategoryValue::of(record.phone_service),
            Self::MultipleLines    => CategoryValue::of(record.multiple_lines),
            Self::InternetService  => CategoryValue::of(record.internet_service),
            Self::OnlineSecurity   => CategoryValue::of(record.online_security),
            Self::OnlineBackup     => CategoryValue::of(record.online_backup),
            Self::DeviceProtection => CategoryValue::of(record.device_protection),
            Self::TechSupport      => CategoryValue::of(record.tech_support),
            Self::StreamingTv      => CategoryValue::of(record.streaming_tv),
            Self::StreamingMovies  => CategoryValue::of(record.streaming_movies),
            Self::Contract         => CategoryValue::of(record.contract),
            Self::PaperlessBilling => CategoryValue::of(record.paperless_billing),
            Self::PaymentMethod    => CategoryValue::of(record.payment_method),
            Self::Churn            => CategoryValue::of(record.churn),
            Self::TenureGroup      => CategoryValue::of(record.tenure_band()),
            Self::ChargesGroup     => CategoryValue::of(record.charge_segment()),
        }
    }

    /// Every label this field can take, in domain order.
    pub fn domain_labels(&self) -> Vec<&'static str> {
        fn labels<T: Categorical>() -> Vec<&'static str> {
            T::ALL.iter().map(|v| v.label()).collect()
        }
        match self {
            Self::Gender => labels::<Gender>(),
            Self::SeniorCitizen
            | Self::Partner
            | Self::Dependents
            | Self::PhoneService
            | Self::PaperlessBilling
            | Self::Churn => labels::<YesNo>(),
            Self::MultipleLines => labels::<MultipleLines>(),
            Self::InternetService => labels::<InternetService>(),
            Self::OnlineSecurity
            | Self::OnlineBackup
            | Self::DeviceProtection
            | Self::TechSupport
            | Self::StreamingTv
            | Self::StreamingMovies => labels::<AddOnService>(),
            Self::Contract => labels::<Contract>(),
            Self::PaymentMethod => labels::<PaymentMethod>(),
            Self::TenureGroup => labels::<TenureBand>(),
            Self::ChargesGroup => labels::<ChargeSegment>(),
        }
    }
}

impl FromStr for Field {
    type Err = ChurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| ChurnError::UnknownField { name: s.to_string() })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A numeric column usable in correlations and averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    Tenure,
    MonthlyCharges,
    TotalCharges,
}

impl NumericField {
    pub const ALL: &'static [NumericField] =
        &[Self::Tenure, Self::MonthlyCharges, Self::TotalCharges];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tenure         => "tenure",
            Self::MonthlyCharges => "MonthlyCharges",
            Self::TotalCharges   => "TotalCharges",
        }
    }

    pub fn value_of(&self, record: &CustomerRecord) -> f64 {
        match self {
            Self::Tenure         => f64::from(record.tenure),
            Self::MonthlyCharges => record.monthly_charges,
            Self::TotalCharges   => record.total_charges,
        }
    }
}

impl FromStr for NumericField {
    type Err = ChurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| ChurnError::UnknownField { name: s.to_string() })
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for NumericField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
