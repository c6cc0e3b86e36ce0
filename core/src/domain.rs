//! Categorical domains of the churn dataset.
//!
//! RULE: every categorical column is a closed enum. The dataset label (the
//! exact text found in the source CSV) is the one canonical string form:
//! CSV parsing, serde names and aggregate group keys all use it.

use crate::error::{ChurnError, ChurnResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed categorical domain with a fixed member order.
pub trait Categorical: Copy + PartialEq + Sized + 'static {
    /// Every member, in domain order.
    const ALL: &'static [Self];

    /// The dataset label of this member.
    fn label(&self) -> &'static str;

    /// Position of this member in domain order.
    fn rank(&self) -> u8 {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0) as u8
    }

    /// Parse a dataset label for column `field`. Surrounding whitespace is
    /// ignored; anything else outside the domain is a `DomainViolation`.
    fn parse(field: &'static str, raw: &str) -> ChurnResult<Self> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.label() == raw)
            .ok_or_else(|| ChurnError::domain(field, raw))
    }
}

macro_rules! categorical {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl Categorical for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

categorical! {
    pub enum Gender {
        Male => "Male",
        Female => "Female",
    }
}

categorical! {
    /// Two-valued flag used by SeniorCitizen, Partner, Dependents,
    /// PhoneService, PaperlessBilling and Churn.
    pub enum YesNo {
        Yes => "Yes",
        No => "No",
    }
}

categorical! {
    pub enum MultipleLines {
        Yes => "Yes",
        No => "No",
        NoPhoneService => "No phone service",
    }
}

categorical! {
    pub enum InternetService {
        Dsl => "DSL",
        FiberOptic => "Fiber optic",
        No => "No",
    }
}

categorical! {
    /// OnlineSecurity, OnlineBackup, DeviceProtection, TechSupport,
    /// StreamingTV and StreamingMovies all share this domain.
    pub enum AddOnService {
        Yes => "Yes",
        No => "No",
        NoInternetService => "No internet service",
    }
}

categorical! {
    pub enum Contract {
        MonthToMonth => "Month-to-month",
        OneYear => "One year",
        TwoYear => "Two year",
    }
}

categorical! {
    pub enum PaymentMethod {
        ElectronicCheck => "Electronic check",
        MailedCheck => "Mailed check",
        BankTransferAuto => "Bank transfer (automatic)",
        CreditCardAuto => "Credit card (automatic)",
    }
}

categorical! {
    /// Tenure bands used by the churn-by-tenure views.
    pub enum TenureBand {
        UpTo12 => "0-12",
        From13To24 => "13-24",
        From25To36 => "25-36",
        From37To48 => "37-48",
        Over48 => "49+",
    }
}

categorical! {
    /// Monthly-charge segments used by the segment views.
    pub enum ChargeSegment {
        Low => "Low",
        Medium => "Medium",
        High => "High",
    }
}

impl TenureBand {
    /// Right-inclusive bins: [0,12], (12,24], (24,36], (36,48], (48,..).
    pub fn from_tenure(months: u32) -> Self {
        match months {
            0..=12 => Self::UpTo12,
            13..=24 => Self::From13To24,
            25..=36 => Self::From25To36,
            37..=48 => Self::From37To48,
            _ => Self::Over48,
        }
    }
}

impl ChargeSegment {
    /// Right-inclusive bins: (..,40], (40,80], (80,..).
    pub fn from_monthly_charges(charges: f64) -> Self {
        if charges <= 40.0 {
            Self::Low
        } else if charges <= 80.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl YesNo {
    pub fn is_yes(&self) -> bool {
        *self == Self::Yes
    }

    /// Map the raw 0/1 senior-citizen indicator onto the Yes/No domain.
    pub fn from_indicator(field: &'static str, indicator: u8) -> ChurnResult<Self> {
        match indicator {
            0 => Ok(Self::No),
            1 => Ok(Self::Yes),
            other => Err(ChurnError::domain(field, other.to_string())),
        }
    }
}

impl PaymentMethod {
    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::BankTransferAuto | Self::CreditCardAuto)
    }
}
