//! Rule-based churn-risk estimator.
//!
//! Scoring a profile:
//!   1. Start from the dataset-wide baseline churn rate (a constant).
//!   2. Fold the ordered adjustment table over the running probability; every
//!      rule whose predicate holds multiplies it by the rule's factor.
//!   3. Clamp to [1, 99].
//!   4. Classify into a risk tier.
//!
//! The rule order is part of the model: the fold is floating-point, so
//! reordering rules changes the last bits of the result.

use crate::{
    domain::{AddOnService, Categorical, Contract, InternetService, PaymentMethod, YesNo},
    error::{ChurnError, ChurnResult},
    types::{Charge, Months, Percent},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dataset-wide churn rate the estimate starts from. Not recomputed from the
/// loaded records.
pub const BASELINE_CHURN_PERCENT: Percent = 26.54;
pub const MIN_PROBABILITY: Percent = 1.0;
pub const MAX_PROBABILITY: Percent = 99.0;

pub const TENURE_RANGE: (Months, Months) = (0, 72);
pub const MONTHLY_CHARGES_RANGE: (Charge, Charge) = (18.0, 120.0);

// ── Profile ──────────────────────────────────────────────────────────────────

/// Inputs of one scoring call. Created per call, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    #[serde(rename = "Contract")]
    pub contract:          Contract,
    #[serde(rename = "InternetService")]
    pub internet_service:  InternetService,
    #[serde(rename = "OnlineSecurity")]
    pub online_security:   AddOnService,
    #[serde(rename = "TechSupport")]
    pub tech_support:      AddOnService,
    #[serde(rename = "PaymentMethod")]
    pub payment_method:    PaymentMethod,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: YesNo,
    #[serde(rename = "tenure")]
    pub tenure:            Months,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges:   Charge,
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen:    YesNo,
}

impl Default for RiskProfile {
    /// The calculator's initial form state.
    fn default() -> Self {
        Self {
            contract:          Contract::MonthToMonth,
            internet_service:  InternetService::Dsl,
            online_security:   AddOnService::Yes,
            tech_support:      AddOnService::Yes,
            payment_method:    PaymentMethod::ElectronicCheck,
            paperless_billing: YesNo::Yes,
            tenure:            12,
            monthly_charges:   70.0,
            senior_citizen:    YesNo::No,
        }
    }
}

impl RiskProfile {
    /// Reject numerics outside the calculator's input ranges. Categorical
    /// fields are in-domain by construction.
    pub fn validate(&self) -> ChurnResult<()> {
        let (t_min, t_max) = TENURE_RANGE;
        if !(t_min..=t_max).contains(&self.tenure) {
            return Err(ChurnError::domain("tenure", self.tenure.to_string()));
        }
        let (m_min, m_max) = MONTHLY_CHARGES_RANGE;
        if !(m_min..=m_max).contains(&self.monthly_charges) {
            return Err(ChurnError::domain("MonthlyCharges", self.monthly_charges.to_string()));
        }
        Ok(())
    }
}

// ── Rule table ───────────────────────────────────────────────────────────────

/// One multiplicative adjustment: when `applies` holds, the running
/// probability is multiplied by `factor`.
#[derive(Clone, Copy)]
pub struct AdjustmentRule {
    pub name:    &'static str,
    pub applies: fn(&RiskProfile) -> bool,
    pub factor:  f64,
}

impl fmt::Debug for AdjustmentRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdjustmentRule")
            .field("name", &self.name)
            .field("factor", &self.factor)
            .finish()
    }
}

/// Guard for the security and support rules. It compares the InternetService
/// label with the add-on domain's "No internet service" label, which
/// InternetService never takes, so it holds for every profile.
pub fn internet_guard(profile: &RiskProfile) -> bool {
    profile.internet_service.label() != AddOnService::NoInternetService.label()
}

/// The estimator's rules, in application order.
pub const ADJUSTMENT_RULES: &[AdjustmentRule] = &[
    // Contract
    AdjustmentRule {
        name:    "contract_month_to_month",
        applies: |p| p.contract == Contract::MonthToMonth,
        factor:  1.6,
    },
    AdjustmentRule {
        name:    "contract_one_year",
        applies: |p| p.contract == Contract::OneYear,
        factor:  0.42,
    },
    AdjustmentRule {
        name:    "contract_two_year",
        applies: |p| p.contract == Contract::TwoYear,
        factor:  0.11,
    },
    // Tenure: strict bounds, 12 and 40 are neutral
    AdjustmentRule {
        name:    "tenure_under_12",
        applies: |p| p.tenure < 12,
        factor:  1.8,
    },
    AdjustmentRule {
        name:    "tenure_over_40",
        applies: |p| p.tenure > 40,
        factor:  0.4,
    },
    // Internet service; DSL is neutral
    AdjustmentRule {
        name:    "internet_fiber_optic",
        applies: |p| p.internet_service == InternetService::FiberOptic,
        factor:  1.5,
    },
    AdjustmentRule {
        name:    "internet_none",
        applies: |p| p.internet_service == InternetService::No,
        factor:  0.3,
    },
    // Security and support
    AdjustmentRule {
        name:    "no_online_security",
        applies: |p| p.online_security == AddOnService::No && internet_guard(p),
        factor:  1.3,
    },
    AdjustmentRule {
        name:    "no_tech_support",
        applies: |p| p.tech_support == AddOnService::No && internet_guard(p),
        factor:  1.3,
    },
    // Payment method; mailed check is neutral
    AdjustmentRule {
        name:    "payment_electronic_check",
        applies: |p| p.payment_method == PaymentMethod::ElectronicCheck,
        factor:  1.4,
    },
    AdjustmentRule {
        name:    "payment_automatic",
        applies: |p| p.payment_method.is_automatic(),
        factor:  0.7,
    },
    // Monthly charges
    AdjustmentRule {
        name:    "charges_over_80",
        applies: |p| p.monthly_charges > 80.0,
        factor:  1.3,
    },
    AdjustmentRule {
        name:    "charges_under_40",
        applies: |p| p.monthly_charges < 40.0,
        factor:  0.7,
    },
    AdjustmentRule {
        name:    "senior_citizen",
        applies: |p| p.senior_citizen.is_yes(),
        factor:  1.2,
    },
    AdjustmentRule {
        name:    "paperless_billing",
        applies: |p| p.paperless_billing.is_yes(),
        factor:  1.1,
    },
];

// ── Tiers ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskTier {
    /// Upper bounds are exclusive: exactly 20 is Moderate.
    pub fn from_probability(probability: Percent) -> Self {
        if probability < 20.0 {
            Self::Low
        } else if probability < 40.0 {
            Self::Moderate
        } else if probability < 60.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low      => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High     => "High Risk",
            Self::VeryHigh => "Very High Risk",
        }
    }

    /// Recommended retention actions for customers in this tier.
    pub fn retention_strategies(&self) -> &'static [&'static str] {
        match self {
            Self::Low => &[
                "Maintain current service quality and relationship",
                "Consider upselling additional services",
                "Implement loyalty rewards program",
                "Gather feedback to understand what's working well",
            ],
            Self::Moderate => &[
                "Proactive check-ins to address any emerging issues",
                "Offer service upgrades or bundle discounts",
                "Provide educational resources about service benefits",
                "Consider contract extension incentives",
            ],
            Self::High => &[
                "Immediate outreach to address potential issues",
                "Offer significant discounts for contract extensions",
                "Provide free trials of security and support services",
                "Consider personalized retention offers",
                "Implement regular satisfaction check-ins",
            ],
            Self::VeryHigh => &[
                "Urgent intervention with dedicated retention specialist",
                "Offer substantial discounts or contract restructuring",
                "Provide complimentary service upgrades",
                "Address specific pain points with customized solutions",
                "Consider win-back strategies if preventive measures fail",
            ],
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Scoring ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedAdjustment {
    pub rule:   &'static str,
    pub factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    /// Clamped estimate in [1, 99].
    pub probability:     Percent,
    /// Product before clamping.
    pub raw_probability: Percent,
    pub tier:            RiskTier,
    /// Rules that fired, in application order.
    pub applied:         Vec<AppliedAdjustment>,
}

/// Score `profile` with the built-in rule table.
pub fn score(profile: &RiskProfile) -> RiskAssessment {
    score_with(ADJUSTMENT_RULES, profile)
}

/// Score `profile` by folding `rules` left to right over the baseline.
pub fn score_with(rules: &[AdjustmentRule], profile: &RiskProfile) -> RiskAssessment {
    let mut applied = Vec::new();
    let raw_probability = rules.iter().fold(BASELINE_CHURN_PERCENT, |running, rule| {
        if (rule.applies)(profile) {
            applied.push(AppliedAdjustment { rule: rule.name, factor: rule.factor });
            running * rule.factor
        } else {
            running
        }
    });

    let probability = raw_probability.clamp(MIN_PROBABILITY, MAX_PROBABILITY);
    let tier = RiskTier::from_probability(probability);

    log::debug!(
        "score: raw={raw_probability:.4} clamped={probability:.2} tier={} rules={}",
        tier.label(),
        applied.len(),
    );

    RiskAssessment { probability, raw_probability, tier, applied }
}
