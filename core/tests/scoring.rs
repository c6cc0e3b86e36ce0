//! Risk scoring: pinned profiles, boundaries, clamping and rule order.

use approx::assert_relative_eq;
use churn_core::{
    domain::{AddOnService, Categorical, Contract, InternetService, PaymentMethod, YesNo},
    error::ChurnError,
    scoring::{
        self, internet_guard, AdjustmentRule, RiskProfile, RiskTier, ADJUSTMENT_RULES,
        BASELINE_CHURN_PERCENT,
    },
};

fn high_risk_profile() -> RiskProfile {
    RiskProfile {
        contract:          Contract::MonthToMonth,
        tenure:            5,
        internet_service:  InternetService::FiberOptic,
        online_security:   AddOnService::No,
        tech_support:      AddOnService::No,
        payment_method:    PaymentMethod::ElectronicCheck,
        monthly_charges:   95.0,
        senior_citizen:    YesNo::Yes,
        paperless_billing: YesNo::Yes,
    }
}

fn low_risk_profile() -> RiskProfile {
    RiskProfile {
        contract:          Contract::TwoYear,
        tenure:            60,
        internet_service:  InternetService::No,
        online_security:   AddOnService::NoInternetService,
        tech_support:      AddOnService::NoInternetService,
        payment_method:    PaymentMethod::BankTransferAuto,
        monthly_charges:   30.0,
        senior_citizen:    YesNo::No,
        paperless_billing: YesNo::No,
    }
}

#[test]
fn every_adjustment_firing_clamps_to_99() {
    let assessment = scoring::score(&high_risk_profile());
    let expected_raw = 26.54 * 1.6 * 1.8 * 1.5 * 1.3 * 1.3 * 1.4 * 1.3 * 1.2 * 1.1;

    assert_eq!(assessment.raw_probability, expected_raw, "Fold order changed the product");
    assert_eq!(assessment.probability, 99.0);
    assert_eq!(assessment.tier, RiskTier::VeryHigh);

    let fired: Vec<&str> = assessment.applied.iter().map(|a| a.rule).collect();
    assert_eq!(
        fired,
        vec![
            "contract_month_to_month",
            "tenure_under_12",
            "internet_fiber_optic",
            "no_online_security",
            "no_tech_support",
            "payment_electronic_check",
            "charges_over_80",
            "senior_citizen",
            "paperless_billing",
        ]
    );
}

#[test]
fn every_discount_firing_clamps_to_1() {
    let assessment = scoring::score(&low_risk_profile());
    let expected_raw = 26.54 * 0.11 * 0.4 * 0.3 * 0.7 * 0.7;

    assert_eq!(assessment.raw_probability, expected_raw);
    assert!(assessment.raw_probability < 1.0);
    assert_eq!(assessment.probability, 1.0);
    assert_eq!(assessment.tier, RiskTier::Low);
}

#[test]
fn tenure_boundaries_are_neutral() {
    let base = RiskProfile { tenure: 20, ..RiskProfile::default() };
    let neutral = scoring::score(&base).probability;

    for tenure in [12, 40] {
        let p = scoring::score(&RiskProfile { tenure, ..base.clone() }).probability;
        assert_eq!(p, neutral, "tenure={tenure} must not trigger a tenure adjustment");
    }
    assert!(scoring::score(&RiskProfile { tenure: 11, ..base.clone() }).probability > neutral);
    assert!(scoring::score(&RiskProfile { tenure: 41, ..base }).probability < neutral);
}

#[test]
fn charge_boundaries_are_neutral() {
    let base = RiskProfile { monthly_charges: 60.0, ..RiskProfile::default() };
    let neutral = scoring::score(&base).raw_probability;
    for monthly_charges in [40.0, 80.0] {
        let raw = scoring::score(&RiskProfile { monthly_charges, ..base.clone() }).raw_probability;
        assert_eq!(raw, neutral, "MonthlyCharges={monthly_charges} must be neutral");
    }
}

/// Exhaustive over categoricals and a grid of numeric extremes.
#[test]
fn probability_always_within_clamp() {
    let tenures = [0, 1, 11, 12, 40, 41, 72];
    let charges = [18.0, 39.99, 40.0, 80.0, 80.01, 120.0];
    let mut scored = 0usize;

    for contract in Contract::ALL {
        for internet in InternetService::ALL {
            for security in AddOnService::ALL {
                for support in AddOnService::ALL {
                    for payment in PaymentMethod::ALL {
                        for senior in YesNo::ALL {
                            for paperless in YesNo::ALL {
                                for tenure in tenures {
                                    for monthly_charges in charges {
                                        let profile = RiskProfile {
                                            contract:          *contract,
                                            internet_service:  *internet,
                                            online_security:   *security,
                                            tech_support:      *support,
                                            payment_method:    *payment,
                                            paperless_billing: *paperless,
                                            tenure,
                                            monthly_charges,
                                            senior_citizen:    *senior,
                                        };
                                        let a = scoring::score(&profile);
                                        assert!(
                                            (1.0..=99.0).contains(&a.probability),
                                            "{profile:?} scored {}",
                                            a.probability
                                        );
                                        assert_eq!(a.tier, RiskTier::from_probability(a.probability));
                                        scored += 1;
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    assert_eq!(scored, 3 * 3 * 3 * 3 * 4 * 2 * 2 * 7 * 6);
}

#[test]
fn tier_upper_bounds_are_exclusive() {
    assert_eq!(RiskTier::from_probability(1.0), RiskTier::Low);
    assert_eq!(RiskTier::from_probability(19.999), RiskTier::Low);
    assert_eq!(RiskTier::from_probability(20.0), RiskTier::Moderate);
    assert_eq!(RiskTier::from_probability(40.0), RiskTier::High);
    assert_eq!(RiskTier::from_probability(59.99), RiskTier::High);
    assert_eq!(RiskTier::from_probability(60.0), RiskTier::VeryHigh);
}

#[test]
fn tiers_carry_labels_and_strategies() {
    assert_eq!(RiskTier::Low.label(), "Low Risk");
    assert_eq!(RiskTier::VeryHigh.to_string(), "Very High Risk");
    for tier in [RiskTier::Low, RiskTier::Moderate, RiskTier::High, RiskTier::VeryHigh] {
        assert!(tier.retention_strategies().len() >= 4, "{tier} has too few strategies");
    }
}

#[test]
fn empty_rule_table_returns_baseline() {
    let a = scoring::score_with(&[], &high_risk_profile());
    assert_eq!(a.raw_probability, BASELINE_CHURN_PERCENT);
    assert_eq!(a.tier, RiskTier::Moderate);
    assert!(a.applied.is_empty());
}

#[test]
fn custom_rule_tables_fold_in_order() {
    let rules = [
        AdjustmentRule { name: "double", applies: |_| true, factor: 2.0 },
        AdjustmentRule { name: "never", applies: |_| false, factor: 10.0 },
        AdjustmentRule { name: "halve_seniors", applies: |p| p.senior_citizen.is_yes(), factor: 0.5 },
    ];
    let a = scoring::score_with(&rules, &high_risk_profile());
    assert_relative_eq!(a.raw_probability, BASELINE_CHURN_PERCENT);
    let fired: Vec<&str> = a.applied.iter().map(|x| x.rule).collect();
    assert_eq!(fired, vec!["double", "halve_seniors"]);
}

#[test]
fn rule_table_order_is_pinned() {
    let names: Vec<&str> = ADJUSTMENT_RULES.iter().map(|r| r.name).collect();
    assert_eq!(
        names,
        vec![
            "contract_month_to_month",
            "contract_one_year",
            "contract_two_year",
            "tenure_under_12",
            "tenure_over_40",
            "internet_fiber_optic",
            "internet_none",
            "no_online_security",
            "no_tech_support",
            "payment_electronic_check",
            "payment_automatic",
            "charges_over_80",
            "charges_under_40",
            "senior_citizen",
            "paperless_billing",
        ]
    );
}

/// The security/support guard never excludes anyone, even customers
/// without internet service.
#[test]
fn internet_guard_holds_for_every_internet_value() {
    for internet in InternetService::ALL {
        let profile = RiskProfile { internet_service: *internet, ..RiskProfile::default() };
        assert!(internet_guard(&profile), "guard failed for {internet}");
    }

    let no_internet = RiskProfile {
        internet_service: InternetService::No,
        online_security:  AddOnService::No,
        ..RiskProfile::default()
    };
    let fired: Vec<&str> = scoring::score(&no_internet).applied.iter().map(|a| a.rule).collect();
    assert!(fired.contains(&"no_online_security"));
}

#[test]
fn default_form_state_scores_very_high() {
    let a = scoring::score(&RiskProfile::default());
    assert_relative_eq!(a.probability, 26.54 * 1.6 * 1.4 * 1.1, epsilon = 1e-9);
    assert_eq!(a.tier, RiskTier::VeryHigh);
}

#[test]
fn validate_rejects_out_of_range_numerics() {
    assert!(RiskProfile::default().validate().is_ok());

    let err = RiskProfile { tenure: 73, ..RiskProfile::default() }.validate().unwrap_err();
    assert!(matches!(err, ChurnError::DomainViolation { field: "tenure", .. }), "got {err}");

    let err = RiskProfile { monthly_charges: 17.5, ..RiskProfile::default() }.validate().unwrap_err();
    assert!(matches!(err, ChurnError::DomainViolation { field: "MonthlyCharges", .. }), "got {err}");
}

#[test]
fn profile_deserializes_from_dataset_labels() {
    let json = r#"{
        "Contract": "One year",
        "InternetService": "Fiber optic",
        "OnlineSecurity": "No internet service",
        "TechSupport": "Yes",
        "PaymentMethod": "Mailed check",
        "PaperlessBilling": "No",
        "tenure": 24,
        "MonthlyCharges": 85.5,
        "SeniorCitizen": "No"
    }"#;
    let profile: RiskProfile = serde_json::from_str(json).unwrap();
    assert_eq!(profile.contract, Contract::OneYear);
    assert_eq!(profile.online_security, AddOnService::NoInternetService);

    let a = scoring::score(&profile);
    assert_relative_eq!(a.raw_probability, 26.54 * 0.42 * 1.5 * 1.3, epsilon = 1e-9);
    assert_eq!(a.tier, RiskTier::Moderate);
}
