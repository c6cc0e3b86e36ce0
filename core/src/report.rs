//! Per-page data bundles for the presentation layer.
//!
//! Each section holds exactly what one dashboard page renders; nothing here
//! formats or lays anything out.

use crate::{
    aggregate::{self, ChurnRateRow, PivotGrid, RecordFilter, SummaryMetrics},
    error::{ChurnError, ChurnResult},
    record::{CustomerRecord, Field, NumericField},
    types::Percent,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// How many demographic combinations the demographics page lists.
pub const TOP_COMBINATIONS: usize = 10;

/// Categorical fields ranked on the prediction page.
pub const IMPORTANCE_FIELDS: &[Field] = &[
    Field::Contract,
    Field::PaymentMethod,
    Field::InternetService,
    Field::OnlineSecurity,
    Field::TechSupport,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: &'static str,
    pub count: usize,
}

/// A field's value counts, in domain order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub field:  Field,
    pub counts: Vec<ValueCount>,
}

impl Distribution {
    fn of(records: &[&CustomerRecord], field: Field) -> Self {
        let counts = aggregate::distribution(records.iter().copied(), field)
            .into_iter()
            .map(|(value, count)| ValueCount { value: value.label, count })
            .collect();
        Self { field, counts }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChurn {
    pub field: Field,
    pub rows:  Vec<ChurnRateRow>,
}

impl FieldChurn {
    fn of(records: &[&CustomerRecord], field: Field) -> ChurnResult<Self> {
        Ok(Self { field, rows: rows_by(records, &[field])? })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSection {
    pub metrics:             SummaryMetrics,
    pub by_contract:         Vec<ChurnRateRow>,
    pub by_tenure_group:     Vec<ChurnRateRow>,
    pub charges_by_contract: PivotGrid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicsSection {
    pub distributions:    Vec<Distribution>,
    pub churn_by_field:   Vec<FieldChurn>,
    /// Highest-churn combinations of all four demographic fields.
    pub top_combinations: Vec<ChurnRateRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServicesSection {
    pub churn_by_service: Vec<FieldChurn>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractChargesSection {
    pub by_contract:         Vec<ChurnRateRow>,
    pub by_payment_method:   Vec<ChurnRateRow>,
    pub by_charges_group:    Vec<ChurnRateRow>,
    pub contract_by_charges: PivotGrid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature:    String,
    /// Peak group churn rate for categorical features, |r| for numeric ones.
    pub importance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionSection {
    pub categorical: Vec<FeatureImportance>,
    pub numeric:     Vec<FeatureImportance>,
}

/// Every page's data, computed from one record set. The filter that selected
/// the records is echoed back so a page can show what it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub generated_at:     DateTime<Utc>,
    pub filter:           RecordFilter,
    pub executive:        ExecutiveSection,
    pub demographics:     DemographicsSection,
    pub services:         ServicesSection,
    pub contract_charges: ContractChargesSection,
    pub prediction:       PredictionSection,
}

impl DashboardReport {
    pub fn build(records: &[CustomerRecord]) -> ChurnResult<Self> {
        Self::build_filtered(records, &RecordFilter::new())
    }

    /// Build every section from the records `filter` lets through.
    pub fn build_filtered(records: &[CustomerRecord], filter: &RecordFilter) -> ChurnResult<Self> {
        let kept = filter.apply(records);
        if kept.is_empty() {
            return Err(ChurnError::degenerate(format!(
                "no records to report on ({} before filtering)",
                records.len()
            )));
        }

        let report = Self {
            generated_at:     Utc::now(),
            filter:           filter.clone(),
            executive:        executive(&kept)?,
            demographics:     demographics(&kept)?,
            services:         services(&kept)?,
            contract_charges: contract_charges(&kept)?,
            prediction:       prediction(&kept)?,
        };
        log::info!("report: built from {} of {} records", kept.len(), records.len());
        Ok(report)
    }
}

fn rows_by(records: &[&CustomerRecord], fields: &[Field]) -> ChurnResult<Vec<ChurnRateRow>> {
    Ok(aggregate::churn_rate(records.iter().copied(), fields)?.rows())
}

fn executive(records: &[&CustomerRecord]) -> ChurnResult<ExecutiveSection> {
    Ok(ExecutiveSection {
        metrics:             aggregate::summarize(records.iter().copied())?,
        by_contract:         rows_by(records, &[Field::Contract])?,
        by_tenure_group:     rows_by(records, &[Field::TenureGroup])?,
        charges_by_contract: aggregate::churn_rate(records.iter().copied(), &[Field::ChargesGroup, Field::Contract])?
            .pivot()?,
    })
}

fn demographics(records: &[&CustomerRecord]) -> ChurnResult<DemographicsSection> {
    let distributions = Field::DEMOGRAPHICS
        .iter()
        .map(|f| Distribution::of(records, *f))
        .collect();
    let churn_by_field = Field::DEMOGRAPHICS
        .iter()
        .map(|f| FieldChurn::of(records, *f))
        .collect::<ChurnResult<Vec<_>>>()?;

    let mut top_combinations = aggregate::churn_rate(records.iter().copied(), Field::DEMOGRAPHICS)?.ranked();
    top_combinations.truncate(TOP_COMBINATIONS);

    Ok(DemographicsSection { distributions, churn_by_field, top_combinations })
}

fn services(records: &[&CustomerRecord]) -> ChurnResult<ServicesSection> {
    let churn_by_service = Field::SERVICES
        .iter()
        .map(|f| FieldChurn::of(records, *f))
        .collect::<ChurnResult<Vec<_>>>()?;
    Ok(ServicesSection { churn_by_service })
}

fn contract_charges(records: &[&CustomerRecord]) -> ChurnResult<ContractChargesSection> {
    Ok(ContractChargesSection {
        by_contract:         rows_by(records, &[Field::Contract])?,
        by_payment_method:   rows_by(records, &[Field::PaymentMethod])?,
        by_charges_group:    rows_by(records, &[Field::ChargesGroup])?,
        contract_by_charges: aggregate::churn_rate(records.iter().copied(), &[Field::Contract, Field::ChargesGroup])?
            .pivot()?,
    })
}

fn prediction(records: &[&CustomerRecord]) -> ChurnResult<PredictionSection> {
    let categorical = IMPORTANCE_FIELDS
        .iter()
        .map(|f| {
            let peak: Option<Percent> = aggregate::churn_rate(records.iter().copied(), &[*f])?.peak();
            Ok(FeatureImportance { feature: f.name().to_string(), importance: peak })
        })
        .collect::<ChurnResult<Vec<_>>>()?;

    let numeric = NumericField::ALL
        .iter()
        .map(|f| {
            let importance = match aggregate::correlation(records.iter().copied(), *f) {
                Ok(r) => Some(r.abs()),
                Err(ChurnError::DegenerateAggregate { reason }) => {
                    log::debug!("report: no importance for {f}: {reason}");
                    None
                }
                Err(e) => return Err(e),
            };
            Ok(FeatureImportance { feature: f.name().to_string(), importance })
        })
        .collect::<ChurnResult<Vec<_>>>()?;

    Ok(PredictionSection { categorical, numeric })
}
