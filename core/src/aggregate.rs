//! Aggregate statistics over the record set.
//!
//! Everything here is a pure function of its inputs: no caching, no
//! incremental state. Results are keyed by domain order, so the order of
//! input rows never changes the output.

use crate::{
    error::{ChurnError, ChurnResult},
    record::{CategoryValue, CustomerRecord, Field, NumericField},
    types::Percent,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// One group key: a value per grouping field, in grouping-field order.
pub type GroupKey = Vec<CategoryValue>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupStat {
    pub members: usize,
    pub churned: usize,
}

impl GroupStat {
    /// 100 × churned / members. Groups are never empty.
    pub fn churn_rate(&self) -> Percent {
        100.0 * self.churned as f64 / self.members as f64
    }
}

/// A flattened, serialisable row of a [`ChurnRateTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChurnRateRow {
    pub key:        Vec<&'static str>,
    pub members:    usize,
    pub churned:    usize,
    pub churn_rate: Percent,
}

/// Churn rates per observed group for an ordered list of grouping fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ChurnRateTable {
    pub fields: Vec<Field>,
    pub groups: BTreeMap<GroupKey, GroupStat>,
}

impl ChurnRateTable {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_members(&self) -> usize {
        self.groups.values().map(|g| g.members).sum()
    }

    /// Rate for the group whose key labels equal `labels`.
    pub fn rate_for(&self, labels: &[&str]) -> Option<Percent> {
        self.groups
            .iter()
            .find(|(key, _)| key.len() == labels.len() && key.iter().zip(labels).all(|(k, l)| k.label == *l))
            .map(|(_, stat)| stat.churn_rate())
    }

    /// Rows in domain order.
    pub fn rows(&self) -> Vec<ChurnRateRow> {
        self.groups
            .iter()
            .map(|(key, stat)| ChurnRateRow {
                key:        key.iter().map(|v| v.label).collect(),
                members:    stat.members,
                churned:    stat.churned,
                churn_rate: stat.churn_rate(),
            })
            .collect()
    }

    /// Rows sorted by descending churn rate. Ties keep domain order.
    pub fn ranked(&self) -> Vec<ChurnRateRow> {
        let mut rows = self.rows();
        rows.sort_by(|a, b| b.churn_rate.total_cmp(&a.churn_rate));
        rows
    }

    /// The highest group churn rate.
    pub fn peak(&self) -> Option<Percent> {
        self.groups.values().map(GroupStat::churn_rate).max_by(f64::total_cmp)
    }

    /// Two-field tables as a grid: rows are values of the first field, columns
    /// of the second. Combinations with no members are `None`.
    pub fn pivot(&self) -> ChurnResult<PivotGrid> {
        if self.fields.len() != 2 {
            return Err(ChurnError::InvalidGrouping {
                reason: format!("pivot needs exactly 2 fields, table has {}", self.fields.len()),
            });
        }
        let mut row_values: Vec<CategoryValue> = self.groups.keys().map(|k| k[0]).collect();
        let mut col_values: Vec<CategoryValue> = self.groups.keys().map(|k| k[1]).collect();
        row_values.sort();
        row_values.dedup();
        col_values.sort();
        col_values.dedup();

        let cells = row_values
            .iter()
            .map(|r| {
                col_values
                    .iter()
                    .map(|c| self.groups.get(&vec![*r, *c]).map(GroupStat::churn_rate))
                    .collect()
            })
            .collect();

        Ok(PivotGrid {
            row_field:    self.fields[0],
            column_field: self.fields[1],
            rows:         row_values.iter().map(|v| v.label).collect(),
            columns:      col_values.iter().map(|v| v.label).collect(),
            cells,
        })
    }

    /// Write the table as CSV: one column per grouping field, then
    /// members, churned and churn rate.
    pub fn write_csv<W: Write>(&self, writer: W) -> ChurnResult<()> {
        let mut out = csv::Writer::from_writer(writer);
        let mut header: Vec<&str> = self.fields.iter().map(Field::name).collect();
        header.extend(["members", "churned", "churn_rate"]);
        out.write_record(&header)?;

        for row in self.rows() {
            let mut record: Vec<String> = row.key.iter().map(|s| s.to_string()).collect();
            record.push(row.members.to_string());
            record.push(row.churned.to_string());
            record.push(format!("{:.4}", row.churn_rate));
            out.write_record(&record)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Heatmap-ready grid of churn rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotGrid {
    pub row_field:    Field,
    pub column_field: Field,
    pub rows:         Vec<&'static str>,
    pub columns:      Vec<&'static str>,
    pub cells:        Vec<Vec<Option<Percent>>>,
}

// ── Grouped churn rate ─────────────────────────────────────────────────────

/// Group `records` by the observed values of `fields` and compute each
/// group's churn rate.
pub fn churn_rate<'a, I>(records: I, fields: &[Field]) -> ChurnResult<ChurnRateTable>
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    if fields.is_empty() {
        return Err(ChurnError::InvalidGrouping {
            reason: "at least one grouping field is required".into(),
        });
    }

    let mut groups: BTreeMap<GroupKey, GroupStat> = BTreeMap::new();
    for record in records {
        let key: GroupKey = fields.iter().map(|f| f.value_of(record)).collect();
        let stat = groups.entry(key).or_default();
        stat.members += 1;
        if record.churned() {
            stat.churned += 1;
        }
    }

    if groups.is_empty() {
        return Err(ChurnError::degenerate("no records to group"));
    }

    Ok(ChurnRateTable { fields: fields.to_vec(), groups })
}

/// Share of churned records, in percent.
pub fn overall_churn_rate<'a, I>(records: I) -> ChurnResult<Percent>
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    let (members, churned) = records
        .into_iter()
        .fold((0usize, 0usize), |(n, c), r| (n + 1, c + usize::from(r.churned())));
    if members == 0 {
        return Err(ChurnError::degenerate("no records"));
    }
    Ok(100.0 * churned as f64 / members as f64)
}

/// Pearson correlation between `field` and churn encoded Yes=1, No=0
/// (point-biserial correlation).
pub fn correlation<'a, I>(records: I, field: NumericField) -> ChurnResult<f64>
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    let pairs: Vec<(f64, f64)> = records
        .into_iter()
        .map(|r| (field.value_of(r), if r.churned() { 1.0 } else { 0.0 }))
        .collect();
    if pairs.len() < 2 {
        return Err(ChurnError::degenerate(format!(
            "correlation of {field} needs at least 2 records, got {}",
            pairs.len()
        )));
    }

    // Constant series are checked directly: a float mean of identical values
    // can leave a tiny non-zero variance behind.
    let (x0, y0) = pairs[0];
    if pairs.iter().all(|p| p.0 == x0) {
        return Err(ChurnError::degenerate(format!("{field} has zero variance")));
    }
    if pairs.iter().all(|p| p.1 == y0) {
        return Err(ChurnError::degenerate("Churn has zero variance"));
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    // Squared deviations of tiny values underflow to zero.
    let denom = sxx.sqrt() * syy.sqrt();
    let r = sxy / denom;
    if !(denom > 0.0) || !r.is_finite() {
        return Err(ChurnError::degenerate(format!(
            "{field} variance underflows, correlation is undefined"
        )));
    }
    Ok(r.clamp(-1.0, 1.0))
}

// ── Summaries and distributions ────────────────────────────────────────────

/// Headline metrics for the executive summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_customers:     usize,
    pub churned_customers:   usize,
    pub churn_rate:          Percent,
    pub avg_tenure:          f64,
    pub avg_monthly_charges: f64,
}

pub fn summarize<'a, I>(records: I) -> ChurnResult<SummaryMetrics>
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    let mut total = 0usize;
    let mut churned = 0usize;
    let mut tenure_sum = 0.0;
    let mut monthly_sum = 0.0;
    for r in records {
        total += 1;
        churned += usize::from(r.churned());
        tenure_sum += f64::from(r.tenure);
        monthly_sum += r.monthly_charges;
    }
    if total == 0 {
        return Err(ChurnError::degenerate("no records to summarize"));
    }
    let n = total as f64;
    Ok(SummaryMetrics {
        total_customers:     total,
        churned_customers:   churned,
        churn_rate:          100.0 * churned as f64 / n,
        avg_tenure:          tenure_sum / n,
        avg_monthly_charges: monthly_sum / n,
    })
}

/// Value counts of one field, in domain order. Absent values are omitted.
pub fn distribution<'a, I>(records: I, field: Field) -> BTreeMap<CategoryValue, usize>
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(field.value_of(r)).or_insert(0) += 1;
    }
    counts
}

// ── Filters ────────────────────────────────────────────────────────────────

/// Multi-select filter: for each constrained field, the labels allowed
/// through. Unconstrained fields allow everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordFilter {
    allowed: BTreeMap<Field, BTreeSet<String>>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from field names mapped to allowed labels, as the
    /// page selectors send them. Unknown field names are `UnknownField`.
    pub fn from_labels<'a, I, S>(selections: I) -> ChurnResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [S])>,
        S: AsRef<str> + 'a,
    {
        selections
            .into_iter()
            .try_fold(Self::new(), |filter, (name, labels)| filter.allow(name.parse()?, labels))
    }

    /// Restrict `field` to `labels`. Labels outside the field's domain are a
    /// `DomainViolation`.
    pub fn allow<S: AsRef<str>>(mut self, field: Field, labels: &[S]) -> ChurnResult<Self> {
        let domain = field.domain_labels();
        let mut set = BTreeSet::new();
        for label in labels {
            let label = label.as_ref().trim();
            if !domain.iter().any(|d| *d == label) {
                return Err(ChurnError::DomainViolation {
                    field: field.name(),
                    value: label.to_string(),
                });
            }
            set.insert(label.to_string());
        }
        self.allowed.insert(field, set);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn matches(&self, record: &CustomerRecord) -> bool {
        self.allowed
            .iter()
            .all(|(field, labels)| labels.contains(field.value_of(record).label))
    }

    pub fn apply<'a>(&self, records: &'a [CustomerRecord]) -> Vec<&'a CustomerRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}
