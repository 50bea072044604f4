use std::collections::BTreeMap;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use ndarray_stats::interpolate::Linear;
use ndarray_stats::QuantileExt;
use noisy_float::types::n64;
use ordered_float::NotNan;
use statrs::statistics::{self as stats, Data, Median};
use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::models::{Column, CostMeasure, Observation, RiskFactor};

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnStats {
    pub(crate) column: Column,
    pub(crate) count: usize,
    pub(crate) mean: f64,
    pub(crate) std: f64,
    pub(crate) min: f64,
    pub(crate) q1: f64,
    pub(crate) median: f64,
    pub(crate) q3: f64,
    pub(crate) max: f64,
}

/// Rows on each side of a cost threshold.
#[derive(Debug, Clone)]
pub(crate) struct ThresholdSplit<'a> {
    pub(crate) measure: CostMeasure,
    pub(crate) threshold: f64,
    /// value > threshold
    pub(crate) high: Vec<&'a Observation>,
    /// value <= threshold
    pub(crate) low: Vec<&'a Observation>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RiskMeans {
    pub(crate) alcohol: f64,
    pub(crate) sugar: f64,
    pub(crate) tobacco: f64,
}

impl RiskMeans {
    pub(crate) fn get(&self, risk: RiskFactor) -> f64 {
        match risk {
            RiskFactor::Alcohol => self.alcohol,
            RiskFactor::Sugar => self.sugar,
            RiskFactor::Tobacco => self.tobacco,
        }
    }
}

/// Risk factor means of the rows sharing one cost value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RiskGroup {
    pub(crate) cost: f64,
    pub(crate) count: usize,
    pub(crate) means: RiskMeans,
}

/// Cost means of the rows sharing one risk factor value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CostGroup {
    pub(crate) consumption: f64,
    pub(crate) count: usize,
    pub(crate) mean_cost_per_person: f64,
    pub(crate) mean_cost_by_gdp: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Correlation {
    pub(crate) risk: RiskFactor,
    pub(crate) cost: CostMeasure,
    pub(crate) coefficient: Option<f64>,
}

#[derive(Debug, Clone)]
pub(crate) struct SplitSummary<'a> {
    pub(crate) split: ThresholdSplit<'a>,
    pub(crate) high_means: Option<RiskMeans>,
    pub(crate) low_means: Option<RiskMeans>,
    pub(crate) high_groups: Vec<RiskGroup>,
    pub(crate) low_groups: Vec<RiskGroup>,
}

impl<'a> SplitSummary<'a> {
    fn new(split: ThresholdSplit<'a>) -> Self {
        if split.high.is_empty() || split.low.is_empty() {
            warn!(
                measure = split.measure.column().name(),
                threshold = split.threshold,
                high = split.high.len(),
                low = split.low.len(),
                "Threshold split has an empty partition"
            );
        }
        Self {
            high_means: risk_factor_means(&split.high),
            low_means: risk_factor_means(&split.low),
            high_groups: group_risks_by_cost(&split.high, split.measure),
            low_groups: group_risks_by_cost(&split.low, split.measure),
            split,
        }
    }
}

/// Every derived view of the cleaned table.
#[derive(Debug, Clone)]
pub(crate) struct Summary<'a> {
    pub(crate) describe: Vec<ColumnStats>,
    pub(crate) medians: Vec<(Column, f64)>,
    pub(crate) spending: SplitSummary<'a>,
    pub(crate) costs: SplitSummary<'a>,
    pub(crate) cost_by_risk: Vec<(RiskFactor, Vec<CostGroup>)>,
    pub(crate) correlations: Vec<Correlation>,
}

pub(crate) fn summarize<'a>(observations: &'a [Observation], config: &AnalysisConfig) -> Summary<'a> {
    let spending = split_by_threshold(observations, CostMeasure::ShareOfGdp, config.gdp_threshold);
    let costs = split_by_threshold(observations, CostMeasure::PerPerson, config.cost_threshold);

    Summary {
        describe: describe(observations),
        medians: medians(observations),
        spending: SplitSummary::new(spending),
        costs: SplitSummary::new(costs),
        cost_by_risk: RiskFactor::ALL
            .iter()
            .map(|&risk| (risk, group_costs_by_risk(observations, risk)))
            .collect(),
        correlations: correlations(observations),
    }
}

/// Numeric columns as a rows x 5 matrix, in `Column::ALL` order.
pub(crate) fn to_array(observations: &[Observation]) -> Array2<f64> {
    Array2::from_shape_fn((observations.len(), Column::ALL.len()), |(row, col)| {
        observations[row].value(Column::ALL[col])
    })
}

pub(crate) fn describe(observations: &[Observation]) -> Vec<ColumnStats> {
    let mut data = to_array(observations);
    let q1 = column_quantiles(&mut data, 0.25);
    let q3 = column_quantiles(&mut data, 0.75);

    Column::ALL
        .iter()
        .zip(data.axis_iter(Axis(1)))
        .map(|(&column, values)| ColumnStats {
            column,
            count: values.len(),
            mean: values.mean().unwrap_or(f64::NAN),
            std: stats::Statistics::std_dev(values.iter()),
            min: values.min().copied().unwrap_or(f64::NAN),
            q1: q1[column.index()],
            median: Data::new(values.to_vec()).median(),
            q3: q3[column.index()],
            max: values.max().copied().unwrap_or(f64::NAN),
        })
        .collect()
}

// Linear interpolation between closest ranks, NaN for an empty table
fn column_quantiles(data: &mut Array2<f64>, q: f64) -> Array1<f64> {
    data.quantile_axis_skipnan_mut(Axis(0), n64(q), &Linear)
        .unwrap_or_else(|_| Array1::from_elem(Column::ALL.len(), f64::NAN))
}

pub(crate) fn medians(observations: &[Observation]) -> Vec<(Column, f64)> {
    Column::ALL
        .iter()
        .map(|&column| {
            let values: Vec<f64> = observations.iter().map(|o| o.value(column)).collect();
            (column, Data::new(values).median())
        })
        .collect()
}

pub(crate) fn split_by_threshold(
    observations: &[Observation],
    measure: CostMeasure,
    threshold: f64,
) -> ThresholdSplit<'_> {
    let (high, low): (Vec<&Observation>, Vec<&Observation>) = observations
        .iter()
        .partition(|o| o.value(measure.column()) > threshold);

    debug!(
        measure = measure.column().name(),
        threshold,
        high = high.len(),
        low = low.len(),
        "Split rows by threshold"
    );
    ThresholdSplit {
        measure,
        threshold,
        high,
        low,
    }
}

/// Mean of each risk factor, or `None` for an empty partition.
pub(crate) fn risk_factor_means(rows: &[&Observation]) -> Option<RiskMeans> {
    if rows.is_empty() {
        return None;
    }
    let mean_of =
        |risk: RiskFactor| stats::Statistics::mean(rows.iter().map(|o| o.value(risk.column())));
    Some(RiskMeans {
        alcohol: mean_of(RiskFactor::Alcohol),
        sugar: mean_of(RiskFactor::Sugar),
        tobacco: mean_of(RiskFactor::Tobacco),
    })
}

pub(crate) fn group_risks_by_cost(rows: &[&Observation], measure: CostMeasure) -> Vec<RiskGroup> {
    let mut groups: BTreeMap<NotNan<f64>, Vec<&Observation>> = BTreeMap::new();
    for &row in rows {
        if let Ok(key) = NotNan::new(row.value(measure.column())) {
            groups.entry(key).or_default().push(row);
        }
    }

    groups
        .into_iter()
        .filter_map(|(cost, members)| {
            Some(RiskGroup {
                cost: cost.into_inner(),
                count: members.len(),
                means: risk_factor_means(&members)?,
            })
        })
        .collect()
}

pub(crate) fn group_costs_by_risk(observations: &[Observation], risk: RiskFactor) -> Vec<CostGroup> {
    // (cost per person sum, share of GDP sum, count)
    let mut totals: BTreeMap<NotNan<f64>, (f64, f64, usize)> = BTreeMap::new();
    for observation in observations {
        if let Ok(key) = NotNan::new(observation.value(risk.column())) {
            let entry = totals.entry(key).or_insert((0.0, 0.0, 0));
            entry.0 += observation.cost_per_person;
            entry.1 += observation.health_cost_by_gdp;
            entry.2 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(consumption, (per_person, by_gdp, count))| CostGroup {
            consumption: consumption.into_inner(),
            count,
            mean_cost_per_person: per_person / count as f64,
            mean_cost_by_gdp: by_gdp / count as f64,
        })
        .collect()
}

pub(crate) fn correlations(observations: &[Observation]) -> Vec<Correlation> {
    let data = to_array(observations);
    RiskFactor::ALL
        .iter()
        .flat_map(|&risk| CostMeasure::ALL.iter().map(move |&cost| (risk, cost)))
        .map(|(risk, cost)| {
            let x = data.column(risk.column().index());
            let y = data.column(cost.column().index());
            Correlation {
                risk,
                cost,
                coefficient: calculate_correlation(&x, &y),
            }
        })
        .collect()
}

// Pearson coefficient, None when either side has no variance
fn calculate_correlation(x: &ArrayView1<f64>, y: &ArrayView1<f64>) -> Option<f64> {
    let x_mean = x.mean()?;
    let y_mean = y.mean()?;
    let numerator = x
        .iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| (xi - x_mean) * (yi - y_mean))
        .sum::<f64>();
    let denominator_x = x.iter().map(|&xi| (xi - x_mean).powi(2)).sum::<f64>().sqrt();
    let denominator_y = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum::<f64>().sqrt();
    if denominator_x > 0.0 && denominator_y > 0.0 {
        Some(numerator / (denominator_x * denominator_y))
    } else {
        None
    }
}
