use plotters::style::{RGBColor, BLUE, GREEN, RED};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Header names every input file must carry.
pub(crate) const COUNTRY_HEADER: &str = "country";
pub(crate) const REQUIRED_HEADERS: [&str; 6] = [
    COUNTRY_HEADER,
    "alcohol_con",
    "sugar_con",
    "tobacco_con",
    "cost_per_person",
    "health_cost_by_gdp",
];

/// Markers read as a missing value, compared case-insensitively.
const MISSING_TOKENS: [&str; 14] = [
    "#n/a", "#n/a n/a", "#na", "-1.#ind", "-1.#qnan", "-nan", "1.#ind", "1.#qnan", "<na>", "n/a",
    "na", "nan", "null", "none",
];

/// One row of the input file exactly as read. Any field may be missing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Record {
    #[serde(alias = "Country", deserialize_with = "missing_or_string")]
    pub(crate) country: Option<String>,
    #[serde(deserialize_with = "missing_or_f64")]
    pub(crate) alcohol_con: Option<f64>,
    #[serde(deserialize_with = "missing_or_f64")]
    pub(crate) sugar_con: Option<f64>,
    #[serde(deserialize_with = "missing_or_f64")]
    pub(crate) tobacco_con: Option<f64>,
    #[serde(deserialize_with = "missing_or_f64")]
    pub(crate) cost_per_person: Option<f64>,
    #[serde(deserialize_with = "missing_or_f64")]
    pub(crate) health_cost_by_gdp: Option<f64>,
}

impl Record {
    pub(crate) fn is_complete(&self) -> bool {
        self.complete().is_some()
    }

    /// The row as an `Observation`, or `None` if any field is missing.
    pub(crate) fn complete(&self) -> Option<Observation> {
        Some(Observation {
            country: self.country.clone()?,
            alcohol_con: self.alcohol_con?,
            sugar_con: self.sugar_con?,
            tobacco_con: self.tobacco_con?,
            cost_per_person: self.cost_per_person?,
            health_cost_by_gdp: self.health_cost_by_gdp?,
        })
    }

    pub(crate) fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Alcohol => self.alcohol_con,
            Column::Sugar => self.sugar_con,
            Column::Tobacco => self.tobacco_con,
            Column::CostPerPerson => self.cost_per_person,
            Column::CostByGdp => self.health_cost_by_gdp,
        }
    }
}

fn is_missing_token(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || MISSING_TOKENS
            .iter()
            .any(|token| value.eq_ignore_ascii_case(token))
}

fn missing_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|value| !is_missing_token(value))
        .map(|value| value.trim().to_string()))
}

fn missing_or_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(value) if !is_missing_token(&value) => value
            .trim()
            .parse::<f64>()
            .map(|number| Some(number).filter(|n| !n.is_nan()))
            .map_err(|_| D::Error::custom(format!("invalid number {:?}", value))),
        _ => Ok(None),
    }
}

/// A country record with every field present.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Observation {
    pub(crate) country: String,
    pub(crate) alcohol_con: f64,
    pub(crate) sugar_con: f64,
    pub(crate) tobacco_con: f64,
    pub(crate) cost_per_person: f64,
    pub(crate) health_cost_by_gdp: f64,
}

impl Observation {
    pub(crate) fn value(&self, column: Column) -> f64 {
        match column {
            Column::Alcohol => self.alcohol_con,
            Column::Sugar => self.sugar_con,
            Column::Tobacco => self.tobacco_con,
            Column::CostPerPerson => self.cost_per_person,
            Column::CostByGdp => self.health_cost_by_gdp,
        }
    }
}

/// The numeric columns, in header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Column {
    Alcohol,
    Sugar,
    Tobacco,
    CostPerPerson,
    CostByGdp,
}

impl Column {
    pub(crate) const ALL: [Column; 5] = [
        Column::Alcohol,
        Column::Sugar,
        Column::Tobacco,
        Column::CostPerPerson,
        Column::CostByGdp,
    ];

    /// Position in `Column::ALL`.
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Column::Alcohol => "alcohol_con",
            Column::Sugar => "sugar_con",
            Column::Tobacco => "tobacco_con",
            Column::CostPerPerson => "cost_per_person",
            Column::CostByGdp => "health_cost_by_gdp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum RiskFactor {
    Alcohol,
    Sugar,
    Tobacco,
}

impl RiskFactor {
    pub(crate) const ALL: [RiskFactor; 3] =
        [RiskFactor::Alcohol, RiskFactor::Sugar, RiskFactor::Tobacco];

    pub(crate) fn column(self) -> Column {
        match self {
            RiskFactor::Alcohol => Column::Alcohol,
            RiskFactor::Sugar => Column::Sugar,
            RiskFactor::Tobacco => Column::Tobacco,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            RiskFactor::Alcohol => "Alcohol",
            RiskFactor::Sugar => "Sugar",
            RiskFactor::Tobacco => "Tobacco",
        }
    }

    /// Legend entry: series name with its unit.
    pub(crate) fn legend(self) -> &'static str {
        match self {
            RiskFactor::Alcohol => "alcohol (L)",
            RiskFactor::Sugar => "sugar (g)",
            RiskFactor::Tobacco => "tobacco (%)",
        }
    }

    /// X axis label of the scatter chart against `measure`.
    pub(crate) fn axis_label(self, measure: CostMeasure) -> &'static str {
        match (self, measure) {
            (RiskFactor::Alcohol, _) => "Alcohol Consumption (L)",
            (RiskFactor::Sugar, _) => "Sugar Consumption (g)",
            (RiskFactor::Tobacco, CostMeasure::PerPerson) => {
                "Tobacco Consumption (% of population that smokes)"
            }
            (RiskFactor::Tobacco, CostMeasure::ShareOfGdp) => "Tobacco Consumption (%)",
        }
    }

    pub(crate) fn color(self) -> RGBColor {
        match self {
            RiskFactor::Alcohol => BLUE,
            RiskFactor::Sugar => GREEN,
            RiskFactor::Tobacco => RED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CostMeasure {
    PerPerson,
    ShareOfGdp,
}

impl CostMeasure {
    pub(crate) const ALL: [CostMeasure; 2] = [CostMeasure::PerPerson, CostMeasure::ShareOfGdp];

    pub(crate) fn column(self) -> Column {
        match self {
            CostMeasure::PerPerson => Column::CostPerPerson,
            CostMeasure::ShareOfGdp => Column::CostByGdp,
        }
    }

    pub(crate) fn axis_label(self) -> &'static str {
        match self {
            CostMeasure::PerPerson => "Healthcare Costs per person (US $)",
            CostMeasure::ShareOfGdp => "Healthcare Spending (% of GDP)",
        }
    }

    /// Qualifier used in scatter chart titles.
    pub(crate) fn scope(self) -> &'static str {
        match self {
            CostMeasure::PerPerson => "Individual",
            CostMeasure::ShareOfGdp => "Overall",
        }
    }
}
