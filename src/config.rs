use std::path::PathBuf;

/// Input file read by the analysis.
pub const DATA_FILE: &str = "health_risks_costs.csv";

/// Split point for healthcare spending as a share of GDP.
pub const GDP_SPENDING_THRESHOLD: f64 = 7.25;

/// Split point for healthcare spending per person, in US dollars.
pub const COST_PER_PERSON_THRESHOLD: f64 = 225.36;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub gdp_threshold: f64,
    pub cost_threshold: f64,
    pub chart_size: (u32, u32),
    pub preview_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DATA_FILE),
            output_dir: PathBuf::from("charts"),
            gdp_threshold: GDP_SPENDING_THRESHOLD,
            cost_threshold: COST_PER_PERSON_THRESHOLD,
            chart_size: (1024, 768),
            preview_rows: 10,
        }
    }
}
