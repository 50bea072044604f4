use std::error::Error;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::eda_statistics::{SplitSummary, Summary};
use crate::error::ChartError;
use crate::models::{CostMeasure, Observation, RiskFactor};

const BAR_WIDTH: f64 = 0.8;

/// Which side of a threshold split a bar chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    High,
    Low,
}

impl Side {
    fn name(self) -> &'static str {
        match self {
            Side::High => "High",
            Side::Low => "Low",
        }
    }
}

/// Bars of one risk factor: (consumption, cost) per row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BarSeries {
    pub(crate) risk: RiskFactor,
    pub(crate) bars: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BarChart {
    pub(crate) title: String,
    pub(crate) y_label: &'static str,
    pub(crate) file_name: String,
    pub(crate) series: Vec<BarSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScatterChart {
    pub(crate) title: String,
    pub(crate) x_label: &'static str,
    pub(crate) y_label: &'static str,
    pub(crate) color: RGBColor,
    pub(crate) file_name: String,
    pub(crate) points: Vec<(f64, f64)>,
}

/// Consumption of all three risk factors against one side of a cost split.
pub(crate) fn bar_chart(rows: &[&Observation], measure: CostMeasure, side: Side) -> BarChart {
    let title = match measure {
        CostMeasure::ShareOfGdp => format!(
            "Consumption of Risk Factors vs {} Healthcare Spending",
            side.name()
        ),
        CostMeasure::PerPerson => format!(
            "Effect of Risk Factors on Individual Healthcare Costs ({})",
            side.name()
        ),
    };

    let series = RiskFactor::ALL
        .iter()
        .map(|&risk| BarSeries {
            risk,
            bars: rows
                .iter()
                .map(|o| (o.value(risk.column()), o.value(measure.column())))
                .collect(),
        })
        .collect();

    BarChart {
        title,
        y_label: measure.axis_label(),
        file_name: format!(
            "{}_{}.png",
            measure.column().name(),
            side.name().to_lowercase()
        ),
        series,
    }
}

pub(crate) fn scatter_chart(
    observations: &[Observation],
    risk: RiskFactor,
    measure: CostMeasure,
) -> ScatterChart {
    ScatterChart {
        title: format!(
            "Effect of {} Consumption on {} Health Costs",
            risk.name(),
            measure.scope()
        ),
        x_label: risk.axis_label(measure),
        y_label: measure.axis_label(),
        color: risk.color(),
        file_name: format!("{}_vs_{}.png", risk.column().name(), measure.column().name()),
        points: observations
            .iter()
            .map(|o| (o.value(risk.column()), o.value(measure.column())))
            .collect(),
    }
}

/// Axis range covering every value and zero, with headroom.
/// Falls back to a unit range when there is nothing to show.
pub(crate) fn axis_range(values: impl Iterator<Item = f64>, pad: f64) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((0.0_f64, f64::NAN), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if max.is_nan() || max <= min {
        return min..min + 1.0;
    }
    let lower = if min < 0.0 { min * 1.05 - pad } else { 0.0 };
    lower..max * 1.05 + pad
}

/// Render the four threshold bar charts and the six scatter charts.
pub(crate) fn render_all(
    summary: &Summary,
    observations: &[Observation],
    config: &AnalysisConfig,
) -> Result<Vec<PathBuf>, ChartError> {
    let out_dir = &config.output_dir;
    fs::create_dir_all(out_dir).map_err(|source| ChartError::OutputDir {
        path: out_dir.clone(),
        source,
    })?;

    let mut written = Vec::new();
    for split in [&summary.spending, &summary.costs] {
        for chart in split_bar_charts(split) {
            let path = out_dir.join(&chart.file_name);
            render_bar_chart(&chart, &path, config.chart_size)?;
            written.push(path);
        }
    }

    for risk in RiskFactor::ALL {
        for measure in CostMeasure::ALL {
            let chart = scatter_chart(observations, risk, measure);
            let path = out_dir.join(&chart.file_name);
            render_scatter_chart(&chart, &path, config.chart_size)?;
            written.push(path);
        }
    }

    info!(charts = written.len(), dir = %out_dir.display(), "Charts rendered");
    Ok(written)
}

fn split_bar_charts(summary: &SplitSummary) -> [BarChart; 2] {
    let split = &summary.split;
    [
        bar_chart(&split.high, split.measure, Side::High),
        bar_chart(&split.low, split.measure, Side::Low),
    ]
}

pub(crate) fn render_bar_chart(
    chart: &BarChart,
    path: &Path,
    size: (u32, u32),
) -> Result<(), ChartError> {
    draw_bar_chart(chart, path, size).map_err(|source| ChartError::Render {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;
    info!(path = %path.display(), "Bar chart saved");
    Ok(())
}

pub(crate) fn render_scatter_chart(
    chart: &ScatterChart,
    path: &Path,
    size: (u32, u32),
) -> Result<(), ChartError> {
    draw_scatter_chart(chart, path, size).map_err(|source| ChartError::Render {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;
    info!(path = %path.display(), "Scatter plot saved");
    Ok(())
}

fn draw_bar_chart(chart: &BarChart, path: &Path, size: (u32, u32)) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let bars = || chart.series.iter().flat_map(|s| s.bars.iter().copied());
    let x_range = axis_range(bars().map(|(x, _)| x), BAR_WIDTH / 2.0);
    let y_range = axis_range(bars().map(|(_, y)| y), 0.0);

    let mut plot = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    plot.configure_mesh()
        .x_desc("Consumption")
        .y_desc(chart.y_label)
        .axis_desc_style(("sans-serif", 20))
        .label_style(("sans-serif", 15))
        .draw()?;

    // Series overlay in fixed order, later factors drawn on top
    for series in &chart.series {
        let color = series.risk.color();
        plot.draw_series(series.bars.iter().map(|&(x, y)| {
            Rectangle::new(
                [(x - BAR_WIDTH / 2.0, 0.0), (x + BAR_WIDTH / 2.0, y)],
                color.filled(),
            )
        }))?
        .label(series.risk.legend())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    plot.configure_series_labels()
        .label_font(("sans-serif", 15))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_scatter_chart(
    chart: &ScatterChart,
    path: &Path,
    size: (u32, u32),
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = axis_range(chart.points.iter().map(|&(x, _)| x), 0.0);
    let y_range = axis_range(chart.points.iter().map(|&(_, y)| y), 0.0);

    let mut plot = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    plot.configure_mesh()
        .x_desc(chart.x_label)
        .y_desc(chart.y_label)
        .axis_desc_style(("sans-serif", 20))
        .label_style(("sans-serif", 15))
        .draw()?;

    plot.draw_series(
        chart
            .points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 5, chart.color.filled())),
    )?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eda_statistics::{split_by_threshold, summarize};
    use tempfile::TempDir;

    fn observation(country: &str, values: [f64; 5]) -> Observation {
        Observation {
            country: country.to_string(),
            alcohol_con: values[0],
            sugar_con: values[1],
            tobacco_con: values[2],
            cost_per_person: values[3],
            health_cost_by_gdp: values[4],
        }
    }

    fn rows() -> Vec<Observation> {
        vec![
            observation("Low", [5.0, 50.0, 10.0, 100.0, 5.0]),
            observation("High", [10.0, 80.0, 30.0, 300.0, 9.0]),
        ]
    }

    #[test]
    fn test_bar_chart_for_high_spending() {
        let rows = rows();
        let split = split_by_threshold(&rows, CostMeasure::ShareOfGdp, 7.25);
        let chart = bar_chart(&split.high, CostMeasure::ShareOfGdp, Side::High);

        assert_eq!(
            chart.title,
            "Consumption of Risk Factors vs High Healthcare Spending"
        );
        assert_eq!(chart.y_label, "Healthcare Spending (% of GDP)");
        assert_eq!(chart.file_name, "health_cost_by_gdp_high.png");

        let risks: Vec<RiskFactor> = chart.series.iter().map(|s| s.risk).collect();
        assert_eq!(risks, RiskFactor::ALL.to_vec());
        assert_eq!(chart.series[0].bars, vec![(10.0, 9.0)]);
        assert_eq!(chart.series[1].bars, vec![(80.0, 9.0)]);
        assert_eq!(chart.series[2].bars, vec![(30.0, 9.0)]);
    }

    #[test]
    fn test_bar_chart_titles_for_individual_costs() {
        let rows = rows();
        let split = split_by_threshold(&rows, CostMeasure::PerPerson, 225.36);
        let chart = bar_chart(&split.low, CostMeasure::PerPerson, Side::Low);

        assert_eq!(
            chart.title,
            "Effect of Risk Factors on Individual Healthcare Costs (Low)"
        );
        assert_eq!(chart.y_label, "Healthcare Costs per person (US $)");
        assert_eq!(chart.series[0].bars, vec![(5.0, 100.0)]);
    }

    #[test]
    fn test_empty_partition_gives_empty_series() {
        let rows = rows();
        let split = split_by_threshold(&rows, CostMeasure::PerPerson, 1e6);
        let chart = bar_chart(&split.high, CostMeasure::PerPerson, Side::High);
        assert!(chart.series.iter().all(|s| s.bars.is_empty()));
    }

    #[test]
    fn test_six_distinct_scatter_charts() {
        let rows = rows();
        let charts: Vec<ScatterChart> = RiskFactor::ALL
            .iter()
            .flat_map(|&risk| {
                let rows = &rows;
                CostMeasure::ALL
                    .iter()
                    .map(move |&measure| scatter_chart(rows, risk, measure))
            })
            .collect();

        assert_eq!(charts.len(), 6);
        let mut names: Vec<&str> = charts.iter().map(|c| c.file_name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 6);

        let sugar = &charts[2];
        assert_eq!(
            sugar.title,
            "Effect of Sugar Consumption on Individual Health Costs"
        );
        assert_eq!(sugar.x_label, "Sugar Consumption (g)");
        assert_eq!(sugar.points, vec![(50.0, 100.0), (80.0, 300.0)]);
        assert_eq!(sugar.color, GREEN);
        assert_eq!(charts[4].x_label, "Tobacco Consumption (% of population that smokes)");
        assert_eq!(charts[5].x_label, "Tobacco Consumption (%)");
    }

    #[test]
    fn test_render_all_writes_every_chart() {
        let dir = TempDir::new().unwrap();
        let rows = rows();
        let config = AnalysisConfig {
            output_dir: dir.path().join("charts"),
            // nothing exceeds this, so the high spending partition is empty
            gdp_threshold: 100.0,
            chart_size: (640, 480),
            ..AnalysisConfig::default()
        };
        let summary = summarize(&rows, &config);
        assert!(summary.spending.split.high.is_empty());

        let written = render_all(&summary, &rows, &config).unwrap();
        assert_eq!(written.len(), 10);
        for path in &written {
            assert!(path.starts_with(&config.output_dir));
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
            assert!(fs::metadata(path).unwrap().len() > 0);
        }
        assert!(config.output_dir.join("health_cost_by_gdp_high.png").exists());
    }

    #[test]
    fn test_axis_range() {
        let range = axis_range([2.0, 10.0].into_iter(), 0.0);
        assert_eq!(range.start, 0.0);
        assert!((range.end - 10.5).abs() < 1e-9);
        assert_eq!(axis_range(std::iter::empty(), 0.4), 0.0..1.0);
        assert_eq!(axis_range([0.0].into_iter(), 0.0), 0.0..1.0);
        let padded = axis_range([4.0].into_iter(), 0.4);
        assert!(padded.start == 0.0 && padded.end > 4.4);
    }
}
