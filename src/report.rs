use itertools::Itertools;

use crate::eda_statistics::{ColumnStats, CostGroup, RiskGroup, RiskMeans, SplitSummary, Summary};
use crate::load_clean::Dataset;
use crate::models::{Column, Record, RiskFactor, REQUIRED_HEADERS};

/// Rows shown from each end of a long grouping.
const GROUP_PREVIEW: usize = 10;

pub(crate) fn print_overview(title: &str, dataset: &Dataset, preview_rows: usize) {
    let (rows, cols) = dataset.shape();
    println!("{title}: {rows} rows x {cols} columns");
    println!("{}", REQUIRED_HEADERS.iter().map(|h| format!("{h:>18}")).join(""));
    for record in dataset.head(preview_rows) {
        println!("{}", format_record(record));
    }
    println!();

    println!("Non-null counts:");
    for info in dataset.column_info() {
        println!("{:<20} {:>4} non-null  {}", info.name, info.non_null, info.dtype);
    }
    println!();
}

fn format_record(record: &Record) -> String {
    let country = record.country.as_deref().unwrap_or("NaN");
    let values = Column::ALL
        .iter()
        .map(|&column| match record.value(column) {
            Some(value) => format!("{value:>18.2}"),
            None => format!("{:>18}", "NaN"),
        })
        .join("");
    format!("{country:>18}{values}")
}

pub(crate) fn print_summary(summary: &Summary) {
    print_describe(&summary.describe);

    println!("Medians:");
    for (column, median) in &summary.medians {
        println!("{:<20} {:>10.2}", column.name(), median);
    }
    println!();

    print_split(&summary.spending);
    print_split(&summary.costs);

    for (risk, groups) in &summary.cost_by_risk {
        print_cost_groups(*risk, groups);
    }

    println!("Correlation with healthcare costs (Pearson r):");
    for correlation in &summary.correlations {
        let coefficient = correlation
            .coefficient
            .map(|r| format!("{r:>7.3}"))
            .unwrap_or_else(|| format!("{:>7}", "n/a"));
        println!(
            "{:<12} vs {:<20} {}",
            correlation.risk.column().name(),
            correlation.cost.column().name(),
            coefficient
        );
    }
    println!();
}

fn print_describe(stats: &[ColumnStats]) {
    println!(
        "{:>8}{}",
        "",
        stats.iter().map(|s| format!("{:>20}", s.column.name())).join("")
    );
    let rows: [(&str, fn(&ColumnStats) -> f64); 8] = [
        ("count", |s| s.count as f64),
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.q1),
        ("50%", |s| s.median),
        ("75%", |s| s.q3),
        ("max", |s| s.max),
    ];
    for (label, field) in rows {
        println!(
            "{label:>8}{}",
            stats.iter().map(|s| format!("{:>20.2}", field(s))).join("")
        );
    }
    println!();
}

fn print_split(summary: &SplitSummary) {
    let split = &summary.split;
    let name = split.measure.column().name();
    println!(
        "{name} > {}: {} rows, <= {}: {} rows",
        split.threshold,
        split.high.len(),
        split.threshold,
        split.low.len()
    );
    print_means("  high", summary.high_means);
    print_means("  low ", summary.low_means);
    println!();

    println!("Risk factor means by {name} (high):");
    print_risk_groups(&summary.high_groups);
    println!("Risk factor means by {name} (low):");
    print_risk_groups(&summary.low_groups);
    println!();
}

fn print_means(label: &str, means: Option<RiskMeans>) {
    match means {
        Some(means) => println!(
            "{label} {}",
            RiskFactor::ALL
                .iter()
                .map(|&risk| format!("{}={:.2}", risk.column().name(), means.get(risk)))
                .join("  ")
        ),
        None => println!("{label} (no rows)"),
    }
}

fn print_risk_groups(groups: &[RiskGroup]) {
    if groups.is_empty() {
        println!("  (no rows)");
    }
    for group in groups {
        println!(
            "  {:>10.2} {:>12.2} {:>12.2} {:>12.2}",
            group.cost, group.means.alcohol, group.means.sugar, group.means.tobacco
        );
    }
}

fn print_cost_groups(risk: RiskFactor, groups: &[CostGroup]) {
    println!(
        "Mean costs by {} ({} distinct values):",
        risk.column().name(),
        groups.len()
    );
    for group in preview(groups, GROUP_PREVIEW) {
        println!(
            "  {:>10.2} {:>16.2} {:>10.2}",
            group.consumption, group.mean_cost_per_person, group.mean_cost_by_gdp
        );
    }
    println!();
}

/// First and last `n` items, or everything when short.
fn preview<T>(items: &[T], n: usize) -> Vec<&T> {
    if items.len() <= 2 * n {
        return items.iter().collect();
    }
    items[..n].iter().chain(items[items.len() - n..].iter()).collect()
}
