use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info};

use crate::error::LoadError;
use crate::models::{Column, Observation, Record, COUNTRY_HEADER, REQUIRED_HEADERS};

/// The table of records, either raw or cleaned.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Dataset {
    records: Vec<Record>,
}

/// Non-null count of one column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnInfo {
    pub(crate) name: &'static str,
    pub(crate) non_null: usize,
    pub(crate) dtype: &'static str,
}

impl Dataset {
    pub(crate) fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn records(&self) -> &[Record] {
        &self.records
    }

    /// (rows, columns)
    pub(crate) fn shape(&self) -> (usize, usize) {
        (self.records.len(), REQUIRED_HEADERS.len())
    }

    pub(crate) fn head(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }

    pub(crate) fn column_info(&self) -> Vec<ColumnInfo> {
        let countries = ColumnInfo {
            name: COUNTRY_HEADER,
            non_null: self.records.iter().filter(|r| r.country.is_some()).count(),
            dtype: "object",
        };

        std::iter::once(countries)
            .chain(Column::ALL.iter().map(|&column| ColumnInfo {
                name: column.name(),
                non_null: self
                    .records
                    .iter()
                    .filter(|r| r.value(column).is_some())
                    .count(),
                dtype: "float64",
            }))
            .collect()
    }

    /// Keep only the rows with no missing field, in their original order.
    pub(crate) fn dropna(&self) -> Dataset {
        let records: Vec<Record> = self
            .records
            .iter()
            .filter(|record| record.is_complete())
            .cloned()
            .collect();

        info!(
            kept = records.len(),
            dropped = self.records.len() - records.len(),
            "Dropped rows with missing values"
        );
        Dataset { records }
    }

    /// The complete rows of the table.
    pub(crate) fn observations(&self) -> Vec<Observation> {
        self.records.iter().filter_map(Record::complete).collect()
    }
}

// Load the input file; the header must name all six fields
pub(crate) fn load_dataset(file_path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = file_path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(file);

    let csv_error = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let headers = reader.headers().map_err(csv_error)?.clone();
    let missing: Vec<String> = REQUIRED_HEADERS
        .iter()
        .filter(|&&name| {
            !headers
                .iter()
                .any(|header| header == name || (name == COUNTRY_HEADER && header == "Country"))
        })
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::HeaderMismatch {
            path: path.to_path_buf(),
            missing,
        });
    }
    debug!(?headers, "Header validated");

    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: Record = result.map_err(csv_error)?;
        records.push(record);
    }

    info!(rows = records.len(), path = %path.display(), "Loaded dataset");
    Ok(Dataset::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskFactor;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str =
        "country,alcohol_con,sugar_con,tobacco_con,cost_per_person,health_cost_by_gdp";

    fn write_csv(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("health_risks_costs.csv");
        fs::write(&path, body).unwrap();
        path
    }

    fn sample() -> Dataset {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            &format!(
                "{HEADER}\n\
                 Albania,7.3,95.2,30.1,142.0,6.1\n\
                 Angola,,42.0,12.0,58.3,2.3\n\
                 Brazil,8.6,130.0,17.2,298.4,NA\n\
                 Canada,9.8,120.3,20.5,2823.9,9.9\n\
                 ,6.0,88.0,24.0,300.0,8.0\n"
            ),
        );
        load_dataset(&path).unwrap()
    }

    #[test]
    fn test_load_counts_every_data_line() {
        let dataset = sample();
        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.shape(), (5, 6));
        assert_eq!(dataset.records()[1].alcohol_con, None);
        assert_eq!(dataset.records()[2].health_cost_by_gdp, None);
        assert_eq!(dataset.records()[4].country, None);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = load_dataset(dir.path().join("absent.csv"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_header_mismatch_names_missing_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "country,alcohol_con,sugar_con\nPeru,5.0,80.0\n");
        match load_dataset(&path) {
            Err(LoadError::HeaderMismatch { missing, .. }) => assert_eq!(
                missing,
                vec!["tobacco_con", "cost_per_person", "health_cost_by_gdp"]
            ),
            other => panic!("expected header mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_column_count_mismatch_is_csv_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, &format!("{HEADER}\nPeru,5.0,80.0\n"));
        assert!(matches!(load_dataset(&path), Err(LoadError::Csv { .. })));
    }

    #[test]
    fn test_non_numeric_value_is_csv_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, &format!("{HEADER}\nPeru,lots,80.0,10.0,100.0,5.0\n"));
        assert!(matches!(load_dataset(&path), Err(LoadError::Csv { .. })));
    }

    #[test]
    fn test_capitalised_country_header_and_extra_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "Country,region,alcohol_con,sugar_con,tobacco_con,cost_per_person,health_cost_by_gdp\n\
             Peru,Americas,5.0,80.0,10.0,100.0,5.0\n",
        );
        let dataset = load_dataset(&path).unwrap();
        assert_eq!(dataset.records()[0].country.as_deref(), Some("Peru"));
        assert_eq!(dataset.observations().len(), 1);
    }

    #[test]
    fn test_dropna_keeps_complete_rows_in_order() {
        let raw = sample();
        let clean = raw.dropna();

        assert_eq!(clean.len(), 2);
        assert!(clean.len() <= raw.len());
        assert!(clean.records().iter().all(Record::is_complete));
        assert!(clean.records().iter().all(|r| raw.records().contains(r)));
        assert_eq!(clean.records()[0].country.as_deref(), Some("Albania"));
        assert_eq!(clean.records()[1].country.as_deref(), Some("Canada"));
        // the raw table is untouched
        assert_eq!(raw.len(), 5);
    }

    #[test]
    fn test_dropna_is_idempotent() {
        let clean = sample().dropna();
        assert_eq!(clean.dropna(), clean);
    }

    #[test]
    fn test_dropna_without_missing_values_keeps_everything() {
        let clean = sample().dropna();
        let again = Dataset::new(clean.records().to_vec()).dropna();
        assert_eq!(again.len(), clean.len());
        assert_eq!(clean.observations().len(), clean.len());
    }

    #[test]
    fn test_spreadsheet_missing_markers_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            &format!(
                "{HEADER}\n\
                 Peru,-NaN,80.0,10.0,100.0,5.0\n\
                 Chad,#N/A,20.0,14.0,30.0,4.1\n\
                 Fiji,3.5,<NA>,12.0,150.0,4.0\n\
                 Oman,0.9,60.0,8.0,400.0,1.#QNAN\n\
                 Cuba,5.2,110.0,22.0,330.0,7.8\n"
            ),
        );

        let raw = load_dataset(&path).unwrap();
        assert_eq!(raw.len(), 5);
        assert_eq!(raw.records()[0].alcohol_con, None);
        assert_eq!(raw.records()[1].alcohol_con, None);
        assert_eq!(raw.records()[2].sugar_con, None);
        assert_eq!(raw.records()[3].health_cost_by_gdp, None);

        let clean = raw.dropna();
        assert_eq!(clean.len(), 1);
        let observations = clean.observations();
        assert_eq!(observations[0].country, "Cuba");
        assert!(Column::ALL
            .iter()
            .all(|&column| !observations[0].value(column).is_nan()));
    }

    #[test]
    fn test_parsed_nan_never_survives_cleaning() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            &format!("{HEADER}\nPeru,+nan,80.0,10.0,100.0,5.0\nCuba,5.2,110.0,22.0,330.0,7.8\n"),
        );

        let clean = load_dataset(&path).unwrap().dropna();
        assert_eq!(clean.len(), 1);
        let observations = clean.observations();
        let groups = crate::eda_statistics::group_costs_by_risk(&observations, RiskFactor::Alcohol);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].consumption, 5.2);
    }

    #[test]
    fn test_column_info_counts_non_null() {
        let info = sample().column_info();
        let counts: Vec<(&str, usize)> = info.iter().map(|c| (c.name, c.non_null)).collect();
        assert_eq!(
            counts,
            vec![
                ("country", 4),
                ("alcohol_con", 4),
                ("sugar_con", 5),
                ("tobacco_con", 5),
                ("cost_per_person", 5),
                ("health_cost_by_gdp", 4),
            ]
        );
    }

    #[test]
    fn test_head_is_bounded() {
        let dataset = sample();
        assert_eq!(dataset.head(2).len(), 2);
        assert_eq!(dataset.head(100).len(), 5);
    }
}
