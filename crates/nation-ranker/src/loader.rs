//! Data loading: the country CSV and weight files

use crate::metric::Metric;
use crate::record::{CountryRecord, NATION_NAME_COLUMN};
use crate::weights::WeightVector;
use crate::Result;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

/// Load country records from a CSV file with a header row
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<CountryRecord>> {
    let path = path.as_ref();
    info!("Loading country data from {:?}", path);

    let file = File::open(path)?;
    read_records(BufReader::new(file))
}

/// Read country records from any CSV source.
///
/// Short rows are accepted (absent cells score as zero). Rows the CSV
/// reader cannot decode are skipped and counted.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<CountryRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    report_missing_columns(&headers);

    let mut records = Vec::new();
    let mut skipped = 0;

    for (i, row) in csv_reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping CSV row {}: {}", i + 2, e);
                skipped += 1;
                continue;
            }
        };

        let fields: HashMap<String, String> = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        records.push(CountryRecord::new(fields));
    }

    let unnamed = records.iter().filter(|r| r.nation_name().is_none()).count();
    info!(
        "Loaded {} rows ({} skipped as unreadable, {} without a nation name)",
        records.len(),
        skipped,
        unnamed
    );

    Ok(records)
}

fn report_missing_columns(headers: &csv::StringRecord) {
    let present = |name: &str| headers.iter().any(|h| h == name);

    if !present(NATION_NAME_COLUMN) {
        warn!("Column {:?} missing, every row will be skipped", NATION_NAME_COLUMN);
    }
    for metric in Metric::ALL {
        if !present(metric.column()) {
            warn!("Column {:?} missing, it will score as zero", metric.column());
        }
    }
}

/// Load a full weight vector from a JSON object keyed by metric name
pub fn load_weights(path: impl AsRef<Path>) -> Result<WeightVector> {
    let path = path.as_ref();
    info!("Loading weights from {:?}", path);

    let file = File::open(path)?;
    let named: HashMap<String, f64> = serde_json::from_reader(BufReader::new(file))?;
    WeightVector::from_named(&named)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RankerError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Nation Name,GDP per capita,IQ average,Gini Coefficient,Life expectancy,HDI,\
Unemployment rate,Public debt to GDP ratio,CPI,Rule of Law Index,Democracy Index";

    #[test]
    fn test_read_records() {
        let csv = format!(
            "{}\nNorway,89000,100,27.7,83.2,0.966,3.6,42,84,1.9,9.81\n,1,1,1,1,1,1,1,1,1,1\n",
            HEADER
        );

        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].nation_name(), Some("Norway"));
        assert_eq!(records[0].metric_value(Metric::Hdi), 0.966);
        assert_eq!(records[1].nation_name(), None);
    }

    #[test]
    fn test_short_rows_and_quoted_fields() {
        let csv = format!("{}\n\"Korea, South\",\"33,000\"\nChad,700,,n/a\n", HEADER);

        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].nation_name(), Some("Korea, South"));
        // Only the leading "33" of "33,000" is a number
        assert_eq!(records[0].metric_value(Metric::GdpPerCapita), 33.0);
        assert_eq!(records[0].get("HDI"), None);
        assert_eq!(records[1].metric_value(Metric::GdpPerCapita), 700.0);
        assert_eq!(records[1].metric_value(Metric::GiniCoefficient), 0.0);
    }

    #[test]
    fn test_headers_only() {
        let records = read_records(HEADER.as_bytes()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_records_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "Japan,34000,106,32.9,84.5,0.925,2.6,255,73,1.6,8.33").unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].metric_value(Metric::PublicDebtToGdp), 255.0);
    }

    #[test]
    fn test_missing_file() {
        let err = load_records("/nonexistent/data.csv").unwrap_err();
        assert!(matches!(err, RankerError::Io(_)));
    }

    #[test]
    fn test_load_weights() {
        let named: HashMap<&str, f64> = Metric::ALL.iter().map(|m| (m.column(), 0.2)).collect();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&named).unwrap().as_bytes())
            .unwrap();

        let weights = load_weights(file.path()).unwrap();
        assert_eq!(weights, WeightVector::uniform(0.2));
    }

    #[test]
    fn test_load_partial_weights_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"HDI": 1.0}"#).unwrap();

        let err = load_weights(file.path()).unwrap_err();
        assert!(matches!(err, RankerError::MissingMetric(_)));
    }
}
