// HTTP CSV source - fetches and decodes the spreadsheet export
use crate::application::telemetry_source::{IngestError, TelemetrySource};
use crate::domain::frame::Frame;
use crate::infrastructure::config::ColumnsConfig;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use std::collections::{BTreeMap, HashSet};

// Layouts seen across spreadsheet revisions, tried in order; RFC 3339 with
// an explicit offset is the fallback.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone)]
pub struct HttpCsvSource {
    client: reqwest::Client,
    columns: ColumnsConfig,
}

impl HttpCsvSource {
    pub fn new(columns: ColumnsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            columns,
        }
    }
}

#[async_trait]
impl TelemetrySource for HttpCsvSource {
    async fn fetch(&self, reference: &str) -> Result<Frame, IngestError> {
        // Reject non-http references before touching the network.
        if !reference.starts_with("http://") && !reference.starts_with("https://") {
            return Err(IngestError::InvalidSourceReference {
                reference: reference.to_string(),
            });
        }

        let response = self
            .client
            .get(reference)
            .send()
            .await
            .map_err(|e| IngestError::unavailable(reference, e))?
            .error_for_status()
            .map_err(|e| IngestError::unavailable(reference, e))?;

        let body = response
            .text()
            .await
            .map_err(|e| IngestError::unavailable(reference, e))?;

        parse_csv(&body, &self.columns, reference)
    }
}

/// Decode CSV text into a [`Frame`]. The timestamp column is the first
/// configured candidate present in the header; every other column becomes
/// a value channel. Cells that do not parse as numbers are missing, not
/// errors; a row with an unparseable timestamp fails the whole decode.
pub fn parse_csv(text: &str, columns: &ColumnsConfig, reference: &str) -> Result<Frame, IngestError> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| IngestError::unavailable(reference, e))?
        .clone();

    let timestamp_idx = headers
        .iter()
        .position(|header| columns.timestamp.iter().any(|candidate| candidate == header))
        .ok_or_else(|| IngestError::MissingChannel {
            reference: reference.to_string(),
            channel: "timestamp".to_string(),
        })?;

    let mut seen = HashSet::new();
    let value_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, header)| *i != timestamp_idx && seen.insert(header.to_string()))
        .map(|(i, header)| (i, header.to_string()))
        .collect();

    let mut timestamps = Vec::new();
    let mut channels: BTreeMap<String, Vec<Option<f64>>> = value_columns
        .iter()
        .map(|(_, name)| (name.clone(), Vec::new()))
        .collect();

    for (row_index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| IngestError::unavailable(reference, e))?;

        let raw_ts = record.get(timestamp_idx).unwrap_or("");
        let ts = parse_timestamp(raw_ts).ok_or_else(|| {
            IngestError::unavailable(
                reference,
                format!("row {}: unparseable timestamp `{}`", row_index + 2, raw_ts),
            )
        })?;
        timestamps.push(ts);

        for (idx, name) in &value_columns {
            let cell = record.get(*idx).unwrap_or("").trim();
            let value = if cell.is_empty() {
                None
            } else {
                cell.parse::<f64>().ok()
            };
            if let Some(column) = channels.get_mut(name) {
                column.push(value);
            }
        }
    }

    Ok(Frame {
        timestamps,
        channels,
    })
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_parse_csv_basic() {
        let text = "datetime,COUNT_TIME_1,BATTERY\n\
                    2024-05-01 10:00:00,100,3.1\n\
                    2024-05-01 11:00:00,,3.05\n\
                    2024-05-01 12:00:00,150,not-a-number\n";

        let frame = parse_csv(text, &ColumnsConfig::default(), "https://example.com/d.csv").unwrap();

        assert_eq!(frame.len(), 3);
        assert_eq!(frame.timestamps[0], dt("2024-05-01 10:00:00"));
        assert_eq!(
            frame.channel("COUNT_TIME_1").unwrap(),
            &[Some(100.0), None, Some(150.0)]
        );
        assert_eq!(frame.channel("BATTERY").unwrap(), &[Some(3.1), Some(3.05), None]);
    }

    #[test]
    fn test_parse_csv_resolves_alternate_timestamp_column() {
        let text = "timestamp,COUNT_TIME_1\n2024-05-01T10:00:00,1\n";

        let frame = parse_csv(text, &ColumnsConfig::default(), "https://example.com/d.csv").unwrap();

        assert_eq!(frame.timestamps, vec![dt("2024-05-01 10:00:00")]);
    }

    #[test]
    fn test_parse_csv_accepts_rfc3339_timestamps() {
        let text = "datetime,COUNT_TIME_1\n2024-05-01T10:00:00+02:00,1\n";

        let frame = parse_csv(text, &ColumnsConfig::default(), "https://example.com/d.csv").unwrap();

        assert_eq!(frame.timestamps, vec![dt("2024-05-01 08:00:00")]);
    }

    #[test]
    fn test_parse_csv_without_timestamp_column() {
        let text = "time,COUNT_TIME_1\n2024-05-01 10:00:00,1\n";

        let err = parse_csv(text, &ColumnsConfig::default(), "https://example.com/d.csv").unwrap_err();

        assert!(matches!(err, IngestError::MissingChannel { ref channel, .. } if channel == "timestamp"));
    }

    #[test]
    fn test_parse_csv_unparseable_timestamp_fails_the_decode() {
        let text = "datetime,COUNT_TIME_1\nyesterday,1\n";

        let err = parse_csv(text, &ColumnsConfig::default(), "https://example.com/d.csv").unwrap_err();

        assert!(matches!(err, IngestError::SourceUnavailable { .. }));
        assert!(err.to_string().contains("yesterday"));
    }

    #[tokio::test]
    async fn test_non_http_reference_is_rejected_before_fetching() {
        let source = HttpCsvSource::new(ColumnsConfig::default());

        let err = source.fetch("ftp://example.com/data.csv").await.unwrap_err();

        assert!(matches!(err, IngestError::InvalidSourceReference { .. }));
        assert!(err.to_string().contains("ftp://example.com/data.csv"));
    }

    #[tokio::test]
    async fn test_unreachable_source_reports_reference_and_cause() {
        let source = HttpCsvSource::new(ColumnsConfig::default());

        // Port 9 (discard) is not listening; the connect fails immediately.
        let err = source.fetch("http://127.0.0.1:9/data.csv").await.unwrap_err();

        assert!(matches!(err, IngestError::SourceUnavailable { .. }));
        let message = err.to_string();
        assert!(message.contains("http://127.0.0.1:9/data.csv"));
        assert!(message.contains("unavailable"));
    }
}
