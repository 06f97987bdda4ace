use crate::config::IngestConfig;
use crate::ingest::error::IngestError;
use log::{info, warn};
use polars::prelude::*;
use reqwest::Client;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::task;

/// Columns requested from the export.
pub(crate) const EXPORT_COLUMNS: &str = "timestamp,stationnr,stationname,value,lat,lon";
const EXPORT_SEPARATOR: u8 = b';';

/// Downloads the yearly CSV exports of the groundwater dataset.
pub struct ExportFetcher {
    client: Client,
    base_url: String,
    timezone: String,
}

impl ExportFetcher {
    pub fn new(config: &IngestConfig) -> Result<ExportFetcher, IngestError> {
        let builder = Client::builder().timeout(config.timeout);
        // Tests serve exports from a loopback listener.
        #[cfg(test)]
        let builder = builder.no_proxy();
        let client = builder
            .build()
            .map_err(IngestError::ClientBuild)?;
        Ok(ExportFetcher {
            client,
            base_url: config.base_url.clone(),
            timezone: config.timezone.clone(),
        })
    }

    /// Fetches the readings of one calendar year. Every column is returned as a
    /// string; an export without rows yields an empty frame.
    pub async fn fetch_year(&self, year: i32) -> Result<DataFrame, IngestError> {
        let bytes = self.download(year).await?;
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            warn!("Export for {} is empty", year);
            return Ok(DataFrame::empty());
        }
        Self::csv_to_dataframe(bytes, year).await
    }

    async fn download(&self, year: i32) -> Result<Vec<u8>, IngestError> {
        let url = &self.base_url;
        info!("Downloading {} readings from {}", year, url);

        let response = self
            .client
            .get(url)
            .query(&export_query(year, &self.timezone))
            .send()
            .await
            .map_err(|e| IngestError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    IngestError::HttpStatus {
                        url: url.clone(),
                        status,
                        source: e,
                    }
                } else {
                    IngestError::NetworkRequest(url.clone(), e)
                });
            }
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| IngestError::NetworkRequest(url.clone(), e))?;
        info!("Downloaded {} bytes for {}", bytes.len(), year);
        Ok(bytes.to_vec())
    }

    async fn csv_to_dataframe(bytes: Vec<u8>, year: i32) -> Result<DataFrame, IngestError> {
        task::spawn_blocking(move || {
            let mut temp_file =
                NamedTempFile::new().map_err(|e| IngestError::CsvReadIo { year, source: e })?;
            temp_file
                .write_all(&bytes)
                .map_err(|e| IngestError::CsvReadIo { year, source: e })?;
            temp_file
                .flush()
                .map_err(|e| IngestError::CsvReadIo { year, source: e })?;

            CsvReadOptions::default()
                .with_has_header(true)
                .with_infer_schema_length(Some(0))
                .map_parse_options(|options| options.with_separator(EXPORT_SEPARATOR))
                .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
                .map_err(|e| IngestError::CsvReadPolars { year, source: e })?
                .finish()
                .map_err(|e| IngestError::CsvReadPolars { year, source: e })
        })
        .await?
    }
}

/// Query parameters selecting one calendar year of the export.
pub(crate) fn export_query(year: i32, timezone: &str) -> Vec<(&'static str, String)> {
    vec![
        ("lang", "de".to_string()),
        ("timezone", timezone.to_string()),
        ("use_labels", "false".to_string()),
        ("delimiter", ";".to_string()),
        ("select", EXPORT_COLUMNS.to_string()),
        (
            "where",
            format!(
                "timestamp >= '{}-01-01' and timestamp < '{}-01-01'",
                year,
                year + 1
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_query_bounds_year() {
        let query = export_query(2021, "Europe/Zurich");
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(
            get("where"),
            Some("timestamp >= '2021-01-01' and timestamp < '2022-01-01'")
        );
        assert_eq!(get("timezone"), Some("Europe/Zurich"));
        assert_eq!(get("delimiter"), Some(";"));
        assert_eq!(get("select"), Some(EXPORT_COLUMNS));
    }

    #[tokio::test]
    async fn test_csv_to_dataframe_keeps_strings() -> Result<(), Box<dyn std::error::Error>> {
        let csv = "timestamp;stationnr;stationname;value;lat;lon\n\
                   2021-06-01T00:00:00+02:00;0123;Lange Erlen;251.5;47.58;7.62\n";
        let df = ExportFetcher::csv_to_dataframe(csv.as_bytes().to_vec(), 2021).await?;
        assert_eq!(df.height(), 1);
        assert_eq!(df.column("stationnr")?.str()?.get(0), Some("0123"));
        assert_eq!(df.column("value")?.str()?.get(0), Some("251.5"));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_year_against_local_export() -> Result<(), Box<dyn std::error::Error>> {
        let body = "timestamp;stationnr;stationname;value;lat;lon\n\
                    2021-06-01T00:00:00+02:00;123;Lange Erlen;251.5;47.58;7.62\n\
                    2021-06-02T00:00:00+02:00;123;Lange Erlen;251.7;47.58;7.62\n";
        let (url, server) = crate::test_support::serve_exports(vec![
            (200, body.to_string()),
            (500, "upstream down".to_string()),
            (200, "\n".to_string()),
        ])
        .await?;
        let config = IngestConfig::builder().base_url(url).build();
        let fetcher = ExportFetcher::new(&config)?;

        let df = fetcher.fetch_year(2021).await?;
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("value")?.str()?.get(1), Some("251.7"));

        match fetcher.fetch_year(2021).await {
            Err(IngestError::HttpStatus { status, .. }) => assert_eq!(status.as_u16(), 500),
            other => panic!("expected an HTTP status error, got {other:?}"),
        }

        assert_eq!(fetcher.fetch_year(2022).await?.height(), 0);

        let requests = server.await??;
        assert_eq!(requests.len(), 3);
        assert!(requests[0].starts_with("GET /exports/csv?"));
        assert!(requests[0].contains("lang=de"));
        assert!(requests[0].contains("2021-01-01"));
        assert!(requests[0].contains("2022-01-01"));
        Ok(())
    }
}
