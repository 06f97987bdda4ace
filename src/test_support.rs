//! Small on-disk store used by the unit tests.

use crate::config::GroundwaterConfig;
use crate::store::extract::{date_to_days, measurements_to_frame, stations_to_frame};
use crate::store::schema::{Table, BOREHOLE_KEY_COLUMN};
use crate::store::writer::{write_csv, write_parquet};
use crate::types::measurement::Measurement;
use crate::types::station::{LatLon, Station};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::error::Error;
use std::path::PathBuf;
use tempfile::TempDir;

pub(crate) const STATION_A: &str = "0000012345";
pub(crate) const STATION_B: &str = "0000067890";
/// Listed in the station table but without measurements.
pub(crate) const STATION_IDLE: &str = "0000099999";

pub(crate) struct Fixture {
    // Keeps the directory alive for the duration of the test.
    _dir: TempDir,
    pub config: GroundwaterConfig,
}

fn measurement(station_id: &str, y: i32, m: u32, d: u32, value: f64) -> Measurement {
    let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
    Measurement {
        station_id: station_id.to_string(),
        year: date.year(),
        month: date.month(),
        date,
        day_in_year: date.ordinal(),
        value,
    }
}

pub(crate) fn measurements() -> Vec<Measurement> {
    // Deliberately not in date order for STATION_A in 2021.
    vec![
        measurement(STATION_A, 2019, 1, 10, 250.0),
        measurement(STATION_B, 2020, 2, 15, 260.5),
        measurement(STATION_A, 2019, 1, 20, 252.0),
        measurement(STATION_A, 2019, 3, 5, 249.5),
        measurement(STATION_A, 2021, 12, 31, 253.0),
        measurement(STATION_A, 2021, 6, 1, 251.25),
        measurement(STATION_B, 2022, 7, 4, 258.0),
    ]
}

pub(crate) fn stations() -> Vec<Station> {
    vec![
        Station {
            id: STATION_A.to_string(),
            name: "Lange Erlen".to_string(),
            location: LatLon(47.58, 7.62),
        },
        Station {
            id: STATION_B.to_string(),
            name: "Kleinhüningen".to_string(),
            location: LatLon(47.59, 7.59),
        },
        Station {
            id: STATION_IDLE.to_string(),
            name: "Lange Erlen".to_string(),
            location: LatLon(47.57, 7.63),
        },
    ]
}

fn boreholes() -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        // Kataster codes are not zero-padded.
        Column::new(BOREHOLE_KEY_COLUMN.into(), vec!["12345"]),
        Column::new("tiefe".into(), vec![24.5f64]),
        Column::new("typ".into(), vec!["Piezometer"]),
        Column::new("baujahr".into(), vec![None::<&str>]),
    ])
}

fn precipitation() -> PolarsResult<DataFrame> {
    let dates = [
        NaiveDate::from_ymd_opt(2018, 12, 31).unwrap(),
        NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2020, 5, 5).unwrap(),
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
    ];
    DataFrame::new(vec![
        Column::new(
            "jahr".into(),
            dates.iter().map(|d| d.year() as i64).collect::<Vec<i64>>(),
        ),
        Column::new(
            "date".into(),
            dates.iter().map(|d| date_to_days(*d)).collect::<Vec<i32>>(),
        )
        .cast(&DataType::Date)?,
        Column::new("precipitation".into(), vec![1.0f64, 0.5, 12.0, 3.0, 4.0]),
    ])
}

fn frames() -> PolarsResult<Vec<(Table, DataFrame)>> {
    Ok(vec![
        (Table::Measurements, measurements_to_frame(&measurements())?),
        (Table::Stations, stations_to_frame(&stations())?),
        (Table::Boreholes, boreholes()?),
        (Table::Precipitation, precipitation()?),
    ])
}

/// Writes the fixture tables as Parquet under the default file names.
pub(crate) fn parquet_fixture() -> Result<Fixture, Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let config = GroundwaterConfig::builder().data_dir(dir.path()).build();
    for (table, mut df) in frames()? {
        write_parquet(&mut df, &config.path(table))?;
    }
    Ok(Fixture { _dir: dir, config })
}

/// Writes the fixture tables as `;`-separated CSV with explicit file overrides.
pub(crate) fn csv_fixture() -> Result<Fixture, Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = |name: &str| -> PathBuf { dir.path().join(name) };
    let config = GroundwaterConfig::builder()
        .data_dir(dir.path())
        .measurements_file(path("final.csv"))
        .stations_file(path("stations.csv"))
        .boreholes_file(path("boreholes.csv"))
        .precipitation_file(path("precipitation.csv"))
        .build();
    for (table, mut df) in frames()? {
        write_csv(&mut df, &config.path(table), config.csv_separator)?;
    }
    Ok(Fixture { _dir: dir, config })
}

/// Serves `responses` (status, body) to consecutive connections on a local
/// port. Returns the export URL and a handle yielding the request lines seen.
pub(crate) async fn serve_exports(
    responses: Vec<(u16, String)>,
) -> std::io::Result<(String, tokio::task::JoinHandle<std::io::Result<Vec<String>>>)> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}/exports/csv", listener.local_addr()?);
    let handle = tokio::spawn(async move {
        let mut request_lines = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await?;
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let request = String::from_utf8_lossy(&request).to_string();
            request_lines.push(request.lines().next().unwrap_or_default().to_string());

            let response = format!(
                "HTTP/1.1 {status} Test\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await?;
            socket.shutdown().await?;
        }
        Ok(request_lines)
    });
    Ok((url, handle))
}
