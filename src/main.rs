//! `groundwater` - command line access to the Basel-Stadt groundwater store.

use anyhow::Context;
use clap::{Parser, Subcommand};
use groundwater::{
    ChartSettings, Groundwater, GroundwaterConfig, IngestConfig, Ingestor, YearRange,
};
use log::info;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "groundwater",
    version,
    about = "Groundwater levels of the Basel-Stadt monitoring network"
)]
struct Cli {
    /// Directory holding the store files
    #[arg(long, global = true, env = "GROUNDWATER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download the open data export and rewrite the measurement and station tables
    Ingest {
        #[arg(long)]
        first_year: Option<i32>,
        /// Defaults to the current year
        #[arg(long)]
        last_year: Option<i32>,
    },
    /// List stations as name and id, sorted by name
    Stations,
    /// Years with measurements at a station, newest first
    Years { station: String },
    /// Monthly mean water levels of a station as a year x month table
    Monthly { station: String },
    /// Measurements of a station between two years (inclusive)
    Series { station: String, start: i32, end: i32 },
    /// Reference precipitation between two years (inclusive)
    Precipitation { start: i32, end: i32 },
    /// Kataster record of a station's borehole
    Borehole { station: String },
    /// Year and value bounds of one station or of the whole store
    Extent { station: Option<String> },
    /// Resolved axes of the water level and precipitation charts
    Chart { station: String, start: i32, end: i32 },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = GroundwaterConfig::builder()
        .maybe_data_dir(cli.data_dir)
        .build();

    if let Command::Ingest {
        first_year,
        last_year,
    } = cli.command
    {
        let ingest = IngestConfig::builder()
            .maybe_first_year(first_year)
            .maybe_last_year(last_year)
            .build();
        let summary = Ingestor::new(ingest, config).run().await?;
        info!(
            "Ingested {} rows into {} measurements",
            summary.raw_rows, summary.measurements
        );
        return print_json(&summary);
    }

    let store = Groundwater::load(&config)
        .with_context(|| format!("Failed to load the store from {:?}", config.data_dir))?;

    match cli.command {
        Command::Ingest { .. } => Ok(()),
        Command::Stations => {
            let stations: Vec<_> = store
                .stations()
                .iter()
                .map(|(name, id)| json!({ "name": name, "id": id }))
                .collect();
            print_json(&stations)
        }
        Command::Years { station } => print_json(&store.years_for_station(&station)?),
        Command::Monthly { station } => {
            let table = store.monthly_average_table(&station)?;
            println!("{}", store.station_name(&station)?);
            print!("{table}");
            Ok(())
        }
        Command::Series {
            station,
            start,
            end,
        } => print_json(&store.filtered_series(&station, YearRange::new(start, end)?)?),
        Command::Precipitation { start, end } => {
            print_json(&store.precipitation_series(YearRange::new(start, end)?)?)
        }
        Command::Borehole { station } => {
            let fields: serde_json::Map<_, _> = store
                .borehole_info(&station)
                .iter()
                .map(|(name, value)| (name.to_string(), json!(value)))
                .collect();
            print_json(&fields)
        }
        Command::Extent { station } => print_json(&store.value_extent(station.as_deref())?),
        Command::Chart {
            station,
            start,
            end,
        } => {
            let years = YearRange::new(start, end)?;
            let name = store.station_name(&station)?;
            let series = store.filtered_series(&station, years)?;
            let precipitation = store.precipitation_series(years)?;

            let level = ChartSettings::water_level(name);
            let rain = ChartSettings::precipitation(format!("Niederschlag {years}"));
            print_json(&json!({
                "water_level": {
                    "settings": level,
                    "axes": level.resolve_water_levels(&series),
                },
                "precipitation": {
                    "settings": rain,
                    "axes": rain.resolve_precipitation(&precipitation),
                },
            }))
        }
    }
}
