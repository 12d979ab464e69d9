//! Weather station temperature analysis.
//!
//! Input is a folder of CSV files, one row per station, with columns
//! `STN_ID`, `STATION_NAME` and one column per month (`January` ..
//! `December`) holding that month's mean temperature. Blank or non-numeric
//! cells are ignored.
//!
//! The analysis reduces every valid reading into three results:
//!
//! - **Seasonal averages** using Australian seasons.
//! - **Global range**: the coldest and hottest single readings and the
//!   stations they came from.
//! - **Stability**: per-station sample standard deviation, with the most
//!   stable and most variable stations (ties included).

mod report;

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub use report::{render_averages, render_range, render_stability, write_reports};

/// Relative tolerance used to detect tied standard deviations.
const TIE_TOLERANCE: f64 = 1e-9;

/// Column holding the station identifier.
const STATION_ID_COLUMN: &str = "STN_ID";

/// Australian seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Season {
    /// December to February.
    Summer,
    /// March to May.
    Autumn,
    /// June to August.
    Winter,
    /// September to November.
    Spring,
}

impl Season {
    /// Seasons in report order.
    pub const ALL: [Season; 4] = [Self::Summer, Self::Autumn, Self::Winter, Self::Spring];

    fn index(self) -> usize {
        match self {
            Self::Summer => 0,
            Self::Autumn => 1,
            Self::Winter => 2,
            Self::Spring => 3,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
            Self::Winter => "Winter",
            Self::Spring => "Spring",
        };
        f.write_str(name)
    }
}

/// Month columns and the season each belongs to.
pub const MONTHS: [(&str, Season); 12] = [
    ("January", Season::Summer),
    ("February", Season::Summer),
    ("March", Season::Autumn),
    ("April", Season::Autumn),
    ("May", Season::Autumn),
    ("June", Season::Winter),
    ("July", Season::Winter),
    ("August", Season::Winter),
    ("September", Season::Spring),
    ("October", Season::Spring),
    ("November", Season::Spring),
    ("December", Season::Summer),
];

/// Mean temperature per season; `None` when a season had no readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeasonalAverages {
    /// Summer mean.
    pub summer: Option<f64>,
    /// Autumn mean.
    pub autumn: Option<f64>,
    /// Winter mean.
    pub winter: Option<f64>,
    /// Spring mean.
    pub spring: Option<f64>,
}

impl SeasonalAverages {
    /// Average for one season.
    #[must_use]
    pub fn get(&self, season: Season) -> Option<f64> {
        match season {
            Season::Summer => self.summer,
            Season::Autumn => self.autumn,
            Season::Winter => self.winter,
            Season::Spring => self.spring,
        }
    }
}

/// Coldest and hottest readings across every station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureRange {
    /// Station with the lowest reading.
    pub min_station: String,
    /// The lowest reading.
    pub min_temp: f64,
    /// Station with the highest reading.
    pub max_station: String,
    /// The highest reading.
    pub max_temp: f64,
}

impl TemperatureRange {
    /// `max_temp - min_temp`.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.max_temp - self.min_temp
    }
}

/// Standard deviation of one station's readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationDeviation {
    /// Station identifier.
    pub station: String,
    /// Sample standard deviation.
    pub std_dev: f64,
}

/// Most stable and most variable stations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stability {
    /// Stations tied for the lowest deviation, first seen first.
    pub most_stable: Vec<StationDeviation>,
    /// Stations tied for the highest deviation, first seen first.
    pub most_variable: Vec<StationDeviation>,
    /// Every station with a defined deviation, first seen first.
    pub deviations: Vec<StationDeviation>,
}

/// Everything the analysis produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    /// Seasonal averages.
    pub seasonal: SeasonalAverages,
    /// Global range; `None` when there were no readings at all.
    pub range: Option<TemperatureRange>,
    /// Station stability.
    pub stability: Stability,
    /// Files ingested successfully.
    pub files_processed: usize,
    /// Files skipped because of an error.
    pub files_skipped: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Clone)]
struct Extreme {
    station: String,
    temp: f64,
}

/// Streaming reducer over station rows.
///
/// Feed it CSV sources with [`Analyzer::ingest_reader`] or
/// [`Analyzer::ingest_file`], then call [`Analyzer::finish`].
#[derive(Debug, Default)]
pub struct Analyzer {
    seasons: [Accumulator; 4],
    min: Option<Extreme>,
    max: Option<Extreme>,
    station_index: HashMap<String, usize>,
    stations: Vec<(String, Vec<f64>)>,
    files_processed: usize,
    files_skipped: usize,
}

impl Analyzer {
    /// Create an empty analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not valid CSV, or
    /// lacks a required column.
    pub fn ingest_file(&mut self, path: &Path) -> Result<()> {
        let file = fs::File::open(path)?;
        self.ingest_reader(file, path)
    }

    /// Ingest CSV data from any reader. `source` is only used in errors.
    ///
    /// Rows are buffered until the whole source has parsed, so a file that
    /// fails halfway contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid CSV or lacks a required
    /// column.
    pub fn ingest_reader<R: Read>(&mut self, reader: R, source: &Path) -> Result<()> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::MissingColumn {
                    column: name.to_string(),
                    path: source.to_path_buf(),
                })
        };

        let id_col = column(STATION_ID_COLUMN)?;
        let month_cols = MONTHS
            .iter()
            .map(|&(month, season)| column(month).map(|idx| (idx, season)))
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let station = record.get(id_col).unwrap_or_default().to_string();
            let readings: Vec<(Season, f64)> = month_cols
                .iter()
                .filter_map(|&(idx, season)| {
                    record
                        .get(idx)
                        .and_then(parse_reading)
                        .map(|temp| (season, temp))
                })
                .collect();
            rows.push((station, readings));
        }

        debug!(source = %source.display(), rows = rows.len(), "Parsed station rows");
        for (station, readings) in rows {
            self.record_station(station, &readings);
        }
        self.files_processed += 1;
        Ok(())
    }

    fn record_station(&mut self, station: String, readings: &[(Season, f64)]) {
        let slot = match self.station_index.get(&station) {
            Some(&slot) => slot,
            None => {
                self.stations.push((station.clone(), Vec::new()));
                self.station_index
                    .insert(station.clone(), self.stations.len() - 1);
                self.stations.len() - 1
            }
        };

        for &(season, temp) in readings {
            self.seasons[season.index()].push(temp);

            if self.min.as_ref().map_or(true, |m| temp < m.temp) {
                self.min = Some(Extreme {
                    station: station.clone(),
                    temp,
                });
            }
            if self.max.as_ref().map_or(true, |m| temp > m.temp) {
                self.max = Some(Extreme {
                    station: station.clone(),
                    temp,
                });
            }

            self.stations[slot].1.push(temp);
        }
    }

    /// Note a file that was skipped by the caller.
    pub fn skip_file(&mut self) {
        self.files_skipped += 1;
    }

    /// Reduce everything ingested so far.
    #[must_use]
    pub fn finish(self) -> Analysis {
        let [summer, autumn, winter, spring] = self.seasons.map(Accumulator::mean);

        let range = match (self.min, self.max) {
            (Some(min), Some(max)) => Some(TemperatureRange {
                min_station: min.station,
                min_temp: min.temp,
                max_station: max.station,
                max_temp: max.temp,
            }),
            _ => None,
        };

        let deviations: Vec<StationDeviation> = self
            .stations
            .into_iter()
            .filter_map(|(station, temps)| {
                sample_std_dev(&temps).map(|std_dev| StationDeviation { station, std_dev })
            })
            .collect();

        let stability = rank_stability(deviations);
        if stability.deviations.is_empty() {
            warn!("No station has enough readings for a stability calculation");
        }

        Analysis {
            seasonal: SeasonalAverages {
                summer,
                autumn,
                winter,
                spring,
            },
            range,
            stability,
            files_processed: self.files_processed,
            files_skipped: self.files_skipped,
        }
    }
}

/// Parse a cell as a temperature. Blank, non-numeric and non-finite cells
/// are not readings.
fn parse_reading(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|t| t.is_finite())
}

/// Sample standard deviation (`n - 1` denominator). Undefined below two values.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIE_TOLERANCE * a.abs().max(b.abs())
}

fn rank_stability(deviations: Vec<StationDeviation>) -> Stability {
    let Some(min) = deviations.iter().map(|d| d.std_dev).reduce(f64::min) else {
        return Stability::default();
    };
    let max = deviations
        .iter()
        .map(|d| d.std_dev)
        .fold(f64::NEG_INFINITY, f64::max);

    let tied = |target: f64| -> Vec<StationDeviation> {
        deviations
            .iter()
            .filter(|d| is_close(d.std_dev, target))
            .cloned()
            .collect()
    };

    Stability {
        most_stable: tied(min),
        most_variable: tied(max),
        deviations,
    }
}

/// List the `*.csv` files directly inside `dir`, sorted by path.
///
/// # Errors
///
/// Returns an error if `dir` does not exist or cannot be read.
pub fn find_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::not_found(dir));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Analyze a set of CSV files. Files that fail are logged and skipped.
#[must_use]
pub fn analyze_files(files: &[PathBuf]) -> Analysis {
    let mut analyzer = Analyzer::new();
    for path in files {
        if let Err(e) = analyzer.ingest_file(path) {
            warn!(file = %path.display(), error = %e, "Skipping file");
            analyzer.skip_file();
        }
    }

    let analysis = analyzer.finish();
    info!(
        processed = analysis.files_processed,
        skipped = analysis.files_skipped,
        "Analysis complete"
    );
    analysis
}
