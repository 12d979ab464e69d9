//! Plain-text reports for a weather [`Analysis`].

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::info;

use super::{Analysis, Season, SeasonalAverages, Stability, StationDeviation, TemperatureRange};
use crate::error::Result;

/// One line per season, `Summer: 27.3°C` or `Summer: No data`.
#[must_use]
pub fn render_averages(averages: &SeasonalAverages) -> String {
    let mut out = String::new();
    for season in Season::ALL {
        match averages.get(season) {
            Some(avg) => {
                let _ = writeln!(out, "{season}: {avg:.1}°C");
            }
            None => {
                let _ = writeln!(out, "{season}: No data");
            }
        }
    }
    out
}

/// The global range on a single line.
#[must_use]
pub fn render_range(range: Option<&TemperatureRange>) -> String {
    match range {
        Some(r) => format!(
            "Global Range: {:.1}°C (Max: {:.1}°C at Station {}, Min: {:.1}°C at Station {})\n",
            r.range(),
            r.max_temp,
            r.max_station,
            r.min_temp,
            r.min_station
        ),
        None => "No temperature data available to determine range.\n".to_string(),
    }
}

fn stability_line(label: &str, tied: &[StationDeviation]) -> String {
    let Some(first) = tied.first() else {
        return format!("{label}: No data\n");
    };

    let mut line = format!(
        "{label}: Station {}: StdDev {:.1}°C",
        first.station, first.std_dev
    );
    if tied.len() > 1 {
        let _ = write!(line, " (Tied with {} other station(s))", tied.len() - 1);
    }
    line.push('\n');
    line
}

/// Most stable and most variable station, one line each.
#[must_use]
pub fn render_stability(stability: &Stability) -> String {
    let mut out = stability_line("Most Stable", &stability.most_stable);
    out.push_str(&stability_line("Most Variable", &stability.most_variable));
    out
}

/// Write the three reports to the given paths.
///
/// # Errors
///
/// Returns an error if any file cannot be written.
pub fn write_reports(
    analysis: &Analysis,
    averages_path: &Path,
    range_path: &Path,
    stability_path: &Path,
) -> Result<()> {
    fs::write(averages_path, render_averages(&analysis.seasonal))?;
    info!(file = %averages_path.display(), "Seasonal averages written");

    fs::write(range_path, render_range(analysis.range.as_ref()))?;
    info!(file = %range_path.display(), "Largest temperature range written");

    fs::write(stability_path, render_stability(&analysis.stability))?;
    info!(file = %stability_path.display(), "Temperature stability written");

    Ok(())
}
