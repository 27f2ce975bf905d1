use crate::core::outcome::OutcomePrediction;
use crate::core::race::Lane;
use crate::core::vehicle::{UnitSystem, Vehicle};
use anyhow::Context;
use helpers::general::group_thousands;
use log::info;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// RaceResult is the snapshot of a race at the moment the finish line was crossed. It is produced
/// exactly once per race instance.
/// * `race_time` - (s) Elapsed race time at the finishing tick
/// * `positions` - Positions of lane A and B at the finishing tick
/// * `speeds` - Speeds of lane A and B at the finishing tick
/// * `margin_distance` - Winner position minus loser position at the finishing tick
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RaceResult {
    pub winner_lane: Lane,
    pub winner: Vehicle,
    pub loser: Vehicle,
    pub race_time: f64,
    pub distance: f64,
    pub units: UnitSystem,
    pub positions: [f64; 2],
    pub speeds: [f64; 2],
    pub margin_distance: f64,
}

impl RaceResult {
    /// print_result prints the race result to the log.
    pub fn print_result(&self) {
        info!(
            "RESULT: {} (lane {}) beats {} over {}",
            self.winner.label(),
            self.winner_lane,
            self.loser.label(),
            format_distance(self.distance, self.units)
        );
        info!("RESULT: Time: {}", format_time(self.race_time));
        info!(
            "RESULT: Margin: {}",
            format_margin(self.margin_distance, self.units)
        );
        for lane in Lane::ALL.iter() {
            info!(
                "RESULT: Lane {}: {:.1} {} at {}",
                lane,
                self.positions[lane.idx()],
                self.units.distance_label(),
                format_speed(self.speeds[lane.idx()], self.units)
            );
        }
    }

    /// write_result_to_file writes the result as JSON, by default to output/last_race.json.
    /// Returns the path to the written file.
    pub fn write_result_to_file(&self, path: Option<&Path>) -> anyhow::Result<String> {
        let out_path = get_out_path(path, "last_race.json")?;
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize race result!")?;

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&out_path)
            .context(format!("Failed to open result file {}!", out_path.display()))?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        Ok(out_path.to_string_lossy().into_owned())
    }
}

/// print_prediction prints the predicted outcome of a race to the log.
pub fn print_prediction(prediction: &OutcomePrediction, distance: f64, units: UnitSystem) {
    info!(
        "PREDICTION: {} (lane {}) beats {} over {}",
        prediction.winner.label(),
        prediction.winner_lane,
        prediction.loser.label(),
        format_distance(distance, units)
    );
    info!(
        "PREDICTION: Times: {} vs. {}",
        format_time(prediction.winner_time),
        format_time(prediction.loser_time)
    );
    info!(
        "PREDICTION: Margin: {} / {}",
        format_margin(prediction.margin_distance, units),
        format_time(prediction.margin_time)
    );
}

/// get_out_path returns the inserted path or output/<default_name> and creates the parent folder.
pub fn get_out_path(path: Option<&Path>, default_name: &str) -> anyhow::Result<PathBuf> {
    let out_path = match path {
        Some(p) => p.to_path_buf(),
        None => Path::new("output").join(default_name),
    };

    if let Some(out_dir) = out_path.parent() {
        if !out_dir.as_os_str().is_empty() {
            std::fs::create_dir_all(out_dir).context(format!(
                "Failed to create output folder {}!",
                out_dir.display()
            ))?;
        }
    }

    Ok(out_path)
}

/// format_time formats a time in seconds, e.g. "9.23s".
pub fn format_time(seconds: f64) -> String {
    format!("{:.2}s", seconds)
}

/// format_speed formats a speed rounded to an integer, e.g. "156 MPH".
pub fn format_speed(speed: f64, units: UnitSystem) -> String {
    format!("{:.0} {}", speed.max(0.0).round(), units.speed_label())
}

/// format_distance formats a distance rounded to an integer with thousands separators,
/// e.g. "1,320 ft".
pub fn format_distance(distance: f64, units: UnitSystem) -> String {
    format!(
        "{} {}",
        group_thousands(distance.max(0.0).round() as u64),
        units.distance_label()
    )
}

/// format_margin formats a margin with one decimal, e.g. "135.8 ft".
pub fn format_margin(margin: f64, units: UnitSystem) -> String {
    format!("{:.1} {}", margin, units.distance_label())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_result() -> RaceResult {
        RaceResult {
            winner_lane: Lane::A,
            winner: Vehicle::new("A", 200.0, 2.0, 9.0).unwrap(),
            loser: Vehicle::new("B", 180.0, 3.0, 10.0).unwrap(),
            race_time: 9.004,
            distance: 1320.0,
            units: UnitSystem::Imperial,
            positions: [1321.2, 1184.8],
            speeds: [200.0, 165.3],
            margin_distance: 136.4,
        }
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_time(9.234), "9.23s");
        assert_eq!(format_speed(155.6, UnitSystem::Imperial), "156 MPH");
        assert_eq!(format_speed(99.4, UnitSystem::Metric), "99 km/h");
        assert_eq!(format_distance(1320.0, UnitSystem::Imperial), "1,320 ft");
        assert_eq!(format_distance(402.336, UnitSystem::Metric), "402 m");
        assert_eq!(format_margin(135.77, UnitSystem::Imperial), "135.8 ft");
    }

    #[test]
    fn test_result_serializes_to_json() {
        let json = serde_json::to_value(&create_result()).unwrap();
        assert_eq!(json["winner_lane"], "A");
        assert_eq!(json["winner"]["label"], "A");
        assert_eq!(json["units"], "imperial");
        assert_eq!(json["positions"][1], 1184.8);
    }

    #[test]
    fn test_write_result_to_file() {
        let path = std::env::temp_dir().join("dragsim_test_result").join("result.json");
        let written = create_result().write_result_to_file(Some(&path)).unwrap();

        let content = std::fs::read_to_string(&written).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["loser"]["label"], "B");
    }
}
