use crate::core::error::RaceError;
use crate::core::race::{Lane, RaceStatus};
use crate::core::vehicle::UnitSystem;
use crate::post::race_result::RaceResult;

/// Maximum frequency of snapshots sent to the GUI.
pub const MAX_GUI_UPDATE_FREQUENCY: f64 = 60.0;

/// Default lane colors: lane A blue (#3B82F6), lane B red (#EF4444).
pub const LANE_COLORS: [RgbColor; 2] = [
    RgbColor {
        r: 59,
        g: 130,
        b: 246,
    },
    RgbColor {
        r: 239,
        g: 68,
        b: 68,
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> RgbColor {
        RgbColor { r, g, b }
    }

    /// parse reads a CSS color string, e.g. "#3B82F6" or "red", of the given vehicle.
    pub fn parse(color: &str, label: &str) -> Result<RgbColor, RaceError> {
        let tmp_color = color
            .parse::<css_color_parser::Color>()
            .map_err(|_| RaceError::InvalidColor {
                label: label.to_owned(),
                color: color.to_owned(),
            })?;

        Ok(RgbColor {
            r: tmp_color.r,
            g: tmp_color.g,
            b: tmp_color.b,
        })
    }
}

/// LaneState is the state of one lane as it is shown in the GUI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneState {
    pub label: String,
    pub color: RgbColor,
    pub position: f64,
    pub speed: f64,
}

/// RaceSnapshot is an immutable capture of the race state at one tick. It is handed to the
/// renderers and sent to the GUI.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceSnapshot {
    pub status: RaceStatus,
    /// Only set while the race is counting down.
    pub countdown: Option<u32>,
    pub racetime: f64,
    pub distance: f64,
    pub units: UnitSystem,
    pub lanes: [LaneState; 2],
    pub winner: Option<Lane>,

    // final results payload (only set once the race is finished)
    pub final_result: Option<RaceResult>,
}

impl RaceSnapshot {
    /// lane_progress returns the position of the lane normalized to the race distance and clamped
    /// to [0, 1].
    pub fn lane_progress(&self, lane: Lane) -> f64 {
        (self.lanes[lane.idx()].position / self.distance)
            .max(0.0)
            .min(1.0)
    }
}

/// Commands the GUI sends to the simulation thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceCommand {
    /// Start the race over with a fresh countdown.
    Reset,
    /// Stop the simulation thread.
    Quit,
}
