use crate::core::kinematics::calc_position;
use crate::core::race::Lane;
use crate::core::vehicle::{UnitSystem, Vehicle};
use serde::Serialize;

/// OutcomePrediction contains the deterministic result of a race between two vehicles without
/// running the animation.
/// * `winner_lane` - Lane of the winner (lane A is the first vehicle)
/// * `winner_time` - (s) Quarter mile time of the winner
/// * `loser_time` - (s) Quarter mile time of the loser
/// * `margin_distance` - Distance between the loser and the finish line when the winner crosses it
/// * `margin_time` - (s) Difference between the quarter mile times
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomePrediction {
    pub winner_lane: Lane,
    pub winner: Vehicle,
    pub loser: Vehicle,
    pub winner_time: f64,
    pub loser_time: f64,
    pub margin_distance: f64,
    pub margin_time: f64,
}

/// predict_outcome determines winner and margin of a race between vehicle_a (lane A) and
/// vehicle_b (lane B). The vehicle with the smaller quarter mile time wins. Equal quarter mile
/// times resolve to vehicle_a, the same tie-break the race uses for equal positions.
pub fn predict_outcome(
    vehicle_a: &Vehicle,
    vehicle_b: &Vehicle,
    distance: f64,
    units: UnitSystem,
) -> OutcomePrediction {
    let b_is_faster = vehicle_b.quarter_mile_time() < vehicle_a.quarter_mile_time();
    let (winner_lane, winner, loser) = if b_is_faster {
        (Lane::B, vehicle_b, vehicle_a)
    } else {
        (Lane::A, vehicle_a, vehicle_b)
    };

    let winner_time = winner.quarter_mile_time();
    let loser_time = loser.quarter_mile_time();

    // where is the loser when the winner crosses the finish line
    let s_loser = calc_position(loser, winner_time, distance, units);

    OutcomePrediction {
        winner_lane,
        winner: winner.to_owned(),
        loser: loser.to_owned(),
        winner_time,
        loser_time,
        margin_distance: (distance - s_loser).max(0.0),
        margin_time: loser_time - winner_time,
    }
}
