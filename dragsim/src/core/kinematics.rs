//! Kinematic model that maps the elapsed race time onto position and speed of a vehicle. The model
//! is calibrated by three figures only (0-60 time, quarter mile time, top speed) and consists of
//! three phases:
//!
//! * Launch (`0 < t <= t_0_60`): quadratic position curve, linear speed ramp up to 60
//! * Acceleration (`t_0_60 < t <= t_qm`): linear position progress up to the race distance,
//!   concave speed approach towards the top speed
//! * Overrun (`t > t_qm`): constant top speed, position capped at 1.5 times the race distance
//!
//! Times `t <= 0` (including negative and NaN inputs) are treated as standstill, i.e. position and
//! speed are zero.

use crate::core::vehicle::{UnitSystem, Vehicle};

/// Share of the race distance covered during the 0-60 interval. Empirical tuning constant
/// calibrated against drag strip telemetry.
pub const LAUNCH_DISTANCE_SHARE: f64 = 0.28;

/// Exponent of the speed curve between 60 and top speed. Empirical tuning constant.
pub const SPEED_CURVE_EXPONENT: f64 = 0.7;

/// Reference speed of the 0-60 figure (in the speed unit of the vehicle).
pub const REFERENCE_SPEED: f64 = 60.0;

/// Maximum position after the finish line as a multiple of the race distance.
pub const OVERRUN_CAP: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Standstill,
    Launch,
    Acceleration,
    Overrun,
}

/// get_phase returns the model phase the vehicle is in at time t. If the quarter mile time equals
/// the 0-60 time the acceleration phase is empty, i.e. the vehicle switches from launch directly
/// into overrun.
pub fn get_phase(vehicle: &Vehicle, t: f64) -> Phase {
    if !(t > 0.0) {
        Phase::Standstill
    } else if t <= vehicle.speed_0_to_60() {
        Phase::Launch
    } else if t <= vehicle.quarter_mile_time() {
        Phase::Acceleration
    } else {
        Phase::Overrun
    }
}

/// Fraction of the acceleration phase that has passed at time t, clamped to [0, 1]. A zero-length
/// acceleration phase counts as completed.
fn calc_accel_frac(vehicle: &Vehicle, t: f64) -> f64 {
    let t_accel = vehicle.quarter_mile_time() - vehicle.speed_0_to_60();

    if t_accel <= 0.0 {
        return 1.0;
    }

    ((t - vehicle.speed_0_to_60()) / t_accel).max(0.0).min(1.0)
}

/// calc_position returns the distance covered by the vehicle after t seconds in a race over the
/// given distance.
pub fn calc_position(vehicle: &Vehicle, t: f64, distance: f64, units: UnitSystem) -> f64 {
    let s_launch = distance * LAUNCH_DISTANCE_SHARE;

    match get_phase(vehicle, t) {
        Phase::Standstill => 0.0,
        Phase::Launch => {
            // a degenerate profile reaches the finish line at the end of its launch
            if t >= vehicle.quarter_mile_time() {
                return distance;
            }
            let launch_frac = t / vehicle.speed_0_to_60();
            s_launch * launch_frac.powi(2)
        }
        Phase::Acceleration => {
            let frac = calc_accel_frac(vehicle, t);
            if frac >= 1.0 {
                return distance;
            }
            // non-decreasing in frac, the finish line is never passed before t_qm
            (s_launch + (distance - s_launch) * frac).min(distance)
        }
        Phase::Overrun => {
            let t_extra = t - vehicle.quarter_mile_time();
            let v_top = vehicle.top_speed() * units.speed_to_distance_per_s();
            (distance + v_top * t_extra).min(distance * OVERRUN_CAP)
        }
    }
}

/// calc_speed returns the instantaneous speed of the vehicle after t seconds (in the speed unit of
/// the vehicle).
pub fn calc_speed(vehicle: &Vehicle, t: f64) -> f64 {
    match get_phase(vehicle, t) {
        Phase::Standstill => 0.0,
        Phase::Launch => REFERENCE_SPEED * t / vehicle.speed_0_to_60(),
        Phase::Acceleration => {
            let frac = calc_accel_frac(vehicle, t);
            REFERENCE_SPEED
                + (vehicle.top_speed() - REFERENCE_SPEED) * frac.powf(SPEED_CURVE_EXPONENT)
        }
        Phase::Overrun => vehicle.top_speed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const D: f64 = 1320.0;

    fn vehicle_a() -> Vehicle {
        Vehicle::new("A", 200.0, 2.0, 9.0).unwrap()
    }

    fn vehicle_b() -> Vehicle {
        Vehicle::new("B", 180.0, 3.0, 10.0).unwrap()
    }

    fn sample_vehicles() -> Vec<Vehicle> {
        vec![
            vehicle_a(),
            vehicle_b(),
            Vehicle::new("Koenigsegg Jesko Absolut", 330.0, 2.5, 9.1).unwrap(),
            Vehicle::new("Rimac Nevera", 258.0, 1.85, 8.58).unwrap(),
            Vehicle::new("Slow", 90.0, 12.0, 19.5).unwrap(),
            Vehicle::new("Degenerate", 150.0, 4.0, 4.0).unwrap(),
        ]
    }

    #[test]
    fn test_standstill_at_zero_and_negative_time() {
        for vehicle in sample_vehicles().iter() {
            assert_eq!(calc_position(vehicle, 0.0, D, UnitSystem::Imperial), 0.0);
            assert_eq!(calc_speed(vehicle, 0.0), 0.0);
            assert_eq!(calc_position(vehicle, -1.5, D, UnitSystem::Imperial), 0.0);
            assert_eq!(calc_speed(vehicle, -1.5), 0.0);
            assert_eq!(calc_position(vehicle, f64::NAN, D, UnitSystem::Imperial), 0.0);
        }
    }

    #[test]
    fn test_position_is_monotonic() {
        for vehicle in sample_vehicles().iter() {
            let mut s_prev = 0.0;
            for i in 0..=3000 {
                let t = i as f64 * 0.01;
                let s = calc_position(vehicle, t, D, UnitSystem::Imperial);
                assert!(
                    s >= s_prev,
                    "{} moved backwards at t={}: {} < {}",
                    vehicle.label(),
                    t,
                    s,
                    s_prev
                );
                s_prev = s;
            }
        }
    }

    fn next_float(t: f64) -> f64 {
        f64::from_bits(t.to_bits() + 1)
    }

    fn prev_float(t: f64, steps: u64) -> f64 {
        f64::from_bits(t.to_bits() - steps)
    }

    #[test]
    fn test_position_is_monotonic_across_phase_boundaries_at_float_resolution() {
        let mut vehicles = sample_vehicles();
        vehicles.push(Vehicle::new("Odd", 211.0, 1.0371, 5.3621).unwrap());
        vehicles.push(Vehicle::new("Odd 2", 187.3, 2.9137, 10.0049).unwrap());

        for vehicle in vehicles.iter() {
            for &distance in [D, 402.336, 1000.0, 660.0, 201.168].iter() {
                for &t_boundary in [vehicle.speed_0_to_60(), vehicle.quarter_mile_time()].iter() {
                    let mut t = prev_float(t_boundary, 2000);
                    let mut s_prev = calc_position(vehicle, t, distance, UnitSystem::Imperial);

                    for _ in 0..4000 {
                        t = next_float(t);
                        let s = calc_position(vehicle, t, distance, UnitSystem::Imperial);
                        assert!(
                            s >= s_prev,
                            "{} moved backwards at t={} (distance {}): {} < {}",
                            vehicle.label(),
                            t,
                            distance,
                            s,
                            s_prev
                        );
                        s_prev = s;
                    }
                }
            }
        }
    }

    #[test]
    fn test_position_does_not_pass_finish_line_before_quarter_mile_time() {
        let vehicle = Vehicle::new("Odd", 211.0, 1.0371, 5.3621).unwrap();
        for &distance in [D, 402.336, 1000.0].iter() {
            let t = prev_float(vehicle.quarter_mile_time(), 1);
            assert!(calc_position(&vehicle, t, distance, UnitSystem::Imperial) <= distance);
        }
    }

    #[test]
    fn test_position_is_continuous_at_phase_boundaries() {
        let vehicle = vehicle_b();
        let eps = 1e-9;

        let t_0_60 = vehicle.speed_0_to_60();
        assert_abs_diff_eq!(
            calc_position(&vehicle, t_0_60, D, UnitSystem::Imperial),
            calc_position(&vehicle, t_0_60 + eps, D, UnitSystem::Imperial),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            calc_position(&vehicle, t_0_60, D, UnitSystem::Imperial),
            D * LAUNCH_DISTANCE_SHARE
        );

        let t_qm = vehicle.quarter_mile_time();
        assert_abs_diff_eq!(
            calc_position(&vehicle, t_qm - eps, D, UnitSystem::Imperial),
            calc_position(&vehicle, t_qm + eps, D, UnitSystem::Imperial),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_quarter_mile_time_reaches_distance_exactly() {
        for vehicle in sample_vehicles().iter() {
            for &distance in [D, 402.336, 1000.0, 660.0].iter() {
                let t_qm = vehicle.quarter_mile_time();
                let s = calc_position(vehicle, t_qm, distance, UnitSystem::Imperial);
                assert_eq!(s, distance, "{} at distance {}", vehicle.label(), distance);
            }
        }
    }

    #[test]
    fn test_overrun_runs_at_top_speed_and_is_capped() {
        let vehicle = vehicle_a();
        // 200 MPH = 293.33 ft/s
        let s = calc_position(&vehicle, 10.0, D, UnitSystem::Imperial);
        assert_relative_eq!(s, D + 200.0 * 5280.0 / 3600.0, max_relative = 1e-12);

        let s_far = calc_position(&vehicle, 1000.0, D, UnitSystem::Imperial);
        assert_eq!(s_far, D * OVERRUN_CAP);
    }

    #[test]
    fn test_metric_overrun_uses_metric_conversion() {
        let vehicle = Vehicle::new("Metric", 360.0, 2.0, 9.0).unwrap();
        // 360 km/h = 100 m/s
        let s = calc_position(&vehicle, 9.5, 402.336, UnitSystem::Metric);
        assert_relative_eq!(s, 402.336 + 50.0, max_relative = 1e-12);
    }

    #[test]
    fn test_speed_profile() {
        let vehicle = vehicle_b();
        assert_relative_eq!(calc_speed(&vehicle, 1.5), 30.0);
        assert_relative_eq!(calc_speed(&vehicle, 3.0), REFERENCE_SPEED);
        assert_relative_eq!(calc_speed(&vehicle, 10.0), 180.0);
        assert_relative_eq!(calc_speed(&vehicle, 42.0), 180.0);

        let frac: f64 = 3.5 / 7.0;
        assert_relative_eq!(
            calc_speed(&vehicle, 6.5),
            60.0 + 120.0 * frac.powf(SPEED_CURVE_EXPONENT)
        );
    }

    #[test]
    fn test_degenerate_profile_is_guarded() {
        let vehicle = Vehicle::new("Degenerate", 150.0, 4.0, 4.0).unwrap();

        for i in 0..=100 {
            let t = i as f64 * 0.1;
            let s = calc_position(&vehicle, t, D, UnitSystem::Imperial);
            let v = calc_speed(&vehicle, t);
            assert!(s.is_finite() && v.is_finite(), "NaN at t={}", t);
        }

        assert_eq!(calc_position(&vehicle, 4.0, D, UnitSystem::Imperial), D);
        assert_eq!(calc_speed(&vehicle, 4.0), REFERENCE_SPEED);
        assert_eq!(calc_speed(&vehicle, 4.01), 150.0);
        assert_eq!(get_phase(&vehicle, 4.01), Phase::Overrun);
    }

    #[test]
    fn test_scenario_position_of_b_when_a_finishes() {
        let s = calc_position(&vehicle_b(), 9.0, D, UnitSystem::Imperial);
        // 369.6 / 7 + 1320 * 6 / 7
        assert_relative_eq!(s, 1184.228_571_428_571_4, max_relative = 1e-12);
    }
}
