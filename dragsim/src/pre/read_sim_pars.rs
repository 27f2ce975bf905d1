use crate::core::race::{Race, RacePars};
use crate::core::vehicle::{UnitSystem, Vehicle, VehiclePars};
use crate::interfaces::gui_interface::{RgbColor, LANE_COLORS};
use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fs::OpenOptions;
use std::path::Path;

/// SimPars is used to store all other parameter structs. The first vehicle starts in lane A, the
/// second one in lane B.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SimPars {
    #[serde(default)]
    pub race_pars: RacePars,
    pub vehicle_pars: [VehiclePars; 2],
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    debug!("Read parameter file {}", filepath.display());
    Ok(pars)
}

/// default_sim_pars returns the built-in race (Koenigsegg Jesko Absolut vs. Tesla Model S Plaid
/// over a quarter mile) that is used if no parameter file is given.
pub fn default_sim_pars() -> SimPars {
    SimPars {
        race_pars: RacePars {
            distance: None,
            units: UnitSystem::Imperial,
        },
        vehicle_pars: [
            VehiclePars {
                label: String::from("Koenigsegg Jesko Absolut"),
                top_speed: 330.0,
                speed_0_to_60: 2.5,
                quarter_mile_time: 9.1,
                color: None,
            },
            VehiclePars {
                label: String::from("Tesla Model S Plaid"),
                top_speed: 200.0,
                speed_0_to_60: 1.99,
                quarter_mile_time: 9.23,
                color: None,
            },
        ],
    }
}

impl SimPars {
    /// get_vehicles validates the performance figures of both vehicles.
    pub fn get_vehicles(&self) -> anyhow::Result<[Vehicle; 2]> {
        let vehicle_a = Vehicle::try_from(&self.vehicle_pars[0])
            .context("Invalid vehicle parameters for lane A!")?;
        let vehicle_b = Vehicle::try_from(&self.vehicle_pars[1])
            .context("Invalid vehicle parameters for lane B!")?;
        Ok([vehicle_a, vehicle_b])
    }

    /// get_colors returns the glyph colors of both lanes. Lanes without a color use the default
    /// lane color.
    pub fn get_colors(&self) -> anyhow::Result<[RgbColor; 2]> {
        let mut colors = LANE_COLORS;

        for (color, vehicle_pars) in colors.iter_mut().zip(self.vehicle_pars.iter()) {
            if let Some(css_color) = vehicle_pars.color.as_ref() {
                *color = RgbColor::parse(css_color, &vehicle_pars.label)
                    .context("Could not parse vehicle color!")?;
            }
        }

        Ok(colors)
    }
}

/// build_race creates a race in countdown state from the simulation parameters.
pub fn build_race(sim_pars: &SimPars) -> anyhow::Result<Race> {
    let [vehicle_a, vehicle_b] = sim_pars.get_vehicles()?;
    let colors = sim_pars.get_colors()?;

    let race = Race::new(&sim_pars.race_pars, vehicle_a, vehicle_b)
        .context("Could not create race!")?
        .with_colors(colors);
    Ok(race)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::race::{Lane, RaceStatus};
    use std::io::Write;

    #[test]
    fn test_parse_parameter_json() {
        let json = r##"{
            "race_pars": { "units": "metric" },
            "vehicle_pars": [
                { "label": "Rimac Nevera", "top_speed": 412.0, "speed_0_to_60": 1.85, "quarter_mile_time": 8.58, "color": "#10B981" },
                { "label": "Porsche 911 GT3 RS", "top_speed": 296.0, "speed_0_to_60": 3.0, "quarter_mile_time": 10.9 }
            ]
        }"##;
        let sim_pars: SimPars = serde_json::from_str(json).unwrap();

        assert_eq!(sim_pars.race_pars.units, UnitSystem::Metric);
        assert_eq!(sim_pars.race_pars.get_distance(), 402.336);
        assert_eq!(sim_pars.vehicle_pars[1].color, None);

        let race = build_race(&sim_pars).unwrap();
        assert_eq!(race.get_status(), RaceStatus::Countdown);
        assert_eq!(race.get_vehicle(Lane::A).label(), "Rimac Nevera");

        let snapshot = race.snapshot();
        assert_eq!(snapshot.lanes[0].color, RgbColor::new(16, 185, 129));
        assert_eq!(snapshot.lanes[1].color, LANE_COLORS[1]);
    }

    #[test]
    fn test_three_vehicles_are_rejected() {
        let json = r#"{
            "vehicle_pars": [
                { "label": "A", "top_speed": 200.0, "speed_0_to_60": 2.0, "quarter_mile_time": 9.0 },
                { "label": "B", "top_speed": 200.0, "speed_0_to_60": 2.0, "quarter_mile_time": 9.0 },
                { "label": "C", "top_speed": 200.0, "speed_0_to_60": 2.0, "quarter_mile_time": 9.0 }
            ]
        }"#;
        assert!(serde_json::from_str::<SimPars>(json).is_err());
    }

    #[test]
    fn test_invalid_vehicle_and_color_are_rejected() {
        let mut sim_pars = default_sim_pars();
        sim_pars.vehicle_pars[1].quarter_mile_time = 1.0;
        assert!(build_race(&sim_pars).is_err());

        let mut sim_pars = default_sim_pars();
        sim_pars.vehicle_pars[0].color = Some(String::from("no color"));
        assert!(build_race(&sim_pars).is_err());
    }

    #[test]
    fn test_read_sim_pars_from_file() {
        let path = std::env::temp_dir().join("dragsim_test_read_sim_pars.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(serde_json::to_string(&default_sim_pars()).unwrap().as_bytes())
            .unwrap();

        let sim_pars = read_sim_pars(&path).unwrap();
        assert_eq!(sim_pars, default_sim_pars());

        let err = read_sim_pars(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
