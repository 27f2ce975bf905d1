use approx::assert_relative_eq;
use dragsim::core::handle_race::{run_race, RunOutcome};
use dragsim::core::outcome::predict_outcome;
use dragsim::core::race::{Lane, Race, RacePars, RaceStatus};
use dragsim::core::scheduler::{ManualScheduler, Scheduler};
use dragsim::core::vehicle::{UnitSystem, Vehicle};
use dragsim::interfaces::gui_interface::{RaceCommand, RaceSnapshot};
use dragsim::interfaces::renderer::{FrameRenderer, LogRenderer};
use dragsim::post::race_result::RaceResult;
use dragsim::pre::read_sim_pars::{build_race, read_sim_pars};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct SnapshotLog {
    snapshots: Vec<RaceSnapshot>,
}

impl FrameRenderer for SnapshotLog {
    fn render(&mut self, snapshot: &RaceSnapshot) -> anyhow::Result<()> {
        self.snapshots.push(snapshot.to_owned());
        Ok(())
    }
}

fn jesko_vs_plaid() -> Race {
    Race::new(
        &RacePars::default(),
        Vehicle::new("Koenigsegg Jesko Absolut", 330.0, 2.5, 9.1).unwrap(),
        Vehicle::new("Tesla Model S Plaid", 200.0, 1.99, 9.23).unwrap(),
    )
    .unwrap()
}

#[test]
fn test_animated_race_matches_prediction() {
    let mut race = jesko_vs_plaid();
    let prediction = predict_outcome(
        race.get_vehicle(Lane::A),
        race.get_vehicle(Lane::B),
        race.distance,
        race.units,
    );

    let mut scheduler = ManualScheduler::new(120.0);
    let outcome = run_race(&mut race, &mut scheduler, &mut LogRenderer::new(), None).unwrap();

    match outcome {
        RunOutcome::Finished(race_result) => {
            assert_eq!(race_result.winner_lane, prediction.winner_lane);
            assert_eq!(race_result.winner, prediction.winner);
            assert!(race_result.race_time >= prediction.winner_time - 1e-9);
            assert!(race_result.race_time < prediction.winner_time + 1.0 / 120.0 + 1e-9);
        }
        other => panic!("Race did not finish: {:?}", other),
    }
}

#[test]
fn test_positions_never_decrease_and_stay_below_cap() {
    let mut race = jesko_vs_plaid();
    let mut renderer = SnapshotLog::default();
    run_race(&mut race, &mut ManualScheduler::new(60.0), &mut renderer, None).unwrap();

    for lane in Lane::ALL.iter() {
        let positions: Vec<f64> = renderer
            .snapshots
            .iter()
            .map(|snapshot| snapshot.lanes[lane.idx()].position)
            .collect();
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        assert!(positions.iter().all(|&s| s <= 1.5 * 1320.0));
    }

    // exactly one finished snapshot is produced per race instance
    let finished: Vec<&RaceSnapshot> = renderer
        .snapshots
        .iter()
        .filter(|snapshot| matches!(snapshot.status, RaceStatus::Finished))
        .collect();
    assert_eq!(finished.len(), 1);
    assert!(finished[0].final_result.is_some());
}

#[test]
fn test_reset_mid_run_then_finish() {
    let results = Arc::new(Mutex::new(Vec::new()));
    let results_cb = Arc::clone(&results);

    let mut race = jesko_vs_plaid();
    race.set_result_callback(Box::new(move |race_result: &RaceResult| {
        results_cb.lock().unwrap().push(race_result.to_owned())
    }));

    // first instance is stopped after one second of race time
    let (tx, rx) = flume::unbounded();
    let mut scheduler = ManualScheduler::new(60.0);
    let token = scheduler.cancel_token();
    let mut renderer = ResetAfter {
        racetime: 1.0,
        tx,
        sent: false,
    };
    let outcome = run_race(&mut race, &mut scheduler, &mut renderer, Some(&rx)).unwrap();
    assert_eq!(outcome, RunOutcome::Reset);
    assert!(token.is_cancelled());
    assert_eq!(race.get_status(), RaceStatus::Countdown);
    assert!(results.lock().unwrap().is_empty());

    // second instance runs to the finish with a fresh scheduler
    let outcome = run_race(
        &mut race,
        &mut ManualScheduler::new(60.0),
        &mut SnapshotLog::default(),
        Some(&rx),
    )
    .unwrap();
    assert!(matches!(outcome, RunOutcome::Finished(_)));
    assert_eq!(results.lock().unwrap().len(), 1);
}

struct ResetAfter {
    racetime: f64,
    tx: flume::Sender<RaceCommand>,
    sent: bool,
}

impl FrameRenderer for ResetAfter {
    fn render(&mut self, snapshot: &RaceSnapshot) -> anyhow::Result<()> {
        if !self.sent && snapshot.racetime >= self.racetime {
            self.tx.send(RaceCommand::Reset)?;
            self.sent = true;
        }
        Ok(())
    }
}

#[test]
fn test_sample_parameter_files() {
    let races_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("input")
        .join("parameters")
        .join("races");

    let sim_pars = read_sim_pars(&races_dir.join("electric_vs_hypercar.json")).unwrap();
    let mut race = build_race(&sim_pars).unwrap();
    let outcome = run_race(
        &mut race,
        &mut ManualScheduler::new(60.0),
        &mut SnapshotLog::default(),
        None,
    )
    .unwrap();
    match outcome {
        RunOutcome::Finished(race_result) => {
            assert_eq!(race_result.winner.label(), "Rimac Nevera");
        }
        other => panic!("Race did not finish: {:?}", other),
    }

    let sim_pars = read_sim_pars(&races_dir.join("metric_dead_heat.json")).unwrap();
    assert_eq!(sim_pars.race_pars.units, UnitSystem::Metric);
    let mut race = build_race(&sim_pars).unwrap();
    let outcome = run_race(
        &mut race,
        &mut ManualScheduler::new(60.0),
        &mut SnapshotLog::default(),
        None,
    )
    .unwrap();
    match outcome {
        RunOutcome::Finished(race_result) => {
            assert_eq!(race_result.winner_lane, Lane::A);
            assert_relative_eq!(race_result.margin_distance, 0.0);
        }
        other => panic!("Race did not finish: {:?}", other),
    }
}
