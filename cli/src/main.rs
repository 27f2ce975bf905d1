use clap::Parser;
use dragsim::core::handle_race::{handle_session, run_race, RunOutcome};
use dragsim::core::outcome::predict_outcome;
use dragsim::core::race::Lane;
use dragsim::core::scheduler::{ManualScheduler, RealtimeScheduler};
use dragsim::interfaces::gui_interface::MAX_GUI_UPDATE_FREQUENCY;
use dragsim::interfaces::renderer::{ChannelRenderer, DragStripScene, LogRenderer};
use dragsim::post::race_result::{format_distance, print_prediction, RaceResult};
use dragsim::pre::read_sim_pars::{build_race, default_sim_pars, read_sim_pars};
use dragsim::pre::sim_opts::SimOpts;
use gui::core::gui::DragRaceApp;
use gui::core::png_export::export_frame_png;
use log::{info, warn};
use std::thread;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();
    sim_opts.check()?;

    // set up logging, RUST_LOG overrides the level
    let log_level = if sim_opts.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // get simulation parameters
    let sim_pars = if let Some(parfile_path) = &sim_opts.parfile_path {
        info!("Reading race parameters from {}", parfile_path.display());
        read_sim_pars(parfile_path)?
    } else {
        info!("No parameter file provided, using the built-in race");
        default_sim_pars()
    };

    let mut race = build_race(&sim_pars)?;

    // print race details
    info!(
        "Racing {} (lane {}) against {} (lane {}) over {}",
        race.get_vehicle(Lane::A).label(),
        Lane::A,
        race.get_vehicle(Lane::B).label(),
        Lane::B,
        format_distance(race.distance, race.units)
    );

    // EXECUTION -----------------------------------------------------------------------------------
    if sim_opts.instant {
        // INSTANT CASE - predict the outcome without animating the race
        let prediction = predict_outcome(
            race.get_vehicle(Lane::A),
            race.get_vehicle(Lane::B),
            race.distance,
            race.units,
        );
        print_prediction(&prediction, race.distance, race.units);
    } else if !sim_opts.gui {
        // NON-GUI CASE - the race is run on a virtual clock without visualization
        info!("Running race without GUI...");
        let t_start = Instant::now();

        let mut scheduler = ManualScheduler::new(sim_opts.frame_rate);
        let outcome = run_race(&mut race, &mut scheduler, &mut LogRenderer::new(), None)?;

        info!("Execution time: {}ms", t_start.elapsed().as_millis());

        let race_result = match outcome {
            RunOutcome::Finished(race_result) => race_result,
            other => anyhow::bail!("Race did not finish: {:?}", other),
        };
        race_result.print_result();

        if let Some(result_path) = sim_opts.result_path.as_deref() {
            let path = race_result.write_result_to_file(Some(result_path))?;
            info!("Race result saved to {}", path);
        }

        // save the final frame as PNG
        if let Some(export_png) = sim_opts.export_png.as_deref() {
            if let Err(err) =
                export_frame_png(&DragStripScene::default(), &race.snapshot(), Some(export_png))
            {
                warn!("Could not export final frame: {:#}", err);
            }
        }
    } else {
        // GUI CASE - the race is run in real-time with visualization
        info!("Starting GUI race...");

        // create channels for the communication between GUI and simulation
        let (tx_snapshots, rx_snapshots) = flume::unbounded();
        let (tx_commands, rx_commands) = flume::unbounded();

        // save every result if requested
        if let Some(result_path) = sim_opts.result_path.to_owned() {
            race.set_result_callback(Box::new(move |race_result: &RaceResult| {
                match race_result.write_result_to_file(Some(result_path.as_path())) {
                    Ok(path) => info!("Race result saved to {}", path),
                    Err(err) => warn!("Could not save race result: {:#}", err),
                }
            }));
        }

        // run the race session in a separate thread
        let frame_rate = sim_opts.frame_rate;
        let realtime_factor = sim_opts.realtime_factor;

        let _ = thread::spawn(move || {
            let mut renderer = ChannelRenderer::new(tx_snapshots, MAX_GUI_UPDATE_FREQUENCY);
            let session = handle_session(
                &mut race,
                || RealtimeScheduler::new(frame_rate, realtime_factor),
                &mut renderer,
                &rx_commands,
            );
            if let Err(err) = session {
                warn!("Race session stopped: {:#}", err);
            }
        });

        // run GUI (must be in the main thread)
        let gui = DragRaceApp::new(rx_snapshots, tx_commands, sim_opts.export_png.to_owned());
        let native_options = eframe::NativeOptions {
            initial_window_size: Some(eframe::egui::Vec2::new(1200.0, 460.0)),
            ..eframe::NativeOptions::default()
        };
        eframe::run_native(Box::new(gui), native_options);
    }

    Ok(())
}
