use crate::core::race::{Race, RaceStatus, TickOutcome, COUNTDOWN_STEP};
use crate::core::scheduler::Scheduler;
use crate::interfaces::gui_interface::RaceCommand;
use crate::interfaces::renderer::FrameRenderer;
use crate::post::race_result::RaceResult;
use anyhow::bail;
use flume::{Receiver, TryRecvError};
use log::{debug, info};
use std::ops::ControlFlow;

/// Outcome of a single race instance.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A vehicle crossed the finish line.
    Finished(RaceResult),
    /// The race was reset by a command and is back in countdown.
    Reset,
    /// A quit command was received or the command channel was closed.
    Quit,
    /// The scheduler was cancelled from outside.
    Cancelled,
}

/// poll_command returns the pending command with the highest priority. A closed channel is handled
/// like a quit command.
fn poll_command(commands: Option<&Receiver<RaceCommand>>) -> Option<RaceCommand> {
    let commands = commands?;
    let mut command = None;

    loop {
        match commands.try_recv() {
            Ok(RaceCommand::Quit) | Err(TryRecvError::Disconnected) => {
                return Some(RaceCommand::Quit)
            }
            Ok(RaceCommand::Reset) => command = Some(RaceCommand::Reset),
            Err(TryRecvError::Empty) => return command,
        }
    }
}

/// run_race drives one race instance with the inserted scheduler: the countdown runs on delayed
/// callbacks, the running race on the frame loop. The renderer is called after every processed
/// tick. Commands are polled before every tick.
pub fn run_race<S, R>(
    race: &mut Race,
    scheduler: &mut S,
    renderer: &mut R,
    commands: Option<&Receiver<RaceCommand>>,
) -> anyhow::Result<RunOutcome>
where
    S: Scheduler + ?Sized,
    R: FrameRenderer + ?Sized,
{
    race.attach_ticker(scheduler.cancel_token());
    renderer.render(&race.snapshot())?;

    let mut command = None;

    // countdown
    while matches!(race.get_status(), RaceStatus::Countdown) {
        command = poll_command(commands);
        if command.is_some() {
            break;
        }

        let fired = scheduler.delay(COUNTDOWN_STEP, &mut |now| {
            race.tick_countdown(now);
        });
        if !fired {
            break;
        }
        renderer.render(&race.snapshot())?;
    }

    // frame loop
    if command.is_none() && matches!(race.get_status(), RaceStatus::Running) {
        let mut render_err = None;

        scheduler.start(&mut |now| {
            command = poll_command(commands);
            if command.is_some() {
                return ControlFlow::Break(());
            }

            let outcome = race.tick(now);

            if let Err(err) = renderer.render(&race.snapshot()) {
                render_err = Some(err);
                return ControlFlow::Break(());
            }

            match outcome {
                TickOutcome::Running => ControlFlow::Continue(()),
                TickOutcome::Finished | TickOutcome::Ignored => ControlFlow::Break(()),
            }
        });

        if let Some(err) = render_err {
            return Err(err);
        }
    }

    match command {
        Some(RaceCommand::Reset) => {
            // resetting cancels the scheduler that drove the race
            race.reset();
            renderer.render(&race.snapshot())?;
            return Ok(RunOutcome::Reset);
        }
        Some(RaceCommand::Quit) => {
            info!("Quit received, stopping the race");
            scheduler.cancel();
            return Ok(RunOutcome::Quit);
        }
        None => {}
    }

    if let Some(race_result) = race.get_race_result() {
        return Ok(RunOutcome::Finished(race_result.to_owned()));
    }

    if scheduler.is_cancelled() {
        debug!("Scheduler cancelled before the race was finished");
        return Ok(RunOutcome::Cancelled);
    }

    bail!(
        "Race stopped in state {:?} after {:.3}s without reaching the finish line!",
        race.get_status(),
        race.get_racetime()
    )
}

/// handle_session runs races until a quit command is received or the command channel is closed.
/// Every race instance is driven by a fresh scheduler. After a finish, the session waits for the
/// next command. Returns the result of the last finished race.
pub fn handle_session<S, F, R>(
    race: &mut Race,
    mut make_scheduler: F,
    renderer: &mut R,
    commands: &Receiver<RaceCommand>,
) -> anyhow::Result<Option<RaceResult>>
where
    S: Scheduler,
    F: FnMut() -> S,
    R: FrameRenderer + ?Sized,
{
    let mut last_result = None;

    loop {
        let mut scheduler = make_scheduler();

        match run_race(race, &mut scheduler, renderer, Some(commands))? {
            RunOutcome::Finished(race_result) => {
                race_result.print_result();
                last_result = Some(race_result);

                match commands.recv() {
                    Ok(RaceCommand::Reset) => {
                        race.reset();
                        renderer.render(&race.snapshot())?;
                    }
                    Ok(RaceCommand::Quit) | Err(_) => break,
                }
            }
            RunOutcome::Reset => continue,
            RunOutcome::Quit | RunOutcome::Cancelled => break,
        }
    }

    info!("Race session closed");
    Ok(last_result)
}
