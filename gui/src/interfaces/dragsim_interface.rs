use dragsim::interfaces::gui_interface::{RaceCommand, RaceSnapshot};
use flume::{Receiver, Sender};
use log::warn;

/// DragsimInterface connects the GUI with the simulation thread: snapshots are received, commands
/// are sent.
#[derive(Debug)]
pub struct DragsimInterface {
    pub rx: Receiver<RaceSnapshot>,
    pub tx: Sender<RaceCommand>,
    pub race_state: Option<RaceSnapshot>,
}

impl DragsimInterface {
    pub fn new(rx: Receiver<RaceSnapshot>, tx: Sender<RaceCommand>) -> DragsimInterface {
        DragsimInterface {
            rx,
            tx,
            race_state: None,
        }
    }

    /// update keeps the latest snapshot that was received since the last call. Returns true if a
    /// new snapshot arrived.
    pub fn update(&mut self) -> bool {
        match self.rx.try_iter().last() {
            Some(race_state) => {
                self.race_state = Some(race_state);
                true
            }
            None => false,
        }
    }

    pub fn send_command(&self, command: RaceCommand) {
        if self.tx.send(command).is_err() {
            warn!("Simulation thread is not running, {:?} was dropped", command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragsim::core::race::{Race, RacePars};
    use dragsim::core::vehicle::Vehicle;
    use std::time::Duration;

    #[test]
    fn test_update_keeps_latest_snapshot() {
        let (tx_snapshots, rx_snapshots) = flume::unbounded();
        let (tx_commands, rx_commands) = flume::unbounded();
        let mut dragsim_interface = DragsimInterface::new(rx_snapshots, tx_commands);
        assert!(!dragsim_interface.update());

        let mut race = Race::new(
            &RacePars::default(),
            Vehicle::new("A", 200.0, 2.0, 9.0).unwrap(),
            Vehicle::new("B", 180.0, 3.0, 10.0).unwrap(),
        )
        .unwrap();
        tx_snapshots.send(race.snapshot()).unwrap();
        race.tick_countdown(Duration::from_secs(1));
        tx_snapshots.send(race.snapshot()).unwrap();

        assert!(dragsim_interface.update());
        assert_eq!(dragsim_interface.race_state.as_ref().unwrap().countdown, Some(2));

        dragsim_interface.send_command(RaceCommand::Reset);
        assert_eq!(rx_commands.try_recv().unwrap(), RaceCommand::Reset);
    }
}
