use crate::core::error::RaceError;
use crate::core::kinematics::{calc_position, calc_speed};
use crate::core::scheduler::CancelToken;
use crate::core::vehicle::{UnitSystem, Vehicle};
use crate::interfaces::gui_interface::{LaneState, RaceSnapshot, RgbColor, LANE_COLORS};
use crate::post::race_result::RaceResult;
use helpers::general::argmax;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Value the countdown starts from.
pub const COUNTDOWN_START: u32 = 3;

/// Duration of one countdown step.
pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

/// * `distance` - (Optional) Race distance, defaults to a quarter mile in the chosen unit system
/// * `units` - Unit system of the distance and the vehicle figures
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct RacePars {
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub units: UnitSystem,
}

impl RacePars {
    pub fn get_distance(&self) -> f64 {
        self.distance.unwrap_or_else(|| self.units.quarter_mile())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Lane {
    A,
    B,
}

impl Lane {
    pub const ALL: [Lane; 2] = [Lane::A, Lane::B];

    pub fn idx(&self) -> usize {
        match self {
            Lane::A => 0,
            Lane::B => 1,
        }
    }

    pub fn from_idx(idx: usize) -> Lane {
        match idx {
            0 => Lane::A,
            1 => Lane::B,
            _ => panic!("A drag race has two lanes, but lane index {} was requested!", idx),
        }
    }

    pub fn other(&self) -> Lane {
        match self {
            Lane::A => Lane::B,
            Lane::B => Lane::A,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Lane::A => write!(f, "A (blue)"),
            Lane::B => write!(f, "B (red)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceStatus {
    Countdown,
    Running,
    Finished,
}

impl Default for RaceStatus {
    fn default() -> Self {
        RaceStatus::Countdown
    }
}

/// Result of a countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// The race was not in countdown, nothing changed.
    Ignored,
    /// The countdown was decremented to the contained value.
    Count(u32),
    /// The countdown reached zero and the race was started.
    Go,
}

/// Result of an animation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The race was not running, nothing changed.
    Ignored,
    Running,
    /// The finish line was crossed in this tick.
    Finished,
}

pub type ResultCallback = Box<dyn FnMut(&RaceResult) + Send>;

/// Race owns the state of a single drag race between two vehicles and implements its life cycle
/// countdown -> running -> finished. State changes happen through `tick_countdown`, `tick` and
/// `reset` only. The race does not know a clock: every tick receives the current clock reading.
pub struct Race {
    pub distance: f64,
    pub units: UnitSystem,
    vehicles: [Vehicle; 2],
    colors: [RgbColor; 2],
    status: RaceStatus,
    countdown: u32,
    t_start: Option<Duration>,
    cur_racetime: f64,
    positions: [f64; 2],
    speeds: [f64; 2],
    winner: Option<Lane>,
    race_result: Option<RaceResult>,
    result_emitted: bool,
    on_result: Option<ResultCallback>,
    ticker: Option<CancelToken>,
}

impl fmt::Debug for Race {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Race")
            .field("distance", &self.distance)
            .field("units", &self.units)
            .field("vehicles", &self.vehicles)
            .field("status", &self.status)
            .field("countdown", &self.countdown)
            .field("cur_racetime", &self.cur_racetime)
            .field("positions", &self.positions)
            .field("speeds", &self.speeds)
            .field("winner", &self.winner)
            .finish()
    }
}

impl Race {
    /// new creates a race in countdown state. Vehicle a starts in lane A, vehicle b in lane B.
    pub fn new(
        race_pars: &RacePars,
        vehicle_a: Vehicle,
        vehicle_b: Vehicle,
    ) -> Result<Race, RaceError> {
        let distance = race_pars.get_distance();

        if !distance.is_finite() || distance <= 0.0 {
            return Err(RaceError::InvalidDistance(distance));
        }

        Ok(Race {
            distance,
            units: race_pars.units,
            vehicles: [vehicle_a, vehicle_b],
            colors: LANE_COLORS,
            status: RaceStatus::Countdown,
            countdown: COUNTDOWN_START,
            t_start: None,
            cur_racetime: 0.0,
            positions: [0.0; 2],
            speeds: [0.0; 2],
            winner: None,
            race_result: None,
            result_emitted: false,
            on_result: None,
            ticker: None,
        })
    }

    /// with_colors replaces the default lane colors (blue, red).
    pub fn with_colors(mut self, colors: [RgbColor; 2]) -> Race {
        self.colors = colors;
        self
    }

    /// set_result_callback registers a callback that is called exactly once per race instance when
    /// the finish line is crossed.
    pub fn set_result_callback(&mut self, on_result: ResultCallback) {
        self.on_result = Some(on_result);
    }

    /// attach_ticker stores the cancellation handle of the scheduler that currently drives the
    /// race, such that a reset can stop it.
    pub fn attach_ticker(&mut self, ticker: CancelToken) {
        self.ticker = Some(ticker);
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHODS --------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// tick_countdown performs one countdown step. When the countdown reaches zero, the race
    /// switches to running and `now` becomes its start time.
    pub fn tick_countdown(&mut self, now: Duration) -> CountdownEvent {
        if !matches!(self.status, RaceStatus::Countdown) || self.countdown == 0 {
            debug!("Countdown tick ignored in state {:?}", self.status);
            return CountdownEvent::Ignored;
        }

        self.countdown -= 1;

        if self.countdown > 0 {
            info!("{}...", self.countdown);
            return CountdownEvent::Count(self.countdown);
        }

        info!("GO!");
        self.status = RaceStatus::Running;
        self.t_start = Some(now);
        CountdownEvent::Go
    }

    /// tick advances a running race to the clock reading `now`. If a vehicle reached the race
    /// distance, the race is finished and the result is emitted.
    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        let t_start = match (self.status, self.t_start) {
            (RaceStatus::Running, Some(t_start)) => t_start,
            _ => {
                debug!("Animation tick ignored in state {:?}", self.status);
                return TickOutcome::Ignored;
            }
        };

        // the elapsed time must not decrease, even if the clock does
        let elapsed = now.checked_sub(t_start).unwrap_or_default().as_secs_f64();
        self.cur_racetime = self.cur_racetime.max(elapsed);

        for lane in Lane::ALL.iter() {
            let vehicle = &self.vehicles[lane.idx()];
            self.positions[lane.idx()] =
                calc_position(vehicle, self.cur_racetime, self.distance, self.units);
            self.speeds[lane.idx()] = calc_speed(vehicle, self.cur_racetime);
        }

        if self.positions.iter().any(|&s| s >= self.distance) {
            self.finish();
            return TickOutcome::Finished;
        }

        TickOutcome::Running
    }

    /// reset returns the race to a fresh countdown from any state and cancels the scheduler that
    /// drove it.
    pub fn reset(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }

        self.status = RaceStatus::Countdown;
        self.countdown = COUNTDOWN_START;
        self.t_start = None;
        self.cur_racetime = 0.0;
        self.positions = [0.0; 2];
        self.speeds = [0.0; 2];
        self.winner = None;
        self.race_result = None;
        self.result_emitted = false;
        info!("Race reset, countdown restarts from {}", COUNTDOWN_START);
    }

    fn finish(&mut self) {
        // equal positions resolve to lane A
        let winner = Lane::from_idx(argmax(&self.positions));
        let loser = winner.other();

        self.status = RaceStatus::Finished;
        self.winner = Some(winner);

        let race_result = RaceResult {
            winner_lane: winner,
            winner: self.vehicles[winner.idx()].to_owned(),
            loser: self.vehicles[loser.idx()].to_owned(),
            race_time: self.cur_racetime,
            distance: self.distance,
            units: self.units,
            positions: self.positions,
            speeds: self.speeds,
            margin_distance: self.positions[winner.idx()] - self.positions[loser.idx()],
        };

        // a finished race emits its result only once
        if self.result_emitted {
            return;
        }
        self.result_emitted = true;

        info!(
            "Race finished: {} wins in lane {} after {:.3}s",
            race_result.winner.label(),
            winner,
            race_result.race_time
        );
        if let Some(on_result) = self.on_result.as_mut() {
            on_result(&race_result);
        }
        self.race_result = Some(race_result);
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn get_status(&self) -> RaceStatus {
        self.status
    }

    pub fn get_countdown(&self) -> u32 {
        self.countdown
    }

    pub fn get_racetime(&self) -> f64 {
        self.cur_racetime
    }

    pub fn get_positions(&self) -> [f64; 2] {
        self.positions
    }

    pub fn get_speeds(&self) -> [f64; 2] {
        self.speeds
    }

    pub fn get_winner(&self) -> Option<Lane> {
        self.winner
    }

    pub fn get_vehicle(&self, lane: Lane) -> &Vehicle {
        &self.vehicles[lane.idx()]
    }

    pub fn get_race_result(&self) -> Option<&RaceResult> {
        self.race_result.as_ref()
    }

    /// snapshot captures the current state for the renderers.
    pub fn snapshot(&self) -> RaceSnapshot {
        let lanes = [self.lane_state(Lane::A), self.lane_state(Lane::B)];

        RaceSnapshot {
            status: self.status,
            countdown: if matches!(self.status, RaceStatus::Countdown) {
                Some(self.countdown)
            } else {
                None
            },
            racetime: self.cur_racetime,
            distance: self.distance,
            units: self.units,
            lanes,
            winner: self.winner,
            final_result: self.race_result.to_owned(),
        }
    }

    fn lane_state(&self, lane: Lane) -> LaneState {
        LaneState {
            label: self.vehicles[lane.idx()].label().to_owned(),
            color: self.colors[lane.idx()],
            position: self.positions[lane.idx()],
            speed: self.speeds[lane.idx()],
        }
    }
}
