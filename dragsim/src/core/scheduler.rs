//! Scheduling of race ticks. A scheduler repeatedly calls a tick callback once per display frame
//! and runs one-off callbacks after a fixed delay (the countdown steps). All callbacks receive the
//! clock reading at which they fire, measured from the origin of the scheduler.
//!
//! Two implementations exist: `RealtimeScheduler` sleeps on the wall clock, `ManualScheduler`
//! advances a virtual clock and is therefore deterministic.

use log::{debug, warn};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

pub const DEFAULT_FRAME_RATE: f64 = 60.0;
pub const MIN_FRAME_RATE: f64 = 1.0;
pub const MAX_FRAME_RATE: f64 = 1000.0;
pub const MIN_REALTIME_FACTOR: f64 = 0.01;
pub const MAX_REALTIME_FACTOR: f64 = 100.0;

/// check_frame_rate returns an error if the frame rate (in Hz) is outside the supported range.
pub fn check_frame_rate(frame_rate: f64) -> anyhow::Result<()> {
    if !(MIN_FRAME_RATE..=MAX_FRAME_RATE).contains(&frame_rate) {
        anyhow::bail!(
            "Frame rate must be within {} and {} Hz, but is {}!",
            MIN_FRAME_RATE,
            MAX_FRAME_RATE,
            frame_rate
        );
    }
    Ok(())
}

/// check_realtime_factor returns an error if the real-time factor is outside the supported range.
pub fn check_realtime_factor(realtime_factor: f64) -> anyhow::Result<()> {
    if !(MIN_REALTIME_FACTOR..=MAX_REALTIME_FACTOR).contains(&realtime_factor) {
        anyhow::bail!(
            "Real-time factor must be within {} and {}, but is {}!",
            MIN_REALTIME_FACTOR,
            MAX_REALTIME_FACTOR,
            realtime_factor
        );
    }
    Ok(())
}

/// Unsupported frame rates fall back to the default, too large or too small values would overflow
/// the frame period.
fn sanitize_frame_rate(frame_rate: f64) -> f64 {
    if check_frame_rate(frame_rate).is_ok() {
        frame_rate
    } else {
        warn!("Unsupported frame rate {}, using {} Hz", frame_rate, DEFAULT_FRAME_RATE);
        DEFAULT_FRAME_RATE
    }
}

/// CancelToken is a shared cancellation flag. Once cancelled, a token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub trait Scheduler {
    /// now returns the current clock reading.
    fn now(&self) -> Duration;

    /// start calls `tick` once per frame until it returns `ControlFlow::Break` or the scheduler is
    /// cancelled. A tick is never called after cancellation, even if its frame was already due.
    fn start(&mut self, tick: &mut dyn FnMut(Duration) -> ControlFlow<()>);

    /// delay calls `f` once after the given delay unless the scheduler is cancelled before. The
    /// return value tells whether `f` was called.
    fn delay(&mut self, delay: Duration, f: &mut dyn FnMut(Duration)) -> bool;

    /// cancel_token returns a handle that cancels this scheduler.
    fn cancel_token(&self) -> CancelToken;

    fn cancel(&self) {
        self.cancel_token().cancel()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_token().is_cancelled()
    }
}

/// RealtimeScheduler runs the callbacks against the wall clock. The real-time factor scales the
/// clock, e.g. a factor of 0.5 shows the race in slow motion.
#[derive(Debug)]
pub struct RealtimeScheduler {
    origin: Instant,
    frame_period: Duration,
    realtime_factor: f64,
    token: CancelToken,
}

impl RealtimeScheduler {
    pub fn new(frame_rate: f64, realtime_factor: f64) -> RealtimeScheduler {
        let frame_rate = sanitize_frame_rate(frame_rate);
        let realtime_factor = if check_realtime_factor(realtime_factor).is_ok() {
            realtime_factor
        } else {
            warn!("Unsupported real-time factor {}, using 1.0", realtime_factor);
            1.0
        };

        RealtimeScheduler {
            origin: Instant::now(),
            frame_period: Duration::from_secs_f64(1.0 / frame_rate),
            realtime_factor,
            token: CancelToken::new(),
        }
    }

    /// Sleeps in slices of at most one frame such that a cancellation is noticed quickly.
    fn sleep_until(&self, deadline: Instant) {
        loop {
            let now = Instant::now();
            if now >= deadline || self.token.is_cancelled() {
                return;
            }
            sleep((deadline - now).min(self.frame_period));
        }
    }
}

impl Scheduler for RealtimeScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed().mul_f64(self.realtime_factor)
    }

    fn start(&mut self, tick: &mut dyn FnMut(Duration) -> ControlFlow<()>) {
        let mut t_next_frame = Instant::now();

        while !self.token.is_cancelled() {
            if tick(self.now()).is_break() {
                return;
            }

            t_next_frame += self.frame_period;
            let now = Instant::now();

            if t_next_frame > now {
                self.sleep_until(t_next_frame);
            } else {
                warn!("Could not keep up with real-time!");
                t_next_frame = now;
            }
        }
        debug!("Frame loop cancelled");
    }

    fn delay(&mut self, delay: Duration, f: &mut dyn FnMut(Duration)) -> bool {
        let deadline = Instant::now() + delay.div_f64(self.realtime_factor);
        self.sleep_until(deadline);

        if self.token.is_cancelled() {
            return false;
        }
        f(self.now());
        true
    }

    fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }
}

/// ManualScheduler advances a virtual clock by exactly one frame period per frame and by exactly
/// the requested delay per delayed callback. The frame limit bounds the number of frames a single
/// `start` call may run.
#[derive(Debug)]
pub struct ManualScheduler {
    clock: Duration,
    frame_period: Duration,
    frame_limit: u64,
    frames: u64,
    token: CancelToken,
}

impl ManualScheduler {
    pub fn new(frame_rate: f64) -> ManualScheduler {
        let frame_rate = sanitize_frame_rate(frame_rate);

        ManualScheduler {
            clock: Duration::from_secs(0),
            frame_period: Duration::from_secs_f64(1.0 / frame_rate),
            frame_limit: 1_000_000,
            frames: 0,
            token: CancelToken::new(),
        }
    }

    pub fn with_frame_limit(mut self, frame_limit: u64) -> ManualScheduler {
        self.frame_limit = frame_limit;
        self
    }

    /// Number of frames the scheduler has delivered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn frame_period(&self) -> Duration {
        self.frame_period
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.clock
    }

    fn start(&mut self, tick: &mut dyn FnMut(Duration) -> ControlFlow<()>) {
        let mut frames_this_run = 0;

        while !self.token.is_cancelled() {
            if frames_this_run >= self.frame_limit {
                warn!("Frame limit of {} frames reached, stopping", self.frame_limit);
                return;
            }

            self.clock += self.frame_period;
            self.frames += 1;
            frames_this_run += 1;

            if tick(self.clock).is_break() {
                return;
            }
        }
    }

    fn delay(&mut self, delay: Duration, f: &mut dyn FnMut(Duration)) -> bool {
        if self.token.is_cancelled() {
            return false;
        }

        self.clock += delay;
        f(self.clock);
        true
    }

    fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }
}
