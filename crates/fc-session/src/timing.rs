//! Frame pacing for the pump loop

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

/// Interval between frames at the standard 60 FPS rate
pub const TARGET_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Poll interval of the pump while no cartridge is loaded
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Recent frames kept for the rolling average
const FRAME_WINDOW: usize = 120;

/// Per-frame deadline bookkeeping
///
/// The pump marks the start of each tick, does its work, then asks how long
/// to sleep. A tick that ran past its deadline gets a zero sleep and is
/// counted as an overrun; it is never an error.
pub struct FrameTimer {
    target: Duration,
    frame_start: Instant,
    frame_times: VecDeque<Duration>,
    total_frames: u64,
    overruns: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::with_target(TARGET_FRAME_INTERVAL)
    }

    /// Timer with a frame interval derived from a frames-per-second limit
    pub fn with_frame_limit(limit: u32) -> Self {
        Self::with_target(Duration::from_millis(1000 / u64::from(limit.max(1))))
    }

    fn with_target(target: Duration) -> Self {
        Self {
            target,
            frame_start: Instant::now(),
            frame_times: VecDeque::with_capacity(FRAME_WINDOW),
            total_frames: 0,
            overruns: 0,
        }
    }

    /// Mark the start of a tick
    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Close out a tick and return how long to sleep before the next one
    ///
    /// Turbo keeps the bookkeeping but skips the sleep entirely.
    pub fn pace(&mut self, turbo: bool) -> Duration {
        let elapsed = self.frame_start.elapsed();

        if self.frame_times.len() == FRAME_WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(elapsed);
        self.total_frames += 1;

        if elapsed > self.target {
            self.overruns += 1;
            debug!(
                elapsed_ms = elapsed.as_millis() as u64,
                target_ms = self.target.as_millis() as u64,
                "frame overran its deadline"
            );
        }

        if turbo {
            Duration::ZERO
        } else {
            self.target.saturating_sub(elapsed)
        }
    }

    /// Configured frame interval
    pub fn target(&self) -> Duration {
        self.target
    }

    /// Rolling average over the recent frame window
    pub fn average_frame_time(&self) -> Option<Duration> {
        if self.frame_times.is_empty() {
            return None;
        }
        let sum: Duration = self.frame_times.iter().sum();
        Some(sum / self.frame_times.len() as u32)
    }

    /// Frames completed since the timer was created
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Frames that ran past their deadline
    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_target_from_frame_limit() {
        assert_eq!(
            FrameTimer::with_frame_limit(60).target(),
            Duration::from_millis(16)
        );
        assert_eq!(
            FrameTimer::with_frame_limit(30).target(),
            Duration::from_millis(33)
        );
        // a zero limit clamps instead of dividing by zero
        assert_eq!(
            FrameTimer::with_frame_limit(0).target(),
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn test_pace_never_exceeds_target() {
        let mut timer = FrameTimer::new();
        timer.begin_frame();
        let sleep = timer.pace(false);
        assert!(sleep <= timer.target());
    }

    #[test]
    fn test_pace_sleeps_remainder_of_target() {
        // 200 ms target with ~50 ms of work: the sleep is the leftover,
        // not the full interval. Wide bounds absorb scheduler slop.
        let mut timer = FrameTimer::with_frame_limit(5);
        timer.begin_frame();
        thread::sleep(Duration::from_millis(50));
        let sleep = timer.pace(false);

        assert!(sleep < Duration::from_millis(151), "slept {sleep:?}");
        assert!(sleep > Duration::from_millis(100), "slept {sleep:?}");
        assert_eq!(timer.overruns(), 0);
        assert_eq!(timer.total_frames(), 1);
    }

    #[test]
    fn test_overrun_returns_zero_sleep() {
        let mut timer = FrameTimer::with_frame_limit(1000);
        timer.begin_frame();
        thread::sleep(Duration::from_millis(5));
        let sleep = timer.pace(false);

        assert_eq!(sleep, Duration::ZERO);
        assert_eq!(timer.overruns(), 1);
        assert_eq!(timer.total_frames(), 1);
    }

    #[test]
    fn test_turbo_skips_sleep() {
        let mut timer = FrameTimer::with_frame_limit(1);
        timer.begin_frame();
        assert_eq!(timer.pace(true), Duration::ZERO);
        // a frame well under its deadline is not an overrun even in turbo
        assert_eq!(timer.overruns(), 0);
    }

    #[test]
    fn test_frame_accounting() {
        let mut timer = FrameTimer::new();
        assert!(timer.average_frame_time().is_none());

        for _ in 0..3 {
            timer.begin_frame();
            timer.pace(false);
        }
        assert_eq!(timer.total_frames(), 3);
        assert!(timer.average_frame_time().is_some());
    }
}
