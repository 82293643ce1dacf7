//! The frame pump thread
//!
//! One dedicated thread drives the engine: poll for a cartridge while
//! idle, then tick at the configured cadence until shutdown or a fatal
//! engine error. Each tick samples the control flags and pad once, runs
//! the engine synchronously, publishes the frame, then sleeps out the
//! remainder of its deadline.

use crate::session::{PumpState, Session};
use crate::timing::{FrameTimer, IDLE_POLL_INTERVAL};
use fc_core::error::Result;
use fc_video::FrameProducer;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// Handle to a running pump thread
pub struct FramePumpHandle {
    thread: JoinHandle<()>,
}

impl FramePumpHandle {
    /// Wait for the pump thread to exit
    pub fn join(self) {
        if self.thread.join().is_err() {
            error!("frame pump thread panicked");
        }
    }
}

/// The frame pump
pub struct FramePump {
    session: Session,
    producer: FrameProducer,
    timer: FrameTimer,
}

impl FramePump {
    pub fn new(session: Session, producer: FrameProducer, timer: FrameTimer) -> Self {
        Self {
            session,
            producer,
            timer,
        }
    }

    /// Spawn the pump on its own named thread
    pub fn spawn(self) -> Result<FramePumpHandle> {
        let thread = thread::Builder::new()
            .name("frame-pump".to_string())
            .spawn(move || self.run())?;
        Ok(FramePumpHandle { thread })
    }

    fn run(mut self) {
        info!("frame pump started");

        while self.session.is_pump_active() {
            if !self.session.cartridge_loaded() {
                self.session.set_pump_state(PumpState::Idle);
                thread::sleep(IDLE_POLL_INTERVAL);
                continue;
            }

            self.session.set_pump_state(PumpState::Active);
            if let Err(error) = self.tick() {
                error!(%error, "fatal frame error, stopping pump");
                self.session.record_fatal_error(error);
                break;
            }
        }

        self.session.set_pump_state(PumpState::Stopped);
        info!(
            frames = self.timer.total_frames(),
            overruns = self.timer.overruns(),
            "frame pump stopped"
        );
    }

    /// One paced tick: sample controls, advance the engine, publish, sleep
    fn tick(&mut self) -> Result<()> {
        self.timer.begin_frame();

        let rewind = self.session.rewind_engaged();
        let turbo = self.session.turbo_engaged();
        let buttons = self.session.pad().snapshot();

        let mut frame = self.producer.acquire();
        if let Err(error) = self.session.advance_engine_frame(&mut frame, buttons, rewind) {
            self.producer.release(frame);
            return Err(error);
        }
        self.producer.publish(frame);
        self.session.record_frame_advanced();

        let sleep = self.timer.pace(turbo);
        if !sleep.is_zero() {
            thread::sleep(sleep);
        }
        Ok(())
    }
}
