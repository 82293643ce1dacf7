//! Session control and the frame pump
//!
//! A [`Session`] owns the engine and the shared control state; the
//! [`FramePump`] drives it from a dedicated thread at a fixed cadence.

pub mod pump;
pub mod session;
pub mod timing;

pub use pump::{FramePump, FramePumpHandle};
pub use session::{PumpState, Session};
pub use timing::{FrameTimer, IDLE_POLL_INTERVAL, TARGET_FRAME_INTERVAL};
