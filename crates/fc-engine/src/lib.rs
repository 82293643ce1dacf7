//! Engine abstraction for ferricom
//!
//! [`EmulationEngine`] is the seam between the frame pump and an actual
//! emulation core. The built-in [`NullEngine`] stands in for a real core
//! and renders a deterministic animated pattern.

pub mod cartridge;
pub mod null;

pub use cartridge::{CartridgeInfo, Mirroring};
pub use null::NullEngine;

use fc_core::error::EngineError;
use fc_input::PadButtons;
use fc_video::FrameBuffer;

/// Contract between the frame pump and an emulation core
///
/// Methods are only ever called with the engine lock held, from the pump
/// thread or a control thread, never concurrently.
pub trait EmulationEngine: Send {
    /// One-time initialization, called before any other method
    fn init(&mut self) -> Result<(), EngineError>;

    /// Parse and load a cartridge image
    ///
    /// On error the engine must keep any previously loaded cartridge
    /// playable.
    fn load_cartridge(&mut self, image: &[u8]) -> Result<CartridgeInfo, EngineError>;

    /// Run the machine for exactly one frame and render it into `frame`
    ///
    /// `rewind` asks the engine to step one frame backwards instead; with
    /// no history left it repaints the oldest frame it still has. An error
    /// from this method is fatal to the session.
    fn advance_frame(
        &mut self,
        frame: &mut FrameBuffer,
        buttons: PadButtons,
        rewind: bool,
    ) -> Result<(), EngineError>;

    /// Persist (`save == true`) or restore the engine state synchronously
    fn request_persistence(&mut self, save: bool) -> Result<(), EngineError>;
}
