//! Built-in placeholder engine
//!
//! Renders a deterministic animated pattern instead of emulating a machine,
//! which is enough to exercise the whole pump, rewind, and persistence path
//! without a real core.

use crate::EmulationEngine;
use crate::cartridge::CartridgeInfo;
use fc_core::error::EngineError;
use fc_input::{Button, PadButtons};
use fc_video::{FRAME_HEIGHT, FRAME_WIDTH, FrameBuffer};
use std::collections::VecDeque;
use std::path::PathBuf;
use tracing::debug;

/// File name the engine state is persisted under
const STATE_FILE: &str = "null-engine.state";

/// Rewind steps retained unless configured otherwise
const DEFAULT_REWIND_CAPACITY: usize = 600;

/// Placeholder engine with a deterministic pattern renderer
///
/// The frame counter is the entire machine state, so rewind and
/// persistence reduce to bookkeeping on one integer.
pub struct NullEngine {
    state: u64,
    history: VecDeque<u64>,
    rewind_capacity: usize,
    save_dir: Option<PathBuf>,
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl NullEngine {
    pub fn new() -> Self {
        Self {
            state: 0,
            history: VecDeque::new(),
            rewind_capacity: DEFAULT_REWIND_CAPACITY,
            save_dir: None,
        }
    }

    /// Number of rewind steps to retain
    pub fn with_rewind_capacity(mut self, capacity: usize) -> Self {
        self.rewind_capacity = capacity;
        self
    }

    /// Directory the engine state is persisted under
    pub fn with_save_dir(mut self, dir: PathBuf) -> Self {
        self.save_dir = Some(dir);
        self
    }

    fn render(&self, frame: &mut FrameBuffer, buttons: PadButtons) {
        let t = self.state;

        for y in 0..FRAME_HEIGHT {
            for x in 0..FRAME_WIDTH {
                let r = ((x as u64 + t) & 0xFF) as u8;
                let g = ((y as u64 + t / 2) & 0xFF) as u8;
                let b = ((t * 3) & 0xFF) as u8;
                frame.put_pixel(x, y, [r, g, b, 0xFF]);
            }
        }

        // moving stripe makes single-frame steps visible
        let stripe = (t as usize * 2) % FRAME_WIDTH;
        for y in 0..FRAME_HEIGHT {
            frame.put_pixel(stripe, y, [0xFF; 4]);
        }

        // pressed buttons light up blocks along the bottom edge
        for button in Button::ALL {
            let color = if buttons.contains(button.mask()) {
                [0xFF; 4]
            } else {
                [0x20, 0x20, 0x20, 0xFF]
            };
            let x0 = 8 + button.id() as usize * 30;
            for y in 220..232 {
                for x in x0..x0 + 24 {
                    frame.put_pixel(x, y, color);
                }
            }
        }
    }
}

impl EmulationEngine for NullEngine {
    fn init(&mut self) -> Result<(), EngineError> {
        debug!("null engine initialized");
        Ok(())
    }

    fn load_cartridge(&mut self, image: &[u8]) -> Result<CartridgeInfo, EngineError> {
        let info = CartridgeInfo::parse(image)?;

        self.state = 0;
        self.history.clear();
        debug!(
            mapper = info.mapper,
            prg_pages = info.prg_pages,
            chr_pages = info.chr_pages,
            "cartridge accepted"
        );
        Ok(info)
    }

    fn advance_frame(
        &mut self,
        frame: &mut FrameBuffer,
        buttons: PadButtons,
        rewind: bool,
    ) -> Result<(), EngineError> {
        if rewind {
            // step back one frame; with no history left, repaint in place
            if let Some(previous) = self.history.pop_back() {
                self.state = previous;
            }
        } else {
            self.history.push_back(self.state);
            if self.history.len() > self.rewind_capacity {
                self.history.pop_front();
            }
            self.state += 1;
        }

        self.render(frame, buttons);
        Ok(())
    }

    fn request_persistence(&mut self, save: bool) -> Result<(), EngineError> {
        let dir = self
            .save_dir
            .as_ref()
            .ok_or_else(|| EngineError::Persistence("no save directory configured".to_string()))?;
        let path = dir.join(STATE_FILE);

        if save {
            std::fs::create_dir_all(dir).map_err(|e| EngineError::Persistence(e.to_string()))?;
            std::fs::write(&path, self.state.to_le_bytes())
                .map_err(|e| EngineError::Persistence(e.to_string()))?;
            debug!(path = %path.display(), state = self.state, "state saved");
        } else {
            let bytes =
                std::fs::read(&path).map_err(|e| EngineError::Persistence(e.to_string()))?;
            let raw: [u8; 8] = bytes
                .try_into()
                .map_err(|_| EngineError::Persistence("state file is corrupt".to_string()))?;
            self.state = u64::from_le_bytes(raw);
            // the restored state has no past to rewind into
            self.history.clear();
            debug!(path = %path.display(), state = self.state, "state restored");
        }
        Ok(())
    }
}
