//! Session state and control surface

use fc_core::error::{CartridgeError, EmulatorError, EngineError, Result};
use fc_engine::{CartridgeInfo, EmulationEngine};
use fc_input::{Button, Pad, PadButtons};
use fc_video::FrameBuffer;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use tracing::{info, warn};

/// Lifecycle states of the frame pump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PumpState {
    /// No cartridge loaded, polling for one
    Idle = 0,
    /// Cartridge loaded, ticking frames
    Active = 1,
    /// Pump has exited, on request or after a fatal error
    Stopped = 2,
}

impl PumpState {
    fn from_u8(raw: u8) -> PumpState {
        match raw {
            1 => PumpState::Active,
            2 => PumpState::Stopped,
            _ => PumpState::Idle,
        }
    }
}

struct SessionShared {
    engine: Mutex<Box<dyn EmulationEngine>>,
    pad: Pad,
    cartridge_loaded: AtomicBool,
    pump_active: AtomicBool,
    rewind_engaged: AtomicBool,
    turbo_engaged: AtomicBool,
    pump_state: AtomicU8,
    frames_advanced: AtomicU64,
    last_error: Mutex<Option<EmulatorError>>,
}

/// Cloneable handle to one emulation session
///
/// All state lives behind the handle, so the UI thread and the pump thread
/// each hold a clone. Control methods flip atomic flags the pump samples
/// once per tick; only cartridge loading and persistence take the engine
/// lock directly.
#[derive(Clone)]
pub struct Session {
    shared: Arc<SessionShared>,
}

impl Session {
    /// Create a session around an engine, running its one-time init
    ///
    /// Init failure is fatal: no session exists if the engine cannot come
    /// up.
    pub fn new(mut engine: Box<dyn EmulationEngine>) -> Result<Session> {
        engine.init()?;
        info!("session initialized");

        Ok(Session {
            shared: Arc::new(SessionShared {
                engine: Mutex::new(engine),
                pad: Pad::new(),
                cartridge_loaded: AtomicBool::new(false),
                pump_active: AtomicBool::new(true),
                rewind_engaged: AtomicBool::new(false),
                turbo_engaged: AtomicBool::new(false),
                pump_state: AtomicU8::new(PumpState::Idle as u8),
                frames_advanced: AtomicU64::new(0),
                last_error: Mutex::new(None),
            }),
        })
    }

    /// Load a cartridge image into the engine
    ///
    /// An empty image is rejected before it reaches the engine. On any
    /// failure the previous cartridge, if one was loaded, stays playable;
    /// on success the pump picks the cartridge up on its next poll.
    pub fn load_cartridge(&self, image: &[u8]) -> Result<CartridgeInfo> {
        if image.is_empty() {
            warn!("rejecting empty cartridge image");
            return Err(EngineError::from(CartridgeError::Empty).into());
        }

        let info = self.shared.engine.lock().load_cartridge(image)?;
        self.shared.cartridge_loaded.store(true, Ordering::Release);
        info!(
            mapper = info.mapper,
            prg_pages = info.prg_pages,
            chr_pages = info.chr_pages,
            "cartridge loaded"
        );
        Ok(info)
    }

    /// Whether a cartridge has ever been loaded into this session
    pub fn cartridge_loaded(&self) -> bool {
        self.shared.cartridge_loaded.load(Ordering::Acquire)
    }

    /// Engage or release rewind; the pump samples this once per tick
    pub fn set_rewind(&self, engaged: bool) {
        self.shared.rewind_engaged.store(engaged, Ordering::Release);
    }

    pub fn rewind_engaged(&self) -> bool {
        self.shared.rewind_engaged.load(Ordering::Acquire)
    }

    /// Engage or release turbo; the pump samples this once per tick
    pub fn set_turbo(&self, engaged: bool) {
        self.shared.turbo_engaged.store(engaged, Ordering::Release);
    }

    pub fn turbo_engaged(&self) -> bool {
        self.shared.turbo_engaged.load(Ordering::Acquire)
    }

    /// Controller state shared with the pump
    pub fn pad(&self) -> &Pad {
        &self.shared.pad
    }

    /// Press or release a controller button
    pub fn set_button(&self, button: Button, pressed: bool) {
        self.shared.pad.set_button(button, pressed);
    }

    /// Persist or restore engine state, synchronously
    ///
    /// Takes the engine lock, so the request serializes with the pump's
    /// tick and never observes a half-advanced frame.
    pub fn request_persistence(&self, save: bool) -> Result<()> {
        self.shared.engine.lock().request_persistence(save)?;
        info!(save, "persistence request completed");
        Ok(())
    }

    /// Ask the pump to stop after its current tick
    pub fn shutdown(&self) {
        info!("session shutdown requested");
        self.shared.pump_active.store(false, Ordering::Release);
    }

    /// Whether the pump should keep running
    pub fn is_pump_active(&self) -> bool {
        self.shared.pump_active.load(Ordering::Acquire)
    }

    /// Current pump lifecycle state
    pub fn pump_state(&self) -> PumpState {
        PumpState::from_u8(self.shared.pump_state.load(Ordering::Acquire))
    }

    /// Frames successfully advanced and published so far
    pub fn frames_advanced(&self) -> u64 {
        self.shared.frames_advanced.load(Ordering::Acquire)
    }

    /// Take the fatal error that stopped the pump, if one is pending
    pub fn take_error(&self) -> Option<EmulatorError> {
        self.shared.last_error.lock().take()
    }

    // Pump-side internals

    pub(crate) fn set_pump_state(&self, state: PumpState) {
        self.shared.pump_state.store(state as u8, Ordering::Release);
    }

    pub(crate) fn advance_engine_frame(
        &self,
        frame: &mut FrameBuffer,
        buttons: PadButtons,
        rewind: bool,
    ) -> Result<()> {
        self.shared
            .engine
            .lock()
            .advance_frame(frame, buttons, rewind)?;
        Ok(())
    }

    pub(crate) fn record_frame_advanced(&self) {
        self.shared.frames_advanced.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn record_fatal_error(&self, error: EmulatorError) {
        *self.shared.last_error.lock() = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_engine::Mirroring;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Probe {
        init_calls: AtomicUsize,
        load_calls: AtomicUsize,
        fail_init: AtomicBool,
        fail_next_load: AtomicBool,
    }

    struct TestEngine {
        probe: Arc<Probe>,
    }

    fn stub_info() -> CartridgeInfo {
        CartridgeInfo {
            prg_pages: 2,
            chr_pages: 1,
            mapper: 0,
            mirroring: Mirroring::Horizontal,
            has_trainer: false,
            prg_bytes: 32 * 1024,
            chr_bytes: 8 * 1024,
        }
    }

    impl EmulationEngine for TestEngine {
        fn init(&mut self) -> std::result::Result<(), EngineError> {
            self.probe.init_calls.fetch_add(1, Ordering::SeqCst);
            if self.probe.fail_init.load(Ordering::SeqCst) {
                return Err(EngineError::Init("refused".to_string()));
            }
            Ok(())
        }

        fn load_cartridge(
            &mut self,
            _image: &[u8],
        ) -> std::result::Result<CartridgeInfo, EngineError> {
            self.probe.load_calls.fetch_add(1, Ordering::SeqCst);
            if self.probe.fail_next_load.load(Ordering::SeqCst) {
                return Err(EngineError::Cartridge(CartridgeError::BadMagic([0; 4])));
            }
            Ok(stub_info())
        }

        fn advance_frame(
            &mut self,
            _frame: &mut FrameBuffer,
            _buttons: PadButtons,
            _rewind: bool,
        ) -> std::result::Result<(), EngineError> {
            Ok(())
        }

        fn request_persistence(&mut self, _save: bool) -> std::result::Result<(), EngineError> {
            Ok(())
        }
    }

    fn test_session() -> (Session, Arc<Probe>) {
        let probe = Arc::new(Probe::default());
        let engine = TestEngine {
            probe: Arc::clone(&probe),
        };
        let session = Session::new(Box::new(engine)).unwrap();
        (session, probe)
    }

    #[test]
    fn test_new_runs_init_once() {
        let (session, probe) = test_session();
        assert_eq!(probe.init_calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.pump_state(), PumpState::Idle);
        assert!(session.is_pump_active());
        assert!(!session.cartridge_loaded());
    }

    #[test]
    fn test_new_fails_when_init_fails() {
        let probe = Arc::new(Probe::default());
        probe.fail_init.store(true, Ordering::SeqCst);
        let engine = TestEngine {
            probe: Arc::clone(&probe),
        };

        assert!(Session::new(Box::new(engine)).is_err());
    }

    #[test]
    fn test_empty_image_rejected_before_engine() {
        let (session, probe) = test_session();

        let result = session.load_cartridge(&[]);
        assert!(matches!(
            result,
            Err(EmulatorError::Engine(EngineError::Cartridge(
                CartridgeError::Empty
            )))
        ));
        assert_eq!(probe.load_calls.load(Ordering::SeqCst), 0);
        assert!(!session.cartridge_loaded());
    }

    #[test]
    fn test_load_sets_cartridge_flag() {
        let (session, probe) = test_session();

        let info = session.load_cartridge(&[1, 2, 3]).unwrap();
        assert_eq!(info.prg_pages, 2);
        assert_eq!(probe.load_calls.load(Ordering::SeqCst), 1);
        assert!(session.cartridge_loaded());
    }

    #[test]
    fn test_failed_reload_keeps_cartridge_loaded() {
        let (session, probe) = test_session();
        session.load_cartridge(&[1, 2, 3]).unwrap();

        probe.fail_next_load.store(true, Ordering::SeqCst);
        assert!(session.load_cartridge(&[4, 5, 6]).is_err());
        assert!(session.cartridge_loaded());
    }

    #[test]
    fn test_set_button_reaches_shared_pad() {
        let (session, _probe) = test_session();
        session.set_button(Button::A, true);
        assert!(session.pad().snapshot().contains(PadButtons::A));

        session.set_button(Button::A, false);
        assert!(session.pad().snapshot().is_empty());
    }

    #[test]
    fn test_rewind_and_turbo_flags() {
        let (session, _probe) = test_session();
        assert!(!session.rewind_engaged());
        assert!(!session.turbo_engaged());

        session.set_rewind(true);
        session.set_turbo(true);
        assert!(session.rewind_engaged());
        assert!(session.turbo_engaged());

        session.set_rewind(false);
        assert!(!session.rewind_engaged());
        assert!(session.turbo_engaged());
    }

    #[test]
    fn test_shutdown_clears_pump_active() {
        let (session, _probe) = test_session();
        assert!(session.is_pump_active());

        session.shutdown();
        assert!(!session.is_pump_active());
    }

    #[test]
    fn test_fatal_error_is_taken_once() {
        let (session, _probe) = test_session();
        session.record_fatal_error(EngineError::Frame("bus fault".to_string()).into());

        assert!(session.take_error().is_some());
        assert!(session.take_error().is_none());
    }
}
