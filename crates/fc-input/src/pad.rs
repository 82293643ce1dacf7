//! Shared controller button state

use std::sync::atomic::{AtomicU8, Ordering};
use tracing::warn;

bitflags::bitflags! {
    /// Snapshot of all eight controller buttons
    ///
    /// Bit order matches the hardware report order, so a snapshot can be
    /// handed to the engine as-is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PadButtons: u8 {
        const A = 0x01;
        const B = 0x02;
        const SELECT = 0x04;
        const START = 0x08;
        const UP = 0x10;
        const DOWN = 0x20;
        const LEFT = 0x40;
        const RIGHT = 0x80;
    }
}

/// Controller button identifiers, in hardware report order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
}

impl Button {
    /// Number of buttons on a standard controller
    pub const COUNT: u8 = 8;

    /// All buttons in id order
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    /// Resolve a raw button id
    ///
    /// Returns `None` for ids outside `0..COUNT`.
    pub fn from_id(id: u8) -> Option<Button> {
        if id < Self::COUNT {
            Some(Self::ALL[id as usize])
        } else {
            None
        }
    }

    /// Raw id of this button
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Bit mask of this button within a [`PadButtons`] snapshot
    pub fn mask(self) -> PadButtons {
        PadButtons::from_bits_truncate(1u8 << self as u8)
    }
}

/// Shared controller state
///
/// The UI thread updates individual buttons as key events arrive; the frame
/// pump reads one whole-pad snapshot per tick. Each update is a single
/// atomic read-modify-write, so a snapshot never observes a half-applied
/// press even while keys are changing on the other thread.
#[derive(Debug, Default)]
pub struct Pad {
    bits: AtomicU8,
}

impl Pad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Press or release a single button
    pub fn set_button(&self, button: Button, pressed: bool) {
        let mask = button.mask().bits();
        if pressed {
            self.bits.fetch_or(mask, Ordering::Release);
        } else {
            self.bits.fetch_and(!mask, Ordering::Release);
        }
    }

    /// Press or release a button by raw id
    ///
    /// Out-of-range ids are logged and ignored, leaving the pad untouched.
    /// Returns whether the id was accepted.
    pub fn set_button_id(&self, id: u8, pressed: bool) -> bool {
        match Button::from_id(id) {
            Some(button) => {
                self.set_button(button, pressed);
                true
            }
            None => {
                warn!(id, "ignoring out-of-range button id");
                false
            }
        }
    }

    /// Snapshot all eight buttons at once
    pub fn snapshot(&self) -> PadButtons {
        PadButtons::from_bits_truncate(self.bits.load(Ordering::Acquire))
    }

    /// Release every button
    pub fn clear(&self) {
        self.bits.store(0, Ordering::Release);
    }
}
