//! Controller input state for ferricom
//!
//! One shared [`Pad`] carries the eight controller buttons between the UI
//! thread and the frame pump. Writes are per-button atomic updates, reads
//! are whole-pad snapshots.

pub mod pad;

pub use pad::{Button, Pad, PadButtons};
