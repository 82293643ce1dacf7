//! egui front end for ferricom
//!
//! The UI thread presents published frames, feeds keyboard state into the
//! shared pad, and exposes the session controls.

pub mod app;
pub mod keymap;

pub use app::{FerricomApp, run};
pub use keymap::KeyMap;
