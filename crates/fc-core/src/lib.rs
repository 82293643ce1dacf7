//! Core types for the ferricom frame pump
//!
//! This crate provides the foundational types, error handling, and
//! configuration infrastructure shared by the other crates.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{CartridgeError, EmulatorError, EngineError, Result};
