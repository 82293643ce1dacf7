//! Error types for the ferricom frame pump

use thiserror::Error;

/// Main error type for the session controller
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Errors reported by an emulation engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// One-time setup failed; the engine is unusable
    #[error("Initialization failed: {0}")]
    Init(String),

    /// A cartridge image was rejected; the session keeps its prior state
    #[error("Cartridge error: {0}")]
    Cartridge(#[from] CartridgeError),

    /// A frame advance failed; fatal to the running session
    #[error("Frame advance failed: {0}")]
    Frame(String),

    /// A save or restore request failed; the session keeps running
    #[error("Persistence request failed: {0}")]
    Persistence(String),
}

/// Cartridge image validation errors
#[derive(Error, Debug)]
pub enum CartridgeError {
    #[error("Cartridge image is empty")]
    Empty,

    #[error("Cartridge image is {0} bytes, smaller than the 16-byte header")]
    TooShort(usize),

    #[error("Bad cartridge magic: {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("Cartridge image truncated: header declares {declared} bytes but image has {actual}")]
    Truncated { declared: usize, actual: usize },
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CartridgeError::Empty;
        assert_eq!(format!("{}", err), "Cartridge image is empty");

        let err = CartridgeError::BadMagic([0x50, 0x4B, 0x03, 0x04]);
        assert_eq!(format!("{}", err), "Bad cartridge magic: [50, 4b, 03, 04]");

        let err = CartridgeError::Truncated {
            declared: 40976,
            actual: 1024,
        };
        assert_eq!(
            format!("{}", err),
            "Cartridge image truncated: header declares 40976 bytes but image has 1024"
        );
    }

    #[test]
    fn test_error_conversion() {
        let cart_err = CartridgeError::TooShort(4);
        let engine_err: EngineError = cart_err.into();
        assert!(matches!(engine_err, EngineError::Cartridge(_)));

        let emu_err: EmulatorError = engine_err.into();
        assert!(matches!(emu_err, EmulatorError::Engine(_)));
    }

    #[test]
    fn test_nested_display() {
        let err: EmulatorError = EngineError::Frame("bus fault".to_string()).into();
        assert_eq!(
            format!("{}", err),
            "Engine error: Frame advance failed: bus fault"
        );
    }
}
