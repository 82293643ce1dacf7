//! iNES cartridge image parsing
//!
//! Only the 16-byte iNES header is interpreted; the PRG and CHR payloads
//! stay opaque to this crate. Validation is strict enough to reject the
//! images a real core could not boot from.

use fc_core::error::CartridgeError;

/// iNES magic, "NES" followed by an MS-DOS EOF
pub const INES_MAGIC: [u8; 4] = *b"NES\x1A";
/// Length of the iNES header
pub const HEADER_LEN: usize = 16;
/// Size of one PRG ROM page
pub const PRG_PAGE_BYTES: usize = 16 * 1024;
/// Size of one CHR ROM page
pub const CHR_PAGE_BYTES: usize = 8 * 1024;
/// Size of the optional trainer section
pub const TRAINER_BYTES: usize = 512;

/// Nametable mirroring arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
}

/// Parsed cartridge metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeInfo {
    pub prg_pages: u8,
    pub chr_pages: u8,
    pub mapper: u8,
    pub mirroring: Mirroring,
    pub has_trainer: bool,
    /// PRG ROM payload size in bytes
    pub prg_bytes: usize,
    /// CHR ROM payload size in bytes
    pub chr_bytes: usize,
}

impl CartridgeInfo {
    /// Parse and validate an iNES image
    pub fn parse(image: &[u8]) -> Result<CartridgeInfo, CartridgeError> {
        if image.is_empty() {
            return Err(CartridgeError::Empty);
        }
        if image.len() < HEADER_LEN {
            return Err(CartridgeError::TooShort(image.len()));
        }

        let magic = [image[0], image[1], image[2], image[3]];
        if magic != INES_MAGIC {
            return Err(CartridgeError::BadMagic(magic));
        }

        let prg_pages = image[4];
        let chr_pages = image[5];
        let flags6 = image[6];
        let flags7 = image[7];

        let mirroring = if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let has_trainer = flags6 & 0x04 != 0;
        let mapper = (flags7 & 0xF0) | (flags6 >> 4);

        let prg_bytes = prg_pages as usize * PRG_PAGE_BYTES;
        let chr_bytes = chr_pages as usize * CHR_PAGE_BYTES;
        let mut declared = HEADER_LEN + prg_bytes + chr_bytes;
        if has_trainer {
            declared += TRAINER_BYTES;
        }

        if image.len() < declared {
            return Err(CartridgeError::Truncated {
                declared,
                actual: image.len(),
            });
        }

        Ok(CartridgeInfo {
            prg_pages,
            chr_pages,
            mapper,
            mirroring,
            has_trainer,
            prg_bytes,
            chr_bytes,
        })
    }
}
