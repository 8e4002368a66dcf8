//! The 17-byte header record the ROM saves ahead of every file.
//!
//! On tape the record is framed by the flag byte ($00) and the parity byte,
//! 19 bytes in total:
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 1 | flag ($00) |
//! | 1 | 1 | type (0 program, 1 number array, 2 character array, 3 code) |
//! | 2 | 10 | name, padded with spaces |
//! | 12 | 2 | data length |
//! | 14 | 2 | param 1 (autostart line / start address) |
//! | 16 | 2 | param 2 (program length / 32768) |
//! | 18 | 1 | parity |

use crate::block::checksum;

/// Length of a header block on tape, including flag and parity.
pub const HEADER_BLOCK_LEN: usize = 19;

const NAME_START: usize = 2;
const NAME_LEN: usize = 10;

/// File type recorded in a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Program,
    NumberArray,
    CharacterArray,
    Code,
}

impl HeaderKind {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Program),
            1 => Some(Self::NumberArray),
            2 => Some(Self::CharacterArray),
            3 => Some(Self::Code),
            _ => None,
        }
    }
}

/// A decoded header record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapHeader {
    pub kind: HeaderKind,
    /// Raw name field, exactly as recorded.
    pub raw_name: [u8; NAME_LEN],
    pub data_length: u16,
    pub param1: u16,
    pub param2: u16,
}

impl TapHeader {
    /// Decode the on-tape bytes of a block if they have header shape:
    /// 19 bytes, flag $00, a known type byte and a valid parity byte.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Option<Self> {
        if raw.len() != HEADER_BLOCK_LEN || raw[0] != 0x00 || checksum(raw) != 0 {
            return None;
        }

        let kind = HeaderKind::from_byte(raw[1])?;
        let mut raw_name = [0u8; NAME_LEN];
        raw_name.copy_from_slice(&raw[NAME_START..NAME_START + NAME_LEN]);
        let word = |at: usize| u16::from_le_bytes([raw[at], raw[at + 1]]);

        Some(Self {
            kind,
            raw_name,
            data_length: word(12),
            param1: word(14),
            param2: word(16),
        })
    }

    /// The file name with its space padding removed.
    #[must_use]
    pub fn name(&self) -> String {
        self.raw_name
            .iter()
            .map(|&b| char::from(b))
            .collect::<String>()
            .trim_end()
            .to_string()
    }
}
