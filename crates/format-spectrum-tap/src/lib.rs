//! TAP images: the byte stream a Spectrum puts on tape, minus the timing.
//!
//! An image is a run of records, each a little-endian length word followed by
//! that many bytes: the flag byte, the block body and an XOR parity byte.
//! Those are exactly the bytes the ROM sends between the sync pulses and the
//! terminator, so a record can be replayed or captured without translation.
//!
//! Files saved from BASIC come in pairs: a 19-byte header record (flag $00,
//! see [`TapHeader`]) and the body it describes (flag $FF).

mod block;
mod error;
mod header;

pub use block::{TapBlock, checksum};
pub use error::TapError;
pub use header::{HEADER_BLOCK_LEN, HeaderKind, TapHeader};

/// Largest block a 2-byte length word can describe.
pub const MAX_BLOCK_LEN: usize = 0xFFFF;

/// A TAP image held as its blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TapFile {
    /// Blocks in tape order.
    pub blocks: Vec<TapBlock>,
}

impl TapFile {
    /// Create an empty TAP image.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split an image into blocks.
    ///
    /// Every block's checksum is verified.
    pub fn parse(data: &[u8]) -> Result<Self, TapError> {
        let mut tap = Self::new();
        let mut offset = 0;

        while let Some(rest) = data.get(offset..).filter(|rest| !rest.is_empty()) {
            let &[lo, hi, ..] = rest else {
                return Err(TapError::TruncatedLength { offset });
            };
            let block_len = usize::from(u16::from_le_bytes([lo, hi]));
            let block_start = offset + 2;

            if block_len < 2 {
                return Err(TapError::BlockTooShort {
                    offset,
                    len: block_len,
                });
            }

            if block_start + block_len > data.len() {
                return Err(TapError::TruncatedBlock {
                    offset,
                    needed: block_len,
                    remaining: data.len() - block_start,
                });
            }

            let block = TapBlock::from_raw(&data[block_start..block_start + block_len])?;
            if !block.is_checksum_valid() {
                return Err(TapError::ChecksumMismatch {
                    offset,
                    expected: block.expected_checksum(),
                    actual: block.checksum,
                });
            }

            tap.blocks.push(block);
            offset = block_start + block_len;
        }

        Ok(tap)
    }

    /// Append a block given its on-tape bytes (flag, data, checksum).
    ///
    /// The checksum is kept as recorded, valid or not, so a captured tape
    /// can be written back byte for byte.
    pub fn push_raw(&mut self, raw: &[u8]) -> Result<(), TapError> {
        self.blocks.push(TapBlock::from_raw(raw)?);
        Ok(())
    }

    /// Serialize the image back into TAP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TapError> {
        let mut out = Vec::new();
        for (index, block) in self.blocks.iter().enumerate() {
            let raw = block.to_raw();
            let len = u16::try_from(raw.len()).map_err(|_| TapError::BlockTooLong {
                index,
                len: raw.len(),
            })?;
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(&raw);
        }
        Ok(out)
    }

    /// Header records found on the tape, paired with their block index.
    pub fn headers(&self) -> impl Iterator<Item = (usize, TapHeader)> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(i, block)| TapHeader::parse(&block.to_raw()).map(|h| (i, h)))
    }
}
