use crate::TapError;

/// XOR of every byte, the ROM's block parity.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, &b| acc ^ b)
}

/// A single block from a TAP file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapBlock {
    /// Flag byte: $00 = header, $FF = data.
    pub flag: u8,
    /// Block data (excludes the flag and checksum bytes).
    pub data: Vec<u8>,
    /// Parity byte as stored on tape.
    pub checksum: u8,
}

impl TapBlock {
    /// Build a block, computing its checksum.
    #[must_use]
    pub fn new(flag: u8, data: Vec<u8>) -> Self {
        let checksum = flag ^ checksum(&data);
        Self {
            flag,
            data,
            checksum,
        }
    }

    /// Split on-tape bytes (flag, data..., checksum) into a block.
    pub fn from_raw(raw: &[u8]) -> Result<Self, TapError> {
        match raw {
            [flag, data @ .., parity] => Ok(Self {
                flag: *flag,
                data: data.to_vec(),
                checksum: *parity,
            }),
            _ => Err(TapError::BlockTooShort {
                offset: 0,
                len: raw.len(),
            }),
        }
    }

    /// The bytes as they appear on tape: flag, data, checksum.
    #[must_use]
    pub fn to_raw(&self) -> Vec<u8> {
        let mut raw = Vec::with_capacity(self.data.len() + 2);
        raw.push(self.flag);
        raw.extend_from_slice(&self.data);
        raw.push(self.checksum);
        raw
    }

    /// Checksum the ROM would have written for this flag and data.
    #[must_use]
    pub fn expected_checksum(&self) -> u8 {
        self.flag ^ checksum(&self.data)
    }

    /// Whether the stored parity matches the flag and data.
    #[must_use]
    pub fn is_checksum_valid(&self) -> bool {
        self.expected_checksum() == self.checksum
    }

    /// Header blocks carry flag $00; the ROM tests bit 7 only.
    #[must_use]
    pub fn is_header(&self) -> bool {
        self.flag & 0x80 == 0
    }
}
