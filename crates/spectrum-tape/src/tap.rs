//! Bridges between TAP images and tape blocks.
//!
//! A TAP block stores exactly the bytes the ROM puts between the sync
//! pulses and the terminator (flag, data, parity), so conversion in either
//! direction is a straight copy.

use std::fs;
use std::path::{Path, PathBuf};

use format_spectrum_tap::TapFile;
use log::info;

use crate::block::{DataBlock, TapeBlock};
use crate::error::TapeError;
use crate::sink::TapeSink;

/// Read and parse a `.tap` file.
pub fn load_tap(path: &Path) -> Result<TapFile, TapeError> {
    let bytes = fs::read(path).map_err(|source| TapeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(TapFile::parse(&bytes)?)
}

/// Standard-timed tape blocks for every block of `tap`, each followed by
/// `pause_ms` of silence.
#[must_use]
pub fn blocks_from_tap(tap: &TapFile, pause_ms: u16) -> Vec<TapeBlock> {
    tap.blocks
        .iter()
        .map(|block| DataBlock::standard(block.to_raw(), pause_ms).into())
        .collect()
}

/// Collects captured blocks into a TAP image, optionally writing it out
/// when the session ends.
#[derive(Debug, Default)]
pub struct TapFileSink {
    tap: TapFile,
    name: Option<String>,
    path: Option<PathBuf>,
}

impl TapFileSink {
    /// Keep the image in memory only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the image to `path` on every `finalize`.
    #[must_use]
    pub fn writing_to(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// The image built from the blocks appended so far.
    #[must_use]
    pub fn tap(&self) -> &TapFile {
        &self.tap
    }

    /// Name suggested by the recorded header, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl TapeSink for TapFileSink {
    fn create_file(&mut self) -> Result<(), TapeError> {
        self.tap = TapFile::new();
        self.name = None;
        Ok(())
    }

    fn set_name(&mut self, name: &str) -> Result<(), TapeError> {
        self.name = Some(name.to_string());
        Ok(())
    }

    fn append_block(&mut self, block: &DataBlock) -> Result<(), TapeError> {
        self.tap.push_raw(block.payload())?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), TapeError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes = self.tap.to_bytes()?;
        fs::write(path, bytes).map_err(|source| TapeError::Io {
            path: path.clone(),
            source,
        })?;
        info!(
            "tape: wrote {} blocks to {}",
            self.tap.blocks.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::PilotTone;
    use format_spectrum_tap::TapBlock;

    #[test]
    fn tap_blocks_become_standard_data() {
        let mut tap = TapFile::new();
        tap.blocks.push(TapBlock::new(0x00, vec![0; 17]));
        tap.blocks.push(TapBlock::new(0xFF, vec![1, 2, 3]));

        let blocks = blocks_from_tap(&tap, 1000);
        assert_eq!(blocks.len(), 2);
        let header = blocks[0].data_block().expect("data block");
        assert_eq!(header.pilot(), PilotTone::Header);
        assert_eq!(header.payload().len(), 19);
        let data = blocks[1].data_block().expect("data block");
        assert_eq!(data.pilot(), PilotTone::Data);
        assert_eq!(data.payload(), &[0xFF, 1, 2, 3, 0xFF ^ 1 ^ 2 ^ 3]);
        assert_eq!(data.pause_after_ms(), 1000);
    }

    #[test]
    fn sink_builds_an_image() {
        let mut sink = TapFileSink::new();
        sink.create_file().expect("create");
        sink.set_name("demo").expect("name");
        sink.append_block(&DataBlock::standard(vec![0xFF, 0x10, 0xEF], 1000))
            .expect("append");
        sink.finalize().expect("no path, nothing written");

        assert_eq!(sink.name(), Some("demo"));
        assert_eq!(sink.tap().blocks.len(), 1);
        assert_eq!(sink.tap().blocks[0].data, vec![0x10]);
        assert!(sink.tap().blocks[0].is_checksum_valid());
    }

    #[test]
    fn empty_block_cannot_be_stored() {
        let mut sink = TapFileSink::new();
        assert!(matches!(
            sink.append_block(&DataBlock::standard(Vec::<u8>::new(), 0)),
            Err(TapeError::Tap(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_tap(Path::new("/nonexistent/tape.tap")).expect_err("no such file");
        assert!(matches!(err, TapeError::Io { .. }));
    }
}
