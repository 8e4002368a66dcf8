//! Destinations for captured blocks.

use std::cell::RefCell;
use std::rc::Rc;

use crate::block::DataBlock;
use crate::error::TapeError;

/// Receives what a SAVE session records.
///
/// The controller calls `create_file` when SAVE is entered, `set_name` when
/// the first block turns out to be a header, `append_block` for every
/// completed block and `finalize` when SAVE is left.
pub trait TapeSink {
    fn create_file(&mut self) -> Result<(), TapeError>;
    fn set_name(&mut self, name: &str) -> Result<(), TapeError>;
    fn append_block(&mut self, block: &DataBlock) -> Result<(), TapeError>;
    fn finalize(&mut self) -> Result<(), TapeError>;
}

/// A shared sink, so the caller can keep a handle on what the controller
/// records into.
impl<S: TapeSink + ?Sized> TapeSink for Rc<RefCell<S>> {
    fn create_file(&mut self) -> Result<(), TapeError> {
        self.borrow_mut().create_file()
    }

    fn set_name(&mut self, name: &str) -> Result<(), TapeError> {
        self.borrow_mut().set_name(name)
    }

    fn append_block(&mut self, block: &DataBlock) -> Result<(), TapeError> {
        self.borrow_mut().append_block(block)
    }

    fn finalize(&mut self) -> Result<(), TapeError> {
        self.borrow_mut().finalize()
    }
}

/// One recorded file held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedFile {
    pub name: Option<String>,
    pub blocks: Vec<DataBlock>,
    pub finalized: bool,
}

/// Keeps every recorded file in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: Vec<RecordedFile>,
}

impl MemorySink {
    /// An empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every file recorded so far, oldest first.
    #[must_use]
    pub fn files(&self) -> &[RecordedFile] {
        &self.files
    }

    fn current(&mut self) -> &mut RecordedFile {
        if self.files.last().is_none_or(|file| file.finalized) {
            self.files.push(RecordedFile::default());
        }
        let last = self.files.len() - 1;
        &mut self.files[last]
    }
}

impl TapeSink for MemorySink {
    fn create_file(&mut self) -> Result<(), TapeError> {
        self.files.push(RecordedFile::default());
        Ok(())
    }

    fn set_name(&mut self, name: &str) -> Result<(), TapeError> {
        self.current().name = Some(name.to_string());
        Ok(())
    }

    fn append_block(&mut self, block: &DataBlock) -> Result<(), TapeError> {
        self.current().blocks.push(block.clone());
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), TapeError> {
        self.current().finalized = true;
        Ok(())
    }
}
