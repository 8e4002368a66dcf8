//! Tape sequencer: plays an ordered list of blocks back to back.
//!
//! Each block starts at the tact its predecessor finished, opening with an
//! edge away from the level of its predecessor's last pulse. Once the last
//! block has finished the sequencer reports end of tape and the line rests
//! high.

use log::debug;

use crate::block::TapeBlock;
use crate::player::{BlockPlayer, PlayPhase};

/// Forward-only playback over a list of tape blocks.
#[derive(Debug, Clone)]
pub struct TapeSequencer {
    blocks: Vec<TapeBlock>,
    tacts_per_ms: u32,
    index: usize,
    player: Option<BlockPlayer>,
    level: bool,
    eof: bool,
}

impl TapeSequencer {
    /// A stopped sequencer over `blocks`; call [`init_play`](Self::init_play)
    /// to start it.
    #[must_use]
    pub fn new(blocks: Vec<TapeBlock>, tacts_per_ms: u32) -> Self {
        Self {
            blocks,
            tacts_per_ms,
            index: 0,
            player: None,
            level: true,
            eof: false,
        }
    }

    /// Rewind to the first block and start it at `start_tact`.
    ///
    /// A tape without blocks is at its end straight away.
    pub fn init_play(&mut self, start_tact: u64) {
        self.index = 0;
        self.level = true;
        self.eof = false;
        self.player = None;
        self.start_block(start_tact);
    }

    /// EAR level at `tact`.
    pub fn get_ear_bit(&mut self, tact: u64) -> bool {
        loop {
            let Some(player) = self.player.as_mut() else {
                return true;
            };
            self.level = player.signal_at(tact);
            match player.end_tact() {
                Some(end) if tact >= end => {
                    self.level = player.exit_level();
                    self.index += 1;
                    self.start_block(end);
                }
                _ => return self.level,
            }
        }
    }

    /// Abandon the rest of the current block and start the next one at
    /// `tact`.
    pub fn next_block(&mut self, tact: u64) {
        if self.player.is_none() {
            return;
        }
        self.index += 1;
        self.start_block(tact);
    }

    fn start_block(&mut self, start_tact: u64) {
        match self.blocks.get(self.index) {
            Some(block) => {
                debug!(
                    "tape: block {} ({}) starts at tact {start_tact}",
                    self.index,
                    block.kind_name()
                );
                self.player = Some(BlockPlayer::for_block(
                    block,
                    self.tacts_per_ms,
                    start_tact,
                    self.level,
                ));
            }
            None => {
                debug!("tape: end of tape at tact {start_tact}");
                self.player = None;
                self.level = true;
                self.eof = true;
            }
        }
    }

    /// Tact of the next point where the level may change, as of the last
    /// query. `None` at end of tape.
    #[must_use]
    pub fn next_boundary(&self) -> Option<u64> {
        self.player.as_ref().and_then(BlockPlayer::next_boundary)
    }

    /// Whether every block has been played.
    #[must_use]
    pub fn eof(&self) -> bool {
        self.eof
    }

    /// Index of the block being played; equals the block count at end of tape.
    #[must_use]
    pub fn current_block_index(&self) -> usize {
        self.index
    }

    /// The block being played; `None` before `init_play` and at end of tape.
    #[must_use]
    pub fn current_block(&self) -> Option<&TapeBlock> {
        self.player.as_ref().and_then(|_| self.blocks.get(self.index))
    }

    /// Phase of the block being played. `Completed` at end of tape.
    #[must_use]
    pub fn play_phase(&self) -> PlayPhase {
        match &self.player {
            Some(player) => player.phase(),
            None if self.eof => PlayPhase::Completed,
            None => PlayPhase::None,
        }
    }

    /// Every block on the tape.
    #[must_use]
    pub fn blocks(&self) -> &[TapeBlock] {
        &self.blocks
    }
}
