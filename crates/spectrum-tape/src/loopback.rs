//! Plays a tape straight into a capture decoder.
//!
//! Instead of sampling every tact, the sequencer is only queried at the
//! boundaries where its level can change, so even a full-length tape
//! replays quickly.

use crate::block::TapeBlock;
use crate::config::TapeConfig;
use crate::decoder::{CaptureDecoder, CapturedBlock, SavePhase};
use crate::sequencer::TapeSequencer;

/// What came out of the decoder after the whole tape played.
#[derive(Debug, Clone)]
pub struct Replay {
    pub captured: Vec<CapturedBlock>,
    /// Decoder phase after the last edge; `Error` if a block failed.
    pub final_phase: SavePhase,
    /// Tact at which the tape ended.
    pub end_tact: u64,
}

/// Play `blocks` from `start_tact` and decode the signal they produce.
#[must_use]
pub fn replay(blocks: Vec<TapeBlock>, config: &TapeConfig, start_tact: u64) -> Replay {
    let mut sequencer = TapeSequencer::new(blocks, config.tacts_per_ms());
    let mut decoder = CaptureDecoder::new(config, start_tact);
    let mut captured = Vec::new();

    sequencer.init_play(start_tact);
    let mut tact = start_tact;
    loop {
        let level = sequencer.get_ear_bit(tact);
        if let Some(block) = decoder.on_edge(tact, level) {
            captured.push(block);
        }
        match sequencer.next_boundary() {
            Some(next) => tact = next.max(tact + 1),
            None => break,
        }
    }

    Replay {
        captured,
        final_phase: decoder.phase(),
        end_tact: tact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::DataBlock;

    #[test]
    fn standard_blocks_come_back() {
        let blocks = vec![
            DataBlock::standard(vec![0x00, 0x01, 0x02], 1000).into(),
            DataBlock::standard(vec![0xFF, 0xAA], 0).into(),
        ];
        let replay = replay(blocks, &TapeConfig::default(), 0);
        assert_eq!(replay.final_phase, SavePhase::None);
        assert_eq!(replay.captured.len(), 2);
        assert_eq!(replay.captured[0].block.payload(), &[0x00, 0x01, 0x02]);
        assert_eq!(replay.captured[1].block.payload(), &[0xFF, 0xAA]);
    }

    #[test]
    fn even_pilot_after_bare_terminator_comes_back() {
        let blocks = vec![
            DataBlock::standard(vec![0xFF, 0x01], 0).into(),
            DataBlock::standard(vec![0xFF, 0x02], 0)
                .with_pilot_pulses(3224)
                .into(),
            TapeBlock::PureTone {
                pulse_len: 2168,
                count: 3,
            },
            DataBlock::standard(vec![0xFF, 0x03], 0)
                .with_pilot_pulses(3200)
                .into(),
        ];
        let replay = replay(blocks, &TapeConfig::default(), 0);
        assert_eq!(replay.final_phase, SavePhase::None);
        let payloads: Vec<&[u8]> = replay.captured.iter().map(|c| c.block.payload()).collect();
        let expected: [&[u8]; 3] = [&[0xFF, 0x01], &[0xFF, 0x02], &[0xFF, 0x03]];
        assert_eq!(payloads, expected);
    }

    #[test]
    fn empty_tape_captures_nothing() {
        let replay = replay(Vec::new(), &TapeConfig::default(), 42);
        assert!(replay.captured.is_empty());
        assert_eq!(replay.end_tact, 42);
    }
}
