//! Capture decoder: rebuilds tape blocks from MIC edge timestamps.
//!
//! Every edge closes a pulse whose length is the time since the previous
//! edge. Pulses are classified against the ROM timings with a symmetric
//! tolerance window and drive a small phase machine:
//!
//! ```text
//! None -> Pilot -> Sync1 -> Sync2 -> Data -> None
//!   \________\________\________\_______\--> Error
//! ```
//!
//! A block is complete when the terminating sync pulse arrives on a byte
//! boundary. Any timing or framing violation moves to `Error`, which sticks
//! until a new decoder is created. So does a block that outgrows a TAP
//! record.

use format_spectrum_tap::{MAX_BLOCK_LEN, TapHeader};
use log::{info, trace, warn};

use crate::block::DataBlock;
use crate::config::TapeConfig;
use crate::timing::PulseTimings;

/// Classification of one measured MIC pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicPulse {
    /// Shorter than anything the ROM writes.
    TooShort,
    Pilot,
    Sync1,
    Sync2,
    /// Half of a `0` bit.
    Bit0,
    /// Half of a `1` bit.
    Bit1,
    /// Closes a block.
    TermSync,
    /// Longer than a pilot pulse; gaps between blocks look like this.
    TooLong,
    /// Within the ROM's range but matching no pulse.
    Unknown,
}

impl MicPulse {
    /// Classify a pulse of `length` tacts.
    ///
    /// Windows are tried in a fixed order, so they must not overlap; see
    /// [`PulseTimings::max_tolerance`].
    #[must_use]
    pub fn classify(length: u64, timings: &PulseTimings, tolerance: u16) -> Self {
        let tolerance = u64::from(tolerance);
        let near = |expected: u16| length.abs_diff(u64::from(expected)) <= tolerance;

        if near(timings.sync1) {
            Self::Sync1
        } else if near(timings.sync2) {
            Self::Sync2
        } else if near(timings.zero) {
            Self::Bit0
        } else if near(timings.term_sync) {
            Self::TermSync
        } else if near(timings.one) {
            Self::Bit1
        } else if near(timings.pilot) {
            Self::Pilot
        } else if length + tolerance < u64::from(timings.sync1) {
            Self::TooShort
        } else if length > u64::from(timings.pilot) + 2 * tolerance {
            Self::TooLong
        } else {
            Self::Unknown
        }
    }
}

/// Where the decoder is within the block being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePhase {
    /// Waiting for a pilot tone.
    None,
    /// Counting pilot pulses.
    Pilot,
    /// Sync1 seen; sync2 must follow.
    Sync1,
    /// Sync2 seen; data or the terminator follows.
    Sync2,
    /// Collecting bits.
    Data,
    /// A pulse did not fit; nothing more is decoded.
    Error,
}

/// A block the decoder finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedBlock {
    pub block: DataBlock,
    /// File name taken from the session's first block when that block is a
    /// ROM header record.
    pub suggested_name: Option<String>,
}

/// MIC edge decoder for one SAVE session.
#[derive(Debug, Clone)]
pub struct CaptureDecoder {
    timings: PulseTimings,
    tolerance: u16,
    min_pilot_pulses: u32,
    silence_threshold: u64,
    default_pause_ms: u16,

    phase: SavePhase,
    level: bool,
    last_edge_tact: u64,
    pilot_pulse_count: u32,
    bit_offset: u8,
    bit_mask: u8,
    data_byte: u8,
    data: Vec<u8>,
    prev_data_pulse: Option<MicPulse>,
    block_count: usize,
    name_checked: bool,
}

impl CaptureDecoder {
    /// Start a session at `start_tact` with the MIC line high.
    ///
    /// A tolerance too wide for the pulse windows to stay apart is narrowed
    /// to the widest one that does.
    #[must_use]
    pub fn new(config: &TapeConfig, start_tact: u64) -> Self {
        let timings = PulseTimings::STANDARD;
        let max = timings.max_tolerance();
        if config.pulse_tolerance > max {
            warn!(
                "capture: pulse tolerance {} narrowed to {max} tacts",
                config.pulse_tolerance
            );
        }
        Self {
            timings,
            tolerance: config.pulse_tolerance.min(max),
            min_pilot_pulses: config.min_pilot_pulses,
            silence_threshold: config.silence_threshold,
            default_pause_ms: config.default_pause_ms,
            phase: SavePhase::None,
            level: true,
            last_edge_tact: start_tact,
            pilot_pulse_count: 0,
            bit_offset: 0,
            bit_mask: 0x80,
            data_byte: 0,
            data: Vec::new(),
            prev_data_pulse: None,
            block_count: 0,
            name_checked: false,
        }
    }

    /// Feed the MIC level after a toggle at `tact`.
    ///
    /// Returns the block the edge completed, if any. Edges that leave the
    /// level unchanged are ignored.
    pub fn on_edge(&mut self, tact: u64, level: bool) -> Option<CapturedBlock> {
        if level == self.level {
            return None;
        }
        self.level = level;
        let length = tact.saturating_sub(self.last_edge_tact);
        self.last_edge_tact = tact;

        let pulse = MicPulse::classify(length, &self.timings, self.tolerance);
        trace!("mic: {length} tacts, {pulse:?} in {:?}", self.phase);

        match self.phase {
            SavePhase::None => match pulse {
                MicPulse::TooShort | MicPulse::TooLong => {}
                MicPulse::Pilot => {
                    self.pilot_pulse_count = 1;
                    self.phase = SavePhase::Pilot;
                }
                _ => self.fail(pulse, length),
            },
            SavePhase::Pilot => match pulse {
                MicPulse::Pilot => {
                    self.pilot_pulse_count = self.pilot_pulse_count.saturating_add(1);
                }
                MicPulse::Sync1 if self.pilot_pulse_count >= self.min_pilot_pulses => {
                    self.phase = SavePhase::Sync1;
                }
                _ => self.fail(pulse, length),
            },
            SavePhase::Sync1 => match pulse {
                MicPulse::Sync2 => self.start_data(),
                _ => self.fail(pulse, length),
            },
            SavePhase::Sync2 | SavePhase::Data => return self.on_data_pulse(pulse, length),
            SavePhase::Error => {}
        }
        None
    }

    fn start_data(&mut self) {
        self.phase = SavePhase::Sync2;
        self.bit_offset = 0;
        self.bit_mask = 0x80;
        self.data_byte = 0;
        self.data.clear();
        self.prev_data_pulse = None;
    }

    fn on_data_pulse(&mut self, pulse: MicPulse, length: u64) -> Option<CapturedBlock> {
        match pulse {
            MicPulse::Bit0 | MicPulse::Bit1 => match self.prev_data_pulse.take() {
                None => {
                    self.prev_data_pulse = Some(pulse);
                    self.phase = SavePhase::Data;
                }
                Some(first) if first == pulse => {
                    self.push_bit(pulse == MicPulse::Bit1);
                }
                Some(_) => self.fail(pulse, length),
            },
            MicPulse::TermSync if self.bit_offset == 0 && self.prev_data_pulse.is_none() => {
                return Some(self.complete());
            }
            _ => self.fail(pulse, length),
        }
        None
    }

    fn push_bit(&mut self, one: bool) {
        if one {
            self.data_byte |= self.bit_mask;
        }
        self.bit_mask >>= 1;
        self.bit_offset += 1;
        if self.bit_offset == 8 {
            if self.data.len() == MAX_BLOCK_LEN {
                warn!("capture: block longer than {MAX_BLOCK_LEN} bytes, dropped");
                self.abort();
                return;
            }
            self.data.push(self.data_byte);
            self.data_byte = 0;
            self.bit_mask = 0x80;
            self.bit_offset = 0;
        }
    }

    fn complete(&mut self) -> CapturedBlock {
        let payload = std::mem::take(&mut self.data);
        let suggested_name = if self.name_checked {
            None
        } else {
            self.name_checked = true;
            TapHeader::parse(&payload).map(|header| header.name())
        };

        self.block_count += 1;
        self.phase = SavePhase::None;
        self.pilot_pulse_count = 0;
        info!(
            "capture: block {} complete, {} bytes",
            self.block_count,
            payload.len()
        );

        CapturedBlock {
            block: DataBlock::standard(payload, self.default_pause_ms),
            suggested_name,
        }
    }

    fn fail(&mut self, pulse: MicPulse, length: u64) {
        warn!(
            "capture: unexpected {pulse:?} pulse ({length} tacts) in {:?} phase, block dropped",
            self.phase
        );
        self.abort();
    }

    fn abort(&mut self) {
        self.phase = SavePhase::Error;
        self.data.clear();
        self.data_byte = 0;
        self.bit_mask = 0x80;
        self.bit_offset = 0;
        self.prev_data_pulse = None;
    }

    /// Whether the MIC has been quiet for longer than the silence threshold.
    #[must_use]
    pub fn is_silent(&self, tact: u64) -> bool {
        tact.saturating_sub(self.last_edge_tact) > self.silence_threshold
    }

    /// Current phase of the block being recorded.
    #[must_use]
    pub fn phase(&self) -> SavePhase {
        self.phase
    }

    /// Pilot pulses seen since the current pilot tone began.
    #[must_use]
    pub fn pilot_pulse_count(&self) -> u32 {
        self.pilot_pulse_count
    }

    /// Bits already collected in the current byte.
    #[must_use]
    pub fn bit_offset(&self) -> u8 {
        self.bit_offset
    }

    /// Mask the next bit lands under.
    #[must_use]
    pub fn bit_mask(&self) -> u8 {
        self.bit_mask
    }

    /// The partially collected byte.
    #[must_use]
    pub fn data_byte(&self) -> u8 {
        self.data_byte
    }

    /// Bytes of the block in progress.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// First half-pulse of a bit awaiting its second half.
    #[must_use]
    pub fn prev_data_pulse(&self) -> Option<MicPulse> {
        self.prev_data_pulse
    }

    /// Blocks completed in this session.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Tact of the latest level change, or the session start.
    #[must_use]
    pub fn last_edge_tact(&self) -> u64 {
        self.last_edge_tact
    }

    /// Tolerance the pulse windows are built with.
    #[must_use]
    pub fn tolerance(&self) -> u16 {
        self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::{
        BIT_0_PL, BIT_1_PL, MIN_PILOT_PULSE_COUNT, PILOT_PL, SYNC_1_PL, SYNC_2_PL, TERM_SYNC,
    };
    use format_spectrum_tap::TapBlock;

    const START: u64 = 10_000;

    /// Nominal pulse lengths of one block, as the ROM would write it.
    #[derive(Clone)]
    struct Train {
        pilot: u64,
        pilot_count: u32,
        sync1: u64,
        sync2: u64,
        zero: u64,
        one: u64,
        term: u64,
    }

    impl Default for Train {
        fn default() -> Self {
            Self {
                pilot: u64::from(PILOT_PL),
                pilot_count: MIN_PILOT_PULSE_COUNT + 10,
                sync1: u64::from(SYNC_1_PL),
                sync2: u64::from(SYNC_2_PL),
                zero: u64::from(BIT_0_PL),
                one: u64::from(BIT_1_PL),
                term: u64::from(TERM_SYNC),
            }
        }
    }

    impl Train {
        fn pulses(&self, payload: &[u8]) -> Vec<u64> {
            let mut pulses = vec![self.pilot; self.pilot_count as usize];
            pulses.push(self.sync1);
            pulses.push(self.sync2);
            for byte in payload {
                for bit in (0..8).rev() {
                    let half = if byte & (1 << bit) != 0 { self.one } else { self.zero };
                    pulses.push(half);
                    pulses.push(half);
                }
            }
            pulses.push(self.term);
            pulses
        }
    }

    /// Toggle the MIC once per pulse, starting from the resting high level.
    struct Mic {
        decoder: CaptureDecoder,
        tact: u64,
        level: bool,
        captured: Vec<CapturedBlock>,
    }

    impl Mic {
        fn new() -> Self {
            Self::with_config(&TapeConfig::default())
        }

        fn with_config(config: &TapeConfig) -> Self {
            Self {
                decoder: CaptureDecoder::new(config, START),
                tact: START,
                level: true,
                captured: Vec::new(),
            }
        }

        fn feed(&mut self, pulses: &[u64]) {
            for &length in pulses {
                self.tact += length;
                self.level = !self.level;
                if let Some(block) = self.decoder.on_edge(self.tact, self.level) {
                    self.captured.push(block);
                }
            }
        }
    }

    fn header_record(name: &[u8; 10]) -> Vec<u8> {
        let mut data = vec![0x03];
        data.extend_from_slice(name);
        data.extend_from_slice(&[0x00, 0x1B, 0x00, 0x40, 0x00, 0x80]);
        TapBlock::new(0x00, data).to_raw()
    }

    #[test]
    fn classify_nominal_lengths() {
        let t = PulseTimings::STANDARD;
        let c = |len: u64| MicPulse::classify(len, &t, 24);
        assert_eq!(c(2168), MicPulse::Pilot);
        assert_eq!(c(667), MicPulse::Sync1);
        assert_eq!(c(735), MicPulse::Sync2);
        assert_eq!(c(855), MicPulse::Bit0);
        assert_eq!(c(1710), MicPulse::Bit1);
        assert_eq!(c(947), MicPulse::TermSync);
        assert_eq!(c(642), MicPulse::TooShort);
        assert_eq!(c(2168 + 48), MicPulse::Unknown);
        assert_eq!(c(2168 + 49), MicPulse::TooLong);
        assert_eq!(c(1200), MicPulse::Unknown);
    }

    #[test]
    fn decodes_six_bytes() {
        let bytes = [0x90, 0x02, 0x05, 0xAA, 0xFF, 0x63];
        let mut mic = Mic::new();
        let pulses = Train::default().pulses(&bytes);

        // Everything but the terminator: the bytes sit in the buffer.
        mic.feed(&pulses[..pulses.len() - 1]);
        assert_eq!(mic.decoder.phase(), SavePhase::Data);
        assert_eq!(mic.decoder.data(), &bytes);
        assert_eq!(mic.decoder.bit_offset(), 0);

        mic.feed(&pulses[pulses.len() - 1..]);
        assert_eq!(mic.captured.len(), 1);
        assert_eq!(mic.captured[0].block.payload(), &bytes);
        assert_eq!(mic.captured[0].block.pause_after_ms(), 1000);
        assert_eq!(mic.captured[0].suggested_name, None);
        assert_eq!(mic.decoder.phase(), SavePhase::None);
        assert_eq!(mic.decoder.block_count(), 1);
    }

    #[test]
    fn phases_progress_through_sync() {
        let mut mic = Mic::new();
        let train = Train::default();
        mic.feed(&vec![train.pilot; 3000]);
        assert_eq!(mic.decoder.phase(), SavePhase::Pilot);
        assert_eq!(mic.decoder.pilot_pulse_count(), 3000);
        mic.feed(&[train.sync1]);
        assert_eq!(mic.decoder.phase(), SavePhase::Sync1);
        mic.feed(&[train.sync2]);
        assert_eq!(mic.decoder.phase(), SavePhase::Sync2);
        assert_eq!(mic.decoder.bit_mask(), 0x80);
        mic.feed(&[train.one]);
        assert_eq!(mic.decoder.phase(), SavePhase::Data);
        assert_eq!(mic.decoder.prev_data_pulse(), Some(MicPulse::Bit1));
        mic.feed(&[train.one]);
        assert_eq!(mic.decoder.prev_data_pulse(), None);
        assert_eq!(mic.decoder.data_byte(), 0x80);
        assert_eq!(mic.decoder.bit_offset(), 1);
    }

    #[test]
    fn empty_block_completes_after_sync() {
        let mut mic = Mic::new();
        mic.feed(&Train::default().pulses(&[]));
        assert_eq!(mic.captured.len(), 1);
        assert!(mic.captured[0].block.payload().is_empty());
    }

    #[test]
    fn header_name_is_suggested_once() {
        let header = header_record(b"Border    ");
        let mut mic = Mic::new();
        let train = Train::default();
        mic.feed(&train.pulses(&header));
        mic.feed(&train.pulses(&[0xFF, 0x01, 0x02]));
        mic.feed(&train.pulses(&header_record(b"Again     ")));

        assert_eq!(mic.captured.len(), 3);
        assert_eq!(mic.captured[0].suggested_name.as_deref(), Some("Border"));
        assert_eq!(mic.captured[1].suggested_name, None);
        assert_eq!(mic.captured[2].suggested_name, None);
    }

    #[test]
    fn non_header_first_block_suggests_nothing() {
        let mut mic = Mic::new();
        let train = Train::default();
        mic.feed(&train.pulses(&[0xFF, 0x00]));
        mic.feed(&train.pulses(&header_record(b"Later     ")));
        assert_eq!(mic.captured.len(), 2);
        assert!(mic.captured.iter().all(|c| c.suggested_name.is_none()));
    }

    #[test]
    fn corrupt_header_suggests_nothing() {
        let mut record = header_record(b"Border    ");
        record[18] ^= 0xFF;
        let mut mic = Mic::new();
        mic.feed(&Train::default().pulses(&record));
        assert_eq!(mic.captured.len(), 1);
        assert_eq!(mic.captured[0].suggested_name, None);
    }

    #[test]
    fn multi_block_session_counts_terminators() {
        let mut mic = Mic::new();
        let train = Train::default();
        for n in 0..3u8 {
            mic.feed(&train.pulses(&[n, n + 1]));
            assert_eq!(mic.decoder.block_count(), usize::from(n) + 1);
            assert_eq!(mic.decoder.phase(), SavePhase::None);
        }
        assert_eq!(mic.captured[2].block.payload(), &[2, 3]);
    }

    #[test]
    fn gaps_between_blocks_are_ignored() {
        let mut mic = Mic::new();
        let train = Train::default();
        mic.feed(&[50_000, 100]);
        assert_eq!(mic.decoder.phase(), SavePhase::None);
        mic.feed(&train.pulses(&[0x42]));
        mic.feed(&[3_500_000]);
        mic.feed(&train.pulses(&[0x43]));
        assert_eq!(mic.captured.len(), 2);
    }

    /// Run `train` with one field bent and report whether it decoded.
    fn decodes(train: &Train) -> bool {
        let mut mic = Mic::new();
        mic.feed(&train.pulses(&[0x5A]));
        mic.captured.len() == 1 && mic.decoder.phase() == SavePhase::None
    }

    #[test]
    fn tolerance_window_edges() {
        let tol = 24i64;
        let nominal = Train::default();
        type Bend = fn(&mut Train, i64);
        let bends: [(&str, Bend); 6] = [
            ("pilot", |t, d| t.pilot = t.pilot.saturating_add_signed(d)),
            ("sync1", |t, d| t.sync1 = t.sync1.saturating_add_signed(d)),
            ("sync2", |t, d| t.sync2 = t.sync2.saturating_add_signed(d)),
            ("bit0", |t, d| t.zero = t.zero.saturating_add_signed(d)),
            ("bit1", |t, d| t.one = t.one.saturating_add_signed(d)),
            ("term", |t, d| t.term = t.term.saturating_add_signed(d)),
        ];

        for (name, bend) in bends {
            for (delta, accepted) in [(tol, true), (-tol, true), (tol + 1, false), (-tol - 1, false)] {
                let mut train = nominal.clone();
                bend(&mut train, delta);
                assert_eq!(decodes(&train), accepted, "{name} off by {delta}");
            }
        }
    }

    #[test]
    fn mixed_half_pulses_are_an_error() {
        let train = Train::default();
        let mut pulses = train.pulses(&[]);
        let term = pulses.pop();
        pulses.extend([train.zero, train.one]);
        pulses.extend(term);

        let mut mic = Mic::new();
        mic.feed(&pulses);
        assert_eq!(mic.decoder.phase(), SavePhase::Error);
        assert!(mic.captured.is_empty());
    }

    #[test]
    fn mixed_halves_mid_byte_are_an_error() {
        let train = Train::default();
        let mut pulses = train.pulses(&[0x12, 0x34]);
        let term = pulses.pop();
        // Three good bits of a third byte, then a `1` half followed by a
        // `0` half.
        pulses.extend([train.zero, train.zero, train.one, train.one, train.zero, train.zero]);
        pulses.extend([train.one, train.zero]);
        pulses.extend(term);

        let mut mic = Mic::new();
        mic.feed(&pulses[..pulses.len() - 2]);
        assert_eq!(mic.decoder.phase(), SavePhase::Data);
        assert_eq!(mic.decoder.data(), &[0x12, 0x34]);
        assert_eq!(mic.decoder.bit_offset(), 3);
        assert_eq!(mic.decoder.prev_data_pulse(), Some(MicPulse::Bit1));

        mic.feed(&pulses[pulses.len() - 2..]);
        assert_eq!(mic.decoder.phase(), SavePhase::Error);
        assert!(mic.captured.is_empty());
    }

    #[test]
    fn widest_tolerance_keeps_sync_pulses_apart() {
        let config = TapeConfig {
            pulse_tolerance: PulseTimings::STANDARD.max_tolerance(),
            min_pilot_pulses: 3,
            ..TapeConfig::default()
        };
        let tol = u64::from(config.pulse_tolerance);
        let train = Train {
            pilot_count: 4,
            sync1: u64::from(SYNC_1_PL) + tol,
            sync2: u64::from(SYNC_2_PL) - tol,
            ..Train::default()
        };
        let pulses = train.pulses(&[0xA5]);

        let mut mic = Mic::with_config(&config);
        mic.feed(&pulses[..6]);
        assert_eq!(mic.decoder.phase(), SavePhase::Sync2);
        mic.feed(&pulses[6..]);
        assert_eq!(mic.captured.len(), 1);
        assert_eq!(mic.captured[0].block.payload(), &[0xA5]);
    }

    #[test]
    fn overlapping_tolerance_is_narrowed() {
        let config = TapeConfig {
            pulse_tolerance: 40,
            min_pilot_pulses: 3,
            ..TapeConfig::default()
        };
        let mut mic = Mic::with_config(&config);
        assert_eq!(mic.decoder.tolerance(), 33);

        let pilot = u64::from(PILOT_PL);
        mic.feed(&[pilot, pilot, pilot, pilot, u64::from(SYNC_1_PL), 735 - 33]);
        assert_eq!(mic.decoder.phase(), SavePhase::Sync2);
    }

    #[test]
    fn oversized_block_is_dropped() {
        let train = Train {
            pilot_count: 3,
            ..Train::default()
        };
        let config = TapeConfig {
            min_pilot_pulses: 3,
            ..TapeConfig::default()
        };
        let full = vec![0u8; MAX_BLOCK_LEN];
        let mut pulses = train.pulses(&full);
        pulses.pop();

        let mut mic = Mic::with_config(&config);
        mic.feed(&pulses);
        assert_eq!(mic.decoder.phase(), SavePhase::Data);
        assert_eq!(mic.decoder.data().len(), MAX_BLOCK_LEN);

        mic.feed(&[train.zero; 16]);
        assert_eq!(mic.decoder.phase(), SavePhase::Error);
        assert!(mic.decoder.data().is_empty());
        mic.feed(&[train.term]);
        assert!(mic.captured.is_empty());
    }

    #[test]
    fn short_pilot_rejects_sync() {
        let train = Train {
            pilot_count: MIN_PILOT_PULSE_COUNT - 1,
            ..Train::default()
        };
        let mut mic = Mic::new();
        mic.feed(&train.pulses(&[0x00]));
        assert_eq!(mic.decoder.phase(), SavePhase::Error);
    }

    #[test]
    fn terminator_mid_byte_is_an_error() {
        let train = Train::default();
        let mut pulses = train.pulses(&[]);
        let term = pulses.pop();
        pulses.extend([train.one, train.one]);
        pulses.extend(term);

        let mut mic = Mic::new();
        mic.feed(&pulses);
        assert_eq!(mic.decoder.phase(), SavePhase::Error);
    }

    #[test]
    fn error_sticks() {
        let mut mic = Mic::new();
        mic.feed(&[1200]);
        assert_eq!(mic.decoder.phase(), SavePhase::Error);
        mic.feed(&Train::default().pulses(&[0x01]));
        assert_eq!(mic.decoder.phase(), SavePhase::Error);
        assert!(mic.captured.is_empty());
        assert!(mic.decoder.data().is_empty());
    }

    #[test]
    fn unchanged_level_is_ignored() {
        let mut decoder = CaptureDecoder::new(&TapeConfig::default(), START);
        assert!(decoder.on_edge(START + 2168, true).is_none());
        assert_eq!(decoder.last_edge_tact(), START);
        assert!(decoder.on_edge(START + 2168, false).is_none());
        assert_eq!(decoder.phase(), SavePhase::Pilot);
        assert_eq!(decoder.last_edge_tact(), START + 2168);
    }

    #[test]
    fn silence_after_threshold() {
        let config = TapeConfig::default();
        let decoder = CaptureDecoder::new(&config, START);
        assert!(!decoder.is_silent(START + config.silence_threshold));
        assert!(decoder.is_silent(START + config.silence_threshold + 1));
        // Time before the last edge never counts as silence.
        assert!(!decoder.is_silent(0));
    }
}
