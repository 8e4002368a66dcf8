//! Block playback: converts one tape block into a tact-indexed EAR level.
//!
//! A player is asked for the level at non-decreasing tacts. It keeps the
//! boundary of the sub-unit it is currently inside (one pilot pulse, a sync
//! pulse, one half of a data bit, the terminator, the pause) and walks
//! forward through the block as the queried tact passes each boundary.
//! Queries that go backwards are clamped to the last tact asked for; to play
//! a block again, build a new player.

use std::sync::Arc;

use crate::block::{DataBlock, TapeBlock};
use crate::timing::{PulseTimings, ms_to_tacts};

// ---------------------------------------------------------------------------
// Play phase
// ---------------------------------------------------------------------------

/// Where a block's playback is. Ordered: phases only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlayPhase {
    /// Not queried yet.
    None,
    /// Pilot tone.
    Pilot,
    /// Either of the two sync pulses.
    Sync,
    /// Data bits, or the pulses of a pulse train.
    Data,
    /// Terminating sync pulse.
    TermSync,
    /// Resting high after the last pulse.
    Pause,
    /// Finished. Data blocks rest high from here on; pulse trains keep
    /// their final level.
    Completed,
}

// ---------------------------------------------------------------------------
// Data block player
// ---------------------------------------------------------------------------

/// The sub-unit of a data block that is currently on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    /// `remaining` counts this pulse too; the last pilot pulse is high.
    Pilot { remaining: u16 },
    Sync1,
    Sync2,
    Bit { second_half: bool },
    TermSync,
    Pause,
    Done,
}

impl Unit {
    fn level(self, remaining_is_odd: bool) -> bool {
        match self {
            Unit::Pilot { .. } => remaining_is_odd,
            Unit::Sync1 | Unit::TermSync => false,
            Unit::Bit { second_half } => second_half,
            Unit::Sync2 | Unit::Pause | Unit::Done => true,
        }
    }

    fn phase(self) -> PlayPhase {
        match self {
            Unit::Pilot { .. } => PlayPhase::Pilot,
            Unit::Sync1 | Unit::Sync2 => PlayPhase::Sync,
            Unit::Bit { .. } => PlayPhase::Data,
            Unit::TermSync => PlayPhase::TermSync,
            Unit::Pause => PlayPhase::Pause,
            Unit::Done => PlayPhase::Completed,
        }
    }
}

/// Plays one data block: pilot, sync1, sync2, data bits, terminator, pause.
///
/// Each data bit is two equal half-pulses (low, then high) whose length
/// depends on the bit; bytes are sent MSB first.
///
/// The last pilot pulse is always high. When the line is already low as the
/// block starts (a terminator with no pause after it) and the pilot would
/// open low too, one extra pilot pulse is played first so the block opens
/// with an edge.
#[derive(Debug, Clone)]
pub struct DataBlockPlayer {
    payload: Arc<[u8]>,
    timings: PulseTimings,
    pilot_pulses: u16,
    pause_tacts: u64,
    entry_level: bool,
    phase: PlayPhase,
    unit: Unit,
    unit_end: u64,
    level: bool,
    start_tact: u64,
    last_tact: u64,
    end_tact: Option<u64>,
    byte_index: usize,
    bit_mask: u8,
}

impl DataBlockPlayer {
    /// Prepare `block` to start playing at `start_tact` on a line resting
    /// high.
    #[must_use]
    pub fn new(block: &DataBlock, tacts_per_ms: u32, start_tact: u64) -> Self {
        Self {
            payload: block.shared_payload(),
            timings: *block.timings(),
            pilot_pulses: block.pilot_pulses(),
            pause_tacts: ms_to_tacts(block.pause_after_ms(), tacts_per_ms),
            entry_level: true,
            phase: PlayPhase::None,
            unit: Unit::Done,
            unit_end: start_tact,
            level: true,
            start_tact,
            last_tact: start_tact,
            end_tact: None,
            byte_index: 0,
            bit_mask: 0x80,
        }
    }

    /// Level of the pulse on the line just before the block starts.
    #[must_use]
    pub fn with_entry_level(mut self, level: bool) -> Self {
        self.entry_level = level;
        self
    }

    /// EAR level at `tact`.
    pub fn signal_at(&mut self, tact: u64) -> bool {
        let tact = tact.max(self.last_tact);
        self.last_tact = tact;

        if self.phase == PlayPhase::None {
            let mut pilot = self.pilot_pulses;
            // An even count (or none) opens low.
            if !self.entry_level && pilot % 2 == 0 {
                pilot += 1;
            }
            let first = if pilot > 0 {
                Unit::Pilot { remaining: pilot }
            } else {
                Unit::Sync1
            };
            self.enter(first, self.start_tact);
        }

        while self.unit != Unit::Done && tact >= self.unit_end {
            let boundary = self.unit_end;
            let next = self.next_unit();
            self.enter(next, boundary);
        }
        self.level
    }

    fn next_unit(&mut self) -> Unit {
        match self.unit {
            Unit::Pilot { remaining } if remaining > 1 => Unit::Pilot {
                remaining: remaining - 1,
            },
            Unit::Pilot { .. } => Unit::Sync1,
            Unit::Sync1 => Unit::Sync2,
            Unit::Sync2 if self.payload.is_empty() => Unit::TermSync,
            Unit::Sync2 => Unit::Bit { second_half: false },
            Unit::Bit { second_half: false } => Unit::Bit { second_half: true },
            Unit::Bit { second_half: true } => {
                self.bit_mask >>= 1;
                if self.bit_mask == 0 {
                    self.bit_mask = 0x80;
                    self.byte_index += 1;
                }
                if self.byte_index < self.payload.len() {
                    Unit::Bit { second_half: false }
                } else {
                    Unit::TermSync
                }
            }
            Unit::TermSync if self.pause_tacts > 0 => Unit::Pause,
            Unit::TermSync | Unit::Pause | Unit::Done => Unit::Done,
        }
    }

    fn enter(&mut self, unit: Unit, start: u64) {
        let length = match unit {
            Unit::Pilot { .. } => u64::from(self.timings.pilot),
            Unit::Sync1 => u64::from(self.timings.sync1),
            Unit::Sync2 => u64::from(self.timings.sync2),
            Unit::Bit { .. } => u64::from(self.timings.bit(self.current_bit())),
            Unit::TermSync => u64::from(self.timings.term_sync),
            Unit::Pause => self.pause_tacts,
            Unit::Done => {
                self.end_tact = Some(start);
                0
            }
        };
        let odd = matches!(unit, Unit::Pilot { remaining } if remaining % 2 == 1);
        self.unit = unit;
        self.unit_end = start + length;
        self.level = unit.level(odd);
        self.phase = unit.phase();
    }

    fn current_bit(&self) -> bool {
        self.payload
            .get(self.byte_index)
            .is_some_and(|&byte| byte & self.bit_mask != 0)
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> PlayPhase {
        self.phase
    }

    /// Tact the block started at.
    #[must_use]
    pub fn start_tact(&self) -> u64 {
        self.start_tact
    }

    /// Latest tact the player was queried at.
    #[must_use]
    pub fn last_tact(&self) -> u64 {
        self.last_tact
    }

    /// Tact at which the block finished (end of its pause), once known.
    #[must_use]
    pub fn end_tact(&self) -> Option<u64> {
        self.end_tact
    }

    /// Level of the last sub-unit before the block finished: high after a
    /// pause, low after a bare terminator.
    #[must_use]
    pub fn exit_level(&self) -> bool {
        self.pause_tacts > 0
    }

    /// Tact of the next sub-unit boundary, where the level may change.
    /// `None` once the block has finished.
    #[must_use]
    pub fn next_boundary(&self) -> Option<u64> {
        (self.phase != PlayPhase::Completed).then_some(self.unit_end)
    }

    /// Index of the byte being played.
    #[must_use]
    pub fn byte_index(&self) -> usize {
        self.byte_index
    }

    /// Mask of the bit being played within the current byte.
    #[must_use]
    pub fn bit_mask(&self) -> u8 {
        self.bit_mask
    }
}

// ---------------------------------------------------------------------------
// Pulse trains
// ---------------------------------------------------------------------------

/// Produces the pulse lengths of a non-ROM block one at a time.
#[derive(Debug, Clone)]
enum PulseSource {
    Tone {
        pulse_len: u16,
        remaining: u16,
    },
    Sequence {
        pulses: Vec<u16>,
        index: usize,
    },
    Bits {
        zero_pulse: u16,
        one_pulse: u16,
        used_bits: u8,
        data: Arc<[u8]>,
        byte_index: usize,
        bit: u8,
        second_half: bool,
    },
    Empty,
}

impl PulseSource {
    fn next_pulse(&mut self) -> Option<u16> {
        match self {
            PulseSource::Tone {
                pulse_len,
                remaining,
            } => {
                if *remaining == 0 {
                    return None;
                }
                *remaining -= 1;
                Some(*pulse_len)
            }
            PulseSource::Sequence { pulses, index } => {
                let pulse = pulses.get(*index).copied()?;
                *index += 1;
                Some(pulse)
            }
            PulseSource::Bits {
                zero_pulse,
                one_pulse,
                used_bits,
                data,
                byte_index,
                bit,
                second_half,
            } => {
                let byte = *data.get(*byte_index)?;
                let pulse = if byte & (0x80 >> *bit) != 0 {
                    *one_pulse
                } else {
                    *zero_pulse
                };
                if *second_half {
                    *second_half = false;
                    *bit += 1;
                    let bits_in_byte = if *byte_index + 1 == data.len() {
                        *used_bits
                    } else {
                        8
                    };
                    if *bit >= bits_in_byte {
                        *bit = 0;
                        *byte_index += 1;
                    }
                } else {
                    *second_half = true;
                }
                Some(pulse)
            }
            PulseSource::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrainState {
    Idle,
    Pulse,
    Pause,
    Done,
}

/// Plays pure tones, pulse sequences, pure data, pauses and descriptions.
///
/// Every pulse flips the line at its start, beginning from the level the
/// previous block left behind. After the last pulse the line rests high for
/// the trailing pause, if any; without one it stays where the last pulse
/// left it, so consecutive trains chain like a single recording.
#[derive(Debug, Clone)]
pub struct PulseTrainPlayer {
    source: PulseSource,
    pause_tacts: u64,
    state: TrainState,
    level: bool,
    unit_end: u64,
    start_tact: u64,
    last_tact: u64,
    end_tact: Option<u64>,
}

impl PulseTrainPlayer {
    fn with_source(
        source: PulseSource,
        pause_tacts: u64,
        start_tact: u64,
        entry_level: bool,
    ) -> Self {
        Self {
            source,
            pause_tacts,
            state: TrainState::Idle,
            level: entry_level,
            unit_end: start_tact,
            start_tact,
            last_tact: start_tact,
            end_tact: None,
        }
    }

    /// `count` pulses of `pulse_len` tacts.
    #[must_use]
    pub fn tone(pulse_len: u16, count: u16, start_tact: u64, entry_level: bool) -> Self {
        let source = PulseSource::Tone {
            pulse_len,
            remaining: count,
        };
        Self::with_source(source, 0, start_tact, entry_level)
    }

    /// One pulse per entry of `pulses`.
    #[must_use]
    pub fn sequence(pulses: Vec<u16>, start_tact: u64, entry_level: bool) -> Self {
        let source = PulseSource::Sequence { pulses, index: 0 };
        Self::with_source(source, 0, start_tact, entry_level)
    }

    /// Two half-pulses per data bit, MSB first, then `pause_tacts` of rest.
    #[must_use]
    pub fn data(
        zero_pulse: u16,
        one_pulse: u16,
        used_bits: u8,
        data: Arc<[u8]>,
        pause_tacts: u64,
        start_tact: u64,
        entry_level: bool,
    ) -> Self {
        let used_bits = if used_bits == 0 { 8 } else { used_bits.min(8) };
        let source = PulseSource::Bits {
            zero_pulse,
            one_pulse,
            used_bits,
            data,
            byte_index: 0,
            bit: 0,
            second_half: false,
        };
        Self::with_source(source, pause_tacts, start_tact, entry_level)
    }

    /// Resting level for `pause_tacts`; zero makes an instantaneous block
    /// that leaves the line untouched.
    #[must_use]
    pub fn silence(pause_tacts: u64, start_tact: u64, entry_level: bool) -> Self {
        Self::with_source(PulseSource::Empty, pause_tacts, start_tact, entry_level)
    }

    /// EAR level at `tact`.
    pub fn signal_at(&mut self, tact: u64) -> bool {
        let tact = tact.max(self.last_tact);
        self.last_tact = tact;

        while self.state != TrainState::Done && tact >= self.unit_end {
            let boundary = self.unit_end;
            match self.state {
                TrainState::Idle | TrainState::Pulse => {
                    if let Some(pulse) = self.source.next_pulse() {
                        self.state = TrainState::Pulse;
                        self.level = !self.level;
                        self.unit_end = boundary + u64::from(pulse);
                    } else {
                        self.start_pause(boundary);
                    }
                }
                TrainState::Pause => self.finish(boundary),
                TrainState::Done => {}
            }
        }
        self.level
    }

    fn start_pause(&mut self, boundary: u64) {
        if self.pause_tacts == 0 {
            self.finish(boundary);
        } else {
            self.state = TrainState::Pause;
            self.level = true;
            self.unit_end = boundary + self.pause_tacts;
        }
    }

    fn finish(&mut self, boundary: u64) {
        self.state = TrainState::Done;
        self.end_tact = Some(boundary);
    }

    /// `Data` while pulses play, `Pause` while resting.
    #[must_use]
    pub fn phase(&self) -> PlayPhase {
        match self.state {
            TrainState::Idle => PlayPhase::None,
            TrainState::Pulse => PlayPhase::Data,
            TrainState::Pause => PlayPhase::Pause,
            TrainState::Done => PlayPhase::Completed,
        }
    }

    /// Tact the train started at.
    #[must_use]
    pub fn start_tact(&self) -> u64 {
        self.start_tact
    }

    /// Tact the train finished at, once known.
    #[must_use]
    pub fn end_tact(&self) -> Option<u64> {
        self.end_tact
    }

    /// Level the train leaves the line at.
    #[must_use]
    pub fn exit_level(&self) -> bool {
        self.level
    }

    /// Tact of the next pulse or pause boundary. `None` once finished.
    #[must_use]
    pub fn next_boundary(&self) -> Option<u64> {
        (self.state != TrainState::Done).then_some(self.unit_end)
    }
}

// ---------------------------------------------------------------------------
// Any block
// ---------------------------------------------------------------------------

/// Player for whichever kind of block is current.
#[derive(Debug, Clone)]
pub enum BlockPlayer {
    /// Standard and turbo data blocks.
    Data(DataBlockPlayer),
    /// Tones, sequences, pure data, pauses and descriptions.
    Train(PulseTrainPlayer),
}

impl BlockPlayer {
    /// Start `block` at `start_tact`. `entry_level` is the level of the
    /// last pulse before it; every block opens with an edge away from it.
    #[must_use]
    pub fn for_block(
        block: &TapeBlock,
        tacts_per_ms: u32,
        start_tact: u64,
        entry_level: bool,
    ) -> Self {
        match block {
            TapeBlock::StandardData(data) | TapeBlock::TurboData(data) => {
                Self::Data(
                    DataBlockPlayer::new(data, tacts_per_ms, start_tact)
                        .with_entry_level(entry_level),
                )
            }
            TapeBlock::PureTone { pulse_len, count } => Self::Train(PulseTrainPlayer::tone(
                *pulse_len,
                *count,
                start_tact,
                entry_level,
            )),
            TapeBlock::PulseSequence { pulses } => Self::Train(PulseTrainPlayer::sequence(
                pulses.clone(),
                start_tact,
                entry_level,
            )),
            TapeBlock::PureData {
                zero_pulse,
                one_pulse,
                used_bits,
                pause_ms,
                data,
            } => Self::Train(PulseTrainPlayer::data(
                *zero_pulse,
                *one_pulse,
                *used_bits,
                Arc::clone(data),
                ms_to_tacts(*pause_ms, tacts_per_ms),
                start_tact,
                entry_level,
            )),
            TapeBlock::Pause { duration_ms } => Self::Train(PulseTrainPlayer::silence(
                ms_to_tacts(*duration_ms, tacts_per_ms),
                start_tact,
                entry_level,
            )),
            TapeBlock::Description { .. } => {
                Self::Train(PulseTrainPlayer::silence(0, start_tact, entry_level))
            }
        }
    }

    /// EAR level at `tact`.
    pub fn signal_at(&mut self, tact: u64) -> bool {
        match self {
            Self::Data(player) => player.signal_at(tact),
            Self::Train(player) => player.signal_at(tact),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> PlayPhase {
        match self {
            Self::Data(player) => player.phase(),
            Self::Train(player) => player.phase(),
        }
    }

    /// Tact the block started at.
    #[must_use]
    pub fn start_tact(&self) -> u64 {
        match self {
            Self::Data(player) => player.start_tact(),
            Self::Train(player) => player.start_tact(),
        }
    }

    /// Tact the block finished at, once known.
    #[must_use]
    pub fn end_tact(&self) -> Option<u64> {
        match self {
            Self::Data(player) => player.end_tact(),
            Self::Train(player) => player.end_tact(),
        }
    }

    /// Level of the last pulse before the block finished; the next block
    /// starts from it.
    #[must_use]
    pub fn exit_level(&self) -> bool {
        match self {
            Self::Data(player) => player.exit_level(),
            Self::Train(player) => player.exit_level(),
        }
    }

    /// Tact of the next point where the level may change.
    #[must_use]
    pub fn next_boundary(&self) -> Option<u64> {
        match self {
            Self::Data(player) => player.next_boundary(),
            Self::Train(player) => player.next_boundary(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
