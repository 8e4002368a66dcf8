//! In-memory tape blocks.
//!
//! A tape is an ordered list of [`TapeBlock`]s. Only data blocks carry the
//! ROM's pilot/sync/data/terminator structure; the other kinds are simpler
//! pulse trains or pure timing, and descriptions produce no signal at all.

use std::sync::Arc;

use crate::timing::{DATA_PILOT_COUNT, HEADER_PILOT_COUNT, PulseTimings};

/// Pilot tone class. The ROM plays a longer pilot ahead of headers so the
/// loader has time to lock on before the record it needs to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PilotTone {
    Header,
    Data,
}

impl PilotTone {
    /// Class the ROM picks from a block's flag byte (bit 7 clear = header).
    #[must_use]
    pub fn for_flag(flag: u8) -> Self {
        if flag & 0x80 == 0 {
            Self::Header
        } else {
            Self::Data
        }
    }

    /// Pilot pulses the ROM plays for this class.
    #[must_use]
    pub fn pulse_count(self) -> u16 {
        match self {
            Self::Header => HEADER_PILOT_COUNT,
            Self::Data => DATA_PILOT_COUNT,
        }
    }
}

/// One data block: the bytes between the sync pulses and the terminator,
/// plus what the signal around them looks like.
///
/// Immutable once built. The payload is shared, so handing a block to a
/// player does not copy it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBlock {
    payload: Arc<[u8]>,
    pilot: PilotTone,
    pilot_pulses: u16,
    pause_after_ms: u16,
    timings: PulseTimings,
}

impl DataBlock {
    /// A block with ROM timing whose pilot class follows its flag byte.
    ///
    /// An empty payload has no flag byte and gets the data pilot.
    #[must_use]
    pub fn standard(payload: impl Into<Arc<[u8]>>, pause_after_ms: u16) -> Self {
        let payload = payload.into();
        let pilot = payload
            .first()
            .map_or(PilotTone::Data, |&flag| PilotTone::for_flag(flag));
        Self::new(payload, pilot, pause_after_ms)
    }

    /// A block with ROM timing and an explicit pilot class.
    #[must_use]
    pub fn new(payload: impl Into<Arc<[u8]>>, pilot: PilotTone, pause_after_ms: u16) -> Self {
        Self {
            payload: payload.into(),
            pilot,
            pilot_pulses: pilot.pulse_count(),
            pause_after_ms,
            timings: PulseTimings::STANDARD,
        }
    }

    /// Override the number of pilot pulses.
    #[must_use]
    pub fn with_pilot_pulses(mut self, count: u16) -> Self {
        self.pilot_pulses = count;
        self
    }

    /// Render with custom pulse lengths (turbo loaders).
    #[must_use]
    pub fn with_timings(mut self, timings: PulseTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Flag, data and parity bytes, as recorded.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Shared handle on the payload.
    #[must_use]
    pub fn shared_payload(&self) -> Arc<[u8]> {
        Arc::clone(&self.payload)
    }

    /// Pilot class the pulse count was taken from.
    #[must_use]
    pub fn pilot(&self) -> PilotTone {
        self.pilot
    }

    /// Pilot pulses played ahead of the sync pulses.
    #[must_use]
    pub fn pilot_pulses(&self) -> u16 {
        self.pilot_pulses
    }

    /// Silence after the terminator, in milliseconds.
    #[must_use]
    pub fn pause_after_ms(&self) -> u16 {
        self.pause_after_ms
    }

    /// Pulse lengths the block is rendered with.
    #[must_use]
    pub fn timings(&self) -> &PulseTimings {
        &self.timings
    }
}

/// A block on the tape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapeBlock {
    /// ROM-timed data block.
    StandardData(DataBlock),
    /// Data block with its own pulse lengths.
    TurboData(DataBlock),
    /// `count` pulses of `pulse_len` tacts.
    PureTone { pulse_len: u16, count: u16 },
    /// Pulses of arbitrary lengths.
    PulseSequence { pulses: Vec<u16> },
    /// Data bits only, no pilot or sync. Only the top `used_bits` of the
    /// last byte are played (0 is treated as 8).
    PureData {
        zero_pulse: u16,
        one_pulse: u16,
        used_bits: u8,
        pause_ms: u16,
        data: Arc<[u8]>,
    },
    /// Silence (resting level) for a while.
    Pause { duration_ms: u16 },
    /// Text that annotates the tape; takes no time.
    Description { text: String },
}

impl TapeBlock {
    /// The data block behind a data-carrying kind.
    #[must_use]
    pub fn data_block(&self) -> Option<&DataBlock> {
        match self {
            Self::StandardData(block) | Self::TurboData(block) => Some(block),
            _ => None,
        }
    }

    /// Short label for listings and logs.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::StandardData(_) => "standard data",
            Self::TurboData(_) => "turbo data",
            Self::PureTone { .. } => "pure tone",
            Self::PulseSequence { .. } => "pulse sequence",
            Self::PureData { .. } => "pure data",
            Self::Pause { .. } => "pause",
            Self::Description { .. } => "description",
        }
    }
}

impl From<DataBlock> for TapeBlock {
    fn from(block: DataBlock) -> Self {
        if *block.timings() == PulseTimings::STANDARD {
            Self::StandardData(block)
        } else {
            Self::TurboData(block)
        }
    }
}
