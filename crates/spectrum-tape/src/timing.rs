//! Standard ROM tape timing, in CPU T-states ("tacts") at 3.5 MHz.
//!
//! These are the pulse lengths the 48K ROM's SA-BYTES routine produces and
//! LD-BYTES expects. Every data bit is two equal half-pulses, so a `1` bit
//! lasts 2 x 1710 tacts and a `0` bit 2 x 855.

/// Pilot pulse length.
pub const PILOT_PL: u16 = 2168;

/// Pilot pulses ahead of a header block (flag bit 7 clear).
pub const HEADER_PILOT_COUNT: u16 = 8063;

/// Pilot pulses ahead of a data block (flag bit 7 set).
pub const DATA_PILOT_COUNT: u16 = 3223;

/// First sync pulse length.
pub const SYNC_1_PL: u16 = 667;

/// Second sync pulse length.
pub const SYNC_2_PL: u16 = 735;

/// Half-pulse length of a `0` bit.
pub const BIT_0_PL: u16 = 855;

/// Half-pulse length of a `1` bit.
pub const BIT_1_PL: u16 = 1710;

/// Terminating sync pulse after the last data bit.
pub const TERM_SYNC: u16 = 947;

/// Tacts in one millisecond at 3.5 MHz.
pub const TACTS_PER_MS: u32 = 3500;

/// CPU clock the constants above are measured against.
pub const CPU_CLOCK_HZ: u32 = 3_500_000;

/// Allowed deviation of a recorded pulse from its nominal length.
pub const SAVE_PULSE_TOLERANCE: u16 = 24;

/// Pilot pulses that must be seen before SYNC1 is accepted.
pub const MIN_PILOT_PULSE_COUNT: u32 = 3000;

/// MIC silence after which SAVE mode ends on its own (5 seconds).
pub const SAVE_STOP_SILENCE: u64 = 17_500_000;

/// Pulse lengths used to render one data block.
///
/// Standard blocks use the ROM values; turbo blocks carry their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTimings {
    pub pilot: u16,
    pub sync1: u16,
    pub sync2: u16,
    pub zero: u16,
    pub one: u16,
    pub term_sync: u16,
}

impl PulseTimings {
    /// The 48K ROM's SA-BYTES lengths.
    pub const STANDARD: Self = Self {
        pilot: PILOT_PL,
        sync1: SYNC_1_PL,
        sync2: SYNC_2_PL,
        zero: BIT_0_PL,
        one: BIT_1_PL,
        term_sync: TERM_SYNC,
    };

    /// Widest tolerance that keeps every pulse's acceptance window apart
    /// from its neighbours'.
    #[must_use]
    pub fn max_tolerance(&self) -> u16 {
        let lengths = [
            self.pilot,
            self.sync1,
            self.sync2,
            self.zero,
            self.one,
            self.term_sync,
        ];
        let closest = lengths
            .iter()
            .enumerate()
            .flat_map(|(i, a)| lengths[i + 1..].iter().map(move |b| a.abs_diff(*b)))
            .min()
            .unwrap_or(u16::MAX);
        closest.saturating_sub(1) / 2
    }

    /// Half-pulse length for a data bit.
    #[must_use]
    pub const fn bit(&self, one: bool) -> u16 {
        if one { self.one } else { self.zero }
    }
}

impl Default for PulseTimings {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Convert milliseconds to tacts.
#[must_use]
pub const fn ms_to_tacts(ms: u16, tacts_per_ms: u32) -> u64 {
    ms as u64 * tacts_per_ms as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rom_windows_stay_apart_up_to_33_tacts() {
        // sync1 and sync2 are the closest pair, 68 tacts apart.
        assert_eq!(PulseTimings::STANDARD.max_tolerance(), 33);
    }

    #[test]
    fn millisecond_matches_the_clock() {
        assert_eq!(u64::from(CPU_CLOCK_HZ) / 1000, u64::from(TACTS_PER_MS));
        assert_eq!(ms_to_tacts(2, TACTS_PER_MS), 7000);
    }
}
