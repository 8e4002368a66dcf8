//! Tact-accurate ZX Spectrum cassette codec.
//!
//! Two directions, both driven by the CPU's cycle counter ("tacts", 3.5 MHz):
//!
//! - playback: a list of tape blocks becomes the EAR level the ROM's loader
//!   samples, pulse for pulse, so LOAD runs unmodified;
//! - capture: the MIC edges the ROM's saver produces are timed, classified
//!   and rebuilt into data blocks.
//!
//! [`TapeController`] ties the two to the program counter: it enters LOAD
//! or SAVE mode when the ROM routines are reached and drops back when they
//! finish, fail, or the tape runs out.

pub mod block;
pub mod config;
pub mod controller;
pub mod decoder;
mod error;
pub mod loopback;
pub mod player;
pub mod sequencer;
pub mod sink;
pub mod tap;
pub mod timing;

pub use block::{DataBlock, PilotTone, TapeBlock};
pub use config::TapeConfig;
pub use controller::{ModeEvent, TapeController, TapeMode};
pub use decoder::{CaptureDecoder, CapturedBlock, MicPulse, SavePhase};
pub use error::TapeError;
pub use loopback::{Replay, replay};
pub use player::{BlockPlayer, DataBlockPlayer, PlayPhase, PulseTrainPlayer};
pub use sequencer::TapeSequencer;
pub use sink::{MemorySink, RecordedFile, TapeSink};
pub use tap::{TapFileSink, blocks_from_tap, load_tap};
pub use timing::PulseTimings;
