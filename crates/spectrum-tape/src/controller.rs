//! Tape mode controller.
//!
//! Watches the program counter for the ROM's tape routines and switches
//! between three modes:
//!
//! - `Passive`: EAR rests high, MIC toggles are ignored.
//! - `Load`: EAR follows the inserted tape through a [`TapeSequencer`].
//! - `Save`: MIC toggles are decoded by a [`CaptureDecoder`] and completed
//!   blocks go to the attached [`TapeSink`].
//!
//! Each Load or Save session gets a fresh sequencer or decoder, dropped again
//! when the controller returns to `Passive`.

use log::{info, warn};

use crate::block::TapeBlock;
use crate::config::TapeConfig;
use crate::decoder::{CaptureDecoder, CapturedBlock, SavePhase};
use crate::error::TapeError;
use crate::sequencer::TapeSequencer;
use crate::sink::TapeSink;

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeMode {
    /// Line at rest, MIC ignored.
    Passive,
    /// Playing the inserted tape into EAR.
    Load,
    /// Recording MIC edges.
    Save,
}

/// Mode change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    EnteredLoad,
    LeftLoad,
    EnteredSave,
    LeftSave,
}

type Listener = Box<dyn FnMut(ModeEvent)>;

/// Routes EAR queries and MIC edges according to the current mode.
pub struct TapeController {
    config: TapeConfig,
    mode: TapeMode,
    tape: Option<Vec<TapeBlock>>,
    sequencer: Option<TapeSequencer>,
    decoder: Option<CaptureDecoder>,
    sink: Option<Box<dyn TapeSink>>,
    listeners: Vec<Listener>,
}

impl TapeController {
    /// A passive controller with no tape, sink or listeners.
    #[must_use]
    pub fn new(config: TapeConfig) -> Self {
        Self {
            config,
            mode: TapeMode::Passive,
            tape: None,
            sequencer: None,
            decoder: None,
            sink: None,
            listeners: Vec::new(),
        }
    }

    /// Insert a tape. It plays from the start each time LOAD is entered.
    pub fn insert_tape(&mut self, blocks: Vec<TapeBlock>) {
        self.tape = Some(blocks);
    }

    /// Remove the tape. A running LOAD keeps its sequencer until it ends.
    pub fn eject_tape(&mut self) {
        self.tape = None;
    }

    /// Attach the sink SAVE sessions record into.
    pub fn set_sink(&mut self, sink: Box<dyn TapeSink>) {
        self.sink = Some(sink);
    }

    /// Detach and return the sink.
    pub fn take_sink(&mut self) -> Option<Box<dyn TapeSink>> {
        self.sink.take()
    }

    /// Call `listener` on every mode change, in registration order.
    pub fn add_listener(&mut self, listener: impl FnMut(ModeEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Called before each instruction fetch at `pc`.
    pub fn on_fetch(&mut self, pc: u16, tact: u64) {
        match self.mode {
            TapeMode::Passive => {
                if pc == self.config.load_address {
                    self.enter_load(tact);
                } else if pc == self.config.save_address {
                    self.enter_save(tact);
                }
            }
            TapeMode::Load => {
                let at_end = self.sequencer.as_ref().is_none_or(TapeSequencer::eof);
                if pc == self.config.error_address || at_end {
                    self.leave_load(tact);
                }
            }
            TapeMode::Save => {
                let silent = self.decoder.as_ref().is_none_or(|d| d.is_silent(tact));
                if pc == self.config.error_address || silent {
                    self.leave_save(tact);
                }
            }
        }
    }

    /// EAR level at `tact`.
    pub fn get_ear_bit(&mut self, tact: u64) -> bool {
        match (&self.mode, self.sequencer.as_mut()) {
            (TapeMode::Load, Some(sequencer)) => sequencer.get_ear_bit(tact),
            _ => true,
        }
    }

    /// Called whenever the CPU changes the MIC output.
    pub fn on_mic_toggle(&mut self, tact: u64, level: bool) {
        if self.mode != TapeMode::Save {
            return;
        }
        let Some(decoder) = self.decoder.as_mut() else {
            return;
        };

        let captured = decoder.on_edge(tact, level);
        let failed = decoder.phase() == SavePhase::Error;
        if let Some(captured) = captured {
            self.store(&captured);
        }
        if failed {
            self.leave_save(tact);
        }
    }

    /// Drop back to `Passive`, ending any session as if it had been cut
    /// short.
    pub fn reset(&mut self, tact: u64) {
        match self.mode {
            TapeMode::Passive => {}
            TapeMode::Load => self.leave_load(tact),
            TapeMode::Save => self.leave_save(tact),
        }
    }

    fn enter_load(&mut self, tact: u64) {
        self.sequencer = self.tape.as_ref().map(|blocks| {
            let mut sequencer = TapeSequencer::new(blocks.clone(), self.config.tacts_per_ms());
            sequencer.init_play(tact);
            sequencer
        });
        info!(
            "tape: LOAD at tact {tact} ({} blocks)",
            self.tape.as_ref().map_or(0, Vec::len)
        );
        self.mode = TapeMode::Load;
        self.emit(ModeEvent::EnteredLoad);
    }

    fn leave_load(&mut self, tact: u64) {
        info!("tape: LOAD finished at tact {tact}");
        self.sequencer = None;
        self.mode = TapeMode::Passive;
        self.emit(ModeEvent::LeftLoad);
    }

    fn enter_save(&mut self, tact: u64) {
        info!("tape: SAVE at tact {tact}");
        self.decoder = Some(CaptureDecoder::new(&self.config, tact));
        self.with_sink(|sink| sink.create_file());
        self.mode = TapeMode::Save;
        self.emit(ModeEvent::EnteredSave);
    }

    fn leave_save(&mut self, tact: u64) {
        let blocks = self.decoder.as_ref().map_or(0, CaptureDecoder::block_count);
        info!("tape: SAVE finished at tact {tact}, {blocks} blocks recorded");
        self.decoder = None;
        self.with_sink(|sink| sink.finalize());
        self.mode = TapeMode::Passive;
        self.emit(ModeEvent::LeftSave);
    }

    fn store(&mut self, captured: &CapturedBlock) {
        if let Some(name) = &captured.suggested_name {
            self.with_sink(|sink| sink.set_name(name));
        }
        self.with_sink(|sink| sink.append_block(&captured.block));
    }

    fn with_sink(&mut self, op: impl FnOnce(&mut dyn TapeSink) -> Result<(), TapeError>) {
        let Some(sink) = self.sink.as_deref_mut() else {
            return;
        };
        if let Err(err) = op(sink) {
            warn!("tape: sink failed: {err}");
        }
    }

    fn emit(&mut self, event: ModeEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> TapeMode {
        self.mode
    }

    /// Settings the controller was built with.
    #[must_use]
    pub fn config(&self) -> &TapeConfig {
        &self.config
    }

    /// The Load session's sequencer.
    #[must_use]
    pub fn sequencer(&self) -> Option<&TapeSequencer> {
        self.sequencer.as_ref()
    }

    /// The Save session's decoder.
    #[must_use]
    pub fn decoder(&self) -> Option<&CaptureDecoder> {
        self.decoder.as_ref()
    }
}
