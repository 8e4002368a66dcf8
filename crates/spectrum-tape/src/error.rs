use std::path::PathBuf;

use format_spectrum_tap::TapError;
use thiserror::Error;

/// Errors from the fallible edges of the codec: files, images and settings.
///
/// Playback and capture themselves never fail; a bad recording shows up as
/// the capture decoder's error phase instead.
#[derive(Debug, Error)]
pub enum TapeError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TAP image: {0}")]
    Tap(#[from] TapError),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("pulse tolerance {tolerance} is above {max} tacts; pulse windows would overlap")]
    ToleranceTooWide { tolerance: u16, max: u16 },
}
