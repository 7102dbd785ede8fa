//! Error types for the equalizer core.
//!
//! The per-block audio path is infallible by contract (see C16 Controller);
//! these variants cover setup-time failures only.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EqError {
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("block of {requested} samples exceeds the prepared maximum of {max}")]
    BlockTooLarge { requested: usize, max: usize },

    #[error("band index {0} out of range")]
    InvalidBand(usize),
}

pub type EqResult<T> = Result<T, EqError>;
