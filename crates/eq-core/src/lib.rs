//! eq-core: shared types used by the parametric EQ processing core.
//!
//! This crate provides the sample, parameter, filter-vocabulary and error
//! types that `eq-dsp` builds on. It carries no knowledge of hosting,
//! editors or persistence.

mod sample;
mod params;
mod error;
mod filter_types;

pub use sample::*;
pub use params::*;
pub use error::*;
pub use filter_types::*;

/// Standard sample rate options
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[repr(u32)]
pub enum SampleRate {
    Hz44100 = 44100,
    Hz48000 = 48000,
    Hz88200 = 88200,
    Hz96000 = 96000,
    Hz176400 = 176400,
    Hz192000 = 192000,
    Hz352800 = 352800,
    Hz384000 = 384000,
}

impl SampleRate {
    #[inline]
    pub fn as_f64(self) -> f64 {
        self as u32 as f64
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self::Hz48000
    }
}

impl SampleRate {
    /// Resolve a raw host-reported sample rate to one of the eight supported
    /// rates, failing closed rather than guessing a nearest match.
    pub fn from_u32(hz: u32) -> Result<Self, EqError> {
        match hz {
            44_100 => Ok(Self::Hz44100),
            48_000 => Ok(Self::Hz48000),
            88_200 => Ok(Self::Hz88200),
            96_000 => Ok(Self::Hz96000),
            176_400 => Ok(Self::Hz176400),
            192_000 => Ok(Self::Hz192000),
            352_800 => Ok(Self::Hz352800),
            384_000 => Ok(Self::Hz384000),
            other => Err(EqError::InvalidSampleRate(other)),
        }
    }
}

/// Buffer size options
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[repr(u32)]
pub enum BufferSize {
    Samples32 = 32,
    Samples64 = 64,
    Samples128 = 128,
    Samples256 = 256,
    Samples512 = 512,
    Samples1024 = 1024,
    Samples2048 = 2048,
    Samples4096 = 4096,
}

impl BufferSize {
    #[inline]
    pub fn as_usize(self) -> usize {
        self as u32 as usize
    }

    /// Calculate latency in milliseconds
    #[inline]
    pub fn latency_ms(self, sample_rate: SampleRate) -> f64 {
        (self.as_usize() as f64 / sample_rate.as_f64()) * 1000.0
    }
}

impl Default for BufferSize {
    fn default() -> Self {
        Self::Samples256
    }
}

/// Channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChannelConfig {
    Mono,
    Stereo,
    MidSide,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::Stereo
    }
}

/// Decibel value wrapper
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decibels(pub f64);

impl Decibels {
    pub const ZERO: Self = Self(0.0);
    pub const NEG_INF: Self = Self(f64::NEG_INFINITY);

    #[inline]
    pub fn from_gain(gain: f64) -> Self {
        if gain <= 0.0 {
            Self::NEG_INF
        } else {
            Self(20.0 * gain.log10())
        }
    }

    #[inline]
    pub fn to_gain(self) -> f64 {
        if self.0 <= -144.0 {
            0.0
        } else {
            10.0_f64.powf(self.0 / 20.0)
        }
    }
}

impl Default for Decibels {
    fn default() -> Self {
        Self::ZERO
    }
}
