//! Filter vocabulary shared between the control surface and the DSP core:
//! filter type, order, structure, band status and routing.

use serde::{Deserialize, Serialize};

/// The nine filter shapes a band can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterType {
    Peak,
    LowShelf,
    LowPass,
    HighShelf,
    HighPass,
    Notch,
    BandPass,
    TiltShelf,
    BandShelf,
}

impl FilterType {
    /// Gain is meaningful for peak/shelf/tilt types; pass/notch ignore it.
    #[inline]
    pub fn uses_gain(self) -> bool {
        matches!(
            self,
            Self::Peak | Self::LowShelf | Self::HighShelf | Self::TiltShelf | Self::BandShelf
        )
    }

    /// A band may run dynamically only for these four types.
    #[inline]
    pub fn supports_dynamic(self) -> bool {
        matches!(
            self,
            Self::Peak | Self::LowShelf | Self::HighShelf | Self::TiltShelf
        )
    }
}

/// Legal filter orders; order 1 is restricted to shelves and one-pole passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FilterOrder {
    O1 = 1,
    O2 = 2,
    O4 = 4,
    O6 = 6,
    O8 = 8,
    O12 = 12,
    O16 = 16,
}

impl FilterOrder {
    #[inline]
    pub fn as_usize(self) -> usize {
        self as u8 as usize
    }

    /// Maps a raw order byte (as stored in an `EmptyCell`) back to a legal
    /// variant, falling back to `O2` for anything that isn't one of the six
    /// cascade-representable orders.
    #[inline]
    pub fn from_u8(order: u8) -> Self {
        match order {
            1 => Self::O1,
            4 => Self::O4,
            6 => Self::O6,
            8 => Self::O8,
            12 => Self::O12,
            16 => Self::O16,
            _ => Self::O2,
        }
    }

    #[inline]
    pub fn is_legal_for(self, filter_type: FilterType) -> bool {
        if self == Self::O1 {
            matches!(
                filter_type,
                FilterType::LowShelf
                    | FilterType::HighShelf
                    | FilterType::TiltShelf
                    | FilterType::LowPass
                    | FilterType::HighPass
            )
        } else {
            true
        }
    }
}

/// Realization structure: how cascaded biquads are turned into samples,
/// plus whether/how an FFT correction pass follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterStructure {
    Minimum,
    Svf,
    Parallel,
    Matched,
    Mixed,
    Zero,
}

impl FilterStructure {
    #[inline]
    pub fn has_correction(self) -> bool {
        matches!(self, Self::Matched | Self::Mixed | Self::Zero)
    }

    #[inline]
    pub fn is_zero_latency(self) -> bool {
        matches!(self, Self::Minimum | Self::Svf | Self::Parallel)
    }
}

/// Per-band on/off/bypass state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandStatus {
    Off,
    Bypass,
    On,
}

/// Which channel group a band is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StereoMode {
    Stereo,
    Left,
    Right,
    Mid,
    Side,
}

/// Validated, host-clamped parameters for one band's static filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParameters {
    pub filter_type: FilterType,
    pub order: FilterOrder,
    pub freq: f64,
    pub gain_db: f64,
    pub q: f64,
}

impl FilterParameters {
    pub const FREQ_RANGE: (f64, f64) = (10.0, 20_000.0);
    pub const GAIN_RANGE: (f64, f64) = (-30.0, 30.0);
    pub const Q_RANGE: (f64, f64) = (0.025, 25.0);

    pub fn new(filter_type: FilterType, order: FilterOrder, freq: f64, gain_db: f64, q: f64) -> Self {
        Self {
            filter_type,
            order,
            freq: freq.clamp(Self::FREQ_RANGE.0, Self::FREQ_RANGE.1),
            gain_db: gain_db.clamp(Self::GAIN_RANGE.0, Self::GAIN_RANGE.1),
            q: q.clamp(Self::Q_RANGE.0, Self::Q_RANGE.1),
        }
    }
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            filter_type: FilterType::Peak,
            order: FilterOrder::O2,
            freq: 1000.0,
            gain_db: 0.0,
            q: 0.707,
        }
    }
}

/// Validated, host-clamped parameters for one band's dynamic side chain.
/// `relative` offsets `threshold_db` by the side signal's measured long-term
/// loudness rather than treating it as an absolute dBFS value; `learn`
/// overrides both `threshold_db` and `knee_db` with values estimated from
/// the band's decaying side-level histograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicParameters {
    pub threshold_db: f64,
    pub knee_db: f64,
    pub attack_ms: f64,
    pub release_ms: f64,
    pub relative: bool,
    pub learn: bool,
}

impl DynamicParameters {
    pub const THRESHOLD_RANGE: (f64, f64) = (-80.0, 0.0);
    pub const KNEE_RANGE: (f64, f64) = (0.0, 32.0);
    pub const ATTACK_RANGE: (f64, f64) = (1.0, 1000.0);
    pub const RELEASE_RANGE: (f64, f64) = (1.0, 5000.0);

    pub fn new(
        threshold_db: f64,
        knee_db: f64,
        attack_ms: f64,
        release_ms: f64,
        relative: bool,
        learn: bool,
    ) -> Self {
        Self {
            threshold_db: threshold_db.clamp(Self::THRESHOLD_RANGE.0, Self::THRESHOLD_RANGE.1),
            knee_db: knee_db.clamp(Self::KNEE_RANGE.0, Self::KNEE_RANGE.1),
            attack_ms: attack_ms.clamp(Self::ATTACK_RANGE.0, Self::ATTACK_RANGE.1),
            release_ms: release_ms.clamp(Self::RELEASE_RANGE.0, Self::RELEASE_RANGE.1),
            relative,
            learn,
        }
    }
}

impl Default for DynamicParameters {
    fn default() -> Self {
        Self {
            threshold_db: -18.0,
            knee_db: 6.0,
            attack_ms: 10.0,
            release_ms: 100.0,
            relative: false,
            learn: false,
        }
    }
}
