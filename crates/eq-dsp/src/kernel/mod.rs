//! Time-domain realization kernels: transposed direct form (TDF, §4.3),
//! state-variable form (SVF), and the parallel peak/shelf topology.

pub mod parallel;
pub mod svf;
pub mod tdf;

pub use parallel::ParallelCascade;
pub use svf::SvfCascade;
pub use tdf::TdfCascade;

use crate::coeffs::Coeffs6;
use crate::MAX_CASCADE;

/// A fixed-capacity ordered list of biquad sections, shared by every kernel
/// as the "what to realize" half of the story (state lives in the kernel).
#[derive(Debug, Clone, Copy)]
pub struct Cascade {
    sections: [Coeffs6; MAX_CASCADE],
    count: usize,
}

impl Default for Cascade {
    fn default() -> Self {
        Self {
            sections: [crate::coeffs::PASS_THROUGH; MAX_CASCADE],
            count: 0,
        }
    }
}

impl Cascade {
    pub fn from_slice(sections: &[Coeffs6]) -> Self {
        let mut out = Self::default();
        out.count = sections.len().min(MAX_CASCADE);
        out.sections[..out.count].copy_from_slice(&sections[..out.count]);
        out
    }

    #[inline]
    pub fn as_slice(&self) -> &[Coeffs6] {
        &self.sections[..self.count]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
