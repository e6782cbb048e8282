//! Match location on top of the voting transform.
//!
//! [`locate`] turns one accumulator into a [`Match`]; [`Matcher`] owns the
//! current lookup table and supports swapping it between frames.

pub(crate) mod locate;
mod matcher;

pub use locate::{confidence, locate};
pub use matcher::{Matcher, MatcherConfig};

/// Best template placement found in one accumulator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// Column of the presumed template center.
    pub x: usize,
    /// Row of the presumed template center.
    pub y: usize,
    /// Raw vote count at the peak.
    pub votes: u32,
    /// Step-compensated votes over the table's ideal total. An exact,
    /// fully visible copy of the template scores 1.0 at step 1; stepped
    /// passes only approximate it and may land slightly above 1.0.
    pub confidence: f32,
    /// Sampling step of the voting pass.
    pub step: usize,
}

/// Axis-aligned box in scene coordinates; the corner may be negative when
/// the match sits near the top-left edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i64,
    pub y: i64,
    pub width: usize,
    pub height: usize,
}

impl Match {
    /// Box of the template footprint centered on this match.
    pub fn bbox(&self, footprint: (usize, usize)) -> BoundingBox {
        let (width, height) = footprint;
        BoundingBox {
            x: self.x as i64 - (width / 2) as i64,
            y: self.y as i64 - (height / 2) as i64,
            width,
            height,
        }
    }

    /// True if the confidence reaches `min_confidence`.
    pub fn is_accepted(&self, min_confidence: f32) -> bool {
        self.confidence >= min_confidence
    }
}
