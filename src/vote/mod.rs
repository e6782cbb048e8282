//! Generalized Hough voting.
//!
//! Every visited scene pixel looks up the table entry of its code and adds
//! each stored weight at `pixel + offset`. The result is a dense
//! [`Accumulator`] the size of the scene whose maxima mark likely template
//! centers.
//!
//! Two visitation policies are supported:
//! - [`VoteMode::AllPixels`] visits every pixel except the outermost ring and
//!   drops votes that land outside the frame.
//! - [`VoteMode::Bounded`] visits only pixels at least half the template
//!   footprint away from each border, so every vote lands in the frame. Shapes
//!   centered near the edge are never found in this mode.
//!
//! A `step` larger than 1 samples every `step`-th row and column. Raw vote
//! counts shrink by roughly `step²`; the accumulator records its step so that
//! [`crate::locate`] can compensate.

pub(crate) mod scalar;

#[cfg(feature = "rayon")]
pub(crate) mod rayon;

use std::ops::Range;

use crate::code::Code;
use crate::image::{ImageView, OwnedImage};
use crate::table::LookupTable;
use crate::trace::{trace_debug, trace_span};
use crate::util::{GhMatchError, GhMatchResult};

/// Which scene pixels cast votes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoteMode {
    /// Only pixels whose every vote is guaranteed to land in the frame.
    Bounded,
    /// All pixels except the 1-pixel border; out-of-frame votes are dropped.
    #[default]
    AllPixels,
}

/// Voting configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteConfig {
    /// Row and column sampling stride (at least 1).
    pub step: usize,
    /// Pixel visitation policy.
    pub mode: VoteMode,
    /// Split rows across threads (requires the `rayon` feature; ignored otherwise).
    pub parallel: bool,
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            step: 1,
            mode: VoteMode::AllPixels,
            parallel: false,
        }
    }
}

impl VoteConfig {
    /// Checks that the configuration can be used for voting.
    pub fn validate(&self) -> GhMatchResult<()> {
        if self.step == 0 {
            return Err(GhMatchError::InvalidStep { step: self.step });
        }
        Ok(())
    }
}

/// Dense vote counts produced by one voting pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Accumulator {
    grid: OwnedImage<u32>,
    step: usize,
}

impl Accumulator {
    pub(crate) fn zeros(width: usize, height: usize, step: usize) -> Self {
        // Dimensions come from an already validated view.
        let grid = OwnedImage::from_parts(vec![0; width * height], width, height);
        Self { grid, step }
    }

    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    pub(crate) fn from_votes(votes: Vec<u32>, width: usize, height: usize, step: usize) -> Self {
        let grid = OwnedImage::from_parts(votes, width, height);
        Self { grid, step }
    }

    /// Accumulator width (same as the scene).
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Accumulator height (same as the scene).
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Sampling step used to produce these votes.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Vote count at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        self.grid.get(x, y)
    }

    /// Row-major vote counts.
    pub fn data(&self) -> &[u32] {
        self.grid.data()
    }

    /// Borrowed view of the vote grid.
    pub fn view(&self) -> ImageView<'_, u32> {
        self.grid.view()
    }

    pub(crate) fn votes_mut(&mut self) -> &mut [u32] {
        self.grid.data_mut()
    }

    /// Sum of all votes cast.
    pub fn total(&self) -> u64 {
        self.data().iter().map(|&v| u64::from(v)).sum()
    }

    /// Returns `(x, y, votes)` of the maximum cell.
    ///
    /// Ties resolve to the first maximum in row-major order; an all-zero
    /// accumulator reports `(0, 0, 0)`.
    pub fn peak(&self) -> (usize, usize, u32) {
        let width = self.width();
        let mut best_idx = 0usize;
        let mut best = 0u32;
        for (idx, &votes) in self.data().iter().enumerate() {
            if votes > best {
                best = votes;
                best_idx = idx;
            }
        }
        (best_idx % width, best_idx / width, best)
    }

    /// Min-max normalizes the votes into an 8-bit heat map.
    pub fn to_normalized_u8(&self) -> OwnedImage<u8> {
        let (min, max) = self
            .data()
            .iter()
            .fold((u32::MAX, 0u32), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let range = max.saturating_sub(min);
        let data = self
            .data()
            .iter()
            .map(|&v| {
                if range == 0 {
                    0
                } else {
                    ((u64::from(v - min) * 255 + u64::from(range) / 2) / u64::from(range)) as u8
                }
            })
            .collect();
        OwnedImage::from_parts(data, self.width(), self.height())
    }
}

/// Row and column ranges visited for a scene of `width x height`.
pub(crate) fn visit_ranges(
    mode: VoteMode,
    width: usize,
    height: usize,
    table: &LookupTable,
) -> (Range<usize>, Range<usize>) {
    match mode {
        VoteMode::Bounded => {
            let (half_w, half_h) = (table.width() / 2, table.height() / 2);
            (
                half_h..height.saturating_sub(half_h),
                half_w..width.saturating_sub(half_w),
            )
        }
        VoteMode::AllPixels => (1..height.saturating_sub(1), 1..width.saturating_sub(1)),
    }
}

/// Applies `table` to an encoded scene and returns the vote accumulator.
///
/// The scene and table are only read; the accumulator is freshly allocated
/// for every call. Scene codes the table never saw cast no votes.
pub fn vote<C: Code>(
    scene: ImageView<'_, C>,
    table: &LookupTable,
    cfg: &VoteConfig,
) -> GhMatchResult<Accumulator> {
    cfg.validate()?;
    let _span = trace_span!(
        "vote",
        width = scene.width(),
        height = scene.height(),
        step = cfg.step,
        bounded = (cfg.mode == VoteMode::Bounded)
    )
    .entered();

    #[cfg(feature = "rayon")]
    let acc = if cfg.parallel {
        self::rayon::accumulate_par(scene, table, cfg.mode, cfg.step)
    } else {
        scalar::accumulate(scene, table, cfg.mode, cfg.step)
    };
    #[cfg(not(feature = "rayon"))]
    let acc = scalar::accumulate(scene, table, cfg.mode, cfg.step);

    trace_debug!("votes_cast", total = acc.total());
    Ok(acc)
}
