//! Generalized Hough lookup tables.
//!
//! A [`LookupTable`] maps every orientation code to the offsets, measured
//! from template pixels of that code toward the template's reference center,
//! at which a scene pixel of the same code should vote. Entries live in one
//! flat buffer indexed by a per-code start array, so a lookup is two array
//! reads and never hashes. Tables are immutable once built; re-templating
//! builds a new table and swaps it in whole (see [`crate::Matcher`]).

mod build;

pub use build::TableBuilder;

use crate::code::Code;
use crate::image::ImageView;

/// A center offset and the number of votes it casts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OffsetVote {
    /// Column displacement from the voting pixel to the center.
    pub dx: i32,
    /// Row displacement from the voting pixel to the center.
    pub dy: i32,
    /// Vote weight; always 1 in unweighted tables.
    pub votes: u32,
}

/// How template pixels sharing a code and offset are stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableStrategy {
    /// Deduplicate offsets per code and keep a vote weight for each.
    #[default]
    WeightedMerge,
    /// Keep one weight-1 entry per template pixel.
    UnweightedList,
}

/// Denominator used to turn peak votes into a confidence score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdealVotes {
    /// Number of non-zero template pixels.
    PixelCount,
    /// Peak of the step-1 transform of the template against its own
    /// table, with every template pixel (border included) voting.
    #[default]
    SelfMatch,
}

/// Configuration for building lookup tables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildConfig {
    /// Entry layout.
    pub strategy: TableStrategy,
    /// Normalization denominator.
    pub ideal: IdealVotes,
}

/// Code-indexed table of center offsets built from one template.
#[derive(Clone, Debug)]
pub struct LookupTable {
    offsets: Vec<OffsetVote>,
    // starts[c]..starts[c + 1] is the entry of code c
    starts: Vec<usize>,
    width: usize,
    height: usize,
    pixel_count: usize,
    ideal_votes: u32,
    strategy: TableStrategy,
}

impl LookupTable {
    /// Builds a table from an encoded template with the given configuration.
    pub fn build<C: Code>(codes: ImageView<'_, C>, cfg: &BuildConfig) -> Self {
        TableBuilder::new(cfg.clone()).build(codes)
    }

    /// Returns the offsets stored for `code`.
    ///
    /// Codes beyond the highest code seen in the template, and code 0,
    /// resolve to an empty slice.
    #[inline]
    pub fn entry(&self, code: usize) -> &[OffsetVote] {
        let Some(&end) = code.checked_add(1).and_then(|next| self.starts.get(next)) else {
            return &[];
        };
        &self.offsets[self.starts[code]..end]
    }

    /// Number of code slots (`max_code + 1`).
    pub fn num_codes(&self) -> usize {
        self.starts.len().saturating_sub(1)
    }

    /// Iterates over `(code, entry)` pairs for every slot, including empty ones.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &[OffsetVote])> + '_ {
        (0..self.num_codes()).map(move |code| (code, self.entry(code)))
    }

    /// Total number of stored offset entries across all codes.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True when no code carries any offset.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Template footprint as `(width, height)`.
    pub fn footprint(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Reference center of the template, `(width / 2, height / 2)`.
    pub fn center(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    /// Number of non-zero template pixels that contributed offsets.
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Sum of all vote weights. Equals `pixel_count` for either strategy.
    pub fn total_votes(&self) -> u64 {
        self.offsets.iter().map(|ov| u64::from(ov.votes)).sum()
    }

    /// Normalization denominator for confidence scores.
    ///
    /// Zero means the template carries no matchable information.
    pub fn ideal_votes(&self) -> u32 {
        self.ideal_votes
    }

    /// Strategy the table was built with.
    pub fn strategy(&self) -> TableStrategy {
        self.strategy
    }
}
