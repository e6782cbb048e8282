//! GhMatch locates a reference shape in encoded orientation images with a
//! Generalized Hough Transform.
//!
//! A template whose pixels carry quantized gradient-orientation codes is
//! compiled into a [`LookupTable`] mapping each code to the offsets toward the
//! template center. Voting a scene against the table fills an
//! [`Accumulator`]; its maximum is the most likely template center and
//! [`locate`] scores it against the table's ideal vote total. [`Matcher`]
//! wraps the per-frame pipeline and lets the table be rebuilt between frames.
//!
//! Computing codes from raw pixels is left to the caller. Code 0 marks pixels
//! without a usable gradient. Row-parallel voting is available with the
//! `rayon` feature.

pub mod code;
pub mod image;
pub mod search;
pub mod table;
mod trace;
pub mod util;
pub mod vote;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use code::Code;
pub use crate::image::{ImageView, OwnedImage};
pub use search::{confidence, locate, BoundingBox, Match, Matcher, MatcherConfig};
pub use table::{BuildConfig, IdealVotes, LookupTable, OffsetVote, TableBuilder, TableStrategy};
pub use util::{GhMatchError, GhMatchResult};
pub use vote::{vote, Accumulator, VoteConfig, VoteMode};
