//! Peak location and confidence scoring.

use crate::search::Match;
use crate::table::LookupTable;
use crate::trace::trace_debug;
use crate::vote::Accumulator;

/// Converts a peak vote count into a confidence score.
///
/// The raw count is scaled by `step²` to undo sub-sampling and divided by
/// the table's ideal vote total. A vacuous table (ideal of zero) scores 0.
pub fn confidence(votes: u32, step: usize, ideal_votes: u32) -> f32 {
    if ideal_votes == 0 {
        return 0.0;
    }
    let step = step as f64;
    (f64::from(votes) * step * step / f64::from(ideal_votes)) as f32
}

/// Finds the accumulator maximum and scores it against `table`.
///
/// Ties resolve to the first maximum in row-major order (smallest `y`, then
/// smallest `x`). An accumulator without votes locates `(0, 0)` with zero
/// confidence.
pub fn locate(acc: &Accumulator, table: &LookupTable) -> Match {
    let (x, y, votes) = acc.peak();
    let confidence = confidence(votes, acc.step(), table.ideal_votes());
    trace_debug!("peak", x = x, y = y, votes = votes, confidence = confidence);
    Match {
        x,
        y,
        votes,
        confidence,
        step: acc.step(),
    }
}
