//! Rayon-parallel voting (feature-gated).
//!
//! Votes scatter to arbitrary accumulator cells, so rows cannot write into a
//! shared grid. Each worker folds its rows into a private vote buffer and the
//! buffers are summed at the end, which reproduces the sequential result
//! exactly.

use crate::code::Code;
use crate::image::ImageView;
use crate::table::LookupTable;
use crate::vote::scalar::vote_row;
use crate::vote::{visit_ranges, Accumulator, VoteMode};
use rayon::prelude::*;

/// Row-parallel counterpart of the sequential accumulation.
pub(crate) fn accumulate_par<C: Code>(
    scene: ImageView<'_, C>,
    table: &LookupTable,
    mode: VoteMode,
    step: usize,
) -> Accumulator {
    let width = scene.width();
    let height = scene.height();
    let len = width * height;
    let (rows, cols) = visit_ranges(mode, width, height, table);
    let visited: Vec<usize> = rows.step_by(step).collect();

    let votes = visited
        .into_par_iter()
        .fold(
            || vec![0u32; len],
            |mut votes, y| {
                if let Some(row) = scene.row(y) {
                    vote_row(row, y, cols.clone(), step, table, mode, &mut votes, width, height);
                }
                votes
            },
        )
        .reduce(
            || vec![0u32; len],
            |mut lhs, rhs| {
                for (a, b) in lhs.iter_mut().zip(rhs) {
                    *a = a.saturating_add(b);
                }
                lhs
            },
        );

    Accumulator::from_votes(votes, width, height, step)
}
