//! Sequential voting kernel.

use std::ops::Range;

use crate::code::Code;
use crate::image::ImageView;
use crate::table::LookupTable;
use crate::vote::{visit_ranges, Accumulator, VoteMode};

/// Votes every visited pixel of `scene` into a fresh accumulator.
///
/// `step` must be at least 1; callers validate it.
pub(crate) fn accumulate<C: Code>(
    scene: ImageView<'_, C>,
    table: &LookupTable,
    mode: VoteMode,
    step: usize,
) -> Accumulator {
    let width = scene.width();
    let height = scene.height();
    let mut acc = Accumulator::zeros(width, height, step);
    let (rows, cols) = visit_ranges(mode, width, height, table);
    let votes = acc.votes_mut();
    for y in rows.step_by(step) {
        if let Some(row) = scene.row(y) {
            vote_row(row, y, cols.clone(), step, table, mode, votes, width, height);
        }
    }
    acc
}

/// Casts the votes of one scene row into `votes` (`width x height`, row-major).
#[allow(clippy::too_many_arguments)]
#[inline]
pub(crate) fn vote_row<C: Code>(
    row: &[C],
    y: usize,
    cols: Range<usize>,
    step: usize,
    table: &LookupTable,
    mode: VoteMode,
    votes: &mut [u32],
    width: usize,
    height: usize,
) {
    let y = y as i64;
    for x in cols.step_by(step) {
        let entry = table.entry(row[x].index());
        if entry.is_empty() {
            continue;
        }
        let x = x as i64;
        match mode {
            VoteMode::Bounded => {
                for ov in entry {
                    // in range by construction of the bounded visit window
                    let mx = (x + i64::from(ov.dx)) as usize;
                    let my = (y + i64::from(ov.dy)) as usize;
                    debug_assert!(mx < width && my < height);
                    let cell = &mut votes[my * width + mx];
                    *cell = cell.saturating_add(ov.votes);
                }
            }
            VoteMode::AllPixels => {
                for ov in entry {
                    let mx = x + i64::from(ov.dx);
                    let my = y + i64::from(ov.dy);
                    if mx < 0 || my < 0 || mx >= width as i64 || my >= height as i64 {
                        continue;
                    }
                    let cell = &mut votes[my as usize * width + mx as usize];
                    *cell = cell.saturating_add(ov.votes);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::accumulate;
    use crate::image::ImageView;
    use crate::table::{BuildConfig, LookupTable};
    use crate::vote::VoteMode;

    fn single_pixel_table() -> LookupTable {
        // 3x3 template, code 1 at the top-left corner: offset (1, 1)
        let mut data = vec![0u8; 9];
        data[0] = 1;
        let view = ImageView::from_slice(&data, 3, 3).unwrap();
        LookupTable::build(view, &BuildConfig::default())
    }

    #[test]
    fn all_pixels_drops_out_of_frame_votes() {
        // 5x5 template, code 1 at the top-left corner: offset (2, 2)
        let mut data = vec![0u8; 25];
        data[0] = 1;
        let view = ImageView::from_slice(&data, 5, 5).unwrap();
        let table = LookupTable::build(view, &BuildConfig::default());

        let mut scene = vec![0u8; 16];
        scene[4 + 1] = 1; // (1, 1) votes at (3, 3)
        scene[2 * 4 + 2] = 1; // (2, 2) votes at (4, 4), outside
        let view = ImageView::from_slice(&scene, 4, 4).unwrap();
        let acc = accumulate(view, &table, VoteMode::AllPixels, 1);
        assert_eq!(acc.get(3, 3), Some(1));
        assert_eq!(acc.total(), 1);
    }

    #[test]
    fn all_pixels_skips_outer_ring() {
        let table = single_pixel_table();
        let mut scene = vec![0u8; 16];
        scene[0] = 1;
        let view = ImageView::from_slice(&scene, 4, 4).unwrap();
        let acc = accumulate(view, &table, VoteMode::AllPixels, 1);
        assert_eq!(acc.total(), 0);
    }

    #[test]
    fn bounded_skips_margin() {
        let table = single_pixel_table();
        // margin is 1 for a 3x3 footprint; (1, 1) visits, (4, 1) does not
        let mut scene = vec![0u8; 20];
        scene[5 + 1] = 1;
        scene[5 + 4] = 1;
        let view = ImageView::from_slice(&scene, 5, 4).unwrap();
        let acc = accumulate(view, &table, VoteMode::Bounded, 1);
        assert_eq!(acc.get(2, 2), Some(1));
        assert_eq!(acc.total(), 1);
    }

    #[test]
    fn scene_smaller_than_footprint_votes_nothing_when_bounded() {
        let data = vec![1u8; 49];
        let view = ImageView::from_slice(&data, 7, 7).unwrap();
        let table = LookupTable::build(view, &BuildConfig::default());
        let scene = vec![1u8; 4];
        let view = ImageView::from_slice(&scene, 2, 2).unwrap();
        let acc = accumulate(view, &table, VoteMode::Bounded, 1);
        assert_eq!(acc.total(), 0);
        assert_eq!((acc.width(), acc.height()), (2, 2));
    }
}
