//! Lookup table construction from an encoded template.

use std::collections::HashMap;

use crate::code::Code;
use crate::image::ImageView;
use crate::table::{BuildConfig, IdealVotes, LookupTable, OffsetVote, TableStrategy};
use crate::trace::{trace_event, trace_span};
use crate::vote::{scalar::vote_row, Accumulator, VoteMode};

/// Builds [`LookupTable`]s from encoded template images.
#[derive(Clone, Debug, Default)]
pub struct TableBuilder {
    cfg: BuildConfig,
}

impl TableBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(cfg: BuildConfig) -> Self {
        Self { cfg }
    }

    /// Returns the builder configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.cfg
    }

    /// Builds a table from an encoded template.
    ///
    /// The reference center is `(width / 2, height / 2)`. Each pixel with a
    /// non-zero code contributes the offset pointing from itself to the
    /// center. A template without any non-zero code yields a table with an
    /// empty code-0 slot and `ideal_votes == 0`.
    pub fn build<C: Code>(&self, codes: ImageView<'_, C>) -> LookupTable {
        let width = codes.width();
        let height = codes.height();
        let _span = trace_span!("build_table", width = width, height = height).entered();

        let max_code = codes
            .rows()
            .flat_map(|row| row.iter().map(|c| c.index()))
            .max()
            .unwrap_or(0);

        let (offsets, starts, pixel_count) = match self.cfg.strategy {
            TableStrategy::WeightedMerge => weighted_entries(codes, max_code),
            TableStrategy::UnweightedList => unweighted_entries(codes, max_code),
        };

        let mut table = LookupTable {
            offsets,
            starts,
            width,
            height,
            pixel_count,
            ideal_votes: 0,
            strategy: self.cfg.strategy,
        };
        table.ideal_votes = match self.cfg.ideal {
            IdealVotes::PixelCount => u32::try_from(pixel_count).unwrap_or(u32::MAX),
            IdealVotes::SelfMatch => self_match_peak(codes, &table),
        };

        trace_event!(
            "table_built",
            codes = table.num_codes(),
            offsets = table.len(),
            pixel_count = table.pixel_count,
            ideal_votes = table.ideal_votes
        );
        table
    }
}

/// Offset from the pixel at `(x, y)` toward the template center.
#[inline]
fn center_offset(center: (usize, usize), x: usize, y: usize) -> (i32, i32) {
    let dx = center.0 as i64 - x as i64;
    let dy = center.1 as i64 - y as i64;
    (dx as i32, dy as i32)
}

fn nonzero_pixels<'a, C: Code>(
    codes: ImageView<'a, C>,
) -> impl Iterator<Item = (usize, usize, usize)> + 'a {
    (0..codes.height()).flat_map(move |y| {
        codes
            .row(y)
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_masked())
            .map(move |(x, c)| (x, y, c.index()))
    })
}

fn sort_entries(offsets: &mut [OffsetVote], starts: &[usize]) {
    for bounds in starts.windows(2) {
        offsets[bounds[0]..bounds[1]].sort_by_key(|ov| (ov.dy, ov.dx));
    }
}

fn weighted_entries<C: Code>(
    codes: ImageView<'_, C>,
    max_code: usize,
) -> (Vec<OffsetVote>, Vec<usize>, usize) {
    let center = (codes.width() / 2, codes.height() / 2);
    let mut merged: Vec<HashMap<(i32, i32), u32>> = vec![HashMap::new(); max_code + 1];
    let mut pixel_count = 0usize;
    for (x, y, code) in nonzero_pixels(codes) {
        *merged[code].entry(center_offset(center, x, y)).or_insert(0) += 1;
        pixel_count += 1;
    }

    let mut offsets = Vec::with_capacity(merged.iter().map(HashMap::len).sum());
    let mut starts = Vec::with_capacity(max_code + 2);
    for entry in merged {
        starts.push(offsets.len());
        offsets.extend(
            entry
                .into_iter()
                .map(|((dx, dy), votes)| OffsetVote { dx, dy, votes }),
        );
    }
    starts.push(offsets.len());
    sort_entries(&mut offsets, &starts);
    (offsets, starts, pixel_count)
}

fn unweighted_entries<C: Code>(
    codes: ImageView<'_, C>,
    max_code: usize,
) -> (Vec<OffsetVote>, Vec<usize>, usize) {
    let center = (codes.width() / 2, codes.height() / 2);

    let mut counts = vec![0usize; max_code + 1];
    for (_, _, code) in nonzero_pixels(codes) {
        counts[code] += 1;
    }

    let mut starts = Vec::with_capacity(max_code + 2);
    let mut total = 0usize;
    for &count in &counts {
        starts.push(total);
        total += count;
    }
    starts.push(total);

    let mut cursor = starts[..max_code + 1].to_vec();
    let mut offsets = vec![
        OffsetVote {
            dx: 0,
            dy: 0,
            votes: 0
        };
        total
    ];
    for (x, y, code) in nonzero_pixels(codes) {
        let (dx, dy) = center_offset(center, x, y);
        offsets[cursor[code]] = OffsetVote { dx, dy, votes: 1 };
        cursor[code] += 1;
    }
    sort_entries(&mut offsets, &starts);
    (offsets, starts, total)
}

/// Peak of the template voted against its own table with every pixel,
/// border included, casting votes. Equals the total template weight.
fn self_match_peak<C: Code>(codes: ImageView<'_, C>, table: &LookupTable) -> u32 {
    if table.is_empty() {
        return 0;
    }
    let (width, height) = (codes.width(), codes.height());
    let mut acc = Accumulator::zeros(width, height, 1);
    let votes = acc.votes_mut();
    for (y, row) in codes.rows().enumerate() {
        vote_row(row, y, 0..width, 1, table, VoteMode::AllPixels, votes, width, height);
    }
    acc.peak().2
}

#[cfg(test)]
mod tests {
    use super::TableBuilder;
    use crate::image::ImageView;
    use crate::table::{BuildConfig, IdealVotes, TableStrategy};

    #[test]
    fn empty_template_is_vacuous() {
        let data = vec![0u8; 16];
        let view = ImageView::from_slice(&data, 4, 4).unwrap();
        let table = TableBuilder::default().build(view);
        assert!(table.is_empty());
        assert_eq!(table.num_codes(), 1);
        assert_eq!(table.ideal_votes(), 0);
        assert_eq!(table.pixel_count(), 0);
        assert_eq!(table.footprint(), (4, 4));
    }

    #[test]
    fn offsets_point_toward_center() {
        // 5x3 template, center (2, 1)
        let mut data = vec![0u8; 15];
        data[0] = 1; // (0, 0)
        data[14] = 2; // (4, 2)
        let view = ImageView::from_slice(&data, 5, 3).unwrap();
        let table = TableBuilder::default().build(view);
        assert_eq!(table.center(), (2, 1));
        assert_eq!((table.entry(1)[0].dx, table.entry(1)[0].dy), (2, 1));
        assert_eq!((table.entry(2)[0].dx, table.entry(2)[0].dy), (-2, -1));
    }

    #[test]
    fn self_match_counts_border_pixels() {
        let mut data = vec![0u8; 25];
        data[0] = 4; // corner pixel
        data[12] = 4;
        let view = ImageView::from_slice(&data, 5, 5).unwrap();
        let by_count = TableBuilder::new(BuildConfig {
            strategy: TableStrategy::WeightedMerge,
            ideal: IdealVotes::PixelCount,
        })
        .build(view);
        let by_self = TableBuilder::default().build(view);
        assert_eq!(by_count.ideal_votes(), 2);
        assert_eq!(by_self.ideal_votes(), 2);
    }

    #[test]
    fn thin_and_border_only_templates_have_nonzero_ideal() {
        // 6x2 strip, every pixel coded
        let strip: Vec<u8> = (0..12).map(|i| (i % 3 + 1) as u8).collect();
        // 5x5 with codes only on the outer ring
        let mut ring = vec![0u8; 25];
        for (i, px) in ring.iter_mut().enumerate() {
            let (x, y) = (i % 5, i / 5);
            if x == 0 || y == 0 || x == 4 || y == 4 {
                *px = 1 + (i % 4) as u8;
            }
        }
        // 1x1 template
        let single = vec![9u8];
        for (data, w, h) in [(&strip, 6, 2), (&ring, 5, 5), (&single, 1, 1)] {
            let view = ImageView::from_slice(data, w, h).unwrap();
            for strategy in [TableStrategy::WeightedMerge, TableStrategy::UnweightedList] {
                let table = TableBuilder::new(BuildConfig {
                    strategy,
                    ideal: IdealVotes::SelfMatch,
                })
                .build(view);
                assert!(table.pixel_count() > 0);
                assert_eq!(table.ideal_votes() as usize, table.pixel_count());
            }
        }
    }

    #[test]
    fn u16_codes_index_wide_tables() {
        let mut data = vec![0u16; 9];
        data[4] = 300;
        let view = ImageView::from_slice(&data, 3, 3).unwrap();
        let table = TableBuilder::default().build(view);
        assert_eq!(table.num_codes(), 301);
        assert_eq!(table.entry(300).len(), 1);
        assert_eq!(table.ideal_votes(), 1);
    }
}
