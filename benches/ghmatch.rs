use criterion::{criterion_group, criterion_main, Criterion};
use ghmatch::{vote, BuildConfig, ImageView, LookupTable, TableStrategy, VoteConfig, VoteMode};
use std::hint::black_box;

fn make_codes(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 13) ^ (y * 7) ^ (x * y)) % 24;
            // roughly a third of the pixels carry no gradient
            data.push(if value < 8 { 0 } else { (value - 7) as u8 });
        }
    }
    data
}

fn extract_patch(
    image: &[u8],
    img_width: usize,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = (y0 + y) * img_width;
        out.extend_from_slice(&image[row + x0..row + x0 + width]);
    }
    out
}

fn bench_voting(c: &mut Criterion) {
    let img_width = 640;
    let img_height = 480;
    let scene = make_codes(img_width, img_height);
    let scene_view = ImageView::from_slice(&scene, img_width, img_height).unwrap();

    let tpl_width = 64;
    let tpl_height = 64;
    let tpl = extract_patch(&scene, img_width, 200, 150, tpl_width, tpl_height);
    let tpl_view = ImageView::from_slice(&tpl, tpl_width, tpl_height).unwrap();

    c.bench_function("build_weighted", |b| {
        b.iter(|| black_box(LookupTable::build(tpl_view, &BuildConfig::default())));
    });

    let table = LookupTable::build(tpl_view, &BuildConfig::default());
    let unweighted = LookupTable::build(
        tpl_view,
        &BuildConfig {
            strategy: TableStrategy::UnweightedList,
            ..BuildConfig::default()
        },
    );

    for step in [1usize, 2, 4] {
        let cfg = VoteConfig {
            step,
            ..VoteConfig::default()
        };
        c.bench_function(&format!("vote_all_pixels_step{step}"), |b| {
            b.iter(|| black_box(vote(scene_view, &table, &cfg).unwrap()));
        });
    }

    let bounded = VoteConfig {
        mode: VoteMode::Bounded,
        ..VoteConfig::default()
    };
    c.bench_function("vote_bounded_step1", |b| {
        b.iter(|| black_box(vote(scene_view, &table, &bounded).unwrap()));
    });

    c.bench_function("vote_unweighted_step1", |b| {
        b.iter(|| black_box(vote(scene_view, &unweighted, &VoteConfig::default()).unwrap()));
    });

    #[cfg(feature = "rayon")]
    {
        let par = VoteConfig {
            parallel: true,
            ..VoteConfig::default()
        };
        c.bench_function("vote_all_pixels_par", |b| {
            b.iter(|| black_box(vote(scene_view, &table, &par).unwrap()));
        });
    }
}

criterion_group!(benches, bench_voting);
criterion_main!(benches);
