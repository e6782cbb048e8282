#![cfg(feature = "rayon")]

use ghmatch::{locate, vote, BuildConfig, ImageView, LookupTable, VoteConfig, VoteMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_codes(rng: &mut StdRng, len: usize, density: f64) -> Vec<u8> {
    (0..len)
        .map(|_| {
            if rng.random_bool(density) {
                rng.random_range(1..=12)
            } else {
                0
            }
        })
        .collect()
}

#[test]
fn parallel_votes_match_sequential() {
    let mut rng = StdRng::seed_from_u64(42);
    let (tw, th) = (27, 19);
    let tpl = random_codes(&mut rng, tw * th, 0.4);
    let table = LookupTable::build(
        ImageView::from_slice(&tpl, tw, th).unwrap(),
        &BuildConfig::default(),
    );

    let (width, height) = (173, 131);
    let scene = random_codes(&mut rng, width * height, 0.3);
    let view = ImageView::from_slice(&scene, width, height).unwrap();

    for mode in [VoteMode::AllPixels, VoteMode::Bounded] {
        for step in [1usize, 3] {
            let seq_cfg = VoteConfig {
                step,
                mode,
                parallel: false,
            };
            let par_cfg = VoteConfig {
                parallel: true,
                ..seq_cfg.clone()
            };
            let seq = vote(view, &table, &seq_cfg).unwrap();
            let par = vote(view, &table, &par_cfg).unwrap();
            assert_eq!(seq, par, "mode {mode:?}, step {step}");
            assert_eq!(locate(&seq, &table), locate(&par, &table));
        }
    }
}
