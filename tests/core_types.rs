use ghmatch::{
    vote, Accumulator, BuildConfig, GhMatchError, ImageView, LookupTable, OwnedImage, VoteConfig,
};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [0u8; 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        GhMatchError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::from_slice(&data, 1, 0).err().unwrap();
    assert_eq!(
        err,
        GhMatchError::InvalidDimensions {
            width: 1,
            height: 0,
        }
    );
}

#[test]
fn image_view_rejects_invalid_stride() {
    let data = [0u8; 8];

    let err = ImageView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        GhMatchError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );
}

#[test]
fn image_view_rejects_small_buffer() {
    let data = [0u16; 3];

    let err = ImageView::new(&data, 2, 2, 2).err().unwrap();
    assert_eq!(err, GhMatchError::BufferTooSmall { needed: 4, got: 3 });
}

#[test]
fn padded_template_builds_like_contiguous() {
    // 3x3 codes stored with a stride of 5
    let padded = [0u8, 1, 0, 9, 9, 2, 0, 3, 9, 9, 0, 4, 0];
    let contiguous = [0u8, 1, 0, 2, 0, 3, 0, 4, 0];
    let a = LookupTable::build(
        ImageView::new(&padded, 3, 3, 5).unwrap(),
        &BuildConfig::default(),
    );
    let b = LookupTable::build(
        ImageView::from_slice(&contiguous, 3, 3).unwrap(),
        &BuildConfig::default(),
    );
    assert_eq!(a.num_codes(), b.num_codes());
    for code in 0..a.num_codes() {
        assert_eq!(a.entry(code), b.entry(code));
    }
    assert_eq!(a.pixel_count(), 4);
}

#[test]
fn accumulator_matches_scene_size_and_step() {
    let tpl = [0u8, 1, 0, 1, 1, 1, 0, 1, 0];
    let table = LookupTable::build(
        ImageView::from_slice(&tpl, 3, 3).unwrap(),
        &BuildConfig::default(),
    );
    let scene = vec![1u8; 7 * 5];
    let view = ImageView::from_slice(&scene, 7, 5).unwrap();
    let acc: Accumulator = vote(
        view,
        &table,
        &VoteConfig {
            step: 2,
            ..VoteConfig::default()
        },
    )
    .unwrap();
    assert_eq!((acc.width(), acc.height(), acc.step()), (7, 5, 2));
}

#[test]
fn zero_step_is_rejected() {
    let tpl = [1u8; 9];
    let table = LookupTable::build(
        ImageView::from_slice(&tpl, 3, 3).unwrap(),
        &BuildConfig::default(),
    );
    let err = vote(
        ImageView::from_slice(&tpl, 3, 3).unwrap(),
        &table,
        &VoteConfig {
            step: 0,
            ..VoteConfig::default()
        },
    )
    .err()
    .unwrap();
    assert_eq!(err, GhMatchError::InvalidStep { step: 0 });
}

#[test]
fn heat_map_spans_full_range() {
    let tpl = [0u8, 0, 0, 0, 1, 0, 0, 0, 0];
    let table = LookupTable::build(
        ImageView::from_slice(&tpl, 3, 3).unwrap(),
        &BuildConfig::default(),
    );
    let mut scene = vec![0u8; 25];
    scene[12] = 1;
    let acc = vote(
        ImageView::from_slice(&scene, 5, 5).unwrap(),
        &table,
        &VoteConfig::default(),
    )
    .unwrap();
    let heat: OwnedImage<u8> = acc.to_normalized_u8();
    assert_eq!(heat.get(2, 2), Some(255));
    assert_eq!(heat.get(0, 0), Some(0));
}
