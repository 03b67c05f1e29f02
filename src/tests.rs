use std::{iter, sync::LazyLock};

use crate::{ApplyOptions, ComposableTransform, Error, Points, Transform, TransformExt};
use faer::rand::{Rng, SeedableRng, rngs::SmallRng};

pub const SMALL_NUMBER: f64 = 1e-10;
pub static COORDS_3D_1000: LazyLock<Points> = LazyLock::new(|| make_coords(1000, 3, 1991));

pub fn init_logger() {
    #[allow(unused_must_use)]
    env_logger::try_init();
}

pub fn make_coords(n_points: usize, n_dims: usize, seed: u64) -> Points {
    let mut rng = SmallRng::seed_from_u64(seed);
    let data = iter::repeat_with(|| rng.random::<f64>() * 100.0)
        .take(n_points * n_dims)
        .collect();
    Points::try_new(data, n_dims).unwrap()
}

/// Coordinates in the input space of `t`.
fn coords_for<T: Transform + ?Sized>(t: &T) -> Points {
    match t.n_dims() {
        None | Some(3) => COORDS_3D_1000.clone(),
        Some(n) => make_coords(1000, n, 1991),
    }
}

pub fn assert_points_eq(actual: &Points, expected: &Points) {
    assert_eq!(
        (actual.n_points(), actual.n_dims()),
        (expected.n_points(), expected.n_dims()),
        "points have different shapes"
    );
    approx::assert_ulps_eq!(
        actual.as_slice(),
        expected.as_slice(),
        epsilon = SMALL_NUMBER
    );
}

/// Assert that transforming whole arrays, in batches or not,
/// matches transforming points one by one.
pub fn check_transform_points<T: Transform>(t: T) {
    init_logger();
    let coords = coords_for(&t);

    let results_many = t.transform_points(&coords);
    let out_ndim = t.n_dims_output().unwrap_or(coords.n_dims());
    let mut single = vec![f64::NAN; out_ndim];
    for (orig, many_transformed) in coords.rows().zip(results_many.rows()) {
        t.transform_into(orig, &mut single);
        approx::assert_ulps_eq!(single.as_slice(), many_transformed, epsilon = SMALL_NUMBER);
    }

    let unbatched = t.apply(&coords).unwrap();
    assert_points_eq(&unbatched, &results_many);
    let batched = t
        .apply_with(&coords, &ApplyOptions::default().with_batch_size(7))
        .unwrap();
    assert_points_eq(&batched, &unbatched);
    assert!(matches!(
        t.apply_with(&coords, &ApplyOptions::default().with_batch_size(0)),
        Err(Error::InvalidParameter(_))
    ));
}

/// Assert that inverting a transformation recovers the original coordinates (more or less).
pub fn check_inverse<T: Transform>(t: T) {
    init_logger();
    let Some(inv_t) = t.invert() else {
        return;
    };

    let coords = coords_for(&t);
    let transformed = t.apply(&coords).unwrap();
    let inverted = inv_t.apply(&transformed).unwrap();
    assert_points_eq(&inverted, &coords);
}

/// Assert that `a.compose_before(b)` applies `a` then `b`, leaving both untouched.
pub fn check_compose_before<A: Transform, B: Transform>(a: A, b: B) {
    init_logger();
    let a_before = format!("{a:?}");
    let b_before = format!("{b:?}");
    let coords = coords_for(&a);

    let composed = a.compose_before(&b).unwrap();
    let expected = b.apply(&a.apply(&coords).unwrap()).unwrap();
    assert_points_eq(&composed.apply(&coords).unwrap(), &expected);

    assert_eq!(format!("{a:?}"), a_before);
    assert_eq!(format!("{b:?}"), b_before);
}

/// Assert that `a.compose_after(b)` applies `b` then `a`, leaving both untouched.
pub fn check_compose_after<A: Transform, B: Transform>(a: A, b: B) {
    init_logger();
    let a_before = format!("{a:?}");
    let b_before = format!("{b:?}");
    let coords = coords_for(&b);

    let composed = a.compose_after(&b).unwrap();
    let expected = a.apply(&b.apply(&coords).unwrap()).unwrap();
    assert_points_eq(&composed.apply(&coords).unwrap(), &expected);

    assert_eq!(format!("{a:?}"), a_before);
    assert_eq!(format!("{b:?}"), b_before);
}

/// Assert that composing in place matches composing into a new transform,
/// in both directions, leaving `b` untouched.
pub fn check_compose_inplace<A, B>(a: A, b: B)
where
    A: ComposableTransform + Clone,
    B: Transform,
{
    init_logger();
    let b_before = format!("{b:?}");

    let coords = coords_for(&a);
    let mut before = a.clone();
    before.compose_before_inplace(&b).unwrap();
    assert_eq!(before.kind(), a.kind());
    assert_points_eq(
        &before.apply(&coords).unwrap(),
        &a.compose_before(&b).unwrap().apply(&coords).unwrap(),
    );

    let coords = coords_for(&b);
    let mut after = a.clone();
    after.compose_after_inplace(&b).unwrap();
    assert_eq!(after.kind(), a.kind());
    assert_points_eq(
        &after.apply(&coords).unwrap(),
        &a.compose_after(&b).unwrap().apply(&coords).unwrap(),
    );

    assert_eq!(format!("{b:?}"), b_before);
}
