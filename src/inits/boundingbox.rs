use crate::{KMeans, KMeansState, KMeansConfig, memory::*};
use rand::prelude::*;
use std::ops::DerefMut;

/// Position at fraction **r** (in `[0, 1)`) between **min** and **max**.
/// Falls back to weighting both bounds when `max - min` does not fit into the primitive.
#[inline(always)]
fn interpolate<T: Primitive>(min: T, max: T, r: T) -> T {
    let span = max - min;
    let v = if span.is_finite() {
        min + span * r
    } else {
        min * (T::one() - r) + max * r
    };
    v.max(min).min(max)
}

#[inline(always)] pub fn calculate<'a, T: Primitive>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'a, T>) {
    // Emptiness and non-finite coordinates are rejected before initialization
    let Some(bb) = kmean.points.bounding_box() else { return; };
    let mut rnd = config.rnd.borrow_mut();
    let rnd = rnd.deref_mut();
    for ci in 0..state.k {
        let x = interpolate(bb.min_x, bb.max_x, rnd.gen_range(T::zero()..T::one()));
        let y = interpolate(bb.min_y, bb.max_y, rnd.gen_range(T::zero()..T::one()));
        state.set_centroid(ci, Centroid::new(x, y));
    }
}
