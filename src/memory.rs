use num::{Float, NumCast};
use rand::distributions::uniform::SampleUniform;
use std::{
    fmt::{Debug, Display, LowerExp}, iter::Sum, num::ParseFloatError, ops::AddAssign, str::FromStr
};

pub trait Primitive: Float + NumCast + AddAssign + Sum + SampleUniform + FromStr<Err = ParseFloatError>
                + PartialOrd + Copy + Default + Display + Debug + Sync + Send + LowerExp + 'static {
    /// Two squared distances closer than this are treated as a tie.
    const TIE_EPSILON: Self;
    /// Converts a point count into the primitive type.
    fn from_count(cnt: usize) -> Self;
}
impl Primitive for f32 {
    const TIE_EPSILON: f32 = 1e-9;
    fn from_count(cnt: usize) -> Self { cnt as f32 }
}
impl Primitive for f64 {
    const TIE_EPSILON: f64 = 1e-9;
    fn from_count(cnt: usize) -> Self { cnt as f64 }
}


/// A single record of the point store.
///
/// ## Fields
/// - **x**, **y**: Coordinates
/// - **cluster**: Index of the assigned centroid (`None` until the first assignment pass)
/// - **distance**: Euclidean distance to the assigned centroid (`None` until the first assignment pass)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T: Primitive> {
    pub x: T,
    pub y: T,
    pub cluster: Option<usize>,
    pub distance: Option<T>,
}
impl<T: Primitive> Point<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y, cluster: None, distance: None }
    }

    #[inline(always)]
    pub(crate) fn sq_distance(&self, c: &Centroid<T>) -> T {
        let (dx, dy) = (self.x - c.x, self.y - c.y);
        dx * dx + dy * dy
    }
}

/// Cluster center. Centroids are identified by their position within [`crate::KMeansState::centroids`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Centroid<T: Primitive> {
    pub x: T,
    pub y: T,
}
impl<T: Primitive> Centroid<T> {
    pub fn new(x: T, y: T) -> Self { Self { x, y } }
}
impl<T: Primitive> From<&Point<T>> for Centroid<T> {
    fn from(p: &Point<T>) -> Self { Self { x: p.x, y: p.y } }
}

/// Axis-aligned bounding box of a point set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox<T: Primitive> {
    pub min_x: T,
    pub max_x: T,
    pub min_y: T,
    pub max_y: T,
}


/// In-memory, ordered sequence of points. Records are mutated in place while clustering,
/// the store itself never grows or shrinks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointStore<T: Primitive> {
    points: Vec<Point<T>>,
}
impl<T: Primitive> PointStore<T> {
    pub fn new(points: Vec<Point<T>>) -> Self { Self { points } }

    /// Create a store of unassigned points from `(x, y)` pairs.
    pub fn from_coords(coords: impl IntoIterator<Item = (T, T)>) -> Self {
        Self { points: coords.into_iter().map(|(x, y)| Point::new(x, y)).collect() }
    }

    pub fn len(&self) -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }
    pub fn iter(&self) -> std::slice::Iter<'_, Point<T>> { self.points.iter() }
    pub fn as_slice(&self) -> &[Point<T>] { &self.points }
    pub fn as_mut_slice(&mut self) -> &mut [Point<T>] { &mut self.points }
    pub fn into_vec(self) -> Vec<Point<T>> { self.points }

    /// Single pass over all points. Returns `None` for an empty store.
    pub fn bounding_box(&self) -> Option<BoundingBox<T>> {
        let first = self.points.first()?;
        let init = BoundingBox { min_x: first.x, max_x: first.x, min_y: first.y, max_y: first.y };
        Some(self.points.iter().skip(1).fold(init, |mut bb, p| {
            if p.x < bb.min_x { bb.min_x = p.x; }
            if p.x > bb.max_x { bb.max_x = p.x; }
            if p.y < bb.min_y { bb.min_y = p.y; }
            if p.y > bb.max_y { bb.max_y = p.y; }
            bb
        }))
    }
}
impl<T: Primitive> FromIterator<Point<T>> for PointStore<T> {
    fn from_iter<I: IntoIterator<Item = Point<T>>>(iter: I) -> Self {
        Self { points: iter.into_iter().collect() }
    }
}


/// Per-cluster coordinate sums and point counts.
/// Every parallel worker owns one of these during the update phase, they are only
/// combined after all workers finished.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ClusterSums<T: Primitive> {
    pub sum_x: Vec<T>,
    pub sum_y: Vec<T>,
    pub count: Vec<usize>,
}
impl<T: Primitive> ClusterSums<T> {
    pub fn new(k: usize) -> Self {
        Self { sum_x: vec![T::zero(); k], sum_y: vec![T::zero(); k], count: vec![0; k] }
    }

    pub fn from_points(k: usize, points: &[Point<T>]) -> Self {
        let mut sums = Self::new(k);
        points.iter().for_each(|p| sums.add(p));
        sums
    }

    #[inline(always)]
    pub fn add(&mut self, p: &Point<T>) {
        if let Some(c) = p.cluster {
            self.sum_x[c] += p.x;
            self.sum_y[c] += p.y;
            self.count[c] += 1;
        }
    }

    pub fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.count.len(), other.count.len());
        for c in 0..self.count.len() {
            self.sum_x[c] += other.sum_x[c];
            self.sum_y[c] += other.sum_y[c];
            self.count[c] += other.count[c];
        }
    }

    pub fn k(&self) -> usize { self.count.len() }
}
