use crate::{memory::*, random::CoinFlip, AbortStrategy, KMeansError, Result};
use std::cell::RefCell;
use std::time::Duration;
use rand::prelude::*;

pub type InitDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>);
pub type IterationDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>, usize, usize);

/// This is a structure holding various configuration options for a k-means calculation, such as
/// the random number generator to use, the amount of workers, or a couple of callbacks, that can be
/// set to get status information from a running k-means calculation.
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called, when the initialization phase finished
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the initialization
    pub(crate) init_done: InitDoneCallbackFn<'a, T>,
    /// Callback that is called after each iteration
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the iteration
    /// - **iteration_id**: Number of the current iteration
    /// - **changed**: Amount of points that changed their cluster during this iteration's assignment pass
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// Random number generator to use
    pub(crate) rnd: Box<RefCell<dyn RngCore>>,
    /// Amount of workers used by the parallel variant (0 = one per available cpu)
    pub(crate) worker_count: usize,
    /// The abort-strategy to use for the running calculation
    pub(crate) abort_strategy: AbortStrategy
}
impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            init_done: &|_| {},
            iteration_done: &|_,_,_| {},
            rnd: Box::new(RefCell::new(rand::thread_rng())),
            worker_count: 1,
            abort_strategy: AbortStrategy::FixedPoint
        }
    }
}
impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }
    pub fn worker_count(&self) -> usize { self.worker_count }
}
impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansConfig")
            .field("worker_count", &self.worker_count)
            .field("abort_strategy", &self.abort_strategy)
            .finish_non_exhaustive()
    }
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>
}
impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after the centroid initialization, before the iteration starts.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a, T>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback that should be called after each iteration during a running k-means calculation.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Set the random number generator that should be used in the k-means calculation.
    /// Use a seeded generator for deterministically repeatable results.
    pub fn random_generator<R: RngCore + 'static>(mut self, rnd: R) -> Self {
        self.config.rnd = Box::new(RefCell::new(rnd)); self
    }
    /// Shortcut for [`KMeansConfigBuilder::random_generator`] with a [`StdRng`] seeded from **seed**.
    pub fn random_seed(self, seed: u64) -> Self {
        self.random_generator(StdRng::seed_from_u64(seed))
    }
    /// Set the amount of workers the parallel variant uses. `0` lets rayon pick one worker per cpu.
    /// ## Default
    /// `1`
    pub fn worker_count(mut self, worker_count: usize) -> Self {
        self.config.worker_count = worker_count; self
    }
    /// Set the abort-strategy to use during a running k-means calculation. For more information,
    /// see documentation of [`AbortStrategy`].
    /// ## Default
    /// [`AbortStrategy::FixedPoint`]
    pub fn abort_strategy(mut self, abort_strategy: AbortStrategy) -> Self {
        self.config.abort_strategy = abort_strategy; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> { self.config }
}


/// This is the data-structure storing the centroid set during calculation, as well as the final
/// result, as returned by the API. The per-point results (cluster, distance) are written into the
/// points of the [`KMeans`] instance itself.
///
/// ## Fields
/// - **k**: The amount of clusters that were requested when calculating this k-means result
/// - **distsum**: The total sum of squared distances from all points to their respective centroids
/// - **centroids**: Calculated cluster centers, identified by their index
/// - **centroid_frequency**: Amount of points in each cluster, as of the last centroid update
/// - **iterations**: Amount of assignment passes that were run
/// - **converged**: Whether the last assignment pass did not change a single point's cluster
/// - **elapsed**: Wall-clock time of the assign/update loop (excluding initialization)
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub distsum: T,
    pub centroids: Vec<Centroid<T>>,
    pub centroid_frequency: Vec<usize>,
    pub iterations: usize,
    pub converged: bool,
    pub elapsed: Duration,
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(k: usize) -> Self {
        Self {
            k,
            distsum: T::zero(),
            centroids: vec![Centroid::default(); k],
            centroid_frequency: vec![0usize; k],
            iterations: 0,
            converged: false,
            elapsed: Duration::ZERO,
        }
    }
    pub(crate) fn set_centroid(&mut self, idx: usize, centroid: Centroid<T>) {
        self.centroids[idx] = centroid;
    }
}




/// Entrypoint of this crate's API-Surface.
///
/// Create an instance of this struct, giving the point store you want to operate on. The primitive type
/// of the points will be the type used internally for all calculations, as well as the result
/// as stored in the returned [`KMeansState`] structure.
///
/// ## Supported variants
/// - Sequential Lloyd k-Means [`KMeans::kmeans_sequential`]
/// - Data-parallel Lloyd k-Means [`KMeans::kmeans_parallel`]
///
/// ## Supported initialization methods
/// - Bounding-Box [`KMeans::init_bounding_box`]
/// - Precomputed [`KMeans::init_precomputed`]
#[derive(Clone, Debug)]
pub struct KMeans<T: Primitive> {
    pub(crate) points: PointStore<T>
}
impl<T: Primitive> KMeans<T> {
    /// Create a new instance of the [`KMeans`] structure, taking over the point store.
    pub fn new(points: PointStore<T>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &PointStore<T> { &self.points }

    /// Give back the point store, carrying the cluster assignments of the last calculation.
    pub fn into_points(self) -> PointStore<T> { self.points }


    pub(crate) fn check_cluster_count(&self, k: usize) -> Result<()> {
        if self.points.is_empty() {
            return Err(KMeansError::DegenerateInput);
        }
        if k == 0 || k > self.points.len() {
            return Err(KMeansError::InvalidClusterCount { k, points: self.points.len() });
        }
        if let Some(index) = self.points.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(KMeansError::NonFinitePoint { index });
        }
        Ok(())
    }

    /// Find the centroid with the smallest squared distance to **p**.
    ///
    /// A competitor within [`Primitive::TIE_EPSILON`] of the current minimum is a tie: one coin is
    /// flipped per tied competitor, and the current best index switches over on `true`. The reference
    /// distance stays the one of the first minimum.
    #[inline(always)]
    pub(crate) fn nearest_centroid<C: CoinFlip + ?Sized>(p: &Point<T>, centroids: &[Centroid<T>], coin: &mut C) -> (usize, T) {
        let mut best_idx = 0;
        let mut best_dist = p.sq_distance(&centroids[0]);
        for (ci, c) in centroids.iter().enumerate().skip(1) {
            let dist = p.sq_distance(c);
            if dist < best_dist {
                best_idx = ci;
                best_dist = dist;
            } else if (dist - best_dist).abs() < T::TIE_EPSILON && coin.flip() {
                best_idx = ci;
            }
        }
        (best_idx, best_dist)
    }

    /// Label **p** with its nearest centroid. Returns whether the label changed.
    #[inline(always)]
    pub(crate) fn assign_point<C: CoinFlip + ?Sized>(p: &mut Point<T>, centroids: &[Centroid<T>], coin: &mut C) -> bool {
        let (best_idx, best_dist) = Self::nearest_centroid(p, centroids, coin);
        p.distance = Some(best_dist.sqrt());
        if p.cluster != Some(best_idx) {
            p.cluster = Some(best_idx);
            true
        } else {
            false
        }
    }

    /// Move every centroid to the mean of its points. Empty clusters get their centroid reseeded
    /// from a point drawn uniformly from the whole store.
    pub(crate) fn update_centroids(&self, state: &mut KMeansState<T>, sums: &ClusterSums<T>, rnd: &mut dyn RngCore) {
        debug_assert_eq!(sums.k(), state.k);
        let points = self.points.as_slice();
        for ci in 0..state.k {
            let cnt = sums.count[ci];
            state.centroid_frequency[ci] = cnt;
            if cnt > 0 {
                let cnt = T::from_count(cnt);
                state.set_centroid(ci, Centroid::new(sums.sum_x[ci] / cnt, sums.sum_y[ci] / cnt));
            } else {
                let point_idx = rnd.gen_range(0..points.len());
                log::debug!("Cluster {} is empty, reseeding its centroid from point {}", ci, point_idx);
                state.set_centroid(ci, Centroid::from(&points[point_idx]));
            }
        }
    }

    pub(crate) fn finish(&self, state: &mut KMeansState<T>) {
        let centroids = &state.centroids;
        state.distsum = self.points.iter()
            .filter_map(|p| p.cluster.map(|ci| p.sq_distance(&centroids[ci])))
            .sum();
        if state.converged {
            log::info!("Converged after {} iterations in {:?} (k={}, points={})",
                state.iterations, state.elapsed, state.k, self.points.len());
        } else {
            log::warn!("Stopped without convergence after {} iterations in {:?} (k={}, points={})",
                state.iterations, state.elapsed, state.k, self.points.len());
        }
    }



    /// Sequential Lloyd k-Means. Alternates between assigning every point to its nearest centroid and
    /// moving the centroids to the mean of their points, until an assignment pass does not change a
    /// single point's cluster.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    /// - **config**: [`KMeansConfig`] instance, containing several configuration options for the calculation.
    ///
    /// ## Returns
    /// Instance of [`KMeansState`], containing the final state (result).
    ///
    /// ## Example
    /// ```rust
    /// use kmeans2d::*;
    ///
    /// let points = PointStore::from_coords(vec![(0.0, 0.0), (0.0, 1.0), (10.0, 10.0), (10.0, 11.0)]);
    /// let mut kmean = KMeans::new(points);
    /// let conf = KMeansConfig::build().random_seed(1337).build();
    /// let result = kmean.kmeans_sequential(2, KMeans::init_bounding_box, &conf).unwrap();
    ///
    /// println!("Centroids: {:?}", result.centroids);
    /// println!("Clustering took: {:?}", result.elapsed);
    /// ```
    pub fn kmeans_sequential<'a, F>(&mut self, k: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) {
        crate::variants::Lloyd::calculate(self, k, init, config)
    }

    /// Data-parallel Lloyd k-Means, using a dedicated pool of [`KMeansConfigBuilder::worker_count`] workers.
    /// Same semantics as [`KMeans::kmeans_sequential`], apart from the order of random draws.
    pub fn kmeans_parallel<'a, F>(&mut self, k: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) {
        crate::variants::ParallelLloyd::calculate(self, k, init, config)
    }

    /// Cluster using the bounding-box initialization. Runs the sequential variant for a worker count of
    /// one, the parallel variant otherwise.
    pub fn cluster<'a>(&mut self, k: usize, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>> {
        if config.worker_count == 1 {
            self.kmeans_sequential(k, KMeans::init_bounding_box, config)
        } else {
            self.kmeans_parallel(k, KMeans::init_bounding_box, config)
        }
    }

    /// Bounding-Box initialization method
    ///
    /// ## Description
    /// Draws every centroid uniformly from the axis-aligned bounding box of all points, x and y independently.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_bounding_box<'a>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'a, T>) {
        crate::inits::boundingbox::calculate(kmean, state, config);
    }

    /// Precomputed initialization method
    ///
    /// ## Description
    /// Uses the given centroids as initial centroids.
    pub fn init_precomputed(centroids: Vec<Centroid<T>>) -> impl FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'_, T>) {
        move |kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>| {
            crate::inits::precomputed::calculate(kmean, state, config, centroids);
        }
    }
}


/// Cluster **points** into **k** clusters with **worker_count** workers, initializing the centroids from the
/// points' bounding box and seeding from OS entropy.
///
/// ## Returns
/// The wall-clock time of the clustering loop, and the points carrying their cluster assignments.
pub fn cluster<T: Primitive>(points: PointStore<T>, k: usize, worker_count: usize) -> Result<(Duration, PointStore<T>)> {
    let mut kmean = KMeans::new(points);
    let conf = KMeansConfig::build().worker_count(worker_count).build();
    let state = kmean.cluster(k, &conf)?;
    Ok((state.elapsed, kmean.into_points()))
}
