//! # kmeans2d - API documentation
//!
//! kmeans2d is a small rust library for Lloyd k-means clustering of 2-D point sets.
//!
//! ## Design target
//! Its main target is measuring the clustering stage in isolation: the elapsed time reported in
//! [`KMeansState::elapsed`] covers the assign/update loop only, not the initialization or any I/O.
//! Points are kept in a plain [`PointStore`], whose records are labeled in place while clustering.
//!
//! ## Supported variants
//! Both variants share the same semantics, they only differ in the execution model.
//! - Sequential Lloyd k-Means ([`KMeans::kmeans_sequential`])
//! - Data-parallel Lloyd k-Means on a dedicated rayon pool ([`KMeans::kmeans_parallel`]). The points are split into
//!   one static range per worker, every worker sums up its points into private per-cluster accumulators, which are
//!   combined once all workers finished. Tie-break coins are derived from the run's seed, the worker and the point,
//!   so no random generator is ever shared between workers.
//!
//! ## Supported centroid initializations
//! - Uniformly within the bounding box of all points ([`KMeans::init_bounding_box`])
//! - Precomputed centroids ([`KMeans::init_precomputed`])
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! ```rust
//! use kmeans2d::*;
//!
//! fn main() {
//!     let points = PointStore::from_coords((0..20000).map(|_| (rand::random::<f64>(), rand::random::<f64>())));
//!
//!     let mut kmean = KMeans::new(points);
//!     let result = kmean.kmeans_sequential(4, KMeans::init_bounding_box, &KMeansConfig::default()).unwrap();
//!
//!     println!("Centroids: {:?}", result.centroids);
//!     println!("Iterations: {}", result.iterations);
//!     println!("Clustering took: {:?}", result.elapsed);
//! }
//! ```
//!
//! ## Example (using the status event callbacks and the parallel variant)
//! ```rust
//! use kmeans2d::*;
//!
//! fn main() {
//!     let points = PointStore::from_coords((0..20000).map(|_| (rand::random::<f64>(), rand::random::<f64>())));
//!
//!     let conf = KMeansConfig::build()
//!         .init_done(&|_| println!("Initialization completed."))
//!         .iteration_done(&|s, nr, changed|
//!             println!("Iteration {} - {} points changed their cluster (distsum so far: {:.2})", nr, changed, s.distsum))
//!         .worker_count(4)
//!         .random_seed(1337)
//!         .build();
//!
//!     let mut kmean = KMeans::new(points);
//!     let result = kmean.kmeans_parallel(8, KMeans::init_bounding_box, &conf).unwrap();
//!
//!     println!("Centroids: {:?}", result.centroids);
//!     println!("Error: {}", result.distsum);
//! }
//! ```
//!
//! ## Short API-Overview / Description
//! Entry-point of the library is the [`KMeans`] struct. This struct is generic over the underlying primitive
//! type, that should be used for the calculations. To use KMeans, an instance of this struct is created, taking
//! over the point store into its ownership. Each run writes the cluster and the distance to that cluster's
//! centroid into every point, [`KMeans::into_points`] hands the labeled store back.
//!
//! For the plain `cluster(points, k, worker_count)` contract, use the free function [`cluster`].
//! The [`io`] and [`experiment`] modules load points from `x,y` CSV files, persist `x,y,cluster` results
//! and drive timing sweeps over multiple input sizes.

#[macro_use] mod helpers;
mod memory;
mod api;
mod variants;
mod inits;
mod abort_strategy;
mod random;
mod error;
pub mod io;
pub mod experiment;

pub use abort_strategy::AbortStrategy;
pub use api::{KMeansState, KMeansConfig, KMeansConfigBuilder, KMeans, cluster};
pub use memory::{Primitive, Point, Centroid, PointStore, BoundingBox};
pub use error::{KMeansError, Result};
