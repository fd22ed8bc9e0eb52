use crate::{KMeans, KMeansState, KMeansConfig, Result, memory::*, random::TieBreaker};
use rayon::prelude::*;
use std::ops::DerefMut;
use std::time::Instant;

pub(crate) struct ParallelLloyd<T> where T: Primitive {
	_p: std::marker::PhantomData<T>
}
impl<T> ParallelLloyd<T> where T: Primitive {
	/// Points per worker. The partition is static (worker `w` owns the `w`-th chunk), so that
	/// tie-breaks and partial sums only depend on the seed and the amount of workers.
	fn work_packet_size(sample_cnt: usize, workers: usize) -> usize {
		let workers = workers.max(1);
		((sample_cnt + workers - 1) / workers).max(1)
	}

	/// Assign every point to its nearest centroid, fanned out over the workers of the current pool.
	/// Returns the amount of points that changed their cluster, summed over all workers.
	pub(crate) fn update_cluster_assignments(points: &mut [Point<T>], centroids: &[Centroid<T>], salt: u64, workers: usize) -> usize {
		let work_packet_size = Self::work_packet_size(points.len(), workers);
		points.par_chunks_mut(work_packet_size)
			.enumerate()
			.map(|(worker_id, chunk)| {
				let offset = worker_id * work_packet_size;
				chunk.iter_mut().enumerate()
					.map(|(i, p)| {
						let mut coin = TieBreaker::new(salt, worker_id, offset + i);
						KMeans::assign_point(p, centroids, &mut coin)
					})
					.filter(|changed| *changed)
					.count()
			})
			.sum()
	}

	/// Worker-local accumulation of the per-cluster sums, combined in worker order once every worker finished.
	pub(crate) fn accumulate(points: &[Point<T>], k: usize, workers: usize) -> ClusterSums<T> {
		let work_packet_size = Self::work_packet_size(points.len(), workers);
		let partial_sums: Vec<ClusterSums<T>> = points.par_chunks(work_packet_size)
			.map(|chunk| ClusterSums::from_points(k, chunk))
			.collect();
		partial_sums.iter().fold(ClusterSums::new(k), |mut sums, partial| {
			sums.merge(partial);
			sums
		})
	}

	#[inline(always)] pub fn calculate<'a, F>(data: &mut KMeans<T>, k: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
				where for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) {
		data.check_cluster_count(k)?;

		let pool = rayon::ThreadPoolBuilder::new()
			.num_threads(config.worker_count)
			.thread_name(|idx| format!("kmeans-worker-{}", idx))
			.build()?;
		let workers = pool.current_num_threads();
		log::debug!("Clustering {} points into {} clusters using {} workers", data.points.len(), k, workers);

		let mut state = KMeansState::new(k);

		// Initialize clusters and notify subscriber
		init(data, &mut state, config);
		(config.init_done)(&state);
		let mut abort_strategy = config.abort_strategy.create_logic();

		let mut rnd = config.rnd.borrow_mut();
		let rnd = rnd.deref_mut();

		let start = Instant::now();
		for i in 1usize.. {
			// Tie-break streams of this pass are derived from this salt
			let salt = rnd.next_u64();
			let (points, centroids) = (data.points.as_mut_slice(), &state.centroids);
			let changed = pool.install(|| Self::update_cluster_assignments(points, centroids, salt, workers));
			let proceed = abort_strategy.next(changed);
			if proceed {
				let points = data.points.as_slice();
				let sums = pool.install(|| Self::accumulate(points, k, workers));
				data.update_centroids(&mut state, &sums, rnd);
			}
			state.iterations = i;
			log::debug!("Iteration {}: {} points changed cluster", i, changed);

			// Notify subscriber about finished iteration
			(config.iteration_done)(&state, i, changed);
			if !proceed {
				state.converged = changed == 0;
				break;
			}
		}
		state.elapsed = start.elapsed();

		data.finish(&mut state);
		Ok(state)
	}
}




#[cfg(test)]
mod tests {
	use super::*;
	use crate::helpers::testing::*;
	use crate::variants::Lloyd;
	use rand::prelude::*;
	use std::cell::RefCell;

	#[test]
	fn work_packets_cover_all_points() {
		assert_eq!(ParallelLloyd::<f64>::work_packet_size(10, 3), 4);
		assert_eq!(ParallelLloyd::<f64>::work_packet_size(9, 3), 3);
		assert_eq!(ParallelLloyd::<f64>::work_packet_size(2, 8), 1);
		assert_eq!(ParallelLloyd::<f64>::work_packet_size(0, 4), 1);
		assert_eq!(ParallelLloyd::<f64>::work_packet_size(5, 0), 5);
	}

	#[test]
	fn reduction_matches_sequential_pass() {
		let mut points = blobs(10_001, 7, 99).into_vec();
		let mut rnd = StdRng::seed_from_u64(99);
		points.iter_mut().for_each(|p| p.cluster = Some(rnd.gen_range(0..7)));
		let should = ClusterSums::from_points(7, &points);

		for workers in 1..=8 {
			let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build().unwrap();
			let actual = pool.install(|| ParallelLloyd::accumulate(points.as_slice(), 7, workers));
			assert_eq!(actual.count, should.count);
			for c in 0..7 {
				let cnt = should.count[c] as f64;
				assert_approx_eq!(actual.sum_x[c] / cnt, should.sum_x[c] / cnt, 1e-9);
				assert_approx_eq!(actual.sum_y[c] / cnt, should.sum_y[c] / cnt, 1e-9);
			}
		}
	}

	#[test]
	fn changed_counter_has_no_lost_updates() {
		let points = blobs(5000, 5, 1);
		let centroids: Vec<Centroid<f64>> = points.iter().take(5).map(Centroid::from).collect();

		let mut sequential = points.clone().into_vec();
		let mut rnd = rand::rngs::mock::StepRng::new(0, 1);
		let should = Lloyd::update_cluster_assignments(sequential.as_mut_slice(), &centroids, &mut rnd as &mut dyn RngCore);
		assert_eq!(should, 5000);

		for workers in [1, 2, 3, 8] {
			let mut parallel = points.clone().into_vec();
			let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build().unwrap();
			let changed = pool.install(|| ParallelLloyd::update_cluster_assignments(parallel.as_mut_slice(), &centroids, 7, workers));
			assert_eq!(changed, should);
			assert_eq!(parallel.iter().map(|p| p.cluster).collect::<Vec<_>>(), sequential.iter().map(|p| p.cluster).collect::<Vec<_>>());

			// Unchanged centroids -> nothing moves anymore
			let changed = pool.install(|| ParallelLloyd::update_cluster_assignments(parallel.as_mut_slice(), &centroids, 7, workers));
			assert_eq!(changed, 0);
		}
	}

	#[test]
	fn iris_dataset_matches_sequential() {
		let conf = KMeansConfig::build().random_seed(1).worker_count(4).build();

		let mut sequential = KMeans::new(iris_petals());
		let should = sequential.kmeans_sequential(3, KMeans::init_precomputed(iris_initial_centroids()), &conf).unwrap();
		let mut parallel = KMeans::new(iris_petals());
		let actual = parallel.kmeans_parallel(3, KMeans::init_precomputed(iris_initial_centroids()), &conf).unwrap();

		assert!(actual.converged);
		assert_eq!(actual.iterations, should.iterations);
		assert_eq!(actual.centroid_frequency, should.centroid_frequency);
		assert_same_partition(sequential.points(), parallel.points());
		for (a, s) in actual.centroids.iter().zip(should.centroids.iter()) {
			assert_approx_eq!(a.x, s.x, 1e-9);
			assert_approx_eq!(a.y, s.y, 1e-9);
		}
		assert_cluster_invariants(parallel.points(), &actual);
	}

	#[test]
	fn well_separated_groups_regardless_of_seed() {
		for seed in 0..20 {
			let mut kmean = KMeans::new(PointStore::from_coords(vec![(0.0f64, 0.0), (0.0, 1.0), (10.0, 10.0), (10.0, 11.0)]));
			let conf = KMeansConfig::build().random_seed(seed).worker_count(3).build();
			let res = kmean.kmeans_parallel(2, KMeans::init_bounding_box, &conf).unwrap();

			let labels: Vec<usize> = kmean.points().iter().map(|p| p.cluster.unwrap()).collect();
			assert_eq!(labels[0], labels[1]);
			assert_eq!(labels[2], labels[3]);
			assert_ne!(labels[0], labels[2]);
			assert_eq!(res.centroids[labels[0]], Centroid::new(0.0, 0.5));
			assert_eq!(res.centroids[labels[2]], Centroid::new(10.0, 10.5));
		}
	}

	#[test]
	fn deterministic_for_fixed_seed_and_worker_count() {
		let run = || {
			let mut kmean = KMeans::new(blobs(3000, 5, 8));
			let conf = KMeansConfig::build().random_seed(31337).worker_count(4).build();
			let res = kmean.kmeans_parallel(5, KMeans::init_bounding_box, &conf).unwrap();
			(res.centroid_frequency, res.iterations, kmean.into_points())
		};
		assert_eq!(run(), run());
	}

	#[test]
	fn single_worker_and_single_point() {
		let mut kmean = KMeans::new(PointStore::from_coords(vec![(-1.0f64, 8.0)]));
		let conf = KMeansConfig::build().random_seed(4).worker_count(1).build();
		let res = kmean.kmeans_parallel(1, KMeans::init_bounding_box, &conf).unwrap();
		assert_eq!(res.iterations, 2);
		assert_eq!(res.centroids, vec![Centroid::new(-1.0, 8.0)]);
	}

	#[test]
	fn ties_are_resolved_within_range() {
		// Every point is equidistant to both centroids on the first pass
		let points = PointStore::from_coords((0..64).map(|i| (0.0f64, i as f64)));
		let initial_centroids = vec![Centroid::new(-1.0, 0.0), Centroid::new(1.0, 0.0)];
		let mut kmean = KMeans::new(points);
		let conf = KMeansConfig::build().random_seed(12).worker_count(4).build();
		let res = kmean.kmeans_parallel(2, KMeans::init_precomputed(initial_centroids), &conf).unwrap();

		assert!(res.converged);
		assert_cluster_invariants(kmean.points(), &res);
	}

	#[test]
	fn empty_cluster_handling() {
		// Two groups of 10 points. With 2 workers, each worker's chunk holds exactly one group,
		// so every worker contributes nothing to the other group's cluster.
		let points = PointStore::from_coords((0..20).map(|i| {
			let (g, j) = ((i / 10) as f64, (i % 10) as f64);
			(g * 100.0 + j * 0.1, j * 0.07)
		}));
		let initial_centroids = vec![
			Centroid::new(0.0, 0.0), Centroid::new(100.0, 0.0),
			Centroid::new(-5000.0, 0.0), Centroid::new(5000.0, 0.0)];

		let after_first_update = RefCell::new(None);
		let observe = |s: &KMeansState<f64>, nr: usize, _changed: usize| {
			if nr == 1 {
				*after_first_update.borrow_mut() = Some(s.clone());
			}
		};
		let mut kmean = KMeans::new(points);
		let conf = KMeansConfig::build().random_seed(21).worker_count(2).iteration_done(&observe).build();
		let res = kmean.kmeans_parallel(4, KMeans::init_precomputed(initial_centroids), &conf).unwrap();

		let first = after_first_update.borrow().clone().unwrap();
		assert_eq!(first.centroid_frequency, vec![10, 10, 0, 0]);
		assert_approx_eq!(first.centroids[0].x, 0.45, 1e-12);
		assert_approx_eq!(first.centroids[0].y, 0.315, 1e-12);
		assert_approx_eq!(first.centroids[1].x, 100.45, 1e-12);
		assert_approx_eq!(first.centroids[1].y, 0.315, 1e-12);
		// Reseeded from existing points, instead of staying out there (or becoming NaN)
		for c in &first.centroids[2..] {
			assert!(kmean.points().iter().any(|p| Centroid::from(p) == *c));
		}

		assert!(res.converged);
		assert_cluster_invariants(kmean.points(), &res);
	}

	#[test]
	fn worker_chunk_without_points_of_a_cluster() {
		let mut points = PointStore::from_coords((0..20).map(|i| (i as f64, 0.0))).into_vec();
		points.iter_mut().enumerate().for_each(|(i, p)| p.cluster = Some(if i < 10 { 0 } else { 1 }));

		let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
		let sums = pool.install(|| ParallelLloyd::accumulate(points.as_slice(), 3, 2));
		assert_eq!(sums.count, vec![10, 10, 0]);
		assert_eq!(sums.sum_x, vec![45.0, 145.0, 0.0]);
		assert_eq!(sums.sum_y, vec![0.0, 0.0, 0.0]);

		let kmean = KMeans::new(PointStore::new(points));
		let mut state = KMeansState::new(3);
		let mut rnd = StdRng::seed_from_u64(2);
		kmean.update_centroids(&mut state, &sums, &mut rnd);
		assert_eq!(state.centroid_frequency, vec![10, 10, 0]);
		assert_eq!(state.centroids[0], Centroid::new(4.5, 0.0));
		assert_eq!(state.centroids[1], Centroid::new(14.5, 0.0));
		assert!(kmean.points().iter().any(|p| Centroid::from(p) == state.centroids[2]));
	}
}
