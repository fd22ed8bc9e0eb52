use crate::{KMeans, KMeansState, KMeansConfig, Result, memory::*, random::CoinFlip};
use rand::RngCore;
use std::ops::DerefMut;
use std::time::Instant;

pub(crate) struct Lloyd<T> where T: Primitive {
	_p: std::marker::PhantomData<T>
}
impl<T> Lloyd<T> where T: Primitive {
    /// Assign every point to its nearest centroid. Returns the amount of points that changed their cluster.
    pub(crate) fn update_cluster_assignments<C: CoinFlip + ?Sized>(points: &mut [Point<T>], centroids: &[Centroid<T>], coin: &mut C) -> usize {
        points.iter_mut()
            .map(|p| KMeans::assign_point(p, centroids, coin))
            .filter(|changed| *changed)
            .count()
    }

    fn update_centroids(data: &KMeans<T>, state: &mut KMeansState<T>, rnd: &mut dyn RngCore) {
        let sums = ClusterSums::from_points(state.k, data.points.as_slice());
        data.update_centroids(state, &sums, rnd);
    }

    #[inline(always)] pub fn calculate<'a, F>(data: &mut KMeans<T>, k: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) {
        data.check_cluster_count(k)?;

        let mut state = KMeansState::new(k);

        // Initialize clusters and notify subscriber
        init(data, &mut state, config);
        (config.init_done)(&state);
        let mut abort_strategy = config.abort_strategy.create_logic();

        let mut rnd = config.rnd.borrow_mut();
        let rnd = rnd.deref_mut();
        let start = Instant::now();
        for i in 1usize.. {
            let changed = Self::update_cluster_assignments(data.points.as_mut_slice(), &state.centroids, rnd);
            let proceed = abort_strategy.next(changed);
            if proceed {
                Self::update_centroids(data, &mut state, rnd);
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
