use crate::{KMeans, KMeansState, KMeansConfig, memory::*};

#[inline(always)]
pub fn calculate<T: Primitive>(
    _kmean: &KMeans<T>, state: &mut KMeansState<T>, _config: &KMeansConfig<'_, T>, computed: Vec<Centroid<T>>,
) {
    if computed.len() > state.k {
        panic!("Initialized with more centroids than k");
    }
    computed.into_iter().enumerate().for_each(|(ci, c)| {
        state.set_centroid(ci, c);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AbortStrategy;

    #[test]
    fn train_with_precomputed_centroids() {
        let points = PointStore::from_coords(vec![(0.0f64, 0.0), (1.0, 0.0), (10.0, 0.0), (11.0, 0.0), (20.0, 0.0), (21.0, 0.0)]);
        let centroids = vec![Centroid::new(0.0, 0.0), Centroid::new(21.0, 0.0)];

        let mut kmean = KMeans::new(points);
        let conf = KMeansConfig::build().random_seed(1).build();
        let result = kmean.kmeans_sequential(2, KMeans::init_precomputed(centroids), &conf).unwrap();

        // 10 is closer to 0 than to 21, 11 is not. The means then keep that split.
        assert_eq!(result.centroids, vec![Centroid::new(11.0 / 3.0, 0.0), Centroid::new(52.0 / 3.0, 0.0)]);
        assert_eq!(result.centroid_frequency, vec![3, 3]);
        assert_eq!(result.iterations, 2);
        assert!(result.converged);
    }

    #[test]
    fn init_done_sees_precomputed_centroids() {
        let points = PointStore::from_coords(vec![(0.0f64, 0.0), (4.0, 4.0)]);
        let centroids = vec![Centroid::new(1.0, 1.0), Centroid::new(3.0, 3.0)];
        let check = |s: &KMeansState<f64>| assert_eq!(s.centroids, vec![Centroid::new(1.0, 1.0), Centroid::new(3.0, 3.0)]);

        let mut kmean = KMeans::new(points);
        let conf = KMeansConfig::build()
            .init_done(&check)
            .abort_strategy(AbortStrategy::FixedPointOrMaxIterations { max_iter: 1 })
            .build();
        kmean.kmeans_sequential(2, KMeans::init_precomputed(centroids), &conf).unwrap();
    }

    #[test]
    #[should_panic]
    fn too_many_centroids() {
        let kmean = KMeans::new(PointStore::from_coords(vec![(0.0f64, 0.0)]));
        let mut state = KMeansState::new(1);
        calculate(&kmean, &mut state, &KMeansConfig::default(), vec![Centroid::default(); 2]);
    }
}
