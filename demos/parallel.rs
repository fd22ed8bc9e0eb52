use kmeans2d::*;
use rand::prelude::*;

fn main() {
    let (sample_cnt, k, worker_count) = (200000, 8, 4);

    // Generate some random data
    let mut rnd = StdRng::seed_from_u64(1337);
    let points: PointStore<f64> = PointStore::from_coords((0..sample_cnt).map(|_| (rnd.gen_range(0.0..1000.0), rnd.gen_range(0.0..1000.0))));

    let conf = KMeansConfig::build()
        .init_done(&|s: &KMeansState<f64>| println!("Initialization completed: {:?}", s.centroids))
        .iteration_done(&|_, nr, changed| println!("Iteration {} - {} points changed their cluster", nr, changed))
        .worker_count(worker_count)
        .random_seed(42)
        .build();

    // Calculate kmeans on 4 workers, using bounding-box initialization
    let mut kmean = KMeans::new(points);
    let result = kmean.kmeans_parallel(k, KMeans::init_bounding_box, &conf).unwrap();

    println!("Centroids: {:?}", result.centroids);
    println!("Cluster sizes: {:?}", result.centroid_frequency);
    println!("Error: {}", result.distsum);
    println!("Clustering took {:?} over {} iterations", result.elapsed, result.iterations);
}
