use crate::{io, AbortStrategy, KMeans, KMeansConfig, KMeansError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Point counts of the default sweep.
pub const DEFAULT_SWEEP_SIZES: [usize; 7] = [100000, 200000, 300000, 400000, 600000, 800000, 1000000];
/// Runs per point count of the default sweep.
pub const DEFAULT_TRIALS: usize = 10;

/// Options of a single clustering experiment.
///
/// ## Fields
/// - **k**: Amount of clusters
/// - **worker_count**: `1` runs the sequential variant, everything else the parallel one (`0` = one worker per cpu)
/// - **seed**: Seed of the random source, OS entropy if `None`
/// - **max_iter**: Optional cap on the amount of assignment passes
/// - **output_dir**: Directory the result file is written to
#[derive(Clone, Debug, PartialEq)]
pub struct ExperimentConfig {
    pub k: usize,
    pub worker_count: usize,
    pub seed: Option<u64>,
    pub max_iter: Option<usize>,
    pub output_dir: PathBuf,
}
impl Default for ExperimentConfig {
    fn default() -> Self {
        Self { k: 5, worker_count: 1, seed: None, max_iter: None, output_dir: PathBuf::from(".") }
    }
}
impl ExperimentConfig {
    fn kmeans_config<'a>(&self) -> KMeansConfig<'a, f64> {
        let mut builder = KMeansConfig::build().worker_count(self.worker_count);
        if let Some(seed) = self.seed {
            builder = builder.random_seed(seed);
        }
        if let Some(max_iter) = self.max_iter {
            builder = builder.abort_strategy(AbortStrategy::FixedPointOrMaxIterations { max_iter });
        }
        builder.build()
    }
}

/// Load **input**, cluster it, and write `{n}_results.csv` into the configured output directory.
///
/// Returns the wall-clock time of the clustering loop alone. An unreadable input or an empty point set
/// are logged and yield a zero duration. A failing result write is logged as well, the clustering time is
/// still returned. Malformed records and invalid cluster counts are returned as errors.
pub fn run_experiment<P: AsRef<Path>>(input: P, config: &ExperimentConfig) -> Result<Duration> {
    let input = input.as_ref();
    let points = match io::read_points::<f64, _>(input) {
        Ok(points) => points,
        Err(err @ KMeansError::Input { .. }) => {
            log::error!("{}", err);
            return Ok(Duration::ZERO);
        }
        Err(err) => return Err(err),
    };
    if points.is_empty() {
        log::error!("No points to cluster in {}", input.display());
        return Ok(Duration::ZERO);
    }

    let mut kmean = KMeans::new(points);
    let state = kmean.cluster(config.k, &config.kmeans_config())?;

    let output = config.output_dir.join(io::results_file_name(kmean.points().len()));
    if let Err(err) = io::write_results(&output, kmean.points()) {
        log::error!("{}", err);
    }
    Ok(state.elapsed)
}

/// Mean clustering time over all trials for one point count.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepResult {
    pub size: usize,
    pub trials: usize,
    pub mean: Duration,
}
impl SweepResult {
    pub fn mean_ms(&self) -> f64 {
        self.mean.as_secs_f64() * 1000.0
    }
}

/// Run **trials** experiments on `{size}_data.csv` (looked up in **data_dir**) for every size.
pub fn sweep(sizes: &[usize], trials: usize, data_dir: &Path, config: &ExperimentConfig) -> Result<Vec<SweepResult>> {
    let mut results = Vec::with_capacity(sizes.len());
    for &size in sizes {
        let input = data_dir.join(io::data_file_name(size));
        let mut total = Duration::ZERO;
        for trial in 0..trials {
            let elapsed = run_experiment(&input, config)?;
            log::debug!("{} points, trial {}: {:?}", size, trial + 1, elapsed);
            total += elapsed;
        }
        let mean = if trials == 0 { Duration::ZERO } else { total.div_f64(trials as f64) };
        let result = SweepResult { size, trials, mean };
        log::info!("{} points: mean clustering time {:.3} ms over {} trials", size, result.mean_ms(), trials);
        results.push(result);
    }
    Ok(results)
}
