use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use kmeans2d::experiment::{self, ExperimentConfig, DEFAULT_SWEEP_SIZES, DEFAULT_TRIALS};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cluster a single `x,y` CSV file and write `<n>_results.csv`
    #[clap(name = "run")]
    Run {
        /// Input file
        input: PathBuf,

        #[arg(short, long, default_value_t = 8)]
        k: usize,

        /// Amount of workers, 1 runs the sequential variant [default: available cpus]
        #[arg(short, long)]
        workers: Option<usize>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Average the clustering time over multiple runs on `<size>_data.csv` files
    #[clap(name = "sweep")]
    Sweep {
        /// Directory holding the `<size>_data.csv` files
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,

        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SWEEP_SIZES)]
        sizes: Vec<usize>,

        #[arg(long, default_value_t = DEFAULT_TRIALS)]
        trials: usize,

        #[arg(short, long, default_value_t = 5)]
        k: usize,

        #[arg(short, long, default_value_t = 1)]
        workers: usize,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Seed of the random source [default: OS entropy]
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many assignment passes, even without convergence
    #[arg(long)]
    max_iter: Option<usize>,

    /// Directory the result files are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}
impl CommonArgs {
    fn into_config(self, k: usize, worker_count: usize) -> ExperimentConfig {
        ExperimentConfig { k, worker_count, seed: self.seed, max_iter: self.max_iter, output_dir: self.output_dir }
    }
}

fn available_cpus() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().filter_or("RUST_LOG", "info"));

    match Args::parse().command {
        Command::Run { input, k, workers, common } => {
            let config = common.into_config(k, workers.unwrap_or_else(available_cpus));
            let elapsed = experiment::run_experiment(&input, &config)
                .with_context(|| format!("clustering {} failed", input.display()))?;
            println!("Clustering time: {:.3} ms", elapsed.as_secs_f64() * 1000.0);
        }
        Command::Sweep { data_dir, sizes, trials, k, workers, common } => {
            if trials == 0 {
                bail!("at least one trial per size is required");
            }
            let config = common.into_config(k, workers);
            let results = experiment::sweep(&sizes, trials, &data_dir, &config)
                .with_context(|| format!("sweep over {} failed", data_dir.display()))?;
            for result in results {
                println!("{} points: mean clustering time {:.3} ms", result.size, result.mean_ms());
            }
        }
    }
    Ok(())
}
