use oxiswarm::genomics::GeneticConfig;
use oxiswarm::logging::{EvolutionLogger, ReportingLevel};
use oxiswarm::{Concurrency, Population, PopulationConfig};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use std::fs;
use std::path::{Path, PathBuf};

/// Runs a population toward its targets and records
/// the average and median distance to target of every
/// generation.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// RON file with the run configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of generations, overriding the configuration.
    #[arg(short, long)]
    generations: Option<usize>,
    /// Random seed, overriding the configuration.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Mutate agents one after another instead of on a worker pool.
    #[arg(long)]
    sequential: bool,
    /// Where the recorded averages are written.
    #[arg(short, long, default_value = "distances.ron")]
    output: PathBuf,
    /// Where the recorded medians are written, if anywhere.
    #[arg(short, long)]
    medians: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct RunConfig {
    genetic: GeneticConfig,
    population: PopulationConfig,
    generations: usize,
}

impl Default for RunConfig {
    fn default() -> RunConfig {
        RunConfig {
            genetic: GeneticConfig::default(),
            population: PopulationConfig::default(),
            generations: 65,
        }
    }
}

impl RunConfig {
    fn load(path: Option<&Path>) -> Result<RunConfig> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                ron::from_str(&text).with_context(|| format!("parsing {}", path.display()))
            }
            None => Ok(RunConfig::default()),
        }
    }

    fn apply(&mut self, args: &Args) {
        if let Some(generations) = args.generations {
            self.generations = generations;
        }
        if args.seed.is_some() {
            self.population.seed = args.seed;
        }
        if args.sequential {
            self.population.concurrency = Concurrency::Sequential;
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut run = RunConfig::load(args.config.as_deref())?;
    run.apply(&args);

    info!(
        agents = run.population.size.get(),
        generations = run.generations,
        "starting run"
    );
    let mut population = Population::new(run.population, run.genetic)?;
    let mut logger = EvolutionLogger::new(ReportingLevel::NoAgents);
    for iteration in 0..run.generations {
        logger.log(&population);
        info!(
            iteration,
            average = population.average_distance(),
            median = population.median_distance(),
            "generation"
        );
        population.step_generation();
    }
    debug!(
        latent = ?population.observable_agent_latent_vector(),
        "observable agent"
    );

    let averages = logger.means();
    let medians = logger.medians();
    info!(?averages, ?medians, "run finished");
    if let Err(e) = persist(&args.output, &averages) {
        error!(error = ?e, "could not save distances");
    }
    if let Some(path) = &args.medians {
        if let Err(e) = persist(path, &medians) {
            error!(error = ?e, "could not save medians");
        }
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

fn persist(path: &Path, distances: &[f64]) -> Result<()> {
    let text = ron::to_string(&distances)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}
