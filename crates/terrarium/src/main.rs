use clap::Parser;
use terrarium::config::{AppConfig, DEFAULT_CONFIG_FILE};
use terrarium::headless;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file name without the .ron extension
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// World seed
    #[arg(long)]
    seed: Option<u64>,

    /// World preset: default, archipelago, forest, tiny
    #[arg(long)]
    preset: Option<String>,

    /// Number of simulation ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Seconds per tick
    #[arg(long)]
    dt: Option<f32>,

    /// Number of herds
    #[arg(long)]
    herds: Option<usize>,

    /// Creatures per herd
    #[arg(long)]
    herd_size: Option<usize>,

    /// Steer creatures away from water
    #[arg(long)]
    avoid_water: bool,

    /// Print the final report as RON on stdout
    #[arg(long)]
    report: bool,
}

impl Args {
    /// Command-line flags take priority over file and environment settings
    fn apply(&self, config: &mut AppConfig) {
        if let Some(seed) = self.seed {
            config.world.seed = seed;
        }
        if let Some(preset) = &self.preset {
            config.world.preset = preset.clone();
        }
        if self.avoid_water {
            config.world.avoid_water = true;
        }
        if let Some(ticks) = self.ticks {
            config.simulation.ticks = ticks;
        }
        if let Some(dt) = self.dt {
            config.simulation.dt = dt;
        }
        if let Some(herds) = self.herds {
            config.simulation.herds = herds;
        }
        if let Some(herd_size) = self.herd_size {
            config.simulation.herd_size = herd_size;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = AppConfig::load_from(&args.config)?;
    args.apply(&mut config);
    log::info!(
        "Running '{}' world, seed {}, {} ticks",
        config.world.preset,
        config.world.seed,
        config.simulation.ticks
    );

    let report = headless::run(&config)?;
    if args.report {
        println!("{}", report.to_ron()?);
    }
    Ok(())
}
