use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use gridplant::{
    game::Placement,
    policy::RandomPolicy,
    rng::RngManager,
    scenario::{PolicyConfig, ScenarioLoader},
    snapshot::SnapshotWriter,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Plant placement simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/small_valley.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override snapshot interval in ticks (0 disables snapshots)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long, default_value = "snapshots")]
    snapshot_dir: PathBuf,

    /// Override the scenario's random seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    let ticks = scenario.ticks(cli.ticks);
    let snapshot_interval = cli
        .snapshot_interval
        .unwrap_or(scenario.snapshot_interval_ticks);
    let writer = SnapshotWriter::new(&cli.snapshot_dir, snapshot_interval);

    let mut game = scenario.build_game();
    let cluster_policy = scenario.cluster_policy();
    let mut rng = RngManager::new(scenario.seed);

    for _ in 0..ticks {
        let decision = match (&scenario.policy, &cluster_policy) {
            (PolicyConfig::Random, _) => {
                RandomPolicy.decide(game.population(), &mut rng.stream("policy"))
            }
            (_, Some(policy)) => policy.decide(game.population(), &mut rng.stream("policy"))?,
            _ => Placement::Hold,
        };
        let summary = game.step(decision);
        writer.maybe_write(&scenario.name, &game)?;
        println!(
            "tick {:>4}  plants {:>3}  serviced {:>6}  unserviced {:>6}  objective {:>12.2}  {:?}",
            summary.tick,
            summary.plant_count,
            summary.serviced_total,
            summary.unserviced_total,
            summary.objective,
            summary.placement,
        );
    }

    println!(
        "Scenario '{}' completed after {} ticks: {} plants, {} serviced, {} unserviced, objective {:.2}",
        scenario.name,
        ticks,
        game.plant_count(),
        game.population().total_serviced(),
        game.population().total_unserviced(),
        game.objective(),
    );
    Ok(())
}
