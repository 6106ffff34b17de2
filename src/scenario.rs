use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::game::{CostParams, Game, PlantParams};
use crate::growth::NoiseGrowth;
use crate::policy::{CentroidMethod, ClusterPolicy};
use crate::rng::RngManager;
use crate::terrain::Terrain;

fn default_snapshot_interval_ticks() -> u64 {
    30
}

fn default_settlement_bias() -> f64 {
    0.2
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
    pub grid: GridConfig,
    #[serde(default)]
    pub terrain: TerrainConfig,
    pub plant: PlantParams,
    pub costs: CostParams,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default = "default_settlement_bias")]
    pub settlement_bias: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TerrainConfig {
    #[default]
    Noise,
    Uniform,
    Moat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    Cluster {
        k: usize,
        #[serde(default)]
        method: MethodConfig,
    },
    Random,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig::Cluster {
            k: 4,
            method: MethodConfig::Mean,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MethodConfig {
    #[default]
    Mean,
    Median,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn build_game(&self) -> Game {
        let mut rng = RngManager::new(self.seed);
        let (width, height) = (self.grid.width, self.grid.height);
        let terrain = match self.terrain {
            TerrainConfig::Noise => Terrain::generate(width, height, &mut rng.stream("terrain")),
            TerrainConfig::Uniform => Terrain::uniform(width, height),
            TerrainConfig::Moat => Terrain::with_moat(width, height),
        };
        let growth = NoiseGrowth {
            settlement_bias: self.settlement_bias,
        };
        Game::new(terrain, Box::new(growth), self.plant, self.costs, self.seed)
    }

    pub fn cluster_policy(&self) -> Option<ClusterPolicy> {
        match self.policy {
            PolicyConfig::Cluster { k, method } => Some(ClusterPolicy::new(
                k,
                match method {
                    MethodConfig::Mean => CentroidMethod::Mean,
                    MethodConfig::Median => CentroidMethod::Median,
                },
            )),
            _ => None,
        }
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(120)
    }
}
