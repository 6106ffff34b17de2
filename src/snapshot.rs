use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::game::Game;
use crate::grid::Grid;
use crate::terrain::TerrainKind;

/// Full game state as written to disk every snapshot interval.
#[derive(Debug, Serialize)]
pub struct GameSnapshot {
    pub scenario: String,
    pub tick: u64,
    pub funds: f64,
    pub objective: f64,
    pub serviced_total: u64,
    pub unserviced_total: u64,
    pub plants: Vec<PlantSnapshot>,
    pub terrain: Grid<TerrainKind>,
    pub serviced: Grid<u32>,
    pub unserviced: Grid<u32>,
}

#[derive(Debug, Serialize)]
pub struct PlantSnapshot {
    pub x: i32,
    pub y: i32,
    pub capacity: u32,
    pub in_service: u32,
}

impl GameSnapshot {
    pub fn capture(scenario: &str, game: &Game) -> Self {
        Self {
            scenario: scenario.to_string(),
            tick: game.tick(),
            funds: game.funds(),
            objective: game.objective(),
            serviced_total: game.population().total_serviced(),
            unserviced_total: game.population().total_unserviced(),
            plants: game
                .plants()
                .iter()
                .map(|plant| PlantSnapshot {
                    x: plant.location().x,
                    y: plant.location().y,
                    capacity: plant.capacity(),
                    in_service: plant.in_service(),
                })
                .collect(),
            terrain: game.terrain().kinds().clone(),
            serviced: game.population().serviced_grid().clone(),
            unserviced: game.population().unserviced_grid().clone(),
        }
    }
}

/// Writes a JSON snapshot of the game every `interval_ticks` ticks.
/// An interval of zero disables snapshots.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval_ticks: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval_ticks,
        }
    }

    pub fn maybe_write(&self, scenario: &str, game: &Game) -> Result<Option<PathBuf>> {
        if self.interval_ticks == 0 || game.tick() % self.interval_ticks != 0 {
            return Ok(None);
        }
        let dir = self.dir.join(scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("tick_{:06}.json", game.tick()));
        let snapshot = GameSnapshot::capture(scenario, game);
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}
