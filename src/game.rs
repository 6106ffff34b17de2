use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::grid::{Coord, Grid};
use crate::growth::GrowthModel;
use crate::plant::{Plant, PlantId};
use crate::population::PopulationMatrix;
use crate::rng::RngManager;
use crate::terrain::Terrain;

/// Per-plant construction parameters, shared by every plant in a game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlantParams {
    pub capacity: u32,
    pub service_radius: f64,
}

/// Cost model feeding the running objective.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CostParams {
    pub initial_cost: f64,
    pub operating_cost: f64,
    pub profit_margin: f64,
    pub unserviced_penalty: f64,
}

/// A placement decision fed into `Game::step`, produced by a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Build(Coord),
    Hold,
}

/// What happened to the placement decision during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlacementOutcome {
    /// A new plant was built at the coordinate.
    Built(Coord),
    /// The coordinate was occupied or not buildable; deliberately a no-op.
    Ignored(Coord),
    /// The coordinate was out of bounds; the step mutated nothing placement
    /// related.
    Rejected(Coord),
    /// The decision was `Hold`.
    Held,
}

/// Per-step report, the driver's window into the simulation.
#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
    pub tick: u64,
    pub placement: PlacementOutcome,
    pub growth_added: u64,
    pub serviced_total: u64,
    pub unserviced_total: u64,
    pub plant_count: usize,
    pub objective: f64,
}

/// The simulation: terrain, plant arena, population bookkeeping, and the
/// step state machine (growth, sweep, placement and cascade, accounting).
///
/// Plants live in an append-only arena; insertion order is the total order
/// used to break distance ties, which keeps runs deterministic.
pub struct Game {
    terrain: Terrain,
    growth: Box<dyn GrowthModel>,
    plants: Vec<Plant>,
    pop: PopulationMatrix,
    plant_params: PlantParams,
    costs: CostParams,
    rng: RngManager,
    funds: f64,
    tick: u64,
    plants_in_service: u32,
    plants_new_this_step: u32,
}

impl Game {
    pub fn new(
        terrain: Terrain,
        growth: Box<dyn GrowthModel>,
        plant_params: PlantParams,
        costs: CostParams,
        seed: u64,
    ) -> Self {
        let (width, height) = (terrain.width(), terrain.height());
        Self {
            terrain,
            growth,
            plants: Vec::new(),
            pop: PopulationMatrix::new(width, height),
            plant_params,
            costs,
            rng: RngManager::new(seed),
            funds: 0.0,
            tick: 0,
            plants_in_service: 0,
            plants_new_this_step: 0,
        }
    }

    /// Advance the simulation one tick. Runs to completion; no partial-step
    /// state is ever observable.
    pub fn step(&mut self, decision: Placement) -> StepSummary {
        // 1. Growth injection.
        let total = self.pop.total_grid();
        let growth_grid = self.growth.generate(
            &total,
            &self.terrain,
            self.tick,
            &mut self.rng.stream("growth"),
        );
        let growth_added = growth_grid.total();
        self.pop.add_unserviced(&growth_grid);

        // 2. Unserviced sweep.
        self.process_unserviced_population();

        // 3. Optional plant placement plus cascading reassignment.
        let placement = match decision {
            Placement::Hold => PlacementOutcome::Held,
            Placement::Build(coord) => self.try_place_plant(coord),
        };

        // 4. Accounting.
        let objective = self.objective();
        self.funds = objective;
        self.plants_in_service += self.plants_new_this_step;
        self.plants_new_this_step = 0;
        self.tick += 1;

        StepSummary {
            tick: self.tick,
            placement,
            growth_added,
            serviced_total: self.pop.total_serviced(),
            unserviced_total: self.pop.total_unserviced(),
            plant_count: self.plants.len(),
            objective,
        }
    }

    /// The nearest plant that services `coord` with spare capacity.
    /// Distance ties go to the earlier-built plant.
    pub fn find_best_plant(&self, coord: Coord) -> Option<PlantId> {
        let mut best: Option<(PlantId, f64)> = None;
        for (index, plant) in self.plants.iter().enumerate() {
            if plant.remaining_capacity() == 0 {
                continue;
            }
            let Some(distance) = plant.distance_to(coord) else {
                continue;
            };
            if best.map(|(_, d)| distance < d).unwrap_or(true) {
                best = Some((PlantId(index), distance));
            }
        }
        best.map(|(id, _)| id)
    }

    fn process_unserviced_population(&mut self) {
        for coord in self.pop.unserviced_grid().coords().collect::<Vec<_>>() {
            self.process_unserviced_element(coord);
        }
    }

    /// Drain a cell's unserviced population into nearby plants until either
    /// the cell is empty or no reachable plant has room. Leftover people stay
    /// unserviced; plants do not scale.
    fn process_unserviced_element(&mut self, coord: Coord) {
        loop {
            let waiting = self.pop.unserviced_at(coord);
            if waiting == 0 {
                break;
            }
            let Some(id) = self.find_best_plant(coord) else {
                break;
            };
            let plant = &mut self.plants[id.0];
            let take = waiting.min(plant.remaining_capacity());
            self.pop.assign_unserviced(id, plant, coord, take);
        }
    }

    fn try_place_plant(&mut self, coord: Coord) -> PlacementOutcome {
        if !self.terrain.in_bounds(coord) {
            return PlacementOutcome::Rejected(coord);
        }
        let occupied = self.plants.iter().any(|p| p.location() == coord);
        if occupied || !self.terrain.is_buildable(coord) {
            return PlacementOutcome::Ignored(coord);
        }
        let id = self.create_plant(coord);
        let touched = self.consider_new_plant(id);
        self.process_touched_plants(touched);
        PlacementOutcome::Built(coord)
    }

    fn create_plant(&mut self, coord: Coord) -> PlantId {
        self.plants_new_this_step += 1;
        self.plants.push(Plant::new(
            &self.terrain,
            coord,
            self.plant_params.capacity,
            self.plant_params.service_radius,
        ));
        PlantId(self.plants.len() - 1)
    }

    /// Reassignment pass for a plant treated as newly available capacity.
    ///
    /// For every coordinate the plant reaches: first satisfy unserviced
    /// population there under the normal sweep rule, then pull assignments
    /// from plants that sit strictly farther from the coordinate. Returns the
    /// plants population was pulled from.
    fn consider_new_plant(&mut self, id: PlantId) -> VecDeque<PlantId> {
        let mut touched = VecDeque::new();
        let potential = self
            .pop
            .potential_pop_for_plant(&self.plants[id.0], &self.plants);
        for entry in potential {
            self.process_unserviced_element(entry.coord);
            for (other_id, snapshot_count) in entry.stealable {
                if self.plants[id.0].remaining_capacity() == 0 {
                    break;
                }
                // The sweep above may have shifted counts; trust the current
                // assignment, never the snapshot alone.
                let current = self.pop.serviced_at_by(entry.coord, other_id);
                let take = snapshot_count
                    .min(current)
                    .min(self.plants[id.0].remaining_capacity());
                if take == 0 {
                    continue;
                }
                let (from, to) = pair_mut(&mut self.plants, other_id.0, id.0);
                self.pop
                    .move_between_plants(other_id, from, id, to, entry.coord, take);
                touched.push_back(other_id);
            }
        }
        touched
    }

    /// Touched plants get exactly one reassignment pass of their own and may
    /// not enqueue further work. Bounded propagation, not a fixed point: the
    /// result is a best-effort local reoptimization with a capped step cost.
    fn process_touched_plants(&mut self, mut touched: VecDeque<PlantId>) {
        while let Some(id) = touched.pop_front() {
            let _ = self.consider_new_plant(id);
        }
    }

    /// Running objective. Funds carry forward step to step; this is the
    /// fitness signal an outer placement policy reads.
    pub fn objective(&self) -> f64 {
        self.funds - self.costs.operating_cost * self.plants_in_service as f64
            - self.costs.initial_cost * self.plants_new_this_step as f64
            - self.costs.unserviced_penalty * self.pop.total_unserviced() as f64
            + self.costs.profit_margin * self.pop.total_serviced() as f64
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn funds(&self) -> f64 {
        self.funds
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn population(&self) -> &PopulationMatrix {
        &self.pop
    }

    pub fn plant(&self, id: PlantId) -> &Plant {
        &self.plants[id.0]
    }

    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    pub fn plant_locations(&self) -> Vec<Coord> {
        self.plants.iter().map(|p| p.location()).collect()
    }

    pub fn plants_in_service(&self) -> u32 {
        self.plants_in_service
    }

    pub fn total_grid(&self) -> Grid<u32> {
        self.pop.total_grid()
    }
}

fn pair_mut(plants: &mut [Plant], a: usize, b: usize) -> (&mut Plant, &mut Plant) {
    assert_ne!(a, b, "a plant cannot trade population with itself");
    if a < b {
        let (left, right) = plants.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = plants.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
