use rand::{Rng, RngCore};

use crate::grid::{Coord, Grid};
use crate::terrain::{Terrain, TerrainKind};

/// Produces the per-step grid of new population to inject.
///
/// Implementations must be deterministic given the supplied RNG stream.
pub trait GrowthModel {
    fn generate(
        &mut self,
        total_pop: &Grid<u32>,
        terrain: &Terrain,
        tick: u64,
        rng: &mut dyn RngCore,
    ) -> Grid<u32>;
}

/// Random growth, biased toward cells that already hold people. Water cells
/// never receive growth.
pub struct NoiseGrowth {
    /// Added to the noise draw for already-populated cells, so settlements
    /// tend to densify rather than scatter.
    pub settlement_bias: f64,
}

impl Default for NoiseGrowth {
    fn default() -> Self {
        Self {
            settlement_bias: 0.2,
        }
    }
}

impl GrowthModel for NoiseGrowth {
    fn generate(
        &mut self,
        total_pop: &Grid<u32>,
        terrain: &Terrain,
        _tick: u64,
        rng: &mut dyn RngCore,
    ) -> Grid<u32> {
        let mut growth = Grid::new(total_pop.width(), total_pop.height());
        for (coord, &existing) in total_pop.iter() {
            // Draw unconditionally so skipped cells do not shift the stream.
            let mut noise: f64 = rng.gen_range(-1.0..1.0);
            if terrain.kind_at(coord) == TerrainKind::Water {
                continue;
            }
            if existing > 0 {
                noise += self.settlement_bias;
            }
            if noise > 0.0 {
                *growth.at_mut(coord) = (10.0 * noise).ceil() as u32;
            }
        }
        growth
    }
}

/// Test double: replays a scripted sequence of growth grids, then nothing.
pub struct FixedGrowth {
    queued: Vec<Grid<u32>>,
    next: usize,
}

impl FixedGrowth {
    pub fn new(grids: Vec<Grid<u32>>) -> Self {
        Self {
            queued: grids,
            next: 0,
        }
    }

    /// A single burst of `n` people at one cell.
    pub fn burst_at(width: u32, height: u32, coord: Coord, n: u32) -> Self {
        let mut grid = Grid::new(width, height);
        *grid.at_mut(coord) = n;
        Self::new(vec![grid])
    }
}

impl GrowthModel for FixedGrowth {
    fn generate(
        &mut self,
        total_pop: &Grid<u32>,
        _terrain: &Terrain,
        _tick: u64,
        _rng: &mut dyn RngCore,
    ) -> Grid<u32> {
        match self.queued.get(self.next) {
            Some(grid) => {
                self.next += 1;
                grid.clone()
            }
            None => Grid::new(total_pop.width(), total_pop.height()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn noise_growth_is_deterministic_per_seed() {
        let terrain = Terrain::uniform(8, 8);
        let pop: Grid<u32> = Grid::new(8, 8);
        let mut model = NoiseGrowth::default();
        let a = model.generate(&pop, &terrain, 0, &mut ChaCha8Rng::seed_from_u64(3));
        let b = NoiseGrowth::default().generate(&pop, &terrain, 0, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn no_growth_on_water() {
        let terrain = Terrain::with_moat(4, 4);
        let pop: Grid<u32> = Grid::new(4, 4);
        let mut model = NoiseGrowth::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            let growth = model.generate(&pop, &terrain, 0, &mut rng);
            assert_eq!(*growth.at(Coord::new(0, 1)), 0);
            assert_eq!(*growth.at(Coord::new(1, 0)), 0);
        }
    }

    #[test]
    fn fixed_growth_replays_then_stops() {
        let terrain = Terrain::uniform(4, 4);
        let pop: Grid<u32> = Grid::new(4, 4);
        let mut model = FixedGrowth::burst_at(4, 4, Coord::new(2, 2), 9);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let first = model.generate(&pop, &terrain, 0, &mut rng);
        assert_eq!(*first.at(Coord::new(2, 2)), 9);
        let second = model.generate(&pop, &terrain, 1, &mut rng);
        assert_eq!(second.total(), 0);
    }
}
