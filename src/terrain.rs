use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::{Coord, Grid};

pub const GRASSLAND_WEIGHT: f64 = 1.0;
pub const MOUNTAIN_WEIGHT: f64 = 100.0;
pub const WATER_WEIGHT: f64 = f64::INFINITY;

const WATER_THRESHOLD: f64 = 0.3;
const MOUNTAIN_THRESHOLD: f64 = 0.7;

/// Spacing of the noise lattice used by `Terrain::generate`.
const NOISE_CELL: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Grassland,
    Mountain,
    Water,
}

impl Default for TerrainKind {
    fn default() -> Self {
        TerrainKind::Grassland
    }
}

impl TerrainKind {
    pub fn weight(self) -> f64 {
        match self {
            TerrainKind::Grassland => GRASSLAND_WEIGHT,
            TerrainKind::Mountain => MOUNTAIN_WEIGHT,
            TerrainKind::Water => WATER_WEIGHT,
        }
    }
}

/// Traversal-cost grid, fixed for the lifetime of a game.
#[derive(Debug, Clone)]
pub struct Terrain {
    kinds: Grid<TerrainKind>,
}

impl Terrain {
    /// Generate terrain from smoothed value noise. Lattice values are drawn
    /// from `rng` and bilinearly interpolated so neighboring cells correlate.
    pub fn generate(width: u32, height: u32, rng: &mut impl Rng) -> Self {
        let lattice_w = width / NOISE_CELL + 2;
        let lattice_h = height / NOISE_CELL + 2;
        let mut lattice: Grid<f64> = Grid::new(lattice_w, lattice_h);
        for coord in lattice.coords().collect::<Vec<_>>() {
            *lattice.at_mut(coord) = rng.gen_range(0.0..1.0);
        }

        let mut kinds = Grid::new(width, height);
        for coord in kinds.coords().collect::<Vec<_>>() {
            let fx = coord.x as f64 / NOISE_CELL as f64;
            let fy = coord.y as f64 / NOISE_CELL as f64;
            let (x0, y0) = (fx.floor() as i32, fy.floor() as i32);
            let (tx, ty) = (fx - x0 as f64, fy - y0 as f64);
            let sample = |dx: i32, dy: i32| *lattice.at(Coord::new(x0 + dx, y0 + dy));
            let top = sample(0, 0) * (1.0 - tx) + sample(1, 0) * tx;
            let bottom = sample(0, 1) * (1.0 - tx) + sample(1, 1) * tx;
            let value = top * (1.0 - ty) + bottom * ty;

            *kinds.at_mut(coord) = if value < WATER_THRESHOLD {
                TerrainKind::Water
            } else if value >= MOUNTAIN_THRESHOLD {
                TerrainKind::Mountain
            } else {
                TerrainKind::Grassland
            };
        }
        Self { kinds }
    }

    /// Unobstructed grassland everywhere.
    pub fn uniform(width: u32, height: u32) -> Self {
        Self {
            kinds: Grid::new(width, height),
        }
    }

    /// Grassland with a water ring around (1, 1). Test fixture for
    /// reachability: a plant at (1, 1) with a budget below the water weight
    /// can reach nothing beyond its own cell.
    pub fn with_moat(width: u32, height: u32) -> Self {
        let mut kinds: Grid<TerrainKind> = Grid::new(width, height);
        for coord in [
            Coord::new(0, 1),
            Coord::new(1, 0),
            Coord::new(1, 2),
            Coord::new(2, 1),
        ] {
            *kinds.at_mut(coord) = TerrainKind::Water;
        }
        Self { kinds }
    }

    pub fn from_kinds(kinds: Grid<TerrainKind>) -> Self {
        Self { kinds }
    }

    pub fn width(&self) -> u32 {
        self.kinds.width()
    }

    pub fn height(&self) -> u32 {
        self.kinds.height()
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        self.kinds.in_bounds(coord)
    }

    pub fn kind_at(&self, coord: Coord) -> TerrainKind {
        *self.kinds.at(coord)
    }

    /// Cost to traverse into this cell, summed additively along a path.
    pub fn weight_at(&self, coord: Coord) -> f64 {
        self.kind_at(coord).weight()
    }

    /// Whether a plant may be placed on this cell. Water and mountains are
    /// out; out-of-bounds coordinates are the caller's problem.
    pub fn is_buildable(&self, coord: Coord) -> bool {
        self.kind_at(coord) == TerrainKind::Grassland
    }

    pub fn kinds(&self) -> &Grid<TerrainKind> {
        &self.kinds
    }
}
