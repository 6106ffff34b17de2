use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::grid::{Coord, Grid};
use crate::terrain::Terrain;

/// Arena handle for a plant. Plants are owned by the game's arena and
/// referenced by handle everywhere else; handles stay valid for the life of
/// the game because plants are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlantId(pub usize);

/// A capacity-limited service facility fixed at one grid cell.
#[derive(Debug, Clone)]
pub struct Plant {
    location: Coord,
    capacity: u32,
    in_service: u32,
    serviceable_area: HashMap<Coord, f64>,
    serviced_map: HashMap<Coord, u32>,
}

impl Plant {
    pub fn new(terrain: &Terrain, location: Coord, capacity: u32, service_radius: f64) -> Self {
        let serviceable_area = serviceable_area(terrain, location, service_radius);
        let serviced_map = serviceable_area.keys().map(|&coord| (coord, 0)).collect();
        Self {
            location,
            capacity,
            in_service: 0,
            serviceable_area,
            serviced_map,
        }
    }

    pub fn location(&self) -> Coord {
        self.location
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn in_service(&self) -> u32 {
        self.in_service
    }

    pub fn remaining_capacity(&self) -> u32 {
        self.capacity - self.in_service
    }

    pub fn is_serviceable(&self, coord: Coord) -> bool {
        self.serviceable_area.contains_key(&coord)
    }

    /// Recorded traversal cost to a coordinate, if it is serviceable.
    pub fn distance_to(&self, coord: Coord) -> Option<f64> {
        self.serviceable_area.get(&coord).copied()
    }

    pub fn serviced_at(&self, coord: Coord) -> u32 {
        self.serviced_map.get(&coord).copied().unwrap_or(0)
    }

    pub fn serviceable_area(&self) -> &HashMap<Coord, f64> {
        &self.serviceable_area
    }

    pub fn serviced_map(&self) -> &HashMap<Coord, u32> {
        &self.serviced_map
    }

    /// Adjust the serviced count at a coordinate by `delta` (may be negative).
    ///
    /// Violating the capacity bound, draining below zero, or touching a cell
    /// outside the serviceable area is a caller bug and panics immediately;
    /// clamping silently would corrupt the assignment invariant for the rest
    /// of the run.
    pub fn change_serviced_pop(&mut self, coord: Coord, delta: i64) {
        let entry = self
            .serviced_map
            .get_mut(&coord)
            .unwrap_or_else(|| panic!("({}, {}) is not serviceable", coord.x, coord.y));
        let updated = *entry as i64 + delta;
        assert!(updated >= 0, "serviced count at cell would go negative");
        let in_service = self.in_service as i64 + delta;
        assert!(in_service >= 0, "plant in-service count would go negative");
        assert!(
            in_service <= self.capacity as i64,
            "plant capacity exceeded"
        );
        *entry = updated as u32;
        self.in_service = in_service as u32;
    }
}

/// Bounded-cost flood fill of the cells a plant can reach.
///
/// Breadth-first FIFO expansion over the 4-neighborhood; a neighbor is
/// admitted when the cumulative cost of the expansion path stays within the
/// budget, and the first admission fixes its recorded cost. On mixed terrain
/// this is not a least-cost search: a cell first reached through an expensive
/// path keeps that cost even if a cheaper path exists. Uniform terrain is
/// unaffected, where the area is exactly the L1 ball of the budget radius.
/// The plant's own cell is always part of the area, at cost zero.
fn serviceable_area(terrain: &Terrain, origin: Coord, budget: f64) -> HashMap<Coord, f64> {
    let mut area = HashMap::new();
    let mut visited: Grid<bool> = Grid::new(terrain.width(), terrain.height());
    let mut queue = VecDeque::new();

    area.insert(origin, 0.0);
    *visited.at_mut(origin) = true;
    queue.push_back((origin, 0.0));

    while let Some((coord, cost)) = queue.pop_front() {
        for neighbor in coord.neighbors() {
            if !terrain.in_bounds(neighbor) || *visited.at(neighbor) {
                continue;
            }
            let reached = cost + terrain.weight_at(neighbor);
            if reached <= budget {
                area.insert(neighbor, reached);
                *visited.at_mut(neighbor) = true;
                queue.push_back((neighbor, reached));
            }
        }
    }
    area
}
