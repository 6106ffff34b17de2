use std::collections::HashMap;

use crate::grid::{Coord, Grid};
use crate::plant::{Plant, PlantId};

/// Per-cell population bookkeeping: serviced counts, unserviced counts, and
/// the per-cell assignment of serviced people to plants.
///
/// This is the only type that mutates serviced/unserviced counts. Every
/// mutating operation takes the affected plants by `&mut` and updates the
/// plant's serviced map in the same call, so the matrix and the plants can
/// never drift apart.
#[derive(Debug, Clone)]
pub struct PopulationMatrix {
    serviced: Grid<u32>,
    unserviced: Grid<u32>,
    assignment: Grid<HashMap<PlantId, u32>>,
}

impl PopulationMatrix {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            serviced: Grid::new(width, height),
            unserviced: Grid::new(width, height),
            assignment: Grid::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.serviced.width()
    }

    pub fn height(&self) -> u32 {
        self.serviced.height()
    }

    pub fn serviced_at(&self, coord: Coord) -> u32 {
        *self.serviced.at(coord)
    }

    pub fn unserviced_at(&self, coord: Coord) -> u32 {
        *self.unserviced.at(coord)
    }

    pub fn serviced_at_by(&self, coord: Coord, plant: PlantId) -> u32 {
        self.assignment.at(coord).get(&plant).copied().unwrap_or(0)
    }

    pub fn total_at(&self, coord: Coord) -> u32 {
        self.serviced_at(coord) + self.unserviced_at(coord)
    }

    pub fn total_serviced(&self) -> u64 {
        self.serviced.total()
    }

    pub fn total_unserviced(&self) -> u64 {
        self.unserviced.total()
    }

    pub fn serviced_grid(&self) -> &Grid<u32> {
        &self.serviced
    }

    pub fn unserviced_grid(&self) -> &Grid<u32> {
        &self.unserviced
    }

    /// Cell-wise serviced + unserviced.
    pub fn total_grid(&self) -> Grid<u32> {
        let mut total = self.serviced.clone();
        total.add(&self.unserviced);
        total
    }

    /// Growth injection: cell-wise add into the unserviced grid.
    pub fn add_unserviced(&mut self, growth: &Grid<u32>) {
        self.unserviced.add(growth);
    }

    /// Move `n` people at `coord` from unserviced into `plant`'s service.
    ///
    /// The caller guarantees `n <= unserviced[coord]` and
    /// `n <= plant.remaining_capacity()`; violating either panics.
    pub fn assign_unserviced(&mut self, id: PlantId, plant: &mut Plant, coord: Coord, n: u32) {
        let unserviced = self.unserviced.at_mut(coord);
        assert!(
            n <= *unserviced,
            "assigning more people than are unserviced at ({}, {})",
            coord.x,
            coord.y
        );
        assert!(
            n <= plant.remaining_capacity(),
            "assigning more people than plant capacity allows"
        );
        *unserviced -= n;
        *self.serviced.at_mut(coord) += n;
        *self.assignment.at_mut(coord).entry(id).or_insert(0) += n;
        plant.change_serviced_pop(coord, n as i64);
    }

    /// Move `n` serviced people at `coord` from one plant to another. Total
    /// serviced/unserviced counts are unchanged.
    pub fn move_between_plants(
        &mut self,
        from_id: PlantId,
        from: &mut Plant,
        to_id: PlantId,
        to: &mut Plant,
        coord: Coord,
        n: u32,
    ) {
        assert!(
            to.is_serviceable(coord),
            "destination plant cannot service ({}, {})",
            coord.x,
            coord.y
        );
        let cell = self.assignment.at_mut(coord);
        let from_count = cell.entry(from_id).or_insert(0);
        assert!(
            n <= *from_count,
            "moving more people than plant services at ({}, {})",
            coord.x,
            coord.y
        );
        assert!(
            n <= to.remaining_capacity(),
            "moving more people than destination capacity allows"
        );
        *from_count -= n;
        *cell.entry(to_id).or_insert(0) += n;
        from.change_serviced_pop(coord, -(n as i64));
        to.change_serviced_pop(coord, n as i64);
    }

    /// The population a candidate plant could legitimately take over.
    ///
    /// For every coordinate in the candidate's serviceable area: the
    /// unserviced count there, plus the assignments of plants that are
    /// strictly farther from that coordinate than the candidate is. Entries
    /// come back sorted by coordinate so callers iterate deterministically.
    pub fn potential_pop_for_plant(
        &self,
        candidate: &Plant,
        plants: &[Plant],
    ) -> Vec<PotentialPop> {
        let mut result: Vec<PotentialPop> = Vec::new();
        for (&coord, &candidate_dist) in candidate.serviceable_area() {
            let unserviced = self.unserviced_at(coord);
            let mut stealable: Vec<(PlantId, u32)> = self
                .assignment
                .at(coord)
                .iter()
                .filter(|&(_, &count)| count > 0)
                .filter(|&(&id, _)| {
                    plants[id.0]
                        .distance_to(coord)
                        .map(|d| d > candidate_dist)
                        .unwrap_or(false)
                })
                .map(|(&id, &count)| (id, count))
                .collect();
            stealable.sort_by_key(|&(id, _)| id.0);
            result.push(PotentialPop {
                coord,
                unserviced,
                stealable,
            });
        }
        result.sort_by_key(|entry| (entry.coord.y, entry.coord.x));
        result
    }

    /// Check the cross-structure invariant against the plant arena. Used by
    /// tests; O(cells x plants).
    pub fn check_invariants(&self, plants: &[Plant]) {
        for (coord, cell) in self.assignment.iter() {
            let cell_sum: u32 = cell.values().sum();
            assert_eq!(
                cell_sum,
                self.serviced_at(coord),
                "serviced count mismatch at ({}, {})",
                coord.x,
                coord.y
            );
            for (&id, &count) in cell {
                assert_eq!(
                    count,
                    plants[id.0].serviced_at(coord),
                    "assignment diverged from plant {} at ({}, {})",
                    id.0,
                    coord.x,
                    coord.y
                );
            }
        }
        for (index, plant) in plants.iter().enumerate() {
            let total: u32 = plant.serviced_map().values().sum();
            assert_eq!(
                total,
                plant.in_service(),
                "plant {index} in-service count diverged"
            );
            assert!(plant.in_service() <= plant.capacity());
        }
    }
}

/// One coordinate's worth of population a new plant could absorb.
#[derive(Debug, Clone)]
pub struct PotentialPop {
    pub coord: Coord,
    pub unserviced: u32,
    pub stealable: Vec<(PlantId, u32)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::Terrain;

    fn setup() -> (PopulationMatrix, Vec<Plant>) {
        let terrain = Terrain::uniform(6, 6);
        let plants = vec![
            Plant::new(&terrain, Coord::new(1, 1), 50, 3.0),
            Plant::new(&terrain, Coord::new(4, 4), 50, 3.0),
        ];
        (PopulationMatrix::new(6, 6), plants)
    }

    #[test]
    fn assign_moves_counts_in_lockstep() {
        let (mut matrix, mut plants) = setup();
        let coord = Coord::new(2, 1);
        let mut growth = Grid::new(6, 6);
        *growth.at_mut(coord) = 10;
        matrix.add_unserviced(&growth);

        let (id, plant) = (PlantId(0), &mut plants[0]);
        matrix.assign_unserviced(id, plant, coord, 7);

        assert_eq!(matrix.unserviced_at(coord), 3);
        assert_eq!(matrix.serviced_at(coord), 7);
        assert_eq!(matrix.serviced_at_by(coord, id), 7);
        assert_eq!(plants[0].serviced_at(coord), 7);
        assert_eq!(plants[0].remaining_capacity(), 43);
        matrix.check_invariants(&plants);
    }

    #[test]
    fn move_between_plants_conserves_serviced_total() {
        let (mut matrix, mut plants) = setup();
        // Distance 3 from both (1, 1) and (4, 4): inside both areas.
        let coord = Coord::new(2, 3);
        let mut growth = Grid::new(6, 6);
        *growth.at_mut(coord) = 8;
        matrix.add_unserviced(&growth);
        matrix.assign_unserviced(PlantId(0), &mut plants[0], coord, 8);

        let (left, right) = plants.split_at_mut(1);
        matrix.move_between_plants(
            PlantId(0),
            &mut left[0],
            PlantId(1),
            &mut right[0],
            coord,
            5,
        );

        assert_eq!(matrix.serviced_at(coord), 8);
        assert_eq!(matrix.serviced_at_by(coord, PlantId(0)), 3);
        assert_eq!(matrix.serviced_at_by(coord, PlantId(1)), 5);
        assert_eq!(plants[0].in_service(), 3);
        assert_eq!(plants[1].in_service(), 5);
        matrix.check_invariants(&plants);
    }

    #[test]
    fn move_to_unreachable_destination_panics_before_mutating() {
        let (mut matrix, mut plants) = setup();
        // (1, 1) is plant 0's own cell and distance 6 from plant 1.
        let coord = Coord::new(1, 1);
        let mut growth = Grid::new(6, 6);
        *growth.at_mut(coord) = 5;
        matrix.add_unserviced(&growth);
        matrix.assign_unserviced(PlantId(0), &mut plants[0], coord, 5);

        let (left, right) = plants.split_at_mut(1);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            matrix.move_between_plants(
                PlantId(0),
                &mut left[0],
                PlantId(1),
                &mut right[0],
                coord,
                5,
            );
        }));
        assert!(result.is_err());

        // The failed move left nothing half-applied.
        assert_eq!(matrix.serviced_at_by(coord, PlantId(0)), 5);
        assert_eq!(matrix.serviced_at_by(coord, PlantId(1)), 0);
        assert_eq!(plants[0].in_service(), 5);
        assert_eq!(plants[1].in_service(), 0);
        matrix.check_invariants(&plants);
    }

    #[test]
    #[should_panic(expected = "more people than are unserviced")]
    fn over_assignment_panics() {
        let (mut matrix, mut plants) = setup();
        matrix.assign_unserviced(PlantId(0), &mut plants[0], Coord::new(1, 1), 1);
    }

    #[test]
    fn potential_pop_reports_only_farther_plants() {
        let (mut matrix, mut plants) = setup();
        // Cell (3, 2): distance 3 from plant 0, distance 3 from plant 1.
        // A candidate at (3, 3) is closer to it than plant 0 is.
        let coord = Coord::new(3, 2);
        let mut growth = Grid::new(6, 6);
        *growth.at_mut(coord) = 4;
        *growth.at_mut(Coord::new(0, 0)) = 6;
        matrix.add_unserviced(&growth);
        matrix.assign_unserviced(PlantId(0), &mut plants[0], coord, 4);

        let terrain = Terrain::uniform(6, 6);
        let candidate = Plant::new(&terrain, Coord::new(3, 3), 50, 3.0);
        let potential = matrix.potential_pop_for_plant(&candidate, &plants);

        let entry = potential
            .iter()
            .find(|e| e.coord == coord)
            .expect("cell is in candidate area");
        assert_eq!(entry.stealable, vec![(PlantId(0), 4)]);

        // (0, 0) is outside the candidate's radius-3 area from (3, 3).
        assert!(potential.iter().all(|e| e.coord != Coord::new(0, 0)));
    }

    #[test]
    fn queries_are_idempotent() {
        let (mut matrix, mut plants) = setup();
        let coord = Coord::new(2, 2);
        let mut growth = Grid::new(6, 6);
        *growth.at_mut(coord) = 5;
        matrix.add_unserviced(&growth);
        matrix.assign_unserviced(PlantId(0), &mut plants[0], coord, 2);

        assert_eq!(matrix.unserviced_at(coord), matrix.unserviced_at(coord));
        assert_eq!(matrix.serviced_at(coord), matrix.serviced_at(coord));
        assert_eq!(matrix.total_at(coord), 5);
    }
}
