use gridplant::{
    game::{CostParams, Game, Placement, PlantParams},
    grid::{Coord, Grid},
    growth::FixedGrowth,
    plant::PlantId,
    terrain::Terrain,
};

fn costs() -> CostParams {
    CostParams {
        initial_cost: 10.0,
        operating_cost: 1.0,
        profit_margin: 1.0,
        unserviced_penalty: 0.5,
    }
}

fn burst(width: u32, height: u32, cells: &[(Coord, u32)]) -> Grid<u32> {
    let mut grid = Grid::new(width, height);
    for &(coord, n) in cells {
        *grid.at_mut(coord) = n;
    }
    grid
}

fn strip_game(width: u32, params: PlantParams, grids: Vec<Grid<u32>>) -> Game {
    Game::new(
        Terrain::uniform(width, 3),
        Box::new(FixedGrowth::new(grids)),
        params,
        costs(),
        1,
    )
}

#[test]
fn new_plant_steals_from_strictly_farther_plant() {
    let grids = vec![burst(10, 3, &[(Coord::new(4, 1), 30)])];
    let params = PlantParams {
        capacity: 50,
        service_radius: 6.0,
    };
    let mut game = strip_game(10, params, grids);

    // Step 1: the far plant picks up the whole cell.
    game.step(Placement::Build(Coord::new(1, 1)));
    assert_eq!(game.plants()[0].serviced_at(Coord::new(4, 1)), 30);

    // Step 2: a plant one cell away takes the assignment over.
    game.step(Placement::Build(Coord::new(5, 1)));
    assert_eq!(game.plants()[0].serviced_at(Coord::new(4, 1)), 0);
    assert_eq!(game.plants()[1].serviced_at(Coord::new(4, 1)), 30);
    // Conservation: the move never touched the serviced/unserviced totals.
    assert_eq!(game.population().total_serviced(), 30);
    assert_eq!(game.population().total_unserviced(), 0);
    game.population().check_invariants(game.plants());
}

#[test]
fn steal_is_capped_by_remaining_capacity() {
    let params = PlantParams {
        capacity: 30,
        service_radius: 6.0,
    };
    let grids = vec![
        burst(10, 3, &[(Coord::new(4, 1), 30)]),
        burst(10, 3, &[(Coord::new(3, 1), 12)]),
    ];
    let mut game = strip_game(10, params, grids);
    game.step(Placement::Build(Coord::new(1, 1)));
    assert_eq!(game.plants()[0].in_service(), 30);

    // Step 2: the cascade of the plant at (5, 1) first absorbs the 12
    // waiting at (3, 1), leaving 18 of capacity; it can then steal only 18
    // of the 30 assigned at (4, 1).
    game.step(Placement::Build(Coord::new(5, 1)));
    assert_eq!(game.plants()[1].in_service(), 30);
    assert_eq!(game.plants()[1].serviced_at(Coord::new(4, 1)), 18);
    assert_eq!(game.plants()[0].serviced_at(Coord::new(4, 1)), 12);
    game.population().check_invariants(game.plants());
}

#[test]
fn equidistant_assignments_are_left_alone() {
    let grids = vec![burst(9, 3, &[(Coord::new(4, 1), 10)])];
    let params = PlantParams {
        capacity: 50,
        service_radius: 6.0,
    };
    let mut game = strip_game(9, params, grids);
    game.step(Placement::Build(Coord::new(2, 1)));
    // The new plant is exactly as far from the cell; stealing requires
    // strictly closer, so nothing moves.
    game.step(Placement::Build(Coord::new(6, 1)));
    assert_eq!(game.plants()[0].serviced_at(Coord::new(4, 1)), 10);
    assert_eq!(game.plants()[1].in_service(), 0);
}

#[test]
fn touched_plant_uses_freed_capacity_for_waiting_population() {
    // A fills to capacity on the first burst. A second burst lands at a cell
    // only A reaches; it waits unserviced because A is full. Building B right
    // on A's serviced cell steals the whole assignment, and the touched pass
    // lets the freed A absorb the waiting people within the same step.
    let params = PlantParams {
        capacity: 10,
        service_radius: 6.0,
    };
    let grids = vec![
        burst(14, 3, &[(Coord::new(7, 1), 10)]),
        burst(14, 3, &[(Coord::new(0, 1), 3)]),
    ];
    let mut game = strip_game(14, params, grids);

    game.step(Placement::Build(Coord::new(6, 1)));
    assert_eq!(game.plant(PlantId(0)).in_service(), 10);

    // (0, 1) is at distance 6 from A but 7 from B, beyond B's radius.
    let summary = game.step(Placement::Build(Coord::new(7, 1)));
    assert_eq!(summary.unserviced_total, 0);
    assert_eq!(game.plant(PlantId(1)).serviced_at(Coord::new(7, 1)), 10);
    assert_eq!(game.plant(PlantId(0)).serviced_at(Coord::new(0, 1)), 3);
    assert_eq!(game.plant(PlantId(0)).in_service(), 3);
    game.population().check_invariants(game.plants());
}
