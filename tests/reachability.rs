use gridplant::{
    grid::Coord,
    plant::Plant,
    terrain::Terrain,
};

#[test]
fn uniform_budget_area_matches_the_l1_ball_count() {
    // Closed form: an unclipped L1 ball of radius B holds 2B^2 + 2B + 1
    // cells, origin included.
    let terrain = Terrain::uniform(20, 20);
    let plant = Plant::new(&terrain, Coord::new(10, 10), 100, 4.0);
    assert_eq!(plant.serviceable_area().len(), 2 * 16 + 2 * 4 + 1);
    for (&coord, &cost) in plant.serviceable_area() {
        assert_eq!(cost, coord.manhattan_distance(Coord::new(10, 10)) as f64);
    }
}

#[test]
fn interior_budget_two_area_on_4x4_is_origin_plus_ten() {
    let terrain = Terrain::uniform(4, 4);
    let plant = Plant::new(&terrain, Coord::new(1, 1), 100, 2.0);
    let non_origin = plant
        .serviceable_area()
        .keys()
        .filter(|&&c| c != Coord::new(1, 1))
        .count();
    assert_eq!(non_origin, 10);
    assert_eq!(plant.distance_to(Coord::new(1, 1)), Some(0.0));
}

#[test]
fn water_moat_blocks_all_expansion_below_its_weight() {
    let terrain = Terrain::with_moat(6, 6);
    let plant = Plant::new(&terrain, Coord::new(1, 1), 100, 99.0);
    // Budget below the water weight: the area is just the plant's own cell.
    assert_eq!(plant.serviceable_area().len(), 1);
}

#[test]
fn mountains_consume_budget_but_are_passable() {
    use gridplant::grid::Grid;
    use gridplant::terrain::TerrainKind;

    let mut kinds: Grid<TerrainKind> = Grid::new(5, 1);
    *kinds.at_mut(Coord::new(2, 0)) = TerrainKind::Mountain;
    let terrain = Terrain::from_kinds(kinds);

    // Budget 101 crosses one mountain cell (100) plus one grassland (1).
    let plant = Plant::new(&terrain, Coord::new(1, 0), 100, 101.0);
    assert_eq!(plant.distance_to(Coord::new(2, 0)), Some(100.0));
    assert_eq!(plant.distance_to(Coord::new(3, 0)), Some(101.0));
    assert_eq!(plant.distance_to(Coord::new(4, 0)), None);
}

#[test]
fn bfs_expansion_records_first_path_cost_not_cheapest() {
    use gridplant::grid::Grid;
    use gridplant::terrain::TerrainKind;

    // A mountain directly right of the plant, with grassland detours above
    // and below it. FIFO expansion admits the cell behind the mountain in
    // an earlier wave through the mountain than through the detour, so the
    // recorded cost is the expensive one. A least-cost search would record
    // 4.0 via the detour; the flood fill keeps 101.0.
    let mut kinds: Grid<TerrainKind> = Grid::new(4, 3);
    *kinds.at_mut(Coord::new(1, 1)) = TerrainKind::Mountain;
    let terrain = Terrain::from_kinds(kinds);
    let plant = Plant::new(&terrain, Coord::new(0, 1), 100, 150.0);

    assert_eq!(plant.distance_to(Coord::new(1, 1)), Some(100.0));
    assert_eq!(plant.distance_to(Coord::new(2, 1)), Some(101.0));
}
