use serde::{Deserialize, Serialize};

/// Cell coordinate on the simulation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    /// 4-neighborhood, in up/down/left/right order.
    pub fn neighbors(self) -> [Coord; 4] {
        [
            Coord::new(self.x, self.y - 1),
            Coord::new(self.x, self.y + 1),
            Coord::new(self.x - 1, self.y),
            Coord::new(self.x + 1, self.y),
        ]
    }

    pub fn manhattan_distance(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Dense row-major grid of cell values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![T::default(); (width * height) as usize],
        }
    }
}

impl<T> Grid<T> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some((coord.y as u32 * self.width + coord.x as u32) as usize)
        } else {
            None
        }
    }

    pub fn get(&self, coord: Coord) -> Option<&T> {
        self.index(coord).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut T> {
        self.index(coord).map(|i| &mut self.cells[i])
    }

    /// Panicking accessor for coordinates the caller already validated.
    pub fn at(&self, coord: Coord) -> &T {
        self.get(coord)
            .unwrap_or_else(|| panic!("coordinate ({}, {}) out of bounds", coord.x, coord.y))
    }

    pub fn at_mut(&mut self, coord: Coord) -> &mut T {
        let (x, y) = (coord.x, coord.y);
        self.get_mut(coord)
            .unwrap_or_else(|| panic!("coordinate ({x}, {y}) out of bounds"))
    }

    /// Row-major iteration over (coord, value).
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &T)> {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(i, value)| {
            let coord = Coord::new((i as u32 % width) as i32, (i as u32 / width) as i32);
            (coord, value)
        })
    }

    /// Row-major iteration over coordinates only.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Coord::new(x as i32, y as i32)))
    }
}

impl Grid<u32> {
    /// Cell-wise addition of another count grid. Grids must share dimensions.
    pub fn add(&mut self, other: &Grid<u32>) {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "grid dimensions must match"
        );
        for (cell, delta) in self.cells.iter_mut().zip(other.cells.iter()) {
            *cell += delta;
        }
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&n| n as u64).sum()
    }
}
