#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Double-buffered cellular automaton grid and the Game of Life rule.
//!
//! Writes land in a back buffer while reads observe the committed front
//! buffer, so a whole generation is computed against a stable snapshot and
//! then applied at once. The grid is toroidal: indices wrap on both axes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Double-buffered 2D grid with toroidal indexing.
#[derive(Clone, Debug)]
pub struct DoubleBuffer2d<T> {
    width: usize,
    height: usize,
    front: Vec<T>,
    back: Vec<T>,
}

impl<T: Copy> DoubleBuffer2d<T> {
    /// Creates a grid with both buffers filled with the provided value.
    #[must_use]
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        let capacity = width.max(1) * height.max(1);
        Self {
            width: width.max(1),
            height: height.max(1),
            front: vec![fill; capacity],
            back: vec![fill; capacity],
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> usize {
        (y % self.height) * self.width + (x % self.width)
    }

    /// Reads the committed value at the (wrapped) coordinates.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.front[self.index(x, y)]
    }

    /// Writes a value into the back buffer at the (wrapped) coordinates.
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let index = self.index(x, y);
        self.back[index] = value;
    }

    /// Fills both buffers with the provided value.
    pub fn clear(&mut self, value: T) {
        self.front.fill(value);
        self.back.fill(value);
    }

    /// Copies the committed front buffer into the back buffer.
    pub fn sync(&mut self) {
        self.back.copy_from_slice(&self.front);
    }

    /// Commits the back buffer, making pending writes visible to reads.
    pub fn apply(&mut self) {
        self.front.copy_from_slice(&self.back);
    }
}

impl<T: Copy + PartialEq> DoubleBuffer2d<T> {
    /// Counts committed cells equal to `value` among the 8 neighbors.
    #[must_use]
    pub fn count_neighbors(&self, x: usize, y: usize, value: T) -> usize {
        let mut counter = 0;
        for dy in [self.height - 1, 0, 1] {
            for dx in [self.width - 1, 0, 1] {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if self.get(x + dx, y + dy) == value {
                    counter += 1;
                }
            }
        }
        counter
    }
}

/// Committed grid state for the Game of Life.
pub type LifeGrid = DoubleBuffer2d<bool>;

/// Creates an empty (all dead) life grid.
#[must_use]
pub fn life_grid(width: usize, height: usize) -> LifeGrid {
    DoubleBuffer2d::new(width, height, false)
}

/// Advances the grid one generation using the B3/S23 rule.
pub fn step(grid: &mut LifeGrid) {
    grid.sync();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let neighbors = grid.count_neighbors(x, y, true);
            let alive = grid.get(x, y);
            if !alive && neighbors == 3 {
                grid.set(x, y, true);
            } else if alive && !(2..=3).contains(&neighbors) {
                grid.set(x, y, false);
            }
        }
    }
    grid.apply();
}

/// Stamps the canonical glider with its head at the provided coordinates.
pub fn seed_glider(grid: &mut LifeGrid, x: usize, y: usize) {
    grid.sync();
    for (dx, dy) in [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)] {
        grid.set(x + dx, y + dy, true);
    }
    grid.apply();
}

/// Fills the grid with a deterministic random soup.
pub fn seed_random(grid: &mut LifeGrid, density: f64, seed: u64) {
    let density = density.clamp(0.0, 1.0);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    grid.sync();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            grid.set(x, y, rng.gen_bool(density));
        }
    }
    grid.apply();
}

/// Renders the committed grid as rows of `#` and `.` characters.
#[must_use]
pub fn render(grid: &LifeGrid) -> String {
    let mut out = String::with_capacity((grid.width() + 1) * grid.height());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            out.push(if grid.get(x, y) { '#' } else { '.' });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alive_cells(grid: &LifeGrid) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if grid.get(x, y) {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    #[test]
    fn writes_stay_invisible_until_applied() {
        let mut grid = life_grid(4, 4);
        grid.set(1, 1, true);
        assert!(!grid.get(1, 1));
        grid.apply();
        assert!(grid.get(1, 1));
    }

    #[test]
    fn indexing_wraps_on_both_axes() {
        let mut grid = life_grid(4, 3);
        grid.set(5, 4, true);
        grid.apply();
        assert!(grid.get(1, 1));
    }

    #[test]
    fn a_block_is_a_still_life() {
        let mut grid = life_grid(6, 6);
        grid.sync();
        for (x, y) in [(2, 2), (3, 2), (2, 3), (3, 3)] {
            grid.set(x, y, true);
        }
        grid.apply();

        let before = alive_cells(&grid);
        step(&mut grid);
        assert_eq!(alive_cells(&grid), before);
    }

    #[test]
    fn a_blinker_oscillates_with_period_two() {
        let mut grid = life_grid(5, 5);
        grid.sync();
        for x in 1..=3 {
            grid.set(x, 2, true);
        }
        grid.apply();

        step(&mut grid);
        assert_eq!(alive_cells(&grid), vec![(2, 1), (2, 2), (2, 3)]);
        step(&mut grid);
        assert_eq!(alive_cells(&grid), vec![(1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn a_glider_translates_by_one_cell_every_four_generations() {
        let mut grid = life_grid(16, 16);
        seed_glider(&mut grid, 1, 1);
        let before = alive_cells(&grid);

        for _ in 0..4 {
            step(&mut grid);
        }

        let expected: Vec<(usize, usize)> =
            before.iter().map(|(x, y)| (x + 1, y + 1)).collect();
        let mut after = alive_cells(&grid);
        after.sort_unstable();
        let mut expected = expected;
        expected.sort_unstable();
        assert_eq!(after, expected);
    }

    #[test]
    fn random_soup_is_deterministic_per_seed() {
        let mut first = life_grid(10, 10);
        let mut second = life_grid(10, 10);
        seed_random(&mut first, 0.4, 7);
        seed_random(&mut second, 0.4, 7);
        assert_eq!(alive_cells(&first), alive_cells(&second));

        let mut third = life_grid(10, 10);
        seed_random(&mut third, 0.4, 8);
        assert_ne!(alive_cells(&first), alive_cells(&third));
    }

    #[test]
    fn render_draws_hashes_for_living_cells() {
        let mut grid = life_grid(3, 2);
        grid.set(1, 0, true);
        grid.apply();
        assert_eq!(render(&grid), ".#.\n...\n");
    }
}
