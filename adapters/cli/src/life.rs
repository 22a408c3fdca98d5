//! Console runner for the Game of Life companion prototype.

use std::{thread, time::Duration};

use track_defence_automata::{life_grid, render, seed_glider, seed_random, step, LifeGrid};

/// Parameters for a console life run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LifeRun {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) generations: u32,
    pub(crate) interval: Duration,
    pub(crate) soup: Option<Soup>,
}

/// Seeded random-soup initialisation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Soup {
    pub(crate) density: f64,
    pub(crate) seed: u64,
}

/// Runs the automaton, printing each generation to stdout.
pub(crate) fn run(config: LifeRun) {
    let mut grid = seeded_grid(&config);

    for generation in 0..config.generations {
        // ANSI clear keeps the grid anchored like a tiny animation.
        print!("\x1b[2J\x1b[1;1H");
        print!("{}", render(&grid));
        println!("generation: {generation}");
        if !config.interval.is_zero() {
            thread::sleep(config.interval);
        }
        step(&mut grid);
    }
}

fn seeded_grid(config: &LifeRun) -> LifeGrid {
    let mut grid = life_grid(config.width, config.height);
    match config.soup {
        Some(soup) => seed_random(&mut grid, soup.density, soup.seed),
        None => seed_glider(&mut grid, 1, 1),
    }
    grid
}
