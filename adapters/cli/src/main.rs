#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Track Defence prototypes.

mod game;
mod layout_transfer;
mod life;

use std::{cell::RefCell, path::PathBuf, rc::Rc, time::Duration};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use track_defence_core::WELCOME_BANNER;
use track_defence_rendering::{Color, Presentation, RenderingBackend, Scene};
use track_defence_rendering_macroquad::MacroquadBackend;
use track_defence_world::{DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, DEFAULT_TRACK_SEGMENTS};

use game::GameDriver;
use layout_transfer::LayoutSnapshot;

const CLEAR_COLOR: Color = Color::from_rgb_u8(130, 130, 130);

#[derive(Debug, Parser)]
#[command(name = "track-defence", version, about = "Tile-track game prototypes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Run the tower defence game (the default).
    Play(PlayArgs),
    /// Run the Game of Life console visualizer.
    Life(LifeArgs),
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Number of cell columns in the level grid.
    #[arg(long, default_value_t = DEFAULT_GRID_COLUMNS)]
    columns: u32,

    /// Number of cell rows in the level grid.
    #[arg(long, default_value_t = DEFAULT_GRID_ROWS)]
    rows: u32,

    /// Requested number of track segments; odd counts round up.
    #[arg(long, default_value_t = DEFAULT_TRACK_SEGMENTS)]
    segments: u32,

    /// Render as fast as possible instead of syncing to the display.
    #[arg(long)]
    no_vsync: bool,

    /// Print frame-rate metrics once per second.
    #[arg(long)]
    show_fps: bool,

    /// Skip sprite loading and draw flat shapes.
    #[arg(long)]
    no_sprites: bool,

    /// Sprite manifest location.
    #[arg(long, default_value = "assets/manifest.toml")]
    manifest: PathBuf,

    /// Restore a tower layout from a shared layout code.
    #[arg(long)]
    import: Option<String>,
}

impl Default for PlayArgs {
    fn default() -> Self {
        Self {
            columns: DEFAULT_GRID_COLUMNS,
            rows: DEFAULT_GRID_ROWS,
            segments: DEFAULT_TRACK_SEGMENTS,
            no_vsync: false,
            show_fps: false,
            no_sprites: false,
            manifest: PathBuf::from("assets/manifest.toml"),
            import: None,
        }
    }
}

#[derive(Debug, Args)]
struct LifeArgs {
    /// Number of grid columns.
    #[arg(long, default_value_t = 20)]
    width: usize,

    /// Number of grid rows.
    #[arg(long, default_value_t = 10)]
    height: usize,

    /// Number of generations to run before exiting.
    #[arg(long, default_value_t = 50)]
    generations: u32,

    /// Milliseconds between generations.
    #[arg(long, default_value_t = 200)]
    interval_ms: u64,

    /// Seed a random soup instead of the default glider.
    #[arg(long)]
    random: bool,

    /// Fraction of living cells in the random soup.
    #[arg(long, default_value_t = 0.3)]
    density: f64,

    /// Seed for the random soup.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command.unwrap_or_else(|| Mode::Play(PlayArgs::default())) {
        Mode::Play(args) => play(args),
        Mode::Life(args) => {
            life::run(life::LifeRun {
                width: args.width,
                height: args.height,
                generations: args.generations,
                interval: Duration::from_millis(args.interval_ms),
                soup: args.random.then_some(life::Soup {
                    density: args.density,
                    seed: args.seed,
                }),
            });
            Ok(())
        }
    }
}

fn play(args: PlayArgs) -> Result<()> {
    let layout = args
        .import
        .as_deref()
        .map(LayoutSnapshot::decode)
        .transpose()
        .context("invalid layout code")?;

    log::info!("{WELCOME_BANNER}");
    let driver = Rc::new(RefCell::new(GameDriver::new(
        args.columns,
        args.rows,
        args.segments,
        layout,
    )));

    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps)
        .with_sprite_loading(!args.no_sprites)
        .with_manifest_path(&args.manifest);
    let presentation = Presentation::new("track defence", CLEAR_COLOR, Scene::default());

    let shared = Rc::clone(&driver);
    backend.run(presentation, move |dt, input, scene| {
        shared.borrow_mut().step(dt, input, scene);
    })?;

    // Parting gift: the session's layout, ready to share or re-import.
    println!("layout code: {}", driver.borrow().layout_code());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn play_is_the_default_mode() {
        let cli = Cli::parse_from(["track-defence"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn life_arguments_parse() {
        let cli = Cli::parse_from([
            "track-defence",
            "life",
            "--width",
            "30",
            "--random",
            "--seed",
            "7",
        ]);
        match cli.command {
            Some(Mode::Life(args)) => {
                assert_eq!(args.width, 30);
                assert!(args.random);
                assert_eq!(args.seed, 7);
                assert_eq!(args.height, 10);
            }
            other => panic!("expected life mode, got {other:?}"),
        }
    }
}
