#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Track Defence.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in containerised CI environments, so the
//! dependency excludes its default `audio` feature.
//!
//! The backend draws each frame in a fixed order: ground tiles, towers with
//! their range indicators, enemies with health bars, bullets, the pointer
//! selection overlays, the UI overlay and finally the HUD text. When no
//! sprite atlas is available every element falls back to flat shapes, so the
//! game stays playable without assets.

mod sprites;

pub use sprites::{AnimationRepeat, SpriteAtlas, TileAnimation, TileInfo};

use anyhow::Result;
use glam::Vec2;
use macroquad::{
    color::Color as MacroquadColor,
    input::{
        is_key_pressed, is_mouse_button_pressed, mouse_position, mouse_wheel, KeyCode, MouseButton,
    },
    shapes::{draw_circle, draw_circle_lines, draw_rectangle, draw_rectangle_lines},
    text::{draw_text, measure_text},
    time::{get_fps, get_frame_time},
    window::{clear_background, next_frame},
};
use std::{
    path::PathBuf,
    sync::mpsc,
    time::Duration,
};
use track_defence_rendering::{
    tile_sprite_name, ui::{UiDrawKind, UiDrawOp}, Color, FrameInput, GridPresentation,
    Presentation, Rect, RenderingBackend, Scene, SceneTower, TileBase,
};
use track_defence_core::UpgradeLevel;

const GRASS_FALLBACK: Color = Color::from_rgb_u8(99, 171, 63);
const TRACK_FALLBACK: Color = Color::from_rgb_u8(151, 125, 83);
const ENEMY_COLOR: Color = Color::from_rgb_u8(230, 41, 55);
const BULLET_COLOR: Color = Color::from_rgb_u8(230, 41, 55);
const TOWER_FALLBACK: Color = Color::from_rgb_u8(230, 41, 55);
const HEALTH_BAR_BACK: Color = Color::from_rgb_u8(130, 130, 130);
const HEALTH_BAR_FRONT: Color = Color::from_rgb_u8(0, 228, 48);
const SELECTED_COLOR: Color = Color::from_rgb_u8(255, 161, 0);
const HOVER_FREE_COLOR: Color = Color::from_rgb_u8(0, 228, 48);
const HOVER_TRACK_COLOR: Color = Color::from_rgb_u8(230, 41, 55);
const RANGE_COLOR: Color = Color::from_rgb_u8(0, 228, 48);
const HUD_COLOR: Color = Color::from_rgb_u8(0, 158, 47);

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    load_sprites: bool,
    manifest_path: PathBuf,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            load_sprites: true,
            manifest_path: PathBuf::from("assets/manifest.toml"),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Synchronises presentation with the display refresh rate, or not.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether frame-rate metrics are printed once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures whether the backend should attempt to load sprite assets.
    #[must_use]
    pub fn with_sprite_loading(mut self, enabled: bool) -> Self {
        self.load_sprites = enabled;
        self
    }

    /// Overrides the sprite manifest location.
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            load_sprites,
            manifest_path,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 800,
            window_height: 450,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (error_sender, error_receiver) = mpsc::channel::<anyhow::Error>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;

            let sprite_atlas = if load_sprites {
                match SpriteAtlas::from_manifest_path(&manifest_path) {
                    Ok(atlas) => {
                        log::info!("sprite atlas loaded with {} tiles", atlas.tile_count());
                        Some(atlas)
                    }
                    Err(error) => {
                        log::warn!("sprite atlas unavailable, using flat shapes: {error:#}");
                        None
                    }
                }
            } else {
                None
            };

            let clear = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut elapsed = 0.0_f32;

            loop {
                if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q) {
                    break;
                }

                let dt_seconds = get_frame_time().max(0.0);
                elapsed += dt_seconds;
                let frame_dt = Duration::from_secs_f32(dt_seconds);
                let input = gather_frame_input();

                clear_background(clear);
                update_scene(frame_dt, input, &mut scene);

                if let Err(error) = draw_frame(&scene, sprite_atlas.as_ref(), elapsed, show_fps) {
                    let _ = error_sender.send(error);
                    break;
                }

                if show_fps {
                    if let Some(fps) = fps_counter.record_frame(frame_dt) {
                        println!("FPS: {fps:.2}");
                    }
                }

                next_frame().await;
            }
        });

        match error_receiver.try_recv() {
            Ok(error) => Err(error),
            Err(_) => Ok(()),
        }
    }
}

pub(crate) fn to_macroquad_color(color: Color) -> MacroquadColor {
    MacroquadColor::new(color.red, color.green, color.blue, color.alpha)
}

fn gather_frame_input() -> FrameInput {
    let (cursor_x, cursor_y) = mouse_position();
    FrameInput {
        pointer: Some(Vec2::new(cursor_x, cursor_y)),
        clicked: is_mouse_button_pressed(MouseButton::Left),
        wheel_steps: mouse_wheel().1,
        screen: Vec2::new(
            macroquad::window::screen_width(),
            macroquad::window::screen_height(),
        ),
    }
}

fn draw_frame(
    scene: &Scene,
    atlas: Option<&SpriteAtlas>,
    elapsed: f32,
    show_fps: bool,
) -> Result<()> {
    if let Some(grid) = scene.grid {
        draw_ground(scene, grid, atlas, elapsed)?;
        draw_towers(scene, grid, atlas, elapsed)?;
        draw_enemies(scene, grid);
        draw_bullets(scene, grid);
        draw_selection(scene, grid);
    }

    draw_ui(&scene.ui, atlas, elapsed)?;
    draw_hud(scene, show_fps);
    Ok(())
}

fn cell_rect(grid: GridPresentation, column: u32, row: u32) -> Rect {
    Rect::new(
        column as f32 * grid.cell_length,
        row as f32 * grid.cell_length,
        grid.cell_length,
        grid.cell_length,
    )
}

fn draw_ground(
    scene: &Scene,
    grid: GridPresentation,
    atlas: Option<&SpriteAtlas>,
    elapsed: f32,
) -> Result<()> {
    for tile in &scene.ground {
        let dest = cell_rect(grid, tile.cell.column(), tile.cell.row());
        match atlas {
            Some(atlas) => {
                let name = tile_sprite_name(tile.base, tile.road);
                atlas.draw(&name, dest, Color::WHITE, elapsed)?;
            }
            None => {
                let color = match tile.base {
                    TileBase::Grass => GRASS_FALLBACK,
                    TileBase::Track => TRACK_FALLBACK,
                };
                fill_rect(dest, color);
            }
        }
    }
    Ok(())
}

fn tower_sprite_name(level: UpgradeLevel) -> &'static str {
    match level.get() {
        0 => "tower1",
        1 => "tower2",
        _ => "tower3",
    }
}

fn draw_towers(
    scene: &Scene,
    grid: GridPresentation,
    atlas: Option<&SpriteAtlas>,
    elapsed: f32,
) -> Result<()> {
    for tower in &scene.towers {
        let dest = cell_rect(grid, tower.cell.column(), tower.cell.row());
        match atlas {
            Some(atlas) => {
                atlas.draw(tower_sprite_name(tower.level), dest, Color::WHITE, elapsed)?;
            }
            None => fill_rect(dest, TOWER_FALLBACK),
        }
    }

    for tower in &scene.towers {
        if tower.selected || tower.hovered {
            draw_range_indicator(grid, tower);
        }
    }
    Ok(())
}

fn draw_range_indicator(grid: GridPresentation, tower: &SceneTower) {
    let center_x = (tower.cell.column() as f32 + 0.5) * grid.cell_length;
    let center_y = (tower.cell.row() as f32 + 0.5) * grid.cell_length;
    let radius = tower.range * grid.cell_length;
    draw_circle_lines(
        center_x,
        center_y,
        radius,
        3.0,
        to_macroquad_color(RANGE_COLOR.with_alpha(0.8)),
    );
}

fn draw_enemies(scene: &Scene, grid: GridPresentation) {
    let size = grid.cell_length;
    for enemy in &scene.enemies {
        let x = enemy.position.x * size;
        let y = enemy.position.y * size;
        draw_rectangle(x, y, size, size, to_macroquad_color(ENEMY_COLOR));
        draw_rectangle(
            x,
            y + size - 4.0,
            size,
            4.0,
            to_macroquad_color(HEALTH_BAR_BACK),
        );
        draw_rectangle(
            x,
            y + size - 4.0,
            size * enemy.health_fraction.clamp(0.0, 1.0),
            4.0,
            to_macroquad_color(HEALTH_BAR_FRONT),
        );
    }
}

fn draw_bullets(scene: &Scene, grid: GridPresentation) {
    for bullet in &scene.bullets {
        draw_circle(
            bullet.position.x * grid.cell_length,
            bullet.position.y * grid.cell_length,
            4.0,
            to_macroquad_color(BULLET_COLOR),
        );
    }
}

fn draw_selection(scene: &Scene, grid: GridPresentation) {
    if let Some(selected) = scene.selection.selected {
        let rect = cell_rect(grid, selected.column(), selected.row());
        outline_rect(rect, SELECTED_COLOR);
        fill_rect(rect, SELECTED_COLOR.with_alpha(0.5));
    }

    if let Some(hover) = scene.selection.hover {
        let rect = cell_rect(grid, hover.column(), hover.row());
        let color = if scene.selection.hover_on_track {
            HOVER_TRACK_COLOR
        } else {
            HOVER_FREE_COLOR
        };
        outline_rect(rect, color);
    }
}

fn draw_ui(ops: &[UiDrawOp], atlas: Option<&SpriteAtlas>, elapsed: f32) -> Result<()> {
    for op in ops {
        match &op.kind {
            UiDrawKind::Fill { color } => fill_rect(op.rect, *color),
            UiDrawKind::Sprite { name, tint } => match atlas {
                Some(atlas) => atlas.draw(name, op.rect, *tint, elapsed)?,
                None => fill_rect(op.rect, HEALTH_BAR_BACK.with_alpha(0.8)),
            },
            UiDrawKind::Text {
                content,
                color,
                font_size,
            } => draw_centered_text(content, op.rect, *color, *font_size),
        }
    }
    Ok(())
}

fn draw_hud(scene: &Scene, show_fps: bool) {
    if show_fps {
        draw_text(
            &format!("fps: {}", get_fps()),
            5.0,
            20.0,
            20.0,
            to_macroquad_color(HUD_COLOR),
        );
    }

    let hud = scene.hud;
    let lines = [
        format!("health: {:.0}", hud.health),
        format!("gold: {:.0}", hud.gold),
        format!("kills: {}", hud.kills),
        format!("next spawn: {:.0}s", hud.next_spawn_seconds),
    ];
    let mut baseline = 45.0;
    for line in lines.iter().chain(scene.hud_lines.iter()) {
        draw_text(line, 5.0, baseline, 20.0, to_macroquad_color(HUD_COLOR));
        baseline += 22.0;
    }
}

fn fill_rect(rect: Rect, color: Color) {
    draw_rectangle(
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        to_macroquad_color(color),
    );
}

fn outline_rect(rect: Rect, color: Color) {
    draw_rectangle_lines(
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        2.0,
        to_macroquad_color(color),
    );
}

fn draw_centered_text(content: &str, rect: Rect, color: Color, font_size: f32) {
    let dimensions = measure_text(content, None, font_size as u16, 1.0);
    let x = rect.x + (rect.width - dimensions.width) / 2.0;
    let y = rect.y + (rect.height + dimensions.height) / 2.0;
    draw_text(content, x, y, font_size, to_macroquad_color(color));
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the average once a second passed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed = self.elapsed.saturating_add(frame);
        self.frames = self.frames.saturating_add(1);

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let average = if seconds <= f32::EPSILON {
            0.0
        } else {
            self.frames as f32 / seconds
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(average)
    }
}
