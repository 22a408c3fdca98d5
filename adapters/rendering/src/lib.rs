#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Track Defence adapters.
//!
//! Backends receive a [`Presentation`] describing the initial scene and a
//! closure that refreshes the [`Scene`] from world snapshots once per frame.
//! Everything in this crate is backend-agnostic: the layout engine and the
//! UI tree live in [`layout`] and [`ui`], and the road-type classification
//! that picks ground sprite variants lives here next to the scene types.

pub mod layout;
pub mod ui;

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::time::Duration;
use thiserror::Error;
use track_defence_core::{CellCoord, NeighborMask, TowerId, UpgradeLevel};

use ui::UiDrawOp;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Fully opaque white, the neutral sprite tint.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Fully opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with the provided alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

/// Axis-aligned rectangle in screen units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    /// Horizontal position of the left edge.
    pub x: f32,
    /// Vertical position of the top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Rect {
    /// Creates a new rectangle from its top-left corner and extent.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner of the rectangle.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Extent of the rectangle.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Reports whether the provided point lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Pointer position in screen pixels, if the window is hovered.
    pub pointer: Option<Vec2>,
    /// Whether the primary button was pressed on this frame (edge, not level).
    pub clicked: bool,
    /// Discrete wheel movement accumulated during the frame.
    pub wheel_steps: f32,
    /// Current window extent in screen pixels.
    pub screen: Vec2,
}

/// Visual variant of a ground cell derived from its track neighbors.
///
/// The zig-zag generator only produces straight runs, corners and end-caps;
/// the junction variant exists so the classification stays total over all
/// sixteen neighbor combinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoadType {
    /// No track neighbors.
    Isolated,
    /// Track above and below.
    Vertical,
    /// Track left and right.
    Horizontal,
    /// Track above only.
    EndNorth,
    /// Track below only.
    EndSouth,
    /// Track to the right only.
    EndEast,
    /// Track to the left only.
    EndWest,
    /// Track above and to the right.
    CornerNorthEast,
    /// Track above and to the left.
    CornerNorthWest,
    /// Track below and to the right.
    CornerSouthEast,
    /// Track below and to the left.
    CornerSouthWest,
    /// Three or four track neighbors.
    Junction,
}

/// Classifies a cell's visual variant from its 4-neighbor track mask.
///
/// Mask bits are north, east, south, west from least to most significant,
/// matching [`NeighborMask`].
#[must_use]
pub fn road_type(mask: NeighborMask) -> RoadType {
    match mask.bits() {
        0b0000 => RoadType::Isolated,
        0b0001 => RoadType::EndNorth,
        0b0010 => RoadType::EndEast,
        0b0011 => RoadType::CornerNorthEast,
        0b0100 => RoadType::EndSouth,
        0b0101 => RoadType::Vertical,
        0b0110 => RoadType::CornerSouthEast,
        0b1000 => RoadType::EndWest,
        0b1001 => RoadType::CornerNorthWest,
        0b1010 => RoadType::Horizontal,
        0b1100 => RoadType::CornerSouthWest,
        _ => RoadType::Junction,
    }
}

/// Base tile family used when composing ground sprite names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileBase {
    /// A walkable track cell.
    Track,
    /// A buildable grass cell.
    Grass,
}

impl TileBase {
    /// Sprite name prefix for the tile family.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Grass => "grass",
        }
    }
}

/// Sprite name suffix selected by the road classification.
///
/// Track cells name their variants after the run direction; grass cells name
/// theirs after the side the adjacent track occupies. Variants the zig-zag
/// generator cannot produce fall back to the plain tile.
#[must_use]
pub fn sprite_suffix(base: TileBase, road: RoadType) -> &'static str {
    match base {
        TileBase::Track => match road {
            RoadType::Isolated | RoadType::Junction => "single",
            RoadType::Vertical | RoadType::EndNorth | RoadType::EndSouth => "vertical",
            RoadType::Horizontal | RoadType::EndEast | RoadType::EndWest => "horizontal",
            RoadType::CornerNorthEast => "right_top_corner",
            RoadType::CornerNorthWest => "left_top_corner",
            RoadType::CornerSouthEast => "right_bottom_corner",
            RoadType::CornerSouthWest => "left_bottom_corner",
        },
        TileBase::Grass => match road {
            RoadType::Isolated
            | RoadType::Junction
            | RoadType::Vertical
            | RoadType::Horizontal => "single",
            RoadType::EndNorth => "top",
            RoadType::EndSouth => "bottom",
            RoadType::EndEast => "right",
            RoadType::EndWest => "left",
            RoadType::CornerNorthEast => "right_top_corner",
            RoadType::CornerNorthWest => "left_top_corner",
            RoadType::CornerSouthEast => "right_bottom_corner",
            RoadType::CornerSouthWest => "left_bottom_corner",
        },
    }
}

/// Composes the full sprite name for a ground cell.
#[must_use]
pub fn tile_sprite_name(base: TileBase, road: RoadType) -> String {
    format!("{}-{}", base.prefix(), sprite_suffix(base, road))
}

/// Describes the cell grid that composes the play area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of cell columns in the grid.
    pub columns: u32,
    /// Number of cell rows in the grid.
    pub rows: u32,
    /// Side length of a single cell in screen pixels.
    pub cell_length: f32,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when `cell_length` is not strictly positive.
    pub fn new(columns: u32, rows: u32, cell_length: f32) -> Result<Self, PresentationError> {
        if cell_length <= 0.0 {
            return Err(PresentationError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
        })
    }

    /// Total width of the grid in screen pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Total height of the grid in screen pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }
}

/// Ground cell prepared for drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundTile {
    /// Cell the tile occupies.
    pub cell: CellCoord,
    /// Tile family of the cell.
    pub base: TileBase,
    /// Visual variant selected from the neighbor mask.
    pub road: RoadType,
}

/// Tower prepared for drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTower {
    /// Identifier allocated by the world.
    pub id: TowerId,
    /// Cell that anchors the tower.
    pub cell: CellCoord,
    /// Upgrade level, which selects the tower sprite.
    pub level: UpgradeLevel,
    /// Targeting range in cells, drawn when selected or hovered.
    pub range: f32,
    /// Whether the tower sits on the selected cell.
    pub selected: bool,
    /// Whether the tower sits under the pointer.
    pub hovered: bool,
}

/// Enemy prepared for drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEnemy {
    /// Continuous position in cell units.
    pub position: Vec2,
    /// Remaining health as a fraction of the spawn health.
    pub health_fraction: f32,
}

/// Bullet prepared for drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneBullet {
    /// Continuous position in cell units.
    pub position: Vec2,
}

/// Pointer selection and hover feedback for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionPresentation {
    /// Cell selected by a previous click, if any.
    pub selected: Option<CellCoord>,
    /// Cell currently under the pointer, if any.
    pub hover: Option<CellCoord>,
    /// Whether the hovered cell lies on the enemy track.
    pub hover_on_track: bool,
}

/// Player stats displayed by the heads-up text block.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HudPresentation {
    /// Gold available for purchases.
    pub gold: f32,
    /// Remaining player health.
    pub health: f32,
    /// Enemies destroyed so far.
    pub kills: u32,
    /// Seconds until the next enemy spawn attempt.
    pub next_spawn_seconds: f32,
}

/// Scene description consumed by rendering backends each frame.
///
/// The draw order is fixed: ground, selection overlays, towers with range
/// indicators, enemies with health bars, bullets, the UI overlay, then the
/// HUD text.
#[derive(Debug, Default)]
pub struct Scene {
    /// Grid metrics of the play area.
    pub grid: Option<GridPresentation>,
    /// Ground tiles in draw order.
    pub ground: Vec<GroundTile>,
    /// Towers currently placed.
    pub towers: Vec<SceneTower>,
    /// Enemies currently walking the track.
    pub enemies: Vec<SceneEnemy>,
    /// Bullets currently in flight.
    pub bullets: Vec<SceneBullet>,
    /// Pointer feedback overlays.
    pub selection: SelectionPresentation,
    /// Player stats for the HUD.
    pub hud: HudPresentation,
    /// Resolved UI draw operations for the overlay.
    pub ui: Vec<UiDrawOp>,
    /// Extra text lines appended below the HUD stats.
    pub hud_lines: Vec<String>,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Debug)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Track Defence scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and may mutate the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum PresentationError {
    /// Cell length must be positive to avoid a zero-sized grid.
    #[error("cell_length must be positive (received {cell_length})")]
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(north: bool, east: bool, south: bool, west: bool) -> NeighborMask {
        NeighborMask::from_flags(north, east, south, west)
    }

    #[test]
    fn road_type_covers_every_neighbor_combination() {
        for bits in 0..16_u8 {
            // Classification must stay total; the match itself guarantees it,
            // this guards against panics sneaking into the table.
            let _ = road_type(NeighborMask::new(bits));
        }
    }

    #[test]
    fn straight_runs_and_corners_classify_by_mask() {
        assert_eq!(road_type(mask(false, false, false, false)), RoadType::Isolated);
        assert_eq!(road_type(mask(true, false, true, false)), RoadType::Vertical);
        assert_eq!(road_type(mask(false, true, false, true)), RoadType::Horizontal);
        assert_eq!(
            road_type(mask(true, true, false, false)),
            RoadType::CornerNorthEast
        );
        assert_eq!(
            road_type(mask(false, false, true, true)),
            RoadType::CornerSouthWest
        );
        assert_eq!(road_type(mask(true, true, true, false)), RoadType::Junction);
        assert_eq!(road_type(mask(true, true, true, true)), RoadType::Junction);
    }

    #[test]
    fn track_sprites_use_run_direction_names() {
        assert_eq!(
            tile_sprite_name(TileBase::Track, RoadType::Vertical),
            "track-vertical"
        );
        assert_eq!(
            tile_sprite_name(TileBase::Track, RoadType::EndEast),
            "track-horizontal"
        );
        assert_eq!(
            tile_sprite_name(TileBase::Track, RoadType::CornerNorthWest),
            "track-left_top_corner"
        );
    }

    #[test]
    fn grass_sprites_use_adjacency_side_names() {
        assert_eq!(
            tile_sprite_name(TileBase::Grass, RoadType::EndNorth),
            "grass-top"
        );
        assert_eq!(
            tile_sprite_name(TileBase::Grass, RoadType::EndWest),
            "grass-left"
        );
        assert_eq!(
            tile_sprite_name(TileBase::Grass, RoadType::Isolated),
            "grass-single"
        );
        assert_eq!(
            tile_sprite_name(TileBase::Grass, RoadType::CornerSouthEast),
            "grass-right_bottom_corner"
        );
    }

    #[test]
    fn grid_presentation_rejects_non_positive_cell_lengths() {
        let error = GridPresentation::new(20, 10, 0.0)
            .expect_err("zero cell_length must be rejected");
        assert_eq!(
            error,
            PresentationError::InvalidCellLength { cell_length: 0.0 }
        );

        let grid = GridPresentation::new(20, 10, 32.0).expect("valid grid");
        assert_eq!(grid.width(), 640.0);
        assert_eq!(grid.height(), 320.0);
    }

    #[test]
    fn rect_containment_is_half_open() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(rect.contains(Vec2::new(10.0, 10.0)));
        assert!(rect.contains(Vec2::new(29.9, 29.9)));
        assert!(!rect.contains(Vec2::new(30.0, 15.0)));
        assert!(!rect.contains(Vec2::new(9.9, 15.0)));
    }

    #[test]
    fn color_alpha_override_keeps_channels() {
        let color = Color::from_rgb_u8(255, 128, 0).with_alpha(0.5);
        assert!((color.red - 1.0).abs() < f32::EPSILON);
        assert!((color.alpha - 0.5).abs() < f32::EPSILON);
    }
}
