//! Sprite atlas loaded from a versioned TOML manifest.
//!
//! The manifest names an atlas image, the tile dimensions, and the symbolic
//! tiles the game refers to. A tile references its atlas index and may carry
//! flip flags or animation metadata. Looking up a name that was never
//! registered is a programmer error and surfaces as an `Err` that aborts the
//! frame loop.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use macroquad::{
    math::{Rect as MacroquadRect, Vec2 as MacroquadVec2},
    texture::{draw_texture_ex, DrawTextureParams, Texture2D},
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use track_defence_rendering::{Color, Rect};

use crate::to_macroquad_color;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// How an animated tile advances once it reaches its final frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationRepeat {
    /// Cycle through the frames forever.
    #[default]
    Repeat,
    /// Play once and hold the last frame.
    NoRepeat,
    /// Cycle through the frames backwards forever.
    Reverse,
    /// Play backwards once and hold the first frame.
    NoRepeatReverse,
}

/// Animation metadata attached to a tile.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct TileAnimation {
    /// Number of consecutive atlas frames, starting at the tile's index.
    pub frames: u32,
    /// Seconds each frame stays on screen.
    pub seconds_per_frame: f32,
    /// Repeat behavior after the final frame.
    #[serde(default)]
    pub repeat: AnimationRepeat,
}

impl TileAnimation {
    /// Frame offset displayed after `elapsed` seconds of animation.
    #[must_use]
    pub fn frame_at(&self, elapsed: f32) -> u32 {
        if self.frames <= 1 || self.seconds_per_frame <= 0.0 {
            return 0;
        }

        let steps = (elapsed.max(0.0) / self.seconds_per_frame) as u32;
        let last = self.frames - 1;
        match self.repeat {
            AnimationRepeat::Repeat => steps % self.frames,
            AnimationRepeat::NoRepeat => steps.min(last),
            AnimationRepeat::Reverse => last - (steps % self.frames),
            AnimationRepeat::NoRepeatReverse => last - steps.min(last),
        }
    }
}

/// A named tile registered in the atlas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileInfo {
    /// Zero-based index into the atlas, row-major.
    pub index: u32,
    /// Mirror the tile horizontally when drawing.
    pub flip_x: bool,
    /// Mirror the tile vertically when drawing.
    pub flip_y: bool,
    /// Optional animation metadata.
    pub animation: Option<TileAnimation>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    version: u32,
    atlas: String,
    tile_width: f32,
    tile_height: f32,
    tiles: Vec<ManifestTile>,
}

#[derive(Debug, Deserialize)]
struct ManifestTile {
    name: String,
    index: u32,
    #[serde(default)]
    flip_x: bool,
    #[serde(default)]
    flip_y: bool,
    animation: Option<TileAnimation>,
}

/// Parsed manifest contents before any texture is touched.
#[derive(Debug, PartialEq)]
pub(crate) struct ManifestData {
    pub(crate) atlas_path: String,
    pub(crate) tile_size: (f32, f32),
    pub(crate) tiles: Vec<(String, TileInfo)>,
}

pub(crate) fn parse_manifest(contents: &str) -> Result<ManifestData> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }
    if manifest.tile_width <= 0.0 || manifest.tile_height <= 0.0 {
        bail!(
            "tile dimensions must be positive (received {}x{})",
            manifest.tile_width,
            manifest.tile_height
        );
    }

    let mut tiles = Vec::with_capacity(manifest.tiles.len());
    let mut seen: HashSet<String> = HashSet::with_capacity(manifest.tiles.len());
    for tile in manifest.tiles {
        if !seen.insert(tile.name.clone()) {
            bail!("sprite manifest contains duplicate entry for `{}`", tile.name);
        }
        tiles.push((
            tile.name,
            TileInfo {
                index: tile.index,
                flip_x: tile.flip_x,
                flip_y: tile.flip_y,
                animation: tile.animation,
            },
        ));
    }

    Ok(ManifestData {
        atlas_path: manifest.atlas,
        tile_size: (manifest.tile_width, manifest.tile_height),
        tiles,
    })
}

/// Atlas texture plus the registry of named tiles.
#[derive(Debug)]
pub struct SpriteAtlas {
    texture: Texture2D,
    tile_width: f32,
    tile_height: f32,
    columns: u32,
    tiles: HashMap<String, TileInfo>,
}

impl SpriteAtlas {
    /// Loads the atlas described by the manifest at the provided path.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let data = parse_manifest(&contents)?;

        let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
        let atlas_path = base.join(&data.atlas_path);
        let bytes = fs::read(&atlas_path)
            .with_context(|| format!("failed to read atlas image at {}", atlas_path.display()))?;
        let texture = Texture2D::from_file_with_format(&bytes, None);

        Ok(Self::from_texture(texture, data))
    }

    pub(crate) fn from_texture(texture: Texture2D, data: ManifestData) -> Self {
        let columns = if data.tile_size.0 > 0.0 {
            (texture.width() / data.tile_size.0).max(1.0) as u32
        } else {
            1
        };
        Self {
            texture,
            tile_width: data.tile_size.0,
            tile_height: data.tile_size.1,
            columns,
            tiles: data.tiles.into_iter().collect(),
        }
    }

    /// Returns whether the atlas registered the provided name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tiles.contains_key(name)
    }

    /// Number of registered tiles.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Atlas source rectangle of the provided tile at the given time.
    pub(crate) fn source_rect(&self, info: &TileInfo, elapsed: f32) -> MacroquadRect {
        let frame = info
            .animation
            .as_ref()
            .map_or(0, |animation| animation.frame_at(elapsed));
        let index = info.index + frame;
        let column = index % self.columns;
        let row = index / self.columns;
        MacroquadRect::new(
            column as f32 * self.tile_width,
            row as f32 * self.tile_height,
            self.tile_width,
            self.tile_height,
        )
    }

    /// Draws the named tile stretched over `dest`.
    ///
    /// Returns an error when the name was never registered; callers treat
    /// that as a broken invariant and abort the frame loop.
    pub fn draw(&self, name: &str, dest: Rect, tint: Color, elapsed: f32) -> Result<()> {
        let Some(info) = self.tiles.get(name) else {
            bail!("sprite `{name}` missing from atlas");
        };

        let source = self.source_rect(info, elapsed);
        let params = DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(dest.width, dest.height)),
            source: Some(source),
            flip_x: info.flip_x,
            flip_y: info.flip_y,
            ..DrawTextureParams::default()
        };
        draw_texture_ex(
            self.texture,
            dest.x,
            dest.y,
            to_macroquad_color(tint),
            params,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
        version = 1
        atlas = "tilemap.png"
        tile_width = 32.0
        tile_height = 32.0

        [[tiles]]
        name = "track-vertical"
        index = 12

        [[tiles]]
        name = "track-left_top_corner"
        index = 22
        flip_x = true

        [[tiles]]
        name = "skeleton-walk"
        index = 40
        [tiles.animation]
        frames = 4
        seconds_per_frame = 0.25
    "#;

    #[test]
    fn manifest_parses_tiles_with_flips_and_animation() {
        let data = parse_manifest(MANIFEST).expect("manifest parses");

        assert_eq!(data.atlas_path, "tilemap.png");
        assert_eq!(data.tile_size, (32.0, 32.0));
        assert_eq!(data.tiles.len(), 3);

        let (name, info) = &data.tiles[1];
        assert_eq!(name, "track-left_top_corner");
        assert!(info.flip_x);
        assert!(!info.flip_y);

        let (_, animated) = &data.tiles[2];
        let animation = animated.animation.expect("animation present");
        assert_eq!(animation.frames, 4);
        assert_eq!(animation.repeat, AnimationRepeat::Repeat);
    }

    #[test]
    fn manifest_rejects_unsupported_versions() {
        let manifest = "version = 2\natlas = \"a.png\"\ntile_width = 32.0\ntile_height = 32.0\ntiles = []";
        assert!(parse_manifest(manifest).is_err());
    }

    #[test]
    fn manifest_rejects_duplicate_names() {
        let manifest = r#"
            version = 1
            atlas = "a.png"
            tile_width = 32.0
            tile_height = 32.0

            [[tiles]]
            name = "grass-single"
            index = 1

            [[tiles]]
            name = "grass-single"
            index = 2
        "#;
        assert!(parse_manifest(manifest).is_err());
    }

    #[test]
    fn repeat_animation_wraps_around() {
        let animation = TileAnimation {
            frames: 4,
            seconds_per_frame: 0.5,
            repeat: AnimationRepeat::Repeat,
        };
        assert_eq!(animation.frame_at(0.0), 0);
        assert_eq!(animation.frame_at(0.6), 1);
        assert_eq!(animation.frame_at(2.1), 0);
    }

    #[test]
    fn no_repeat_animation_holds_the_last_frame() {
        let animation = TileAnimation {
            frames: 4,
            seconds_per_frame: 0.5,
            repeat: AnimationRepeat::NoRepeat,
        };
        assert_eq!(animation.frame_at(10.0), 3);
    }

    #[test]
    fn reverse_animations_run_backwards() {
        let animation = TileAnimation {
            frames: 4,
            seconds_per_frame: 1.0,
            repeat: AnimationRepeat::Reverse,
        };
        assert_eq!(animation.frame_at(0.0), 3);
        assert_eq!(animation.frame_at(1.0), 2);

        let once = TileAnimation {
            repeat: AnimationRepeat::NoRepeatReverse,
            ..animation
        };
        assert_eq!(once.frame_at(10.0), 0);
    }

    #[test]
    fn atlas_resolves_row_major_source_rects() {
        let data = parse_manifest(MANIFEST).expect("manifest parses");
        let atlas = SpriteAtlas::from_texture(Texture2D::empty(), data);

        // An empty texture has no width, so every tile resolves to column 0.
        let info = TileInfo {
            index: 0,
            flip_x: false,
            flip_y: false,
            animation: None,
        };
        let rect = atlas.source_rect(&info, 0.0);
        assert_eq!((rect.w, rect.h), (32.0, 32.0));
        assert!(atlas.contains("track-vertical"));
        assert!(!atlas.contains("no-such-tile"));
        assert_eq!(atlas.tile_count(), 3);
    }
}
