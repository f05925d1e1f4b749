//! Named scene assets
//!
//! The host asset pipeline hands the scene two kinds of resources by name:
//! tilemaps (`level1`..`levelN`) and sprite sheets (`bunny`, `sun`). A lookup
//! for a name that was never registered is a fatal `MissingAsset`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SceneError};
use crate::level_asset_name;

/// File holding the sprite sheet manifest inside an asset directory
pub const SHEET_MANIFEST: &str = "sheets.json";

/// Tilemap document
///
/// `rows` are listed top row first, one character per column. Characters are
/// resolved through `legend` into tile names; characters missing from the
/// legend are empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilemapAsset {
    pub name: String,
    pub tile_size: Vec2,
    #[serde(default = "unit_scale")]
    pub scale: f32,
    pub legend: BTreeMap<String, String>,
    pub rows: Vec<String>,
    /// Carrot cell as `[column, row]`, row 0 at the bottom
    #[serde(default)]
    pub carrot: Option<[u32; 2]>,
}

fn unit_scale() -> f32 {
    1.0
}

impl TilemapAsset {
    pub fn columns(&self) -> usize {
        self.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0)
    }

    /// Tile name at a cell, row 0 at the bottom
    pub fn tile_name(&self, column: usize, row: usize) -> Option<&str> {
        let top_index = self.rows.len().checked_sub(row + 1)?;
        let ch = self.rows[top_index].chars().nth(column)?;
        self.legend.get(&ch.to_string()).map(String::as_str)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows.is_empty() || self.columns() == 0 {
            return Err(SceneError::invalid(&self.name, "tilemap has no cells"));
        }
        if self.tile_size.x <= 0.0 || self.tile_size.y <= 0.0 || self.scale <= 0.0 {
            return Err(SceneError::invalid(&self.name, "tile size and scale must be positive"));
        }
        if let Some(key) = self.legend.keys().find(|k| k.chars().count() != 1) {
            return Err(SceneError::invalid(
                &self.name,
                format!("legend key '{}' is not a single character", key),
            ));
        }
        if let Some([col, row]) = self.carrot {
            if col as usize >= self.columns() || row as usize >= self.rows.len() {
                return Err(SceneError::invalid(&self.name, "carrot cell is outside the map"));
            }
        }
        Ok(())
    }
}

/// Normalized texture rectangle of one sprite-sheet cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Image metadata: pixel size plus the frame grid it is cut into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub name: String,
    pub width: f32,
    pub height: f32,
    #[serde(default = "single")]
    pub rows: u32,
    #[serde(default = "single")]
    pub columns: u32,
}

fn single() -> u32 {
    1
}

impl SpriteSheet {
    pub fn new(name: &str, width: f32, height: f32, rows: u32, columns: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            rows,
            columns,
        }
    }

    /// Pixel size of one frame
    pub fn frame_size(&self) -> Vec2 {
        Vec2::new(
            self.width / self.columns.max(1) as f32,
            self.height / self.rows.max(1) as f32,
        )
    }

    /// Frames in row-major order
    pub fn frames(&self) -> Vec<FrameRect> {
        let rows = self.rows.max(1);
        let columns = self.columns.max(1);
        let w = 1.0 / columns as f32;
        let h = 1.0 / rows as f32;
        (0..rows)
            .flat_map(|row| {
                (0..columns).map(move |column| FrameRect {
                    x: column as f32 * w,
                    y: row as f32 * h,
                    w,
                    h,
                })
            })
            .collect()
    }
}

/// Registry of named assets
#[derive(Debug, Clone, Default)]
pub struct AssetLibrary {
    tilemaps: HashMap<String, TilemapAsset>,
    sheets: HashMap<String, SpriteSheet>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_tilemap(&mut self, map: TilemapAsset) {
        self.tilemaps.insert(map.name.clone(), map);
    }

    pub fn insert_sheet(&mut self, sheet: SpriteSheet) {
        self.sheets.insert(sheet.name.clone(), sheet);
    }

    pub fn tilemap(&self, name: &str) -> Result<&TilemapAsset> {
        self.tilemaps
            .get(name)
            .ok_or_else(|| SceneError::MissingAsset(name.to_string()))
    }

    pub fn sheet(&self, name: &str) -> Result<&SpriteSheet> {
        self.sheets
            .get(name)
            .ok_or_else(|| SceneError::MissingAsset(name.to_string()))
    }

    pub fn tilemap_count(&self) -> usize {
        self.tilemaps.len()
    }

    /// Load every `*.json` in a directory.
    ///
    /// `sheets.json` is a list of sprite sheets; every other file is one
    /// tilemap document.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut library = Self::new();

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let json = std::fs::read_to_string(&path)?;
            if path.file_name().is_some_and(|n| n == SHEET_MANIFEST) {
                let sheets: Vec<SpriteSheet> = serde_json::from_str(&json)?;
                for sheet in sheets {
                    library.insert_sheet(sheet);
                }
            } else {
                let map: TilemapAsset = serde_json::from_str(&json)?;
                map.validate()?;
                library.insert_tilemap(map);
            }
        }

        log::info!(
            "Loaded {} tilemaps and {} sprite sheets from {}",
            library.tilemap_count(),
            library.sheets.len(),
            dir.display()
        );
        Ok(library)
    }

    /// Built-in assets: the player sheet, the sun and `MAX_LEVEL` generated levels
    pub fn builtin(seed: u64) -> Self {
        let mut library = Self::new();
        library.insert_sheet(SpriteSheet::new(
            PLAYER_SHEET,
            256.0,
            64.0,
            PLAYER_SHEET_ROWS,
            PLAYER_SHEET_COLUMNS,
        ));
        library.insert_sheet(SpriteSheet::new(SUN_IMAGE, 32.0, 32.0, 1, 1));
        for level in 1..=MAX_LEVEL {
            library.insert_tilemap(generate_level(level, seed));
        }
        library
    }
}

/// Columns in a generated level
const GENERATED_COLUMNS: usize = 160;
/// Rows in a generated level
const GENERATED_ROWS: usize = 8;
/// Solid run kept at the start so the spawn point always has ground
const SAFE_START_COLUMNS: usize = 20;

/// Generate a level layout: solid dirt with a grass top, gaps that widen with
/// the level number, a few floating ledges and a carrot.
pub fn generate_level(level: u32, seed: u64) -> TilemapAsset {
    let mut rng = Pcg32::seed_from_u64(seed ^ (level as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15));
    let mut grid = vec![vec!['.'; GENERATED_COLUMNS]; GENERATED_ROWS];

    // Row index here is from the bottom; flipped when emitted.
    let mut column = 0;
    while column < GENERATED_COLUMNS {
        let run = if column == 0 {
            SAFE_START_COLUMNS
        } else {
            rng.random_range(6..14)
        };
        for c in column..(column + run).min(GENERATED_COLUMNS) {
            grid[0][c] = '#';
            grid[1][c] = '#';
            grid[2][c] = '=';
            grid[3][c] = '^';
        }
        column += run;
        column += rng.random_range(1..=(1 + level as usize).min(4));
    }

    for _ in 0..(2 + level as usize) {
        let start = rng.random_range(SAFE_START_COLUMNS..GENERATED_COLUMNS - 6);
        let len = rng.random_range(3..6);
        for c in start..start + len {
            grid[5][c] = '=';
        }
    }

    let carrot_column = rng.random_range(SAFE_START_COLUMNS / 2..SAFE_START_COLUMNS);

    let legend = [
        ("#", "dirt_center"),
        ("=", "grass_center"),
        ("^", "grass_top"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    TilemapAsset {
        name: level_asset_name(level),
        tile_size: Vec2::splat(64.0),
        scale: 1.0,
        legend,
        rows: grid.iter().rev().map(|r| r.iter().collect()).collect(),
        carrot: Some([carrot_column as u32, 4]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fresh scratch directory under the system temp dir
    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("bunny-run-{}-{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_sheets(dir: &Path) {
        let sheets = vec![
            SpriteSheet::new(PLAYER_SHEET, 256.0, 64.0, 1, 4),
            SpriteSheet::new(SUN_IMAGE, 32.0, 32.0, 1, 1),
        ];
        std::fs::write(dir.join(SHEET_MANIFEST), serde_json::to_string(&sheets).unwrap()).unwrap();
    }

    fn tiny_map() -> TilemapAsset {
        TilemapAsset {
            name: "tiny".to_string(),
            tile_size: Vec2::splat(32.0),
            scale: 1.0,
            legend: [("#".to_string(), "Ground_Center".to_string())].into_iter().collect(),
            rows: vec!["..#".to_string(), "###".to_string()],
            carrot: None,
        }
    }

    #[test]
    fn test_tile_name_bottom_row_first() {
        let map = tiny_map();
        assert_eq!(map.tile_name(0, 0), Some("Ground_Center"));
        assert_eq!(map.tile_name(0, 1), None);
        assert_eq!(map.tile_name(2, 1), Some("Ground_Center"));
        assert_eq!(map.tile_name(3, 0), None);
        assert_eq!(map.tile_name(0, 2), None);
    }

    #[test]
    fn test_sheet_frames_cover_grid() {
        let sheet = SpriteSheet::new("bunny", 256.0, 64.0, 1, 4);
        let frames = sheet.frames();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[2], FrameRect { x: 0.5, y: 0.0, w: 0.25, h: 1.0 });
        assert_eq!(sheet.frame_size(), Vec2::new(64.0, 64.0));
    }

    #[test]
    fn test_missing_asset_is_error() {
        let library = AssetLibrary::new();
        assert!(matches!(library.tilemap("level1"), Err(SceneError::MissingAsset(n)) if n == "level1"));
        assert!(matches!(library.sheet("bunny"), Err(SceneError::MissingAsset(_))));
    }

    #[test]
    fn test_builtin_has_every_level() {
        let library = AssetLibrary::builtin(7);
        for level in 1..=MAX_LEVEL {
            let map = library.tilemap(&level_asset_name(level)).unwrap();
            map.validate().unwrap();
            // Spawn area is solid
            assert_eq!(map.tile_name(1, 2), Some("grass_center"));
        }
        assert!(library.sheet(PLAYER_SHEET).is_ok());
        assert!(library.sheet(SUN_IMAGE).is_ok());
    }

    #[test]
    fn test_generated_levels_are_deterministic() {
        assert_eq!(generate_level(3, 42), generate_level(3, 42));
        assert_ne!(generate_level(3, 42).rows, generate_level(4, 42).rows);
    }

    #[test]
    fn test_validate_rejects_carrot_outside_map() {
        let mut map = tiny_map();
        map.carrot = Some([9, 0]);
        assert!(map.validate().is_err());
    }

    #[test]
    fn test_tilemap_json_defaults() {
        let json = r#"{
            "name": "level1",
            "tile_size": [64.0, 64.0],
            "legend": { "=": "dirt_center" },
            "rows": ["==="]
        }"#;
        let map: TilemapAsset = serde_json::from_str(json).unwrap();
        assert_eq!(map.scale, 1.0);
        assert_eq!(map.carrot, None);
        assert_eq!(map.tile_name(1, 0), Some("dirt_center"));
    }

    #[test]
    fn test_load_dir_reads_sheets_and_levels() {
        let dir = scratch_dir("load");
        write_sheets(&dir);
        let level = generate_level(1, 3);
        std::fs::write(dir.join("level1.json"), serde_json::to_string_pretty(&level).unwrap()).unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let library = AssetLibrary::load_dir(&dir).unwrap();
        assert_eq!(library.tilemap_count(), 1);
        assert_eq!(library.tilemap("level1").unwrap(), &level);
        assert_eq!(library.sheet(PLAYER_SHEET).unwrap().columns, 4);
        assert_eq!(library.sheet(SUN_IMAGE).unwrap().rows, 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_dir_rejects_bad_tilemaps() {
        let dir = scratch_dir("malformed");
        std::fs::write(dir.join("level1.json"), r#"{ "name": "level1", "rows": "#).unwrap();
        assert!(matches!(AssetLibrary::load_dir(&dir), Err(SceneError::Json(_))));

        let mut empty = tiny_map();
        empty.name = "level1".to_string();
        empty.rows.clear();
        std::fs::write(dir.join("level1.json"), serde_json::to_string(&empty).unwrap()).unwrap();
        assert!(matches!(
            AssetLibrary::load_dir(&dir),
            Err(SceneError::InvalidAsset { name, .. }) if name == "level1"
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_dir_missing_directory_is_io_error() {
        let dir = std::env::temp_dir().join(format!("bunny-run-absent-{}", std::process::id()));
        assert!(matches!(AssetLibrary::load_dir(&dir), Err(SceneError::Io(_))));
    }

    #[test]
    fn test_setup_from_dir_without_level1_fails() {
        use crate::settings::SceneProfile;
        use crate::sim::{ReferenceWorld, setup};

        let dir = scratch_dir("nolevel");
        write_sheets(&dir);
        std::fs::write(
            dir.join("level2.json"),
            serde_json::to_string(&generate_level(2, 3)).unwrap(),
        )
        .unwrap();

        let library = AssetLibrary::load_dir(&dir).unwrap();
        let profile = SceneProfile::tilemap();
        let mut world = ReferenceWorld::new(profile.gravity);
        let err = setup(profile, &library, &mut world).unwrap_err();
        assert!(matches!(err, SceneError::MissingAsset(name) if name == "level1"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
