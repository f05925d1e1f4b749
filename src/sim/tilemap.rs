//! Tile grid placed in the scene, and the progressive activation window
//!
//! Colliders are only created for columns near the camera. `TileWindow`
//! tracks `from..until`; each activation covers the columns between the
//! previous `until` and the new one, so no cell is ever activated twice.

use glam::Vec2;

use super::ports::{BodyDesc, Category, Shape};
use crate::assets::TilemapAsset;
use crate::consts::*;
use crate::error::Result;

/// A tilemap positioned in the scene (bottom-left corner at `origin`)
#[derive(Debug, Clone)]
pub struct Tilemap {
    pub name: String,
    pub columns: usize,
    pub rows: usize,
    /// Tile size after scaling
    pub tile_size: Vec2,
    pub origin: Vec2,
    /// Solid flags, row-major with row 0 at the bottom
    solid: Vec<bool>,
    pub carrot: Option<(usize, usize)>,
}

impl Tilemap {
    pub fn from_asset(asset: &TilemapAsset, origin: Vec2) -> Result<Self> {
        asset.validate()?;
        let columns = asset.columns();
        let rows = asset.rows.len();

        let mut solid = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            for column in 0..columns {
                solid.push(asset.tile_name(column, row).is_some_and(is_solid_tile_name));
            }
        }

        Ok(Self {
            name: asset.name.clone(),
            columns,
            rows,
            tile_size: asset.tile_size * asset.scale,
            origin,
            solid,
            carrot: asset.carrot.map(|[c, r]| (c as usize, r as usize)),
        })
    }

    pub fn is_solid(&self, column: usize, row: usize) -> bool {
        column < self.columns && row < self.rows && self.solid[row * self.columns + column]
    }

    pub fn center_of_tile(&self, column: usize, row: usize) -> Vec2 {
        self.origin + Vec2::new(column as f32 + 0.5, row as f32 + 0.5) * self.tile_size
    }

    /// Scene x of the map's right edge
    pub fn right_edge(&self) -> f32 {
        self.origin.x + self.columns as f32 * self.tile_size.x
    }

    /// Column index of a scene x (may be negative or past the map)
    pub fn column_at(&self, x: f32) -> i64 {
        ((x - self.origin.x) / self.tile_size.x).floor() as i64
    }

    /// Static ground collider for one cell
    pub fn collider_desc(&self, column: usize, row: usize) -> BodyDesc {
        let mut desc = BodyDesc::fixed(
            Shape::Rect {
                size: self.tile_size,
            },
            self.center_of_tile(column, row),
        )
        .with_category(Category::GROUND)
        .colliding_with(Category::BUNNY);
        desc.friction = GROUND_FRICTION;
        desc.linear_damping = GROUND_LINEAR_DAMPING;
        desc.restitution = 0.0;
        desc
    }

    pub fn carrot_position(&self) -> Option<Vec2> {
        self.carrot.map(|(c, r)| self.center_of_tile(c, r))
    }
}

/// Tiles named "...center..." form the solid interior of the ground
pub fn is_solid_tile_name(name: &str) -> bool {
    name.to_lowercase().contains(SOLID_TILE_MARKER)
}

/// Half-open column range `from..until` of activated tiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileWindow {
    pub from: usize,
    pub until: usize,
}

impl TileWindow {
    pub fn reset(&mut self) {
        self.from = 0;
        self.until = 0;
    }

    /// Extend the window to cover `TILE_LOOKAHEAD_COLUMNS` past `trigger_x`.
    ///
    /// Returns the solid cells that became active. `until` never moves left.
    pub fn advance(&mut self, map: &Tilemap, trigger_x: f32) -> Vec<(usize, usize)> {
        let target = map
            .column_at(trigger_x)
            .saturating_add(TILE_LOOKAHEAD_COLUMNS)
            .max(0) as usize;
        self.until = self.until.max(target);

        let mut cells = Vec::new();
        for column in self.from..self.until.min(map.columns) {
            for row in 0..map.rows {
                if map.is_solid(column, row) {
                    cells.push((column, row));
                }
            }
        }
        self.from = self.until;
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn asset(rows: &[&str]) -> TilemapAsset {
        let legend: BTreeMap<String, String> = [
            ("#".to_string(), "Dirt_CENTER".to_string()),
            ("^".to_string(), "grass_top".to_string()),
        ]
        .into_iter()
        .collect();
        TilemapAsset {
            name: "test".to_string(),
            tile_size: Vec2::splat(10.0),
            scale: 2.0,
            legend,
            rows: rows.iter().map(|r| r.to_string()).collect(),
            carrot: None,
        }
    }

    #[test]
    fn test_solid_marker_is_case_insensitive() {
        assert!(is_solid_tile_name("Grass_Center"));
        assert!(is_solid_tile_name("centerpiece"));
        assert!(!is_solid_tile_name("grass_top"));
    }

    #[test]
    fn test_geometry_uses_scaled_tiles() {
        let mut doc = asset(&["^^^", "###"]);
        doc.carrot = Some([1, 1]);
        let map = Tilemap::from_asset(&doc, Vec2::new(-100.0, -50.0)).unwrap();
        assert_eq!(map.tile_size, Vec2::splat(20.0));
        assert_eq!(map.center_of_tile(0, 0), Vec2::new(-90.0, -40.0));
        assert_eq!(map.right_edge(), -40.0);
        assert_eq!(map.column_at(-100.0), 0);
        assert_eq!(map.column_at(-101.0), -1);
        assert!(map.is_solid(2, 0));
        assert!(!map.is_solid(2, 1));
        assert!(!map.is_solid(3, 0));
        assert_eq!(map.carrot_position(), Some(Vec2::new(-70.0, -20.0)));
    }

    #[test]
    fn test_collider_is_static_ground() {
        let map = Tilemap::from_asset(&asset(&["#"]), Vec2::ZERO).unwrap();
        let desc = map.collider_desc(0, 0);
        assert!(!desc.dynamic);
        assert_eq!(desc.category, Category::GROUND);
        assert_eq!(desc.collides_with, Category::BUNNY);
        assert_eq!(desc.friction, GROUND_FRICTION);
    }

    #[test]
    fn test_window_activates_each_column_once() {
        let row: String = "#".repeat(100);
        let map = Tilemap::from_asset(&asset(&[&row]), Vec2::ZERO).unwrap();
        let mut window = TileWindow::default();

        // Column 0 + lookahead
        let first = window.advance(&map, 0.0);
        assert_eq!(first.len(), TILE_LOOKAHEAD_COLUMNS as usize);
        assert_eq!(window, TileWindow { from: 25, until: 25 });

        // Same trigger again activates nothing
        assert!(window.advance(&map, 0.0).is_empty());

        // Further right: only the new columns
        let second = window.advance(&map, 200.0);
        assert_eq!(second.first(), Some(&(25, 0)));
        assert_eq!(second.len(), 10);

        // Trigger moving backwards never shrinks the window
        window.advance(&map, -5000.0);
        assert_eq!(window.until, 35);
    }

    #[test]
    fn test_window_clamps_to_map_width() {
        let map = Tilemap::from_asset(&asset(&["#####"]), Vec2::ZERO).unwrap();
        let mut window = TileWindow::default();
        assert_eq!(window.advance(&map, 0.0).len(), 5);
        assert!(window.advance(&map, 10_000.0).is_empty());
    }

    #[test]
    fn test_window_survives_non_finite_trigger() {
        let map = Tilemap::from_asset(&asset(&["#####"]), Vec2::ZERO).unwrap();
        let mut window = TileWindow::default();
        assert_eq!(map.column_at(f32::INFINITY), i64::MAX);
        assert_eq!(window.advance(&map, f32::INFINITY).len(), 5);
        assert!(window.advance(&map, f32::MAX).is_empty());
        assert!(window.advance(&map, f32::NAN).is_empty());
    }
}
