use crate::engine::{DrawSink, ImageSource, Point, Rect, Size};
use crate::sprite::AnimatedSprite;
use anyhow::{ensure, Result};
use serde::Deserialize;
use std::convert::TryFrom;

pub mod collision;

pub use self::collision::is_blocked;

/// Pixel size of one map tile, also the size of every obstacle
pub const TILE_SIZE: f32 = 48.0;

/// Tile code the map editor exports for solid tiles
pub const SOLID_TILE: u32 = 1025;

/// Anything that slides along when the camera follows the player
pub trait Movable {
    fn shift(&mut self, delta: Point);
}

impl<I> Movable for AnimatedSprite<I>
where
    I: ImageSource,
{
    fn shift(&mut self, delta: Point) {
        self.set_position(self.position().translate(delta));
    }
}

/// A solid tile the player can't walk through
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    position: Point,
}

impl Obstacle {
    pub const SIZE: Size = Size {
        width: TILE_SIZE,
        height: TILE_SIZE,
    };

    pub fn new(position: Point) -> Self {
        Obstacle { position }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::new(self.position, Self::SIZE)
    }
}

impl Movable for Obstacle {
    fn shift(&mut self, delta: Point) {
        self.position = self.position.translate(delta);
    }
}

#[derive(Debug, Deserialize)]
struct TileMapData {
    width: usize,
    tiles: Vec<u32>,
}

/// Collision layer exported from the map editor : a flat, row major list of
/// tile codes `width` tiles per row
///
/// ```text
/// { "width": 70, "tiles": [0, 0, 1025, 1025, 0, ...] }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "TileMapData")]
pub struct TileMap {
    width: usize,
    tiles: Vec<u32>,
}

impl TryFrom<TileMapData> for TileMap {
    type Error = anyhow::Error;

    fn try_from(data: TileMapData) -> Result<Self> {
        TileMap::new(data.width, data.tiles)
    }
}

impl TileMap {
    /// # Errors
    /// * `width` of 0
    /// * tile count that doesn't fill whole rows
    pub fn new(width: usize, tiles: Vec<u32>) -> Result<Self> {
        ensure!(width > 0, "TileMap row width must be positive");
        ensure!(
            tiles.len() % width == 0,
            "TileMap has {} tiles, not a whole number of {} tile rows",
            tiles.len(),
            width
        );
        Ok(TileMap { width, tiles })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.tiles.len() / self.width
    }

    /// One obstacle per `solid` tile, row by row
    /// - (row, col) -> (col * TILE_SIZE + offset.x, row * TILE_SIZE + offset.y)
    pub fn obstacles(&self, solid: u32, offset: Point) -> Vec<Obstacle> {
        self.tiles
            .chunks(self.width)
            .enumerate()
            .flat_map(|(row, tiles)| {
                tiles
                    .iter()
                    .enumerate()
                    .filter(move |(_, code)| **code == solid)
                    .map(move |(col, _)| {
                        Obstacle::new(Point::new(
                            col as f32 * TILE_SIZE + offset.x,
                            row as f32 * TILE_SIZE + offset.y,
                        ))
                    })
            })
            .collect()
    }
}

/// Everything that scrolls : the map background and its obstacles
pub struct World<I> {
    background: AnimatedSprite<I>,
    obstacles: Vec<Obstacle>,
}

impl<I: ImageSource> World<I> {
    pub fn new(background: AnimatedSprite<I>, obstacles: Vec<Obstacle>) -> Self {
        World {
            background,
            obstacles,
        }
    }

    pub fn from_tile_map(background: I, tile_map: &TileMap, solid: u32, offset: Point) -> Self {
        World::new(
            AnimatedSprite::still(background, offset),
            tile_map.obstacles(solid, offset),
        )
    }

    pub fn background(&self) -> &AnimatedSprite<I> {
        &self.background
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Camera step : every movable slides by `delta`, background first
    pub fn shift(&mut self, delta: Point) {
        self.background.shift(delta);
        for obstacle in self.obstacles.iter_mut() {
            obstacle.shift(delta);
        }
    }

    pub fn draw(&self, sink: &impl DrawSink<I>) {
        self.background.draw(sink);
    }

    pub fn draw_boundaries(&self, sink: &impl DrawSink<I>) {
        for obstacle in self.obstacles.iter() {
            sink.draw_outline(&obstacle.bounding_box());
        }
    }
}
