use crate::engine::{Point, Size};
use crate::sprite::{WALK_FRAMES, WALK_FRAME_DELAY_MS};
use crate::world::SOLID_TILE;
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Where every asset is served from, relative to the page
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetPaths {
    pub player_up: String,
    pub player_left: String,
    pub player_down: String,
    pub player_right: String,
    pub map: String,
    pub collisions: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        AssetPaths {
            player_up: "assets/playerUp.png".to_string(),
            player_left: "assets/playerLeft.png".to_string(),
            player_down: "assets/playerDown.png".to_string(),
            player_right: "assets/playerRight.png".to_string(),
            map: "assets/MapCustom.png".to_string(),
            collisions: "assets/collisions.json".to_string(),
        }
    }
}

/// Tunables, read from `config.json` next to the page
/// - every field is optional, missing ones take the default
///
/// ```text
/// { "step": 3, "cameraFollowsPlayer": false, "showBoundaries": true }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WalkConfig {
    /// pixels walked per tick
    pub step: f32,
    pub frame_delay_ms: f64,
    pub player_frames: u8,
    /// true  : the map scrolls under a screen fixed player
    /// false : the map stays put and the player walks across the screen
    pub camera_follows_player: bool,
    pub canvas: Size,
    /// where the map's top left corner starts on screen
    pub map_offset: Point,
    pub solid_tile: u32,
    /// outline every obstacle in red
    pub show_boundaries: bool,
    pub assets: AssetPaths,
}

impl Default for WalkConfig {
    fn default() -> Self {
        WalkConfig {
            step: 4.0,
            frame_delay_ms: WALK_FRAME_DELAY_MS,
            player_frames: WALK_FRAMES,
            camera_follows_player: true,
            canvas: Size {
                width: 1024.0,
                height: 576.0,
            },
            map_offset: Point::new(-700.0, -350.0),
            solid_tile: SOLID_TILE,
            show_boundaries: cfg!(debug_assertions),
            assets: AssetPaths::default(),
        }
    }
}

impl WalkConfig {
    pub const PATH: &'static str = "config.json";

    pub fn validate(self) -> Result<Self> {
        ensure!(
            self.step.is_finite() && self.step > 0.0,
            "step must be a positive number of pixels, got {}",
            self.step
        );
        ensure!(
            self.frame_delay_ms.is_finite() && self.frame_delay_ms >= 0.0,
            "frameDelayMs must be a non negative number, got {}",
            self.frame_delay_ms
        );
        ensure!(self.player_frames > 0, "playerFrames must be at least 1");
        ensure!(
            self.canvas.width.is_finite()
                && self.canvas.height.is_finite()
                && self.canvas.width > 0.0
                && self.canvas.height > 0.0,
            "canvas must have a positive size, got {:?}",
            self.canvas
        );
        ensure!(
            self.map_offset.x.is_finite() && self.map_offset.y.is_finite(),
            "mapOffset must be finite, got {:?}",
            self.map_offset
        );
        Ok(self)
    }
}
