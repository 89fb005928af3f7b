use crate::browser;
use crate::config::WalkConfig;
use crate::engine::input::{Direction, InputState};
use crate::engine::{self, DrawSink, Game, ImageSource, Point, Rect, Renderer, Size};
use crate::sprite::{FacingImages, Player};
use crate::world::{self, TileMap, World};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::try_join;
use web_sys::HtmlImageElement;

/// TABLE
/// ┌───────────────────── Game Architecture Overview ────────────────────────┐
/// │                                                                         │
/// │    ┌─────────────┐          ┌─────────────┐          ┌─────────────┐    │
/// │    │   lib.rs    │  start   │  engine/    │  update  │   game.rs   │    │
/// │    │  main_js()  ├─────────►│  GameLoop   ├─────────►│  TileWalker │    │
/// │    └─────────────┘          └──────┬──────┘          └──────┬──────┘    │
/// │                                    │                        │           │
/// │                             ┌──────┴───────┐         ┌──────┴──────┐    │
/// │                             │  InputState  │         │  GameState  │    │
/// │                             │  (keyboard)  ├────────►│  player +   │    │
/// │                             └──────────────┘         │  world      │    │
/// │                                                      └─────────────┘    │
/// │                                                                         │
/// ├──────────────────────── One tick ───────────────────────────────────────┤
/// │  0. catch up : walk cycle ++ owed by the previous tick (already drawn)  │
/// │  1. resolve  : first held + unblocked direction, Up > Left > Down > Right│
/// │  2. step     : scroll the world (or move the player), owe a walk cycle ++│
/// │     or hold  : face the last pressed direction, standing pose          │
/// │  3. draw     : background -> (boundaries) -> player                     │
/// └─────────────────────────────────────────────────────────────────────────┘
pub enum TileWalker {
    /// Assets are still in flight, nothing to update or draw yet
    Loading,

    /// Every asset is in, the walk is on
    Loaded(GameState<HtmlImageElement>),
}

impl TileWalker {
    pub fn new() -> Self {
        TileWalker::Loading
    }

    /// Fall back to the built in defaults when `config.json` is missing or
    /// doesn't validate
    async fn load_config() -> WalkConfig {
        match browser::fetch_json::<WalkConfig>(WalkConfig::PATH)
            .await
            .and_then(WalkConfig::validate)
        {
            Ok(config) => config,
            Err(err) => {
                log!(
                    "TileWalker: using default config, {} unusable : {:#}",
                    WalkConfig::PATH,
                    err
                );
                WalkConfig::default()
            }
        }
    }

    async fn load_image(path: &str) -> Result<HtmlImageElement> {
        engine::load_image(path)
            .await
            .with_context(|| format!("Failed to load image resource from : {}", path))
    }

    async fn load_tile_map(path: &str) -> Result<TileMap> {
        browser::fetch_json::<TileMap>(path)
            .await
            .with_context(|| format!("Failed to load collision map from : {}", path))
    }
}

impl Default for TileWalker {
    fn default() -> Self {
        TileWalker::new()
    }
}

#[async_trait(?Send)]
impl Game for TileWalker {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            TileWalker::Loading => {
                let config = Self::load_config().await;
                browser::resize_canvas(config.canvas.width as u32, config.canvas.height as u32)?;

                // Everything loads in parallel, total time is the slowest asset
                let assets = &config.assets;
                let (up, left, down, right, map, tile_map) = try_join!(
                    Self::load_image(&assets.player_up),
                    Self::load_image(&assets.player_left),
                    Self::load_image(&assets.player_down),
                    Self::load_image(&assets.player_right),
                    Self::load_image(&assets.map),
                    Self::load_tile_map(&assets.collisions),
                )?;

                let spawn = player_spawn(config.canvas, down.size(), config.player_frames);
                let player = Player::new(
                    FacingImages {
                        up,
                        left,
                        down,
                        right,
                    },
                    spawn,
                    config.player_frames,
                    config.frame_delay_ms,
                )?;
                let world =
                    World::from_tile_map(map, &tile_map, config.solid_tile, config.map_offset);
                log!(
                    "TileWalker: {}x{} tile map, {} obstacles",
                    tile_map.width(),
                    tile_map.height(),
                    world.obstacles().len()
                );

                Ok(Box::new(TileWalker::Loaded(GameState::new(
                    player, world, &config,
                ))))
            }
            TileWalker::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, input: &InputState, now: f64) {
        if let TileWalker::Loaded(state) = self {
            state.update(input, now);
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let TileWalker::Loaded(state) = self {
            renderer.clear(&state.screen());
            state.draw(renderer);
        }
    }
}

/// Center the first walk frame horizontally, top edge on the vertical middle
pub fn player_spawn(canvas: Size, strip: Size, frames: u8) -> Point {
    let frame_width = strip.width / f32::from(frames.max(1));
    Point::new(canvas.width / 2.0 - frame_width / 2.0, canvas.height / 2.0)
}

/// What the player did this tick
/// - level triggered : recomputed from input every tick, never carried over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Idle,
    Moving(Direction),
}

/// Everything one running session owns
/// ┌────────────────────────┬──────────────────────────────┐
/// │ field                  │ mutated by                   │
/// ├────────────────────────┼──────────────────────────────┤
/// │ player                 │ update() : walk / stand      │
/// │ world                  │ update() : camera step       │
/// │ movement               │ update() : once per tick     │
/// │ pending_advance        │ update() : set, then taken   │
/// │ step, camera, canvas.. │ never (copied from config)   │
/// └────────────────────────┴──────────────────────────────┘
pub struct GameState<I> {
    player: Player<I>,
    world: World<I>,
    step: f32,
    camera_follows_player: bool,
    show_boundaries: bool,
    canvas: Size,
    movement: Movement,
    // walk cycle step owed by the last Moving tick : (direction, tick time)
    // - a tick draws the frame it walked with, the cycle moves on afterwards
    pending_advance: Option<(Direction, f64)>,
}

impl<I: ImageSource> GameState<I> {
    pub fn new(player: Player<I>, world: World<I>, config: &WalkConfig) -> Self {
        GameState {
            player,
            world,
            step: config.step,
            camera_follows_player: config.camera_follows_player,
            show_boundaries: config.show_boundaries,
            canvas: config.canvas,
            movement: Movement::Idle,
            pending_advance: None,
        }
    }

    pub fn player(&self) -> &Player<I> {
        &self.player
    }

    pub fn world(&self) -> &World<I> {
        &self.world
    }

    pub fn movement(&self) -> Movement {
        self.movement
    }

    pub fn screen(&self) -> Rect {
        Rect::new(Point::default(), self.canvas)
    }

    /// First direction in `Direction::PRIORITY` that is held and not blocked
    pub fn resolve(&self, input: &InputState) -> Movement {
        let player = self.player.bounding_box();
        Direction::PRIORITY
            .iter()
            .copied()
            .find(|&direction| {
                input.is_held(direction)
                    && !world::is_blocked(&player, self.world.obstacles(), direction, self.step)
            })
            .map_or(Movement::Idle, Movement::Moving)
    }

    pub fn update(&mut self, input: &InputState, now: f64) -> Movement {
        if let Some((direction, at)) = self.pending_advance.take() {
            self.player.advance_frame(direction, at);
        }

        let movement = self.resolve(input);
        match movement {
            Movement::Moving(direction) => {
                if self.camera_follows_player {
                    self.world.shift(direction.world_shift(self.step));
                } else {
                    self.player.translate(direction.travel(self.step));
                }
                self.player.face(direction);
                self.pending_advance = Some((direction, now));
            }
            // blocked or no key : stand facing wherever we last meant to go
            Movement::Idle => self.player.stand(input.last_pressed()),
        }
        self.movement = movement;
        movement
    }

    /// Draw order matters : background -> foreground
    pub fn draw(&self, sink: &impl DrawSink<I>) {
        self.world.draw(sink);
        if self.show_boundaries {
            self.world.draw_boundaries(sink);
        }
        self.player.draw(sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::animated::tests::{RecordingSink, TestImage};
    use crate::world::{Obstacle, SOLID_TILE};
    use approx::assert_relative_eq;

    const TICK_MS: f64 = 1000.0 / 60.0;

    fn strip() -> TestImage {
        TestImage {
            width: 192.0,
            height: 68.0,
        }
    }

    fn map_image() -> TestImage {
        TestImage {
            width: 3360.0,
            height: 1920.0,
        }
    }

    fn state_with(obstacles: Vec<Obstacle>, config: WalkConfig) -> GameState<TestImage> {
        let player = Player::new(
            FacingImages {
                up: strip(),
                left: strip(),
                down: strip(),
                right: strip(),
            },
            player_spawn(config.canvas, strip().size(), config.player_frames),
            config.player_frames,
            config.frame_delay_ms,
        )
        .unwrap();
        let world = World::new(
            crate::sprite::AnimatedSprite::still(map_image(), config.map_offset),
            obstacles,
        );
        GameState::new(player, world, &config)
    }

    fn open_field() -> GameState<TestImage> {
        state_with(vec![], WalkConfig::default())
    }

    fn holding(directions: &[Direction]) -> InputState {
        let mut input = InputState::default();
        for &direction in directions {
            input.set_held(direction, true);
        }
        input
    }

    #[test]
    fn spawn_is_centered() {
        let spawn = player_spawn(
            Size {
                width: 1024.0,
                height: 576.0,
            },
            strip().size(),
            4,
        );
        assert_relative_eq!(spawn.x, 488.0);
        assert_relative_eq!(spawn.y, 288.0);
    }

    #[test]
    fn starts_idle_facing_down() {
        let mut state = open_field();
        assert_eq!(state.movement(), Movement::Idle);
        assert_eq!(state.update(&InputState::default(), 0.0), Movement::Idle);
        assert_eq!(state.player().facing(), Direction::Down);
    }

    #[test]
    fn up_wins_over_left() {
        let state = open_field();
        let input = holding(&[Direction::Left, Direction::Up]);
        assert_eq!(state.resolve(&input), Movement::Moving(Direction::Up));
    }

    #[test]
    fn full_priority_order() {
        let state = open_field();
        assert_eq!(
            state.resolve(&holding(&[Direction::Right, Direction::Down])),
            Movement::Moving(Direction::Down)
        );
        assert_eq!(
            state.resolve(&holding(&[Direction::Right, Direction::Left])),
            Movement::Moving(Direction::Left)
        );
        assert_eq!(
            state.resolve(&holding(&[Direction::Right])),
            Movement::Moving(Direction::Right)
        );
    }

    #[test]
    fn blocked_direction_falls_through_to_the_next() {
        // wall right above the player : player box is (488, 288) 48x68
        let wall = Obstacle::new(Point::new(488.0, 288.0 - 50.0));
        let state = state_with(vec![wall], WalkConfig::default());
        let input = holding(&[Direction::Up, Direction::Left]);
        assert_eq!(state.resolve(&input), Movement::Moving(Direction::Left));
    }

    #[test]
    fn camera_follow_scrolls_the_world() {
        let mut state = state_with(
            vec![Obstacle::new(Point::new(0.0, 0.0))],
            WalkConfig::default(),
        );
        let before = state.player().position();

        state.update(&holding(&[Direction::Up]), 0.0);
        state.update(&holding(&[Direction::Left]), TICK_MS);

        assert_eq!(state.player().position(), before);
        assert_eq!(state.world().background().position(), Point::new(-696.0, -346.0));
        assert_eq!(state.world().obstacles()[0].position(), Point::new(4.0, 4.0));
    }

    #[test]
    fn fixed_camera_moves_the_player() {
        let config = WalkConfig {
            camera_follows_player: false,
            ..WalkConfig::default()
        };
        let mut state = state_with(vec![Obstacle::new(Point::new(0.0, 0.0))], config);

        state.update(&holding(&[Direction::Down]), 0.0);
        state.update(&holding(&[Direction::Right]), TICK_MS);

        assert_eq!(state.player().position(), Point::new(492.0, 292.0));
        assert_eq!(state.world().background().position(), Point::new(-700.0, -350.0));
        assert_eq!(state.world().obstacles()[0].position(), Point::new(0.0, 0.0));
    }

    #[test]
    fn walks_right_until_the_wall() {
        // player right edge at 536, wall starts 64px further at 600
        let wall = Obstacle::new(Point::new(600.0, 300.0));
        let mut state = state_with(vec![wall], WalkConfig::default());
        let mut input = InputState::default();
        input.press(Direction::Right);

        let mut moves = 0;
        for tick in 0..30 {
            if let Movement::Moving(_) = state.update(&input, tick as f64 * TICK_MS) {
                moves += 1;
            }
        }

        assert_eq!(moves, 15);
        assert_eq!(state.world().obstacles()[0].position(), Point::new(540.0, 300.0));
        assert_eq!(state.movement(), Movement::Idle);
        // pressed against the wall : still facing it, standing pose
        assert_eq!(state.player().facing(), Direction::Right);
        assert_eq!(state.player().active().active_frame(), 0);
    }

    #[test]
    fn same_wall_with_a_fixed_camera() {
        let config = WalkConfig {
            camera_follows_player: false,
            ..WalkConfig::default()
        };
        let wall = Obstacle::new(Point::new(600.0, 300.0));
        let mut state = state_with(vec![wall], config);
        let input = holding(&[Direction::Right]);

        for tick in 0..30 {
            state.update(&input, tick as f64 * TICK_MS);
        }

        // same 60px of travel, this time done by the player
        assert_eq!(state.player().position(), Point::new(548.0, 288.0));
        assert_eq!(state.world().obstacles()[0].position(), Point::new(600.0, 300.0));
    }

    #[test]
    fn walk_cycle_is_throttled_and_resets_on_stop() {
        let mut state = open_field();
        let input = holding(&[Direction::Down]);

        // 100ms per frame at 60 ticks a second : 12 ticks span 2 frame changes
        for tick in 0..12 {
            state.update(&input, tick as f64 * TICK_MS);
        }
        assert_eq!(state.player().sprite(Direction::Down).active_frame(), 2);

        state.update(&InputState::default(), 12.0 * TICK_MS);
        assert_eq!(state.player().sprite(Direction::Down).active_frame(), 0);
    }

    #[test]
    fn walking_tick_draws_its_frame_before_the_cycle_moves_on() {
        let mut state = open_field();
        let mut input = InputState::default();
        input.press(Direction::Down);

        let crop_x = |state: &GameState<TestImage>| {
            let sink = RecordingSink::default();
            state.draw(&sink);
            let blits = sink.blits.borrow();
            // [0] background, [1] player
            let x = blits[1].1.x();
            x
        };

        state.update(&input, 0.0);
        assert_relative_eq!(crop_x(&state), 0.0);

        state.update(&input, TICK_MS);
        assert_relative_eq!(crop_x(&state), 48.0);
    }

    #[test]
    fn idle_faces_last_pressed() {
        let mut state = open_field();
        let mut input = InputState::default();
        input.press(Direction::Left);
        state.update(&input, 0.0);
        input.release(Direction::Left);

        assert_eq!(state.update(&input, TICK_MS), Movement::Idle);
        assert_eq!(state.player().facing(), Direction::Left);
    }

    #[test]
    fn draws_background_then_player() {
        let state = state_with(
            vec![Obstacle::new(Point::new(0.0, 0.0))],
            WalkConfig {
                show_boundaries: false,
                ..WalkConfig::default()
            },
        );
        let sink = RecordingSink::default();
        state.draw(&sink);

        let blits = sink.blits.borrow();
        assert_eq!(blits.len(), 2);
        assert_eq!(blits[0].0, map_image());
        assert_eq!(blits[1].0, strip());
        assert!(sink.outlines.borrow().is_empty());
    }

    #[test]
    fn boundary_overlay_when_enabled() {
        let config = WalkConfig {
            show_boundaries: true,
            ..WalkConfig::default()
        };
        let map = TileMap::new(3, vec![SOLID_TILE, 0, SOLID_TILE]).unwrap();
        let obstacles = map.obstacles(config.solid_tile, config.map_offset);
        let state = state_with(obstacles, config);
        let sink = RecordingSink::default();
        state.draw(&sink);
        assert_eq!(sink.outlines.borrow().len(), 2);
    }
}
